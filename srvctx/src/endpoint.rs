//! Serial endpoint configuration.

use std::fmt;

/// Default line speed of the server context port.
pub const DEFAULT_BAUD: u32 = 115_200;

/// Server context port on Linux, the BSDs and macOS.
pub const DEFAULT_PORT: &str = "/dev/ttyS1";

/// Server context port on Windows.
pub const DEFAULT_PORT_WINDOWS: &str = "COM2";

/// Serial device name and line speed used to reach the host.
///
/// Resolve once at startup and hand it to [`Client::with_endpoint`].
///
/// [`Client::with_endpoint`]: crate::Client::with_endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Device path or port name.
    name: String,
    /// Line speed in bits per second.
    baud: u32,
}

impl Endpoint {
    /// Creates an endpoint for an explicit device and line speed.
    pub fn new(name: impl Into<String>, baud: u32) -> Self {
        Self {
            name: name.into(),
            baud,
        }
    }

    /// Returns the default endpoint for the OS family named `os`.
    ///
    /// `os` uses the vocabulary of [`std::env::consts::OS`]. Windows gets
    /// [`DEFAULT_PORT_WINDOWS`]; every other OS gets [`DEFAULT_PORT`].
    pub fn for_os(os: &str) -> Self {
        let name = if os.eq_ignore_ascii_case("windows") {
            DEFAULT_PORT_WINDOWS
        } else {
            DEFAULT_PORT
        };
        Self::new(name, DEFAULT_BAUD)
    }

    /// Replaces the device name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Replaces the line speed.
    #[must_use]
    pub const fn with_baud(mut self, baud: u32) -> Self {
        self.baud = baud;
        self
    }

    /// Device path or port name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Line speed in bits per second.
    pub const fn baud(&self) -> u32 {
        self.baud
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::for_os(std::env::consts::OS)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.baud)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windows_uses_com2() {
        let ep = Endpoint::for_os("windows");
        assert_eq!(ep.name(), "COM2");
        assert_eq!(ep.baud(), 115_200);
    }

    #[test]
    fn other_systems_use_ttys1() {
        for os in ["linux", "freebsd", "macos", "netbsd"] {
            assert_eq!(Endpoint::for_os(os).name(), "/dev/ttyS1", "{os}");
        }
    }

    #[test]
    fn default_follows_host_os() {
        assert_eq!(Endpoint::default(), Endpoint::for_os(std::env::consts::OS));
        #[cfg(target_os = "linux")]
        assert_eq!(Endpoint::default().name(), DEFAULT_PORT);
    }

    #[test]
    fn overrides_replace_fields() {
        let ep = Endpoint::for_os("linux")
            .with_name("/dev/ttyS0")
            .with_baud(9600);
        assert_eq!(ep, Endpoint::new("/dev/ttyS0", 9600));
    }

    #[test]
    fn display_shows_name_and_baud() {
        assert_eq!(Endpoint::for_os("windows").to_string(), "COM2@115200");
    }
}
