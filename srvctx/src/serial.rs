//! Serial-port transport for the server context channel.
//!
//! Every query opens the device, writes one framed request, reads up to the
//! end-of-transmission byte and closes the device again on drop.

use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, Read, Write};

use serde_json::Value;
use tracing::{debug, debug_span};

use crate::endpoint::Endpoint;
use crate::error::{Error, Result};
use crate::fetch::Fetch;

/// Line speeds accepted by [`SerialFetcher`].
pub const SUPPORTED_BAUDS: &[u32] = &[
    1200, 2400, 4800, 9600, 19_200, 38_400, 57_600, 115_200, 230_400,
];

/// Fetcher that queries the host over a serial device.
///
/// Holds no connection between calls. Reads block until the host sends the
/// terminator; there is no timeout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SerialFetcher {
    /// Device and line speed to open on each query.
    endpoint: Endpoint,
}

impl SerialFetcher {
    /// Creates a fetcher for `endpoint`.
    pub const fn new(endpoint: Endpoint) -> Self {
        Self { endpoint }
    }

    /// The endpoint opened on each query.
    pub const fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }
}

impl Fetch for SerialFetcher {
    fn fetch(&self, key: &str) -> Result<Value> {
        let _span = debug_span!("srvctx.fetch", key, endpoint = %self.endpoint).entered();
        let port = open(&self.endpoint)?;
        debug!("serial port opened");
        exchange(port, key)
    }
}

/// Runs one request/response round trip over `stream`.
///
/// Writes the framed `key`, reads until the terminator and decodes the body.
/// `stream` is dropped before returning on every path.
pub fn exchange<S: Read + Write>(stream: S, key: &str) -> Result<Value> {
    let mut stream = BufReader::new(stream);

    srvctx_proto::write_request(stream.get_mut(), key).map_err(|source| Error::Io {
        op: "write request",
        source,
    })?;
    debug!("request sent");

    let raw = srvctx_proto::read_response(&mut stream).map_err(|source| Error::Io {
        op: "read response",
        source,
    })?;
    let value = srvctx_proto::decode(&raw);
    debug!(bytes = raw.len(), kind = kind(&value), "response received");
    Ok(value)
}

/// Short name of the JSON type of `value`, for logs.
const fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Builds the error for a failed open of `endpoint`.
fn connection_error(endpoint: &Endpoint, source: io::Error) -> Error {
    Error::Connection {
        endpoint: endpoint.clone(),
        source,
    }
}

/// Builds the error for a line speed outside [`SUPPORTED_BAUDS`].
fn unsupported_baud(endpoint: &Endpoint) -> Error {
    connection_error(
        endpoint,
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("unsupported baud rate {}", endpoint.baud()),
        ),
    )
}

/// Opens `endpoint` as a raw 8N1 terminal at its configured speed.
///
/// The device is opened non-blocking so a port without carrier cannot stall
/// the open, then switched back to blocking once `CLOCAL` is set.
#[cfg(unix)]
fn open(endpoint: &Endpoint) -> Result<File> {
    use std::os::unix::fs::OpenOptionsExt;

    let speed = baud_rate(endpoint.baud()).ok_or_else(|| unsupported_baud(endpoint))?;

    let port = OpenOptions::new()
        .read(true)
        .write(true)
        .custom_flags(libc::O_NOCTTY | libc::O_NONBLOCK)
        .open(endpoint.name())
        .map_err(|e| connection_error(endpoint, e))?;

    configure(&port, speed).map_err(|e| connection_error(endpoint, e.into()))?;
    Ok(port)
}

/// Puts `port` into raw 8N1 mode at `speed`, ignoring modem control lines,
/// and clears `O_NONBLOCK`.
#[cfg(unix)]
fn configure(port: &File, speed: nix::sys::termios::BaudRate) -> nix::Result<()> {
    use nix::fcntl::{FcntlArg, OFlag, fcntl};
    use nix::sys::termios::{self, ControlFlags, SetArg};

    let mut tio = termios::tcgetattr(port)?;
    termios::cfmakeraw(&mut tio);
    tio.control_flags |= ControlFlags::CS8 | ControlFlags::CREAD | ControlFlags::CLOCAL;
    tio.control_flags &= !(ControlFlags::PARENB | ControlFlags::CSTOPB);
    termios::cfsetspeed(&mut tio, speed)?;
    termios::tcsetattr(port, SetArg::TCSANOW, &tio)?;

    let flags = OFlag::from_bits_truncate(fcntl(port, FcntlArg::F_GETFL)?);
    fcntl(port, FcntlArg::F_SETFL(flags & !OFlag::O_NONBLOCK))?;
    Ok(())
}

/// Opens `endpoint` and programs the line as 8N1 at its configured speed.
#[cfg(windows)]
#[allow(unsafe_code)]
fn open(endpoint: &Endpoint) -> Result<File> {
    use std::os::windows::io::AsRawHandle;

    use windows_sys::Win32::Devices::Communication::{DCB, GetCommState, SetCommState};

    if !SUPPORTED_BAUDS.contains(&endpoint.baud()) {
        return Err(unsupported_baud(endpoint));
    }
    let port = OpenOptions::new()
        .read(true)
        .write(true)
        .open(endpoint.name())
        .map_err(|e| connection_error(endpoint, e))?;

    let handle = port.as_raw_handle();
    // SAFETY: `handle` is a live comm handle owned by `port`; `dcb` is a
    // properly sized DCB that outlives both calls.
    unsafe {
        let mut dcb: DCB = std::mem::zeroed();
        dcb.DCBlength = u32::try_from(size_of::<DCB>()).unwrap_or(u32::MAX);
        if GetCommState(handle, &raw mut dcb) == 0 {
            return Err(connection_error(endpoint, io::Error::last_os_error()));
        }
        line_settings(&mut dcb, endpoint.baud());
        if SetCommState(handle, &raw const dcb) == 0 {
            return Err(connection_error(endpoint, io::Error::last_os_error()));
        }
    }
    Ok(port)
}

/// Sets `baud`, 8 data bits, no parity, one stop bit and binary mode with
/// all flow control off.
#[cfg(windows)]
fn line_settings(dcb: &mut windows_sys::Win32::Devices::Communication::DCB, baud: u32) {
    use windows_sys::Win32::Devices::Communication::{NOPARITY, ONESTOPBIT};

    dcb.BaudRate = baud;
    dcb.ByteSize = 8;
    dcb.Parity = NOPARITY;
    dcb.StopBits = ONESTOPBIT;
    // fBinary only.
    dcb._bitfield = 1;
}

#[cfg(not(any(unix, windows)))]
compile_error!("srvctx needs a Unix or Windows serial port driver");

/// Maps a numeric line speed to its termios constant.
#[cfg(unix)]
const fn baud_rate(baud: u32) -> Option<nix::sys::termios::BaudRate> {
    use nix::sys::termios::BaudRate;

    Some(match baud {
        1200 => BaudRate::B1200,
        2400 => BaudRate::B2400,
        4800 => BaudRate::B4800,
        9600 => BaudRate::B9600,
        19_200 => BaudRate::B19200,
        38_400 => BaudRate::B38400,
        57_600 => BaudRate::B57600,
        115_200 => BaudRate::B115200,
        230_400 => BaudRate::B230400,
        _ => return None,
    })
}
