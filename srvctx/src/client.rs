//! Guest-side client for the hypervisor server context.

use serde_json::Value;
use srvctx_proto::{ALL, GLOBAL_CONTEXT, META};

use crate::endpoint::Endpoint;
use crate::error::Result;
use crate::fetch::Fetch;
use crate::serial::SerialFetcher;

/// Handle for querying the server context.
///
/// Carries no session state: every call is an independent round trip through
/// the fetcher. Results are either the decoded JSON value or, for scalar
/// keys, the raw text wrapped in [`Value::String`]. Invalid UTF-8 in such
/// text is replaced with U+FFFD, so only valid UTF-8 answers come back
/// byte-for-byte.
#[derive(Debug, Clone, Default)]
pub struct Client<F = SerialFetcher> {
    /// Performs the actual round trips.
    fetcher: F,
}

impl Client {
    /// Creates a client on the default serial port for this OS.
    pub fn new() -> Self {
        Self::with_endpoint(Endpoint::default())
    }

    /// Creates a client on an explicit serial endpoint.
    pub const fn with_endpoint(endpoint: Endpoint) -> Self {
        Self {
            fetcher: SerialFetcher::new(endpoint),
        }
    }
}

impl<F: Fetch> Client<F> {
    /// Creates a client backed by a custom fetcher.
    pub const fn with_fetcher(fetcher: F) -> Self {
        Self { fetcher }
    }

    /// The fetcher serving this client.
    pub const fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Fetches a single key, e.g. `"uuid"` or `"/meta/ssh_public_key/"`.
    pub fn key(&self, key: &str) -> Result<Value> {
        self.fetcher.fetch(key)
    }

    /// Fetches the whole server context. Same as `key("")`.
    pub fn all(&self) -> Result<Value> {
        self.key(ALL)
    }

    /// Fetches the server's `meta` mapping. Same as `key("/meta/")`.
    pub fn meta(&self) -> Result<Value> {
        self.key(META)
    }

    /// Fetches the account's global context. Same as `key("/global_context/")`.
    pub fn global_context(&self) -> Result<Value> {
        self.key(GLOBAL_CONTEXT)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::io;

    use serde_json::json;

    use super::*;
    use crate::error::Error;
    use crate::fetch::MemoryContext;

    fn fetch_mock() -> Client<MemoryContext> {
        Client::with_fetcher(MemoryContext::new(json!({
            "cpu": 1000,
            "cpus_instead_of_cores": false,
            "global_context": {"some_global_key": "some_global_val"},
            "mem": 1_073_741_824,
            "meta": {"ssh_public_key": "ssh-rsa AAAAB3NzaC1yc2E.../hQ5D5 john@doe"},
            "name": "test_server",
            "smp": 1,
            "tags": ["much server", "very performance"],
            "uuid": "65b2fb23-8c03-4187-a3ba-8b7c919e8890",
            "vnc_password": "9e84d6cb49e46379",
        })))
    }

    #[test]
    fn all_returns_every_top_level_key() {
        let result = fetch_mock().all().unwrap();
        let map = result.as_object().unwrap();
        for key in ["meta", "name", "uuid", "global_context"] {
            assert!(map.contains_key(key), "{key} not in all keys");
        }
    }

    #[test]
    fn key_returns_scalar() {
        let result = fetch_mock().key("uuid").unwrap();
        assert_eq!(result.as_str(), Some("65b2fb23-8c03-4187-a3ba-8b7c919e8890"));
    }

    #[test]
    fn meta_returns_mapping() {
        let result = fetch_mock().meta().unwrap();
        assert!(result.as_object().unwrap().contains_key("ssh_public_key"));
    }

    #[test]
    fn global_context_returns_mapping() {
        let result = fetch_mock().global_context().unwrap();
        assert_eq!(result, json!({"some_global_key": "some_global_val"}));
    }

    #[test]
    fn missing_key_is_an_error() {
        let err = fetch_mock().key("nonexistent").unwrap_err();
        assert!(matches!(err, Error::NoSuchKey(_)));
    }

    #[test]
    fn shortcuts_match_their_keys() {
        let client = fetch_mock();
        assert_eq!(client.all().unwrap(), client.key("").unwrap());
        assert_eq!(client.meta().unwrap(), client.key("/meta/").unwrap());
        assert_eq!(
            client.global_context().unwrap(),
            client.key("/global_context/").unwrap()
        );
    }

    #[test]
    fn repeated_queries_are_stable() {
        let client = fetch_mock();
        let first = client.all().unwrap();
        for _ in 0..3 {
            assert_eq!(client.all().unwrap(), first);
        }
    }

    #[test]
    fn shortcuts_send_fixed_keys() {
        let seen = RefCell::new(Vec::new());
        let client = Client::with_fetcher(|key: &str| -> Result<Value> {
            seen.borrow_mut().push(key.to_owned());
            Ok(Value::Null)
        });

        client.all().unwrap();
        client.meta().unwrap();
        client.global_context().unwrap();
        client.key("tags").unwrap();

        assert_eq!(*seen.borrow(), ["", "/meta/", "/global_context/", "tags"]);
    }

    #[test]
    fn fetcher_errors_propagate_unchanged() {
        let client = Client::with_fetcher(|_: &str| -> Result<Value> {
            Err(Error::Io {
                op: "read response",
                source: io::Error::new(io::ErrorKind::UnexpectedEof, "closed"),
            })
        });
        match client.meta().unwrap_err() {
            Error::Io { op, source } => {
                assert_eq!(op, "read response");
                assert_eq!(source.kind(), io::ErrorKind::UnexpectedEof);
            }
            other => panic!("expected Io, got {other:?}"),
        }
    }

    #[test]
    fn default_client_uses_host_endpoint() {
        let client = Client::new();
        assert_eq!(client.fetcher().endpoint(), &Endpoint::default());

        let custom = Client::with_endpoint(Endpoint::new("/dev/ttyS0", 9600));
        assert_eq!(custom.fetcher().endpoint().name(), "/dev/ttyS0");
    }
}
