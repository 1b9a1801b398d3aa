//! Read hypervisor-provided server context from inside a guest.
//!
//! The host exposes the server definition (name, uuid, NICs, tags, `meta`
//! and the account's global context) on a virtual serial port. `srvctx`
//! frames the request, reads the answer up to the end-of-transmission byte
//! and decodes it: JSON for composite keys, plain text for scalar ones.
//!
//! # Quick start
//!
//! ```no_run
//! let client = srvctx::Client::new();
//!
//! let meta = client.meta()?;
//! let uuid = client.key("uuid")?;
//! println!("{uuid}: {}", meta["ssh_public_key"]);
//! # Ok::<(), srvctx::Error>(())
//! ```
//!
//! # Testing without a serial port
//!
//! ```
//! use serde_json::json;
//! use srvctx::{Client, MemoryContext};
//!
//! let client = Client::with_fetcher(MemoryContext::new(json!({
//!     "name": "test_server",
//!     "meta": {"ssh_public_key": "ssh-rsa AAA..."},
//! })));
//! assert_eq!(client.key("name")?, json!("test_server"));
//! # Ok::<(), srvctx::Error>(())
//! ```
//!
//! Keys are written to the wire verbatim. A key containing `"\n>"` or control
//! bytes corrupts the request framing and is not rejected.

mod client;
mod endpoint;
mod error;
mod fetch;
mod serial;

pub use client::Client;
pub use endpoint::{DEFAULT_BAUD, DEFAULT_PORT, DEFAULT_PORT_WINDOWS, Endpoint};
pub use error::{Error, Result};
pub use fetch::{Fetch, MemoryContext};
pub use serde_json::Value;
pub use serial::{SUPPORTED_BAUDS, SerialFetcher, exchange};
pub use srvctx_proto::EOT;
