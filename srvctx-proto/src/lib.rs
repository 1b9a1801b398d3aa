//! Wire protocol for the hypervisor server context channel.
//!
//! A guest asks for a key by writing `<\n{key}\n>` to the serial port. The
//! host answers with arbitrary bytes followed by a single [`EOT`] byte. The
//! answer is JSON for composite keys and bare text for scalar ones, so
//! [`decode`] falls back to a string whenever JSON parsing fails.

mod codec;
mod message;

pub use codec::{decode, frame, read_response, write_request};
pub use message::{ALL, EOT, GLOBAL_CONTEXT, META, REQUEST_CLOSE, REQUEST_OPEN};
