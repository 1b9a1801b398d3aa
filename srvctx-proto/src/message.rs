//! Protocol constants and well-known context keys.

/// End-of-transmission byte terminating every response.
pub const EOT: u8 = 0x04;

/// Bytes opening a request, written before the key.
pub const REQUEST_OPEN: &[u8] = b"<\n";

/// Bytes closing a request, written after the key.
pub const REQUEST_CLOSE: &[u8] = b"\n>";

/// Key selecting the whole server context.
pub const ALL: &str = "";

/// Key selecting the user-defined `meta` mapping of the server.
pub const META: &str = "/meta/";

/// Key selecting the account-wide global context.
pub const GLOBAL_CONTEXT: &str = "/global_context/";
