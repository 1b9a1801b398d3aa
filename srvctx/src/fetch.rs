//! The fetcher seam between [`Client`](crate::Client) and a transport.

use serde_json::Value;

use crate::error::{Error, Result};

/// Performs one key-to-value round trip against a server context.
///
/// [`SerialFetcher`](crate::SerialFetcher) talks to the real serial port.
/// [`MemoryContext`] and plain closures stand in for it in tests.
pub trait Fetch {
    /// Fetches the value stored under `key`.
    fn fetch(&self, key: &str) -> Result<Value>;
}

impl<F> Fetch for F
where
    F: Fn(&str) -> Result<Value>,
{
    fn fetch(&self, key: &str) -> Result<Value> {
        self(key)
    }
}

/// An in-memory server context served from a JSON document.
///
/// Keys are slash-delimited paths: empty segments are ignored, object
/// segments select a field and numeric segments index into arrays. An empty
/// key returns the whole document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryContext {
    /// The full context document.
    root: Value,
}

impl MemoryContext {
    /// Wraps `root` as a context.
    pub const fn new(root: Value) -> Self {
        Self { root }
    }

    /// Resolves `key` without cloning.
    pub fn lookup(&self, key: &str) -> Option<&Value> {
        key.split('/')
            .filter(|seg| !seg.is_empty())
            .try_fold(&self.root, |node, seg| match node {
                Value::Object(map) => map.get(seg),
                Value::Array(items) => seg.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            })
    }
}

impl From<Value> for MemoryContext {
    fn from(root: Value) -> Self {
        Self::new(root)
    }
}

impl Fetch for MemoryContext {
    fn fetch(&self, key: &str) -> Result<Value> {
        self.lookup(key)
            .cloned()
            .ok_or_else(|| Error::NoSuchKey(key.to_owned()))
    }
}
