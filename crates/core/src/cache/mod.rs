//! SQLite-backed cache namespaces.
//!
//! Each namespace is a named, versioned key-value store mapping a request
//! URL to an immutable response snapshot. Namespaces exist as rows in a
//! registration table; an entry's write is a full-row atomic replace, so
//! concurrent writers to the same key never interleave a torn entry.
//!
//! - Content-addressed entry keys using SHA-256
//! - Automatic schema migrations
//! - WAL mode for concurrent access
//! - All-or-nothing bulk install in a single transaction

pub mod connection;
pub mod entries;
pub mod key;
pub mod migrations;

pub use crate::Error;

pub use connection::CacheDb;
pub use entries::StoredResponse;
