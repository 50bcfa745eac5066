//! Network backend for holdover.
//!
//! This crate provides the reqwest-based [`Backend`] implementation the
//! engine fetches through, plus raw pass-through forwarding for requests
//! the agent does not intercept.
//!
//! [`Backend`]: holdover_core::Backend

pub mod fetch;

pub use fetch::{FetchClient, FetchConfig};
