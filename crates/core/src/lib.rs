//! Core types and policy engine for holdover.
//!
//! This crate provides:
//! - Versioned cache namespaces over a SQLite store
//! - The request classifier and the three caching strategies
//! - Lifecycle handling (install, activate) and background refresh
//! - Unified error types and configuration structures
//!
//! The engine is host-agnostic: the network is reached only through the
//! injected [`Backend`] capability and the cache only through [`CacheDb`].
//! Binding the engine to an actual HTTP surface is the server crate's job.

pub mod backend;
pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod policy;
pub mod request;

pub use backend::{Backend, BackendResponse};
pub use cache::{CacheDb, StoredResponse};
pub use config::AppConfig;
pub use engine::{AgentResponse, CacheAgent, HostDirective, PushPayload, ResponseSource};
pub use error::Error;
pub use policy::CacheNames;
pub use request::{Destination, RequestDescriptor, Route, classify};
