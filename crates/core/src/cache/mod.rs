//! Staleness-detection cache and the SQLite store behind it.
//!
//! This module provides:
//!
//! - Typed content digests with reserved sentinels for "verified empty" and "failed"
//! - A pure refresh decision over an explicitly loaded cache record
//! - Persistent cache records and entity documents using SQLite via tokio-rusqlite
//! - Automatic schema migrations and WAL mode

pub mod connection;
pub mod digest;
pub mod entities;
pub mod hash;
pub mod migrations;
pub mod records;
pub mod staleness;
pub mod store;

pub use crate::Error;

pub use connection::CacheDb;
pub use digest::Digest;
pub use entities::{EntitySnapshot, EntityUpdate, entity_key};
pub use records::CacheRecord;
pub use staleness::{CacheLookup, Decision, StalenessCache, decide};
pub use store::DocumentStore;
