//! Core types and shared functionality for clubwatch.
//!
//! This crate provides:
//! - Data categories and their per-category TTL table
//! - Content digests and the staleness decision
//! - SQLite-backed store for cache records and entity documents
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod category;
pub mod config;
pub mod error;

pub use cache::{
    CacheDb, CacheLookup, CacheRecord, Decision, Digest, DocumentStore, EntitySnapshot, EntityUpdate, StalenessCache,
    entity_key,
};
pub use category::Category;
pub use config::{AppConfig, CategoryTtls, ConfigError, LeagueRef, TeamRef};
pub use error::Error;
