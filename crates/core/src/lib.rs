//! Core domain types and shared logic for the depot file service.
//!
//! This crate defines the canonical data model used across all other crates:
//! - Content hashes for dedup and identity
//! - Storage tiers (cache vs. bulk storage)
//! - Filename sanitization
//! - Configuration types
//! - Wire request/response types shared by server and CLI

pub mod api;
pub mod config;
pub mod error;
pub mod filename;
pub mod hash;
pub mod tier;

pub use api::{DeleteResponse, FileEntry, ListResponse, UploadResponse};
pub use error::{Error, Result};
pub use filename::{DEFAULT_FILENAME, sanitize_filename};
pub use hash::{ContentHash, ContentHasher};
pub use tier::Tier;

/// Default maximum upload size: 50 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

/// Default outstanding-migration byte budget: 256 MiB.
pub const DEFAULT_MIGRATION_BUDGET_BYTES: u64 = 256 * 1024 * 1024;
