//! Metadata store for the depot file service.
//!
//! The `files` table is the single source of truth for which tier holds a
//! file's authoritative bytes. This crate provides:
//! - Row models mapping to the metadata schema
//! - The [`FileRepo`] repository trait
//! - The combined [`MetadataStore`] trait and its SQLite implementation

pub mod error;
pub mod models;
pub mod repos;
pub mod store;

pub use error::{MetadataError, MetadataResult};
pub use models::FileRow;
pub use repos::FileRepo;
pub use store::{MetadataStore, SqliteStore};
