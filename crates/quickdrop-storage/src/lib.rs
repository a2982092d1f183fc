//! Quickdrop Storage Library
//!
//! This crate provides the storage abstraction used by ingest, serving and the
//! retention sweeper, plus its only implementation: a flat local directory.
//!
//! # Stored name format
//!
//! Every file lives directly under the storage root as
//! `{type_tag}_{epoch_millis}_{random}{.ext}`, e.g. `image_1718000000000_48213.png`.
//! Names never contain path separators or `..`. Name generation is centralized in
//! the `keys` module.

pub mod factory;
pub mod keys;
pub mod local;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use local::LocalStorage;
pub use traits::{ByteStream, Storage, StorageError, StorageResult};
