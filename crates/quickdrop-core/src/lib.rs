//! Quickdrop Core Library
//!
//! This crate provides the configuration, error taxonomy, domain model and
//! validation rules shared by every Quickdrop component.

pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use clock::{Clock, OffsetClock, SystemClock};
pub use config::{BaseConfig, Config, RetentionPolicy, UploadConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::StoredFile;
