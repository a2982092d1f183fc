//! Configuration validation
//!
//! Validates critical configuration values at startup to catch misconfigurations early.

use anyhow::Result;
use quickdrop_core::Config;

/// Validate critical configuration values
///
/// Hard errors come from `Config::validate`; this adds startup warnings for
/// settings that are legal but likely unintended.
pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    if config.storage_root().is_relative() {
        tracing::warn!(
            root = %config.storage_root().display(),
            "UPLOAD_DIR is relative and resolves against the working directory"
        );
    }

    let retention = &config.retention;
    if retention.enabled && retention.sweep_interval > retention.max_age {
        tracing::warn!(
            max_age_ms = retention.max_age.as_millis() as u64,
            sweep_interval_ms = retention.sweep_interval.as_millis() as u64,
            "Sweep interval exceeds retention age; files may outlive it by up to one interval"
        );
    }

    Ok(())
}
