//! Quickdrop Services
//!
//! Business logic sitting between the HTTP layer and storage: the upload ingest
//! pipeline and the retention sweeper.

pub mod ingest;
pub mod retention;

pub use ingest::{IngestError, IngestService, UploadCandidate, UploadLimitExceeded};
pub use retention::{RetentionSweeper, SweepError, SweepOutcome, SweepReport, SweeperHandle};
