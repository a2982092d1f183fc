//! Retention: periodic deletion of stored files older than the configured age.

mod sweeper;

pub use sweeper::{RetentionSweeper, SweepError, SweepOutcome, SweepReport, SweeperHandle};
