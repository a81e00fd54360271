//! Tail the message log and report semantic coverage.
//!
//! Consumers poll the append-only log with an explicit byte cursor and
//! score each message beat against the clip index; [`CoverageSession`]
//! accumulates the scores and writes the end-of-session report.

pub mod coverage;
pub mod error;
pub mod logtail;

pub use coverage::{CoverageEntry, CoverageSession};
pub use error::MonitorError;
pub use logtail::{log_end_position, read_new_messages};
