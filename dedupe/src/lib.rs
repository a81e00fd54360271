//! Duplicate clip detection over actual audio content.
//!
//! Two phases: byte-identical files are caught by content hash, then a
//! compact spectral fingerprint finds clips that sound the same despite
//! different encodings or volumes. Preview is the default; deletion is
//! an explicit opt-in.

pub mod error;
pub mod fingerprint;
pub mod resolver;
pub mod types;

pub use error::DedupeError;
pub use fingerprint::Fingerprint;
pub use resolver::{apply, scan, ScanReport, DEFAULT_THRESHOLD};
pub use types::{DuplicateKind, DuplicatePair};
