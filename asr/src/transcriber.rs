use std::path::Path;

use crate::error::AsrError;
use crate::types::{RawSegment, TranscribeOptions};

/// Transcriber converts an audio file into timed segments.
///
/// Implementations must be safe for concurrent use (Send + Sync).
#[async_trait::async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe a whole audio file. Segments are returned in time order;
    /// word timings are present when the backend supports them and
    /// `opts.word_timestamps` is set.
    async fn transcribe(
        &self,
        path: &Path,
        opts: &TranscribeOptions,
    ) -> Result<Vec<RawSegment>, AsrError>;
}
