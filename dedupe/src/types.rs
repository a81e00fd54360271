use mosaic_catalog::Clip;

/// How a duplicate was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateKind {
    /// Byte-identical files.
    Exact,
    /// Fingerprints above the similarity threshold.
    Waveform,
}

/// One resolved duplicate: `keep` stays in the catalog, `remove` goes.
#[derive(Debug, Clone)]
pub struct DuplicatePair {
    pub keep: Clip,
    pub remove: Clip,
    pub similarity: f64,
    pub kind: DuplicateKind,
}
