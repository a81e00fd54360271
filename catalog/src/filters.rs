//! Quality gates and per-run rejection accounting.
//!
//! Gate rejections are expected filtering outcomes, never errors. The
//! cheap text checks run before anything touches audio samples.

use std::fmt;

/// A transcript is too short when it has fewer than `min_len`
/// alphanumeric characters once punctuation and whitespace are stripped.
pub fn transcript_too_short(text: &str, min_len: usize) -> bool {
    text.chars().filter(|c| c.is_ascii_alphanumeric()).count() < min_len
}

/// A clip is too quiet when its loudness falls below the floor.
/// Filters out near-silent slices that would just be dead air.
pub fn clip_too_quiet(energy_db: f64, min_db: f64) -> bool {
    energy_db < min_db
}

/// Per-file counters for every rejected segment or sub-segment.
#[derive(Debug, Default, Clone, Copy)]
pub struct SkipCounts {
    pub hallucination: usize,
    pub too_short: usize,
    pub too_quiet: usize,
    pub too_brief: usize,
}

impl SkipCounts {
    pub fn total(&self) -> usize {
        self.hallucination + self.too_short + self.too_quiet + self.too_brief
    }
}

impl fmt::Display for SkipCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = [
            (self.hallucination, "hallucination"),
            (self.too_short, "too_short"),
            (self.too_quiet, "too_quiet"),
            (self.too_brief, "too_brief"),
        ]
        .iter()
        .filter(|(n, _)| *n > 0)
        .map(|(n, name)| format!("{n} {name}"))
        .collect();
        write!(f, "{}", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcript_length_counts_alphanumerics_only() {
        assert!(transcript_too_short("a b!", 4));
        assert!(transcript_too_short("...", 4));
        assert!(!transcript_too_short("okay", 4));
        assert!(!transcript_too_short("o-k-a-y", 4));
    }

    #[test]
    fn quiet_gate_is_strict_less_than() {
        assert!(clip_too_quiet(-45.1, -45.0));
        assert!(!clip_too_quiet(-45.0, -45.0));
        assert!(!clip_too_quiet(-12.0, -45.0));
    }

    #[test]
    fn skip_summary_omits_zero_counters() {
        let counts = SkipCounts {
            hallucination: 2,
            too_short: 0,
            too_quiet: 1,
            too_brief: 0,
        };
        assert_eq!(counts.total(), 3);
        assert_eq!(counts.to_string(), "2 hallucination, 1 too_quiet");
    }
}
