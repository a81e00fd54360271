use once_cell::sync::Lazy;
use regex::Regex;

/// Sentence terminators plus standalone conjunctions. The conjunction
/// alternatives are case-sensitive on purpose: "And" at the start of a
/// sentence is handled by the terminator before it, not by the word itself.
static BEAT_SPLIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?;]|\s+but\s+|\s+and\s+|\s+so\s+|\s+then\s+").unwrap());

/// Split a message into semantic beats.
///
/// A beat is a clause-level sub-phrase, separated by sentence punctuation
/// or a common conjunction. Beats are returned in source order, which
/// determines playback order. Never returns an empty vector: if nothing
/// survives the split, the trimmed original text is returned as one beat.
pub fn split_into_beats(text: &str) -> Vec<String> {
    let beats: Vec<String> = BEAT_SPLIT
        .split(text)
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .map(str::to_string)
        .collect();

    if beats.is_empty() {
        vec![text.trim().to_string()]
    } else {
        beats
    }
}
