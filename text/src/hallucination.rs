use once_cell::sync::Lazy;
use regex::Regex;

/// Transcripts shorter than this cannot be meaningful hallucinations.
const MIN_SUSPECT_CHARS: usize = 50;

/// Transcripts longer than this almost always signal runaway generation.
const MAX_TRANSCRIPT_CHARS: usize = 500;

/// Fallback truncation length when no immediate repeat is found.
const FALLBACK_TRUNCATE_CHARS: usize = 100;

/// Known hallucination shapes: repeated filler tokens, stock video outros,
/// music-marker spam. These are glitches where the recognizer invents text
/// from noise or silence.
static HALLUCINATION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(\bha\s*){5,}",
        r"(?i)(\bhaha\s*){4,}",
        r"(?i)(\blol\s*){4,}",
        r"(?i)(\bum\s*){5,}",
        r"(?i)(\buh\s*){5,}",
        r"(?i)thank you(\.|\s)*thank you(\.|\s)*thank you",
        r"(?i)please subscribe",
        r"(?i)like and subscribe",
        r"(?i)see you in the next",
        r"(?i)\[music\](\s*\[music\])+",
        r"♪+",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("hallucination pattern"))
    .collect()
});

/// Detect whether a speech-recognition transcript is a hallucination.
///
/// Checks, in order: the fixed pattern table, degenerate repetition loops
/// (a chunk of 8-30 characters repeated three times consecutively, which
/// catches loops the table misses without flagging natural repetition like
/// "no no no"), and excessive total length.
pub fn is_hallucination(text: &str) -> bool {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() < MIN_SUSPECT_CHARS {
        return false;
    }

    for pattern in HALLUCINATION_PATTERNS.iter() {
        if pattern.is_match(text) {
            return true;
        }
    }

    for len in 8..=30 {
        if chars.len() < len * 3 {
            break;
        }
        for i in 0..chars.len() - len * 3 {
            if chars[i..i + len] == chars[i + len..i + 2 * len]
                && chars[i + len..i + 2 * len] == chars[i + 2 * len..i + 3 * len]
            {
                return true;
            }
        }
    }

    chars.len() > MAX_TRANSCRIPT_CHARS
}

/// Try to salvage useful text from a hallucinated transcript.
///
/// Scans for the earliest position where a chunk of 2-20 characters repeats
/// immediately once and returns everything before it. A repeat at the very
/// start yields an empty prefix, which is skipped; if no usable prefix is
/// found anywhere, the text is truncated to its first 100 characters.
pub fn clean_hallucination(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();

    for len in 2..=20 {
        if chars.len() < len * 2 {
            break;
        }
        for i in 0..chars.len() - len * 2 {
            if chars[i..i + len] == chars[i + len..i + 2 * len] {
                let cleaned: String = chars[..i].iter().collect();
                let cleaned = cleaned.trim();
                if !cleaned.is_empty() {
                    return cleaned.to_string();
                }
            }
        }
    }

    chars
        .iter()
        .take(FALLBACK_TRUNCATE_CHARS)
        .collect::<String>()
        .trim()
        .to_string()
}
