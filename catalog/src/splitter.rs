//! Word-boundary segmentation of recognizer output.

use mosaic_asr::RawSegment;

/// A time-bounded slice of a recognizer segment, ready for quality
/// gating and audio slicing.
#[derive(Debug, Clone, PartialEq)]
pub struct SubSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// Split an over-long segment into word groups that each stay under
/// `max_dur` seconds. Greedy: words accumulate until adding the next one
/// would push the group past the limit, then a new group starts. Without
/// word timings the segment passes through whole.
pub fn split_by_duration(seg: &RawSegment, max_dur: f64) -> Vec<SubSegment> {
    if seg.words.is_empty() {
        return vec![SubSegment {
            start: seg.start,
            end: seg.end,
            text: seg.text.trim().to_string(),
        }];
    }

    let mut subs = Vec::new();
    let mut current: Vec<&mosaic_asr::Word> = Vec::new();
    let mut chunk_start = seg.words[0].start;

    for w in &seg.words {
        if !current.is_empty() && (w.end - chunk_start) > max_dur {
            subs.push(SubSegment {
                start: chunk_start,
                end: current.last().map(|cw| cw.end).unwrap_or(chunk_start),
                text: join_words(&current),
            });
            current.clear();
            chunk_start = w.start;
        }
        current.push(w);
    }

    if !current.is_empty() {
        subs.push(SubSegment {
            start: chunk_start,
            end: current.last().map(|cw| cw.end).unwrap_or(chunk_start),
            text: join_words(&current),
        });
    }

    subs
}

/// Build overlapping word n-gram clips from a segment's word timings,
/// from single words up to `max_phrase_words`. Gives the matcher much
/// tighter material than full sentences. Single words shorter than 0.2s
/// and texts under two characters are noise and skipped.
pub fn phrase_clips(seg: &RawSegment, max_phrase_words: usize) -> Vec<SubSegment> {
    let words = &seg.words;
    if words.is_empty() {
        return Vec::new();
    }

    let mut phrases = Vec::new();
    for n in 1..=max_phrase_words {
        if n > words.len() {
            break;
        }
        for group in words.windows(n) {
            let text = join_words(&group.iter().collect::<Vec<_>>());
            let dur = group[n - 1].end - group[0].start;

            if n == 1 && dur < 0.2 {
                continue;
            }
            if text.trim().chars().count() < 2 {
                continue;
            }

            phrases.push(SubSegment {
                start: group[0].start,
                end: group[n - 1].end,
                text,
            });
        }
    }

    phrases
}

fn join_words(words: &[&mosaic_asr::Word]) -> String {
    words
        .iter()
        .map(|w| w.word.trim())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use mosaic_asr::Word;

    fn word(text: &str, start: f64, end: f64) -> Word {
        Word {
            word: format!(" {text}"),
            start,
            end,
        }
    }

    fn segment(words: Vec<Word>) -> RawSegment {
        let start = words.first().map(|w| w.start).unwrap_or(0.0);
        let end = words.last().map(|w| w.end).unwrap_or(0.0);
        RawSegment {
            start,
            end,
            text: words
                .iter()
                .map(|w| w.word.trim())
                .collect::<Vec<_>>()
                .join(" "),
            words,
        }
    }

    #[test]
    fn splits_long_segment_on_word_boundaries() {
        let seg = segment(vec![
            word("one", 0.0, 1.0),
            word("two", 1.2, 2.2),
            word("three", 2.5, 3.6),
            word("four", 3.8, 4.9),
        ]);
        let subs = split_by_duration(&seg, 2.5);
        assert_eq!(subs.len(), 2);
        assert_eq!(subs[0].text, "one two");
        assert!((subs[0].start - 0.0).abs() < 1e-9);
        assert!((subs[0].end - 2.2).abs() < 1e-9);
        assert_eq!(subs[1].text, "three four");
        assert!((subs[1].start - 2.5).abs() < 1e-9);
        assert!((subs[1].end - 4.9).abs() < 1e-9);
    }

    #[test]
    fn segment_without_words_passes_through() {
        let seg = RawSegment {
            start: 0.0,
            end: 12.0,
            text: "  no timings here ".into(),
            words: vec![],
        };
        let subs = split_by_duration(&seg, 8.0);
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].text, "no timings here");
        assert!((subs[0].end - 12.0).abs() < 1e-9);
    }

    #[test]
    fn phrase_clips_generate_ngrams() {
        let seg = segment(vec![
            word("oh", 0.0, 0.4),
            word("yeah", 0.5, 1.0),
            word("baby", 1.1, 1.6),
        ]);
        let phrases = phrase_clips(&seg, 2);
        let texts: Vec<&str> = phrases.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, vec!["oh", "yeah", "baby", "oh yeah", "yeah baby"]);
    }

    #[test]
    fn phrase_clips_skip_blips_and_fragments() {
        let seg = segment(vec![
            word("I", 0.0, 0.1),
            word("know", 0.2, 0.7),
        ]);
        let phrases = phrase_clips(&seg, 2);
        // "I" is both under 0.2s and under two characters; the pair survives.
        let texts: Vec<&str> = phrases.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, vec!["know", "I know"]);
    }

    #[test]
    fn phrase_clips_empty_without_word_timings() {
        let seg = RawSegment {
            start: 0.0,
            end: 3.0,
            text: "whatever".into(),
            words: vec![],
        };
        assert!(phrase_clips(&seg, 4).is_empty());
    }
}
