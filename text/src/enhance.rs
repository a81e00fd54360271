use once_cell::sync::Lazy;
use regex::Regex;

/// Vocal sound patterns and the emotion tag that replaces them.
/// Order matters: laughter variants are matched before the shorter
/// giggle/groan spellings.
static VOCAL_SOUNDS: Lazy<Vec<(Vec<Regex>, &'static str)>> = Lazy::new(|| {
    let rx = |p: &str| Regex::new(p).expect("vocal sound pattern");
    vec![
        (
            vec![
                rx(r"(?i)\b(ha+h[ah]+|he+h[eh]+|hehe+|haha+|hah+)\b"),
                rx(r"(?i)\b(ahah+|eheh+|ihih+|ohoh+)\b"),
            ],
            "*laughs*",
        ),
        (vec![rx(r"(?i)\b(tehe+|teehee+|hihihi+)\b")], "*giggles*"),
        (vec![rx(r"(?i)\b(sigh+s?)\b")], "*sighs*"),
        (vec![rx(r"(?i)\b(oh+!|ah+!|whoa+!)\b")], "*gasps*"),
        (vec![rx(r"(?i)\b(ugh+|urgh+|argh+)\b")], "*groans*"),
    ]
});

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static PUNCT_THEN_CAPITAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"([.!?,])([A-Z])").unwrap());
static PERIOD_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.{2,}").unwrap());
static BANG_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"!{2,}").unwrap());
static QUESTION_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\?{2,}").unwrap());

/// Enhance a transcript with expressive markers.
///
/// Elongated laughter, giggling, sighing, gasping and groaning spellings
/// are replaced with a bracketed emotion tag, then punctuation is
/// normalized: whitespace collapsed, a space inserted after sentence
/// punctuation glued to a capital letter, period runs collapsed to an
/// ellipsis, and repeated `!`/`?` collapsed to a single mark.
pub fn enhance(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let mut out = text.to_string();
    for (patterns, tag) in VOCAL_SOUNDS.iter() {
        for pattern in patterns {
            out = pattern.replace_all(&out, *tag).into_owned();
        }
    }

    out = WHITESPACE.replace_all(&out, " ").into_owned();
    out = PUNCT_THEN_CAPITAL.replace_all(&out, "$1 $2").into_owned();
    out = PERIOD_RUN.replace_all(&out, "...").into_owned();
    out = BANG_RUN.replace_all(&out, "!").into_owned();
    out = QUESTION_RUN.replace_all(&out, "?").into_owned();

    out.trim().to_string()
}
