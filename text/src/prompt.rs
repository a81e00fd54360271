/// Build the guidance prompt passed to the speech-recognition engine.
///
/// The prompt primes the recognizer with examples of drawn-out words,
/// filler words and non-speech sounds so they survive transcription
/// instead of being normalized away. Purely static.
pub fn build_guidance_prompt() -> String {
    [
        // Drawn-out words and emphasis.
        "Niiaaaa, pleeeease, nooo, yesss, I looove this, that's sooo cool!",
        // Filler words.
        "Umm, ahh, hmm, uhh, like, you know...",
        // Non-speech sounds.
        "*laughs* Hahaha, hehe, that's hilarious!",
        "*sighs* Ahh... umm... I don't know...",
        // Instruction.
        "Preserve all drawn-out words, laughter, sighs, and emotional emphasis exactly as spoken.",
    ]
    .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_is_stable_and_nonempty() {
        let p = build_guidance_prompt();
        assert!(p.contains("Preserve all drawn-out words"));
        assert_eq!(p, build_guidance_prompt());
    }
}
