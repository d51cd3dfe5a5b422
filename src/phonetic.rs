//! Folkets Lexikon phonetic notation to IPA.

use lazy_static::lazy_static;

const LENGTH_MARK: &str = "ː";

// Source notation → IPA. Uppercase and lowercase vowels are distinct symbols.
const IPA_TABLE: &[(&str, &str)] = &[
    // Vowels
    ("@", "ə"),
    ("A", "ɑ"),
    ("E", "ɛ"),
    ("I", "ɪ"),
    ("O", "ɔ"),
    ("U", "ʊ"),
    ("Y", "y"),
    ("Å", "ɔ̊"),
    ("Ä", "æ"),
    ("Ö", "øː"),
    ("ä", "ɛ"),
    ("ö", "œ"),
    // Consonants
    ("$", "ʃ"),
    // Stress, length and aspiration
    ("²", "ˌ"),
    (":", "ː"),
    ("+", "ʰ"),
    // Noise: stray digits, uncertainty markers, separators
    ("1", ""),
    ("2", ""),
    ("4", ""),
    ("9", ""),
    ("?", ""),
    ("el.", ""),
];

lazy_static! {
    // Longest source pattern first so multi-character tokens win over single characters
    static ref PATTERNS: Vec<(&'static str, &'static str)> = {
        let mut patterns = IPA_TABLE.to_vec();
        patterns.sort_by_key(|(source, _)| std::cmp::Reverse(source.chars().count()));
        patterns
    };
}

/// Normalize a phonetic transcription to IPA.
pub fn normalize_phonetic(phonetic: &str) -> String {
    let mut out = String::with_capacity(phonetic.len() + 8);
    let mut rest = phonetic;

    while let Some(ch) = rest.chars().next() {
        match PATTERNS.iter().find(|(source, _)| rest.starts_with(source)) {
            Some((source, ipa)) => {
                out.push_str(ipa);
                rest = &rest[source.len()..];
            }
            None => {
                out.push(ch);
                rest = &rest[ch.len_utf8()..];
            }
        }
    }

    let doubled = LENGTH_MARK.repeat(2);
    while out.contains(&doubled) {
        out = out.replace(&doubled, LENGTH_MARK);
    }

    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input() {
        assert_eq!(normalize_phonetic(""), "");
    }

    #[test]
    fn maps_vowels_case_sensitively() {
        assert_eq!(normalize_phonetic("A"), "ɑ");
        assert_eq!(normalize_phonetic("ä"), "ɛ");
        assert_eq!(normalize_phonetic("Ä"), "æ");
        assert_eq!(normalize_phonetic("ö"), "œ");
    }

    #[test]
    fn keeps_unmapped_characters() {
        assert_eq!(normalize_phonetic("spr'iN"), "spr'iN");
    }

    #[test]
    fn strips_noise_tokens() {
        assert_eq!(normalize_phonetic("²b1il9?"), "ˌbil");
        assert_eq!(normalize_phonetic("el.sk'O"), "sk'ɔ");
    }

    #[test]
    fn collapses_doubled_length_marks() {
        assert_eq!(normalize_phonetic("Ö:"), "øː");
        assert_eq!(normalize_phonetic("A:::"), "ɑː");
    }

    #[test]
    fn trims_whitespace() {
        assert_eq!(normalize_phonetic("  $U:t 2 "), "ʃʊːt");
    }

    #[test]
    fn known_tokens_concatenate() {
        let tokens = ["$", "E", ":", "+", "@", "Å", "Y"];
        let input: String = tokens.concat();
        assert_eq!(normalize_phonetic(&input), "ʃɛːʰəɔ̊y");
    }
}
