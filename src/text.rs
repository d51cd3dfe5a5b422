//! Cleanup of markup-escaped dictionary text.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    // Numeric character references
    static ref DECIMAL_REF: Regex = Regex::new(r"&#(\d+);").unwrap();
    static ref HEX_REF: Regex = Regex::new(r"&#[xX]([0-9a-fA-F]+);").unwrap();

    // Quoted words whose opening quote got separated from the text
    static ref PADDED_QUOTE: Regex = Regex::new(r#""\s*([^"]+)\s*""#).unwrap();
}

// Entities escaped twice in the export, e.g. `&amp;quot;`
const DOUBLE_ESCAPED: &[(&str, &str)] = &[
    ("&amp;quot;", "\""),
    ("&amp;apos;", "'"),
    ("&amp;lt;", "<"),
    ("&amp;gt;", ">"),
    ("&amp;nbsp;", " "),
];

// `&amp;` is not in here: it is decoded last so that `&amp;lt;` never turns into `<`
// through two separate passes.
const NAMED: &[(&str, &str)] = &[
    ("&quot;", "\""),
    ("&apos;", "'"),
    ("&#39;", "'"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&nbsp;", " "),
];

// Entities that lost their terminating semicolon
const UNTERMINATED: &[(&str, &str)] = &[("&quot", "\""), ("&apos", "'")];

const PUNCTUATION_FIXES: &[(&str, &str)] = &[
    (" ,", ","),
    (" .", "."),
    (" ;", ";"),
    (" :", ":"),
    (" !", "!"),
    (" ?", "?"),
    ("( ", "("),
    (" )", ")"),
    ("[ ", "["),
    (" ]", "]"),
];

/// Clean up text by decoding markup entities and fixing spacing.
///
/// Total and idempotent on already-clean input.
pub fn clean_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let mut text = decode_entities(text);

    text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    text = PADDED_QUOTE.replace_all(&text, "\"$1\"").into_owned();

    for (from, to) in PUNCTUATION_FIXES {
        if text.contains(from) {
            text = text.replace(from, to);
        }
    }

    text.nfc().collect::<String>().trim().to_string()
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut text = text.to_string();
    for table in [DOUBLE_ESCAPED, NAMED, UNTERMINATED] {
        for (entity, decoded) in table {
            if text.contains(entity) {
                text = text.replace(entity, decoded);
            }
        }
    }

    text = DECIMAL_REF
        .replace_all(&text, |cap: &Captures| decode_code_point(&cap[0], &cap[1], 10))
        .into_owned();
    text = HEX_REF
        .replace_all(&text, |cap: &Captures| decode_code_point(&cap[0], &cap[1], 16))
        .into_owned();

    text.replace("&amp;", "&")
}

fn decode_code_point(original: &str, digits: &str, radix: u32) -> String {
    u32::from_str_radix(digits, radix)
        .ok()
        .and_then(char::from_u32)
        .map(String::from)
        .unwrap_or_else(|| original.to_string())
}

/// Split usage text on `"; "` outside of double-quoted spans.
///
/// Every double quote toggles the quoted state. Leading and trailing
/// semicolons and whitespace are stripped from each clause and empty clauses
/// are dropped.
pub fn split_usage(usage: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = usage.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                current.push(ch);
            }
            ';' if !in_quotes && chars.peek() == Some(&' ') => {
                chars.next();
                push_clause(&mut parts, &current);
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    push_clause(&mut parts, &current);

    parts
}

fn push_clause(parts: &mut Vec<String>, clause: &str) {
    let clause = clause.trim_matches(|c: char| c == ';' || c.is_whitespace());
    if !clause.is_empty() {
        parts.push(clause.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ─────────────────────────────────────────────────────────────
    // clean_text
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn empty_input() {
        assert_eq!(clean_text(""), "");
    }

    #[test]
    fn decodes_named_entities() {
        assert_eq!(clean_text("&quot;hej&quot; &lt;b&gt;"), "\"hej\" <b>");
        assert_eq!(clean_text("it&apos;s"), "it's");
        assert_eq!(clean_text("it&#39;s"), "it's");
    }

    #[test]
    fn decodes_double_escaped_entities() {
        assert_eq!(clean_text("&amp;quot;fika&amp;quot;"), "\"fika\"");
        assert_eq!(clean_text("a&amp;nbsp;b"), "a b");
    }

    #[test]
    fn ampersand_is_decoded_once() {
        assert_eq!(clean_text("salt &amp; peppar"), "salt & peppar");
        assert_eq!(clean_text("&amp;amp;"), "&amp;");
    }

    #[test]
    fn unterminated_quote_entity() {
        assert_eq!(clean_text("&quothej"), "\"hej");
    }

    #[test]
    fn decodes_numeric_references() {
        assert_eq!(clean_text("&#229;r"), "år");
        assert_eq!(clean_text("&#xE4;ta"), "äta");
        assert_eq!(clean_text("&#X2013;"), "–");
    }

    #[test]
    fn invalid_code_point_left_verbatim() {
        assert_eq!(clean_text("&#xD800;"), "&#xD800;");
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(clean_text("  en \t  bil\n"), "en bil");
    }

    #[test]
    fn fixes_punctuation_spacing() {
        assert_eq!(clean_text("ja , nej ."), "ja, nej.");
        assert_eq!(clean_text("( om ) [ sak ]"), "(om) [sak]");
        assert_eq!(clean_text("vad ? nu !"), "vad? nu!");
        assert_eq!(clean_text("se : här ;"), "se: här;");
    }

    #[test]
    fn strips_padding_after_opening_quote() {
        assert_eq!(clean_text("ett \" ord\" till"), "ett \"ord\" till");
    }

    #[test]
    fn cleaning_is_idempotent() {
        let samples = [
            "ta det lugnt",
            "\"hej\" sa hon, (glatt)",
            "inflected form of \"springa\"",
            "kaffe & kaka: [vardagligt]",
            "år, äta, öl",
        ];
        for sample in samples {
            let once = clean_text(sample);
            assert_eq!(once, sample);
            assert_eq!(clean_text(&once), once);
        }
    }

    // ─────────────────────────────────────────────────────────────
    // split_usage
    // ─────────────────────────────────────────────────────────────

    #[test]
    fn split_respects_quotes() {
        assert_eq!(
            split_usage("a; b\"c; d\"; e"),
            vec!["a", "b\"c; d\"", "e"]
        );
    }

    #[test]
    fn split_requires_following_space() {
        assert_eq!(split_usage("a;b; c"), vec!["a;b", "c"]);
    }

    #[test]
    fn split_drops_empty_clauses_and_stray_semicolons() {
        assert_eq!(split_usage("; a; ; b;"), vec!["a", "b"]);
        assert!(split_usage("   ").is_empty());
    }

    #[test]
    fn split_single_clause() {
        assert_eq!(
            split_usage("inflected form of \"spring\""),
            vec!["inflected form of \"spring\""]
        );
    }
}
