//! Identifier derivation from arbitrary column names.
//!
//! Column names come straight from the catalog or the user and may contain
//! spaces, punctuation or non-ASCII letters. Generated field identifiers must
//! match `[A-Za-z_][A-Za-z0-9_]*` and must not be reserved words.

/// Words that cannot be used as field identifiers.
pub const RESERVED_WORDS: &[&str] = &[
    "_", "abstract", "as", "async", "await", "become", "box", "break", "const", "continue",
    "crate", "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if",
    "impl", "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv",
    "pub", "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true", "try",
    "type", "typeof", "union", "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

/// Check if a word is reserved.
pub fn is_reserved_word(word: &str) -> bool {
    RESERVED_WORDS.contains(&word)
}

/// Check if a string already is a legal, non-reserved identifier.
pub fn is_valid_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if is_identifier_start(c) => {}
        _ => return false,
    }
    chars.all(is_identifier_part) && !is_reserved_word(s)
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_identifier_part(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Coerce a candidate name into an identifier that is legal and similar to it.
///
/// Whitespace is dropped, other illegal characters become `_`, a leading digit
/// gets a `_` in front, and reserved words are prefixed with `_`
/// (`class` -> `_class`, `2nd col` -> `_2ndcol`, `first-name` -> `first_name`).
pub fn sanitize(candidate: &str) -> String {
    let mut out = String::with_capacity(candidate.len() + 1);
    for c in candidate.chars() {
        let first = out.is_empty();
        if first && is_identifier_start(c) {
            out.push(c);
        } else if !first && is_identifier_part(c) {
            out.push(c);
        } else if first && is_identifier_part(c) {
            // Legal inside an identifier, just not at its start.
            out.push('_');
            out.push(c);
        } else if c.is_whitespace() {
            continue;
        } else {
            out.push('_');
        }
    }

    if out.is_empty() {
        out.push('_');
    }

    if is_reserved_word(&out) {
        return format!("_{}", out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_sanitize_plain_names() {
        assert_eq!(sanitize("id"), "id");
        assert_eq!(sanitize("START_DATE"), "START_DATE");
        assert_eq!(sanitize("_private"), "_private");
    }

    #[test]
    fn test_sanitize_leading_digit() {
        assert_eq!(sanitize("2nd"), "_2nd");
        assert_eq!(sanitize("1"), "_1");
    }

    #[test]
    fn test_sanitize_whitespace_and_punctuation() {
        assert_eq!(sanitize("first name"), "firstname");
        assert_eq!(sanitize("  padded  "), "padded");
        assert_eq!(sanitize("first-name"), "first_name");
        assert_eq!(sanitize("a.b$c"), "a_b_c");
        assert_eq!(sanitize("-x"), "_x");
        assert_eq!(sanitize("café"), "caf_");
    }

    #[test]
    fn test_sanitize_reserved() {
        assert_eq!(sanitize("type"), "_type");
        assert_eq!(sanitize("match"), "_match");
        assert_eq!(sanitize("Self"), "_Self");
        // Not reserved once the case differs.
        assert_eq!(sanitize("TYPE"), "TYPE");
    }

    #[test]
    fn test_sanitize_degenerate() {
        assert_eq!(sanitize(""), "__");
        assert_eq!(sanitize("   "), "__");
        assert_eq!(sanitize("_"), "__");
        assert_eq!(sanitize("$"), "__");
    }

    #[test]
    fn test_is_valid_identifier() {
        assert!(is_valid_identifier("abc_1"));
        assert!(!is_valid_identifier("1abc"));
        assert!(!is_valid_identifier("fn"));
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("a b"));
    }

    proptest! {
        #[test]
        fn sanitized_names_are_valid_identifiers(s in any::<String>()) {
            let id = sanitize(&s);
            prop_assert!(is_valid_identifier(&id), "{:?} -> {:?}", s, id);
        }

        #[test]
        fn sanitize_is_deterministic(s in ".{0,24}") {
            prop_assert_eq!(sanitize(&s), sanitize(&s));
        }

        #[test]
        fn valid_identifiers_are_unchanged(s in "[A-Za-z][A-Za-z0-9_]{0,12}") {
            prop_assume!(!is_reserved_word(&s));
            prop_assert_eq!(sanitize(&s), s);
        }
    }
}
