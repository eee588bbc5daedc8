//! Boolean text grammar.

const TRUE_WORDS: &[&str] = &["true", "t", "on", "yes", "y", "1"];

/// Parse a boolean token.
///
/// `true`, `t`, `on`, `yes`, `y` and `1` (any case) are true; every other
/// token is false.
pub fn parse_boolean(text: &str) -> bool {
    TRUE_WORDS.iter().any(|w| w.eq_ignore_ascii_case(text))
}

/// Format a boolean as `true` or `false`.
pub fn format_boolean(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_true_words() {
        for word in ["true", "TRUE", "t", "On", "yes", "Y", "1"] {
            assert!(parse_boolean(word), "{} should be true", word);
        }
    }

    #[test]
    fn test_everything_else_is_false() {
        for word in ["false", "f", "0", "no", "", "truth", " true"] {
            assert!(!parse_boolean(word), "{:?} should be false", word);
        }
    }

    #[test]
    fn test_format_parses_back() {
        assert!(parse_boolean(format_boolean(true)));
        assert!(!parse_boolean(format_boolean(false)));
    }
}
