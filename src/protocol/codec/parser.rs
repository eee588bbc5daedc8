//! Delimited record tokenizer.
//!
//! A character-at-a-time state machine that splits one record into fields,
//! honouring the enclosure and escape characters of a [`DelimiterSet`]. Parsing
//! stops at the first unescaped, unenclosed line terminator; anything after it
//! is ignored.
//!
//! When the escape and enclosure characters are the same (CSV-style `""`), a
//! doubled enclosure inside an enclosed field is a literal enclosure character.

use crate::error::{Error, Result};

use super::delimiters::DelimiterSet;

/// One field of a parsed record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Field text with enclosure and escapes removed.
    pub value: String,
    /// Field text exactly as it appeared in the input.
    pub raw: String,
    /// Whether the field was enclosed.
    pub enclosed: bool,
}

impl Token {
    /// Returns true if this token is the bare null sentinel.
    ///
    /// The comparison uses the raw input, so an enclosed or escaped sentinel is
    /// a literal value.
    pub fn is_null(&self, sentinel: &str) -> bool {
        !self.enclosed && self.raw == sentinel
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    FieldStart,
    Unenclosed,
    UnenclosedEscape,
    Enclosed,
    EnclosedEscape,
    ExpectDelimiter,
}

/// Split one record into fields.
pub fn tokenize(text: &str, delimiters: &DelimiterSet) -> Result<Vec<Token>> {
    let mut fields = Vec::new();
    let mut state = State::FieldStart;
    let mut value = String::new();
    let mut enclosed = false;
    let mut start = 0;
    let mut terminated = false;

    for (i, c) in text.char_indices() {
        let next = i + c.len_utf8();
        match state {
            State::FieldStart | State::Unenclosed => {
                if state == State::FieldStart && delimiters.enclosed_by == Some(c) {
                    enclosed = true;
                    state = State::Enclosed;
                } else if delimiters.escaped_by == Some(c) {
                    state = State::UnenclosedEscape;
                } else if c == delimiters.field_separator {
                    push_field(&mut fields, &text[start..i], &mut value, &mut enclosed);
                    start = next;
                    state = State::FieldStart;
                } else if c == delimiters.line_terminator {
                    push_field(&mut fields, &text[start..i], &mut value, &mut enclosed);
                    terminated = true;
                    break;
                } else {
                    value.push(c);
                    state = State::Unenclosed;
                }
            }
            State::UnenclosedEscape => {
                value.push(c);
                state = State::Unenclosed;
            }
            State::Enclosed => {
                if delimiters.escaped_by == Some(c) {
                    state = State::EnclosedEscape;
                } else if delimiters.enclosed_by == Some(c) {
                    state = State::ExpectDelimiter;
                } else {
                    value.push(c);
                }
            }
            State::EnclosedEscape => {
                let doubled_quote = delimiters.escaped_by == delimiters.enclosed_by;
                if doubled_quote && Some(c) != delimiters.enclosed_by {
                    // The escape was really the closing enclosure.
                    if c == delimiters.field_separator {
                        push_field(&mut fields, &text[start..i], &mut value, &mut enclosed);
                        start = next;
                        state = State::FieldStart;
                    } else if c == delimiters.line_terminator {
                        push_field(&mut fields, &text[start..i], &mut value, &mut enclosed);
                        terminated = true;
                        break;
                    } else {
                        return Err(unexpected_after_enclosure(c, value.chars().count()));
                    }
                } else {
                    value.push(c);
                    state = State::Enclosed;
                }
            }
            State::ExpectDelimiter => {
                if c == delimiters.field_separator {
                    push_field(&mut fields, &text[start..i], &mut value, &mut enclosed);
                    start = next;
                    state = State::FieldStart;
                } else if c == delimiters.line_terminator {
                    push_field(&mut fields, &text[start..i], &mut value, &mut enclosed);
                    terminated = true;
                    break;
                } else {
                    return Err(unexpected_after_enclosure(c, value.chars().count()));
                }
            }
        }
    }

    if !terminated {
        match state {
            State::Enclosed => {
                return Err(Error::protocol("Unterminated enclosed field at end of record"))
            }
            State::EnclosedEscape if delimiters.escaped_by != delimiters.enclosed_by => {
                return Err(Error::protocol("Unterminated enclosed field at end of record"))
            }
            State::UnenclosedEscape => {
                return Err(Error::protocol("Dangling escape character at end of record"))
            }
            _ => push_field(&mut fields, &text[start..], &mut value, &mut enclosed),
        }
    }

    Ok(fields)
}

fn push_field(fields: &mut Vec<Token>, raw: &str, value: &mut String, enclosed: &mut bool) {
    fields.push(Token {
        value: std::mem::take(value),
        raw: raw.to_string(),
        enclosed: std::mem::replace(enclosed, false),
    });
}

fn unexpected_after_enclosure(c: char, field_len: usize) -> Error {
    Error::protocol(format!(
        "Expected delimiter after enclosed field of {} chars, found {:?}",
        field_len, c
    ))
}
