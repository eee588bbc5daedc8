//! Delimiter configuration for the text codec.

/// Separators, enclosure and escape characters for delimited text records.
///
/// # Example
///
/// ```rust
/// use sql_record_rs::DelimiterSet;
///
/// let tsv = DelimiterSet::default()
///     .with_field_separator('\t')
///     .with_escaped_by('\\');
/// assert_eq!(tsv.field_separator, '\t');
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DelimiterSet {
    /// Character between fields.
    pub field_separator: char,
    /// Character ending a record.
    pub line_terminator: char,
    /// Character enclosing a field, if any.
    pub enclosed_by: Option<char>,
    /// Escape character, if any.
    pub escaped_by: Option<char>,
    /// Enclose every field rather than only those containing delimiters.
    pub enclose_required: bool,
}

impl DelimiterSet {
    /// Create a delimiter set with every setting explicit.
    pub fn new(
        field_separator: char,
        line_terminator: char,
        enclosed_by: Option<char>,
        escaped_by: Option<char>,
        enclose_required: bool,
    ) -> Self {
        Self {
            field_separator,
            line_terminator,
            enclosed_by,
            escaped_by,
            enclose_required,
        }
    }

    /// MySQL `mysqldump`-compatible delimiters: `,` `\n`, optionally enclosed
    /// by `'`, escaped by `\`.
    pub fn mysql() -> Self {
        Self::new(',', '\n', Some('\''), Some('\\'), false)
    }

    /// Set the field separator.
    pub fn with_field_separator(mut self, c: char) -> Self {
        self.field_separator = c;
        self
    }

    /// Set the line terminator.
    pub fn with_line_terminator(mut self, c: char) -> Self {
        self.line_terminator = c;
        self
    }

    /// Set the enclosing character.
    pub fn with_enclosed_by(mut self, c: char) -> Self {
        self.enclosed_by = Some(c);
        self
    }

    /// Set the escape character.
    pub fn with_escaped_by(mut self, c: char) -> Self {
        self.escaped_by = Some(c);
        self
    }

    /// Require enclosing on every field.
    pub fn with_enclose_required(mut self, required: bool) -> Self {
        self.enclose_required = required;
        self
    }

    /// Returns true if `c` is the field separator or line terminator.
    pub fn is_delimiter(&self, c: char) -> bool {
        c == self.field_separator || c == self.line_terminator
    }
}

impl Default for DelimiterSet {
    fn default() -> Self {
        Self::new(',', '\n', None, None, false)
    }
}
