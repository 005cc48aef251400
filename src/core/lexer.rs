//! Cursor-based tokenizer for a single line of solution text.
//!
//! Every `read_*`/`expect` operation either advances the cursor and returns
//! `true`, or leaves the lexer untouched and returns `false`. Because
//! [`SolutionLexer`] is `Copy`, callers can also snapshot and restore it.

/// Tokenizer state over one line: the text, the cursor, and the start of the
/// current capture span `[capture_start, position)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolutionLexer<'a> {
    text: &'a str,
    position: usize,
    capture_start: usize,
}

impl<'a> SolutionLexer<'a> {
    pub fn new(text: &'a str) -> Self {
        SolutionLexer {
            text,
            position: 0,
            capture_start: 0,
        }
    }

    /// Byte offset of the cursor.
    pub fn position(&self) -> usize {
        self.position
    }

    /// The character under the cursor, `None` at end of input.
    pub fn current(&self) -> Option<char> {
        self.text[self.position..].chars().next()
    }

    /// Move past the current character and return the new current one.
    pub fn advance(&mut self) -> Option<char> {
        if let Some(c) = self.current() {
            self.position += c.len_utf8();
        }
        self.current()
    }

    /// Skip ASCII letters. Returns whether anything was skipped.
    pub fn skip_letters(&mut self) -> bool {
        self.skip_while(|c| c.is_ascii_alphabetic())
    }

    /// Skip spaces and tabs. Returns whether anything was skipped.
    pub fn skip_whitespace(&mut self) -> bool {
        self.skip_while(|c| c == ' ' || c == '\t')
    }

    fn skip_while(&mut self, pred: impl Fn(char) -> bool) -> bool {
        let start = self.position;
        while let Some(c) = self.current() {
            if !pred(c) {
                break;
            }
            self.position += c.len_utf8();
        }
        self.position != start
    }

    /// Start a new capture at the cursor.
    pub fn clear_capture(&mut self) {
        self.capture_start = self.position;
    }

    /// Text from the capture start up to the cursor.
    pub fn capture(&self) -> &'a str {
        &self.text[self.capture_start..self.position]
    }

    /// Consume `expected` if it is the current character.
    pub fn expect(&mut self, expected: char) -> bool {
        if self.current() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Read a double-quoted string where `""` is an escaped quote.
    ///
    /// The quotes are part of the capture; use [`decode_dos_string`] to get
    /// the value. Fails without moving if the string is not terminated.
    pub fn read_dos_string(&mut self) -> bool {
        if self.current() != Some('"') {
            return false;
        }

        let mut cursor = *self;
        cursor.advance();
        loop {
            match cursor.current() {
                None => return false,
                Some('"') => {
                    if cursor.advance() == Some('"') {
                        cursor.advance();
                        continue;
                    }
                    *self = cursor;
                    return true;
                }
                Some(_) => {
                    cursor.advance();
                }
            }
        }
    }

    /// Advance up to `delimiter`, consuming it too when `include_delimiter`.
    ///
    /// Fails without moving if the delimiter never appears.
    pub fn read_until(&mut self, delimiter: char, include_delimiter: bool) -> bool {
        let mut cursor = *self;
        while let Some(c) = cursor.current() {
            if c == delimiter {
                if include_delimiter {
                    cursor.advance();
                }
                *self = cursor;
                return true;
            }
            cursor.advance();
        }
        false
    }
}

/// Strip the surrounding quotes of a captured DOS string and collapse `""`.
pub fn decode_dos_string(raw: &str) -> Option<String> {
    let inner = raw.strip_prefix('"')?.strip_suffix('"')?;
    Some(inner.replace("\"\"", "\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_letters_and_whitespace() {
        let mut lx = SolutionLexer::new("Project \t(\"x\")");
        assert!(lx.skip_letters());
        assert!(lx.skip_whitespace());
        assert_eq!(lx.current(), Some('('));
        assert!(!lx.skip_letters());
        assert!(!lx.skip_whitespace());
    }

    #[test]
    fn test_read_dos_string_with_escapes() {
        let mut lx = SolutionLexer::new(r#""say ""hi""" rest"#);
        lx.clear_capture();
        assert!(lx.read_dos_string());
        assert_eq!(lx.capture(), r#""say ""hi""""#);
        assert_eq!(decode_dos_string(lx.capture()).unwrap(), r#"say "hi""#);
        assert_eq!(lx.current(), Some(' '));
    }

    #[test]
    fn test_read_dos_string_unterminated_rolls_back() {
        let mut lx = SolutionLexer::new(r#""never closed"#);
        let before = lx;
        assert!(!lx.read_dos_string());
        assert_eq!(lx, before);

        // An escaped quote at the very end does not close the string
        let mut lx = SolutionLexer::new(r#""abc"""#);
        assert!(!lx.read_dos_string());
        assert_eq!(lx.position(), 0);
    }

    #[test]
    fn test_read_dos_string_requires_quote() {
        let mut lx = SolutionLexer::new("abc");
        assert!(!lx.read_dos_string());
        assert_eq!(lx.position(), 0);
    }

    #[test]
    fn test_read_until() {
        let mut lx = SolutionLexer::new("a.txt = a.txt");
        lx.clear_capture();
        assert!(lx.read_until('=', false));
        assert_eq!(lx.capture(), "a.txt ");
        assert_eq!(lx.current(), Some('='));

        let mut lx = SolutionLexer::new("key=value");
        lx.clear_capture();
        assert!(lx.read_until('=', true));
        assert_eq!(lx.capture(), "key=");

        let mut lx = SolutionLexer::new("no delimiter");
        assert!(!lx.read_until('=', false));
        assert_eq!(lx.position(), 0);
    }

    #[test]
    fn test_advance_handles_multibyte() {
        let mut lx = SolutionLexer::new("é=");
        assert_eq!(lx.advance(), Some('='));
        assert_eq!(lx.advance(), None);
        assert_eq!(lx.advance(), None);
    }

    #[test]
    fn test_decode_dos_string_rejects_unquoted() {
        assert_eq!(decode_dos_string("abc"), None);
        assert_eq!(decode_dos_string("\"\"").as_deref(), Some(""));
    }
}
