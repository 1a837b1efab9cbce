//! Removes `//` and `/* */` comments from JSON schema text.
//!
//! Comments are overwritten with spaces rather than deleted, so every byte
//! offset in the stripped text matches the input and `serde_json`
//! positions can be reported against the file the user wrote.

use crate::error::SchemaError;
use miette::NamedSource;

pub struct CommentStripper<'a> {
    input: &'a str,
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    position: usize,
    output: String,
}

impl<'a> CommentStripper<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.chars().peekable(),
            position: 0,
            output: String::with_capacity(input.len()),
        }
    }

    /// Consumes the stripper and returns the comment-free text.
    ///
    /// # Errors
    /// Returns `SchemaError::UnterminatedComment` if a `/*` is never closed.
    pub fn strip(mut self, file_name: &str) -> Result<String, SchemaError> {
        while let Some(c) = self.advance() {
            match c {
                '"' => {
                    self.output.push(c);
                    self.copy_string();
                }
                '/' if self.peek() == Some(&'/') => {
                    self.advance();
                    self.blank_out("//");
                    self.skip_line_comment();
                }
                '/' if self.peek() == Some(&'*') => {
                    let start = self.position - 1;
                    self.advance();
                    self.blank_out("/*");
                    if !self.skip_block_comment() {
                        return Err(SchemaError::UnterminatedComment {
                            src: NamedSource::new(file_name, self.input.to_string()),
                            span: (start, 2).into(),
                        });
                    }
                }
                _ => self.output.push(c),
            }
        }
        Ok(self.output)
    }

    fn advance(&mut self) -> Option<char> {
        let char = self.chars.next();
        if let Some(c) = char {
            self.position += c.len_utf8();
        }
        char
    }

    fn peek(&mut self) -> Option<&char> {
        self.chars.peek()
    }

    fn blank_out(&mut self, text: &str) {
        for c in text.chars() {
            if c == '\n' {
                self.output.push('\n');
            } else {
                self.output.extend(std::iter::repeat(' ').take(c.len_utf8()));
            }
        }
    }

    fn copy_string(&mut self) {
        while let Some(c) = self.advance() {
            self.output.push(c);
            match c {
                '\\' => {
                    if let Some(escaped) = self.advance() {
                        self.output.push(escaped);
                    }
                }
                '"' => return,
                _ => {}
            }
        }
    }

    fn skip_line_comment(&mut self) {
        while let Some(c) = self.peek() {
            if *c == '\n' {
                break;
            }
            let c = *c;
            self.advance();
            self.blank_out(c.encode_utf8(&mut [0; 4]));
        }
    }

    /// Returns `false` if the input ends before `*/`.
    fn skip_block_comment(&mut self) -> bool {
        while let Some(c) = self.advance() {
            if c == '*' && self.peek() == Some(&'/') {
                self.advance();
                self.blank_out("*/");
                return true;
            }
            self.blank_out(c.encode_utf8(&mut [0; 4]));
        }
        false
    }
}

/// Convenience wrapper around [`CommentStripper`].
///
/// # Errors
/// Returns `SchemaError::UnterminatedComment` if a `/*` is never closed.
pub fn strip_comments(input: &str, file_name: &str) -> Result<String, SchemaError> {
    CommentStripper::new(input).strip(file_name)
}
