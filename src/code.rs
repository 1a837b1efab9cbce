use std::borrow::Cow;

const INDENT_SIZE: usize = 2;
const DOC_PREFIX: &str = " * ";
const DEFAULT_COMMENT_WIDTH: usize = 80;

/// A line-oriented text accumulator.
///
/// Lines are stored without terminators. Indentation and line prefixes (such
/// as the ` * ` inside a doc comment) are owned by the buffer and applied to
/// every line appended while they are active.
#[derive(Debug, Clone, PartialEq)]
pub struct Code {
    lines: Vec<String>,
    indent: usize,
    prefixes: Vec<&'static str>,
    comment_width: usize,
}

impl Default for Code {
    fn default() -> Self {
        Self::new()
    }
}

impl Code {
    pub fn new() -> Self {
        Self::with_comment_width(DEFAULT_COMMENT_WIDTH)
    }

    pub fn with_comment_width(comment_width: usize) -> Self {
        Code {
            lines: Vec::new(),
            indent: 0,
            prefixes: Vec::new(),
            comment_width,
        }
    }

    /// A single-line buffer.
    pub fn line(text: impl Into<String>) -> Self {
        let mut code = Code::new();
        code.lines.push(text.into());
        code
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    fn line_start(&self) -> String {
        let mut start: String = self.prefixes.concat();
        start.push_str(&" ".repeat(self.indent));
        start
    }

    /// Appends `line` as a new line. Empty lines carry no prefix.
    pub fn append(&mut self, line: &str) -> &mut Self {
        if line.is_empty() {
            self.lines.push(String::new());
        } else {
            let full = self.line_start() + line;
            self.lines.push(full);
        }
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.append("")
    }

    /// Extends the last line with `text`, starting a line if the buffer is empty.
    pub fn append_inline(&mut self, text: &str) -> &mut Self {
        match self.lines.last_mut() {
            Some(last) => last.push_str(text),
            None => self.lines.push(text.to_string()),
        }
        self
    }

    /// Splices `other` into this buffer.
    ///
    /// With `new_line == false` the first line of `other` continues the
    /// current last line; every following line is re-prefixed with this
    /// buffer's active prefix and indentation.
    pub fn concat(&mut self, other: &Code, new_line: bool) -> &mut Self {
        let mut lines = other.lines.iter();
        if !new_line {
            if let Some(first) = lines.next() {
                self.append_inline(first);
            }
        }
        for line in lines {
            self.append(line);
        }
        self
    }

    /// Emits a `/** ... */` block; lines appended by `body` get the ` * ` prefix.
    pub fn doc_comment<E>(
        &mut self,
        body: impl FnOnce(&mut Code) -> Result<(), E>,
    ) -> Result<&mut Self, E> {
        self.append("/**");
        self.prefixes.push(DOC_PREFIX);
        let result = body(self);
        self.prefixes.pop();
        result?;
        self.append(" */");
        Ok(self)
    }

    /// Opens `{` at the end of the current line, indents the lines produced by
    /// `body`, then closes with `}` on its own line.
    pub fn braced<E>(
        &mut self,
        body: impl FnOnce(&mut Code) -> Result<(), E>,
    ) -> Result<&mut Self, E> {
        self.append_inline("{");
        self.indent += INDENT_SIZE;
        let result = body(self);
        self.indent -= INDENT_SIZE;
        result?;
        self.append("}");
        Ok(self)
    }

    /// Appends `text` as a new line, word-wrapped at the comment width.
    pub fn comment(&mut self, text: &str) -> &mut Self {
        let text = escape_comment_end(text);
        let budget = self
            .comment_width
            .saturating_sub(self.line_start().chars().count());
        let (first, rest) = split_comment(&text, budget);
        self.append(first);
        self.wrap_remainder(rest, 0)
    }

    /// Continues the last line with `text`, wrapping what does not fit onto
    /// new lines indented by `wrap_indent` extra columns.
    pub fn comment_inline(&mut self, text: &str, wrap_indent: usize) -> &mut Self {
        let text = escape_comment_end(text);
        let used = self.lines.last().map_or(0, |l| l.chars().count());
        let (first, rest) = split_comment(&text, self.comment_width.saturating_sub(used));
        self.append_inline(first);
        self.wrap_remainder(rest, wrap_indent)
    }

    fn wrap_remainder(&mut self, mut rest: &str, wrap_indent: usize) -> &mut Self {
        let budget = self
            .comment_width
            .saturating_sub(self.line_start().chars().count() + wrap_indent)
            .max(1);
        let hanging = " ".repeat(wrap_indent);
        while !rest.is_empty() {
            let (line, remainder) = split_comment(rest, budget);
            self.append(&format!("{hanging}{line}"));
            rest = remainder;
        }
        self
    }

    pub fn trim_trailing_blank_lines(&mut self) -> &mut Self {
        while self.lines.last().is_some_and(|l| l.trim().is_empty()) {
            self.lines.pop();
        }
        self
    }

    /// Joins the lines with `\n`, without a trailing terminator.
    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}

/// Rewrites `*/` so free text cannot close the surrounding doc comment.
pub fn escape_comment_end(text: &str) -> Cow<'_, str> {
    if text.contains("*/") {
        Cow::Owned(text.replace("*/", "*\\/"))
    } else {
        Cow::Borrowed(text)
    }
}

/// Splits off at most `max_len` characters of `comment`, breaking at the last
/// space that keeps the line within the limit. Whitespace around the break is
/// dropped.
fn split_comment(comment: &str, max_len: usize) -> (&str, &str) {
    if comment.chars().count() <= max_len {
        return (comment, "");
    }
    let byte_at = |chars: usize| {
        comment
            .char_indices()
            .nth(chars)
            .map_or(comment.len(), |(i, _)| i)
    };
    match comment[..byte_at(max_len + 1)].rfind(' ') {
        Some(space) => (comment[..space].trim_end(), comment[space + 1..].trim_start()),
        None => {
            let (line, rest) = comment.split_at(byte_at(max_len));
            (line, rest.trim_start())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_comment_breaks_at_last_fitting_space() {
        assert_eq!(split_comment("aaa bbb ccc", 7), ("aaa bbb", "ccc"));
        assert_eq!(split_comment("aaa bbb", 7), ("aaa bbb", ""));
        assert_eq!(split_comment("aaaaaaaa", 3), ("aaa", "aaaaa"));
    }

    #[test]
    fn test_split_comment_with_zero_budget_moves_text_down() {
        assert_eq!(split_comment(" rest of it", 0), ("", "rest of it"));
    }

    #[test]
    fn test_split_comment_drops_doubled_spaces() {
        assert_eq!(split_comment("aaa  bbb  ccc", 8), ("aaa  bbb", "ccc"));
        assert_eq!(split_comment("aaa  bbb", 4), ("aaa", "bbb"));
    }

    #[test]
    fn test_wrapped_comment_has_no_stray_whitespace() {
        let mut code = Code::with_comment_width(20);
        code.append("@param {x} y");
        code.comment_inline(" alpha beta  gamma  delta", 4);
        assert_eq!(code.lines(), ["@param {x} y alpha", "    beta  gamma", "    delta"]);
    }

    #[test]
    fn test_comment_text_cannot_close_the_block() {
        assert_eq!(escape_comment_end("a */ b"), "a *\\/ b");
        assert!(matches!(escape_comment_end("plain"), Cow::Borrowed(_)));

        let mut code = Code::new();
        code.doc_comment::<()>(|c| {
            c.comment("Matches */ things.");
            Ok(())
        })
        .unwrap();
        assert_eq!(code.render(), "/**\n * Matches *\\/ things.\n */");
    }

    #[test]
    fn test_doc_comment_prefixes_lines() {
        let mut code = Code::new();
        code.doc_comment::<()>(|c| {
            c.append("@const");
            Ok(())
        })
        .unwrap();
        assert_eq!(code.render(), "/**\n * @const\n */");
    }

    #[test]
    fn test_failed_block_restores_prefix() {
        let mut code = Code::new();
        let result = code.doc_comment(|c| {
            c.append("@const");
            Err("boom")
        });
        assert!(result.is_err());
        code.append("after");
        assert_eq!(code.lines().last().unwrap(), "after");
    }

    #[test]
    fn test_braced_indents_body() {
        let mut code = Code::new();
        code.append("x = ");
        code.braced::<()>(|c| {
            c.append("a: 1,");
            c.append("b: 2");
            Ok(())
        })
        .unwrap();
        assert_eq!(code.render(), "x = {\n  a: 1,\n  b: 2\n}");
    }

    #[test]
    fn test_concat_joins_first_line_and_reprefixes_rest() {
        let mut object = Code::new();
        object
            .braced::<()>(|c| {
                c.append("num: number");
                Ok(())
            })
            .unwrap();

        let mut code = Code::new();
        code.doc_comment::<()>(|c| {
            c.append("@typedef {");
            c.concat(&object, false);
            c.append_inline("}");
            Ok(())
        })
        .unwrap();
        assert_eq!(
            code.render(),
            "/**\n * @typedef {{\n *   num: number\n * }}\n */"
        );
    }

    #[test]
    fn test_comment_wraps_at_width() {
        let mut code = Code::with_comment_width(20);
        code.comment("one two three four five six");
        assert_eq!(code.lines(), ["one two three four", "five six"]);
    }

    #[test]
    fn test_comment_inline_uses_hanging_indent() {
        let mut code = Code::with_comment_width(20);
        code.append("@param {x} y");
        code.comment_inline(" alpha beta gamma delta", 4);
        assert_eq!(code.lines(), ["@param {x} y alpha", "    beta gamma delta"]);
    }

    #[test]
    fn test_trim_trailing_blank_lines() {
        let mut code = Code::new();
        code.append("a").blank().blank();
        code.trim_trailing_blank_lines();
        assert_eq!(code.render(), "a");
    }
}
