//! Tokenizer for mustache-style tags.
//!
//! The tokenizer splits source text into literal text and tags. Delimiter
//! changes (`{{=<% %>=}}`) are handled here, since they change how the rest
//! of the input is scanned; they produce no token.

use crate::ast::{DEFAULT_END_DELIMITER, DEFAULT_START_DELIMITER};
use crate::error::SyntaxError;

/// The opening and closing markers of a tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Delimiters {
    pub start: String,
    pub end: String,
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            start: DEFAULT_START_DELIMITER.to_string(),
            end: DEFAULT_END_DELIMITER.to_string(),
        }
    }
}

/// What a tag does, decided by its sigil.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TagKind {
    /// `#name`
    Section,
    /// `^name`, or `^` alone for an else-branch.
    Inverted,
    /// `/name`
    Close,
    /// `>path`
    Partial,
    /// `!text`
    Comment,
    /// `name`
    Escaped,
    /// `{name}`
    Triple,
    /// `&name`
    Ampersand,
}

/// Token types produced by the tokenizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token<'a> {
    /// Plain text content.
    Text(&'a str),
    /// A tag, with its sigil stripped and its content trimmed.
    Tag {
        kind: TagKind,
        content: &'a str,
        /// 1-based line and column of the opening delimiter.
        position: (usize, usize),
        /// Delimiters active when the tag was read.
        delimiters: Delimiters,
    },
}

/// Tokenizer for mustache-style tags.
pub(crate) struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    delimiters: Delimiters,
    failed: bool,
}

impl<'a> Tokenizer<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Self::with_delimiters(input, Delimiters::default())
    }

    pub(crate) fn with_delimiters(input: &'a str, delimiters: Delimiters) -> Self {
        Self {
            input,
            pos: 0,
            delimiters,
            failed: false,
        }
    }

    /// Converts a byte offset into a 1-based line and column.
    fn line_column(&self, offset: usize) -> (usize, usize) {
        let before = &self.input[..offset];
        let line = before.matches('\n').count() + 1;
        let column = before
            .rsplit('\n')
            .next()
            .map_or(0, |last| last.chars().count())
            + 1;
        (line, column)
    }

    /// Reads the tag starting at the current position.
    ///
    /// Returns `None` for delimiter changes.
    fn tag(&mut self) -> Result<Option<Token<'a>>, SyntaxError> {
        let input = self.input;
        let open = self.pos;
        let position = self.line_column(open);
        let mut content_start = open + self.delimiters.start.len();

        let triple = self.delimiters.start == DEFAULT_START_DELIMITER
            && input[content_start..].starts_with('{');
        let closing = if triple {
            content_start += 1;
            format!("}}{}", self.delimiters.end)
        } else {
            self.delimiters.end.clone()
        };

        let Some(len) = input[content_start..].find(closing.as_str()) else {
            return Err(SyntaxError::parse("unclosed tag", position));
        };
        let inner = &input[content_start..content_start + len];
        self.pos = content_start + len + closing.len();

        let delimiters = self.delimiters.clone();
        if triple {
            return Ok(Some(Token::Tag {
                kind: TagKind::Triple,
                content: inner.trim(),
                position,
                delimiters,
            }));
        }

        let trimmed = inner.trim();
        let (kind, content) = match trimmed.chars().next() {
            Some('#') => (TagKind::Section, trimmed[1..].trim()),
            Some('^') => (TagKind::Inverted, trimmed[1..].trim()),
            Some('/') => (TagKind::Close, trimmed[1..].trim()),
            Some('>') => (TagKind::Partial, trimmed[1..].trim()),
            Some('&') => (TagKind::Ampersand, trimmed[1..].trim()),
            Some('!') => {
                let bang = inner.find('!').unwrap_or(0);
                (TagKind::Comment, &inner[bang + 1..])
            }
            Some('=') => {
                self.delimiters = parse_delimiters(trimmed).ok_or_else(|| {
                    SyntaxError::parse("invalid delimiter change", position)
                })?;
                return Ok(None);
            }
            _ => (TagKind::Escaped, trimmed),
        };

        Ok(Some(Token::Tag {
            kind,
            content,
            position,
            delimiters,
        }))
    }
}

/// Parses the body of `{{=start end=}}`.
fn parse_delimiters(tag: &str) -> Option<Delimiters> {
    let inner = tag.strip_prefix('=')?.strip_suffix('=')?;
    let mut parts = inner.split_whitespace();
    let start = parts.next()?;
    let end = parts.next()?;
    if parts.next().is_some() || start.contains('=') || end.contains('=') {
        return None;
    }
    Some(Delimiters {
        start: start.to_string(),
        end: end.to_string(),
    })
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Result<Token<'a>, SyntaxError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.failed || self.pos >= self.input.len() {
                return None;
            }

            let remaining = &self.input[self.pos..];
            match remaining.find(self.delimiters.start.as_str()) {
                None => {
                    self.pos = self.input.len();
                    return Some(Ok(Token::Text(remaining)));
                }
                Some(offset) if offset > 0 => {
                    self.pos += offset;
                    return Some(Ok(Token::Text(&remaining[..offset])));
                }
                Some(_) => match self.tag() {
                    Ok(Some(token)) => return Some(Ok(token)),
                    Ok(None) => continue,
                    Err(err) => {
                        self.failed = true;
                        return Some(Err(err));
                    }
                },
            }
        }
    }
}
