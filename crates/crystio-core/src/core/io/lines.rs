//! Line-oriented substrate shared by the text format handlers.
//!
//! Input text is split into [`Line`] values, each remembering its 1-based line number,
//! the raw text and its whitespace tokens. Lines are only classified here; every
//! handler decides for itself whether blank and comment lines are skipped, kept or
//! rejected.

use super::error::FormatError;
use std::str::FromStr;

/// Classification of a single input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// No tokens at all.
    Blank,
    /// First token starts with `#`.
    Comment,
    /// Anything else.
    Record,
}

/// One physical input line with its position in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line<'a> {
    /// One-based line number in the source text.
    pub number: usize,
    /// Line content without the terminator.
    pub text: &'a str,
    /// Whitespace-separated tokens of `text`.
    pub tokens: Vec<&'a str>,
}

impl<'a> Line<'a> {
    pub fn new(number: usize, text: &'a str) -> Self {
        let text = text.strip_suffix('\r').unwrap_or(text);
        Self {
            number,
            text,
            tokens: text.split_whitespace().collect(),
        }
    }

    pub fn kind(&self) -> LineKind {
        match self.tokens.first() {
            None => LineKind::Blank,
            Some(first) if first.starts_with('#') => LineKind::Comment,
            Some(_) => LineKind::Record,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Tokens obtained after treating commas as whitespace.
    pub fn comma_tokens(&self) -> Vec<&'a str> {
        self.text
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
            .collect()
    }

    /// Text following the first token, trimmed on both sides.
    ///
    /// Inner spacing is preserved, so `"title  Ni  FCC"` yields `"Ni  FCC"`.
    pub fn rest_after_keyword(&self) -> &'a str {
        let trimmed = self.text.trim_start();
        match trimmed.find(char::is_whitespace) {
            Some(pos) => trimmed[pos..].trim(),
            None => "",
        }
    }

    /// Builds a [`FormatError`] pointing at this line.
    pub fn error(&self, message: impl Into<String>) -> FormatError {
        FormatError::at(self.number, message)
    }

    /// Parses one token as a number, failing with a line-numbered error.
    pub fn parse<T: FromStr>(&self, token: &str) -> Result<T, FormatError> {
        token
            .parse()
            .map_err(|_| self.error("invalid number format"))
    }
}

/// Splits text into lines numbered from 1.
///
/// A trailing line terminator does not produce an extra empty line.
pub fn split_lines(text: &str) -> Vec<Line<'_>> {
    text.lines()
        .enumerate()
        .map(|(idx, line)| Line::new(idx + 1, line))
        .collect()
}

/// Fails if a free-text field would span more than one output line.
pub fn ensure_single_line(field: &str, value: &str) -> Result<(), FormatError> {
    if value.contains(['\n', '\r']) {
        return Err(FormatError::new(format!(
            "{} must not contain line breaks",
            field
        )));
    }
    Ok(())
}

/// Fails if an element symbol would not read back as the first token of an atom record.
pub fn ensure_element_token(index: usize, element: &str) -> Result<(), FormatError> {
    let malformed = element.is_empty()
        || element.starts_with('#')
        || element.contains(|c: char| c.is_whitespace() || c == ',');
    if malformed {
        return Err(FormatError::new(format!(
            "invalid element symbol '{}' for atom {}",
            element, index
        )));
    }
    Ok(())
}
