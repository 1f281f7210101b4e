//! A resumable character cursor over one input line.

use std::iter::FusedIterator;

/// Characters of a single input line, consumed front to back.
///
/// One stream is created per line and handed by reference to every extractor
/// call, so successive calls observe successive tokens. The stream never
/// rewinds.
#[derive(Debug, Clone)]
pub struct CharStream<'a> {
  input: &'a str,
  /// Byte index of the next character to yield.
  pos:   usize,
}

impl<'a> CharStream<'a> {
  pub fn new(input: &'a str) -> Self {
    Self { input, pos: 0 }
  }

  /// Returns the byte index of the next character.
  pub fn pos(&self) -> usize {
    self.pos
  }

  /// Returns the unconsumed remainder of the input.
  pub fn rest(&self) -> &'a str {
    &self.input[self.pos..]
  }

  pub fn is_exhausted(&self) -> bool {
    self.pos >= self.input.len()
  }

  /// Returns the next character without consuming it.
  pub fn peek(&self) -> Option<char> {
    self.rest().chars().next()
  }

  /// Consumes whitespace up to the next non-whitespace character.
  pub fn skip_whitespace(&mut self) {
    while self.peek().is_some_and(char::is_whitespace) {
      self.next();
    }
  }
}

impl Iterator for CharStream<'_> {
  type Item = char;

  fn next(&mut self) -> Option<char> {
    let ch = self.peek()?;
    self.pos += ch.len_utf8();
    Some(ch)
  }
}

impl FusedIterator for CharStream<'_> {}
