//! Extractors pull successive raw tokens out of a [`CharStream`].
//!
//! An extractor is called once per argument with the same stream. Each call
//! skips leading whitespace, consumes exactly one token (plus the whitespace
//! character that ended it) and returns it, or returns [`Token::Done`] once
//! the stream holds nothing but whitespace.
//!
//! # Quoting rules of [`QuoteEscapeExtractor`]
//!
//! | Syntax | Behavior |
//! |--------|----------|
//! | `foo` | Unquoted, split on whitespace |
//! | `'foo bar'` | Single-quoted, whitespace is kept |
//! | `"foo bar"` | Double-quoted, whitespace is kept |
//! | `\x` | Escaped, `x` is taken literally (including whitespace and quotes) |
//!
//! A quoted span must start its token and nothing may follow its closing
//! quote: `a'b'` fails with [`UserError::TextBeforeQuote`] and `'a'b` with
//! [`UserError::TextAfterQuote`]. The other quote character is literal inside
//! a span (`"it's"` is `it's`). Escapes work inside spans too.

use std::fmt;

use serde::{
  Deserialize,
  Serialize,
};

use crate::{
  error::UserError,
  stream::CharStream,
};

/// The result of one extractor call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
  /// A raw token. May be empty, for example for the input `''`.
  Arg(String),
  /// The stream is exhausted. Every later call returns `Done` as well.
  Done,
}

impl Token {
  pub fn is_done(&self) -> bool {
    matches!(self, Self::Done)
  }

  pub fn into_arg(self) -> Option<String> {
    match self {
      Self::Arg(arg) => Some(arg),
      Self::Done => None,
    }
  }
}

/// A strategy for pulling the next raw token out of a stream.
///
/// Implementations hold configuration only. All per-token state lives inside
/// a single `extract` call, so one extractor may be shared by any number of
/// streams and threads.
pub trait Extractor: fmt::Debug + Send + Sync {
  fn extract(&self, stream: &mut CharStream<'_>) -> Result<Token, UserError>;
}

/// Extracts every token of `input`.
pub fn extract_all(extractor: &dyn Extractor, input: &str) -> Result<Vec<String>, UserError> {
  let mut stream = CharStream::new(input);
  let mut tokens = Vec::new();
  while let Token::Arg(arg) = extractor.extract(&mut stream)? {
    tokens.push(arg);
  }
  Ok(tokens)
}

/// Splits on whitespace. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicExtractor;

impl Extractor for BasicExtractor {
  fn extract(&self, stream: &mut CharStream<'_>) -> Result<Token, UserError> {
    stream.skip_whitespace();
    if stream.is_exhausted() {
      return Ok(Token::Done);
    }

    let mut arg = String::new();
    for ch in stream.by_ref() {
      if ch.is_whitespace() {
        break;
      }
      arg.push(ch);
    }

    tracing::trace!("extracted token {arg:?}");
    Ok(Token::Arg(arg))
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quote {
  Single,
  Double,
}

impl Quote {
  pub const fn char(&self) -> char {
    match self {
      Self::Single => '\'',
      Self::Double => '"',
    }
  }
}

/// Switches for the quote/escape extractor. A disabled character is taken
/// literally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct QuoteEscapeOptions {
  pub disable_single_quote: bool,
  pub disable_double_quote: bool,
  pub disable_escape:       bool,
}

impl QuoteEscapeOptions {
  pub const DEFAULT: Self = Self {
    disable_single_quote: false,
    disable_double_quote: false,
    disable_escape:       false,
  };

  pub const fn is_disabled(&self, quote: Quote) -> bool {
    match quote {
      Quote::Single => self.disable_single_quote,
      Quote::Double => self.disable_double_quote,
    }
  }
}

/// Splits on whitespace while honoring single quotes, double quotes and
/// backslash escapes. See the [module docs](self) for the rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuoteEscapeExtractor {
  options: QuoteEscapeOptions,
}

impl QuoteEscapeExtractor {
  pub const fn new(options: QuoteEscapeOptions) -> Self {
    Self { options }
  }

  pub fn options(&self) -> &QuoteEscapeOptions {
    &self.options
  }
}

impl Extractor for QuoteEscapeExtractor {
  fn extract(&self, stream: &mut CharStream<'_>) -> Result<Token, UserError> {
    stream.skip_whitespace();
    if stream.is_exhausted() {
      return Ok(Token::Done);
    }

    let mut state = QuoteState::default();
    for ch in stream.by_ref() {
      match ch {
        ch if ch.is_whitespace() => {
          if !(state.is_quoted() || state.escaped) {
            break;
          }
          state.push(ch)?;
        },
        '\\' => state.escape(&self.options)?,
        '\'' => state.quote(Quote::Single, &self.options)?,
        '"' => state.quote(Quote::Double, &self.options)?,
        ch => state.push(ch)?,
      }
    }

    let arg = state.finish()?;
    tracing::trace!("extracted token {arg:?}");
    Ok(Token::Arg(arg))
  }
}

/// Per-token state of the quote/escape extractor.
///
/// At most one of `single_quoted` and `double_quoted` is set. Once a quoted
/// span closes, `was_quoted` stays set for the rest of the token.
#[derive(Debug, Default)]
struct QuoteState {
  single_quoted: bool,
  double_quoted: bool,
  was_quoted:    bool,
  escaped:       bool,
  result:        String,
}

impl QuoteState {
  fn is_quoted(&self) -> bool {
    self.single_quoted || self.double_quoted
  }

  fn is_open(&self, quote: Quote) -> bool {
    match quote {
      Quote::Single => self.single_quoted,
      Quote::Double => self.double_quoted,
    }
  }

  fn set_open(&mut self, quote: Quote, open: bool) {
    match quote {
      Quote::Single => self.single_quoted = open,
      Quote::Double => self.double_quoted = open,
    }
  }

  /// Appends a literal character.
  fn push(&mut self, ch: char) -> Result<(), UserError> {
    if self.was_quoted {
      return Err(UserError::TextAfterQuote {
        text: self.result.clone(),
      });
    }
    self.escaped = false;
    self.result.push(ch);
    Ok(())
  }

  fn escape(&mut self, options: &QuoteEscapeOptions) -> Result<(), UserError> {
    if self.escaped || options.disable_escape {
      return self.push('\\');
    }
    self.escaped = true;
    Ok(())
  }

  fn quote(&mut self, quote: Quote, options: &QuoteEscapeOptions) -> Result<(), UserError> {
    let other = match quote {
      Quote::Single => Quote::Double,
      Quote::Double => Quote::Single,
    };
    if self.escaped || self.is_open(other) || options.is_disabled(quote) {
      return self.push(quote.char());
    }

    if self.is_open(quote) {
      self.set_open(quote, false);
      self.was_quoted = true;
      return Ok(());
    }

    if !self.result.is_empty() {
      return Err(UserError::TextBeforeQuote {
        text: self.result.clone(),
      });
    }
    if self.was_quoted {
      return Err(UserError::TextAfterQuote {
        text: self.result.clone(),
      });
    }
    self.set_open(quote, true);
    Ok(())
  }

  /// Validates the state at the end of the stream.
  fn finish(self) -> Result<String, UserError> {
    let text = self.result;
    if self.single_quoted {
      Err(UserError::UnmatchedSingleQuote { text })
    } else if self.double_quoted {
      Err(UserError::UnmatchedDoubleQuote { text })
    } else if self.escaped {
      Err(UserError::UnmatchedEscape { text })
    } else {
      Ok(text)
    }
  }
}
