//! Several values from a single token.

use regex::Regex;

use crate::{
  error::{
    CriticalError,
    Result,
    UserError,
  },
  node::TypeNode,
  value::Value,
};

#[derive(Debug, Clone)]
pub enum Separator {
  Literal(String),
  Pattern(Regex),
}

impl Separator {
  /// Compiles `pattern` as a regular expression separator.
  pub fn pattern(pattern: &str) -> Result<Self, CriticalError> {
    Regex::new(pattern)
      .map(Self::Pattern)
      .map_err(|err| CriticalError::InvalidSeparator(err.to_string()))
  }

  /// Splits `raw`, keeping at most `limit` pieces. Extra pieces are
  /// dropped, not merged into the last one.
  pub fn split<'a>(&self, raw: &'a str, limit: Option<usize>) -> Vec<&'a str> {
    let limit = limit.unwrap_or(usize::MAX);
    match self {
      // An empty separator splits between every char.
      Self::Literal(sep) if sep.is_empty() => {
        raw
          .char_indices()
          .map(|(i, ch)| &raw[i..i + ch.len_utf8()])
          .take(limit)
          .collect()
      },
      Self::Literal(sep) => raw.split(sep.as_str()).take(limit).collect(),
      Self::Pattern(regex) => regex.split(raw).take(limit).collect(),
    }
  }
}

impl Default for Separator {
  fn default() -> Self {
    Self::Literal(" ".to_string())
  }
}

impl From<&str> for Separator {
  fn from(sep: &str) -> Self {
    Self::Literal(sep.to_string())
  }
}

impl From<Regex> for Separator {
  fn from(regex: Regex) -> Self {
    Self::Pattern(regex)
  }
}

#[derive(Debug, Clone, Default)]
pub struct MultipleOptions {
  pub separator:     Separator,
  pub limit:         Option<usize>,
  /// Drop pieces that fail with a user error instead of rejecting the
  /// whole token.
  pub ignore_errors: bool,
}

pub struct Multiple<C> {
  inner:   Box<TypeNode<C>>,
  options: MultipleOptions,
}

impl<C> Multiple<C> {
  pub(crate) fn new(options: MultipleOptions, inner: TypeNode<C>) -> Result<Self, CriticalError> {
    if inner.is_infinite() {
      return Err(CriticalError::VariadicInsideMultiple);
    }
    Ok(Self {
      inner: Box::new(inner),
      options,
    })
  }

  pub fn inner(&self) -> &TypeNode<C> {
    &self.inner
  }

  pub fn options(&self) -> &MultipleOptions {
    &self.options
  }
}

impl<C: Sync> Multiple<C> {
  pub(crate) async fn run(&self, raw: &str, cx: &C) -> Result<Value> {
    let pieces = self.options.separator.split(raw, self.options.limit);
    let outcomes = self.inner.handle_values(&pieces, cx).await?;

    let mut values = Vec::with_capacity(outcomes.len());
    let mut errors = Vec::new();
    for outcome in outcomes {
      match outcome {
        Ok(value) => values.push(value),
        Err(err) => errors.push(err),
      }
    }

    if !errors.is_empty() {
      if !self.options.ignore_errors {
        return Err(UserError::Multiple { errors }.into());
      }
      tracing::debug!("dropped {} of {} values in {raw:?}", errors.len(), pieces.len());
    }
    Ok(Value::List(values))
  }
}
