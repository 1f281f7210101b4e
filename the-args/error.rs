//! Error taxonomy for extraction and coercion.
//!
//! Errors fall in two classes:
//!
//! - [`UserError`]: the input was malformed or out of range. These are
//!   recoverable: a node may substitute its default, and the pipeline collects
//!   them so the caller sees every problem of a line at once. Each carries a
//!   message key and named parameters (see [`UserError::key`] and
//!   [`UserError::params`]) for localized rendering.
//! - [`CriticalError`]: the configuration is wrong (a missing default, an
//!   invalid argument ordering, an allowed value outside its own bounds...).
//!   These are never substituted and abort a pipeline run immediately.

use thiserror::Error;

use crate::locale::{
  Param,
  Params,
};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  #[error(transparent)]
  User(#[from] UserError),
  #[error(transparent)]
  Critical(#[from] CriticalError),
}

impl Error {
  pub fn is_user(&self) -> bool {
    matches!(self, Self::User(_))
  }

  pub fn is_critical(&self) -> bool {
    matches!(self, Self::Critical(_))
  }

  pub fn as_user(&self) -> Option<&UserError> {
    match self {
      Self::User(err) => Some(err),
      Self::Critical(_) => None,
    }
  }
}

/// Splits a result so that user errors are captured and critical errors
/// propagate.
pub(crate) fn capture<T>(result: Result<T>) -> Result<Result<T, UserError>, CriticalError> {
  match result {
    Ok(value) => Ok(Ok(value)),
    Err(Error::User(err)) => Ok(Err(err)),
    Err(Error::Critical(err)) => Err(err),
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserError {
  #[error("quoted text must start an argument, found '{text}' before the quote")]
  TextBeforeQuote { text: String },
  #[error("unexpected text after the closing quote of '{text}'")]
  TextAfterQuote { text: String },
  #[error("missing a closing single quote after '{text}'")]
  UnmatchedSingleQuote { text: String },
  #[error("missing a closing double quote after '{text}'")]
  UnmatchedDoubleQuote { text: String },
  #[error("nothing to escape after '{text}\\'")]
  UnmatchedEscape { text: String },
  #[error("'{value}' is not a valid {typename}")]
  IncorrectType { value: String, typename: String },
  #[error("{}", format_not_one_of(.value, .values, *.size))]
  NotOneOf {
    value:  String,
    values: AllowedValues,
    size:   usize,
  },
  #[error("{value} is less than the minimum of {min}")]
  BelowMinimum { value: String, min: String },
  #[error("{value} is more than the maximum of {max}")]
  AboveMaximum { value: String, max: String },
  #[error("'{value}' is shorter than {min} characters")]
  BelowMinLength { value: String, min: usize },
  #[error("'{value}' is longer than {max} characters")]
  AboveMaxLength { value: String, max: usize },
  #[error("'{value}' does not match {typename}")]
  NoAlternativeMatched { value: String, typename: String },
  #[error("{}", format_arguments_size(*.size, *.min, *.max))]
  ArgumentsSize {
    size: usize,
    min:  usize,
    max:  Option<usize>,
  },
  #[error("{}", format_multiple(.errors))]
  Multiple { errors: Vec<UserError> },
  /// An error raised outside of this crate, for example by an inhibitor.
  #[error("{key}")]
  Custom { key: String, params: Params },
}

impl UserError {
  /// Builds an aggregate, or returns the error itself when there is only one.
  pub fn aggregate(mut errors: Vec<UserError>) -> Self {
    if errors.len() == 1 {
      errors.remove(0)
    } else {
      Self::Multiple { errors }
    }
  }

  /// The localization key of the message.
  pub fn key(&self) -> &str {
    match self {
      Self::TextBeforeQuote { .. } => "error.TextBeforeQuote.message",
      Self::TextAfterQuote { .. } => "error.TextAfterQuote.message",
      Self::UnmatchedSingleQuote { .. } => "error.UnmatchedSingleQuote.message",
      Self::UnmatchedDoubleQuote { .. } => "error.UnmatchedDoubleQuote.message",
      Self::UnmatchedEscape { .. } => "error.UnmatchedEscape.message",
      Self::IncorrectType { .. } => "error.IncorrectType.message",
      Self::NotOneOf { .. } => "error.NotOneOf.message",
      Self::BelowMinimum { .. } => "error.BelowMinimum.message",
      Self::AboveMaximum { .. } => "error.AboveMaximum.message",
      Self::BelowMinLength { .. } => "error.BelowMinLength.message",
      Self::AboveMaxLength { .. } => "error.AboveMaxLength.message",
      Self::NoAlternativeMatched { .. } => "error.NoAlternativeMatched.message",
      Self::ArgumentsSize { min, max, .. } => match max {
        None => "error.ArgumentsSize.atLeast",
        Some(max) if max == min => "error.ArgumentsSize.exactly",
        Some(_) => "error.ArgumentsSize.between",
      },
      Self::Multiple { .. } => "error.Multiple.message",
      Self::Custom { key, .. } => key.as_str(),
    }
  }

  /// Named template arguments for the message.
  pub fn params(&self) -> Params {
    let mut params = Params::new();
    match self {
      Self::TextBeforeQuote { text }
      | Self::TextAfterQuote { text }
      | Self::UnmatchedSingleQuote { text }
      | Self::UnmatchedDoubleQuote { text }
      | Self::UnmatchedEscape { text } => {
        params.insert("text", text.as_str());
      },
      Self::IncorrectType { value, typename } | Self::NoAlternativeMatched { value, typename } => {
        params.insert("value", value.as_str());
        params.insert("typename", typename.as_str());
      },
      Self::NotOneOf {
        value,
        values,
        size,
      } => {
        params.insert("value", value.as_str());
        params.insert("values", match values {
          AllowedValues::Listed(values) => Param::from(values.join(", ")),
          AllowedValues::TooMany => Param::Key(NOT_ONE_OF_TOO_MANY.into()),
          AllowedValues::Hidden => Param::Key(NOT_ONE_OF_HIDDEN.into()),
        });
        params.insert("size", size.to_string());
      },
      Self::BelowMinimum { value, min } => {
        params.insert("value", value.as_str());
        params.insert("min", min.as_str());
      },
      Self::AboveMaximum { value, max } => {
        params.insert("value", value.as_str());
        params.insert("max", max.as_str());
      },
      Self::BelowMinLength { value, min } => {
        params.insert("value", value.as_str());
        params.insert("min", min.to_string());
      },
      Self::AboveMaxLength { value, max } => {
        params.insert("value", value.as_str());
        params.insert("max", max.to_string());
      },
      Self::ArgumentsSize { size, min, max } => {
        params.insert("size", size.to_string());
        params.insert("min", min.to_string());
        if let Some(max) = max {
          params.insert("max", max.to_string());
        }
      },
      Self::Multiple { errors } => {
        params.insert("count", errors.len().to_string());
      },
      Self::Custom { params: custom, .. } => return custom.clone(),
    }
    params
  }
}

/// How a [`UserError::NotOneOf`] shows the allowed set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedValues {
  Listed(Vec<String>),
  /// The set is larger than the leaf's listing cap.
  TooMany,
  /// The leaf keeps its allowed set private.
  Hidden,
}

/// Placeholder key rendered in place of an allowed set that is too large.
pub const NOT_ONE_OF_TOO_MANY: &str = "error.NotOneOf.tooMany";
/// Placeholder key rendered in place of a hidden allowed set.
pub const NOT_ONE_OF_HIDDEN: &str = "error.NotOneOf.hidden";

fn format_not_one_of(value: &str, values: &AllowedValues, size: usize) -> String {
  match values {
    AllowedValues::Listed(values) => format!("'{value}' is not one of: {}", values.join(", ")),
    AllowedValues::TooMany => format!("'{value}' is not one of the {size} allowed values"),
    AllowedValues::Hidden => format!("'{value}' is not an allowed value"),
  }
}

fn format_arguments_size(size: usize, min: usize, max: Option<usize>) -> String {
  let plural = |n| if n == 1 { "" } else { "s" };
  let expected = match (min, max) {
    (0, Some(0)) => "no arguments".to_string(),
    (min, Some(max)) if min == max => format!("exactly {min} argument{}", plural(min)),
    (min, Some(max)) => format!("between {min} and {max} arguments"),
    (min, None) => format!("at least {min} argument{}", plural(min)),
  };
  format!("expected {expected}, got {size}")
}

fn format_multiple(errors: &[UserError]) -> String {
  let mut text = String::from("multiple errors occurred:");
  for err in errors {
    text.push_str("\n- ");
    text.push_str(&err.to_string());
  }
  text
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CriticalError {
  #[error("no default value is configured")]
  NoDefault,
  #[error("argument {index} has no default but follows an argument with one")]
  DefaultNotSuffix { index: usize },
  #[error("variadic argument {index} must be the last argument")]
  InfiniteNotLast { index: usize },
  #[error("allowed value {value} is less than the minimum of {min}")]
  OneOfBelowMinimum { value: String, min: String },
  #[error("allowed value {value} is more than the maximum of {max}")]
  OneOfAboveMaximum { value: String, max: String },
  #[error("allowed value '{value}' is shorter than the minimum length of {min}")]
  OneOfBelowMinLength { value: String, min: usize },
  #[error("allowed value '{value}' is longer than the maximum length of {max}")]
  OneOfAboveMaxLength { value: String, max: usize },
  #[error("minimum {min} is greater than maximum {max}")]
  InvertedBounds { min: String, max: String },
  #[error("radix {0} is outside of 2..=36")]
  InvalidRadix(u32),
  #[error("invalid separator pattern: {0}")]
  InvalidSeparator(String),
  #[error("lookup of {name} failed: {reason}")]
  LookupFailed { name: String, reason: String },
  #[error("a union needs at least one alternative")]
  EmptyUnion,
  #[error("a multiple type cannot wrap a variadic type")]
  VariadicInsideMultiple,
}
