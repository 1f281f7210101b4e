//! Leaf validators: the types that coerce a token directly, without
//! delegating to other nodes.
//!
//! Every option struct has a `DEFAULT` constant so call sites can spell out
//! only what they change:
//!
//! ```
//! use the_args::leaf::IntegerOptions;
//!
//! let port = IntegerOptions {
//!   min: Some(1),
//!   max: Some(65535),
//!   ..IntegerOptions::DEFAULT
//! };
//! assert!(port.validate().is_ok());
//! ```
//!
//! Resolvers and lookups may need to ask something outside the process (a
//! member directory, a permission store), so they return boxed futures:
//!
//! ```
//! use futures_util::FutureExt;
//! use the_args::{
//!   Value,
//!   leaf::Leaf,
//! };
//!
//! let user = Leaf::<Vec<String>>::lookup("user", |raw, users| {
//!   async move { Ok(users.iter().any(|user| user == raw).then(|| Value::from(raw))) }.boxed()
//! });
//! assert_eq!(user.typename(), "user");
//! ```

use std::{
  fmt,
  sync::Arc,
};

use futures_util::{
  FutureExt,
  future::{
    self,
    BoxFuture,
  },
};

use crate::{
  error::{
    AllowedValues,
    CriticalError,
    Error,
    UserError,
  },
  value::Value,
};

/// How many allowed values a [`UserError::NotOneOf`] lists before it
/// switches to the "too many values" placeholder.
pub const MAX_LISTED: usize = 15;

/// A context-aware predicate over the lowercased token.
pub type Resolver<C> = Arc<dyn for<'a> Fn(&'a str, &'a C) -> BoxFuture<'a, bool> + Send + Sync>;

/// Maps a token to a domain value, or `None` when nothing matches. A lookup
/// that cannot run at all (its backing store is gone, say) reports a
/// critical error.
pub type LookupFn<C> = Arc<
  dyn for<'a> Fn(&'a str, &'a C) -> BoxFuture<'a, Result<Option<Value>, CriticalError>>
    + Send
    + Sync,
>;

/// How a rejected token shows the allowed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Listing {
  max:    usize,
  hidden: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntegerOptions {
  /// Radix of the accepted digits, 2 to 36.
  pub radix:       u32,
  /// Accept any token the radix parser accepts, including non-canonical
  /// spellings like `007` or `+5`.
  pub skip_check:  bool,
  pub min:         Option<i64>,
  pub max:         Option<i64>,
  pub one_of:      Option<Vec<i64>>,
  pub max_listed:  usize,
  /// Never reveal `one_of` in error messages.
  pub hide_one_of: bool,
}

impl IntegerOptions {
  pub const DEFAULT: Self = Self {
    radix:       10,
    skip_check:  false,
    min:         None,
    max:         None,
    one_of:      None,
    max_listed:  MAX_LISTED,
    hide_one_of: false,
  };

  pub fn validate(&self) -> Result<(), CriticalError> {
    if !(2..=36).contains(&self.radix) {
      return Err(CriticalError::InvalidRadix(self.radix));
    }
    validate_range(self.min, self.max, self.one_of.as_deref())
  }

  fn parse(&self, raw: &str) -> Option<i64> {
    let n = i64::from_str_radix(raw, self.radix).ok()?;
    if !self.skip_check && !render_radix(n, self.radix).eq_ignore_ascii_case(raw) {
      return None;
    }
    Some(n)
  }

  fn coerce(&self, raw: &str, incorrect: impl FnOnce() -> UserError) -> Result<Value, UserError> {
    let n = self.parse(raw).ok_or_else(incorrect)?;
    check_range(&n, self.min, self.max, self.one_of.as_deref(), Listing {
      max:    self.max_listed,
      hidden: self.hide_one_of,
    })?;
    Ok(Value::Integer(n))
  }
}

impl Default for IntegerOptions {
  fn default() -> Self {
    Self::DEFAULT
  }
}

/// Integers wider than `i64`. Accepts decimal with an optional sign, or an
/// unsigned `0x`, `0o` or `0b` prefixed literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BigIntegerOptions {
  pub min:         Option<i128>,
  pub max:         Option<i128>,
  pub one_of:      Option<Vec<i128>>,
  pub max_listed:  usize,
  pub hide_one_of: bool,
}

impl BigIntegerOptions {
  pub const DEFAULT: Self = Self {
    min:         None,
    max:         None,
    one_of:      None,
    max_listed:  MAX_LISTED,
    hide_one_of: false,
  };

  pub fn validate(&self) -> Result<(), CriticalError> {
    validate_range(self.min, self.max, self.one_of.as_deref())
  }

  fn parse(raw: &str) -> Option<i128> {
    let raw = raw.trim();
    let radix = match raw.get(..2) {
      Some("0x" | "0X") => 16,
      Some("0o" | "0O") => 8,
      Some("0b" | "0B") => 2,
      _ => return raw.parse().ok(),
    };
    let digits = &raw[2..];
    if digits.starts_with(['+', '-']) {
      return None;
    }
    i128::from_str_radix(digits, radix).ok()
  }

  fn coerce(&self, raw: &str, incorrect: impl FnOnce() -> UserError) -> Result<Value, UserError> {
    let n = Self::parse(raw).ok_or_else(incorrect)?;
    check_range(&n, self.min, self.max, self.one_of.as_deref(), Listing {
      max:    self.max_listed,
      hidden: self.hide_one_of,
    })?;
    Ok(Value::BigInteger(n))
  }
}

impl Default for BigIntegerOptions {
  fn default() -> Self {
    Self::DEFAULT
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumberOptions {
  pub include_positive_infinity: bool,
  pub include_negative_infinity: bool,
  pub min:                       Option<f64>,
  pub max:                       Option<f64>,
  pub one_of:                    Option<Vec<f64>>,
  pub max_listed:                usize,
  pub hide_one_of:               bool,
}

impl NumberOptions {
  pub const DEFAULT: Self = Self {
    include_positive_infinity: false,
    include_negative_infinity: false,
    min:                       None,
    max:                       None,
    one_of:                    None,
    max_listed:                MAX_LISTED,
    hide_one_of:               false,
  };

  pub fn validate(&self) -> Result<(), CriticalError> {
    validate_range(self.min, self.max, self.one_of.as_deref())
  }

  fn parse(&self, raw: &str) -> Option<f64> {
    let n: f64 = raw.parse().ok()?;
    let rejected = n.is_nan()
      || (n == f64::INFINITY && !self.include_positive_infinity)
      || (n == f64::NEG_INFINITY && !self.include_negative_infinity);
    (!rejected).then_some(n)
  }

  fn coerce(&self, raw: &str, incorrect: impl FnOnce() -> UserError) -> Result<Value, UserError> {
    let n = self.parse(raw).ok_or_else(incorrect)?;
    check_range(&n, self.min, self.max, self.one_of.as_deref(), Listing {
      max:    self.max_listed,
      hidden: self.hide_one_of,
    })?;
    Ok(Value::Number(n))
  }
}

impl Default for NumberOptions {
  fn default() -> Self {
    Self::DEFAULT
  }
}

/// Length bounds are counted in chars.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringOptions {
  pub one_of:      Option<Vec<String>>,
  pub min_length:  Option<usize>,
  pub max_length:  Option<usize>,
  pub max_listed:  usize,
  pub hide_one_of: bool,
}

impl StringOptions {
  pub const DEFAULT: Self = Self {
    one_of:      None,
    min_length:  None,
    max_length:  None,
    max_listed:  MAX_LISTED,
    hide_one_of: false,
  };

  pub fn validate(&self) -> Result<(), CriticalError> {
    if let (Some(min), Some(max)) = (self.min_length, self.max_length)
      && min > max
    {
      return Err(CriticalError::InvertedBounds {
        min: min.to_string(),
        max: max.to_string(),
      });
    }
    for value in self.one_of.iter().flatten() {
      let len = value.chars().count();
      if let Some(min) = self.min_length
        && len < min
      {
        return Err(CriticalError::OneOfBelowMinLength {
          value: value.clone(),
          min,
        });
      }
      if let Some(max) = self.max_length
        && len > max
      {
        return Err(CriticalError::OneOfAboveMaxLength {
          value: value.clone(),
          max,
        });
      }
    }
    Ok(())
  }

  fn coerce(&self, raw: &str) -> Result<Value, UserError> {
    check_one_of(&raw.to_string(), self.one_of.as_deref(), Listing {
      max:    self.max_listed,
      hidden: self.hide_one_of,
    })?;
    let len = raw.chars().count();
    if let Some(min) = self.min_length
      && len < min
    {
      return Err(UserError::BelowMinLength {
        value: raw.to_string(),
        min,
      });
    }
    if let Some(max) = self.max_length
      && len > max
    {
      return Err(UserError::AboveMaxLength {
        value: raw.to_string(),
        max,
      });
    }
    Ok(Value::String(raw.to_string()))
  }
}

impl Default for StringOptions {
  fn default() -> Self {
    Self::DEFAULT
  }
}

/// Accepted spellings, compared against the lowercased token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BooleanOptions {
  pub truthy: Vec<String>,
  pub falsy:  Vec<String>,
}

impl Default for BooleanOptions {
  fn default() -> Self {
    fn words(words: &[&str]) -> Vec<String> {
      words.iter().map(ToString::to_string).collect()
    }
    Self {
      truthy: words(&["true", "yes", "y", "on", "1"]),
      falsy:  words(&["false", "no", "n", "off", "0"]),
    }
  }
}

impl BooleanOptions {
  fn coerce(&self, raw: &str, incorrect: impl FnOnce() -> UserError) -> Result<Value, UserError> {
    let lower = raw.to_lowercase();
    if self.truthy.contains(&lower) {
      Ok(Value::Bool(true))
    } else if self.falsy.contains(&lower) {
      Ok(Value::Bool(false))
    } else {
      Err(incorrect())
    }
  }
}

pub enum Leaf<C> {
  Integer(IntegerOptions),
  BigInteger(BigIntegerOptions),
  Number(NumberOptions),
  String(StringOptions),
  Boolean(BooleanOptions),
  Resolvable(Resolver<C>),
  Lookup { name: String, lookup: LookupFn<C> },
}

impl<C> fmt::Debug for Leaf<C> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Integer(opts) => f.debug_tuple("Integer").field(opts).finish(),
      Self::BigInteger(opts) => f.debug_tuple("BigInteger").field(opts).finish(),
      Self::Number(opts) => f.debug_tuple("Number").field(opts).finish(),
      Self::String(opts) => f.debug_tuple("String").field(opts).finish(),
      Self::Boolean(opts) => f.debug_tuple("Boolean").field(opts).finish(),
      Self::Resolvable(_) => f.write_str("Resolvable"),
      Self::Lookup { name, .. } => f.debug_struct("Lookup").field("name", name).finish(),
    }
  }
}

impl<C> Leaf<C> {
  pub fn resolvable<F>(resolve: F) -> Self
  where
    F: for<'a> Fn(&'a str, &'a C) -> BoxFuture<'a, bool> + Send + Sync + 'static,
  {
    Self::Resolvable(Arc::new(resolve))
  }

  pub fn lookup<F>(name: impl Into<String>, lookup: F) -> Self
  where
    F: for<'a> Fn(&'a str, &'a C) -> BoxFuture<'a, Result<Option<Value>, CriticalError>>
      + Send
      + Sync
      + 'static,
  {
    Self::Lookup {
      name:   name.into(),
      lookup: Arc::new(lookup),
    }
  }

  pub fn typename(&self) -> &str {
    match self {
      Self::Integer(_) => "integer",
      Self::BigInteger(_) => "big integer",
      Self::Number(_) => "number",
      Self::String(_) => "string",
      Self::Boolean(_) | Self::Resolvable(_) => "boolean",
      Self::Lookup { name, .. } => name.as_str(),
    }
  }

  /// Rejects option sets that can never be satisfied.
  pub fn validate(&self) -> Result<(), CriticalError> {
    match self {
      Self::Integer(opts) => opts.validate(),
      Self::BigInteger(opts) => opts.validate(),
      Self::Number(opts) => opts.validate(),
      Self::String(opts) => opts.validate(),
      Self::Boolean(_) | Self::Resolvable(_) | Self::Lookup { .. } => Ok(()),
    }
  }
}

impl<C: Sync> Leaf<C> {
  /// Coerces one token. Parse failures are reported as
  /// [`UserError::IncorrectType`] naming `typename`.
  pub fn run<'a>(
    &'a self,
    raw: &'a str,
    cx: &'a C,
    typename: &'a str,
  ) -> BoxFuture<'a, Result<Value, Error>> {
    let incorrect = move || {
      UserError::IncorrectType {
        value:    raw.to_string(),
        typename: typename.to_string(),
      }
    };
    let ready = |result: Result<Value, UserError>| future::ready(result.map_err(Error::from)).boxed();

    match self {
      Self::Integer(opts) => ready(opts.coerce(raw, incorrect)),
      Self::BigInteger(opts) => ready(opts.coerce(raw, incorrect)),
      Self::Number(opts) => ready(opts.coerce(raw, incorrect)),
      Self::String(opts) => ready(opts.coerce(raw)),
      Self::Boolean(opts) => ready(opts.coerce(raw, incorrect)),
      Self::Resolvable(resolve) => {
        async move {
          let lower = raw.to_lowercase();
          Ok(Value::Bool(resolve(&lower, cx).await))
        }
        .boxed()
      },
      Self::Lookup { lookup, .. } => {
        async move {
          match lookup(raw, cx).await {
            Ok(Some(value)) => Ok(value),
            Ok(None) => Err(Error::User(incorrect())),
            Err(err) => Err(Error::Critical(err)),
          }
        }
        .boxed()
      },
    }
  }
}

/// Rejects inverted bounds and allowed values outside the bounds.
fn validate_range<T>(
  min: Option<T>,
  max: Option<T>,
  one_of: Option<&[T]>,
) -> Result<(), CriticalError>
where
  T: PartialOrd + fmt::Display + Copy,
{
  if let (Some(min), Some(max)) = (min, max)
    && min > max
  {
    return Err(CriticalError::InvertedBounds {
      min: min.to_string(),
      max: max.to_string(),
    });
  }
  for &value in one_of.unwrap_or_default() {
    if let Some(min) = min
      && value < min
    {
      return Err(CriticalError::OneOfBelowMinimum {
        value: value.to_string(),
        min:   min.to_string(),
      });
    }
    if let Some(max) = max
      && value > max
    {
      return Err(CriticalError::OneOfAboveMaximum {
        value: value.to_string(),
        max:   max.to_string(),
      });
    }
  }
  Ok(())
}

/// Checks the allowed set first, then the minimum, then the maximum.
fn check_range<T>(
  value: &T,
  min: Option<T>,
  max: Option<T>,
  one_of: Option<&[T]>,
  listing: Listing,
) -> Result<(), UserError>
where
  T: PartialOrd + fmt::Display,
{
  check_one_of(value, one_of, listing)?;
  if let Some(min) = min
    && *value < min
  {
    return Err(UserError::BelowMinimum {
      value: value.to_string(),
      min:   min.to_string(),
    });
  }
  if let Some(max) = max
    && *value > max
  {
    return Err(UserError::AboveMaximum {
      value: value.to_string(),
      max:   max.to_string(),
    });
  }
  Ok(())
}

fn check_one_of<T>(value: &T, one_of: Option<&[T]>, listing: Listing) -> Result<(), UserError>
where
  T: PartialEq + fmt::Display,
{
  let Some(one_of) = one_of else {
    return Ok(());
  };
  if one_of.contains(value) {
    return Ok(());
  }
  let values = if listing.hidden {
    AllowedValues::Hidden
  } else if one_of.len() > listing.max {
    AllowedValues::TooMany
  } else {
    AllowedValues::Listed(one_of.iter().map(ToString::to_string).collect())
  };
  Err(UserError::NotOneOf {
    value: value.to_string(),
    values,
    size: one_of.len(),
  })
}

/// Renders `n` in `radix` with lowercase digits, the way the integer parser
/// expects a canonical token to look.
fn render_radix(n: i64, radix: u32) -> String {
  const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

  let radix = u64::from(radix);
  let mut rest = n.unsigned_abs();
  let mut digits = Vec::new();
  loop {
    digits.push(DIGITS[(rest % radix) as usize]);
    rest /= radix;
    if rest == 0 {
      break;
    }
  }
  if n < 0 {
    digits.push(b'-');
  }
  digits.iter().rev().map(|&b| char::from(b)).collect()
}
