//! Turns one input line into typed argument values.
//!
//! A run has two phases. Extraction is sequential: each argument pulls its
//! token from a shared [`CharStream`], so the order of calls matters.
//! Coercion is concurrent: every argument's node runs at the same time and
//! the outcomes are collected in argument order.
//!
//! Every user error of a line is reported at once. When two arguments are
//! invalid the caller gets a [`UserError::Multiple`] holding both. A critical
//! error aborts the run as soon as it happens.

use std::sync::Arc;

use futures_util::future;

use crate::{
  argument::Arguments,
  config::ArgsConfig,
  error::{
    self,
    CriticalError,
    Result,
    UserError,
  },
  extract::{
    Extractor,
    QuoteEscapeExtractor,
    Token,
  },
  node::TypeNode,
  stream::CharStream,
  value::Value,
};

#[derive(Debug, Clone)]
pub struct Pipeline {
  default_extractor:     Arc<dyn Extractor>,
  allow_extra_arguments: bool,
}

impl Default for Pipeline {
  fn default() -> Self {
    Self::new(Arc::new(QuoteEscapeExtractor::default()))
  }
}

impl Pipeline {
  pub fn new(default_extractor: Arc<dyn Extractor>) -> Self {
    Self {
      default_extractor,
      allow_extra_arguments: false,
    }
  }

  pub fn from_config(config: &ArgsConfig) -> Self {
    Self::new(config.extractor()).allow_extra_arguments(config.allow_extra_arguments)
  }

  /// Leave input after the last argument unread instead of rejecting it.
  pub fn allow_extra_arguments(mut self, allow: bool) -> Self {
    self.allow_extra_arguments = allow;
    self
  }

  pub fn default_extractor(&self) -> &Arc<dyn Extractor> {
    &self.default_extractor
  }

  /// Pulls the raw tokens for `args` out of `line` and checks their count.
  ///
  /// Each argument takes one token with its own extractor, or the default
  /// one. The variadic argument keeps taking tokens until the line is
  /// exhausted. Extraction stops at the first exhausted call, so arguments
  /// past that point get no token. Input left after the last argument is
  /// reported as [`UserError::ArgumentsSize`], even when it would not
  /// extract cleanly.
  pub fn extract_raw<C>(&self, args: &Arguments<C>, line: &str) -> Result<Vec<String>> {
    let mut stream = CharStream::new(line);
    let mut raw = Vec::new();
    let mut exhausted = false;

    'specs: for spec in args.specs() {
      let extractor = spec.extractor.as_deref().unwrap_or(&*self.default_extractor);
      loop {
        match extractor.extract(&mut stream)? {
          Token::Arg(arg) => raw.push(arg),
          Token::Done => {
            exhausted = true;
            break 'specs;
          },
        }
        if !spec.is_infinite() {
          break;
        }
      }
    }

    let bounds = args.bounds();
    if !exhausted && !args.is_variadic() && !self.allow_extra_arguments {
      let mut extra = 0;
      loop {
        match self.default_extractor.extract(&mut stream) {
          Ok(Token::Arg(_)) => extra += 1,
          Ok(Token::Done) => break,
          // Malformed trailing input is still one more argument.
          Err(err) => {
            tracing::trace!("stopped counting extra input: {err}");
            extra += 1;
            break;
          },
        }
      }
      if extra > 0 {
        tracing::debug!("{extra} extra argument(s) in {line:?}");
        return Err(
          UserError::ArgumentsSize {
            size: raw.len() + extra,
            min:  bounds.min,
            max:  bounds.max,
          }
          .into(),
        );
      }
    }

    bounds.check(raw.len()).inspect_err(|err| {
      tracing::debug!("rejected {line:?}: {err}");
    })?;
    Ok(raw)
  }

  /// Coerces tokens produced by [`extract_raw`](Self::extract_raw).
  ///
  /// Arguments without a token get their default. A supplied token is
  /// always coerced, so an empty `''` is a value of its own rather than a
  /// missing argument. The variadic argument coerces every remaining token
  /// into a [`Value::List`].
  pub async fn coerce<C: Sync>(
    &self,
    args: &Arguments<C>,
    raw: &[String],
    cx: &C,
  ) -> Result<Vec<Value>> {
    let coercions = args.specs().iter().enumerate().map(|(index, spec)| {
      async move {
        if spec.is_infinite() {
          coerce_variadic(&spec.node, raw.get(index..).unwrap_or_default(), cx).await
        } else {
          let outcome = match raw.get(index) {
            Some(raw) => spec.node.handle_token(raw, cx).await,
            None => spec.node.handle_value(None, cx).await,
          };
          error::capture(outcome)
        }
      }
    });

    let outcomes = future::try_join_all(coercions).await.inspect_err(|err| {
      tracing::debug!("aborted coercion: {err}");
    })?;

    let mut values = Vec::with_capacity(outcomes.len());
    let mut errors = Vec::new();
    for outcome in outcomes {
      match outcome {
        Ok(value) => values.push(value),
        Err(err) => errors.push(err),
      }
    }

    if errors.is_empty() {
      Ok(values)
    } else {
      tracing::debug!("{} argument(s) rejected", errors.len());
      Err(UserError::aggregate(errors).into())
    }
  }

  /// Extracts and coerces the arguments of `line`.
  pub async fn run<C: Sync>(
    &self,
    args: &Arguments<C>,
    line: &str,
    cx: &C,
  ) -> Result<Vec<Value>> {
    let raw = self.extract_raw(args, line)?;
    self.coerce(args, &raw, cx).await
  }

  /// [`run`](Self::run) for synchronous callers.
  pub fn parse_blocking<C: Sync>(
    &self,
    args: &Arguments<C>,
    line: &str,
    cx: &C,
  ) -> Result<Vec<Value>> {
    futures_executor::block_on(self.run(args, line, cx))
  }
}

async fn coerce_variadic<C: Sync>(
  node: &TypeNode<C>,
  raw: &[String],
  cx: &C,
) -> Result<Result<Value, UserError>, CriticalError> {
  if raw.is_empty() {
    return error::capture(node.handle_value(None, cx).await);
  }

  let mut values = Vec::with_capacity(raw.len());
  let mut errors = Vec::new();
  for outcome in node.handle_values(raw, cx).await? {
    match outcome {
      Ok(value) => values.push(value),
      Err(err) => errors.push(err),
    }
  }

  if !errors.is_empty() {
    if !node.options().infinite_ignore_user_errors {
      return Ok(Err(UserError::aggregate(errors)));
    }
    tracing::debug!("dropped {} invalid variadic value(s)", errors.len());
  }
  Ok(Ok(Value::List(values)))
}
