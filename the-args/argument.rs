//! Positional argument declarations.

use std::{
  fmt,
  sync::Arc,
};

use crate::{
  error::{
    CriticalError,
    UserError,
  },
  extract::Extractor,
  node::TypeNode,
};

/// One positional argument: the node that coerces it and, optionally, the
/// extractor that pulls its token. Without an extractor the pipeline's
/// default one is used.
pub struct ArgumentSpec<C> {
  pub node:      TypeNode<C>,
  pub extractor: Option<Arc<dyn Extractor>>,
}

impl<C> ArgumentSpec<C> {
  pub fn new(node: TypeNode<C>) -> Self {
    Self {
      node,
      extractor: None,
    }
  }

  pub fn with_extractor(mut self, extractor: Arc<dyn Extractor>) -> Self {
    self.extractor = Some(extractor);
    self
  }

  pub fn has_default(&self) -> bool {
    self.node.has_default()
  }

  pub fn is_infinite(&self) -> bool {
    self.node.is_infinite()
  }
}

impl<C> From<TypeNode<C>> for ArgumentSpec<C> {
  fn from(node: TypeNode<C>) -> Self {
    Self::new(node)
  }
}

impl<C> fmt::Debug for ArgumentSpec<C> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ArgumentSpec")
      .field("node", &self.node)
      .field("extractor", &self.extractor)
      .finish()
  }
}

/// The minimum and (optionally) maximum number of tokens an argument list
/// accepts. `max` is `None` when the last argument is variadic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArityBounds {
  pub min: usize,
  pub max: Option<usize>,
}

impl ArityBounds {
  pub fn contains(&self, count: usize) -> bool {
    self.min <= count && self.max.unwrap_or(usize::MAX) >= count
  }

  /// Fails with [`UserError::ArgumentsSize`] when `count` is out of bounds.
  pub fn check(&self, count: usize) -> Result<(), UserError> {
    if self.contains(count) {
      Ok(())
    } else {
      Err(UserError::ArgumentsSize {
        size: count,
        min:  self.min,
        max:  self.max,
      })
    }
  }
}

/// A validated, ordered list of argument specs.
///
/// Defaults form a suffix: once an argument has a default, every later one
/// has one too. At most one argument is variadic and it comes last.
pub struct Arguments<C> {
  specs:  Vec<ArgumentSpec<C>>,
  bounds: ArityBounds,
}

impl<C> Arguments<C> {
  pub fn new(specs: Vec<ArgumentSpec<C>>) -> Result<Self, CriticalError> {
    let mut first_default = None;
    for (index, spec) in specs.iter().enumerate() {
      if spec.has_default() {
        first_default.get_or_insert(index);
      } else if first_default.is_some() {
        return Err(CriticalError::DefaultNotSuffix { index });
      }
      if spec.is_infinite() && index + 1 != specs.len() {
        return Err(CriticalError::InfiniteNotLast { index });
      }
    }

    let variadic = specs.last().is_some_and(ArgumentSpec::is_infinite);
    let bounds = ArityBounds {
      min: first_default.unwrap_or(specs.len()),
      max: (!variadic).then_some(specs.len()),
    };
    Ok(Self { specs, bounds })
  }

  pub fn specs(&self) -> &[ArgumentSpec<C>] {
    &self.specs
  }

  pub fn bounds(&self) -> ArityBounds {
    self.bounds
  }

  pub fn len(&self) -> usize {
    self.specs.len()
  }

  pub fn is_empty(&self) -> bool {
    self.specs.is_empty()
  }

  /// Whether the last argument consumes every remaining token.
  pub fn is_variadic(&self) -> bool {
    self.bounds.max.is_none()
  }
}

impl<C> fmt::Debug for Arguments<C> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Arguments")
      .field("specs", &self.specs)
      .field("bounds", &self.bounds)
      .finish()
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::{
    leaf::IntegerOptions,
    node::NodeOptions,
    value::Value,
  };

  fn spec(default: Option<i64>, infinite: bool) -> ArgumentSpec<()> {
    TypeNode::integer(IntegerOptions::DEFAULT, NodeOptions {
      default: default.map(Value::Integer),
      infinite,
      ..NodeOptions::DEFAULT
    })
    .unwrap()
    .into()
  }

  #[track_caller]
  fn assert_bounds(specs: Vec<ArgumentSpec<()>>, min: usize, max: Option<usize>) {
    let args = Arguments::new(specs).unwrap();
    assert_eq!(args.bounds(), ArityBounds { min, max });
  }

  #[test]
  fn bounds() {
    assert_bounds(vec![], 0, Some(0));
    assert_bounds(vec![spec(None, false), spec(None, false)], 2, Some(2));
    assert_bounds(
      vec![spec(None, false), spec(None, false), spec(Some(1), false)],
      2,
      Some(3),
    );
    assert_bounds(vec![spec(None, false), spec(None, true)], 2, None);
    assert_bounds(vec![spec(Some(0), false), spec(Some(0), true)], 0, None);
  }

  #[test]
  fn defaults_must_be_a_suffix() {
    let err = Arguments::new(vec![spec(None, false), spec(Some(1), false), spec(None, false)])
      .unwrap_err();
    assert_eq!(err, CriticalError::DefaultNotSuffix { index: 2 });
  }

  #[test]
  fn variadic_must_be_last() {
    let err = Arguments::new(vec![spec(None, true), spec(None, false)]).unwrap_err();
    assert_eq!(err, CriticalError::InfiniteNotLast { index: 0 });

    let err = Arguments::new(vec![spec(None, true), spec(None, true)]).unwrap_err();
    assert_eq!(err, CriticalError::InfiniteNotLast { index: 0 });
  }

  #[test]
  fn check() {
    let bounds = ArityBounds {
      min: 2,
      max: Some(3),
    };
    assert!(bounds.check(2).is_ok());
    assert!(bounds.check(3).is_ok());
    assert_eq!(bounds.check(1), Err(UserError::ArgumentsSize {
      size: 1,
      min:  2,
      max:  Some(3),
    }));
    assert!(bounds.check(4).is_err());
  }
}
