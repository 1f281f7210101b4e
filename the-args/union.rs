//! Ordered alternatives.

use crate::{
  error::{
    CriticalError,
    Error,
    Result,
    UserError,
  },
  node::TypeNode,
  value::Value,
};

pub struct Union<C> {
  alternatives: Vec<TypeNode<C>>,
}

impl<C> Union<C> {
  pub(crate) fn new(alternatives: Vec<TypeNode<C>>) -> Result<Self, CriticalError> {
    if alternatives.is_empty() {
      return Err(CriticalError::EmptyUnion);
    }
    Ok(Self { alternatives })
  }

  pub fn alternatives(&self) -> &[TypeNode<C>] {
    &self.alternatives
  }

  /// The alternatives' typenames joined with `" | "`.
  pub fn typename(&self) -> String {
    self
      .alternatives
      .iter()
      .map(TypeNode::typename)
      .collect::<Vec<_>>()
      .join(" | ")
  }

  pub fn is_infinite(&self) -> bool {
    self.alternatives.iter().any(TypeNode::is_infinite)
  }
}

impl<C: Sync> Union<C> {
  /// Tries each alternative in order. A user error moves on to the next one,
  /// a critical error is returned immediately.
  pub(crate) async fn run(&self, raw: &str, cx: &C, typename: &str) -> Result<Value> {
    for alternative in &self.alternatives {
      match alternative.run(raw, cx).await {
        Ok(value) => return Ok(value),
        Err(Error::User(err)) => {
          tracing::trace!("{} rejected {raw:?}: {err}", alternative.typename());
        },
        Err(err @ Error::Critical(_)) => return Err(err),
      }
    }

    Err(
      UserError::NoAlternativeMatched {
        value:    raw.to_string(),
        typename: typename.to_string(),
      }
      .into(),
    )
  }
}

#[cfg(test)]
mod test {
  use futures_executor::block_on;
  use futures_util::FutureExt;

  use super::*;
  use crate::{
    leaf::{
      IntegerOptions,
      StringOptions,
    },
    node::NodeOptions,
  };

  fn integer() -> TypeNode<()> {
    TypeNode::integer(IntegerOptions::DEFAULT, NodeOptions::DEFAULT).unwrap()
  }

  fn string() -> TypeNode<()> {
    TypeNode::string(StringOptions::DEFAULT, NodeOptions::DEFAULT).unwrap()
  }

  #[test]
  fn first_match_wins() {
    let node = TypeNode::union(vec![integer(), string()], NodeOptions::DEFAULT).unwrap();
    assert_eq!(node.typename(), "integer | string");
    assert_eq!(block_on(node.run("7", &())), Ok(Value::Integer(7)));
    assert_eq!(block_on(node.run("x", &())), Ok(Value::String("x".into())));

    let reversed = TypeNode::union(vec![string(), integer()], NodeOptions::DEFAULT).unwrap();
    assert_eq!(block_on(reversed.run("7", &())), Ok(Value::String("7".into())));
  }

  #[test]
  fn exhausted_alternatives() {
    let boolean = TypeNode::boolean(Default::default(), NodeOptions::DEFAULT);
    let node = TypeNode::union(vec![integer(), boolean], NodeOptions::DEFAULT).unwrap();
    assert_eq!(
      block_on(node.run("x", &())),
      Err(Error::User(UserError::NoAlternativeMatched {
        value:    "x".into(),
        typename: "integer | boolean".into(),
      }))
    );
  }

  #[test]
  fn critical_errors_stop_the_search() {
    let offline = TypeNode::<()>::lookup(
      "user",
      |_, _| {
        async {
          Err(CriticalError::LookupFailed {
            name:   "user".into(),
            reason: "offline".into(),
          })
        }
        .boxed()
      },
      NodeOptions::DEFAULT,
    );
    // The string alternative would accept the token but is never tried.
    let node = TypeNode::union(vec![offline, string()], NodeOptions::DEFAULT).unwrap();
    assert!(block_on(node.run("root", &())).is_err_and(|err| err.is_critical()));
  }

  #[test]
  fn empty_union_is_rejected() {
    assert_eq!(
      TypeNode::<()>::union(vec![], NodeOptions::DEFAULT).unwrap_err(),
      CriticalError::EmptyUnion
    );
  }

  #[test]
  fn infinite_if_any_alternative_is() {
    let variadic = TypeNode::integer(IntegerOptions::DEFAULT, NodeOptions {
      infinite: true,
      ..NodeOptions::DEFAULT
    })
    .unwrap();
    let node = TypeNode::union(vec![string(), variadic], NodeOptions::DEFAULT).unwrap();
    assert!(node.is_infinite());
    assert!(!TypeNode::union(vec![string()], NodeOptions::DEFAULT).unwrap().is_infinite());
  }
}
