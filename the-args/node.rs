//! The validation graph.
//!
//! A [`TypeNode`] turns one raw token into a [`Value`]. Nodes are immutable
//! once built and may be shared across any number of concurrent coercions.
//! The set of node kinds is closed: [`Leaf`] validators, [`Union`] and
//! [`Multiple`].

use std::fmt;

use futures_util::{
  FutureExt,
  future::{
    self,
    BoxFuture,
  },
};

use crate::{
  error::{
    self,
    CriticalError,
    Error,
    Result,
    UserError,
  },
  leaf::{
    BigIntegerOptions,
    BooleanOptions,
    IntegerOptions,
    Leaf,
    NumberOptions,
    StringOptions,
  },
  multiple::{
    Multiple,
    MultipleOptions,
  },
  union::Union,
  value::Value,
};

/// Options shared by every node kind.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeOptions {
  /// Overrides the name used in error messages.
  pub typename:                    Option<String>,
  /// Returned for an absent or empty token.
  pub default:                     Option<Value>,
  /// Also return the default when coercion fails with a user error.
  pub default_on_user_error:       bool,
  /// Marks the node as variadic when used as an argument.
  pub infinite:                    bool,
  /// For a variadic argument, drop elements that fail with a user error
  /// instead of rejecting the argument.
  pub infinite_ignore_user_errors: bool,
}

impl NodeOptions {
  pub const DEFAULT: Self = Self {
    typename:                    None,
    default:                     None,
    default_on_user_error:       false,
    infinite:                    false,
    infinite_ignore_user_errors: false,
  };
}

impl Default for NodeOptions {
  fn default() -> Self {
    Self::DEFAULT
  }
}

pub enum NodeKind<C> {
  Leaf(Leaf<C>),
  Union(Union<C>),
  Multiple(Multiple<C>),
}

impl<C> fmt::Debug for NodeKind<C> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Leaf(leaf) => f.debug_tuple("Leaf").field(leaf).finish(),
      Self::Union(union) => f.debug_tuple("Union").field(&union.alternatives()).finish(),
      Self::Multiple(multiple) => {
        f.debug_struct("Multiple")
          .field("inner", multiple.inner())
          .field("options", multiple.options())
          .finish()
      },
    }
  }
}

pub struct TypeNode<C> {
  typename: String,
  options:  NodeOptions,
  kind:     NodeKind<C>,
}

impl<C> fmt::Debug for TypeNode<C> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("TypeNode")
      .field("typename", &self.typename)
      .field("options", &self.options)
      .field("kind", &self.kind)
      .finish()
  }
}

impl<C> TypeNode<C> {
  fn new(kind: NodeKind<C>, options: NodeOptions, typename: impl FnOnce() -> String) -> Self {
    Self {
      typename: options.typename.clone().unwrap_or_else(typename),
      options,
      kind,
    }
  }

  /// Wraps a leaf validator, checking its options first.
  pub fn leaf(leaf: Leaf<C>, options: NodeOptions) -> Result<Self, CriticalError> {
    leaf.validate()?;
    Ok(Self::new_leaf(leaf, options))
  }

  fn new_leaf(leaf: Leaf<C>, options: NodeOptions) -> Self {
    let typename = leaf.typename().to_string();
    Self::new(NodeKind::Leaf(leaf), options, || typename)
  }

  pub fn integer(opts: IntegerOptions, options: NodeOptions) -> Result<Self, CriticalError> {
    Self::leaf(Leaf::Integer(opts), options)
  }

  pub fn big_integer(
    opts: BigIntegerOptions,
    options: NodeOptions,
  ) -> Result<Self, CriticalError> {
    Self::leaf(Leaf::BigInteger(opts), options)
  }

  pub fn number(opts: NumberOptions, options: NodeOptions) -> Result<Self, CriticalError> {
    Self::leaf(Leaf::Number(opts), options)
  }

  pub fn string(opts: StringOptions, options: NodeOptions) -> Result<Self, CriticalError> {
    Self::leaf(Leaf::String(opts), options)
  }

  pub fn boolean(opts: BooleanOptions, options: NodeOptions) -> Self {
    Self::new_leaf(Leaf::Boolean(opts), options)
  }

  /// A boolean decided by `resolve`, which sees the lowercased token.
  pub fn resolvable<F>(resolve: F, options: NodeOptions) -> Self
  where
    F: for<'a> Fn(&'a str, &'a C) -> BoxFuture<'a, bool> + Send + Sync + 'static,
  {
    Self::new_leaf(Leaf::resolvable(resolve), options)
  }

  /// A domain value found by `lookup`. `name` is the typename used in
  /// messages.
  pub fn lookup<F>(name: impl Into<String>, lookup: F, options: NodeOptions) -> Self
  where
    F: for<'a> Fn(&'a str, &'a C) -> BoxFuture<'a, Result<Option<Value>, CriticalError>>
      + Send
      + Sync
      + 'static,
  {
    Self::new_leaf(Leaf::lookup(name, lookup), options)
  }

  /// Ordered alternatives, the first one that accepts a token wins.
  ///
  /// Fails with [`CriticalError::EmptyUnion`] when `alternatives` is empty.
  pub fn union(
    alternatives: Vec<TypeNode<C>>,
    options: NodeOptions,
  ) -> Result<Self, CriticalError> {
    let union = Union::new(alternatives)?;
    let typename = union.typename();
    Ok(Self::new(NodeKind::Union(union), options, || typename))
  }

  /// Several values from one token.
  ///
  /// Fails with [`CriticalError::VariadicInsideMultiple`] when `inner` is
  /// variadic.
  pub fn multiple(
    multiple: MultipleOptions,
    inner: TypeNode<C>,
    options: NodeOptions,
  ) -> Result<Self, CriticalError> {
    let multiple = Multiple::new(multiple, inner)?;
    let typename = format!("multiple {}", multiple.inner().typename());
    Ok(Self::new(NodeKind::Multiple(multiple), options, || typename))
  }

  pub fn typename(&self) -> &str {
    &self.typename
  }

  pub fn options(&self) -> &NodeOptions {
    &self.options
  }

  pub fn kind(&self) -> &NodeKind<C> {
    &self.kind
  }

  pub fn has_default(&self) -> bool {
    self.options.default.is_some()
  }

  /// Whether the node consumes every remaining token when used as an
  /// argument. A union is variadic when any of its alternatives is.
  pub fn is_infinite(&self) -> bool {
    self.options.infinite
      || match &self.kind {
        NodeKind::Union(union) => union.is_infinite(),
        NodeKind::Leaf(_) | NodeKind::Multiple(_) => false,
      }
  }

  pub fn default_value(&self) -> Result<Value, CriticalError> {
    self.options.default.clone().ok_or(CriticalError::NoDefault)
  }

  /// Whether `raw` counts as "not supplied".
  pub fn is_empty(&self, raw: &str, _cx: &C) -> bool {
    raw.is_empty()
  }
}

impl<C: Sync> TypeNode<C> {
  /// Coerces one token, without any defaulting.
  pub fn run<'a>(&'a self, raw: &'a str, cx: &'a C) -> BoxFuture<'a, Result<Value>> {
    match &self.kind {
      NodeKind::Leaf(leaf) => leaf.run(raw, cx, &self.typename),
      NodeKind::Union(union) => union.run(raw, cx, &self.typename).boxed(),
      NodeKind::Multiple(multiple) => multiple.run(raw, cx).boxed(),
    }
  }

  /// Coerces a token that may be missing.
  ///
  /// An absent or empty token yields the default, or
  /// [`CriticalError::NoDefault`] when there is none. Anything else goes
  /// through [`handle_token`](Self::handle_token).
  pub async fn handle_value(&self, raw: Option<&str>, cx: &C) -> Result<Value> {
    let Some(raw) = raw.filter(|raw| !self.is_empty(raw, cx)) else {
      return Ok(self.default_value()?);
    };
    self.handle_token(raw, cx).await
  }

  /// Coerces a token the user supplied, even an empty one. With
  /// `default_on_user_error` and a default, a user error yields the default.
  pub async fn handle_token(&self, raw: &str, cx: &C) -> Result<Value> {
    match self.run(raw, cx).await {
      Err(Error::User(err)) if self.options.default_on_user_error => {
        let Some(default) = &self.options.default else {
          return Err(err.into());
        };
        tracing::debug!("{} rejected {raw:?}, using the default: {err}", self.typename);
        Ok(default.clone())
      },
      result => result,
    }
  }

  /// Runs every token concurrently. Outcomes keep the order of `raws`.
  pub async fn run_all<S>(&self, raws: &[S], cx: &C) -> Vec<Result<Value>>
  where
    S: AsRef<str> + Sync,
  {
    future::join_all(raws.iter().map(|raw| self.run(raw.as_ref(), cx))).await
  }

  /// Like [`run_all`](Self::run_all), but a critical error from any token
  /// aborts the whole run. User errors stay with their token.
  pub async fn handle_values<S>(
    &self,
    raws: &[S],
    cx: &C,
  ) -> Result<Vec<Result<Value, UserError>>, CriticalError>
  where
    S: AsRef<str> + Sync,
  {
    future::try_join_all(
      raws
        .iter()
        .map(|raw| self.run(raw.as_ref(), cx).map(error::capture)),
    )
    .await
  }
}

#[cfg(test)]
mod test {
  use futures_executor::block_on;

  use super::*;

  fn integer(options: NodeOptions) -> TypeNode<()> {
    TypeNode::integer(IntegerOptions::DEFAULT, options).unwrap()
  }

  #[test]
  fn typename_override() {
    assert_eq!(integer(NodeOptions::DEFAULT).typename(), "integer");
    let named = integer(NodeOptions {
      typename: Some("port".into()),
      ..NodeOptions::DEFAULT
    });
    assert_eq!(named.typename(), "port");
    assert_eq!(
      block_on(named.run("x", &())),
      Err(Error::User(UserError::IncorrectType {
        value:    "x".into(),
        typename: "port".into(),
      }))
    );
  }

  #[test]
  fn missing_values_use_the_default() {
    let node = integer(NodeOptions {
      default: Some(Value::Integer(3)),
      ..NodeOptions::DEFAULT
    });
    assert_eq!(block_on(node.handle_value(None, &())), Ok(Value::Integer(3)));
    assert_eq!(block_on(node.handle_value(Some(""), &())), Ok(Value::Integer(3)));
    assert_eq!(block_on(node.handle_value(Some("8"), &())), Ok(Value::Integer(8)));
    assert!(block_on(node.handle_value(Some("x"), &())).is_err_and(|err| err.is_user()));

    let required = integer(NodeOptions::DEFAULT);
    assert_eq!(
      block_on(required.handle_value(None, &())),
      Err(Error::Critical(CriticalError::NoDefault))
    );
    assert_eq!(
      block_on(required.handle_value(Some(""), &())),
      Err(Error::Critical(CriticalError::NoDefault))
    );
  }

  #[test]
  fn default_on_user_error() {
    let node = integer(NodeOptions {
      default: Some(Value::Integer(0)),
      default_on_user_error: true,
      ..NodeOptions::DEFAULT
    });
    assert_eq!(block_on(node.handle_value(Some("x"), &())), Ok(Value::Integer(0)));

    let no_default = integer(NodeOptions {
      default_on_user_error: true,
      ..NodeOptions::DEFAULT
    });
    assert_eq!(
      block_on(no_default.handle_value(Some("x"), &())),
      Err(Error::User(UserError::IncorrectType {
        value:    "x".into(),
        typename: "integer".into(),
      }))
    );
  }

  #[test]
  fn supplied_empty_tokens_are_coerced() {
    let required = integer(NodeOptions::DEFAULT);
    assert_eq!(
      block_on(required.handle_token("", &())),
      Err(Error::User(UserError::IncorrectType {
        value:    "".into(),
        typename: "integer".into(),
      }))
    );

    let text = TypeNode::<()>::string(Default::default(), NodeOptions::DEFAULT).unwrap();
    assert_eq!(block_on(text.handle_token("", &())), Ok(Value::from("")));
  }

  #[test]
  fn handle_value_is_repeatable() {
    let node = integer(NodeOptions::DEFAULT);
    for raw in ["12", "x", "007"] {
      let first = block_on(node.handle_value(Some(raw), &()));
      for _ in 0..3 {
        assert_eq!(block_on(node.handle_value(Some(raw), &())), first);
      }
    }
  }

  #[test]
  fn run_all_keeps_order() {
    let node = integer(NodeOptions::DEFAULT);
    let outcomes = block_on(node.run_all(&["1", "x", "3"], &()));
    assert_eq!(outcomes[0], Ok(Value::Integer(1)));
    assert!(outcomes[1].as_ref().is_err_and(Error::is_user));
    assert_eq!(outcomes[2], Ok(Value::Integer(3)));

    let captured = block_on(node.handle_values(&["1", "x"], &())).unwrap();
    assert_eq!(captured[0], Ok(Value::Integer(1)));
    assert!(matches!(captured[1], Err(UserError::IncorrectType { .. })));
  }

  #[test]
  fn invalid_leaf_options_fail_construction() {
    let err = TypeNode::<()>::integer(
      IntegerOptions {
        min: Some(5),
        max: Some(1),
        ..IntegerOptions::DEFAULT
      },
      NodeOptions::DEFAULT,
    )
    .unwrap_err();
    assert!(matches!(err, CriticalError::InvertedBounds { .. }));
  }
}
