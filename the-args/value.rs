//! Typed argument values.

use std::{
  any::Any,
  fmt,
  sync::Arc,
};

/// The result of coercing one raw token.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
  Integer(i64),
  BigInteger(i128),
  Number(f64),
  String(String),
  Bool(bool),
  /// A domain object resolved by a lookup type.
  Entity(Entity),
  /// The values of a multiple type or a variadic argument.
  List(Vec<Value>),
}

impl Value {
  pub fn as_integer(&self) -> Option<i64> {
    match self {
      Self::Integer(n) => Some(*n),
      _ => None,
    }
  }

  pub fn as_big_integer(&self) -> Option<i128> {
    match self {
      Self::BigInteger(n) => Some(*n),
      _ => None,
    }
  }

  pub fn as_number(&self) -> Option<f64> {
    match self {
      Self::Number(n) => Some(*n),
      _ => None,
    }
  }

  pub fn as_str(&self) -> Option<&str> {
    match self {
      Self::String(s) => Some(s),
      _ => None,
    }
  }

  pub fn as_bool(&self) -> Option<bool> {
    match self {
      Self::Bool(b) => Some(*b),
      _ => None,
    }
  }

  pub fn as_entity(&self) -> Option<&Entity> {
    match self {
      Self::Entity(entity) => Some(entity),
      _ => None,
    }
  }

  pub fn as_list(&self) -> Option<&[Value]> {
    match self {
      Self::List(values) => Some(values),
      _ => None,
    }
  }
}

impl From<i64> for Value {
  fn from(n: i64) -> Self {
    Self::Integer(n)
  }
}

impl From<i128> for Value {
  fn from(n: i128) -> Self {
    Self::BigInteger(n)
  }
}

impl From<f64> for Value {
  fn from(n: f64) -> Self {
    Self::Number(n)
  }
}

impl From<bool> for Value {
  fn from(b: bool) -> Self {
    Self::Bool(b)
  }
}

impl From<&str> for Value {
  fn from(s: &str) -> Self {
    Self::String(s.to_string())
  }
}

impl From<String> for Value {
  fn from(s: String) -> Self {
    Self::String(s)
  }
}

impl From<Entity> for Value {
  fn from(entity: Entity) -> Self {
    Self::Entity(entity)
  }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
  fn from(values: Vec<T>) -> Self {
    Self::List(values.into_iter().map(Into::into).collect())
  }
}

/// An opaque object produced by a lookup, tagged with a display name.
///
/// Two entities are equal when they share the same allocation.
#[derive(Clone)]
pub struct Entity {
  name:  String,
  inner: Arc<dyn Any + Send + Sync>,
}

impl Entity {
  pub fn new<T: Any + Send + Sync>(name: impl Into<String>, inner: T) -> Self {
    Self::from_arc(name, Arc::new(inner))
  }

  pub fn from_arc(name: impl Into<String>, inner: Arc<dyn Any + Send + Sync>) -> Self {
    Self {
      name: name.into(),
      inner,
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
    self.inner.downcast_ref()
  }
}

impl fmt::Debug for Entity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_tuple("Entity").field(&self.name).finish()
  }
}

impl PartialEq for Entity {
  fn eq(&self, other: &Self) -> bool {
    self.name == other.name && Arc::ptr_eq(&self.inner, &other.inner)
  }
}
