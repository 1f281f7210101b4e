//! Checks that may veto a command before its arguments are parsed, such as
//! throttling or permission checks.
//!
//! The pipeline never calls these itself; the command layer runs
//! [`Inhibitors::check`] first and only then hands the line to a
//! [`Pipeline`](crate::pipeline::Pipeline).

use std::{
  fmt,
  sync::Arc,
};

use crate::error::UserError;

pub trait Inhibitor<C>: Send + Sync {
  /// Returns an error to stop the command.
  fn check(&self, input: &str, cx: &C) -> Result<(), UserError>;
}

impl<C, F> Inhibitor<C> for F
where
  F: Fn(&str, &C) -> Result<(), UserError> + Send + Sync,
{
  fn check(&self, input: &str, cx: &C) -> Result<(), UserError> {
    self(input, cx)
  }
}

/// A set of inhibitors run in registration order.
pub struct Inhibitors<C> {
  inhibitors: Vec<Arc<dyn Inhibitor<C>>>,
}

impl<C> Default for Inhibitors<C> {
  fn default() -> Self {
    Self {
      inhibitors: Vec::new(),
    }
  }
}

impl<C> fmt::Debug for Inhibitors<C> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Inhibitors")
      .field("len", &self.inhibitors.len())
      .finish()
  }
}

impl<C> Inhibitors<C> {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn register(&mut self, inhibitor: Arc<dyn Inhibitor<C>>) {
    self.inhibitors.push(inhibitor);
  }

  /// Removes a previously registered inhibitor. Returns whether it was
  /// found.
  pub fn unregister(&mut self, inhibitor: &Arc<dyn Inhibitor<C>>) -> bool {
    let len = self.inhibitors.len();
    self
      .inhibitors
      .retain(|registered| !Arc::ptr_eq(registered, inhibitor));
    self.inhibitors.len() != len
  }

  pub fn len(&self) -> usize {
    self.inhibitors.len()
  }

  pub fn is_empty(&self) -> bool {
    self.inhibitors.is_empty()
  }

  /// Runs every inhibitor and returns the first rejection.
  pub fn check(&self, input: &str, cx: &C) -> Result<(), UserError> {
    for inhibitor in &self.inhibitors {
      inhibitor.check(input, cx).inspect_err(|err| {
        tracing::debug!("inhibited {input:?}: {err}");
      })?;
    }
    Ok(())
  }
}
