//! Typed argument parsing for text commands.
//!
//! A command line such as `ban @someone 7d "spamming links"` is turned into
//! a list of typed [`Value`]s in two steps:
//!
//! 1. **Extraction**: an [`Extractor`] pulls raw tokens out of a
//!    [`CharStream`], one argument at a time. [`QuoteEscapeExtractor`]
//!    understands `'single'` and `"double"` quotes plus `\` escapes.
//! 2. **Coercion**: each token goes through the [`TypeNode`] of its argument.
//!    Nodes are leaves (integers, strings, async lookups...), unions of
//!    alternatives, or multiple values split out of one token.
//!
//! ```
//! use the_args::{
//!   ArgumentSpec,
//!   Arguments,
//!   IntegerOptions,
//!   NodeOptions,
//!   Pipeline,
//!   StringOptions,
//!   TypeNode,
//!   Value,
//! };
//!
//! let args = Arguments::new(vec![
//!   ArgumentSpec::new(TypeNode::string(StringOptions::DEFAULT, NodeOptions::DEFAULT)?),
//!   ArgumentSpec::new(TypeNode::integer(IntegerOptions::DEFAULT, NodeOptions {
//!     default: Some(Value::Integer(1)),
//!     ..NodeOptions::DEFAULT
//!   })?),
//! ])?;
//!
//! let values = Pipeline::default().parse_blocking(&args, "'hello world'", &())?;
//! assert_eq!(values, [Value::from("hello world"), Value::Integer(1)]);
//! # Ok::<(), the_args::Error>(())
//! ```
//!
//! Errors come in two classes, see [`error`]. User errors carry a message key
//! and parameters and are rendered through a [`Translate`] backend such as
//! [`MessageCatalog`].

pub mod argument;
pub mod config;
pub mod error;
pub mod extract;
pub mod inhibit;
pub mod leaf;
pub mod locale;
pub mod multiple;
pub mod node;
pub mod pipeline;
pub mod stream;
pub mod union;
pub mod value;

pub use argument::{
  ArgumentSpec,
  Arguments,
  ArityBounds,
};
pub use config::{
  ArgsConfig,
  ExtractorKind,
};
pub use error::{
  AllowedValues,
  CriticalError,
  Error,
  Result,
  UserError,
};
pub use extract::{
  BasicExtractor,
  Extractor,
  QuoteEscapeExtractor,
  QuoteEscapeOptions,
  Token,
};
pub use inhibit::{
  Inhibitor,
  Inhibitors,
};
pub use leaf::{
  BigIntegerOptions,
  BooleanOptions,
  IntegerOptions,
  NumberOptions,
  StringOptions,
};
pub use locale::{
  MessageCatalog,
  Param,
  Params,
  Translate,
};
pub use multiple::{
  MultipleOptions,
  Separator,
};
pub use node::{
  NodeOptions,
  TypeNode,
};
pub use pipeline::Pipeline;
pub use stream::CharStream;
pub use value::{
  Entity,
  Value,
};
