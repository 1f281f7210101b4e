//! Rendering of user errors through a localization backend.
//!
//! This crate never formats user-facing text on its own. A [`UserError`]
//! carries a message key and named [`Params`]; a [`Translate`] implementation
//! turns them into text. [`MessageCatalog`] is a small TOML-backed
//! implementation with the English messages built in.

use std::collections::{
  BTreeMap,
  HashMap,
  btree_map,
};

use thiserror::Error;

use crate::error::UserError;

/// A named message parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
  /// Literal text inserted as-is.
  Text(String),
  /// A message key that is translated before being inserted.
  Key(String),
}

impl Param {
  pub fn as_str(&self) -> &str {
    match self {
      Self::Text(text) | Self::Key(text) => text,
    }
  }
}

impl From<&str> for Param {
  fn from(text: &str) -> Self {
    Self::Text(text.to_string())
  }
}

impl From<String> for Param {
  fn from(text: String) -> Self {
    Self::Text(text)
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(BTreeMap<String, Param>);

impl Params {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Param>) {
    self.0.insert(name.into(), value.into());
  }

  pub fn get(&self, name: &str) -> Option<&Param> {
    self.0.get(name)
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn iter(&self) -> btree_map::Iter<'_, String, Param> {
    self.0.iter()
  }
}

impl<K: Into<String>, V: Into<Param>> FromIterator<(K, V)> for Params {
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    Self(
      iter
        .into_iter()
        .map(|(name, value)| (name.into(), value.into()))
        .collect(),
    )
  }
}

/// The localization backend.
///
/// Returns `None` when no message exists for the key, in which case callers
/// fall back to the English text.
pub trait Translate {
  fn translate(&self, locale: &str, key: &str, params: &Params) -> Option<String>;
}

impl UserError {
  /// Renders the final message for `locale`.
  ///
  /// [`Param::Key`] parameters are translated first. Aggregates render a
  /// header line followed by one line per underlying error.
  pub fn render(&self, translator: &dyn Translate, locale: &str) -> String {
    let params = self
      .params()
      .iter()
      .map(|(name, param)| {
        let text = match param {
          Param::Text(text) => text.clone(),
          Param::Key(key) => translator
            .translate(locale, key, &Params::new())
            .unwrap_or_else(|| key.clone()),
        };
        (name.clone(), Param::Text(text))
      })
      .collect();

    let mut text = translator
      .translate(locale, self.key(), &params)
      .unwrap_or_else(|| match self {
        Self::Multiple { .. } => "multiple errors occurred:".to_string(),
        _ => self.to_string(),
      });

    if let Self::Multiple { errors } = self {
      for err in errors {
        text.push('\n');
        text.push_str(&err.render(translator, locale));
      }
    }
    text
  }
}

#[derive(Debug, Error)]
pub enum CatalogError {
  #[error("failed to parse message catalog: {0}")]
  Parse(#[from] toml::de::Error),
  #[error("message '{key}' is not a string")]
  NotAString { key: String },
}

/// Per-locale message dictionaries.
///
/// Lookups fall back from `lang-COUNTRY` to `lang` and then to the default
/// locale. Messages may reference parameters as `{{name}}`.
#[derive(Debug, Clone)]
pub struct MessageCatalog {
  default_locale: String,
  dicts:          HashMap<String, HashMap<String, String>>,
}

impl MessageCatalog {
  pub fn new(default_locale: impl Into<String>) -> Self {
    Self {
      default_locale: default_locale.into(),
      dicts:          HashMap::new(),
    }
  }

  /// A catalog holding the built-in English messages under `en`.
  pub fn english() -> Result<Self, CatalogError> {
    let mut catalog = Self::new("en");
    catalog.merge_toml("en", include_str!("locales/en.toml"))?;
    Ok(catalog)
  }

  pub fn default_locale(&self) -> &str {
    &self.default_locale
  }

  /// Adds messages to a locale, replacing existing keys.
  pub fn merge<K, V>(&mut self, locale: &str, messages: impl IntoIterator<Item = (K, V)>)
  where
    K: Into<String>,
    V: Into<String>,
  {
    self
      .dicts
      .entry(locale.to_string())
      .or_default()
      .extend(
        messages
          .into_iter()
          .map(|(key, value)| (key.into(), value.into())),
      );
  }

  /// Adds messages from a TOML document. Nested tables become dotted keys.
  pub fn merge_toml(&mut self, locale: &str, source: &str) -> Result<(), CatalogError> {
    let table: toml::Table = toml::from_str(source)?;
    let mut messages = Vec::new();
    flatten(&mut messages, String::new(), table)?;
    self.merge(locale, messages);
    Ok(())
  }

  pub fn get(&self, locale: &str, key: &str) -> Option<&str> {
    let language = locale.split(['-', '_']).next().unwrap_or(locale);
    [locale, language, self.default_locale.as_str()]
      .into_iter()
      .filter_map(|locale| self.dicts.get(locale))
      .find_map(|dict| dict.get(key))
      .map(String::as_str)
  }
}

fn flatten(
  messages: &mut Vec<(String, String)>,
  prefix: String,
  table: toml::Table,
) -> Result<(), CatalogError> {
  for (name, value) in table {
    let key = if prefix.is_empty() {
      name
    } else {
      format!("{prefix}.{name}")
    };
    match value {
      toml::Value::String(text) => messages.push((key, text)),
      toml::Value::Table(table) => flatten(messages, key, table)?,
      _ => return Err(CatalogError::NotAString { key }),
    }
  }
  Ok(())
}

/// Replaces `{{name}}` placeholders. Unknown placeholders are kept verbatim.
fn substitute(template: &str, params: &Params) -> String {
  let mut out = String::with_capacity(template.len());
  let mut rest = template;
  while let Some(start) = rest.find("{{") {
    out.push_str(&rest[..start]);
    let after = &rest[start + 2..];
    let Some(end) = after.find("}}") else {
      rest = &rest[start..];
      break;
    };
    match params.get(after[..end].trim()) {
      Some(param) => out.push_str(param.as_str()),
      None => out.push_str(&rest[start..start + end + 4]),
    }
    rest = &after[end + 2..];
  }
  out.push_str(rest);
  out
}

impl Translate for MessageCatalog {
  fn translate(&self, locale: &str, key: &str, params: &Params) -> Option<String> {
    self
      .get(locale, key)
      .map(|template| substitute(template, params))
  }
}
