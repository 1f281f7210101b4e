//! TOML configuration for a [`Pipeline`](crate::pipeline::Pipeline).
//!
//! ```toml
//! extractor = "quote-escape"
//! allow-extra-arguments = false
//!
//! [quotes]
//! disable-single-quote = false
//! disable-double-quote = false
//! disable-escape = false
//! ```

use std::sync::Arc;

use serde::{
  Deserialize,
  Serialize,
};

use crate::extract::{
  BasicExtractor,
  Extractor,
  QuoteEscapeExtractor,
  QuoteEscapeOptions,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractorKind {
  Basic,
  #[default]
  QuoteEscape,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct ArgsConfig {
  /// The extractor used by arguments that do not bring their own.
  pub extractor:             ExtractorKind,
  /// Only read by the `quote-escape` extractor.
  pub quotes:                QuoteEscapeOptions,
  /// Leave trailing input unread instead of rejecting it.
  pub allow_extra_arguments: bool,
}

impl ArgsConfig {
  pub fn from_toml(source: &str) -> Result<Self, toml::de::Error> {
    toml::from_str(source)
  }

  pub fn extractor(&self) -> Arc<dyn Extractor> {
    match self.extractor {
      ExtractorKind::Basic => Arc::new(BasicExtractor),
      ExtractorKind::QuoteEscape => Arc::new(QuoteEscapeExtractor::new(self.quotes)),
    }
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn empty_config_is_default() {
    assert_eq!(ArgsConfig::from_toml("").unwrap(), ArgsConfig::default());
    assert_eq!(ArgsConfig::default().extractor, ExtractorKind::QuoteEscape);
  }

  #[test]
  fn parses_kebab_case() {
    let config = ArgsConfig::from_toml(
      r#"
      extractor = "basic"
      allow-extra-arguments = true

      [quotes]
      disable-escape = true
      "#,
    )
    .unwrap();
    assert_eq!(config.extractor, ExtractorKind::Basic);
    assert!(config.allow_extra_arguments);
    assert_eq!(config.quotes, QuoteEscapeOptions {
      disable_escape: true,
      ..QuoteEscapeOptions::DEFAULT
    });
  }

  #[test]
  fn rejects_unknown_fields() {
    assert!(ArgsConfig::from_toml("extra = true").is_err());
    assert!(ArgsConfig::from_toml("[quotes]\ndisable-backticks = true").is_err());
    assert!(ArgsConfig::from_toml(r#"extractor = "shell""#).is_err());
  }
}
