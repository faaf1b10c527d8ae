//! Engine configuration.

use anchorcert_core::binding::{DEFAULT_SOURCE, SCHEMA_VERSION};
use anchorcert_core::certificate::DEFAULT_TITLE;
use anchorcert_core::ChainId;

use crate::error::{EngineError, Result};

/// Configuration for the [`Engine`](crate::Engine).
///
/// Immutable once the engine is built.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Chain used by `certify` when the caller names none.
    pub default_chain: ChainId,
    /// Source tag written into envelopes.
    pub source: String,
    /// Envelope schema version.
    pub schema_version: String,
    /// Base for certificate verification URLs.
    pub verification_url_base: Option<String>,
    /// Certificate title.
    pub certificate_title: String,
}

impl EngineConfig {
    pub fn new(default_chain: impl Into<ChainId>) -> Self {
        Self {
            default_chain: default_chain.into(),
            source: DEFAULT_SOURCE.to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            verification_url_base: None,
            certificate_title: DEFAULT_TITLE.to_string(),
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_schema_version(mut self, version: impl Into<String>) -> Self {
        self.schema_version = version.into();
        self
    }

    pub fn with_verification_url_base(mut self, base: impl Into<String>) -> Self {
        self.verification_url_base = Some(base.into());
        self
    }

    pub fn with_certificate_title(mut self, title: impl Into<String>) -> Self {
        self.certificate_title = title.into();
        self
    }

    /// Read `ANCHORCERT_DEFAULT_CHAIN` (required), `ANCHORCERT_SOURCE` and
    /// `ANCHORCERT_VERIFICATION_URL`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let chain = non_empty("ANCHORCERT_DEFAULT_CHAIN").ok_or_else(|| {
            EngineError::Config("ANCHORCERT_DEFAULT_CHAIN is not set".to_string())
        })?;
        let mut config = Self::new(chain.trim());

        if let Some(source) = non_empty("ANCHORCERT_SOURCE") {
            config.source = source;
        }
        if let Some(url) = non_empty("ANCHORCERT_VERIFICATION_URL") {
            config.verification_url_base = Some(url);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::new("chain-a");
        assert_eq!(config.default_chain, ChainId::from("chain-a"));
        assert_eq!(config.source, DEFAULT_SOURCE);
        assert_eq!(config.schema_version, "1.0");
        assert!(config.verification_url_base.is_none());
    }

    #[test]
    fn test_from_lookup() {
        let config = EngineConfig::from_lookup(|key| match key {
            "ANCHORCERT_DEFAULT_CHAIN" => Some(" chain-b ".to_string()),
            "ANCHORCERT_SOURCE" => Some("SBR".to_string()),
            "ANCHORCERT_VERIFICATION_URL" => Some(String::new()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.default_chain, ChainId::from("chain-b"));
        assert_eq!(config.source, "SBR");
        assert!(config.verification_url_base.is_none());

        assert!(matches!(
            EngineConfig::from_lookup(|_| None),
            Err(EngineError::Config(_))
        ));
    }
}
