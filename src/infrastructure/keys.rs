//! Environment-backed key source
//!
//! For a key id `signing-2024` and prefix `SCOPEGATE_KEY` the source reads:
//!
//! - `SCOPEGATE_KEY_SIGNING_2024_PRIVATE_KEY`
//! - `SCOPEGATE_KEY_SIGNING_2024_ALGORITHM`
//! - `SCOPEGATE_KEY_SIGNING_2024_PUBLIC_KEY`

use std::env;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::key::{PrivateKeyDefinition, PrivateKeySource, PublicKeySource, SigningAlgorithm};
use crate::domain::DomainError;

pub const DEFAULT_KEY_ENV_PREFIX: &str = "SCOPEGATE_KEY";

type VarLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

#[derive(Clone)]
pub struct EnvKeySource {
    prefix: String,
    lookup: VarLookup,
}

impl EnvKeySource {
    /// Reads the process environment
    pub fn new(prefix: impl Into<String>) -> Self {
        Self::with_lookup(prefix, |name| env::var(name).ok())
    }

    /// Reads variables through `lookup` instead of the process environment
    pub fn with_lookup<F>(prefix: impl Into<String>, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            prefix: prefix.into(),
            lookup: Arc::new(lookup),
        }
    }

    /// Name of the environment variable holding `suffix` for `kid`
    pub fn var_name(&self, kid: &str, suffix: &str) -> String {
        let kid: String = kid
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect();
        format!("{}_{}_{}", self.prefix, kid, suffix)
    }

    fn read(&self, kid: &str, suffix: &str) -> Option<String> {
        let name = self.var_name(kid, suffix);
        let value = (self.lookup)(&name).filter(|value| !value.is_empty());
        debug!(var = %name, found = value.is_some(), "Read key variable");
        value
    }
}

impl fmt::Debug for EnvKeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvKeySource")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

impl Default for EnvKeySource {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_ENV_PREFIX)
    }
}

#[async_trait]
impl PrivateKeySource for EnvKeySource {
    async fn private_key(&self, kid: &str) -> Result<Option<PrivateKeyDefinition>, DomainError> {
        let Some(private_key) = self.read(kid, "PRIVATE_KEY") else {
            return Ok(None);
        };

        let algorithm = self.read(kid, "ALGORITHM").ok_or_else(|| {
            DomainError::source_failure(
                "env",
                format!("{} is not set", self.var_name(kid, "ALGORITHM")),
            )
        })?;
        let algorithm: SigningAlgorithm = algorithm
            .parse()
            .map_err(|e: DomainError| DomainError::source_failure("env", e.to_string()))?;

        Ok(Some(PrivateKeyDefinition::new(algorithm, private_key)))
    }

    fn source_name(&self) -> &'static str {
        "env"
    }
}

#[async_trait]
impl PublicKeySource for EnvKeySource {
    async fn public_key(&self, kid: &str) -> Result<Option<String>, DomainError> {
        Ok(self.read(kid, "PUBLIC_KEY"))
    }

    fn source_name(&self) -> &'static str {
        "env"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn source_with(vars: &[(&str, &str)]) -> EnvKeySource {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        EnvKeySource::with_lookup("TEST_KEY", move |name| vars.get(name).cloned())
    }

    #[test]
    fn test_var_name() {
        let source = EnvKeySource::default();
        assert_eq!(
            source.var_name("signing-2024.v1", "PRIVATE_KEY"),
            "SCOPEGATE_KEY_SIGNING_2024_V1_PRIVATE_KEY"
        );
    }

    #[tokio::test]
    async fn test_private_key() {
        let source = source_with(&[
            ("TEST_KEY_K1_PRIVATE_KEY", "secret"),
            ("TEST_KEY_K1_ALGORITHM", "HS384"),
        ]);

        let key = source.private_key("k1").await.unwrap().unwrap();
        assert_eq!(key.algorithm, SigningAlgorithm::HS384);
        assert_eq!(key.private_key, "secret");

        assert!(source.private_key("k2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_private_key_requires_algorithm() {
        let source = source_with(&[("TEST_KEY_K1_PRIVATE_KEY", "secret")]);
        let err = source.private_key("k1").await.unwrap_err();
        assert!(matches!(err, DomainError::Source { .. }));

        let source = source_with(&[
            ("TEST_KEY_K1_PRIVATE_KEY", "secret"),
            ("TEST_KEY_K1_ALGORITHM", "XX999"),
        ]);
        assert!(source.private_key("k1").await.is_err());
    }

    #[tokio::test]
    async fn test_public_key() {
        let source = source_with(&[
            ("TEST_KEY_K1_PUBLIC_KEY", "PEM"),
            ("TEST_KEY_K2_PUBLIC_KEY", ""),
        ]);
        assert_eq!(
            source.public_key("k1").await.unwrap(),
            Some("PEM".to_string())
        );
        assert_eq!(source.public_key("k2").await.unwrap(), None);
        assert_eq!(source.public_key("k3").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_missing_process_variable() {
        let source = EnvKeySource::new("SCOPEGATE_TEST_UNSET_PREFIX_12345");
        assert!(source.private_key("k1").await.unwrap().is_none());
    }
}
