use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::domain::key::{KeyDefinition, SigningAlgorithm};
use crate::domain::scope::DEFAULT_REFRESH_COOL_DOWN;
use crate::domain::token::DEFAULT_EXPIRES_IN_SECS;
use crate::domain::{DomainError, TokenFactory};
use crate::infrastructure::{EnvKeySource, FileScopeSource, JwtCrypto};

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub token: TokenConfig,
    /// Statically configured keys.
    ///
    /// Key ids and scope names are case-sensitive, so both are list entries
    /// rather than table keys, which `config` lowercases.
    pub keys: Vec<KeyConfig>,
    /// Initial scope map entries
    pub scopes: Vec<ScopeConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    pub expires_in_secs: u64,
    pub audience: Option<String>,
    pub issuer: Option<String>,
    pub refresh_scopes_after_ms: u64,
    /// Enables the environment key source with this variable prefix
    pub key_env_prefix: Option<String>,
    /// Enables the file scope source for unknown scopes
    pub scopes_file: Option<PathBuf>,
}

/// One `domain|scope` to bit index assignment
#[derive(Debug, Clone, Deserialize)]
pub struct ScopeConfig {
    pub domain: String,
    pub scope: String,
    pub index: u32,
}

/// A key definition; PEM material may be inline or read from a file
#[derive(Clone, Deserialize)]
pub struct KeyConfig {
    pub kid: String,
    pub algorithm: SigningAlgorithm,
    #[serde(default)]
    pub private_key: Option<String>,
    #[serde(default)]
    pub private_key_file: Option<PathBuf>,
    #[serde(default)]
    pub public_key: Option<String>,
    #[serde(default)]
    pub public_key_file: Option<PathBuf>,
}

impl std::fmt::Debug for KeyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyConfig")
            .field("kid", &self.kid)
            .field("algorithm", &self.algorithm)
            .field("private_key", &self.private_key.as_ref().map(|_| "[hidden]"))
            .field("private_key_file", &self.private_key_file)
            .field("public_key", &self.public_key.is_some())
            .field("public_key_file", &self.public_key_file)
            .finish()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            expires_in_secs: DEFAULT_EXPIRES_IN_SECS,
            audience: None,
            issuer: None,
            refresh_scopes_after_ms: DEFAULT_REFRESH_COOL_DOWN.as_millis() as u64,
            key_env_prefix: None,
            scopes_file: None,
        }
    }
}

impl KeyConfig {
    /// Resolves inline or file-based key material into a definition
    pub fn to_definition(&self) -> Result<KeyDefinition, DomainError> {
        Ok(KeyDefinition {
            algorithm: self.algorithm,
            private_key: material(&self.private_key, &self.private_key_file)?,
            public_key: material(&self.public_key, &self.public_key_file)?,
        })
    }
}

fn material(
    inline: &Option<String>,
    file: &Option<PathBuf>,
) -> Result<Option<String>, DomainError> {
    match (inline, file) {
        (Some(value), _) => Ok(Some(value.clone())),
        (None, Some(path)) => std::fs::read_to_string(path).map(Some).map_err(|e| {
            DomainError::configuration(format!("Failed to read key file {}: {}", path.display(), e))
        }),
        (None, None) => Ok(None),
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("SCOPEGATE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Builds a token factory with the JWT backend and the configured sources
    pub fn build_factory(&self) -> Result<TokenFactory, DomainError> {
        let mut builder = TokenFactory::builder(Arc::new(JwtCrypto::new()))
            .expires_in_secs(self.token.expires_in_secs)
            .refresh_scopes_after(Duration::from_millis(self.token.refresh_scopes_after_ms));

        for entry in &self.scopes {
            builder = builder.scope(entry.domain.clone(), entry.scope.clone(), entry.index);
        }
        if let Some(audience) = &self.token.audience {
            builder = builder.audience(audience.clone());
        }
        if let Some(issuer) = &self.token.issuer {
            builder = builder.issuer(issuer.clone());
        }
        for key in &self.keys {
            builder = builder.key(key.kid.clone(), key.to_definition()?);
        }
        if let Some(path) = &self.token.scopes_file {
            builder = builder.scope_source(Arc::new(FileScopeSource::new(path)));
        }
        if let Some(prefix) = &self.token.key_env_prefix {
            let source = Arc::new(EnvKeySource::new(prefix.clone()));
            builder = builder
                .private_key_source(source.clone())
                .public_key_source(source);
        }

        Ok(TokenFactory::new(builder.build()?))
    }
}
