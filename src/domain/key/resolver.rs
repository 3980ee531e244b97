//! Signing and verification key resolution
//!
//! Keys come from three places, in order: the statically configured
//! definitions, the fetched-key caches, and finally the configured sources.
//! Whatever a source returns is cached for the life of the resolver, so each
//! source is asked about a key id at most once unless two lookups race.

use std::collections::HashMap;
use std::sync::Arc;

use moka::future::Cache;
use tracing::debug;

use super::{KeyDefinition, PrivateKeyDefinition, PrivateKeySource, PublicKeySource, SigningAlgorithm};
use crate::domain::DomainError;

/// Resolves key material by key id, shared by every token of a context
#[derive(Debug)]
pub struct KeyResolver {
    keys: HashMap<String, KeyDefinition>,
    private_source: Option<Arc<dyn PrivateKeySource>>,
    public_source: Option<Arc<dyn PublicKeySource>>,
    private_cache: Cache<String, PrivateKeyDefinition>,
    public_cache: Cache<String, String>,
}

impl KeyResolver {
    pub fn new(keys: HashMap<String, KeyDefinition>) -> Self {
        Self {
            keys,
            private_source: None,
            public_source: None,
            private_cache: Cache::builder().build(),
            public_cache: Cache::builder().build(),
        }
    }

    pub fn with_private_source(mut self, source: Arc<dyn PrivateKeySource>) -> Self {
        self.private_source = Some(source);
        self
    }

    pub fn with_public_source(mut self, source: Arc<dyn PublicKeySource>) -> Self {
        self.public_source = Some(source);
        self
    }

    /// Resolves the private key or shared secret used to sign with `kid`
    pub async fn resolve_private(&self, kid: &str) -> Result<PrivateKeyDefinition, DomainError> {
        if let Some(key) = self.keys.get(kid).and_then(KeyDefinition::private_definition) {
            debug!(kid, "Using configured private key");
            return Ok(key);
        }

        if let Some(cached) = self.private_cache.get(kid).await {
            debug!(kid, "Cache hit for private key");
            return Ok(cached);
        }

        if let Some(source) = &self.private_source {
            debug!(kid, source = source.source_name(), "Cache miss, fetching private key");
            if let Some(key) = source.private_key(kid).await? {
                self.private_cache.insert(kid.to_string(), key.clone()).await;
                return Ok(key);
            }
        }

        Err(DomainError::key_not_found(format!(
            "Private key \"{}\" could not be found",
            kid
        )))
    }

    /// Resolves the material that verifies a signature made by `kid`.
    ///
    /// For symmetric algorithms this is the shared secret, found exactly like
    /// a signing key. Asymmetric algorithms need the public half.
    pub async fn resolve_verification(
        &self,
        kid: &str,
        algorithm: SigningAlgorithm,
    ) -> Result<String, DomainError> {
        if algorithm.is_symmetric() {
            return self.resolve_private(kid).await.map(|key| key.private_key);
        }

        if let Some(public_key) = self.keys.get(kid).and_then(|key| key.public_key.clone()) {
            debug!(kid, "Using configured public key");
            return Ok(public_key);
        }

        if let Some(cached) = self.public_cache.get(kid).await {
            debug!(kid, "Cache hit for public key");
            return Ok(cached);
        }

        if let Some(source) = &self.public_source {
            debug!(kid, source = source.source_name(), "Cache miss, fetching public key");
            if let Some(public_key) = source.public_key(kid).await? {
                self.public_cache
                    .insert(kid.to_string(), public_key.clone())
                    .await;
                return Ok(public_key);
            }
        }

        Err(DomainError::key_not_found(format!(
            "Public key \"{}\" could not be found",
            kid
        )))
    }

    /// Drops every fetched key; configured keys are kept
    pub fn invalidate_fetched(&self) {
        self.private_cache.invalidate_all();
        self.public_cache.invalidate_all();
    }
}

impl Default for KeyResolver {
    fn default() -> Self {
        Self::new(HashMap::new())
    }
}
