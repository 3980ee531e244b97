//! Shared token configuration and caches
//!
//! One `TokenContext` backs every token created by a factory. It is held
//! behind an `Arc`; a scope refresh or fetched key triggered by one token is
//! immediately visible to all of its siblings.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::key::{KeyDefinition, KeyResolver, PrivateKeySource, PublicKeySource};
use crate::domain::scope::{DomainScopeMap, ScopeRegistry, ScopeSource, DEFAULT_REFRESH_COOL_DOWN};
use crate::domain::token::{TokenCrypto, DEFAULT_EXPIRES_IN_SECS};
use crate::domain::DomainError;

/// Values applied when signing options leave them unset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenDefaults {
    pub expires_in_secs: u64,
    pub audience: Option<String>,
    pub issuer: Option<String>,
}

impl Default for TokenDefaults {
    fn default() -> Self {
        Self {
            expires_in_secs: DEFAULT_EXPIRES_IN_SECS,
            audience: None,
            issuer: None,
        }
    }
}

#[derive(Debug)]
pub struct TokenContext {
    defaults: TokenDefaults,
    scopes: ScopeRegistry,
    keys: KeyResolver,
    crypto: Arc<dyn TokenCrypto>,
}

impl TokenContext {
    pub fn builder(crypto: Arc<dyn TokenCrypto>) -> TokenContextBuilder {
        TokenContextBuilder::new(crypto)
    }

    pub fn defaults(&self) -> &TokenDefaults {
        &self.defaults
    }

    pub fn scopes(&self) -> &ScopeRegistry {
        &self.scopes
    }

    pub fn keys(&self) -> &KeyResolver {
        &self.keys
    }

    pub fn crypto(&self) -> &dyn TokenCrypto {
        self.crypto.as_ref()
    }
}

/// Builder for [`TokenContext`]
#[derive(Debug)]
pub struct TokenContextBuilder {
    crypto: Arc<dyn TokenCrypto>,
    defaults: TokenDefaults,
    keys: HashMap<String, KeyDefinition>,
    scopes: DomainScopeMap,
    scope_source: Option<Arc<dyn ScopeSource>>,
    private_key_source: Option<Arc<dyn PrivateKeySource>>,
    public_key_source: Option<Arc<dyn PublicKeySource>>,
    refresh_cool_down: Duration,
}

impl TokenContextBuilder {
    pub fn new(crypto: Arc<dyn TokenCrypto>) -> Self {
        Self {
            crypto,
            defaults: TokenDefaults::default(),
            keys: HashMap::new(),
            scopes: DomainScopeMap::new(),
            scope_source: None,
            private_key_source: None,
            public_key_source: None,
            refresh_cool_down: DEFAULT_REFRESH_COOL_DOWN,
        }
    }

    pub fn expires_in_secs(mut self, secs: u64) -> Self {
        self.defaults.expires_in_secs = secs;
        self
    }

    pub fn audience(mut self, audience: impl Into<String>) -> Self {
        self.defaults.audience = Some(audience.into());
        self
    }

    pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
        self.defaults.issuer = Some(issuer.into());
        self
    }

    pub fn key(mut self, kid: impl Into<String>, key: KeyDefinition) -> Self {
        self.keys.insert(kid.into(), key);
        self
    }

    pub fn keys(mut self, keys: HashMap<String, KeyDefinition>) -> Self {
        self.keys.extend(keys);
        self
    }

    /// Initial scope map; indexes must never be reassigned once tokens exist
    pub fn scopes(mut self, scopes: DomainScopeMap) -> Self {
        for (domain, map) in scopes {
            self.scopes.entry(domain).or_default().extend(map);
        }
        self
    }

    pub fn scope(mut self, domain: impl Into<String>, scope: impl Into<String>, index: u32) -> Self {
        self.scopes
            .entry(domain.into())
            .or_default()
            .insert(scope.into(), index);
        self
    }

    pub fn scope_source(mut self, source: Arc<dyn ScopeSource>) -> Self {
        self.scope_source = Some(source);
        self
    }

    pub fn private_key_source(mut self, source: Arc<dyn PrivateKeySource>) -> Self {
        self.private_key_source = Some(source);
        self
    }

    pub fn public_key_source(mut self, source: Arc<dyn PublicKeySource>) -> Self {
        self.public_key_source = Some(source);
        self
    }

    /// Minimum time between two scope refreshes
    pub fn refresh_scopes_after(mut self, cool_down: Duration) -> Self {
        self.refresh_cool_down = cool_down;
        self
    }

    /// Validates the configured keys and builds the context
    pub fn build(self) -> Result<TokenContext, DomainError> {
        for (kid, key) in &self.keys {
            key.validate().map_err(|e| {
                DomainError::configuration(format!("Invalid key \"{}\": {}", kid, e))
            })?;
        }

        let mut scopes = ScopeRegistry::new(self.scopes).with_cool_down(self.refresh_cool_down);
        if let Some(source) = self.scope_source {
            scopes = scopes.with_source(source);
        }

        let mut keys = KeyResolver::new(self.keys);
        if let Some(source) = self.private_key_source {
            keys = keys.with_private_source(source);
        }
        if let Some(source) = self.public_key_source {
            keys = keys.with_public_source(source);
        }

        Ok(TokenContext {
            defaults: self.defaults,
            scopes,
            keys,
            crypto: self.crypto,
        })
    }
}
