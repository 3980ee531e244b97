//! The token entity
//!
//! A token starts either unsigned (fresh, or built from claims) or signed
//! (parsed from a wire string without checking its signature). Scope grants
//! and options mutate the in-memory claims only; the wire string changes on
//! the next [`Token::sign`].

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use super::{
    Audience, Claims, SignParams, SigningOptions, TokenHeader, VerificationOptions, VerifyParams,
    DEFAULT_CLOCK_TOLERANCE_SECS,
};
use crate::domain::context::TokenContext;
use crate::domain::scope::{DomainBlobs, ScopeCodec, ScopeName, ScopeSet};
use crate::domain::DomainError;

#[derive(Debug, Clone, PartialEq)]
enum TokenState {
    Unsigned,
    Signed { wire: String, header: TokenHeader },
}

/// Bearer token with packed per-domain scopes
#[derive(Debug, Clone)]
pub struct Token {
    context: Arc<TokenContext>,
    claims: Claims,
    blobs: DomainBlobs,
    state: TokenState,
}

impl Token {
    /// Fresh unsigned token without claims
    pub fn new(context: Arc<TokenContext>) -> Self {
        Self {
            context,
            claims: Claims::default(),
            blobs: DomainBlobs::new(),
            state: TokenState::Unsigned,
        }
    }

    /// Unsigned token seeded with claims; an existing `scope` claim is decoded
    pub fn with_claims(context: Arc<TokenContext>, claims: Claims) -> Result<Self, DomainError> {
        let blobs = decode_scope(&claims)?;
        Ok(Self {
            context,
            claims,
            blobs,
            state: TokenState::Unsigned,
        })
    }

    /// Reads a wire token. The signature is not checked until [`Token::verify`].
    pub fn parse(context: Arc<TokenContext>, wire: &str) -> Result<Self, DomainError> {
        let decoded = context.crypto().decode(wire)?;
        let blobs = decode_scope(&decoded.claims)?;
        Ok(Self {
            context,
            claims: decoded.claims,
            blobs,
            state: TokenState::Signed {
                wire: wire.to_string(),
                header: decoded.header,
            },
        })
    }

    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    pub fn claims_mut(&mut self) -> &mut Claims {
        &mut self.claims
    }

    pub fn blobs(&self) -> &DomainBlobs {
        &self.blobs
    }

    /// Header of the last signed or parsed wire string
    pub fn header(&self) -> Option<&TokenHeader> {
        match &self.state {
            TokenState::Signed { header, .. } => Some(header),
            TokenState::Unsigned => None,
        }
    }

    /// Last signed or parsed wire string
    pub fn token_string(&self) -> Option<&str> {
        match &self.state {
            TokenState::Signed { wire, .. } => Some(wire),
            TokenState::Unsigned => None,
        }
    }

    pub fn is_signed(&self) -> bool {
        matches!(self.state, TokenState::Signed { .. })
    }

    pub fn get_option(&self, domain: &str, key: &str) -> Option<&Value> {
        self.claims.get_option(domain, key)
    }

    pub fn set_option(&mut self, domain: &str, key: &str, value: impl Into<Value>) {
        self.claims.set_option(domain, key, value);
    }

    /// Grants a scope, given as a [`ScopeName`] or a `"domain|scope"` string
    pub async fn grant_scope(&mut self, scope: impl Into<ScopeName>) -> Result<(), DomainError> {
        let name = scope.into();
        let index = self.context.scopes().resolve_index(&name).await?;
        self.blobs.grant(name.domain(), index);
        Ok(())
    }

    pub async fn revoke_scope(&mut self, scope: impl Into<ScopeName>) -> Result<(), DomainError> {
        let name = scope.into();
        let index = self.context.scopes().resolve_index(&name).await?;
        self.blobs.revoke(name.domain(), index);
        Ok(())
    }

    /// Fails with `ScopeNotFound` for names the scope map does not know
    pub async fn has_scope(&self, scope: impl Into<ScopeName>) -> Result<bool, DomainError> {
        let name = scope.into();
        let index = self.context.scopes().resolve_index(&name).await?;
        Ok(self.blobs.contains(name.domain(), index))
    }

    pub async fn grant_scopes(&mut self, scopes: &ScopeSet) -> Result<(), DomainError> {
        for name in scopes.iter() {
            self.grant_scope(name).await?;
        }
        Ok(())
    }

    pub async fn revoke_scopes(&mut self, scopes: &ScopeSet) -> Result<(), DomainError> {
        for name in scopes.iter() {
            self.revoke_scope(name).await?;
        }
        Ok(())
    }

    /// True only when every scope of the set is granted
    pub async fn has_scopes(&self, scopes: &ScopeSet) -> Result<bool, DomainError> {
        for name in scopes.iter() {
            if !self.has_scope(name).await? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Signs the token with the key registered as `kid` and returns the wire
    /// string.
    ///
    /// A subject is required, either in `options` or as an existing claim.
    /// Any previous `exp` claim is replaced by the configured lifetime.
    pub async fn sign(&mut self, kid: &str, options: SigningOptions) -> Result<String, DomainError> {
        let subject = options.subject.or_else(|| self.claims.sub.clone());
        if subject.is_none() {
            return Err(DomainError::validation("A subject is required to sign a token"));
        }

        self.claims.exp = None;
        self.claims.scope = if self.blobs.is_empty() {
            None
        } else {
            Some(ScopeCodec::encode(&self.blobs))
        };

        let context = Arc::clone(&self.context);
        let key = context.keys().resolve_private(kid).await?;

        let defaults = context.defaults();
        let params = SignParams {
            kid: kid.to_string(),
            expires_in_secs: options.expires_in_secs.unwrap_or(defaults.expires_in_secs),
            subject,
            audience: options.audience.or_else(|| defaults.audience.clone()),
            issuer: options.issuer.or_else(|| defaults.issuer.clone()),
            no_timestamp: options.no_timestamp,
            header: options.header,
        };

        let wire = context.crypto().sign(&self.claims, &key, &params)?;
        let decoded = context.crypto().decode(&wire)?;
        debug!(kid, algorithm = %key.algorithm, "Signed token");

        self.claims = decoded.claims;
        self.state = TokenState::Signed {
            wire: wire.clone(),
            header: decoded.header,
        };
        Ok(wire)
    }

    /// Verifies the signature and time claims of the signed wire string and
    /// returns its claims.
    ///
    /// Expected audience and issuer come from `options`, then from the
    /// token's own claims, then from the context defaults.
    pub async fn verify(&self, options: VerificationOptions) -> Result<Claims, DomainError> {
        let TokenState::Signed { wire, header } = &self.state else {
            return Err(DomainError::validation("No token string to verify"));
        };

        let defaults = self.context.defaults();
        let audience = options
            .audience
            .map(Audience::from)
            .or_else(|| self.claims.aud.clone())
            .or_else(|| defaults.audience.clone().map(Audience::from));
        let issuer = options
            .issuer
            .or_else(|| self.claims.iss.clone())
            .or_else(|| defaults.issuer.clone());

        let key = match options.key {
            Some(key) => key,
            None => {
                let kid = header.kid.as_deref().ok_or_else(|| {
                    DomainError::key_not_found("Token header does not name a key")
                })?;
                self.context.keys().resolve_verification(kid, header.alg).await?
            }
        };

        let params = VerifyParams {
            algorithm: header.alg,
            algorithms: options.algorithms,
            ignore_expiration: options.ignore_expiration,
            clock_tolerance_secs: options
                .clock_tolerance_secs
                .unwrap_or(DEFAULT_CLOCK_TOLERANCE_SECS),
            max_age_secs: options.max_age_secs,
            audience,
            issuer,
            nonce: options.nonce,
        };

        let claims = self.context.crypto().verify(wire, &key, &params)?;
        debug!(kid = ?header.kid, algorithm = %header.alg, "Verified token");
        Ok(claims)
    }
}

fn decode_scope(claims: &Claims) -> Result<DomainBlobs, DomainError> {
    match claims.scope.as_deref() {
        Some(scope) => ScopeCodec::decode(scope),
        None => Ok(DomainBlobs::new()),
    }
}
