use serde_json::{Map, Value};

use crate::domain::key::SigningAlgorithm;

/// Default token lifetime
pub const DEFAULT_EXPIRES_IN_SECS: u64 = 3600;

/// Default allowance for clock drift when verifying time claims
pub const DEFAULT_CLOCK_TOLERANCE_SECS: u64 = 5;

/// Options for [`Token::sign`](super::Token::sign)
#[derive(Debug, Clone, Default)]
pub struct SigningOptions {
    /// Subject; optional only when the token already has a `sub` claim
    pub subject: Option<String>,
    /// Overrides the configured default audience
    pub audience: Option<String>,
    /// Overrides the configured default issuer
    pub issuer: Option<String>,
    /// Overrides the configured default lifetime
    pub expires_in_secs: Option<u64>,
    /// Leaves out the `iat` claim
    pub no_timestamp: bool,
    /// Additional header fields
    pub header: Map<String, Value>,
}

impl SigningOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    pub fn with_expires_in_secs(mut self, secs: u64) -> Self {
        self.expires_in_secs = Some(secs);
        self
    }

    pub fn without_timestamp(mut self) -> Self {
        self.no_timestamp = true;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.header.insert(name.into(), value.into());
        self
    }
}

/// Options for [`Token::verify`](super::Token::verify)
#[derive(Debug, Clone, Default)]
pub struct VerificationOptions {
    /// Expected audience; falls back to the token's own claim, then the default
    pub audience: Option<String>,
    /// Expected issuer; falls back to the token's own claim, then the default
    pub issuer: Option<String>,
    /// Allowed algorithms; any supported algorithm when unset
    pub algorithms: Option<Vec<SigningAlgorithm>>,
    /// Accept tokens past their `exp`
    pub ignore_expiration: bool,
    /// Reject tokens whose `iat` is older than this, even when expiration is ignored
    pub max_age_secs: Option<u64>,
    /// Defaults to [`DEFAULT_CLOCK_TOLERANCE_SECS`]
    pub clock_tolerance_secs: Option<u64>,
    /// Expected `nonce` claim
    pub nonce: Option<String>,
    /// Verification key material used instead of resolving the header `kid`
    pub key: Option<String>,
}

impl VerificationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    pub fn with_algorithms(mut self, algorithms: impl IntoIterator<Item = SigningAlgorithm>) -> Self {
        self.algorithms = Some(algorithms.into_iter().collect());
        self
    }

    pub fn ignoring_expiration(mut self) -> Self {
        self.ignore_expiration = true;
        self
    }

    pub fn with_max_age_secs(mut self, secs: u64) -> Self {
        self.max_age_secs = Some(secs);
        self
    }

    pub fn with_clock_tolerance_secs(mut self, secs: u64) -> Self {
        self.clock_tolerance_secs = Some(secs);
        self
    }

    pub fn with_nonce(mut self, nonce: impl Into<String>) -> Self {
        self.nonce = Some(nonce.into());
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }
}
