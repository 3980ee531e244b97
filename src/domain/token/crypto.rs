//! Token cryptography seams
//!
//! The token entity never touches key material formats or signature
//! algorithms directly. Signing, verification and raw decoding are delegated
//! to an implementation of these traits, usually `JwtCrypto`.

use std::fmt::Debug;

use serde_json::{Map, Value};

use super::{Audience, Claims, TokenHeader};
use crate::domain::key::{PrivateKeyDefinition, SigningAlgorithm};
use crate::domain::DomainError;

/// Header and payload of a token, read without checking its signature
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedToken {
    pub header: TokenHeader,
    pub claims: Claims,
}

/// Resolved parameters for a signing operation
#[derive(Debug, Clone, Default)]
pub struct SignParams {
    pub kid: String,
    pub expires_in_secs: u64,
    pub subject: Option<String>,
    pub audience: Option<String>,
    pub issuer: Option<String>,
    pub no_timestamp: bool,
    /// Extra header fields; `alg` and `kid` always win over these
    pub header: Map<String, Value>,
}

/// Resolved parameters for a verification
#[derive(Debug, Clone)]
pub struct VerifyParams {
    /// Algorithm announced by the token header
    pub algorithm: SigningAlgorithm,
    /// Accepted algorithms; the header algorithm alone when unset
    pub algorithms: Option<Vec<SigningAlgorithm>>,
    pub ignore_expiration: bool,
    pub clock_tolerance_secs: u64,
    pub max_age_secs: Option<u64>,
    /// Accepted audiences; any one of them present in `aud` passes
    pub audience: Option<Audience>,
    pub issuer: Option<String>,
    pub nonce: Option<String>,
}

/// Reads a wire token without verifying it
pub trait TokenDecoder: Send + Sync + Debug {
    fn decode(&self, token: &str) -> Result<DecodedToken, DomainError>;
}

/// Produces a signed wire token from claims
pub trait TokenSigner: Send + Sync + Debug {
    /// Stamps `iat`, `exp`, `sub`, `aud` and `iss` from `params` and signs.
    fn sign(
        &self,
        claims: &Claims,
        key: &PrivateKeyDefinition,
        params: &SignParams,
    ) -> Result<String, DomainError>;
}

/// Checks a wire token's signature and time claims
pub trait TokenVerifier: Send + Sync + Debug {
    /// `key` is the shared secret for HMAC algorithms and the public key PEM
    /// otherwise. Returns the verified claims.
    fn verify(&self, token: &str, key: &str, params: &VerifyParams) -> Result<Claims, DomainError>;
}

/// Everything a token context needs from its cryptography backend
pub trait TokenCrypto: TokenDecoder + TokenSigner + TokenVerifier {}

impl<T> TokenCrypto for T where T: TokenDecoder + TokenSigner + TokenVerifier {}
