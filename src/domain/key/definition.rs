use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use super::SigningAlgorithm;
use crate::domain::DomainError;

/// Statically configured key material for one key id.
///
/// Symmetric algorithms keep their shared secret in `private_key` and use it
/// for both signing and verifying. Asymmetric algorithms need `public_key` to
/// verify and `private_key` to sign.
#[derive(Clone, Serialize, Deserialize)]
pub struct KeyDefinition {
    pub algorithm: SigningAlgorithm,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
}

impl Debug for KeyDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyDefinition")
            .field("algorithm", &self.algorithm)
            .field("private_key", &self.private_key.as_ref().map(|_| "[hidden]"))
            .field("public_key", &self.public_key.is_some())
            .finish()
    }
}

impl KeyDefinition {
    /// HMAC key whose secret signs and verifies
    pub fn shared_secret(algorithm: SigningAlgorithm, secret: impl Into<String>) -> Self {
        Self {
            algorithm,
            private_key: Some(secret.into()),
            public_key: None,
        }
    }

    /// PEM key pair
    pub fn key_pair(
        algorithm: SigningAlgorithm,
        private_pem: impl Into<String>,
        public_pem: impl Into<String>,
    ) -> Self {
        Self {
            algorithm,
            private_key: Some(private_pem.into()),
            public_key: Some(public_pem.into()),
        }
    }

    /// Private PEM only; verification needs a public key source
    pub fn private_only(algorithm: SigningAlgorithm, private_pem: impl Into<String>) -> Self {
        Self {
            algorithm,
            private_key: Some(private_pem.into()),
            public_key: None,
        }
    }

    /// Public PEM only; signing needs a private key source
    pub fn public_only(algorithm: SigningAlgorithm, public_pem: impl Into<String>) -> Self {
        Self {
            algorithm,
            private_key: None,
            public_key: Some(public_pem.into()),
        }
    }

    /// Rejects definitions that can neither sign nor verify
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.algorithm.is_symmetric() {
            if self.private_key.is_none() {
                return Err(DomainError::configuration(format!(
                    "{} keys require a shared secret",
                    self.algorithm
                )));
            }
            if self.public_key.is_some() {
                return Err(DomainError::configuration(format!(
                    "{} keys have no public half",
                    self.algorithm
                )));
            }
        } else if self.private_key.is_none() && self.public_key.is_none() {
            return Err(DomainError::configuration(format!(
                "{} key defines neither a private nor a public key",
                self.algorithm
            )));
        }
        Ok(())
    }

    pub fn private_definition(&self) -> Option<PrivateKeyDefinition> {
        self.private_key.as_ref().map(|private_key| PrivateKeyDefinition {
            private_key: private_key.clone(),
            algorithm: self.algorithm,
        })
    }
}

/// Signing material resolved for a key id
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateKeyDefinition {
    pub private_key: String,
    pub algorithm: SigningAlgorithm,
}

impl PrivateKeyDefinition {
    pub fn new(algorithm: SigningAlgorithm, private_key: impl Into<String>) -> Self {
        Self {
            private_key: private_key.into(),
            algorithm,
        }
    }
}

impl Debug for PrivateKeyDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKeyDefinition")
            .field("private_key", &"[hidden]")
            .field("algorithm", &self.algorithm)
            .finish()
    }
}
