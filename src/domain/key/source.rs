use std::fmt::Debug;

use async_trait::async_trait;

use super::PrivateKeyDefinition;
use crate::domain::DomainError;

/// Looks up signing material (or an HMAC secret) for a key id not held locally
#[async_trait]
pub trait PrivateKeySource: Send + Sync + Debug {
    /// `Ok(None)` means the source does not know the key id
    async fn private_key(&self, kid: &str) -> Result<Option<PrivateKeyDefinition>, DomainError>;

    /// Get source name for logging/debugging
    fn source_name(&self) -> &'static str {
        "private_key"
    }
}

/// Looks up the public half of an asymmetric key pair
#[async_trait]
pub trait PublicKeySource: Send + Sync + Debug {
    /// `Ok(None)` means the source does not know the key id
    async fn public_key(&self, kid: &str) -> Result<Option<String>, DomainError>;

    /// Get source name for logging/debugging
    fn source_name(&self) -> &'static str {
        "public_key"
    }
}
