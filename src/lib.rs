//! scopegate
//!
//! Signed bearer tokens with a compact, bit-packed permission claim:
//! - Per-domain scope bits packed into a single `scope` claim
//! - Scope name to bit index resolution with lazy, rate-limited refresh
//! - Key resolution by key id with cached, late-bound key sources
//! - Signing and verification on top of `jsonwebtoken`
//!
//! ```no_run
//! # async fn demo() -> Result<(), scopegate::DomainError> {
//! use scopegate::{KeyDefinition, SigningAlgorithm, SigningOptions, TokenFactory};
//!
//! let factory = TokenFactory::new(
//!     scopegate::factory_builder()
//!         .key("k1", KeyDefinition::shared_secret(SigningAlgorithm::HS256, "secret"))
//!         .scope("billing", "read", 0)
//!         .build()?,
//! );
//!
//! let mut token = factory.create_token();
//! token.grant_scope("billing|read").await?;
//! let wire = token.sign("k1", SigningOptions::new().with_subject("alice")).await?;
//! # let _ = wire;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

use std::sync::Arc;

pub use config::AppConfig;
pub use domain::{
    Claims, DomainError, KeyDefinition, ScopeName, ScopeSet, SigningAlgorithm, SigningOptions,
    Token, TokenContext, TokenContextBuilder, TokenFactory, VerificationOptions,
};
pub use infrastructure::JwtCrypto;

/// Context builder preconfigured with the `jsonwebtoken` backend
pub fn factory_builder() -> TokenContextBuilder {
    TokenFactory::builder(Arc::new(JwtCrypto::new()))
}
