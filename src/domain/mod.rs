//! Domain layer - Scopes, keys and the token entity

pub mod context;
pub mod error;
pub mod factory;
pub mod key;
pub mod scope;
pub mod source;
pub mod token;

pub use context::{TokenContext, TokenContextBuilder, TokenDefaults};
pub use error::DomainError;
pub use factory::TokenFactory;
pub use key::{
    KeyDefinition, KeyResolver, PrivateKeyDefinition, PrivateKeySource, PublicKeySource,
    SigningAlgorithm, ASYMMETRIC_ALGORITHMS, SYMMETRIC_ALGORITHMS,
};
pub use scope::{DomainScopeMap, ScopeName, ScopeRegistry, ScopeSet, ScopeSource};
pub use token::{Audience, Claims, SigningOptions, Token, TokenHeader, VerificationOptions};
