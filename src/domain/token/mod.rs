//! Token domain - claims, signing options and the token entity

mod claims;
mod crypto;
mod entity;
mod header;
mod options;

pub use claims::{Audience, Claims, DomainOptions};
pub use crypto::{
    DecodedToken, SignParams, TokenCrypto, TokenDecoder, TokenSigner, TokenVerifier, VerifyParams,
};
pub use entity::Token;
pub use header::TokenHeader;
pub use options::{
    SigningOptions, VerificationOptions, DEFAULT_CLOCK_TOLERANCE_SECS, DEFAULT_EXPIRES_IN_SECS,
};
