//! Token factory
//!
//! Creates and parses tokens that all share one [`TokenContext`].

use std::sync::Arc;

use super::context::{TokenContext, TokenContextBuilder};
use super::token::{Claims, Token, TokenCrypto};
use super::DomainError;

#[derive(Debug, Clone)]
pub struct TokenFactory {
    context: Arc<TokenContext>,
}

impl TokenFactory {
    pub fn new(context: TokenContext) -> Self {
        Self {
            context: Arc::new(context),
        }
    }

    pub fn builder(crypto: Arc<dyn TokenCrypto>) -> TokenContextBuilder {
        TokenContext::builder(crypto)
    }

    pub fn context(&self) -> &Arc<TokenContext> {
        &self.context
    }

    /// New unsigned token without claims
    pub fn create_token(&self) -> Token {
        Token::new(Arc::clone(&self.context))
    }

    /// New unsigned token seeded with claims
    pub fn create_token_with_claims(&self, claims: Claims) -> Result<Token, DomainError> {
        Token::with_claims(Arc::clone(&self.context), claims)
    }

    /// Reads a wire token without checking its signature
    pub fn parse_token(&self, wire: &str) -> Result<Token, DomainError> {
        Token::parse(Arc::clone(&self.context), wire)
    }
}

impl From<TokenContext> for TokenFactory {
    fn from(context: TokenContext) -> Self {
        Self::new(context)
    }
}
