//! Closure adapters for scope and key sources
//!
//! Sources are asynchronous traits. Plain closures are wrapped here so a
//! synchronous lookup and an `async` one satisfy the same contract:
//!
//! ```ignore
//! let scopes = source::from_fn(|| Ok(load_scope_map()));
//! let keys = source::from_async_fn(|kid: String| async move { vault.private_key(&kid).await });
//! ```

use std::fmt;
use std::future::Future;

use async_trait::async_trait;

use crate::domain::key::{PrivateKeyDefinition, PrivateKeySource, PublicKeySource};
use crate::domain::scope::{DomainScopeMap, ScopeSource};
use crate::domain::DomainError;

/// Source backed by a synchronous closure
pub struct FnSource<F> {
    f: F,
}

/// Source backed by a closure returning a future
pub struct AsyncFnSource<F> {
    f: F,
}

pub fn from_fn<F>(f: F) -> FnSource<F> {
    FnSource { f }
}

pub fn from_async_fn<F>(f: F) -> AsyncFnSource<F> {
    AsyncFnSource { f }
}

impl<F> fmt::Debug for FnSource<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnSource").finish_non_exhaustive()
    }
}

impl<F> fmt::Debug for AsyncFnSource<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncFnSource").finish_non_exhaustive()
    }
}

#[async_trait]
impl<F> ScopeSource for FnSource<F>
where
    F: Fn() -> Result<DomainScopeMap, DomainError> + Send + Sync,
{
    async fn refresh_scopes(&self) -> Result<DomainScopeMap, DomainError> {
        (self.f)()
    }

    fn source_name(&self) -> &'static str {
        "fn"
    }
}

#[async_trait]
impl<F, Fut> ScopeSource for AsyncFnSource<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<DomainScopeMap, DomainError>> + Send,
{
    async fn refresh_scopes(&self) -> Result<DomainScopeMap, DomainError> {
        (self.f)().await
    }

    fn source_name(&self) -> &'static str {
        "async_fn"
    }
}

#[async_trait]
impl<F> PrivateKeySource for FnSource<F>
where
    F: Fn(&str) -> Result<Option<PrivateKeyDefinition>, DomainError> + Send + Sync,
{
    async fn private_key(&self, kid: &str) -> Result<Option<PrivateKeyDefinition>, DomainError> {
        (self.f)(kid)
    }

    fn source_name(&self) -> &'static str {
        "fn"
    }
}

#[async_trait]
impl<F, Fut> PrivateKeySource for AsyncFnSource<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<PrivateKeyDefinition>, DomainError>> + Send,
{
    async fn private_key(&self, kid: &str) -> Result<Option<PrivateKeyDefinition>, DomainError> {
        (self.f)(kid.to_string()).await
    }

    fn source_name(&self) -> &'static str {
        "async_fn"
    }
}

#[async_trait]
impl<F> PublicKeySource for FnSource<F>
where
    F: Fn(&str) -> Result<Option<String>, DomainError> + Send + Sync,
{
    async fn public_key(&self, kid: &str) -> Result<Option<String>, DomainError> {
        (self.f)(kid)
    }

    fn source_name(&self) -> &'static str {
        "fn"
    }
}

#[async_trait]
impl<F, Fut> PublicKeySource for AsyncFnSource<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<String>, DomainError>> + Send,
{
    async fn public_key(&self, kid: &str) -> Result<Option<String>, DomainError> {
        (self.f)(kid.to_string()).await
    }

    fn source_name(&self) -> &'static str {
        "async_fn"
    }
}
