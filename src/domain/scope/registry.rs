//! Scope name to bit index resolution
//!
//! The registry is shared by every token built from one `TokenContext`.
//! Concurrent lookups only take read locks.
//! Two tokens missing the same scope at the same moment may both call the
//! refresh source; that duplicate work is accepted rather than serialized.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::ScopeName;
use crate::domain::DomainError;

/// Domain -> (scope name -> bit index)
pub type DomainScopeMap = HashMap<String, HashMap<String, u32>>;

/// Default minimum time between two scope refreshes
pub const DEFAULT_REFRESH_COOL_DOWN: Duration = Duration::from_millis(1000);

/// Supplies a fresh scope map when an unknown scope is requested
#[async_trait]
pub trait ScopeSource: Send + Sync + Debug {
    /// Returns the full, current scope map
    async fn refresh_scopes(&self) -> Result<DomainScopeMap, DomainError>;

    /// Get source name for logging/debugging
    fn source_name(&self) -> &'static str {
        "scopes"
    }
}

/// Shared, lazily refreshed scope index map
#[derive(Debug)]
pub struct ScopeRegistry {
    scopes: RwLock<DomainScopeMap>,
    source: Option<Arc<dyn ScopeSource>>,
    cool_down: Duration,
    last_refresh: RwLock<Option<Instant>>,
}

impl ScopeRegistry {
    pub fn new(scopes: DomainScopeMap) -> Self {
        Self {
            scopes: RwLock::new(scopes),
            source: None,
            cool_down: DEFAULT_REFRESH_COOL_DOWN,
            last_refresh: RwLock::new(None),
        }
    }

    pub fn with_source(mut self, source: Arc<dyn ScopeSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_cool_down(mut self, cool_down: Duration) -> Self {
        self.cool_down = cool_down;
        self
    }

    pub fn cool_down(&self) -> Duration {
        self.cool_down
    }

    /// Resolves a scope to its bit index, refreshing the map at most once.
    ///
    /// A refresh is attempted only when a source is configured and the last
    /// refresh is older than the cool-down window. A miss after the refresh is
    /// final.
    pub async fn resolve_index(&self, name: &ScopeName) -> Result<u32, DomainError> {
        if let Some(index) = self.cached_index(name).await {
            return Ok(index);
        }

        if !self.refresh_allowed().await {
            return Err(not_found(name));
        }

        self.refresh().await?;
        self.cached_index(name).await.ok_or_else(|| not_found(name))
    }

    /// Pulls a new map from the source and stamps the refresh time.
    ///
    /// Every domain present in the response replaces the known domain as a
    /// whole. Scopes of a touched domain that the response omits are dropped;
    /// domains absent from the response are kept unchanged.
    pub async fn refresh(&self) -> Result<(), DomainError> {
        let Some(source) = &self.source else {
            return Err(DomainError::configuration("No scope source configured"));
        };

        let fresh = source.refresh_scopes().await?;
        let domains = fresh.len();
        {
            let mut scopes = self.scopes.write().await;
            for (domain, map) in fresh {
                scopes.insert(domain, map);
            }
        }
        *self.last_refresh.write().await = Some(Instant::now());

        info!(
            source = source.source_name(),
            domains, "Refreshed scope map"
        );
        Ok(())
    }

    /// Copy of the currently known scope map
    pub async fn snapshot(&self) -> DomainScopeMap {
        self.scopes.read().await.clone()
    }

    async fn cached_index(&self, name: &ScopeName) -> Option<u32> {
        let index = self
            .scopes
            .read()
            .await
            .get(name.domain())
            .and_then(|domain| domain.get(name.scope()))
            .copied();
        debug!(scope = %name, ?index, "Scope lookup");
        index
    }

    async fn refresh_allowed(&self) -> bool {
        if self.source.is_none() {
            return false;
        }
        match *self.last_refresh.read().await {
            Some(at) if at.elapsed() < self.cool_down => {
                warn!(
                    cool_down_ms = self.cool_down.as_millis() as u64,
                    "Scope refresh suppressed by cool-down window"
                );
                false
            }
            _ => true,
        }
    }
}

impl Default for ScopeRegistry {
    fn default() -> Self {
        Self::new(DomainScopeMap::new())
    }
}

fn not_found(name: &ScopeName) -> DomainError {
    DomainError::scope_not_found(name.to_string())
}

/// Builds a [`DomainScopeMap`] from `(domain, [(scope, index)])` literals
pub fn scope_map<'a, I, S>(domains: I) -> DomainScopeMap
where
    I: IntoIterator<Item = (&'a str, S)>,
    S: IntoIterator<Item = (&'a str, u32)>,
{
    domains
        .into_iter()
        .map(|(domain, scopes)| {
            let scopes = scopes
                .into_iter()
                .map(|(scope, index)| (scope.to_string(), index))
                .collect();
            (domain.to_string(), scopes)
        })
        .collect()
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Scope source that hands out queued responses and counts calls
    #[derive(Debug)]
    pub struct CountingScopeSource {
        responses: Mutex<Vec<DomainScopeMap>>,
        fallback: DomainScopeMap,
        calls: AtomicUsize,
    }

    impl CountingScopeSource {
        pub fn new(fallback: DomainScopeMap) -> Self {
            Self {
                responses: Mutex::new(Vec::new()),
                fallback,
                calls: AtomicUsize::new(0),
            }
        }

        /// Queues a response returned before the fallback, first in first out
        pub fn then(self, response: DomainScopeMap) -> Self {
            self.responses.lock().unwrap().push(response);
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ScopeSource for CountingScopeSource {
        async fn refresh_scopes(&self) -> Result<DomainScopeMap, DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                Ok(self.fallback.clone())
            } else {
                Ok(responses.remove(0))
            }
        }

        fn source_name(&self) -> &'static str {
            "counting"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::CountingScopeSource;
    use super::*;

    fn known() -> DomainScopeMap {
        scope_map([("foo", vec![("bar", 0), ("baz", 1)]), ("app", vec![("bap", 0)])])
    }

    #[tokio::test]
    async fn test_resolves_known_scope() {
        let registry = ScopeRegistry::new(known());
        let index = registry
            .resolve_index(&ScopeName::new("foo", "baz"))
            .await
            .unwrap();
        assert_eq!(index, 1);
    }

    #[tokio::test]
    async fn test_unknown_scope_without_source() {
        let registry = ScopeRegistry::new(known());
        let err = registry
            .resolve_index(&ScopeName::new("foo", "nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ScopeNotFound { .. }));
    }

    #[tokio::test]
    async fn test_one_refresh_serves_several_lookups() {
        let source = Arc::new(CountingScopeSource::new(known()));
        let registry = ScopeRegistry::new(DomainScopeMap::new()).with_source(source.clone());

        assert_eq!(registry.resolve_index(&ScopeName::new("foo", "bar")).await.unwrap(), 0);
        assert_eq!(registry.resolve_index(&ScopeName::new("foo", "baz")).await.unwrap(), 1);
        assert_eq!(source.call_count(), 1);
    }

    #[tokio::test]
    async fn test_cool_down_window() {
        let source = Arc::new(
            CountingScopeSource::new(scope_map([("bar", vec![("baz", 2)])])).then(known()),
        );
        let registry = ScopeRegistry::new(DomainScopeMap::new())
            .with_source(source.clone())
            .with_cool_down(Duration::from_millis(50));

        registry.resolve_index(&ScopeName::new("foo", "bar")).await.unwrap();
        registry.resolve_index(&ScopeName::new("foo", "baz")).await.unwrap();
        assert_eq!(source.call_count(), 1);

        let err = registry
            .resolve_index(&ScopeName::new("bar", "baz"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ScopeNotFound { .. }));
        assert_eq!(source.call_count(), 1);

        tokio::time::sleep(Duration::from_millis(60)).await;
        let index = registry.resolve_index(&ScopeName::new("bar", "baz")).await.unwrap();
        assert_eq!(index, 2);
        assert_eq!(source.call_count(), 2);
    }

    #[tokio::test]
    async fn test_second_miss_is_final() {
        let source = Arc::new(CountingScopeSource::new(known()));
        let registry = ScopeRegistry::new(DomainScopeMap::new())
            .with_source(source.clone())
            .with_cool_down(Duration::ZERO);

        let err = registry
            .resolve_index(&ScopeName::new("foo", "missing"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ScopeNotFound { .. }));
        assert_eq!(source.call_count(), 1);
    }

    #[tokio::test]
    async fn test_refresh_overwrites_whole_domains() {
        let source = Arc::new(CountingScopeSource::new(scope_map([
            ("foo", vec![("qux", 2)]),
        ])));
        let registry = ScopeRegistry::new(known()).with_source(source.clone());

        registry.refresh().await.unwrap();
        let snapshot = registry.snapshot().await;

        assert_eq!(snapshot["foo"].get("qux"), Some(&2));
        assert!(snapshot["foo"].get("bar").is_none());
        assert_eq!(snapshot["app"].get("bap"), Some(&0));
    }

    #[tokio::test]
    async fn test_refresh_without_source_is_configuration_error() {
        let registry = ScopeRegistry::default();
        let err = registry.refresh().await.unwrap_err();
        assert!(matches!(err, DomainError::Configuration { .. }));
    }
}
