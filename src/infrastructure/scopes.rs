//! File-backed scope source

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::scope::{DomainScopeMap, ScopeSource};
use crate::domain::DomainError;

/// Scope source that re-reads a JSON file `{domain: {scope: index}}` on
/// every refresh
#[derive(Debug, Clone)]
pub struct FileScopeSource {
    path: PathBuf,
}

impl FileScopeSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub async fn load(&self) -> Result<DomainScopeMap, DomainError> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            DomainError::source_failure(
                self.source_name(),
                format!("Failed to read {}: {}", self.path.display(), e),
            )
        })?;

        let scopes: DomainScopeMap = serde_json::from_str(&content).map_err(|e| {
            DomainError::source_failure(
                self.source_name(),
                format!("Invalid scope map in {}: {}", self.path.display(), e),
            )
        })?;

        debug!(path = %self.path.display(), domains = scopes.len(), "Loaded scope map");
        Ok(scopes)
    }
}

#[async_trait]
impl ScopeSource for FileScopeSource {
    async fn refresh_scopes(&self) -> Result<DomainScopeMap, DomainError> {
        self.load().await
    }

    fn source_name(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!("scopes-{}.json", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn test_reads_file_on_every_refresh() {
        let path = temp_path();
        tokio::fs::write(&path, r#"{"foo": {"bar": 0}}"#).await.unwrap();
        let source = FileScopeSource::new(&path);

        let first = source.refresh_scopes().await.unwrap();
        assert_eq!(first["foo"]["bar"], 0);

        tokio::fs::write(&path, r#"{"foo": {"bar": 0, "baz": 1}, "app": {"admin": 7}}"#)
            .await
            .unwrap();
        let second = source.refresh_scopes().await.unwrap();
        assert_eq!(second["foo"]["baz"], 1);
        assert_eq!(second["app"]["admin"], 7);

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_file() {
        let source = FileScopeSource::new(temp_path());
        let err = source.refresh_scopes().await.unwrap_err();
        assert!(matches!(err, DomainError::Source { .. }));
    }

    #[tokio::test]
    async fn test_invalid_json() {
        let path = temp_path();
        tokio::fs::write(&path, r#"{"foo": {"bar": -1}}"#).await.unwrap();
        let err = FileScopeSource::new(&path).load().await.unwrap_err();
        assert!(err.to_string().contains("Invalid scope map"));
        tokio::fs::remove_file(&path).await.unwrap();
    }
}
