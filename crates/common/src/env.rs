//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use std::path::Path;
use tracing::warn;

/// Ensure the directory holding `routes_file` exists; warn when the static
/// admin UI directory is missing.
pub async fn ensure_env(public_dir: &str, routes_file: &str) -> anyhow::Result<()> {
    if tokio::fs::metadata(public_dir).await.is_err() {
        warn!(%public_dir, "public assets directory not found; admin UI will 404");
    }
    if let Some(data_dir) = Path::new(routes_file).parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(data_dir)
            .await
            .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", data_dir.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_parent_of_routes_file() -> anyhow::Result<()> {
        let base = std::env::temp_dir().join(format!("json_host_env_{}", uuid::Uuid::new_v4()));
        let routes_file = base.join("nested").join("routes.json");
        ensure_env("/nonexistent-public-dir", &routes_file.to_string_lossy()).await?;
        assert!(tokio::fs::metadata(base.join("nested")).await?.is_dir());
        let _ = tokio::fs::remove_dir_all(&base).await;
        Ok(())
    }

    #[tokio::test]
    async fn bare_file_name_needs_no_directory() -> anyhow::Result<()> {
        ensure_env("/nonexistent-public-dir", "routes.json").await
    }
}
