use std::time::Duration;

use log::{debug, warn};
use reqwest::Client;
use tokio::fs;

/// Load the raw manifest document from an `http(s)` URL or a local path.
pub async fn load_document(source: &str) -> Result<String, String> {
    let source = source.trim();
    if is_remote(source) {
        fetch_remote(source).await
    } else {
        debug!("reading manifest from {}", source);
        fs::read_to_string(source)
            .await
            .map_err(|e| format!("failed to read manifest {source}: {e}"))
    }
}

fn is_remote(source: &str) -> bool {
    let lower = source.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

async fn fetch_remote(url: &str) -> Result<String, String> {
    let client = Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent(concat!("data-updater/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|err| {
            warn!("fetch: falling back to default HTTP client configuration ({err})");
            Client::new()
        });

    debug!("fetching manifest from {}", url);
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| format!("manifest request failed: {e}"))?;

    if !response.status().is_success() {
        return Err(format!("manifest server returned status: {}", response.status()));
    }

    response
        .text()
        .await
        .map_err(|e| format!("failed to read manifest body: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_remote_sources() {
        assert!(is_remote("https://cdn.example.com/manifest.json"));
        assert!(is_remote("HTTP://cdn.example.com/manifest.json"));
        assert!(!is_remote("manifest.json"));
        assert!(!is_remote("/srv/https/manifest.json"));
    }

    #[tokio::test]
    async fn reads_local_documents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        std::fs::write(&path, "[]").unwrap();
        let doc = load_document(path.to_str().unwrap()).await.unwrap();
        assert_eq!(doc, "[]");

        let padded = format!("  {}\n", path.display());
        assert_eq!(load_document(&padded).await.unwrap(), "[]");

        let missing = dir.path().join("absent.json");
        let err = load_document(missing.to_str().unwrap()).await.unwrap_err();
        assert!(err.starts_with("failed to read manifest"), "{err}");
    }
}
