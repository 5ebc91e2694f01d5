//! Retrieval of entity documents from files or HTTP
//!
//! A source is either a page-relative (or absolute) file path or an
//! `http(s)` URL. With `bypass_cache` set, HTTP requests carry
//! `Cache-Control: no-store` and the fetcher's own response cache is neither
//! consulted nor populated.

use crate::core::error::{FetchError, Result};
use reqwest::header::{ACCEPT, CACHE_CONTROL, PRAGMA};
use reqwest::{Client, Url};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Where a document lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Path(PathBuf),
    Url(Url),
}

impl Source {
    /// `http://`, `https://` and `file://` are URLs; anything else is a path
    pub fn parse(raw: &str) -> Result<Self> {
        let lower = raw.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            let url = Url::parse(raw)
                .map_err(|e| FetchError::new(raw, format!("invalid URL: {}", e)))?;
            return Ok(Source::Url(url));
        }
        if lower.starts_with("file://") {
            let path = Url::parse(raw)
                .ok()
                .and_then(|url| url.to_file_path().ok())
                .ok_or_else(|| FetchError::new(raw, "invalid file URL"))?;
            return Ok(Source::Path(path));
        }
        if raw.trim().is_empty() {
            return Err(FetchError::new(raw, "empty source").into());
        }
        Ok(Source::Path(PathBuf::from(raw)))
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Path(path) => write!(f, "{}", path.display()),
            Source::Url(url) => write!(f, "{}", url),
        }
    }
}

/// Reads document bodies; holds the HTTP client and the response cache
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    base_dir: PathBuf,
    cache: HashMap<String, String>,
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetcher {
    /// Relative paths resolve against the current directory
    pub fn new() -> Self {
        Self::with_base_dir(".")
    }

    /// Relative paths resolve against `base_dir` (the page's directory)
    pub fn with_base_dir(base_dir: impl AsRef<Path>) -> Self {
        Self {
            client: Client::new(),
            base_dir: base_dir.as_ref().to_path_buf(),
            cache: HashMap::new(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    /// Fetch the body named by `raw`
    pub async fn fetch(&mut self, raw: &str, bypass_cache: bool) -> Result<String> {
        let source = Source::parse(raw)?;
        let key = self.cache_key(&source);

        if !bypass_cache {
            if let Some(body) = self.cache.get(&key) {
                tracing::debug!("Serving {} from cache", key);
                return Ok(body.clone());
            }
        }

        let body = match &source {
            Source::Path(path) => self.read_file(raw, path).await?,
            Source::Url(url) => self.get(raw, url.clone(), bypass_cache).await?,
        };

        if !bypass_cache {
            self.cache.insert(key, body.clone());
        }
        Ok(body)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    fn cache_key(&self, source: &Source) -> String {
        match source {
            Source::Path(path) => self.resolve(path).display().to_string(),
            Source::Url(url) => url.to_string(),
        }
    }

    async fn read_file(&self, raw: &str, path: &Path) -> Result<String> {
        let resolved = self.resolve(path);
        tokio::fs::read_to_string(&resolved).await.map_err(|e| {
            FetchError::new(raw, format!("cannot read {}: {}", resolved.display(), e)).into()
        })
    }

    async fn get(&self, raw: &str, url: Url, bypass_cache: bool) -> Result<String> {
        let mut request = self.client.get(url).header(ACCEPT, "application/json");
        if bypass_cache {
            request = request
                .header(CACHE_CONTROL, "no-store")
                .header(PRAGMA, "no-cache");
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::new(raw, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::status(
                raw,
                status.as_u16(),
                status.canonical_reason().unwrap_or(""),
            )
            .into());
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::new(raw, e.to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("entity-sheet-fetch-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_parse_sources() {
        assert!(matches!(Source::parse("readme.json").unwrap(), Source::Path(_)));
        assert!(matches!(
            Source::parse("https://example.com/drake.json").unwrap(),
            Source::Url(_)
        ));
        assert!(matches!(
            Source::parse("HTTP://example.com/a.json").unwrap(),
            Source::Url(_)
        ));
        assert!(Source::parse("").is_err());
        assert!(Source::parse("http://").is_err());
    }

    #[tokio::test]
    async fn test_reads_relative_to_base_dir() {
        let dir = temp_dir("relative");
        std::fs::write(dir.join("drake.json"), "{}").unwrap();

        let mut fetcher = Fetcher::with_base_dir(&dir);
        assert_eq!(fetcher.fetch("drake.json", true).await.unwrap(), "{}");
    }

    #[tokio::test]
    async fn test_missing_file_is_fetch_error() {
        let dir = temp_dir("missing");
        let mut fetcher = Fetcher::with_base_dir(&dir);
        let err = fetcher.fetch("nope.json", true).await.unwrap_err();
        assert!(err.is_fetch());
        assert!(err.to_string().contains("nope.json"));
    }

    #[tokio::test]
    async fn test_cache_policy() {
        let dir = temp_dir("cache");
        let path = dir.join("stats.json");
        std::fs::write(&path, "1").unwrap();
        let mut fetcher = Fetcher::with_base_dir(&dir);

        // bypassing never stores
        assert_eq!(fetcher.fetch("stats.json", true).await.unwrap(), "1");
        assert_eq!(fetcher.cached_len(), 0);

        assert_eq!(fetcher.fetch("stats.json", false).await.unwrap(), "1");
        std::fs::write(&path, "2").unwrap();
        assert_eq!(fetcher.fetch("stats.json", false).await.unwrap(), "1");
        assert_eq!(fetcher.fetch("stats.json", true).await.unwrap(), "2");
    }
}
