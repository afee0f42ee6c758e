//! Tag-indexed media repository client.
//!
//! The repository is queried over HTTP with the cue's full tag set (AND
//! semantics) and returns candidates in randomized order; the resolver takes
//! the first one. Network calls carry an explicit per-request timeout and a
//! bounded retry budget with exponential backoff. Fetches are the only
//! retried operation in the pipeline.

use std::path::Path;
use std::time::Duration as StdDuration;

use serde::Deserialize;

use cuereel_core::config::FetchSection;
use cuereel_core::{CuereelError, CuereelResult};

/// One search candidate: where to fetch the full-resolution media and the
/// repository's complete tag set for it.
#[derive(Debug, Clone)]
pub struct IndexHit {
    pub source_url: String,
    pub tags: Vec<String>,
}

/// A searchable, tag-indexed media repository.
pub trait MediaIndex: Send + Sync {
    /// Query for items matching all given tags, in randomized order.
    fn search(&self, tags: &[String]) -> CuereelResult<Vec<IndexHit>>;

    /// Download one item's bytes to `dest` (written atomically).
    fn fetch(&self, url: &str, dest: &Path) -> CuereelResult<()>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    images: Vec<SearchImage>,
}

#[derive(Debug, Deserialize)]
struct SearchImage {
    view_url: String,
    #[serde(default)]
    tags: Vec<String>,
}

/// Production [`MediaIndex`] over a Philomena-style JSON search API.
pub struct HttpMediaIndex {
    client: reqwest::blocking::Client,
    endpoint: String,
    retries: u32,
    backoff: StdDuration,
}

impl HttpMediaIndex {
    pub fn new(fetch: &FetchSection) -> CuereelResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(StdDuration::from_secs(fetch.timeout_secs))
            .build()
            .map_err(|e| CuereelError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: fetch.endpoint.clone(),
            retries: fetch.retries,
            backoff: StdDuration::from_millis(fetch.backoff_ms),
        })
    }

    /// Run `op` with the bounded retry budget, doubling the backoff after
    /// each failed attempt.
    fn with_retries<T>(
        &self,
        what: &str,
        url: &str,
        op: impl Fn() -> CuereelResult<T>,
    ) -> CuereelResult<T> {
        let mut delay = self.backoff;
        for attempt in 0..=self.retries {
            match op() {
                Ok(value) => return Ok(value),
                Err(err) if attempt < self.retries => {
                    tracing::warn!(
                        "{} failed (attempt {}/{}): {}; retrying in {:?}",
                        what,
                        attempt + 1,
                        self.retries + 1,
                        err,
                        delay
                    );
                    std::thread::sleep(delay);
                    delay *= 2;
                }
                Err(err) => return Err(err),
            }
        }
        Err(CuereelError::asset_fetch("retry budget exhausted", url))
    }
}

impl MediaIndex for HttpMediaIndex {
    fn search(&self, tags: &[String]) -> CuereelResult<Vec<IndexHit>> {
        // An empty tag set means "any": the repository's match-all term.
        let query = if tags.is_empty() {
            "*".to_string()
        } else {
            tags.join(",")
        };
        self.with_retries("index search", &self.endpoint, || {
            let response = self
                .client
                .get(&self.endpoint)
                .query(&[("q", query.as_str()), ("sf", "random"), ("per_page", "50")])
                .send()
                .map_err(|e| CuereelError::asset_fetch(e.to_string(), self.endpoint.as_str()))?;

            if !response.status().is_success() {
                return Err(CuereelError::asset_fetch(
                    format!("search returned {}", response.status()),
                    self.endpoint.as_str(),
                ));
            }

            let body: SearchResponse = response
                .json()
                .map_err(|e| CuereelError::asset_fetch(e.to_string(), self.endpoint.as_str()))?;

            Ok(body
                .images
                .into_iter()
                .map(|img| IndexHit {
                    source_url: img.view_url,
                    tags: img.tags,
                })
                .collect())
        })
    }

    fn fetch(&self, url: &str, dest: &Path) -> CuereelResult<()> {
        self.with_retries("asset download", url, || {
            let response = self
                .client
                .get(url)
                .send()
                .map_err(|e| CuereelError::asset_fetch(e.to_string(), url))?;

            if !response.status().is_success() {
                return Err(CuereelError::asset_fetch(
                    format!("download returned {}", response.status()),
                    url,
                ));
            }

            let bytes = response
                .bytes()
                .map_err(|e| CuereelError::asset_fetch(e.to_string(), url))?;

            let tmp_path = dest.with_extension("tmp");
            std::fs::write(&tmp_path, &bytes)?;
            std::fs::rename(&tmp_path, dest)?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builds_from_defaults() {
        let index = HttpMediaIndex::new(&FetchSection::default()).unwrap();
        assert_eq!(index.retries, 3);
    }

    #[test]
    fn test_search_response_parses_with_missing_tags() {
        let body: SearchResponse = serde_json::from_str(
            r#"{"images":[{"view_url":"https://x/full/1.png","tags":["artist:someone","solo"]},{"view_url":"https://x/full/2.gif"}]}"#,
        )
        .unwrap();
        assert_eq!(body.images.len(), 2);
        assert_eq!(body.images[0].tags.len(), 2);
        assert!(body.images[1].tags.is_empty());
    }

    #[test]
    fn test_empty_response_parses() {
        let body: SearchResponse = serde_json::from_str(r#"{"images":[]}"#).unwrap();
        assert!(body.images.is_empty());
    }
}
