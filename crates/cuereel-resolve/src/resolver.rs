//! Per-cue asset resolution.
//!
//! Each cue's tags map to one fetched media file in the job's working
//! directory. Resolutions are independent: identical tag sets on two cues
//! perform two separate searches and downloads. Destination names are
//! collision-free (`cue{index}_{url hash}`) so concurrent fetches never
//! overwrite each other.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;
use sha2::{Digest, Sha256};

use cuereel_core::config::AssetErrorPolicy;
use cuereel_core::CuereelResult;
use cuereel_timeline::{Cue, ResolvedAsset};

use crate::index::MediaIndex;

/// Resolves cues to local media files through a [`MediaIndex`].
pub struct AssetResolver {
    index: Arc<dyn MediaIndex>,
    workdir: PathBuf,
    fallback: PathBuf,
    policy: AssetErrorPolicy,
}

impl AssetResolver {
    pub fn new(
        index: Arc<dyn MediaIndex>,
        workdir: impl Into<PathBuf>,
        fallback: impl Into<PathBuf>,
        policy: AssetErrorPolicy,
    ) -> Self {
        Self {
            index,
            workdir: workdir.into(),
            fallback: fallback.into(),
            policy,
        }
    }

    /// Resolve one cue's tags to a local asset.
    ///
    /// Empty search results substitute the fallback asset (empty tags) and
    /// never abort the job. Fetch failures follow the configured policy:
    /// substitute-and-log or abort.
    pub fn resolve(&self, cue_index: usize, tags: &[String]) -> CuereelResult<ResolvedAsset> {
        let hits = match self.index.search(tags) {
            Ok(hits) => hits,
            Err(err) => return self.absorb(cue_index, err),
        };

        let Some(hit) = hits.into_iter().next() else {
            tracing::info!(
                "cue {}: no candidates for tags {:?}; using fallback asset",
                cue_index,
                tags
            );
            return Ok(ResolvedAsset::fallback(&self.fallback));
        };

        let dest = self.dest_path(cue_index, &hit.source_url);
        match self.index.fetch(&hit.source_url, &dest) {
            Ok(()) => {
                tracing::debug!("cue {}: fetched {} -> {}", cue_index, hit.source_url, dest.display());
                Ok(ResolvedAsset::new(dest, hit.tags))
            }
            Err(err) => self.absorb(cue_index, err),
        }
    }

    /// Resolve every cue on a bounded worker pool, fanning results back in
    /// strict cue order before any builder or compositor work begins.
    pub fn resolve_all(
        &self,
        cues: &[Cue],
        concurrency: usize,
    ) -> CuereelResult<Vec<ResolvedAsset>> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(concurrency.max(1))
            .build()
            .map_err(|e| {
                cuereel_core::CuereelError::Config(format!("failed to build fetch pool: {}", e))
            })?;

        pool.install(|| {
            cues.par_iter()
                .enumerate()
                .map(|(i, cue)| self.resolve(i, &cue.tags))
                .collect()
        })
    }

    /// Apply the asset-error policy to a failed resolution.
    fn absorb(
        &self,
        cue_index: usize,
        err: cuereel_core::CuereelError,
    ) -> CuereelResult<ResolvedAsset> {
        match self.policy {
            AssetErrorPolicy::Fallback => {
                tracing::warn!("cue {}: {}; using fallback asset", cue_index, err);
                Ok(ResolvedAsset::fallback(&self.fallback))
            }
            AssetErrorPolicy::Abort => Err(err),
        }
    }

    /// Collision-free destination: cue index plus a hash of the source URL,
    /// keeping the URL's extension so media kinds stay classifiable.
    fn dest_path(&self, cue_index: usize, url: &str) -> PathBuf {
        let digest = sha256_hex(url);
        let name = match infer_extension_from_url(url) {
            Some(ext) => format!("cue{:04}_{}.{}", cue_index, &digest[..12], ext),
            None => format!("cue{:04}_{}", cue_index, &digest[..12]),
        };
        self.workdir.join(name)
    }
}

fn infer_extension_from_url(url: &str) -> Option<String> {
    let no_frag = url.split('#').next().unwrap_or(url);
    let no_query = no_frag.split('?').next().unwrap_or(no_frag);

    let ext = Path::new(no_query)
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.trim().trim_start_matches('.').to_lowercase())?;

    if ext.is_empty() {
        None
    } else {
        Some(ext)
    }
}

fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{IndexHit, MediaIndex};
    use cuereel_core::{CuereelError, TimeRange, Timestamp};
    use cuereel_timeline::AssetKind;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Mock index: serves a fixed URL per tag set and counts traffic.
    struct MockIndex {
        searches: AtomicUsize,
        fetches: AtomicUsize,
        /// When true, every search returns zero candidates.
        empty: bool,
        /// When true, every fetch fails.
        failing: bool,
    }

    impl MockIndex {
        fn new() -> Self {
            Self {
                searches: AtomicUsize::new(0),
                fetches: AtomicUsize::new(0),
                empty: false,
                failing: false,
            }
        }
    }

    impl MediaIndex for MockIndex {
        fn search(&self, tags: &[String]) -> CuereelResult<Vec<IndexHit>> {
            self.searches.fetch_add(1, Ordering::SeqCst);
            if self.empty {
                return Ok(vec![]);
            }
            Ok(vec![IndexHit {
                source_url: format!("https://repo.example/full/{}.png", tags.join("-")),
                tags: tags.to_vec(),
            }])
        }

        fn fetch(&self, url: &str, dest: &Path) -> CuereelResult<()> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.failing {
                return Err(CuereelError::asset_fetch("connection reset", url));
            }
            std::fs::write(dest, b"media-bytes")?;
            Ok(())
        }
    }

    fn cue(start: f64, end: f64, tags: &[&str]) -> Cue {
        Cue::new(
            TimeRange::new(Timestamp::from_seconds(start), Timestamp::from_seconds(end)),
            "",
            tags.iter().map(|t| t.to_string()).collect(),
        )
    }

    fn resolver(index: Arc<MockIndex>, dir: &Path, policy: AssetErrorPolicy) -> AssetResolver {
        AssetResolver::new(index, dir, dir.join("fallback.jpg"), policy)
    }

    #[test]
    fn test_identical_tag_sets_fetch_independently() {
        let dir = tempfile::tempdir().unwrap();
        let index = Arc::new(MockIndex::new());
        let r = resolver(index.clone(), dir.path(), AssetErrorPolicy::Abort);

        let cues = vec![cue(0.0, 5.0, &["tag1", "tag2"]), cue(5.0, 8.0, &["tag1", "tag2"])];
        let assets = r.resolve_all(&cues, 2).unwrap();

        // No dedup: two cues, two searches, two downloads, two files.
        assert_eq!(index.searches.load(Ordering::SeqCst), 2);
        assert_eq!(index.fetches.load(Ordering::SeqCst), 2);
        assert_ne!(assets[0].path, assets[1].path);
        assert!(assets[0].path.exists());
        assert!(assets[1].path.exists());
    }

    #[test]
    fn test_results_fan_in_by_cue_order() {
        let dir = tempfile::tempdir().unwrap();
        let index = Arc::new(MockIndex::new());
        let r = resolver(index, dir.path(), AssetErrorPolicy::Abort);

        let cues: Vec<Cue> = (0..8)
            .map(|i| {
                let start = i as f64;
                let tag = format!("tag{}", i);
                Cue::new(
                    TimeRange::new(
                        Timestamp::from_seconds(start),
                        Timestamp::from_seconds(start + 1.0),
                    ),
                    "",
                    vec![tag],
                )
            })
            .collect();

        let assets = r.resolve_all(&cues, 4).unwrap();
        for (i, asset) in assets.iter().enumerate() {
            assert_eq!(asset.tags, vec![format!("tag{}", i)]);
            let name = asset.path.file_name().unwrap().to_string_lossy().to_string();
            assert!(name.starts_with(&format!("cue{:04}_", i)), "got {}", name);
        }
    }

    #[test]
    fn test_empty_search_yields_fallback_with_empty_tags() {
        let dir = tempfile::tempdir().unwrap();
        let index = Arc::new(MockIndex {
            empty: true,
            ..MockIndex::new()
        });
        let r = resolver(index.clone(), dir.path(), AssetErrorPolicy::Abort);

        let asset = r.resolve(0, &["nosuchtag".to_string()]).unwrap();
        assert!(asset.tags.is_empty());
        assert_eq!(asset.kind, AssetKind::Still);
        // The search ran; no fetch was attempted.
        assert_eq!(index.fetches.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_fetch_failure_with_fallback_policy_substitutes() {
        let dir = tempfile::tempdir().unwrap();
        let index = Arc::new(MockIndex {
            failing: true,
            ..MockIndex::new()
        });
        let r = resolver(index, dir.path(), AssetErrorPolicy::Fallback);

        let asset = r.resolve(0, &["tag1".to_string()]).unwrap();
        assert!(asset.tags.is_empty());
        assert_eq!(asset.path, dir.path().join("fallback.jpg"));
    }

    #[test]
    fn test_fetch_failure_with_abort_policy_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let index = Arc::new(MockIndex {
            failing: true,
            ..MockIndex::new()
        });
        let r = resolver(index, dir.path(), AssetErrorPolicy::Abort);

        assert!(matches!(
            r.resolve(0, &["tag1".to_string()]).unwrap_err(),
            CuereelError::AssetFetch { .. }
        ));
    }

    #[test]
    fn test_dest_names_keep_media_extension() {
        let dir = tempfile::tempdir().unwrap();
        let index = Arc::new(MockIndex::new());
        let r = resolver(index, dir.path(), AssetErrorPolicy::Abort);

        let dest = r.dest_path(3, "https://repo.example/full/item.webm?download=1");
        let name = dest.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("cue0003_"));
        assert!(name.ends_with(".webm"));
    }

    #[test]
    fn test_infer_extension_from_url() {
        assert_eq!(
            infer_extension_from_url("https://x/y.png").as_deref(),
            Some("png")
        );
        assert_eq!(
            infer_extension_from_url("https://x/y.JPG?cache=1").as_deref(),
            Some("jpg")
        );
        assert_eq!(infer_extension_from_url("https://x/y").as_deref(), None);
    }

    #[test]
    fn test_sha256_hex_is_stable() {
        let a = sha256_hex("hello");
        let b = sha256_hex("hello");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }
}
