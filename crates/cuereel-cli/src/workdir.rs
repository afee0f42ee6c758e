//! Per-job working directory management.
//!
//! Every render gets a fresh directory under the configured cache root,
//! named after the job id, so concurrent jobs (and concurrent per-cue
//! fetches within a job) never collide on file names.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &str) -> Result<PathBuf> {
    if path == "~" || path.starts_with("~/") {
        let home = dirs::home_dir().ok_or_else(|| anyhow!("failed to resolve home dir"))?;
        if path == "~" {
            return Ok(home);
        }
        return Ok(home.join(path.trim_start_matches("~/")));
    }
    Ok(PathBuf::from(path))
}

/// Create the working directory for one job.
pub fn create_job_workdir(cache_root: &Path, job_id: &str) -> Result<PathBuf> {
    let dir = cache_root.join("jobs").join(job_id);
    std::fs::create_dir_all(&dir)
        .map_err(|e| anyhow!("failed to create working directory {}: {}", dir.display(), e))?;
    Ok(dir)
}

/// Remove a job's working directory. Cleanup failure is logged, never fatal.
pub fn remove_workdir(path: &Path) {
    if let Err(e) = std::fs::remove_dir_all(path) {
        tracing::warn!(
            "failed to clean working directory {}: {}",
            path.display(),
            e
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_tilde_plain_path_passthrough() {
        assert_eq!(
            expand_tilde("/var/cache/cuereel").unwrap(),
            PathBuf::from("/var/cache/cuereel")
        );
    }

    #[test]
    fn test_expand_tilde_home_prefix() {
        if dirs::home_dir().is_none() {
            return;
        }
        let expanded = expand_tilde("~/.cuereel/cache").unwrap();
        assert!(expanded.ends_with(".cuereel/cache"));
        assert!(!expanded.to_string_lossy().contains('~'));
    }

    #[test]
    fn test_create_and_remove_job_workdir() {
        let root = tempfile::tempdir().unwrap();
        let dir = create_job_workdir(root.path(), "job-123").unwrap();
        assert!(dir.is_dir());
        assert!(dir.ends_with("jobs/job-123"));

        std::fs::write(dir.join("cue0000_abc.png"), b"bytes").unwrap();
        remove_workdir(&dir);
        assert!(!dir.exists());
    }

    #[test]
    fn test_remove_missing_workdir_is_not_fatal() {
        remove_workdir(Path::new("/nonexistent/cuereel-workdir"));
    }
}
