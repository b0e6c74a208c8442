//! Upload reaper: garbage-collects old files in the upload directory.
//!
//! Uploads outlive the sessions that created them; the reaper bounds the
//! directory by age and by file count.

use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use anyhow::{Context, Result};
use tokio::fs;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub struct UploadReaper {
    dir: PathBuf,
    /// Files last modified longer ago than this are deleted. `None` keeps all ages.
    pub max_age: Option<Duration>,
    /// At most this many files are kept, newest first. `None` keeps any number.
    pub max_files: Option<usize>,
}

impl UploadReaper {
    pub fn new(dir: impl Into<PathBuf>, max_age: Option<Duration>, max_files: Option<usize>) -> Self {
        Self {
            dir: dir.into(),
            max_age,
            max_files,
        }
    }

    /// Delete expired and surplus files. Returns the number of files deleted.
    pub async fn sweep(&self) -> Result<usize> {
        let mut files = Vec::new();
        let mut entries = fs::read_dir(&self.dir)
            .await
            .with_context(|| format!("Failed to list upload dir: {}", self.dir.display()))?;
        while let Some(entry) = entries.next_entry().await? {
            let meta = entry.metadata().await?;
            if !meta.is_file() {
                continue;
            }
            let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            files.push((entry.path(), modified));
        }

        // Newest first, so the count cap keeps the most recent uploads.
        files.sort_by(|a, b| b.1.cmp(&a.1));

        let now = SystemTime::now();
        let mut doomed = Vec::new();
        let mut kept = 0usize;
        for (path, modified) in files {
            let expired = self.max_age.is_some_and(|max_age| {
                now.duration_since(modified).unwrap_or_default() > max_age
            });
            let surplus = self.max_files.is_some_and(|max| kept >= max);
            if expired || surplus {
                doomed.push(path);
            } else {
                kept += 1;
            }
        }

        let mut removed = 0;
        for path in doomed {
            match fs::remove_file(&path).await {
                Ok(()) => {
                    debug!(path = %path.display(), "Reaped upload");
                    removed += 1;
                }
                Err(e) => warn!(path = %path.display(), error = %e, "Failed to reap upload"),
            }
        }
        if removed > 0 {
            info!("[UploadReaper] Reaped {} uploads", removed);
        }
        Ok(removed)
    }

    /// Run [`sweep`](Self::sweep) every `interval` until the task is aborted.
    pub fn spawn(self, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                if let Err(e) = self.sweep().await {
                    warn!(error = %e, "Upload sweep failed");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &std::path::Path, name: &str) {
        std::fs::write(dir.join(name), name.as_bytes()).unwrap();
        // Distinct mtimes so ordering is deterministic.
        std::thread::sleep(Duration::from_millis(20));
    }

    fn remaining(dir: &std::path::Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn count_cap_keeps_newest() {
        let tmp = tempfile::tempdir().unwrap();
        for name in ["a.png", "b.png", "c.png", "d.png"] {
            touch(tmp.path(), name);
        }

        let reaper = UploadReaper::new(tmp.path(), None, Some(2));
        assert_eq!(reaper.sweep().await.unwrap(), 2);
        assert_eq!(remaining(tmp.path()), vec!["c.png", "d.png"]);
    }

    #[tokio::test]
    async fn age_limit_removes_old_files() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "old.jpg");
        tokio::time::sleep(Duration::from_millis(150)).await;
        std::fs::write(tmp.path().join("new.jpg"), b"new").unwrap();

        let reaper = UploadReaper::new(tmp.path(), Some(Duration::from_millis(100)), None);
        assert_eq!(reaper.sweep().await.unwrap(), 1);
        assert_eq!(remaining(tmp.path()), vec!["new.jpg"]);
    }

    #[tokio::test]
    async fn no_limits_keeps_everything() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "x.gif");
        std::fs::create_dir(tmp.path().join("subdir")).unwrap();

        let reaper = UploadReaper::new(tmp.path(), None, None);
        assert_eq!(reaper.sweep().await.unwrap(), 0);
        assert_eq!(remaining(tmp.path()), vec!["subdir", "x.gif"]);
    }
}
