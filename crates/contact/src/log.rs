use std::path::{Path, PathBuf};

use tokio::{fs::OpenOptions, io::AsyncWriteExt, sync::Mutex};

use crate::{ContactRequest, Error, Result};

/// Append-only JSON lines file of every contact request received.
///
/// Appends are serialized by a lock held across open, write and close, so
/// entries from concurrent submissions never interleave.
#[derive(Debug)]
pub struct SubmissionLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl SubmissionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn append(&self, request: &ContactRequest) -> Result<()> {
        let mut entry = serde_json::to_vec(request)?;
        entry.push(b'\n');

        let _guard = self.lock.lock().await;

        let mut options = OpenOptions::new();
        options.append(true).create(true);
        #[cfg(unix)]
        options.mode(0o644);

        let mut file = options.open(&self.path).await.map_err(|source| Error::Open {
            path: self.path.display().to_string(),
            source,
        })?;

        file.write_all(&entry).await?;
        file.flush().await?;

        Ok(())
    }
}
