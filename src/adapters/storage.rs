use crate::domain::model::{FormSubmission, NewSubmission, PageId};
use crate::domain::ports::SubmissionStore;
use crate::utils::error::{Result, SiteError};
use chrono::Utc;
use fs2::FileExt;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Keeps submissions in memory. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct MemorySubmissionStore {
    submissions: Arc<Mutex<Vec<FormSubmission>>>,
}

impl MemorySubmissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.submissions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl SubmissionStore for MemorySubmissionStore {
    async fn append(&self, submission: NewSubmission) -> Result<FormSubmission> {
        let mut submissions = self.submissions.lock().await;
        let stored = FormSubmission {
            id: submissions.len() as u64 + 1,
            page_id: submission.page_id,
            form_data: submission.form_data,
            submit_time: Utc::now(),
        };
        submissions.push(stored.clone());
        Ok(stored)
    }

    async fn list(&self, page_id: PageId) -> Result<Vec<FormSubmission>> {
        let submissions = self.submissions.lock().await;
        Ok(submissions
            .iter()
            .filter(|s| s.page_id == page_id)
            .cloned()
            .collect())
    }
}

/// Appends one JSON object per line to a file.
///
/// Each append holds an exclusive lock on the file while it reads the last
/// id and writes its line, so several processes can share one file.
#[derive(Debug)]
pub struct FileSubmissionStore {
    path: PathBuf,
    /// Keeps this process's appends off the blocking pool while one waits
    /// for the file lock.
    write_lock: Mutex<()>,
}

impl FileSubmissionStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<Vec<FormSubmission>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        Ok(parse_lines(&bytes, &self.path))
    }
}

/// Decode every well-formed line. A line cut short by a crash is skipped
/// so that it cannot block later submissions.
fn parse_lines(bytes: &[u8], path: &Path) -> Vec<FormSubmission> {
    String::from_utf8_lossy(bytes)
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(number, line)| match serde_json::from_str(line) {
            Ok(submission) => Some(submission),
            Err(e) => {
                tracing::warn!(
                    "⚠️ Skipping malformed submission at {}:{}: {}",
                    path.display(),
                    number + 1,
                    e
                );
                None
            }
        })
        .collect()
}

fn append_locked(path: &Path, submission: NewSubmission) -> Result<FormSubmission> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .read(true)
        .append(true)
        .open(path)?;
    // Released when `file` is dropped, including on early return.
    file.lock_exclusive()?;

    let mut existing = Vec::new();
    file.read_to_end(&mut existing)?;
    let previous = parse_lines(&existing, path)
        .iter()
        .map(|s| s.id)
        .max()
        .unwrap_or(0);

    let stored = FormSubmission {
        id: previous + 1,
        page_id: submission.page_id,
        form_data: submission.form_data,
        submit_time: Utc::now(),
    };

    let mut line = String::new();
    if !existing.is_empty() && !existing.ends_with(b"\n") {
        // Start a fresh line after a torn one.
        line.push('\n');
    }
    line.push_str(&serde_json::to_string(&stored)?);
    line.push('\n');
    file.write_all(line.as_bytes())?;
    file.sync_data()?;
    FileExt::unlock(&file)?;

    Ok(stored)
}

impl SubmissionStore for FileSubmissionStore {
    async fn append(&self, submission: NewSubmission) -> Result<FormSubmission> {
        let _guard = self.write_lock.lock().await;
        let path = self.path.clone();
        let stored = tokio::task::spawn_blocking(move || append_locked(&path, submission))
            .await
            .map_err(|e| SiteError::IoError(std::io::Error::other(e)))??;

        tracing::debug!("Appended submission {} to {}", stored.id, self.path.display());
        Ok(stored)
    }

    async fn list(&self, page_id: PageId) -> Result<Vec<FormSubmission>> {
        Ok(self
            .read_all()
            .await?
            .into_iter()
            .filter(|s| s.page_id == page_id)
            .collect())
    }
}
