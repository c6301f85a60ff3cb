//! Bounded write queue for one backup run.
//!
//! Producers hand `(relative path, bytes)` jobs to a single worker task over
//! a bounded mpsc channel; a full queue makes producers wait. A failed write
//! is logged and recorded in the [`WriteReport`] but never reaches the
//! producer, so traversal keeps going. [`FileWriter::finish`] closes the
//! queue and waits for everything already issued to land on disk.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::Result;
use crate::layout;

#[derive(Debug)]
struct WriteJob {
    relative: String,
    data: Bytes,
}

/// Outcome of every write issued through a [`FileWriter`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteReport {
    pub written: usize,
    /// Relative paths that could not be written.
    pub failed: Vec<String>,
}

impl WriteReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct FileWriter {
    root: PathBuf,
    tx: mpsc::Sender<WriteJob>,
    worker: JoinHandle<WriteReport>,
}

impl FileWriter {
    /// Start the worker for a guild root. Must be called inside a tokio runtime.
    pub fn spawn(root: PathBuf, capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let worker = tokio::spawn(run_worker(root.clone(), rx));
        debug!(root = %root.display(), capacity, "File writer started");
        Self { root, tx, worker }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Queue raw bytes for `relative`. Waits only while the queue is full.
    pub async fn write(&self, relative: impl Into<String>, data: impl Into<Bytes>) {
        let job = WriteJob {
            relative: relative.into(),
            data: data.into(),
        };
        if let Err(mpsc::error::SendError(job)) = self.tx.send(job).await {
            warn!(path = %job.relative, "Unable to write to \"{}\"! (writer stopped)", job.relative);
        }
    }

    /// Serialize `value` as two-space indented JSON and queue it.
    pub async fn write_json<T: Serialize + ?Sized>(&self, relative: impl Into<String>, value: &T) -> Result<()> {
        let data = serde_json::to_vec_pretty(value)?;
        self.write(relative, data).await;
        Ok(())
    }

    /// Close the queue and wait until every issued write has been attempted.
    pub async fn finish(self) -> WriteReport {
        let Self { root, tx, worker } = self;
        drop(tx);
        match worker.await {
            Ok(report) => report,
            Err(e) => {
                warn!(root = %root.display(), error = %e, "File writer task failed");
                WriteReport::default()
            }
        }
    }
}

async fn run_worker(root: PathBuf, mut rx: mpsc::Receiver<WriteJob>) -> WriteReport {
    let mut report = WriteReport::default();
    while let Some(job) = rx.recv().await {
        match write_one(&root, &job).await {
            Ok(()) => {
                report.written += 1;
                debug!(path = %job.relative, size = job.data.len(), "Wrote file");
            }
            Err(e) => {
                warn!(path = %job.relative, error = %e, "Unable to write to \"{}\"!", job.relative);
                report.failed.push(job.relative);
            }
        }
    }
    report
}

async fn write_one(root: &Path, job: &WriteJob) -> Result<()> {
    let path = layout::resolve(root, &job.relative)?;
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&path, &job.data).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_creates_parents() {
        let dir = TempDir::new().unwrap();
        let writer = FileWriter::spawn(dir.path().join("guild_1"), 4);

        writer.write("messages/5/attachments/a.bin", vec![1u8, 2, 3]).await;
        writer.write_json("channels.json", &serde_json::json!({"a": 1})).await.unwrap();
        let report = writer.finish().await;

        assert_eq!(report.written, 2);
        assert!(report.is_clean());
        let bytes = std::fs::read(dir.path().join("guild_1/messages/5/attachments/a.bin")).unwrap();
        assert_eq!(bytes, vec![1, 2, 3]);
        let json = std::fs::read_to_string(dir.path().join("guild_1/channels.json")).unwrap();
        assert_eq!(json, "{\n  \"a\": 1\n}");
    }

    #[tokio::test]
    async fn test_failures_are_reported_not_raised() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("guild_1");
        std::fs::create_dir_all(&root).unwrap();
        // A plain file where a directory is needed.
        std::fs::write(root.join("members"), b"x").unwrap();

        let writer = FileWriter::spawn(root.clone(), 1);
        writer.write("members/7/avatar.webp", vec![0u8]).await;
        writer.write("../escape.txt", vec![0u8]).await;
        writer.write("members.json", b"{}".to_vec()).await;
        let report = writer.finish().await;

        assert_eq!(report.written, 1);
        assert_eq!(report.failed, vec!["members/7/avatar.webp".to_string(), "../escape.txt".to_string()]);
        assert!(!dir.path().join("escape.txt").exists());
        assert!(root.join("members.json").exists());
    }

    #[tokio::test]
    async fn test_many_writes_through_small_queue() {
        let dir = TempDir::new().unwrap();
        let writer = FileWriter::spawn(dir.path().to_path_buf(), 2);
        for i in 0..50u32 {
            writer.write(format!("messages/{i}/message.json"), b"{}".to_vec()).await;
        }
        let report = writer.finish().await;
        assert_eq!(report.written, 50);
        assert!(dir.path().join("messages/49/message.json").exists());
    }
}
