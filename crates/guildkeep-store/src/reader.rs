use std::path::PathBuf;

use serde::de::DeserializeOwned;
use tracing::debug;

use guildkeep_shared::{ChannelMap, MemberMap, MessageRecord, Snowflake};

use crate::error::{Result, StoreError};
use crate::layout;

/// Read access to a finished (or partial) backup under a guild root.
#[derive(Debug, Clone)]
pub struct BackupReader {
    root: PathBuf,
}

impl BackupReader {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub async fn channels(&self) -> Result<ChannelMap> {
        self.read_json(&layout::channels_file()).await
    }

    pub async fn members(&self) -> Result<MemberMap> {
        self.read_json(&layout::members_file()).await
    }

    pub async fn message(&self, message_id: Snowflake) -> Result<MessageRecord> {
        self.read_json(&layout::message_file(message_id)).await
    }

    async fn read_json<T: DeserializeOwned>(&self, relative: &str) -> Result<T> {
        let path = layout::resolve(&self.root, relative)?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::Missing(relative.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), size = bytes.len(), "Read backup record");
        Ok(serde_json::from_slice(&bytes)?)
    }
}
