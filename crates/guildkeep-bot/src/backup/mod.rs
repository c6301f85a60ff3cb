//! Backup orchestration.
//!
//! A run opens one [`FileWriter`] for the guild root, runs the channel and
//! member halves concurrently, and only reports once both halves have
//! returned and the write queue has drained.

pub mod channels;
pub mod members;

use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use guildkeep_platform::{Fetch, Guild, GuildSource};
use guildkeep_shared::Snowflake;
use guildkeep_store::{layout, FileWriter, WriteReport};

use crate::error::Result;

pub use channels::{backup_channels, ChannelsSummary, HistoryCursor};
pub use members::{backup_members, member_record};

/// The three switches of the `backup` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackupOptions {
    pub download_attachments: bool,
    pub only_members: bool,
    /// Skips both halves. The viewer is built by its own command.
    pub only_site: bool,
}

impl Default for BackupOptions {
    fn default() -> Self {
        Self {
            download_attachments: true,
            only_members: false,
            only_site: false,
        }
    }
}

impl BackupOptions {
    pub fn backs_up_channels(&self) -> bool {
        !self.only_members && !self.only_site
    }

    pub fn backs_up_members(&self) -> bool {
        !self.only_site
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupSummary {
    pub run_id: Uuid,
    pub guild_id: Snowflake,
    /// `None` when the channel half was not requested.
    pub channels: Option<ChannelsSummary>,
    /// `None` when the member half was not requested.
    pub members: Option<usize>,
    pub writes: WriteReport,
}

impl BackupSummary {
    /// One-line human readable result.
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(c) = &self.channels {
            parts.push(format!(
                "{} channels, {} messages, {} attachments",
                c.channels, c.messages, c.attachments
            ));
        }
        if let Some(m) = self.members {
            parts.push(format!("{m} members"));
        }
        if parts.is_empty() {
            parts.push("nothing to back up".to_string());
        }
        let mut text = parts.join(", ");
        if !self.writes.is_clean() {
            text.push_str(&format!(" ({} files could not be written)", self.writes.failed.len()));
        }
        text
    }
}

/// Message posted to the invoking channel once a run has finished.
pub fn completion_notice(at: DateTime<Utc>) -> String {
    format!(
        "Backup complete! A copy of the guild at <t:{}:f> has been created.",
        at.timestamp()
    )
}

/// Back up `guild` under `base_dir/guild_<id>`.
///
/// Both halves always run to their own end; the first error (channels
/// before members) is returned after the write queue has drained, so files
/// issued before a failure are on disk when this returns.
pub async fn run_backup<S, F>(
    source: &S,
    fetcher: &F,
    base_dir: &Path,
    guild: &Guild,
    options: BackupOptions,
    write_queue: usize,
) -> Result<BackupSummary>
where
    S: GuildSource + ?Sized,
    F: Fetch + ?Sized,
{
    let run_id = Uuid::new_v4();
    let span = info_span!("backup", run = %run_id, guild = %guild.id);

    async move {
        let writer = FileWriter::spawn(layout::guild_root(base_dir, guild.id), write_queue);
        info!(root = %writer.root().display(), ?options, "Backup started");

        let channel_half = async {
            if options.backs_up_channels() {
                backup_channels(source, fetcher, &writer, guild, options.download_attachments)
                    .await
                    .map(Some)
            } else {
                Ok(None)
            }
        };
        let member_half = async {
            if options.backs_up_members() {
                backup_members(source, fetcher, &writer, guild).await.map(Some)
            } else {
                Ok(None)
            }
        };

        let (channels, members) = tokio::join!(channel_half, member_half);
        let writes = writer.finish().await;
        info!(written = writes.written, failed = writes.failed.len(), "Write queue drained");

        Ok(BackupSummary {
            run_id,
            guild_id: guild.id,
            channels: channels?,
            members: members?,
            writes,
        })
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use guildkeep_platform::ChannelKind;
    use tempfile::TempDir;

    fn source() -> FakeSource {
        FakeSource::new(guild())
            .with_channel(channel(1, ChannelKind::Text, "general", None), history(1, 100, 3))
            .with_members(vec![member(8, "ana", vec![])])
    }

    #[tokio::test]
    async fn test_full_run_writes_everything() {
        let dir = TempDir::new().unwrap();
        let summary = run_backup(&source(), &FakeFetcher::default(), dir.path(), &guild(), BackupOptions::default(), 16)
            .await
            .unwrap();

        let root = dir.path().join(format!("guild_{GUILD_ID}"));
        assert!(root.join("channels.json").exists());
        assert!(root.join("members.json").exists());
        assert!(root.join("members/8/avatar.webp").exists());
        assert_eq!(summary.channels.map(|c| c.messages), Some(3));
        assert_eq!(summary.members, Some(1));
        // 3 messages + channels.json + avatar + members.json
        assert_eq!(summary.writes.written, 6);
        assert_eq!(summary.describe(), "1 channels, 3 messages, 0 attachments, 1 members");
    }

    #[tokio::test]
    async fn test_only_members_skips_channels() {
        let dir = TempDir::new().unwrap();
        let options = BackupOptions { only_members: true, ..BackupOptions::default() };
        let source = source();
        let summary = run_backup(&source, &FakeFetcher::default(), dir.path(), &guild(), options, 16)
            .await
            .unwrap();

        let root = dir.path().join(format!("guild_{GUILD_ID}"));
        assert!(!root.join("channels.json").exists());
        assert!(root.join("members.json").exists());
        assert!(root.join("members/8/avatar.webp").exists());
        assert!(summary.channels.is_none());
        assert!(source.queries_for(1).is_empty());
    }

    #[tokio::test]
    async fn test_only_site_touches_nothing() {
        let dir = TempDir::new().unwrap();
        let options = BackupOptions { only_site: true, ..BackupOptions::default() };
        let summary = run_backup(&source(), &FakeFetcher::default(), dir.path(), &guild(), options, 16)
            .await
            .unwrap();
        assert_eq!(summary.writes.written, 0);
        assert_eq!(summary.describe(), "nothing to back up");
    }

    #[tokio::test]
    async fn test_channel_failure_still_finishes_members() {
        let bad = "https://cdn.example/bad.png";
        let source = FakeSource::new(guild())
            .with_channel(
                channel(1, ChannelKind::Text, "general", None),
                vec![message(10, 1, "x", vec![attachment(1, Some("bad.png"), bad)])],
            )
            .with_members(vec![member(8, "ana", vec![])]);
        let dir = TempDir::new().unwrap();

        let result = run_backup(&source, &FakeFetcher::failing_on(bad), dir.path(), &guild(), BackupOptions::default(), 16).await;

        assert!(result.is_err());
        let root = dir.path().join(format!("guild_{GUILD_ID}"));
        assert!(root.join("members.json").exists());
        assert!(!root.join("channels.json").exists());
    }

    #[test]
    fn test_completion_notice() {
        let at = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap();
        assert_eq!(
            completion_notice(at),
            "Backup complete! A copy of the guild at <t:1700000000:f> has been created."
        );
    }
}
