use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, warn};

use guildkeep_platform::{Fetch, GuildSource};

use crate::backup::{completion_notice, run_backup, BackupOptions};
use crate::commands::{Command, CommandOptions, Invocation, Reply};
use crate::error::Result;

pub const NOT_IN_GUILD: &str = "This command must be ran in a guild.";

pub const OPT_DOWNLOAD_ATTACHMENTS: &str = "download-attachments";
pub const OPT_ONLY_MEMBERS: &str = "only-members";
pub const OPT_ONLY_SITE: &str = "only-site";

/// `backup`: export the invoking guild to `<backup_dir>/guild_<id>`.
pub struct BackupCommand<S: ?Sized, F: ?Sized> {
    source: Arc<S>,
    fetcher: Arc<F>,
    backup_dir: PathBuf,
    write_queue: usize,
}

impl<S: ?Sized, F: ?Sized> BackupCommand<S, F> {
    pub fn new(source: Arc<S>, fetcher: Arc<F>, backup_dir: PathBuf, write_queue: usize) -> Self {
        Self { source, fetcher, backup_dir, write_queue }
    }
}

pub fn backup_options(options: &CommandOptions) -> BackupOptions {
    let defaults = BackupOptions::default();
    BackupOptions {
        download_attachments: options.get_bool(OPT_DOWNLOAD_ATTACHMENTS, defaults.download_attachments),
        only_members: options.get_bool(OPT_ONLY_MEMBERS, defaults.only_members),
        only_site: options.get_bool(OPT_ONLY_SITE, defaults.only_site),
    }
}

#[async_trait]
impl<S, F> Command for BackupCommand<S, F>
where
    S: GuildSource + ?Sized + 'static,
    F: Fetch + ?Sized + 'static,
{
    fn name(&self) -> &'static str {
        "backup"
    }

    async fn execute(&self, invocation: &Invocation) -> Result<Reply> {
        let Some(guild_id) = invocation.guild_id else {
            return Ok(Reply::ephemeral(NOT_IN_GUILD));
        };

        let guild = self.source.guild(guild_id).await?;
        let summary = run_backup(
            self.source.as_ref(),
            self.fetcher.as_ref(),
            &self.backup_dir,
            &guild,
            backup_options(&invocation.options),
            self.write_queue,
        )
        .await?;

        if let Some(channel) = invocation.channel.filter(|c| c.kind.accepts_messages()) {
            if let Err(e) = self.source.send_message(channel.id, &completion_notice(Utc::now())).await {
                warn!(channel = %channel.id, error = %e, "Failed to post completion notice");
            }
        }
        info!(run = %summary.run_id, "Backup of {} ({}) complete!", guild.name, guild.id);

        Ok(Reply::public(format!("Backup of {} complete: {}.", guild.name, summary.describe())))
    }
}
