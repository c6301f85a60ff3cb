use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use guildkeep_platform::GuildSource;
use guildkeep_store::{layout, BackupReader, FileWriter};

use crate::commands::backup::NOT_IN_GUILD;
use crate::commands::{Command, Invocation, Reply};
use crate::error::Result;
use crate::site::build_site;

/// `build-site`: render `index.html` from the guild's existing backup.
pub struct SiteCommand<S: ?Sized> {
    source: Arc<S>,
    backup_dir: PathBuf,
}

impl<S: ?Sized> SiteCommand<S> {
    pub fn new(source: Arc<S>, backup_dir: PathBuf) -> Self {
        Self { source, backup_dir }
    }
}

#[async_trait]
impl<S> Command for SiteCommand<S>
where
    S: GuildSource + ?Sized + 'static,
{
    fn name(&self) -> &'static str {
        "build-site"
    }

    async fn execute(&self, invocation: &Invocation) -> Result<Reply> {
        let Some(guild_id) = invocation.guild_id else {
            return Ok(Reply::ephemeral(NOT_IN_GUILD));
        };

        let guild = self.source.guild(guild_id).await?;
        let root = layout::guild_root(&self.backup_dir, guild.id);
        let html = build_site(&BackupReader::new(root.clone()), &guild.name).await?;

        let writer = FileWriter::spawn(root, 1);
        writer.write(layout::site_file(), html).await;
        let report = writer.finish().await;

        if !report.is_clean() {
            return Ok(Reply::public(format!("Unable to write the site for {}.", guild.name)));
        }
        info!(guild = %guild.id, "Site for {} built", guild.name);
        Ok(Reply::public(format!("Site for {} built.", guild.name)))
    }
}
