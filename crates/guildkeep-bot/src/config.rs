//! Bot configuration loaded from environment variables.
//!
//! Only the token and the guild id are required; everything else has a
//! default suitable for running the exporter from the current directory.

use std::fmt;
use std::path::PathBuf;

use guildkeep_platform::rest::DEFAULT_API_BASE;
use guildkeep_platform::{ChannelKind, Permissions};
use guildkeep_shared::constants::DEFAULT_WRITE_QUEUE;
use guildkeep_shared::Snowflake;

use crate::backup::BackupOptions;
use crate::commands::backup::{OPT_DOWNLOAD_ATTACHMENTS, OPT_ONLY_MEMBERS, OPT_ONLY_SITE};
use crate::commands::{CommandOptions, Invocation, InvocationChannel, Invoker};
use crate::error::{BackupError, Result};

/// Bot configuration.
#[derive(Clone)]
pub struct BotConfig {
    /// Bot token. Env: `DISCORD_TOKEN` (required)
    pub token: String,

    /// REST base URL. Env: `DISCORD_API_BASE`
    /// Default: `https://discord.com/api/v10`
    pub api_base: String,

    /// Guild the command acts on. Env: `GUILDKEEP_GUILD_ID` (required)
    pub guild_id: Snowflake,

    /// Channel the command is treated as invoked from; receives the
    /// completion notice. Env: `GUILDKEEP_CHANNEL_ID`
    pub channel_id: Option<Snowflake>,

    /// Env: `GUILDKEEP_COMMAND`
    /// Default: `backup`
    pub command: String,

    /// Directory holding the `guild_<id>` roots. Env: `GUILDKEEP_BACKUP_DIR`
    /// Default: `.`
    pub backup_dir: PathBuf,

    /// Env: `GUILDKEEP_DOWNLOAD_ATTACHMENTS`, `GUILDKEEP_ONLY_MEMBERS`,
    /// `GUILDKEEP_ONLY_SITE`
    pub options: BackupOptions,

    /// Capacity of the bounded write queue. Env: `GUILDKEEP_WRITE_QUEUE`
    /// Default: `256`
    pub write_queue: usize,
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("token", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("guild_id", &self.guild_id)
            .field("channel_id", &self.channel_id)
            .field("command", &self.command)
            .field("backup_dir", &self.backup_dir)
            .field("options", &self.options)
            .field("write_queue", &self.write_queue)
            .finish()
    }
}

fn parse_flag(value: &str) -> bool {
    !matches!(value.trim(), "false" | "0")
}

impl BotConfig {
    /// Defaults for everything but the two required values.
    pub fn for_guild(token: impl Into<String>, guild_id: Snowflake) -> Self {
        Self {
            token: token.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            guild_id,
            channel_id: None,
            command: "backup".to_string(),
            backup_dir: PathBuf::from("."),
            options: BackupOptions::default(),
            write_queue: DEFAULT_WRITE_QUEUE,
        }
    }

    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, falling back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let token = lookup("DISCORD_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| BackupError::Config("no token found in DISCORD_TOKEN".into()))?;

        let raw_guild = lookup("GUILDKEEP_GUILD_ID")
            .ok_or_else(|| BackupError::Config("GUILDKEEP_GUILD_ID is not set".into()))?;
        let guild_id = raw_guild
            .trim()
            .parse::<Snowflake>()
            .map_err(|e| BackupError::Config(format!("invalid GUILDKEEP_GUILD_ID: {e}")))?;

        let mut config = Self::for_guild(token, guild_id);

        if let Some(base) = lookup("DISCORD_API_BASE") {
            config.api_base = base.trim_end_matches('/').to_string();
        }

        if let Some(raw) = lookup("GUILDKEEP_CHANNEL_ID") {
            match raw.trim().parse::<Snowflake>() {
                Ok(id) => config.channel_id = Some(id),
                Err(e) => {
                    tracing::warn!(value = %raw, error = %e, "Invalid GUILDKEEP_CHANNEL_ID, ignoring");
                }
            }
        }

        if let Some(command) = lookup("GUILDKEEP_COMMAND") {
            config.command = command;
        }

        if let Some(dir) = lookup("GUILDKEEP_BACKUP_DIR") {
            config.backup_dir = PathBuf::from(dir);
        }

        if let Some(v) = lookup("GUILDKEEP_DOWNLOAD_ATTACHMENTS") {
            config.options.download_attachments = parse_flag(&v);
        }
        if let Some(v) = lookup("GUILDKEEP_ONLY_MEMBERS") {
            config.options.only_members = parse_flag(&v);
        }
        if let Some(v) = lookup("GUILDKEEP_ONLY_SITE") {
            config.options.only_site = parse_flag(&v);
        }

        if let Some(raw) = lookup("GUILDKEEP_WRITE_QUEUE") {
            match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => config.write_queue = n,
                _ => {
                    tracing::warn!(value = %raw, "Invalid GUILDKEEP_WRITE_QUEUE, using default");
                }
            }
        }

        Ok(config)
    }

    /// The single invocation the console binary runs: the configured command
    /// in the configured guild, issued by an operator with administrator
    /// rights.
    pub fn console_invocation(&self) -> Invocation {
        Invocation {
            command: self.command.clone(),
            guild_id: Some(self.guild_id),
            channel: self.channel_id.map(|id| InvocationChannel { id, kind: ChannelKind::Text }),
            invoker: Invoker {
                id: Snowflake(0),
                username: "console".to_string(),
                permissions: Permissions::administrator(),
            },
            options: CommandOptions::default()
                .with_bool(OPT_DOWNLOAD_ATTACHMENTS, self.options.download_attachments)
                .with_bool(OPT_ONLY_MEMBERS, self.options.only_members)
                .with_bool(OPT_ONLY_SITE, self.options.only_site),
        }
    }
}
