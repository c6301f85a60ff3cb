//! Command registry and dispatcher.
//!
//! The registry is built once at startup and never mutated afterwards.
//! Dispatch enforces the moderator gate for in-guild invocations, logs the
//! invocation, and turns command errors into a visible reply.

pub mod backup;
pub mod site;

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info};

use guildkeep_platform::{ChannelKind, Fetch, GuildSource, Permissions};
use guildkeep_shared::Snowflake;

use crate::config::BotConfig;
use crate::error::Result;

pub use backup::BackupCommand;
pub use site::SiteCommand;

pub const PERMISSION_DENIED: &str = "You do not have permission to execute this command!";

/// Reply shown to the invoking user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub content: String,
    /// Visible to the invoker only.
    pub ephemeral: bool,
}

impl Reply {
    pub fn public(content: impl Into<String>) -> Self {
        Self { content: content.into(), ephemeral: false }
    }

    pub fn ephemeral(content: impl Into<String>) -> Self {
        Self { content: content.into(), ephemeral: true }
    }
}

#[derive(Debug, Clone)]
pub struct Invoker {
    pub id: Snowflake,
    pub username: String,
    pub permissions: Permissions,
}

#[derive(Debug, Clone, Copy)]
pub struct InvocationChannel {
    pub id: Snowflake,
    pub kind: ChannelKind,
}

/// Boolean options given with an invocation. Absent options fall back to the
/// command's own default.
#[derive(Debug, Clone, Default)]
pub struct CommandOptions {
    bools: BTreeMap<String, bool>,
}

impl CommandOptions {
    pub fn with_bool(mut self, name: &str, value: bool) -> Self {
        self.bools.insert(name.to_string(), value);
        self
    }

    pub fn get_bool(&self, name: &str, default: bool) -> bool {
        self.bools.get(name).copied().unwrap_or(default)
    }
}

#[derive(Debug, Clone)]
pub struct Invocation {
    pub command: String,
    /// `None` outside of a guild.
    pub guild_id: Option<Snowflake>,
    pub channel: Option<InvocationChannel>,
    pub invoker: Invoker,
    pub options: CommandOptions,
}

#[async_trait]
pub trait Command: Send + Sync {
    fn name(&self) -> &'static str;

    async fn execute(&self, invocation: &Invocation) -> Result<Reply>;
}

#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<&'static str, Box<dyn Command>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, command: impl Command + 'static) -> Self {
        self.register(command);
        self
    }

    pub fn register(&mut self, command: impl Command + 'static) {
        self.commands.insert(command.name(), Box::new(command));
    }

    pub fn get(&self, name: &str) -> Option<&dyn Command> {
        self.commands.get(name).map(|c| c.as_ref())
    }

    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.commands.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Run an invocation. Unknown commands yield no reply at all.
    pub async fn dispatch(&self, invocation: &Invocation) -> Option<Reply> {
        let command = self.get(&invocation.command)?;

        if invocation.guild_id.is_some() && !invocation.invoker.permissions.is_moderator() {
            return Some(Reply::ephemeral(PERMISSION_DENIED));
        }

        let place = invocation
            .guild_id
            .map_or_else(|| "DM".to_string(), |id| id.to_string());
        info!(
            "{}: Command \"{}\" ran by {} ({})",
            place, invocation.command, invocation.invoker.username, invocation.invoker.id
        );

        match command.execute(invocation).await {
            Ok(reply) => Some(reply),
            Err(e) => {
                error!(command = %invocation.command, "Error: {e}");
                Some(Reply::public(format!("Error executing this command: {e}")))
            }
        }
    }
}

/// The fixed command set of the bot.
pub fn registry<S, F>(source: Arc<S>, fetcher: Arc<F>, config: &BotConfig) -> CommandRegistry
where
    S: GuildSource + 'static,
    F: Fetch + 'static,
{
    CommandRegistry::new()
        .with(BackupCommand::new(
            source.clone(),
            fetcher,
            config.backup_dir.clone(),
            config.write_queue,
        ))
        .with(SiteCommand::new(source, config.backup_dir.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use crate::BackupError;
    use std::path::PathBuf;

    struct Echo;

    #[async_trait]
    impl Command for Echo {
        fn name(&self) -> &'static str {
            "echo"
        }

        async fn execute(&self, invocation: &Invocation) -> Result<Reply> {
            Ok(Reply::public(invocation.invoker.username.clone()))
        }
    }

    struct Broken;

    #[async_trait]
    impl Command for Broken {
        fn name(&self) -> &'static str {
            "broken"
        }

        async fn execute(&self, _invocation: &Invocation) -> Result<Reply> {
            Err(BackupError::Config("boom".into()))
        }
    }

    fn invocation(command: &str, guild: Option<u64>, permissions: Permissions) -> Invocation {
        Invocation {
            command: command.into(),
            guild_id: guild.map(Snowflake),
            channel: None,
            invoker: Invoker { id: Snowflake(7), username: "ana".into(), permissions },
            options: CommandOptions::default(),
        }
    }

    fn test_registry() -> CommandRegistry {
        CommandRegistry::new().with(Echo).with(Broken)
    }

    #[tokio::test]
    async fn test_unknown_command_is_ignored() {
        let reply = test_registry().dispatch(&invocation("nope", Some(GUILD_ID), Permissions::administrator())).await;
        assert!(reply.is_none());
    }

    #[tokio::test]
    async fn test_non_moderator_is_denied_in_guild() {
        let reply = test_registry()
            .dispatch(&invocation("echo", Some(GUILD_ID), Permissions(0)))
            .await
            .unwrap();
        assert_eq!(reply, Reply::ephemeral(PERMISSION_DENIED));
    }

    #[tokio::test]
    async fn test_permission_gate_skipped_outside_guild() {
        let reply = test_registry().dispatch(&invocation("echo", None, Permissions(0))).await.unwrap();
        assert_eq!(reply, Reply::public("ana"));
    }

    #[tokio::test]
    async fn test_moderator_bits_pass() {
        let kick = Permissions(Permissions::KICK_MEMBERS);
        let reply = test_registry().dispatch(&invocation("echo", Some(GUILD_ID), kick)).await.unwrap();
        assert_eq!(reply.content, "ana");
    }

    #[tokio::test]
    async fn test_errors_are_relayed() {
        let reply = test_registry()
            .dispatch(&invocation("broken", Some(GUILD_ID), Permissions::administrator()))
            .await
            .unwrap();
        assert_eq!(reply.content, "Error executing this command: Configuration error: boom");
        assert!(!reply.ephemeral);
    }

    #[test]
    fn test_registry_holds_both_commands() {
        let config = BotConfig {
            backup_dir: PathBuf::from("."),
            ..BotConfig::for_guild("token", Snowflake(GUILD_ID))
        };
        let registry = registry(Arc::new(FakeSource::new(guild())), Arc::new(FakeFetcher::default()), &config);
        assert_eq!(registry.names(), vec!["backup", "build-site"]);
    }

    #[test]
    fn test_command_options_defaults() {
        let options = CommandOptions::default().with_bool("only-members", true);
        assert!(options.get_bool("only-members", false));
        assert!(options.get_bool("download-attachments", true));
    }
}
