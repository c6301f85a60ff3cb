//! In-memory platform fakes for traversal and command tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;

use guildkeep_platform::{
    Attachment, Channel, ChannelEntry, ChannelKind, Fetch, Guild, GuildSource, Member, Message,
    MessageQuery, PlatformError, Role, User,
};
use guildkeep_shared::Snowflake;

pub const GUILD_ID: u64 = 500;

pub fn user(id: u64, name: &str) -> User {
    User {
        id: Snowflake(id),
        username: name.to_string(),
        global_name: None,
        discriminator: Some("0".into()),
        avatar: None,
    }
}

pub fn role(id: u64, name: &str, color: u32) -> Role {
    Role {
        id: Snowflake(id),
        name: name.to_string(),
        color,
    }
}

pub fn guild() -> Guild {
    Guild {
        id: Snowflake(GUILD_ID),
        name: "Test Guild".into(),
        roles: vec![role(GUILD_ID, "@everyone", 0), role(501, "mods", 0xff0000)],
    }
}

pub fn channel(id: u64, kind: ChannelKind, name: &str, parent: Option<u64>) -> ChannelEntry {
    ChannelEntry {
        id: Snowflake(id),
        channel: Some(Channel {
            id: Snowflake(id),
            kind,
            name: name.to_string(),
            parent_id: parent.map(Snowflake),
        }),
    }
}

pub fn attachment(id: u64, name: Option<&str>, url: &str) -> Attachment {
    Attachment {
        id: Snowflake(id),
        name: name.map(str::to_string),
        url: url.to_string(),
    }
}

pub fn message(id: u64, channel_id: u64, content: &str, attachments: Vec<Attachment>) -> Message {
    Message {
        id: Snowflake(id),
        channel_id: Snowflake(channel_id),
        author: user(7, "ana"),
        content: content.to_string(),
        attachments,
        mentions: Vec::new(),
    }
}

/// `count` plain messages with ids `first_id..first_id + count`, newest first.
pub fn history(channel_id: u64, first_id: u64, count: u64) -> Vec<Message> {
    (first_id..first_id + count)
        .rev()
        .map(|id| message(id, channel_id, &format!("message {id}"), Vec::new()))
        .collect()
}

pub fn member(id: u64, name: &str, roles: Vec<Role>) -> Member {
    Member {
        user: user(id, name),
        nick: None,
        avatar: None,
        roles,
    }
}

#[derive(Default)]
pub struct FakeSource {
    pub guild: Option<Guild>,
    pub entries: Vec<ChannelEntry>,
    /// Per channel, newest first.
    pub history: HashMap<Snowflake, Vec<Message>>,
    pub members: Vec<Member>,
    pub queries: Mutex<Vec<(Snowflake, MessageQuery)>>,
    pub sent: Mutex<Vec<(Snowflake, String)>>,
}

impl FakeSource {
    pub fn new(guild: Guild) -> Self {
        Self {
            guild: Some(guild),
            ..Self::default()
        }
    }

    pub fn with_channel(mut self, entry: ChannelEntry, messages: Vec<Message>) -> Self {
        self.history.insert(entry.id, messages);
        self.entries.push(entry);
        self
    }

    pub fn with_members(mut self, members: Vec<Member>) -> Self {
        self.members = members;
        self
    }

    pub fn queries_for(&self, channel_id: u64) -> Vec<MessageQuery> {
        self.queries
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _)| *c == Snowflake(channel_id))
            .map(|(_, q)| *q)
            .collect()
    }

    pub fn sent(&self) -> Vec<(Snowflake, String)> {
        self.sent.lock().unwrap().clone()
    }
}

fn not_found(path: String) -> PlatformError {
    PlatformError::Status {
        method: "GET".into(),
        path,
        status: 404,
        body: String::new(),
    }
}

#[async_trait]
impl GuildSource for FakeSource {
    async fn guild(&self, guild_id: Snowflake) -> guildkeep_platform::Result<Guild> {
        self.guild
            .clone()
            .filter(|g| g.id == guild_id)
            .ok_or_else(|| not_found(format!("/guilds/{guild_id}")))
    }

    async fn channels(&self, _guild_id: Snowflake) -> guildkeep_platform::Result<Vec<ChannelEntry>> {
        Ok(self.entries.clone())
    }

    async fn messages(
        &self,
        channel_id: Snowflake,
        query: MessageQuery,
    ) -> guildkeep_platform::Result<Vec<Message>> {
        self.queries.lock().unwrap().push((channel_id, query));
        let page = self
            .history
            .get(&channel_id)
            .map(|messages| {
                messages
                    .iter()
                    .filter(|m| query.before.map_or(true, |anchor| m.id < anchor))
                    .take(usize::from(query.limit))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(page)
    }

    async fn members(&self, _guild: &Guild) -> guildkeep_platform::Result<Vec<Member>> {
        Ok(self.members.clone())
    }

    async fn send_message(&self, channel_id: Snowflake, content: &str) -> guildkeep_platform::Result<()> {
        self.sent.lock().unwrap().push((channel_id, content.to_string()));
        Ok(())
    }
}

/// Serves every URL with its own bytes, except the ones marked failing.
#[derive(Default)]
pub struct FakeFetcher {
    pub failing: HashSet<String>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn failing_on(url: &str) -> Self {
        Self {
            failing: HashSet::from([url.to_string()]),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetch for FakeFetcher {
    async fn fetch(&self, url: &str) -> guildkeep_platform::Result<Bytes> {
        self.calls.lock().unwrap().push(url.to_string());
        if self.failing.contains(url) {
            return Err(not_found(url.to_string()));
        }
        Ok(Bytes::from(url.as_bytes().to_vec()))
    }
}
