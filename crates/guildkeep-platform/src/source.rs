//! Seams between the exporter and the platform.
//!
//! [`GuildSource`] is everything the backup reads from the platform plus the
//! single write it makes (the completion notice). [`Fetch`] retrieves binary
//! content by URL. Both are object-safe so fakes can stand in during tests.

use async_trait::async_trait;
use bytes::Bytes;

use guildkeep_shared::Snowflake;

use crate::error::Result;
use crate::models::{ChannelEntry, Guild, Member, Message};

/// One page request against a channel's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageQuery {
    /// Maximum number of messages to return (1..=100).
    pub limit: u8,
    /// Only return messages with ids strictly lower than this one.
    pub before: Option<Snowflake>,
}

impl MessageQuery {
    pub fn latest(limit: u8) -> Self {
        Self { limit, before: None }
    }

    pub fn before(anchor: Snowflake, limit: u8) -> Self {
        Self {
            limit,
            before: Some(anchor),
        }
    }
}

#[async_trait]
pub trait GuildSource: Send + Sync {
    async fn guild(&self, guild_id: Snowflake) -> Result<Guild>;

    /// Every channel slot of the guild, in platform order.
    async fn channels(&self, guild_id: Snowflake) -> Result<Vec<ChannelEntry>>;

    /// One page of history, newest first.
    async fn messages(&self, channel_id: Snowflake, query: MessageQuery) -> Result<Vec<Message>>;

    /// The complete member list. Implementations page internally.
    async fn members(&self, guild: &Guild) -> Result<Vec<Member>>;

    async fn send_message(&self, channel_id: Snowflake, content: &str) -> Result<()>;
}

#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Bytes>;
}
