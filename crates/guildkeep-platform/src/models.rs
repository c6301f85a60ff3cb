//! Domain models for the parts of a guild the exporter reads.
//!
//! The structs deserialize straight from the platform's JSON where the
//! shapes line up; [`Member`] is assembled by the client because role ids
//! have to be resolved against the guild's role list first.

use serde::{Deserialize, Serialize};

use guildkeep_shared::{RoleRecord, Snowflake};

use crate::cdn;

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: Snowflake,
    pub username: String,
    #[serde(default)]
    pub global_name: Option<String>,
    /// Legacy four-digit tag; `"0"` for accounts on the new username system.
    #[serde(default)]
    pub discriminator: Option<String>,
    /// Avatar hash, if a custom avatar is set.
    #[serde(default)]
    pub avatar: Option<String>,
}

impl User {
    /// Name shown in clients: global display name, else username.
    pub fn display_name(&self) -> &str {
        self.global_name.as_deref().unwrap_or(&self.username)
    }

    /// Custom avatar if set, otherwise the platform's default avatar.
    pub fn display_avatar_url(&self) -> String {
        match &self.avatar {
            Some(hash) => cdn::user_avatar_url(self.id, hash),
            None => cdn::default_avatar_url(self.id, self.discriminator.as_deref()),
        }
    }
}

// ---------------------------------------------------------------------------
// Channel
// ---------------------------------------------------------------------------

/// Channel type as reported by the platform's numeric `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum ChannelKind {
    Text,
    Dm,
    Voice,
    GroupDm,
    Category,
    Announcement,
    AnnouncementThread,
    PublicThread,
    PrivateThread,
    Stage,
    Forum,
    Media,
    Other(u8),
}

impl From<u8> for ChannelKind {
    fn from(code: u8) -> Self {
        match code {
            0 => Self::Text,
            1 => Self::Dm,
            2 => Self::Voice,
            3 => Self::GroupDm,
            4 => Self::Category,
            5 => Self::Announcement,
            10 => Self::AnnouncementThread,
            11 => Self::PublicThread,
            12 => Self::PrivateThread,
            13 => Self::Stage,
            15 => Self::Forum,
            16 => Self::Media,
            other => Self::Other(other),
        }
    }
}

impl From<ChannelKind> for u8 {
    fn from(kind: ChannelKind) -> Self {
        match kind {
            ChannelKind::Text => 0,
            ChannelKind::Dm => 1,
            ChannelKind::Voice => 2,
            ChannelKind::GroupDm => 3,
            ChannelKind::Category => 4,
            ChannelKind::Announcement => 5,
            ChannelKind::AnnouncementThread => 10,
            ChannelKind::PublicThread => 11,
            ChannelKind::PrivateThread => 12,
            ChannelKind::Stage => 13,
            ChannelKind::Forum => 15,
            ChannelKind::Media => 16,
            ChannelKind::Other(code) => code,
        }
    }
}

impl ChannelKind {
    /// Guild text and announcement channels: the kinds whose history is a
    /// single linear message stream.
    pub fn has_message_history(self) -> bool {
        matches!(self, Self::Text | Self::Announcement)
    }

    /// Kinds a plain message can be posted to. Stage channels are excluded.
    pub fn accepts_messages(self) -> bool {
        matches!(
            self,
            Self::Text
                | Self::Dm
                | Self::Voice
                | Self::GroupDm
                | Self::Announcement
                | Self::AnnouncementThread
                | Self::PublicThread
                | Self::PrivateThread
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Channel {
    pub id: Snowflake,
    #[serde(rename = "type")]
    pub kind: ChannelKind,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<Snowflake>,
}

/// One slot of a guild's channel listing. `channel` is `None` when the
/// platform returned an entry that could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelEntry {
    pub id: Snowflake,
    pub channel: Option<Channel>,
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Attachment {
    pub id: Snowflake,
    #[serde(rename = "filename", default)]
    pub name: Option<String>,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    pub author: User,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    /// Users mentioned in `content`.
    #[serde(default)]
    pub mentions: Vec<User>,
}

impl Message {
    pub fn created_at_ms(&self) -> u64 {
        self.id.timestamp_ms()
    }
}

// ---------------------------------------------------------------------------
// Guild, roles, members
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Role {
    pub id: Snowflake,
    pub name: String,
    #[serde(default)]
    pub color: u32,
}

impl Role {
    /// `#rrggbb`, `#000000` for roles without a color.
    pub fn hex_color(&self) -> String {
        format!("#{:06x}", self.color & 0x00ff_ffff)
    }
}

impl From<&Role> for RoleRecord {
    fn from(role: &Role) -> Self {
        Self {
            name: role.name.clone(),
            color: role.hex_color(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Guild {
    pub id: Snowflake,
    pub name: String,
    #[serde(default)]
    pub roles: Vec<Role>,
}

impl Guild {
    /// The implicit role every member holds shares the guild's id.
    pub fn everyone_role_id(&self) -> Snowflake {
        self.id
    }

    pub fn role(&self, id: Snowflake) -> Option<&Role> {
        self.roles.iter().find(|r| r.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub user: User,
    pub nick: Option<String>,
    /// Guild-specific avatar hash.
    pub avatar: Option<String>,
    /// Resolved roles, including the guild's everyone role.
    pub roles: Vec<Role>,
}

impl Member {
    /// Guild avatar, else the user's avatar, else the default avatar.
    pub fn display_avatar_url(&self, guild_id: Snowflake) -> String {
        match &self.avatar {
            Some(hash) => cdn::member_avatar_url(guild_id, self.user.id, hash),
            None => self.user.display_avatar_url(),
        }
    }
}

// ---------------------------------------------------------------------------
// Permissions
// ---------------------------------------------------------------------------

/// Permission bit set of a guild member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Permissions(pub u64);

impl Permissions {
    pub const KICK_MEMBERS: u64 = 1 << 1;
    pub const BAN_MEMBERS: u64 = 1 << 2;
    pub const ADMINISTRATOR: u64 = 1 << 3;
    pub const MANAGE_GUILD: u64 = 1 << 5;
    pub const MODERATE_MEMBERS: u64 = 1 << 40;

    const MODERATOR_MASK: u64 = Self::KICK_MEMBERS
        | Self::BAN_MEMBERS
        | Self::ADMINISTRATOR
        | Self::MANAGE_GUILD
        | Self::MODERATE_MEMBERS;

    pub fn administrator() -> Self {
        Self(Self::ADMINISTRATOR)
    }

    pub fn is_moderator(self) -> bool {
        self.0 & Self::MODERATOR_MASK != 0
    }
}
