//! # guildkeep-platform
//!
//! Chat-platform side of guildkeep: payload models, the [`GuildSource`] and
//! [`Fetch`] seams, a REST implementation of both, and mention cleaning for
//! archived message text.

pub mod cdn;
pub mod error;
pub mod mentions;
pub mod models;
pub mod rest;
pub mod source;

pub use cdn::HttpFetcher;
pub use error::{PlatformError, Result};
pub use mentions::MentionDirectory;
pub use models::{Attachment, Channel, ChannelEntry, ChannelKind, Guild, Member, Message, Permissions, Role, User};
pub use rest::RestClient;
pub use source::{Fetch, GuildSource, MessageQuery};
