//! # guildkeep-shared
//!
//! Types shared by every guildkeep crate: platform identifiers, the record
//! shapes written to disk during a backup run, and the small pure helpers
//! (filename resolution, media classification, timestamp formatting) that
//! both the exporter and the site builder depend on.

pub mod constants;
pub mod error;
pub mod naming;
pub mod records;
pub mod types;

pub use error::SnowflakeError;
pub use records::{ChannelMap, ChannelRecord, MemberMap, MemberRecord, MessageRecord, OrderedMap, RoleRecord};
pub use types::Snowflake;
