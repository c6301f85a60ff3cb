//! # guildkeep-bot
//!
//! Moderation bot that exports a guild to local files:
//! - **Channel backup**: walks every text channel's history backwards and
//!   writes one record per message, plus attachments
//! - **Member backup**: one record per member and their avatar image
//! - **Viewer site**: a static HTML page rendered from a finished backup
//! - **Commands**: a static registry dispatching `backup` and `build-site`

pub mod backup;
pub mod commands;
pub mod config;
pub mod error;
pub mod site;

#[cfg(test)]
mod testing;

pub use error::{BackupError, Result};
