//! Paths of a backup run.
//!
//! Relative paths are `/`-separated strings so the same value can be used
//! both as a filesystem location under the guild root and as a link inside
//! the viewer page.

use std::path::{Component, Path, PathBuf};

use guildkeep_shared::constants::{CHANNELS_FILE, GUILD_DIR_PREFIX, MEMBERS_FILE, SITE_FILE};
use guildkeep_shared::Snowflake;

use crate::error::{Result, StoreError};

/// Root directory of one guild's backup under `base`.
pub fn guild_root(base: &Path, guild_id: Snowflake) -> PathBuf {
    base.join(format!("{GUILD_DIR_PREFIX}{guild_id}"))
}

pub fn channels_file() -> String {
    CHANNELS_FILE.to_string()
}

pub fn members_file() -> String {
    MEMBERS_FILE.to_string()
}

pub fn site_file() -> String {
    SITE_FILE.to_string()
}

pub fn message_file(message_id: Snowflake) -> String {
    format!("messages/{message_id}/message.json")
}

pub fn attachment_file(message_id: Snowflake, name: &str) -> String {
    format!("messages/{message_id}/attachments/{name}")
}

pub fn avatar_file(member_id: Snowflake) -> String {
    format!("members/{member_id}/avatar.webp")
}

/// Join a relative path onto `root`, refusing anything that could escape it
/// (`..`, absolute paths, drive prefixes) or that names the root itself.
pub fn resolve(root: &Path, relative: &str) -> Result<PathBuf> {
    let mut resolved = root.to_path_buf();
    let mut depth = 0;
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => {
                resolved.push(part);
                depth += 1;
            }
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(StoreError::InvalidPath(relative.to_string()));
            }
        }
    }
    if depth == 0 {
        return Err(StoreError::InvalidPath(relative.to_string()));
    }
    Ok(resolved)
}
