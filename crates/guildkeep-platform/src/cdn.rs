//! Content-delivery URLs and the HTTP attachment fetcher.

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use guildkeep_shared::Snowflake;

use crate::error::{PlatformError, Result};
use crate::source::Fetch;

pub const CDN_BASE: &str = "https://cdn.discordapp.com";

/// Number of default avatars for accounts without a legacy discriminator.
const DEFAULT_AVATARS: u64 = 6;
/// Number of default avatars for legacy `name#1234` accounts.
const LEGACY_DEFAULT_AVATARS: u64 = 5;

pub fn user_avatar_url(user_id: Snowflake, hash: &str) -> String {
    format!("{CDN_BASE}/avatars/{user_id}/{hash}.webp")
}

pub fn member_avatar_url(guild_id: Snowflake, user_id: Snowflake, hash: &str) -> String {
    format!("{CDN_BASE}/guilds/{guild_id}/users/{user_id}/avatars/{hash}.webp")
}

pub fn default_avatar_url(user_id: Snowflake, discriminator: Option<&str>) -> String {
    let legacy = discriminator
        .filter(|d| *d != "0")
        .and_then(|d| d.parse::<u64>().ok());
    let index = match legacy {
        Some(tag) => tag % LEGACY_DEFAULT_AVATARS,
        None => (user_id.get() >> 22) % DEFAULT_AVATARS,
    };
    format!("{CDN_BASE}/embed/avatars/{index}.png")
}

/// Downloads attachments and avatars over plain HTTPS.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    http: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("guildkeep/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes> {
        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(PlatformError::Status {
                method: "GET".to_string(),
                path: url.to_string(),
                status: status.as_u16(),
                body: String::new(),
            });
        }
        let data = resp.bytes().await?;
        debug!(url = %url, size = data.len(), "Fetched content");
        Ok(data)
    }
}
