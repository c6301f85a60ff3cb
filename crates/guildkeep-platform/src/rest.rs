//! REST implementation of [`GuildSource`] against the platform's HTTP API.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use guildkeep_shared::constants::MEMBER_PAGE_SIZE;
use guildkeep_shared::Snowflake;

use crate::error::{PlatformError, Result};
use crate::models::{Channel, ChannelEntry, Guild, Member, Message, User};
use crate::source::{GuildSource, MessageQuery};

pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";

/// How many times a single request is replayed after a 429.
const MAX_RATE_LIMIT_RETRIES: u32 = 5;

/// Used when a 429 carries no readable `retry_after`.
const FALLBACK_RETRY_SECS: f64 = 1.0;

/// Upper bound on a single rate-limit wait.
const MAX_RETRY_SECS: f64 = 60.0;

/// Wait before replaying a rate-limited request. Non-finite values fall
/// back to the default; everything else is clamped to `0..=MAX_RETRY_SECS`.
fn retry_delay(retry_after: f64) -> Duration {
    let secs = if retry_after.is_finite() { retry_after } else { FALLBACK_RETRY_SECS };
    Duration::from_secs_f64(secs.clamp(0.0, MAX_RETRY_SECS))
}

/// Bot-authenticated client for the platform's REST API.
#[derive(Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base: String,
    token: String,
}

impl fmt::Debug for RestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestClient")
            .field("base", &self.base)
            .field("token", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct RawMember {
    user: User,
    #[serde(default)]
    nick: Option<String>,
    #[serde(default)]
    avatar: Option<String>,
    #[serde(default)]
    roles: Vec<Snowflake>,
}

#[derive(Debug, Deserialize)]
struct RateLimitBody {
    retry_after: f64,
}

impl RestClient {
    pub fn new(base: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!(
                "DiscordBot (guildkeep, ",
                env!("CARGO_PKG_VERSION"),
                ")"
            ))
            .build()?;
        Ok(Self {
            http,
            base: base.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Send a request, waiting out rate limits. Non-success statuses other
    /// than 429 become [`PlatformError::Status`].
    async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Response> {
        let mut attempts = 0;
        loop {
            attempts += 1;
            let mut req = self
                .http
                .request(method.clone(), self.url(path))
                .header("Authorization", format!("Bot {}", self.token))
                .query(query);
            if let Some(body) = body {
                req = req.json(body);
            }

            let resp = req.send().await?;
            let status = resp.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                if attempts > MAX_RATE_LIMIT_RETRIES {
                    return Err(PlatformError::RateLimited {
                        path: path.to_string(),
                        attempts,
                    });
                }
                let wait = resp
                    .json::<RateLimitBody>()
                    .await
                    .map(|b| b.retry_after)
                    .unwrap_or(FALLBACK_RETRY_SECS);
                warn!(path = %path, retry_after = wait, "Rate limited, waiting");
                tokio::time::sleep(retry_delay(wait)).await;
                continue;
            }

            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                return Err(PlatformError::Status {
                    method: method.to_string(),
                    path: path.to_string(),
                    status: status.as_u16(),
                    body,
                });
            }

            return Ok(resp);
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let resp = self.request(Method::GET, path, query, None).await?;
        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Turn a raw channel listing into entries, keeping undecodable slots as
/// `None` so the caller can report them.
pub(crate) fn parse_channel_entries(values: Vec<Value>) -> Vec<ChannelEntry> {
    let mut entries = Vec::with_capacity(values.len());
    for value in values {
        let id = value
            .get("id")
            .and_then(|id| serde_json::from_value::<Snowflake>(id.clone()).ok());
        let Some(id) = id else {
            warn!("Channel listing entry without an id, ignoring");
            continue;
        };
        let channel = match serde_json::from_value::<Channel>(value) {
            Ok(channel) => Some(channel),
            Err(e) => {
                debug!(channel = %id, error = %e, "Undecodable channel entry");
                None
            }
        };
        entries.push(ChannelEntry { id, channel });
    }
    entries
}

/// Resolve a member's role ids against the guild. The everyone role is
/// listed first, the way the platform's own clients present it.
fn resolve_member(guild: &Guild, raw: RawMember) -> Member {
    let mut roles = Vec::with_capacity(raw.roles.len() + 1);
    if let Some(everyone) = guild.role(guild.everyone_role_id()) {
        roles.push(everyone.clone());
    }
    for id in raw.roles {
        match guild.role(id) {
            Some(role) if role.id != guild.everyone_role_id() => roles.push(role.clone()),
            Some(_) => {}
            None => debug!(role = %id, user = %raw.user.id, "Member has unknown role"),
        }
    }
    Member {
        user: raw.user,
        nick: raw.nick,
        avatar: raw.avatar,
        roles,
    }
}

#[async_trait]
impl GuildSource for RestClient {
    async fn guild(&self, guild_id: Snowflake) -> Result<Guild> {
        self.get_json(&format!("/guilds/{guild_id}"), &[]).await
    }

    async fn channels(&self, guild_id: Snowflake) -> Result<Vec<ChannelEntry>> {
        let values: Vec<Value> = self.get_json(&format!("/guilds/{guild_id}/channels"), &[]).await?;
        Ok(parse_channel_entries(values))
    }

    async fn messages(&self, channel_id: Snowflake, query: MessageQuery) -> Result<Vec<Message>> {
        let mut params = vec![("limit", query.limit.to_string())];
        if let Some(before) = query.before {
            params.push(("before", before.to_string()));
        }
        self.get_json(&format!("/channels/{channel_id}/messages"), &params).await
    }

    async fn members(&self, guild: &Guild) -> Result<Vec<Member>> {
        let path = format!("/guilds/{}/members", guild.id);
        let mut members = Vec::new();
        let mut after = Snowflake(0);
        loop {
            let page: Vec<RawMember> = self
                .get_json(
                    &path,
                    &[
                        ("limit", MEMBER_PAGE_SIZE.to_string()),
                        ("after", after.to_string()),
                    ],
                )
                .await?;
            let count = page.len();
            if let Some(last) = page.last() {
                after = last.user.id;
            }
            members.extend(page.into_iter().map(|raw| resolve_member(guild, raw)));
            debug!(guild = %guild.id, fetched = members.len(), "Member page received");
            if count < usize::from(MEMBER_PAGE_SIZE) {
                break;
            }
        }
        Ok(members)
    }

    async fn send_message(&self, channel_id: Snowflake, content: &str) -> Result<()> {
        let body = serde_json::json!({ "content": content });
        self.request(
            Method::POST,
            &format!("/channels/{channel_id}/messages"),
            &[],
            Some(&body),
        )
        .await?;
        Ok(())
    }
}
