//! Mention resolution for the "clean" rendition of message text.

use std::collections::HashMap;

use guildkeep_shared::Snowflake;

use crate::models::{ChannelEntry, Guild, User};

/// Snowflakes inside mention markup are 17 to 19 digits long.
const MIN_ID_DIGITS: usize = 17;
const MAX_ID_DIGITS: usize = 19;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mention {
    User(Snowflake),
    Role(Snowflake),
    Channel(Snowflake),
}

/// Names known for a guild, used to turn `<@id>`, `<@&id>` and `<#id>`
/// markup into readable text.
#[derive(Debug, Clone, Default)]
pub struct MentionDirectory {
    users: HashMap<Snowflake, String>,
    roles: HashMap<Snowflake, String>,
    channels: HashMap<Snowflake, String>,
}

impl MentionDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory seeded with a guild's roles and readable channels.
    pub fn for_guild(guild: &Guild, channels: &[ChannelEntry]) -> Self {
        let mut directory = Self::new();
        for role in &guild.roles {
            directory.roles.insert(role.id, role.name.clone());
        }
        for channel in channels.iter().filter_map(|e| e.channel.as_ref()) {
            directory.channels.insert(channel.id, channel.name.clone());
        }
        directory
    }

    pub fn add_user(&mut self, user: &User) {
        self.users.insert(user.id, user.display_name().to_string());
    }

    /// Resolve mention markup in `content`. Users listed in `mentioned`
    /// take precedence over the directory. Unknown mentions stay verbatim;
    /// `@everyone` and `@here` are defused with a zero-width space.
    pub fn clean(&self, content: &str, mentioned: &[User]) -> String {
        let mut out = String::with_capacity(content.len());
        let mut rest = content;

        while let Some(start) = rest.find('<') {
            out.push_str(&rest[..start]);
            let candidate = &rest[start..];
            match parse_mention(candidate) {
                Some((mention, len)) => {
                    match self.resolve(mention, mentioned) {
                        Some(text) => out.push_str(&text),
                        None => out.push_str(&candidate[..len]),
                    }
                    rest = &candidate[len..];
                }
                None => {
                    out.push('<');
                    rest = &candidate[1..];
                }
            }
        }
        out.push_str(rest);

        out.replace("@everyone", "@\u{200b}everyone")
            .replace("@here", "@\u{200b}here")
    }

    fn resolve(&self, mention: Mention, mentioned: &[User]) -> Option<String> {
        match mention {
            Mention::User(id) => mentioned
                .iter()
                .find(|u| u.id == id)
                .map(|u| u.display_name().to_string())
                .or_else(|| self.users.get(&id).cloned())
                .map(|name| format!("@{name}")),
            Mention::Role(id) => self.roles.get(&id).map(|name| format!("@{name}")),
            Mention::Channel(id) => self.channels.get(&id).map(|name| format!("#{name}")),
        }
    }
}

/// Parse mention markup at the start of `s`, returning it and its byte length.
fn parse_mention(s: &str) -> Option<(Mention, usize)> {
    let (make, prefix): (fn(Snowflake) -> Mention, usize) = if s.starts_with("<@!") {
        (Mention::User, 3)
    } else if s.starts_with("<@&") {
        (Mention::Role, 3)
    } else if s.starts_with("<@") {
        (Mention::User, 2)
    } else if s.starts_with("<#") {
        (Mention::Channel, 2)
    } else {
        return None;
    };

    let body = &s[prefix..];
    let digits = body.bytes().take_while(u8::is_ascii_digit).count();
    if !(MIN_ID_DIGITS..=MAX_ID_DIGITS).contains(&digits) || body.as_bytes().get(digits) != Some(&b'>') {
        return None;
    }
    let id: Snowflake = body[..digits].parse().ok()?;
    Some((make(id), prefix + digits + 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Channel, ChannelKind, Role};

    const ANA: u64 = 100_000_000_000_000_001;
    const MODS: u64 = 100_000_000_000_000_002;
    const GENERAL: u64 = 100_000_000_000_000_003;

    fn directory() -> MentionDirectory {
        let guild = Guild {
            id: Snowflake(1),
            name: "g".into(),
            roles: vec![Role { id: Snowflake(MODS), name: "mods".into(), color: 0 }],
        };
        let channels = vec![ChannelEntry {
            id: Snowflake(GENERAL),
            channel: Some(Channel {
                id: Snowflake(GENERAL),
                kind: ChannelKind::Text,
                name: "general".into(),
                parent_id: None,
            }),
        }];
        MentionDirectory::for_guild(&guild, &channels)
    }

    fn ana() -> User {
        User {
            id: Snowflake(ANA),
            username: "ana".into(),
            global_name: Some("Ana".into()),
            discriminator: None,
            avatar: None,
        }
    }

    #[test]
    fn test_resolves_all_mention_kinds() {
        let content = format!("<@{ANA}> and <@!{ANA}> ask <@&{MODS}> in <#{GENERAL}>");
        let clean = directory().clean(&content, &[ana()]);
        assert_eq!(clean, "@Ana and @Ana ask @mods in #general");
    }

    #[test]
    fn test_unknown_mentions_stay_verbatim() {
        let content = "<@123456789012345678> hi <#123456789012345678> <3 <@12>";
        assert_eq!(directory().clean(content, &[]), content);
    }

    #[test]
    fn test_directory_users_are_fallback() {
        let mut dir = directory();
        dir.add_user(&ana());
        assert_eq!(dir.clean(&format!("ping <@{ANA}>"), &[]), "ping @Ana");
    }

    #[test]
    fn test_everyone_and_here_are_defused() {
        let clean = MentionDirectory::new().clean("@everyone @here", &[]);
        assert_eq!(clean, "@\u{200b}everyone @\u{200b}here");
    }
}
