//! Static viewer page built from a finished backup.

use tracing::{debug, info};

use guildkeep_shared::constants::DEFAULT_AVATAR_FILE;
use guildkeep_shared::naming::{is_remote, MediaKind};
use guildkeep_shared::{MessageRecord, Snowflake};
use guildkeep_store::{layout, BackupReader};

use crate::error::Result;

const STYLESHEET: &str = r#"@import url('https://fonts.googleapis.com/css2?family=Noto+Sans&display=swap');
body {
    background-color: #313338;
    color: white;
    font-family: "Noto Sans", "Helvetica Neue", Helvetica, Arial, sans-serif;
    font-size: 14px;
    margin: 24px;
    padding: 0;
    display: grid;
    grid-template: auto / 20% auto;
}
h1,
h2,
p {
    margin: 0;
    padding: 0;
}
.active {
    background-color: #505050;
}
.message {
    display: flex;
    flex-direction: row;
    flex-wrap: nowrap;
    margin-bottom: 8px;
}
.message .content {
    max-width: 75%;
}
.message > :first-child {
    border-radius: 50%;
    width: 48px;
    height: 48px;
    margin-right: 8px;
}
.attachment {
    max-width: 700px;
    max-height: 500px;
}"#;

/// Render the viewer page for the backup under `reader`'s root.
///
/// Only the first channel of `channels.json` is rendered. A missing
/// `channels.json` or message record is an error.
pub async fn build_site(reader: &BackupReader, title: &str) -> Result<String> {
    let channels = reader.channels().await?;

    let mut blocks: Vec<String> = Vec::new();
    if let Some((channel_id, channel)) = channels.first() {
        info!(channel = %channel_id, messages = channel.messages.len(), "Rendering #{}", channel.name);
        for &message_id in &channel.messages {
            let message = reader.message(message_id).await?;
            blocks.push(render_message(message_id, &message));
        }
    } else {
        debug!("No channels to render");
    }

    // Stored ids run newest first; the page reads oldest first.
    blocks.reverse();
    Ok(render_document(title, &blocks.concat()))
}

fn attachment_source(message_id: Snowflake, entry: &str) -> String {
    if is_remote(entry) {
        entry.to_string()
    } else {
        layout::attachment_file(message_id, entry)
    }
}

fn render_attachment(message_id: Snowflake, entry: &str) -> Option<String> {
    let kind = MediaKind::classify(entry)?;
    let src = escape_html(&attachment_source(message_id, entry));
    let class = kind.css_class();
    Some(match kind {
        MediaKind::Image => format!(r#"<img src="{src}" class="attachment {class}" />"#),
        MediaKind::Audio | MediaKind::Video => {
            let tag = kind.tag();
            format!(r#"<{tag} src="{src}" controls class="attachment {class}"></{tag}>"#)
        }
    })
}

/// One message block. Attachments are listed last to first.
pub fn render_message(message_id: Snowflake, message: &MessageRecord) -> String {
    let attachments: String = message
        .attachments
        .iter()
        .rev()
        .filter_map(|entry| render_attachment(message_id, entry))
        .collect();

    format!(
        concat!(
            r#"<div id="{id}" class="author-{sender} message">"#,
            r#"<img src="{avatar}" class="avatar" onerror="this.onerror=null;this.src='{fallback}';" />"#,
            r#"<div><p class="author">{name} • {date}</p><p class="content">{content}</p>{attachments}</div>"#,
            "</div>\n"
        ),
        id = message_id,
        sender = message.sender_id,
        avatar = layout::avatar_file(message.sender_id),
        fallback = DEFAULT_AVATAR_FILE,
        name = escape_html(&message.sender_name),
        date = escape_html(&message.date_string),
        content = escape_html(&message.contents_clean),
        attachments = attachments,
    )
}

pub fn render_document(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n<title>{}</title>\n<style>\n{}\n</style>\n</head>\n<body>\n<nav id=\"channel-list\"></nav>\n<div id=\"channel-contents\">{}</div>\n</body>\n</html>\n",
        escape_html(title),
        STYLESHEET,
        body
    )
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
