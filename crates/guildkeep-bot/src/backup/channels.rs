//! Channel backup traversal.
//!
//! For every channel with a linear history the traversal seeds a cursor
//! with the newest message, then walks backwards in pages of up to 100
//! until a page comes back empty. Each message is persisted as soon as it
//! is seen; the aggregate `channels.json` is written once, after the last
//! channel. A fetch failure aborts the traversal and leaves the aggregate
//! unwritten.

use tracing::{debug, info, warn};

use guildkeep_platform::{Channel, ChannelEntry, Fetch, Guild, GuildSource, MentionDirectory, Message, MessageQuery};
use guildkeep_shared::constants::{MESSAGE_PAGE_SIZE, SEED_PAGE_SIZE};
use guildkeep_shared::naming::resolve_attachment_name;
use guildkeep_shared::records::format_utc;
use guildkeep_shared::{ChannelMap, ChannelRecord, MessageRecord, Snowflake};
use guildkeep_store::{layout, FileWriter};

use crate::error::Result;

/// Position of a backwards walk through one channel's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryCursor {
    /// Nothing fetched yet; the next request asks for the newest message.
    Seed,
    /// Next request asks for messages strictly older than this id.
    Before(Snowflake),
    Done,
}

impl HistoryCursor {
    pub fn query(self) -> Option<MessageQuery> {
        match self {
            Self::Seed => Some(MessageQuery::latest(SEED_PAGE_SIZE)),
            Self::Before(anchor) => Some(MessageQuery::before(anchor, MESSAGE_PAGE_SIZE)),
            Self::Done => None,
        }
    }

    /// Whether `page` (newest first) reaches back to or past the anchor,
    /// i.e. repeats messages that were already seen.
    pub fn overlaps(self, page: &[Message]) -> bool {
        match (self, page.first()) {
            (Self::Before(anchor), Some(newest)) => newest.id >= anchor,
            _ => false,
        }
    }

    /// Move past a received page (newest first). An empty page, or one that
    /// overlaps the anchor, ends the walk.
    pub fn advance(self, page: &[Message]) -> Self {
        if self.overlaps(page) {
            warn!(cursor = ?self, "History page did not move past its anchor");
            return Self::Done;
        }
        match (self, page.last()) {
            (Self::Done, _) | (_, None) => Self::Done,
            (_, Some(oldest)) => Self::Before(oldest.id),
        }
    }
}

/// Totals for the channel half of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelsSummary {
    pub channels: usize,
    pub messages: usize,
    pub attachments: usize,
    /// Entries the platform returned without usable data.
    pub unreadable: usize,
}

pub async fn backup_channels<S, F>(
    source: &S,
    fetcher: &F,
    writer: &FileWriter,
    guild: &Guild,
    download_attachments: bool,
) -> Result<ChannelsSummary>
where
    S: GuildSource + ?Sized,
    F: Fetch + ?Sized,
{
    let entries = source.channels(guild.id).await?;
    let mut directory = MentionDirectory::for_guild(guild, &entries);
    let mut channels = ChannelMap::new();
    let mut summary = ChannelsSummary::default();

    for entry in &entries {
        let Some(channel) = &entry.channel else {
            warn!(channel = %entry.id, "Channel {} had null data...", entry.id);
            summary.unreadable += 1;
            continue;
        };
        if !channel.kind.has_message_history() {
            debug!(channel = %channel.id, kind = ?channel.kind, "Skipping channel without history");
            continue;
        }

        info!(
            "Backing up {} > #{} ({}/{}) ...",
            guild.name, channel.name, guild.id, channel.id
        );

        let (parent_id, parent_name) = parent_of(channel, &entries);
        let mut record = ChannelRecord::new(channel.name.clone(), parent_id, parent_name);

        let mut cursor = HistoryCursor::Seed;
        while let Some(query) = cursor.query() {
            let page = source.messages(channel.id, query).await?;
            let fresh: &[Message] = if cursor.overlaps(&page) { &[] } else { &page };
            for message in fresh {
                record.messages.push(message.id);
                directory.add_user(&message.author);
                let stored = archive_message(fetcher, writer, &directory, message, download_attachments).await?;
                summary.attachments += stored;
                summary.messages += 1;
            }
            cursor = cursor.advance(&page);
        }

        debug!(channel = %channel.id, messages = record.messages.len(), "Channel traversal finished");
        channels.insert(channel.id, record);
        summary.channels += 1;
    }

    writer.write_json(layout::channels_file(), &channels).await?;
    Ok(summary)
}

fn parent_of(channel: &Channel, entries: &[ChannelEntry]) -> (Option<Snowflake>, Option<String>) {
    let Some(parent_id) = channel.parent_id else {
        return (None, None);
    };
    let name = entries
        .iter()
        .filter_map(|e| e.channel.as_ref())
        .find(|c| c.id == parent_id)
        .map(|c| c.name.clone());
    (Some(parent_id), name)
}

/// Persist one message and, when enabled, its attachments. Returns the
/// number of attachments downloaded.
async fn archive_message<F>(
    fetcher: &F,
    writer: &FileWriter,
    directory: &MentionDirectory,
    message: &Message,
    download_attachments: bool,
) -> Result<usize>
where
    F: Fetch + ?Sized,
{
    let mut record = MessageRecord {
        date: message.created_at_ms(),
        date_string: format_utc(message.created_at_ms()),
        sender_id: message.author.id,
        sender_name: message.author.username.clone(),
        contents: message.content.clone(),
        contents_clean: directory.clean(&message.content, &message.mentions),
        attachments: Vec::with_capacity(message.attachments.len()),
    };

    if download_attachments {
        for attachment in &message.attachments {
            let name = resolve_attachment_name(attachment.name.as_deref(), &attachment.url);
            let relative = layout::attachment_file(message.id, &name);
            if layout::resolve(writer.root(), &relative).is_err() {
                warn!(message = %message.id, url = %attachment.url, "Unable to write to \"{}\"!", relative);
                continue;
            }
            let data = fetcher.fetch(&attachment.url).await?;
            writer.write(relative, data).await;
            record.attachments.push(name);
        }
    } else {
        record
            .attachments
            .extend(message.attachments.iter().map(|a| a.url.clone()));
    }

    let downloaded = if download_attachments { record.attachments.len() } else { 0 };
    writer.write_json(layout::message_file(message.id), &record).await?;
    Ok(downloaded)
}
