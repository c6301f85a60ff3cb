//! Member backup: one record per member plus their avatar image.

use tracing::{debug, info};

use guildkeep_platform::{Fetch, Guild, GuildSource, Member};
use guildkeep_shared::{MemberMap, MemberRecord, RoleRecord};
use guildkeep_store::{layout, FileWriter};

use crate::error::Result;

/// Record for one member. The guild's implicit everyone role is left out;
/// every other role is kept as is.
pub fn member_record(guild: &Guild, member: &Member) -> MemberRecord {
    MemberRecord {
        name: member.user.username.clone(),
        roles: member
            .roles
            .iter()
            .filter(|role| role.id != guild.everyone_role_id())
            .map(RoleRecord::from)
            .collect(),
    }
}

/// Back up every member of `guild`. Returns the number of members written.
/// An avatar that cannot be fetched aborts the walk before `members.json`
/// is written.
pub async fn backup_members<S, F>(source: &S, fetcher: &F, writer: &FileWriter, guild: &Guild) -> Result<usize>
where
    S: GuildSource + ?Sized,
    F: Fetch + ?Sized,
{
    let members = source.members(guild).await?;
    info!(guild = %guild.id, count = members.len(), "Backing up members of {}", guild.name);

    let mut records = MemberMap::new();
    for member in &members {
        records.insert(member.user.id, member_record(guild, member));

        let avatar = fetcher.fetch(&member.display_avatar_url(guild.id)).await?;
        writer.write(layout::avatar_file(member.user.id), avatar).await;
        debug!(member = %member.user.id, "Member archived");
    }

    writer.write_json(layout::members_file(), &records).await?;
    Ok(records.len())
}
