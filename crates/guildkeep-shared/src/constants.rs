/// First millisecond of 2015, the epoch platform snowflakes count from
pub const PLATFORM_EPOCH_MS: u64 = 1_420_070_400_000;

/// Page size used to seed the "oldest known message" cursor
pub const SEED_PAGE_SIZE: u8 = 1;

/// Largest history page the platform serves per request
pub const MESSAGE_PAGE_SIZE: u8 = 100;

/// Largest member page the platform serves per request
pub const MEMBER_PAGE_SIZE: u16 = 1000;

/// Default capacity of the bounded write queue
pub const DEFAULT_WRITE_QUEUE: usize = 256;

/// Prefix of every per-guild backup root directory
pub const GUILD_DIR_PREFIX: &str = "guild_";

/// Aggregate channel mapping, relative to the guild root
pub const CHANNELS_FILE: &str = "channels.json";

/// Aggregate member mapping, relative to the guild root
pub const MEMBERS_FILE: &str = "members.json";

/// Static viewer page, relative to the guild root
pub const SITE_FILE: &str = "index.html";

/// Fallback image used by the viewer when an avatar is missing
pub const DEFAULT_AVATAR_FILE: &str = "default_avatar.png";
