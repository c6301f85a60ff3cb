//! # guildkeep-store
//!
//! On-disk side of a backup run. Every file of a run lives under one
//! `guild_<id>` root; [`FileWriter`] persists into it through a bounded
//! queue and [`BackupReader`] reads the records back for the viewer.

pub mod layout;
pub mod reader;
pub mod writer;

mod error;

pub use error::{Result, StoreError};
pub use reader::BackupReader;
pub use writer::{FileWriter, WriteReport};
