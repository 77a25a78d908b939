//! Journal domain model
//!
//! - **types**: entries, poses, photos and the submission/patch shapes
//! - **error**: validation errors
//!
//! Entries are plain data. Everything that reads them (analytics, search,
//! the pose library) takes `&[JournalEntry]` and recomputes from scratch.

pub mod error;
pub mod types;

pub use error::{JournalError, JournalResult};
pub use types::{
    parse_hashtags, Difficulty, EntryPatch, JournalEntry, NewEntry, PhotoEntry, PhotoTheme,
    YogaPose,
};

/// Maximum number of photos attached to one entry
pub const MAX_PHOTOS: usize = 2;
