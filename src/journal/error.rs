//! Journal validation errors
//!
//! Raised when a submitted entry breaks one of the entry invariants.

use thiserror::Error;

/// Errors produced while validating journal entries
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JournalError {
    /// More photos attached than an entry can hold
    #[error("An entry holds at most {max} photos, got {0}", max = crate::journal::MAX_PHOTOS)]
    TooManyPhotos(usize),

    /// Intensity rating outside 1..=5
    #[error("Intensity must be between 1 and 5, got {0}")]
    IntensityOutOfRange(u8),

    /// Neither a note nor a photo was provided
    #[error("An entry needs at least one photo or a practice note")]
    EmptyEntry,

    /// A pose without a name
    #[error("Every pose needs a name")]
    BlankPoseName,

    /// The same pose listed twice in one entry
    #[error("Pose \"{0}\" is already part of this entry")]
    DuplicatePose(String),

    /// Year/month pair that does not name a calendar month
    #[error("Invalid month: {year}-{month:02}")]
    InvalidMonth { year: i32, month: u32 },
}

/// Result type alias for journal validation
pub type JournalResult<T> = Result<T, JournalError>;
