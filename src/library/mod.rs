//! Pose library views
//!
//! - **poses**: every practiced pose with the entries it appears in
//! - **sequences**: most frequent back-to-back pose pairs

pub mod poses;
pub mod sequences;

pub use poses::{filter_poses, pose_library, PoseWithEntries};
pub use sequences::{mine_frequent_sequences, PoseSequence, DEFAULT_TOP_SEQUENCES};
