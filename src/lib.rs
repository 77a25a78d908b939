//! # Yoga Journal
//!
//! A personal yoga practice journal: record sessions with notes, photos,
//! hashtags and poses, then look back at them through a monthly dashboard,
//! search, a pose library and frequent pose sequences.
//!
//! ## Features
//!
//! - **Monthly dashboard**: total minutes, sessions, longest streak and a
//!   heatmap calendar
//! - **Search**: case-insensitive over notes, hashtags and pose names
//! - **Pose library**: every practiced pose with the sessions it appeared in
//! - **Sequence mining**: the pose pairs practiced back to back most often
//! - **Pluggable storage**: in-memory, SQLite or a hosted Supabase table
//!
//! ## Modules
//!
//! - [`journal`]: entry, pose and photo types with validation
//! - [`analytics`]: duration parsing, monthly aggregation, heatmap tiers
//! - [`search`]: entry filtering
//! - [`library`]: pose library and sequence miner
//! - [`store`]: the `EntryStore` trait and its backends
//! - [`api`]: REST API server with Axum
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use yoga_journal::analytics::{aggregate_month, ViewMonth};
//! use yoga_journal::journal::{NewEntry, YogaPose};
//! use yoga_journal::store::{EntryStore, MemoryStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = MemoryStore::new();
//!
//!     store
//!         .insert(
//!             NewEntry::new("Slow morning flow")
//!                 .duration("45분")
//!                 .hashtag("빈야사")
//!                 .pose(YogaPose::new("Downward Dog", "Adho Mukha Svanasana")),
//!         )
//!         .await?;
//!
//!     let entries = store.list().await?;
//!     let stats = aggregate_month(&entries, ViewMonth::current());
//!     println!(
//!         "{} sessions, {} minutes, longest streak {}",
//!         stats.total_sessions, stats.total_minutes, stats.longest_streak
//!     );
//!
//!     Ok(())
//! }
//! ```

pub mod analytics;
pub mod api;
pub mod config;
pub mod journal;
pub mod library;
pub mod search;
pub mod store;

// Re-export top-level types for convenience
pub use journal::{
    Difficulty, EntryPatch, JournalEntry, JournalError, JournalResult, NewEntry, PhotoEntry,
    PhotoTheme, YogaPose,
};

pub use analytics::{
    aggregate_month, calendar_grid, parse_duration, DayBucket, DayHeat, HeatmapTier,
    MonthlyStats, ViewMonth,
};

pub use search::{favorites_only, filter_entries};

pub use library::{
    filter_poses, mine_frequent_sequences, pose_library, PoseSequence, PoseWithEntries,
};

pub use store::{
    open_store, Backup, EntryStore, MemoryStore, SqliteStore, StoreError, StoreResult,
    SupabaseStore,
};

pub use api::{build_router, serve, ApiConfig, ApiError, AppState};

pub use config::{
    AnalyticsConfig, Config, ConfigError, LoggingConfig, StoreBackend, StoreConfig,
    SupabaseConfig,
};
