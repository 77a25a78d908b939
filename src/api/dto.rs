//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::analytics::{DayHeat, HeatmapTier, ViewMonth};
use crate::journal::{parse_hashtags, EntryPatch, JournalEntry, NewEntry, PhotoEntry, YogaPose};

// ============================================
// ENTRY DTOs
// ============================================

/// Query string for the entry list
#[derive(Debug, Default, Deserialize)]
pub struct EntryListQuery {
    /// Free-text search over notes, hashtags and poses
    #[serde(default)]
    pub q: Option<String>,
    /// Only favorites when true
    #[serde(default)]
    pub favorites: Option<bool>,
}

/// Entry list response
#[derive(Debug, Serialize, Deserialize)]
pub struct EntryListResponse {
    pub total: usize,
    pub entries: Vec<JournalEntry>,
}

/// Hashtags as a JSON array or as the comma-separated form field
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum HashtagsInput {
    List(Vec<String>),
    Text(String),
}

impl HashtagsInput {
    pub fn into_tags(self) -> Vec<String> {
        match self {
            HashtagsInput::List(tags) => tags
                .into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
            HashtagsInput::Text(text) => parse_hashtags(&text),
        }
    }
}

/// Create entry request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEntryRequest {
    /// Defaults to now
    #[serde(default)]
    pub date: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub photos: Vec<PhotoEntry>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub hashtags: Option<HashtagsInput>,
    #[serde(default)]
    pub poses: Vec<YogaPose>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub intensity: Option<u8>,
    #[serde(default)]
    pub is_favorite: Option<bool>,
}

impl From<CreateEntryRequest> for NewEntry {
    fn from(req: CreateEntryRequest) -> Self {
        NewEntry {
            date: req.date,
            photos: req.photos,
            notes: req.notes,
            hashtags: req.hashtags.map(HashtagsInput::into_tags).unwrap_or_default(),
            poses: req.poses,
            duration: req.duration,
            intensity: req.intensity,
            is_favorite: req.is_favorite,
        }
    }
}

/// Partial update request; absent fields are left unchanged
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEntryRequest {
    #[serde(default)]
    pub date: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub photos: Option<Vec<PhotoEntry>>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub hashtags: Option<HashtagsInput>,
    #[serde(default)]
    pub poses: Option<Vec<YogaPose>>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub intensity: Option<u8>,
    #[serde(default)]
    pub is_favorite: Option<bool>,
}

impl From<UpdateEntryRequest> for EntryPatch {
    fn from(req: UpdateEntryRequest) -> Self {
        EntryPatch {
            date: req.date,
            photos: req.photos,
            notes: req.notes,
            hashtags: req.hashtags.map(HashtagsInput::into_tags),
            poses: req.poses,
            duration: req.duration,
            intensity: req.intensity,
            is_favorite: req.is_favorite,
        }
    }
}

// ============================================
// ANALYTICS DTOs
// ============================================

/// Monthly dashboard response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyAnalyticsResponse {
    /// "YYYY-MM"
    pub month: String,
    pub previous_month: String,
    pub next_month: String,
    pub total_minutes: u32,
    pub total_sessions: usize,
    pub longest_streak: u32,
    /// One cell per day of the month
    pub heatmap: Vec<DayHeatDto>,
    /// Leading blanks (Sunday first) then day numbers
    pub calendar: Vec<Option<u32>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DayHeatDto {
    pub day: u32,
    pub minutes: u32,
    pub sessions: usize,
    pub tier: HeatmapTier,
    /// 0 (none) to 4 (darkest)
    pub level: u8,
}

impl From<DayHeat> for DayHeatDto {
    fn from(heat: DayHeat) -> Self {
        Self {
            day: heat.day,
            minutes: heat.minutes,
            sessions: heat.sessions,
            tier: heat.tier,
            level: heat.tier.level(),
        }
    }
}

/// Entries practiced on one day
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayDetailResponse {
    /// "YYYY-MM-DD"
    pub date: String,
    pub total_minutes: u32,
    pub tier: HeatmapTier,
    pub entries: Vec<JournalEntry>,
}

impl DayDetailResponse {
    pub fn empty(month: ViewMonth, day: u32) -> Self {
        Self {
            date: format!("{}-{:02}", month, day),
            total_minutes: 0,
            tier: HeatmapTier::Empty,
            entries: Vec::new(),
        }
    }
}

// ============================================
// LIBRARY DTOs
// ============================================

/// Query string for the pose library
#[derive(Debug, Default, Deserialize)]
pub struct PoseQuery {
    /// Pose name or sanskrit name filter
    #[serde(default)]
    pub q: Option<String>,
    /// Entry search applied before the library is built
    #[serde(default)]
    pub search: Option<String>,
}

/// Pose library response
#[derive(Debug, Serialize, Deserialize)]
pub struct PoseLibraryResponse {
    pub total: usize,
    pub poses: Vec<PoseLibraryItem>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoseLibraryItem {
    pub pose: YogaPose,
    pub times_practiced: usize,
    pub entries: Vec<PoseEntryRef>,
}

/// Entry a pose was practiced in
#[derive(Debug, Serialize, Deserialize)]
pub struct PoseEntryRef {
    pub id: String,
    pub date: DateTime<FixedOffset>,
}

/// Query string for frequent sequences
#[derive(Debug, Default, Deserialize)]
pub struct SequenceQuery {
    #[serde(default)]
    pub top: Option<usize>,
}

/// Frequent sequence response
#[derive(Debug, Serialize, Deserialize)]
pub struct SequenceListResponse {
    pub sequences: Vec<SequenceItem>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SequenceItem {
    /// "A → B"
    pub label: String,
    pub poses: [YogaPose; 2],
    pub count: usize,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// "healthy" or "unhealthy"
    pub status: String,
    /// Entry store status: "ok" or "error"
    pub store: String,
    /// Store backend name
    pub backend: String,
    pub uptime_seconds: u64,
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hashtags_accept_array_or_text() {
        let req: CreateEntryRequest =
            serde_json::from_str(r#"{"notes": "a", "hashtags": "빈야사, 아침 ,,"}"#).unwrap();
        let entry: NewEntry = req.into();
        assert_eq!(entry.hashtags, vec!["빈야사", "아침"]);

        let req: CreateEntryRequest =
            serde_json::from_str(r#"{"notes": "a", "hashtags": ["yin", " "]}"#).unwrap();
        let entry: NewEntry = req.into();
        assert_eq!(entry.hashtags, vec!["yin"]);
    }

    #[test]
    fn test_update_request_keeps_absent_fields_absent() {
        let req: UpdateEntryRequest = serde_json::from_str(r#"{"isFavorite": true}"#).unwrap();
        let patch: EntryPatch = req.into();
        assert_eq!(patch.is_favorite, Some(true));
        assert!(patch.notes.is_none());
        assert!(patch.hashtags.is_none());
    }

    #[test]
    fn test_day_heat_level() {
        let dto: DayHeatDto = DayHeat {
            day: 3,
            minutes: 45,
            sessions: 1,
            tier: HeatmapTier::for_minutes(45),
        }
        .into();
        assert_eq!(dto.tier, HeatmapTier::Strong);
        assert_eq!(dto.level, 3);
    }
}
