//! Core data types for the practice journal
//!
//! - `JournalEntry`: one practice session as stored
//! - `NewEntry` / `EntryPatch`: what callers submit to create or edit entries
//! - `YogaPose`: a pose snapshot held by an entry
//! - `PhotoEntry` and `PhotoTheme`: photo attachments

use chrono::{DateTime, FixedOffset, Local};
use serde::{Deserialize, Deserializer, Serialize};

use crate::analytics::parse_duration;
use crate::journal::error::{JournalError, JournalResult};
use crate::journal::MAX_PHOTOS;

/// Theme tag a photo can carry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PhotoTheme {
    /// Today's pose
    #[serde(rename = "오늘의 자세")]
    TodaysPose,
    /// Progress comparison
    #[serde(rename = "Before & After")]
    BeforeAfter,
    /// Changes to the practice space
    #[serde(rename = "내 공간의 변화")]
    SpaceChange,
}

impl PhotoTheme {
    pub fn all() -> &'static [PhotoTheme] {
        &[
            PhotoTheme::TodaysPose,
            PhotoTheme::BeforeAfter,
            PhotoTheme::SpaceChange,
        ]
    }

    /// Label used on the wire and in the UI
    pub fn label(&self) -> &'static str {
        match self {
            PhotoTheme::TodaysPose => "오늘의 자세",
            PhotoTheme::BeforeAfter => "Before & After",
            PhotoTheme::SpaceChange => "내 공간의 변화",
        }
    }
}

impl std::fmt::Display for PhotoTheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A photo attached to an entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PhotoEntry {
    /// Public URL (or data URL) of the image
    pub url: String,
    /// Optional theme; an empty string from a cleared form field reads as none
    #[serde(
        default,
        deserialize_with = "blank_theme_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub theme: Option<PhotoTheme>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

impl PhotoEntry {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            theme: None,
            caption: None,
        }
    }

    pub fn theme(mut self, theme: PhotoTheme) -> Self {
        self.theme = Some(theme);
        self
    }

    pub fn caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }
}

fn blank_theme_as_none<'de, D>(deserializer: D) -> Result<Option<PhotoTheme>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(label) => PhotoTheme::all()
            .iter()
            .copied()
            .find(|theme| theme.label() == label)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown photo theme: {}", label))),
    }
}

/// Pose difficulty
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Difficulty::Beginner => write!(f, "Beginner"),
            Difficulty::Intermediate => write!(f, "Intermediate"),
            Difficulty::Advanced => write!(f, "Advanced"),
        }
    }
}

/// A yoga pose (asana)
///
/// Entries hold snapshots of poses taken when they were added, not references
/// into a catalog. Two poses are considered the same pose when their names are
/// equal; nothing else identifies them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct YogaPose {
    pub name: String,
    #[serde(default)]
    pub sanskrit_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub svg_icon: String,
    #[serde(default)]
    pub benefits: Vec<String>,
    #[serde(default)]
    pub contraindications: Vec<String>,
    #[serde(default)]
    pub difficulty: Difficulty,
}

impl YogaPose {
    pub fn new(name: impl Into<String>, sanskrit_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sanskrit_name: sanskrit_name.into(),
            description: String::new(),
            svg_icon: String::new(),
            benefits: Vec::new(),
            contraindications: Vec::new(),
            difficulty: Difficulty::default(),
        }
    }

    /// Builder: set description
    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    /// Builder: set difficulty
    pub fn difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Builder: add a benefit
    pub fn benefit(mut self, benefit: impl Into<String>) -> Self {
        self.benefits.push(benefit.into());
        self
    }

    /// Builder: add a contraindication
    pub fn contraindication(mut self, note: impl Into<String>) -> Self {
        self.contraindications.push(note.into());
        self
    }
}

/// One practice-session record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    /// Assigned at creation, never changes
    pub id: String,
    /// When the session took place
    pub date: DateTime<FixedOffset>,
    #[serde(default)]
    pub photos: Option<Vec<PhotoEntry>>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub hashtags: Option<Vec<String>>,
    /// Practiced poses in practice order
    #[serde(default)]
    pub poses: Option<Vec<YogaPose>>,
    /// Free text such as "60분"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    /// 1-5 rating
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intensity: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_favorite: Option<bool>,
}

impl JournalEntry {
    pub fn photos(&self) -> &[PhotoEntry] {
        self.photos.as_deref().unwrap_or_default()
    }

    pub fn hashtags(&self) -> &[String] {
        self.hashtags.as_deref().unwrap_or_default()
    }

    pub fn poses(&self) -> &[YogaPose] {
        self.poses.as_deref().unwrap_or_default()
    }

    pub fn is_favorite(&self) -> bool {
        self.is_favorite.unwrap_or(false)
    }

    /// Minutes recovered from the free-text duration (0 when unknown)
    pub fn duration_minutes(&self) -> u32 {
        parse_duration(self.duration.as_deref())
    }

    /// Check the entry invariants
    pub fn validate(&self) -> JournalResult<()> {
        let photos = self.photos().len();
        if photos > MAX_PHOTOS {
            return Err(JournalError::TooManyPhotos(photos));
        }
        if let Some(intensity) = self.intensity {
            if !(1..=5).contains(&intensity) {
                return Err(JournalError::IntensityOutOfRange(intensity));
            }
        }
        if self.notes.trim().is_empty() && photos == 0 {
            return Err(JournalError::EmptyEntry);
        }

        let poses = self.poses();
        for (i, pose) in poses.iter().enumerate() {
            if pose.name.trim().is_empty() {
                return Err(JournalError::BlankPoseName);
            }
            if poses[..i].iter().any(|p| p.name == pose.name) {
                return Err(JournalError::DuplicatePose(pose.name.clone()));
            }
        }
        Ok(())
    }

    /// Normalise form leftovers: intensity 0 and blank durations mean "unset"
    pub(crate) fn normalize(mut self) -> Self {
        if self.intensity == Some(0) {
            self.intensity = None;
        }
        if self
            .duration
            .as_deref()
            .map(|d| d.trim().is_empty())
            .unwrap_or(false)
        {
            self.duration = None;
        }
        self
    }
}

/// A new entry as submitted, before it has an id
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEntry {
    /// Session date; defaults to now
    #[serde(default)]
    pub date: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub photos: Vec<PhotoEntry>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default)]
    pub poses: Vec<YogaPose>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub intensity: Option<u8>,
    #[serde(default)]
    pub is_favorite: Option<bool>,
}

impl NewEntry {
    pub fn new(notes: impl Into<String>) -> Self {
        Self {
            notes: notes.into(),
            ..Default::default()
        }
    }

    pub fn date(mut self, date: DateTime<FixedOffset>) -> Self {
        self.date = Some(date);
        self
    }

    pub fn photo(mut self, photo: PhotoEntry) -> Self {
        self.photos.push(photo);
        self
    }

    pub fn hashtag(mut self, tag: impl Into<String>) -> Self {
        self.hashtags.push(tag.into());
        self
    }

    pub fn pose(mut self, pose: YogaPose) -> Self {
        self.poses.push(pose);
        self
    }

    pub fn duration(mut self, duration: impl Into<String>) -> Self {
        self.duration = Some(duration.into());
        self
    }

    pub fn intensity(mut self, intensity: u8) -> Self {
        self.intensity = Some(intensity);
        self
    }

    pub fn favorite(mut self, favorite: bool) -> Self {
        self.is_favorite = Some(favorite);
        self
    }

    /// Turn the submission into a stored entry with the given id
    pub fn into_entry(self, id: impl Into<String>) -> JournalResult<JournalEntry> {
        let entry = JournalEntry {
            id: id.into(),
            date: self.date.unwrap_or_else(|| Local::now().into()),
            photos: Some(self.photos),
            notes: self.notes,
            hashtags: Some(self.hashtags),
            poses: Some(self.poses),
            duration: self.duration,
            intensity: self.intensity,
            is_favorite: self.is_favorite,
        }
        .normalize();
        entry.validate()?;
        Ok(entry)
    }
}

/// Partial update of an entry; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<FixedOffset>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photos: Option<Vec<PhotoEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hashtags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poses: Option<Vec<YogaPose>>,
    /// An empty string clears the duration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    /// 0 clears the intensity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intensity: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_favorite: Option<bool>,
}

impl EntryPatch {
    /// Patch that only flips the favorite flag to `favorite`
    pub fn favorite(favorite: bool) -> Self {
        Self {
            is_favorite: Some(favorite),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.photos.is_none()
            && self.notes.is_none()
            && self.hashtags.is_none()
            && self.poses.is_none()
            && self.duration.is_none()
            && self.intensity.is_none()
            && self.is_favorite.is_none()
    }

    /// Apply the patch to `entry`, returning the validated result
    pub fn apply(self, entry: &JournalEntry) -> JournalResult<JournalEntry> {
        let mut updated = entry.clone();
        if let Some(date) = self.date {
            updated.date = date;
        }
        if let Some(photos) = self.photos {
            updated.photos = Some(photos);
        }
        if let Some(notes) = self.notes {
            updated.notes = notes;
        }
        if let Some(hashtags) = self.hashtags {
            updated.hashtags = Some(hashtags);
        }
        if let Some(poses) = self.poses {
            updated.poses = Some(poses);
        }
        if let Some(duration) = self.duration {
            updated.duration = Some(duration);
        }
        if let Some(intensity) = self.intensity {
            updated.intensity = Some(intensity);
        }
        if let Some(favorite) = self.is_favorite {
            updated.is_favorite = Some(favorite);
        }

        let updated = updated.normalize();
        updated.validate()?;
        Ok(updated)
    }
}

/// Split comma-separated hashtag input into trimmed, non-empty labels
pub fn parse_hashtags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn kst(y: i32, m: u32, d: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(9 * 3600)
            .unwrap()
            .with_ymd_and_hms(y, m, d, 7, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_entry_deserializes_with_missing_collections() {
        let json = r#"{"id": "e1", "date": "2024-08-12T00:00:00.000Z", "notes": "flow"}"#;
        let entry: JournalEntry = serde_json::from_str(json).unwrap();

        assert!(entry.photos.is_none());
        assert!(entry.hashtags().is_empty());
        assert!(entry.poses().is_empty());
        assert!(!entry.is_favorite());
        assert_eq!(entry.duration_minutes(), 0);
    }

    #[test]
    fn test_entry_uses_camel_case_on_the_wire() {
        let entry = NewEntry::new("crow practice")
            .date(kst(2024, 8, 12))
            .pose(YogaPose::new("Crow", "Bakasana").difficulty(Difficulty::Intermediate))
            .favorite(true)
            .into_entry("e1")
            .unwrap();

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["isFavorite"], true);
        assert_eq!(json["poses"][0]["sanskritName"], "Bakasana");
        assert_eq!(json["poses"][0]["difficulty"], "Intermediate");
    }

    #[test]
    fn test_blank_photo_theme_reads_as_none() {
        let photo: PhotoEntry =
            serde_json::from_str(r#"{"url": "https://cdn/a.jpg", "theme": "", "caption": ""}"#)
                .unwrap();
        assert_eq!(photo.theme, None);

        let photo: PhotoEntry =
            serde_json::from_str(r#"{"url": "https://cdn/a.jpg", "theme": "Before & After"}"#)
                .unwrap();
        assert_eq!(photo.theme, Some(PhotoTheme::BeforeAfter));

        assert!(serde_json::from_str::<PhotoEntry>(r#"{"url": "x", "theme": "Sunset"}"#).is_err());
    }

    #[test]
    fn test_validation_rejects_three_photos() {
        let err = NewEntry::new("too many")
            .photo(PhotoEntry::new("a"))
            .photo(PhotoEntry::new("b"))
            .photo(PhotoEntry::new("c"))
            .into_entry("e1")
            .unwrap_err();
        assert_eq!(err, JournalError::TooManyPhotos(3));
    }

    #[test]
    fn test_validation_intensity_range() {
        let err = NewEntry::new("hard").intensity(6).into_entry("e1").unwrap_err();
        assert_eq!(err, JournalError::IntensityOutOfRange(6));

        let entry = NewEntry::new("unrated").intensity(0).into_entry("e1").unwrap();
        assert_eq!(entry.intensity, None);
    }

    #[test]
    fn test_validation_requires_note_or_photo() {
        let err = NewEntry::new("   ").into_entry("e1").unwrap_err();
        assert_eq!(err, JournalError::EmptyEntry);

        let entry = NewEntry::new("")
            .photo(PhotoEntry::new("https://cdn/a.jpg").theme(PhotoTheme::TodaysPose))
            .into_entry("e1")
            .unwrap();
        assert_eq!(entry.photos().len(), 1);
    }

    #[test]
    fn test_validation_rejects_blank_and_repeated_poses() {
        let err = NewEntry::new("flow")
            .pose(YogaPose::new("  ", "Bakasana"))
            .into_entry("e1")
            .unwrap_err();
        assert_eq!(err, JournalError::BlankPoseName);

        let err = NewEntry::new("flow")
            .pose(YogaPose::new("Crow", "Bakasana"))
            .pose(YogaPose::new("Cobra", "Bhujangasana"))
            .pose(YogaPose::new("Crow", ""))
            .into_entry("e1")
            .unwrap_err();
        assert_eq!(err, JournalError::DuplicatePose("Crow".to_string()));

        let entry = NewEntry::new("flow")
            .pose(YogaPose::new("Crow", "Bakasana"))
            .pose(YogaPose::new("crow variation", ""))
            .into_entry("e1")
            .unwrap();
        assert_eq!(entry.poses().len(), 2);
    }

    #[test]
    fn test_normalize_clears_unrated_form_values() {
        let json = r#"{"id": "1722470400000", "date": "2024-08-01T00:00:00.000Z",
            "notes": "morning flow", "duration": " ", "intensity": 0}"#;
        let entry: JournalEntry = serde_json::from_str(json).unwrap();
        assert!(entry.validate().is_err());

        let entry = entry.normalize();
        assert_eq!(entry.intensity, None);
        assert_eq!(entry.duration, None);
        assert!(entry.validate().is_ok());
    }

    #[test]
    fn test_patch_applies_and_clears() {
        let entry = NewEntry::new("morning")
            .date(kst(2024, 8, 1))
            .duration("60분")
            .intensity(3)
            .into_entry("e1")
            .unwrap();

        let patch = EntryPatch {
            duration: Some(String::new()),
            intensity: Some(0),
            notes: Some("evening".into()),
            ..Default::default()
        };
        let updated = patch.apply(&entry).unwrap();

        assert_eq!(updated.id, "e1");
        assert_eq!(updated.notes, "evening");
        assert_eq!(updated.duration, None);
        assert_eq!(updated.intensity, None);
        assert_eq!(updated.date, entry.date);
    }

    #[test]
    fn test_patch_validates_merged_entry() {
        let entry = NewEntry::new("note").into_entry("e1").unwrap();
        let patch = EntryPatch {
            notes: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(patch.apply(&entry).unwrap_err(), JournalError::EmptyEntry);
    }

    #[test]
    fn test_parse_hashtags() {
        assert_eq!(
            parse_hashtags("암밸런스, 근력강화,, 빈야사 "),
            vec!["암밸런스", "근력강화", "빈야사"]
        );
        assert!(parse_hashtags("  ").is_empty());
    }
}
