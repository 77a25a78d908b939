//! Heatmap tiers for the practice calendar

use serde::{Deserialize, Serialize};

/// Color bucket for a calendar day, from lightest to darkest
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum HeatmapTier {
    /// No practice minutes
    Empty,
    /// (0, 20] minutes
    Light,
    /// (20, 40] minutes
    Medium,
    /// (40, 60] minutes
    Strong,
    /// More than 60 minutes
    Intense,
}

impl HeatmapTier {
    /// Tier for a day's total minutes; lower bounds are exclusive
    pub fn for_minutes(minutes: u32) -> Self {
        match minutes {
            m if m > 60 => HeatmapTier::Intense,
            m if m > 40 => HeatmapTier::Strong,
            m if m > 20 => HeatmapTier::Medium,
            m if m > 0 => HeatmapTier::Light,
            _ => HeatmapTier::Empty,
        }
    }

    /// 0 (lightest) to 4 (darkest)
    pub fn level(&self) -> u8 {
        *self as u8
    }

    /// Single-character shade for text renderings
    pub fn shade(&self) -> char {
        match self {
            HeatmapTier::Empty => '·',
            HeatmapTier::Light => '░',
            HeatmapTier::Medium => '▒',
            HeatmapTier::Strong => '▓',
            HeatmapTier::Intense => '█',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(HeatmapTier::for_minutes(0), HeatmapTier::Empty);
        assert_eq!(HeatmapTier::for_minutes(1), HeatmapTier::Light);
        assert_eq!(HeatmapTier::for_minutes(20), HeatmapTier::Light);
        assert_eq!(HeatmapTier::for_minutes(21), HeatmapTier::Medium);
        assert_eq!(HeatmapTier::for_minutes(40), HeatmapTier::Medium);
        assert_eq!(HeatmapTier::for_minutes(41), HeatmapTier::Strong);
        assert_eq!(HeatmapTier::for_minutes(60), HeatmapTier::Strong);
        assert_eq!(HeatmapTier::for_minutes(61), HeatmapTier::Intense);
    }

    #[test]
    fn test_tier_levels_are_ordered() {
        assert_eq!(HeatmapTier::Empty.level(), 0);
        assert_eq!(HeatmapTier::Intense.level(), 4);
        assert!(HeatmapTier::Light < HeatmapTier::Medium);
    }
}
