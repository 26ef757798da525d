//! Core domain types for the novena tracker.
//!
//! This module defines the fundamental types used throughout the system:
//! - Novena calendar values (phase, mystery, cycle)
//! - Prayer types, bead sequences and step/bead mappings
//! - Liturgical feasts and novena recommendations
//! - Progress history of prayed novena days

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Novena Calendar Types
// ============================================================================

/// Half of the 54-day novena a day falls in
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Petition,
    Thanksgiving,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Petition => write!(f, "petition"),
            Phase::Thanksgiving => write!(f, "thanksgiving"),
        }
    }
}

/// Set of rosary mysteries meditated during a rosary
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Mystery {
    Joyful,
    Sorrowful,
    Glorious,
    Luminous,
}

impl Mystery {
    pub fn name(&self) -> &'static str {
        match self {
            Mystery::Joyful => "Joyful",
            Mystery::Sorrowful => "Sorrowful",
            Mystery::Glorious => "Glorious",
            Mystery::Luminous => "Luminous",
        }
    }
}

impl fmt::Display for Mystery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mystery {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "joyful" => Ok(Mystery::Joyful),
            "sorrowful" => Ok(Mystery::Sorrowful),
            "glorious" => Ok(Mystery::Glorious),
            "luminous" => Ok(Mystery::Luminous),
            other => Err(crate::Error::Other(format!("unknown mystery: {}", other))),
        }
    }
}

/// Derived position of a day within the 54-day novena
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CycleInfo {
    pub phase: Phase,
    pub cycle: u32,
    pub mystery: Mystery,
}

// ============================================================================
// Prayer and Bead Types
// ============================================================================

/// Chaplets with a bead layout in the catalog
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChapletType {
    DivineMercy,
    SevenSorrows,
    StMichael,
    SacredHeart,
    InfantOfPrague,
    HolySpirit,
    HolyFace,
    PreciousBlood,
    StJoseph,
}

impl ChapletType {
    pub const ALL: [ChapletType; 9] = [
        ChapletType::DivineMercy,
        ChapletType::SevenSorrows,
        ChapletType::StMichael,
        ChapletType::SacredHeart,
        ChapletType::InfantOfPrague,
        ChapletType::HolySpirit,
        ChapletType::HolyFace,
        ChapletType::PreciousBlood,
        ChapletType::StJoseph,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            ChapletType::DivineMercy => "divine-mercy",
            ChapletType::SevenSorrows => "seven-sorrows",
            ChapletType::StMichael => "st-michael",
            ChapletType::SacredHeart => "sacred-heart",
            ChapletType::InfantOfPrague => "infant-of-prague",
            ChapletType::HolySpirit => "holy-spirit",
            ChapletType::HolyFace => "holy-face",
            ChapletType::PreciousBlood => "precious-blood",
            ChapletType::StJoseph => "st-joseph",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ChapletType::DivineMercy => "Chaplet of Divine Mercy",
            ChapletType::SevenSorrows => "Chaplet of the Seven Sorrows",
            ChapletType::StMichael => "Chaplet of St. Michael",
            ChapletType::SacredHeart => "Chaplet of the Sacred Heart",
            ChapletType::InfantOfPrague => "Chaplet of the Infant of Prague",
            ChapletType::HolySpirit => "Chaplet of the Holy Spirit",
            ChapletType::HolyFace => "Chaplet of the Holy Face",
            ChapletType::PreciousBlood => "Chaplet of the Precious Blood",
            ChapletType::StJoseph => "Chaplet of St. Joseph",
        }
    }
}

/// Kind of guided prayer flow
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PrayerType {
    DailyRosary,
    FiftyFourDayNovena,
    Chaplet(ChapletType),
}

impl PrayerType {
    pub fn slug(&self) -> &'static str {
        match self {
            PrayerType::DailyRosary => "daily-rosary",
            PrayerType::FiftyFourDayNovena => "54-day-novena",
            PrayerType::Chaplet(chaplet) => chaplet.slug(),
        }
    }

    /// Every prayer type known to the catalog
    pub fn all() -> Vec<PrayerType> {
        let mut all = vec![PrayerType::DailyRosary, PrayerType::FiftyFourDayNovena];
        all.extend(ChapletType::ALL.iter().copied().map(PrayerType::Chaplet));
        all
    }
}

impl fmt::Display for PrayerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for PrayerType {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        match normalized.as_str() {
            "daily-rosary" | "rosary" => Ok(PrayerType::DailyRosary),
            "54-day-novena" | "novena" => Ok(PrayerType::FiftyFourDayNovena),
            other => ChapletType::ALL
                .iter()
                .find(|c| c.slug() == other)
                .map(|c| PrayerType::Chaplet(*c))
                .ok_or_else(|| crate::Error::UnknownPrayerType(s.to_string())),
        }
    }
}

impl TryFrom<String> for PrayerType {
    type Error = crate::Error;

    fn try_from(value: String) -> crate::Result<Self> {
        value.parse()
    }
}

impl From<PrayerType> for String {
    fn from(value: PrayerType) -> Self {
        value.slug().to_string()
    }
}

/// Physical kind of a bead position
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum BeadType {
    Cross,
    LargeBead,
    SmallBead,
    Medal,
}

/// One position in a bead sequence
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Bead {
    pub id: String,
    pub bead_type: BeadType,
    pub prayers: Vec<String>,
    pub position: usize,
    pub label: Option<String>,
}

/// Bead layout for one prayer type
#[derive(Clone, Debug, Serialize)]
pub struct RosaryConfig {
    pub prayer_type: PrayerType,
    pub bead_sequence: Vec<Bead>,
    pub total_beads: usize,
    pub name: String,
}

/// Relation entry between a guided prayer step and a bead
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct PrayerStepMapping {
    pub step_index: usize,
    pub bead_index: usize,
    pub step_id: String,
    pub bead_id: String,
    pub description: String,
}

/// A single screen of guided prayer text
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct PrayerStep {
    pub id: String,
    pub title: String,
    pub text: String,
}

// ============================================================================
// Liturgical Calendar Types
// ============================================================================

/// Liturgical rank of a celebration
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeastRank {
    Solemnity,
    Feast,
    Memorial,
    OptionalMemorial,
}

impl FeastRank {
    /// Parse a provider rank string; unrecognised ranks yield None
    pub fn parse(rank: &str) -> Option<Self> {
        match rank.trim().to_uppercase().replace(' ', "_").as_str() {
            "SOLEMNITY" => Some(FeastRank::Solemnity),
            "FEAST" => Some(FeastRank::Feast),
            "MEMORIAL" => Some(FeastRank::Memorial),
            "OPTIONAL_MEMORIAL" => Some(FeastRank::OptionalMemorial),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FeastRank::Solemnity => "SOLEMNITY",
            FeastRank::Feast => "FEAST",
            FeastRank::Memorial => "MEMORIAL",
            FeastRank::OptionalMemorial => "OPTIONAL_MEMORIAL",
        }
    }
}

/// Heuristic classification of a feast
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FeastType {
    Marian,
    Saint,
    General,
    Seasonal,
}

/// A celebration as reported by a calendar provider
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Celebration {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub rank: String,
}

/// Provider calendar: `YYYY-MM-DD` date string to celebrations on that date
pub type ProviderCalendar = BTreeMap<String, Vec<Celebration>>;

/// A significant feast retained for recommendation purposes
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LiturgicalFeast {
    pub id: String,
    pub name: String,
    pub date: NaiveDate,
    pub rank: FeastRank,
    pub feast_type: FeastType,
    pub associated_novena: Option<String>,
    pub priority: u8,
    pub triggers_long_novena: bool,
}

// ============================================================================
// Recommendation Types
// ============================================================================

/// Length of a novena
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum NovenaDuration {
    #[serde(rename = "9-day")]
    NineDay,
    #[serde(rename = "54-day")]
    FiftyFourDay,
}

impl NovenaDuration {
    pub fn days(&self) -> i64 {
        match self {
            NovenaDuration::NineDay => 9,
            NovenaDuration::FiftyFourDay => 54,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NovenaDuration::NineDay => "9-day",
            NovenaDuration::FiftyFourDay => "54-day",
        }
    }
}

impl fmt::Display for NovenaDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Devotional category of a feast-to-novena mapping
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NovenaCategory {
    Marian,
    Saint,
    Christ,
    HolySpirit,
    Seasonal,
}

impl NovenaCategory {
    pub const ALL: [NovenaCategory; 5] = [
        NovenaCategory::Marian,
        NovenaCategory::Saint,
        NovenaCategory::Christ,
        NovenaCategory::HolySpirit,
        NovenaCategory::Seasonal,
    ];
}

/// Static link between a feast and the novena that leads up to it
#[derive(Clone, Debug, Serialize)]
pub struct FeastNovenaMapping {
    pub feast_id: &'static str,
    pub feast_name: &'static str,
    pub novena_type: &'static str,
    pub duration_type: NovenaDuration,
    pub priority: u8,
    pub category: NovenaCategory,
    pub message_template: Option<&'static str>,
}

/// How soon a recommended novena must begin
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    High,
    Medium,
    Low,
}

/// A computed suggestion to start a novena ending on a feast
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct NovenaRecommendation {
    pub kind: NovenaDuration,
    pub target_feast: LiturgicalFeast,
    pub start_date: NaiveDate,
    pub days_until_start: i64,
    pub message: String,
    pub novena_type: Option<String>,
    pub urgency: Urgency,
    pub id: String,
}

/// Caller-owned state consulted when recommending novenas
#[derive(Clone, Debug, Default)]
pub struct RecommendationRequest {
    pub active_novenas: Vec<String>,
    pub has_54_day_active: bool,
    pub dismissed: HashSet<String>,
}

// ============================================================================
// Progress Types
// ============================================================================

/// One prayed day of the 54-day novena, as shown in the progress history
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct DayRecord {
    pub day: u32,
    pub phase: Phase,
    pub mystery: Mystery,
    /// Missing for days recorded before dates were kept
    pub prayed_on: Option<NaiveDate>,
}
