//! The fixed feature catalogue and the per-cell fill model.
//!
//! Every dataset row carries exactly one [`Cell`] per [`Feature`], stored in
//! the order of [`Feature::ALL`]. That order is also the column order the
//! classifier is trained on.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One derived per-account feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    IsProtected,
    TimeOfExistence,
    AverageDailyTweets,
    InactiveDays,
    HasDefaultImage,
    BioIsEmpty,
    FriendsFollowersRatio,
    IsVerified,
}

/// Primitive type a feature's populated cell holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Bool,
    Int,
    Float,
}

/// What must be fetched before a feature can be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureDependency {
    Snapshot,
    Timeline,
}

impl Feature {
    /// Stable column order shared by the dataset file and the classifier.
    pub const ALL: [Feature; 8] = [
        Feature::IsProtected,
        Feature::TimeOfExistence,
        Feature::AverageDailyTweets,
        Feature::InactiveDays,
        Feature::HasDefaultImage,
        Feature::BioIsEmpty,
        Feature::FriendsFollowersRatio,
        Feature::IsVerified,
    ];

    pub const COUNT: usize = Self::ALL.len();

    #[must_use]
    pub fn column_name(self) -> &'static str {
        match self {
            Feature::IsProtected => "is_protected",
            Feature::TimeOfExistence => "time_of_existence",
            Feature::AverageDailyTweets => "average_daily_tweets",
            Feature::InactiveDays => "inactive_days",
            Feature::HasDefaultImage => "has_default_image",
            Feature::BioIsEmpty => "bio_is_empty",
            Feature::FriendsFollowersRatio => "friends_followers_ratio",
            Feature::IsVerified => "is_verified",
        }
    }

    #[must_use]
    pub fn from_column_name(name: &str) -> Option<Feature> {
        Self::ALL.into_iter().find(|f| f.column_name() == name)
    }

    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn kind(self) -> ValueKind {
        match self {
            Feature::IsProtected
            | Feature::HasDefaultImage
            | Feature::BioIsEmpty
            | Feature::IsVerified => ValueKind::Bool,
            Feature::TimeOfExistence | Feature::InactiveDays => ValueKind::Int,
            Feature::AverageDailyTweets | Feature::FriendsFollowersRatio => ValueKind::Float,
        }
    }

    #[must_use]
    pub fn dependency(self) -> FeatureDependency {
        match self {
            Feature::AverageDailyTweets | Feature::InactiveDays => FeatureDependency::Timeline,
            _ => FeatureDependency::Snapshot,
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// A populated cell's value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeatureValue {
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl FeatureValue {
    /// Numeric view used by the classifier; booleans map to `0.0` / `1.0`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(self) -> f64 {
        match self {
            FeatureValue::Bool(b) => f64::from(u8::from(b)),
            FeatureValue::Int(i) => i as f64,
            FeatureValue::Float(x) => x,
        }
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Bool(b) => write!(f, "{b}"),
            FeatureValue::Int(i) => write!(f, "{i}"),
            FeatureValue::Float(x) => write!(f, "{x}"),
        }
    }
}

/// Fill state of one feature cell.
///
/// `Empty` means nothing has been computed yet. `Null` means the value was
/// computed and is undefined (zero followers, no tweet list); it counts as
/// populated and is never recomputed unless cleared.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Null,
    Value(FeatureValue),
}

impl Cell {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    #[must_use]
    pub fn is_populated(&self) -> bool {
        !self.is_empty()
    }

    #[must_use]
    pub fn value(&self) -> Option<FeatureValue> {
        match self {
            Cell::Value(v) => Some(*v),
            Cell::Empty | Cell::Null => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Cell::Value(FeatureValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }
}

impl From<Option<bool>> for Cell {
    fn from(v: Option<bool>) -> Self {
        v.map_or(Cell::Null, |b| Cell::Value(FeatureValue::Bool(b)))
    }
}

impl From<Option<i64>> for Cell {
    fn from(v: Option<i64>) -> Self {
        v.map_or(Cell::Null, |i| Cell::Value(FeatureValue::Int(i)))
    }
}

impl From<Option<f64>> for Cell {
    fn from(v: Option<f64>) -> Self {
        v.map_or(Cell::Null, |x| Cell::Value(FeatureValue::Float(x)))
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => f.write_str("<empty>"),
            Cell::Null => f.write_str("null"),
            Cell::Value(v) => write!(f, "{v}"),
        }
    }
}

/// One account's derived feature vector with fill state per cell.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FeatureRow {
    cells: [Cell; Feature::COUNT],
}

impl FeatureRow {
    /// A row with every cell `Empty`.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, feature: Feature) -> Cell {
        self.cells[feature.index()]
    }

    pub fn set(&mut self, feature: Feature, cell: Cell) {
        self.cells[feature.index()] = cell;
    }

    /// Iterate `(feature, cell)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (Feature, Cell)> + '_ {
        Feature::ALL.into_iter().map(|f| (f, self.get(f)))
    }

    #[must_use]
    pub fn is_fully_populated(&self) -> bool {
        self.cells.iter().all(Cell::is_populated)
    }

    #[must_use]
    pub fn empty_features(&self) -> Vec<Feature> {
        self.iter()
            .filter(|(_, c)| c.is_empty())
            .map(|(f, _)| f)
            .collect()
    }
}

/// Ground-truth / predicted account class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BotClass {
    Human,
    TraditionalBot,
    SocialBot,
}

impl BotClass {
    pub const ALL: [BotClass; 3] = [BotClass::Human, BotClass::TraditionalBot, BotClass::SocialBot];

    /// Integer label used in the dataset's `result` column and by the model.
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            BotClass::Human => 0,
            BotClass::TraditionalBot => 1,
            BotClass::SocialBot => 2,
        }
    }

    #[must_use]
    pub fn from_code(code: i32) -> Option<BotClass> {
        match code {
            0 => Some(BotClass::Human),
            1 => Some(BotClass::TraditionalBot),
            2 => Some(BotClass::SocialBot),
            _ => None,
        }
    }
}

impl fmt::Display for BotClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BotClass::Human => write!(f, "Human"),
            BotClass::TraditionalBot => write!(f, "Traditional Bot"),
            BotClass::SocialBot => write!(f, "Social Bot"),
        }
    }
}
