use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Numeric Twitter user id.
pub type AccountId = u64;

/// Point-in-time view of an account's public profile.
///
/// Fetched at most once per fill attempt and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub id: AccountId,
    pub screen_name: String,
    pub protected: bool,
    pub verified: bool,
    pub geo_enabled: bool,
    pub created_at: DateTime<Utc>,
    pub followers_count: u64,
    pub friends_count: u64,
    pub profile_image_url: String,
    pub description: String,
}

impl AccountSnapshot {
    /// Calendar date (UTC) the account was created on.
    #[must_use]
    pub fn creation_date(&self) -> NaiveDate {
        self.created_at.date_naive()
    }
}

/// A single tweet as returned by a timeline page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TweetRecord {
    pub id: u64,
    pub created_at: DateTime<Utc>,
    pub text: String,
}

impl TweetRecord {
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.created_at.date_naive()
    }
}
