//! Twitter v1.1 response types.
//!
//! Only the fields feature extraction reads are modelled; everything else in
//! the payload is ignored.

use bothunt_core::{AccountSnapshot, TweetRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

/// Timestamp layout v1.1 uses everywhere, e.g. `Wed Oct 10 20:19:24 +0000 2018`.
pub const CREATED_AT_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

/// `users/show` payload.
#[derive(Debug, Deserialize)]
pub struct ApiUser {
    pub id: u64,
    pub screen_name: String,
    #[serde(default)]
    pub protected: bool,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub geo_enabled: bool,
    #[serde(deserialize_with = "deserialize_created_at")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub followers_count: u64,
    #[serde(default)]
    pub friends_count: u64,
    #[serde(default)]
    pub profile_image_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl From<ApiUser> for AccountSnapshot {
    fn from(user: ApiUser) -> Self {
        AccountSnapshot {
            id: user.id,
            screen_name: user.screen_name,
            protected: user.protected,
            verified: user.verified,
            geo_enabled: user.geo_enabled,
            created_at: user.created_at,
            followers_count: user.followers_count,
            friends_count: user.friends_count,
            profile_image_url: user.profile_image_url.unwrap_or_default(),
            description: user.description.unwrap_or_default(),
        }
    }
}

/// One entry of a `statuses/user_timeline` page.
#[derive(Debug, Deserialize)]
pub struct ApiTweet {
    pub id: u64,
    #[serde(deserialize_with = "deserialize_created_at")]
    pub created_at: DateTime<Utc>,
    /// `full_text` in extended mode, `text` otherwise.
    #[serde(alias = "full_text", default)]
    pub text: String,
}

impl From<ApiTweet> for TweetRecord {
    fn from(tweet: ApiTweet) -> Self {
        TweetRecord {
            id: tweet.id,
            created_at: tweet.created_at,
            text: tweet.text,
        }
    }
}

/// Error envelope: `{"errors": [{"code": 63, "message": "..."}]}`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub errors: Vec<ApiErrorEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorEntry {
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

fn deserialize_created_at<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    DateTime::parse_from_str(&raw, CREATED_AT_FORMAT)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn deserialize_user_with_nulls() {
        let json = r#"{
            "id": 783214,
            "id_str": "783214",
            "screen_name": "Twitter",
            "protected": false,
            "verified": true,
            "created_at": "Tue Feb 20 14:35:54 +0000 2007",
            "followers_count": 100,
            "friends_count": 3,
            "profile_image_url": null,
            "description": null,
            "statuses_count": 15000
        }"#;
        let user: ApiUser = serde_json::from_str(json).unwrap();
        assert_eq!(
            user.created_at,
            Utc.with_ymd_and_hms(2007, 2, 20, 14, 35, 54).unwrap()
        );
        let snapshot = AccountSnapshot::from(user);
        assert!(snapshot.verified);
        assert!(!snapshot.geo_enabled);
        assert_eq!(snapshot.description, "");
        assert_eq!(snapshot.profile_image_url, "");
    }

    #[test]
    fn created_at_offset_is_normalised_to_utc() {
        let json = r#"{"id": 1, "created_at": "Wed Oct 10 22:19:24 +0200 2018", "text": "hi"}"#;
        let tweet: ApiTweet = serde_json::from_str(json).unwrap();
        assert_eq!(
            tweet.created_at,
            Utc.with_ymd_and_hms(2018, 10, 10, 20, 19, 24).unwrap()
        );
    }

    #[test]
    fn extended_tweets_use_full_text() {
        let json = r#"{"id": 2, "created_at": "Wed Oct 10 20:19:24 +0000 2018", "full_text": "long form"}"#;
        let tweet: ApiTweet = serde_json::from_str(json).unwrap();
        assert_eq!(tweet.text, "long form");
    }

    #[test]
    fn bad_timestamp_is_rejected() {
        let json = r#"{"id": 3, "created_at": "2018-10-10T20:19:24Z", "text": "iso"}"#;
        assert!(serde_json::from_str::<ApiTweet>(json).is_err());
    }

    #[test]
    fn error_body_codes() {
        let body: ApiErrorBody =
            serde_json::from_str(r#"{"errors":[{"code":63,"message":"User has been suspended."}]}"#)
                .unwrap();
        assert_eq!(body.errors[0].code, 63);
        assert_eq!(body.errors[0].message, "User has been suspended.");
    }
}
