//! Per-feature derivations and the whole-row [`compute`] entry point.

use bothunt_core::{AccountSnapshot, Cell, Feature, FeatureRow, TweetRecord};
use chrono::{DateTime, Utc};

use crate::histogram::{AverageMode, TweetHistogram};

/// Profile image URL the platform assigns to accounts that never set one.
pub const DEFAULT_PROFILE_IMAGE_URL: &str =
    "http://abs.twimg.com/sticky/default_profile_images/default_profile_normal.png";

#[must_use]
pub fn is_protected(snapshot: Option<&AccountSnapshot>) -> Option<bool> {
    snapshot.map(|s| s.protected)
}

#[must_use]
pub fn is_verified(snapshot: Option<&AccountSnapshot>) -> Option<bool> {
    snapshot.map(|s| s.verified)
}

/// Exact, case-sensitive comparison against [`DEFAULT_PROFILE_IMAGE_URL`].
#[must_use]
pub fn has_default_image(snapshot: Option<&AccountSnapshot>) -> Option<bool> {
    snapshot.map(|s| s.profile_image_url == DEFAULT_PROFILE_IMAGE_URL)
}

#[must_use]
pub fn bio_is_empty(snapshot: Option<&AccountSnapshot>) -> Option<bool> {
    snapshot.map(|s| s.description.is_empty())
}

/// Friends divided by followers; `None` when the account has no followers.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn friends_followers_ratio(snapshot: Option<&AccountSnapshot>) -> Option<f64> {
    let s = snapshot?;
    if s.followers_count == 0 {
        return None;
    }
    Some(s.friends_count as f64 / s.followers_count as f64)
}

/// Whole days elapsed between account creation and `now`.
#[must_use]
pub fn time_of_existence(snapshot: Option<&AccountSnapshot>, now: DateTime<Utc>) -> Option<i64> {
    snapshot.map(|s| (now - s.created_at).num_days())
}

#[must_use]
pub fn average_daily_tweets(
    snapshot: Option<&AccountSnapshot>,
    tweets: Option<&[TweetRecord]>,
    now: DateTime<Utc>,
    mode: AverageMode,
) -> Option<f64> {
    TweetHistogram::build(snapshot, tweets?, now.date_naive())?.average(mode)
}

#[must_use]
pub fn inactive_days(
    snapshot: Option<&AccountSnapshot>,
    tweets: Option<&[TweetRecord]>,
    now: DateTime<Utc>,
) -> Option<i64> {
    let histogram = TweetHistogram::build(snapshot, tweets?, now.date_naive())?;
    i64::try_from(histogram.inactive_days()).ok()
}

/// Computes a single feature cell.
///
/// The dataset's `average_daily_tweets` column always uses
/// [`AverageMode::All`].
#[must_use]
pub fn compute_feature(
    feature: Feature,
    snapshot: Option<&AccountSnapshot>,
    tweets: Option<&[TweetRecord]>,
    now: DateTime<Utc>,
) -> Cell {
    match feature {
        Feature::IsProtected => is_protected(snapshot).into(),
        Feature::TimeOfExistence => time_of_existence(snapshot, now).into(),
        Feature::AverageDailyTweets => {
            average_daily_tweets(snapshot, tweets, now, AverageMode::All).into()
        }
        Feature::InactiveDays => inactive_days(snapshot, tweets, now).into(),
        Feature::HasDefaultImage => has_default_image(snapshot).into(),
        Feature::BioIsEmpty => bio_is_empty(snapshot).into(),
        Feature::FriendsFollowersRatio => friends_followers_ratio(snapshot).into(),
        Feature::IsVerified => is_verified(snapshot).into(),
    }
}

/// Computes every feature for one account.
#[must_use]
pub fn compute(
    snapshot: Option<&AccountSnapshot>,
    tweets: Option<&[TweetRecord]>,
    now: DateTime<Utc>,
) -> FeatureRow {
    let mut row = FeatureRow::empty();
    for feature in Feature::ALL {
        row.set(feature, compute_feature(feature, snapshot, tweets, now));
    }
    row
}

#[cfg(test)]
mod tests {
    use bothunt_core::FeatureValue;
    use chrono::{Duration, TimeZone};

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 11, 12, 0, 0).unwrap()
    }

    fn snapshot() -> AccountSnapshot {
        AccountSnapshot {
            id: 42,
            screen_name: "example".to_owned(),
            protected: false,
            verified: false,
            geo_enabled: false,
            created_at: now() - Duration::days(10),
            followers_count: 4,
            friends_count: 10,
            profile_image_url: "http://pbs.twimg.com/profile_images/1/me_normal.jpg".to_owned(),
            description: "coffee, code".to_owned(),
        }
    }

    fn tweets_on(day: u32, count: u64, first_id: u64) -> Vec<TweetRecord> {
        (0..count)
            .map(|i| TweetRecord {
                id: first_id + i,
                created_at: Utc.with_ymd_and_hms(2024, 5, day, 8, 0, 0).unwrap(),
                text: "gm".to_owned(),
            })
            .collect()
    }

    #[test]
    fn zero_followers_ratio_is_null_regardless_of_friends() {
        for friends in [0, 1, 5_000] {
            let mut s = snapshot();
            s.followers_count = 0;
            s.friends_count = friends;
            assert_eq!(friends_followers_ratio(Some(&s)), None);
        }
    }

    #[test]
    fn ratio_is_friends_over_followers() {
        assert_eq!(friends_followers_ratio(Some(&snapshot())), Some(2.5));
    }

    #[test]
    fn default_image_requires_exact_match() {
        let mut s = snapshot();
        s.profile_image_url = DEFAULT_PROFILE_IMAGE_URL.to_owned();
        assert_eq!(has_default_image(Some(&s)), Some(true));

        s.profile_image_url = DEFAULT_PROFILE_IMAGE_URL.to_uppercase();
        assert_eq!(has_default_image(Some(&s)), Some(false));

        s.profile_image_url = DEFAULT_PROFILE_IMAGE_URL.replace("http://", "https://");
        assert_eq!(has_default_image(Some(&s)), Some(false));
    }

    #[test]
    fn bio_is_empty_only_for_empty_string() {
        let mut s = snapshot();
        assert_eq!(bio_is_empty(Some(&s)), Some(false));
        s.description = String::new();
        assert_eq!(bio_is_empty(Some(&s)), Some(true));
        s.description = " ".to_owned();
        assert_eq!(bio_is_empty(Some(&s)), Some(false));
    }

    #[test]
    fn absent_snapshot_yields_null_snapshot_features() {
        let row = compute(None, None, now());
        for (feature, cell) in row.iter() {
            assert_eq!(cell, Cell::Null, "{feature} should be null");
        }
    }

    #[test]
    fn absent_tweets_yield_null_cadence_features() {
        let s = snapshot();
        assert_eq!(
            average_daily_tweets(Some(&s), None, now(), AverageMode::All),
            None
        );
        assert_eq!(inactive_days(Some(&s), None, now()), None);
    }

    #[test]
    fn ten_day_old_account_with_two_active_days() {
        let s = snapshot();
        let mut tweets = tweets_on(7, 3, 100);
        tweets.extend(tweets_on(3, 2, 10));

        assert_eq!(time_of_existence(Some(&s), now()), Some(10));
        let all = average_daily_tweets(Some(&s), Some(&tweets), now(), AverageMode::All).unwrap();
        let active =
            average_daily_tweets(Some(&s), Some(&tweets), now(), AverageMode::Active).unwrap();
        assert!((all - 5.0 / 11.0).abs() < 1e-12);
        assert!((active - 2.5).abs() < 1e-12);
        assert_eq!(inactive_days(Some(&s), Some(&tweets), now()), Some(9));
    }

    #[test]
    fn compute_fills_every_column() {
        let s = snapshot();
        let tweets = tweets_on(3, 2, 10);
        let row = compute(Some(&s), Some(&tweets), now());
        assert!(row.is_fully_populated());
        assert_eq!(
            row.get(Feature::IsProtected),
            Cell::Value(FeatureValue::Bool(false))
        );
        assert_eq!(
            row.get(Feature::TimeOfExistence),
            Cell::Value(FeatureValue::Int(10))
        );
        assert_eq!(
            row.get(Feature::InactiveDays),
            Cell::Value(FeatureValue::Int(10))
        );
        assert_eq!(
            row.get(Feature::FriendsFollowersRatio),
            Cell::Value(FeatureValue::Float(2.5))
        );
    }

    #[test]
    fn time_of_existence_truncates_partial_days() {
        let mut s = snapshot();
        s.created_at = now() - Duration::hours(47);
        assert_eq!(time_of_existence(Some(&s), now()), Some(1));
    }
}
