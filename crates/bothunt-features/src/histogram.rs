//! Day-indexed tweet histogram backing the cadence features.

use std::str::FromStr;

use bothunt_core::{AccountSnapshot, TweetRecord};
use chrono::NaiveDate;
use thiserror::Error;

/// Which days the average tweet rate is taken over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AverageMode {
    /// Every calendar day in the span.
    #[default]
    All,
    /// Only days with at least one tweet.
    Active,
}

#[derive(Debug, Error)]
#[error("unknown average mode '{0}' (expected 'all' or 'active')")]
pub struct UnknownAverageMode(String);

impl FromStr for AverageMode {
    type Err = UnknownAverageMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(AverageMode::All),
            "active" => Ok(AverageMode::Active),
            other => Err(UnknownAverageMode(other.to_owned())),
        }
    }
}

/// Tweet counts for every calendar day from a start date through "today"
/// inclusive.
///
/// The span starts at the account's creation date, or at the earliest tweet
/// when no snapshot is available. Tweets dated outside the span are not
/// counted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TweetHistogram {
    start: NaiveDate,
    counts: Vec<u32>,
}

impl TweetHistogram {
    /// Builds the histogram, or `None` when there is no start date (no
    /// snapshot and no tweets) or the start lies after `today`.
    #[must_use]
    pub fn build(
        snapshot: Option<&AccountSnapshot>,
        tweets: &[TweetRecord],
        today: NaiveDate,
    ) -> Option<Self> {
        let start = match snapshot {
            Some(s) => s.creation_date(),
            None => tweets.iter().map(TweetRecord::date).min()?,
        };

        let span = usize::try_from((today - start).num_days() + 1).ok()?;
        if span == 0 {
            return None;
        }

        let mut counts = vec![0u32; span];
        let mut outside = 0usize;
        for tweet in tweets {
            let bucket = usize::try_from((tweet.date() - start).num_days())
                .ok()
                .and_then(|offset| counts.get_mut(offset));
            match bucket {
                Some(count) => *count += 1,
                None => outside += 1,
            }
        }
        if outside > 0 {
            tracing::debug!(outside, %start, %today, "tweets outside histogram span ignored");
        }

        Some(Self { start, counts })
    }

    #[must_use]
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Number of calendar days in the span, both ends included.
    #[must_use]
    pub fn total_days(&self) -> usize {
        self.counts.len()
    }

    #[must_use]
    pub fn active_days(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    #[must_use]
    pub fn inactive_days(&self) -> usize {
        self.counts.iter().filter(|&&c| c == 0).count()
    }

    #[must_use]
    pub fn total_tweets(&self) -> u64 {
        self.counts.iter().map(|&c| u64::from(c)).sum()
    }

    /// Count for a specific date, `None` outside the span.
    #[must_use]
    pub fn count_on(&self, date: NaiveDate) -> Option<u32> {
        let offset = usize::try_from((date - self.start).num_days()).ok()?;
        self.counts.get(offset).copied()
    }

    /// Average tweets per day; `None` in `Active` mode when no day has a tweet.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn average(&self, mode: AverageMode) -> Option<f64> {
        let days = match mode {
            AverageMode::All => self.total_days(),
            AverageMode::Active => self.active_days(),
        };
        if days == 0 {
            return None;
        }
        Some(self.total_tweets() as f64 / days as f64)
    }
}
