//! Fills the empty cells of one dataset row from an [`AccountProvider`].

use bothunt_core::{
    AccountId, AccountProvider, AccountSnapshot, Cell, Feature, FeatureDependency, FetchError,
    TweetRecord,
};
use bothunt_features::compute_feature;
use chrono::{DateTime, Utc};

use crate::dataset::Dataset;
use crate::error::DatasetError;

/// How a row attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    /// No cell is left empty.
    Complete,
    /// Cells remain empty without a fetch failure; a protected account's
    /// timeline features are never fetched.
    Partial,
    /// The account lookup failed, so nothing could be computed.
    SnapshotUnavailable(FetchError),
    /// The snapshot was fetched but the timeline was not.
    TimelineUnavailable(FetchError),
}

impl RowOutcome {
    /// The fetch failure behind this outcome, if any.
    #[must_use]
    pub fn error(&self) -> Option<&FetchError> {
        match self {
            RowOutcome::SnapshotUnavailable(e) | RowOutcome::TimelineUnavailable(e) => Some(e),
            RowOutcome::Complete | RowOutcome::Partial => None,
        }
    }
}

/// Result of [`RowFiller::fill_row`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFill {
    /// At least one cell moved from `Empty` to a value or `Null`.
    pub changed: bool,
    pub outcome: RowOutcome,
}

/// Computes missing feature cells, fetching account data at most once per
/// row attempt.
pub struct RowFiller<'a, P> {
    provider: &'a P,
    page_size: u32,
    now: Option<DateTime<Utc>>,
}

impl<'a, P: AccountProvider> RowFiller<'a, P> {
    #[must_use]
    pub fn new(provider: &'a P, page_size: u32) -> Self {
        Self {
            provider,
            page_size,
            now: None,
        }
    }

    /// Pins the clock used for date arithmetic.
    #[must_use]
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    /// Fills the empty cells of `id`'s row in feature order.
    ///
    /// Populated cells, including `Null`, are never recomputed. A snapshot
    /// failure stops the row with every remaining cell empty. A timeline
    /// failure leaves only the timeline cells empty. Timeline features are
    /// fetched only for rows whose `is_protected` cell is `false`.
    ///
    /// # Errors
    ///
    /// [`DatasetError::UnknownAccount`] if `id` has no row. Fetch failures
    /// are reported through [`RowFill::outcome`] instead.
    pub async fn fill_row(
        &self,
        dataset: &mut Dataset,
        id: AccountId,
    ) -> Result<RowFill, DatasetError> {
        let mut features = dataset
            .row(id)
            .ok_or(DatasetError::UnknownAccount(id))?
            .features;
        let now = self.now.unwrap_or_else(Utc::now);

        let mut snapshot: Option<AccountSnapshot> = None;
        let mut tweets: Option<Vec<TweetRecord>> = None;
        let mut snapshot_error: Option<FetchError> = None;
        let mut timeline_error: Option<FetchError> = None;
        let mut changed = false;

        for feature in Feature::ALL {
            let before = features.get(feature);
            if before.is_populated() {
                continue;
            }

            if snapshot.is_none() {
                match self.provider.get_account(id).await {
                    Ok(fetched) => snapshot = Some(fetched),
                    Err(err) => {
                        tracing::warn!(account_id = id, error = %err, "account lookup failed");
                        snapshot_error = Some(err);
                        break;
                    }
                }
            }

            let after = match feature.dependency() {
                FeatureDependency::Snapshot => {
                    compute_feature(feature, snapshot.as_ref(), None, now)
                }
                FeatureDependency::Timeline => {
                    if features.get(Feature::IsProtected).as_bool() != Some(false) {
                        tracing::debug!(account_id = id, feature = %feature, "timeline not readable, skipping");
                        continue;
                    }
                    if timeline_error.is_some() {
                        continue;
                    }
                    if tweets.is_none() {
                        match self.provider.fetch_timeline(id, self.page_size).await {
                            Ok(fetched) => {
                                tracing::debug!(account_id = id, tweets = fetched.len(), "timeline fetched");
                                tweets = Some(fetched);
                            }
                            Err(err) => {
                                tracing::warn!(account_id = id, error = %err, "timeline fetch failed");
                                timeline_error = Some(err);
                                continue;
                            }
                        }
                    }
                    compute_feature(feature, snapshot.as_ref(), tweets.as_deref(), now)
                }
            };

            features.set(feature, after);
            tracing::info!(
                account_id = id,
                feature = %feature,
                before = %before,
                after = %after,
                "cell filled"
            );
            changed |= after != Cell::Empty;
        }

        let row = dataset
            .row_mut(id)
            .ok_or(DatasetError::UnknownAccount(id))?;
        row.features = features;

        let outcome = match (snapshot_error, timeline_error) {
            (Some(err), _) => RowOutcome::SnapshotUnavailable(err),
            (None, Some(err)) => RowOutcome::TimelineUnavailable(err),
            (None, None) if features.is_fully_populated() => RowOutcome::Complete,
            (None, None) => RowOutcome::Partial,
        };

        Ok(RowFill { changed, outcome })
    }
}
