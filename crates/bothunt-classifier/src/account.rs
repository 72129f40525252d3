//! Classifies live accounts by screen name, caching their feature rows.

use std::path::{Path, PathBuf};

use bothunt_core::{AccountProvider, BotClass, Feature};
use bothunt_dataset::{CsvStore, Dataset, DatasetError, DatasetRow, RowFiller};

use crate::error::{ClassifierError, ClassifyError};
use crate::model::BotModel;
use crate::vector::FeatureVector;

const SCREEN_NAME_COLUMN: &str = "screen_name";

/// Location of the cached feature row for `screen_name`.
#[must_use]
pub fn cache_path(features_dir: &Path, screen_name: &str) -> PathBuf {
    let name = screen_name.trim_start_matches('@');
    features_dir.join(format!("{name}_account_features.csv"))
}

pub struct AccountClassifier<'a, P> {
    provider: &'a P,
    model: &'a BotModel,
    features_dir: PathBuf,
    page_size: u32,
}

impl<'a, P: AccountProvider> AccountClassifier<'a, P> {
    #[must_use]
    pub fn new(
        provider: &'a P,
        model: &'a BotModel,
        features_dir: impl Into<PathBuf>,
        page_size: u32,
    ) -> Self {
        Self {
            provider,
            model,
            features_dir: features_dir.into(),
            page_size,
        }
    }

    /// Classifies one account.
    ///
    /// Protected and verified accounts are `Human` without consulting the
    /// model. Feature rows are read from the per-account cache when present
    /// and written there after a fresh fetch.
    ///
    /// # Errors
    ///
    /// [`ClassifyError::Fetch`] when the account cannot be looked up,
    /// [`ClassifyError::IncompleteFeatures`] when some feature could not be
    /// computed, or cache and model errors.
    pub async fn classify(&self, screen_name: &str) -> Result<BotClass, ClassifyError> {
        let row = self.feature_row(screen_name).await?;
        let features = &row.features;

        if features.get(Feature::IsProtected).as_bool() == Some(true)
            || features.get(Feature::IsVerified).as_bool() == Some(true)
        {
            tracing::info!(
                screen_name,
                account_id = row.id,
                "protected or verified account, classified as human"
            );
            return Ok(BotClass::Human);
        }

        let vector = match FeatureVector::try_from(features) {
            Ok(vector) => vector,
            Err(ClassifierError::IncompleteRow { missing }) => {
                return Err(ClassifyError::IncompleteFeatures {
                    screen_name: screen_name.to_owned(),
                    missing,
                });
            }
            Err(other) => return Err(other.into()),
        };
        let class = self.model.predict(&vector)?;
        tracing::info!(screen_name, account_id = row.id, class = %class, "account classified");
        Ok(class)
    }

    async fn feature_row(&self, screen_name: &str) -> Result<DatasetRow, ClassifyError> {
        let store = CsvStore::new(cache_path(&self.features_dir, screen_name));
        if store.path().exists() {
            let cached = store.load()?;
            if let Some(row) = cached.rows().first() {
                tracing::debug!(
                    screen_name,
                    path = %store.path().display(),
                    "using cached features"
                );
                return Ok(row.clone());
            }
        }

        let fetch_error = |source| ClassifyError::Fetch {
            screen_name: screen_name.to_owned(),
            source,
        };
        let snapshot = self
            .provider
            .get_account_by_screen_name(screen_name.trim_start_matches('@'))
            .await
            .map_err(fetch_error)?;

        let mut dataset = Dataset::with_columns(vec![SCREEN_NAME_COLUMN.to_owned()], false);
        dataset.register(snapshot.id);
        if let Some(row) = dataset.row_mut(snapshot.id) {
            row.extra = vec![snapshot.screen_name.clone()];
        }

        let fill = RowFiller::new(self.provider, self.page_size)
            .fill_row(&mut dataset, snapshot.id)
            .await?;
        if let Some(err) = fill.outcome.error() {
            return Err(fetch_error(err.clone()));
        }
        store.save(&dataset)?;

        dataset
            .row(snapshot.id)
            .cloned()
            .ok_or_else(|| DatasetError::UnknownAccount(snapshot.id).into())
    }
}

#[cfg(test)]
#[path = "account_test.rs"]
mod tests;
