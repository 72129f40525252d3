//! In-memory feature table keyed by account id.

use std::collections::HashMap;

use bothunt_core::{AccountId, BotClass, Cell, Feature, FeatureRow};

use crate::error::DatasetError;

pub const ID_COLUMN: &str = "id";
/// Ground-truth class column, consumed only by classifier training.
pub const LABEL_COLUMN: &str = "result";

/// One account's row.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetRow {
    pub id: AccountId,
    /// Values for [`Dataset::extra_columns`], carried through untouched.
    pub extra: Vec<String>,
    pub features: FeatureRow,
    pub label: Option<BotClass>,
}

impl DatasetRow {
    /// Snapshot fetch succeeded earlier but the timeline features never
    /// landed, typically because pagination failed part-way.
    #[must_use]
    pub fn needs_timeline_retry(&self) -> bool {
        self.features.get(Feature::TimeOfExistence).value().is_some()
            && self.features.get(Feature::AverageDailyTweets).is_empty()
            && self.features.get(Feature::IsProtected).as_bool() != Some(true)
    }

    /// The account existed when last fetched (`time_of_existence` known).
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.features.get(Feature::TimeOfExistence).value().is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    extra_columns: Vec<String>,
    has_label_column: bool,
    rows: Vec<DatasetRow>,
    index: HashMap<AccountId, usize>,
}

impl Dataset {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty dataset that will round-trip the given pass-through columns
    /// and, optionally, the label column.
    #[must_use]
    pub fn with_columns(extra_columns: Vec<String>, has_label_column: bool) -> Self {
        Self {
            extra_columns,
            has_label_column,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn extra_columns(&self) -> &[String] {
        &self.extra_columns
    }

    #[must_use]
    pub fn has_label_column(&self) -> bool {
        self.has_label_column
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn rows(&self) -> &[DatasetRow] {
        &self.rows
    }

    /// Account ids in row order.
    #[must_use]
    pub fn ids(&self) -> Vec<AccountId> {
        self.rows.iter().map(|r| r.id).collect()
    }

    #[must_use]
    pub fn row(&self, id: AccountId) -> Option<&DatasetRow> {
        self.index.get(&id).map(|&i| &self.rows[i])
    }

    pub fn row_mut(&mut self, id: AccountId) -> Option<&mut DatasetRow> {
        self.index.get(&id).map(|&i| &mut self.rows[i])
    }

    /// Adds an all-empty row for `id`. Returns `false` if it already exists.
    pub fn register(&mut self, id: AccountId) -> bool {
        if self.index.contains_key(&id) {
            return false;
        }
        let extra = vec![String::new(); self.extra_columns.len()];
        self.push(DatasetRow {
            id,
            extra,
            features: FeatureRow::empty(),
            label: None,
        });
        true
    }

    /// Appends a fully formed row.
    ///
    /// # Errors
    ///
    /// [`DatasetError::DuplicateAccount`] if the id is already present, or
    /// [`DatasetError::ColumnMismatch`] if `row.extra` does not line up with
    /// the dataset's pass-through columns.
    pub fn insert_row(&mut self, row: DatasetRow) -> Result<(), DatasetError> {
        if self.index.contains_key(&row.id) {
            return Err(DatasetError::DuplicateAccount(row.id));
        }
        if row.extra.len() != self.extra_columns.len() {
            return Err(DatasetError::ColumnMismatch {
                account_id: row.id,
                expected: self.extra_columns.len(),
                found: row.extra.len(),
            });
        }
        if row.label.is_some() {
            self.has_label_column = true;
        }
        self.push(row);
        Ok(())
    }

    /// Resets one cell to `Empty` so the next fill recomputes it.
    pub fn clear_cell(&mut self, id: AccountId, feature: Feature) -> bool {
        match self.row_mut(id) {
            Some(row) => {
                row.features.set(feature, Cell::Empty);
                true
            }
            None => false,
        }
    }

    pub fn set_label(&mut self, id: AccountId, label: BotClass) -> bool {
        let Some(row) = self.row_mut(id) else {
            return false;
        };
        row.label = Some(label);
        self.has_label_column = true;
        true
    }

    /// Ids of rows for which [`DatasetRow::needs_timeline_retry`] holds.
    #[must_use]
    pub fn partial_rows(&self) -> Vec<AccountId> {
        self.rows
            .iter()
            .filter(|r| r.needs_timeline_retry())
            .map(|r| r.id)
            .collect()
    }

    /// Rows whose account existed at fetch time; removed accounts drop out.
    pub fn resolved_rows(&self) -> impl Iterator<Item = &DatasetRow> {
        self.rows.iter().filter(|r| r.is_resolved())
    }

    /// `true` when every cell of every row is populated.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.rows.iter().all(|r| r.features.is_fully_populated())
    }

    fn push(&mut self, row: DatasetRow) {
        self.index.insert(row.id, self.rows.len());
        self.rows.push(row);
    }
}
