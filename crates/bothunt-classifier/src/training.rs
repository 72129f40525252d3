//! Labelled training data extracted from a dataset.

use bothunt_core::BotClass;
use bothunt_dataset::Dataset;

use crate::vector::FeatureVector;

/// Parallel feature vectors and labels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingSet {
    pub features: Vec<FeatureVector>,
    pub labels: Vec<BotClass>,
}

impl TrainingSet {
    /// Keeps rows whose account existed at fetch time, that carry a label,
    /// and whose eight features all hold values. Everything else is dropped.
    #[must_use]
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let mut set = Self::default();
        let mut skipped = 0usize;
        for row in dataset.resolved_rows() {
            let Some(label) = row.label else {
                skipped += 1;
                continue;
            };
            match FeatureVector::try_from(&row.features) {
                Ok(vector) => set.push(vector, label),
                Err(_) => skipped += 1,
            }
        }
        tracing::info!(
            rows = set.len(),
            skipped,
            removed = dataset.len() - dataset.resolved_rows().count(),
            "training set built"
        );
        set
    }

    pub fn push(&mut self, vector: FeatureVector, label: BotClass) {
        self.features.push(vector);
        self.labels.push(label);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Row count per class, indexed by [`BotClass::code`].
    #[must_use]
    pub fn class_counts(&self) -> [usize; 3] {
        let mut counts = [0; 3];
        for label in &self.labels {
            counts[class_slot(*label)] += 1;
        }
        counts
    }
}

/// Array position of a class in per-class tables.
pub(crate) fn class_slot(class: BotClass) -> usize {
    match class {
        BotClass::Human => 0,
        BotClass::TraditionalBot => 1,
        BotClass::SocialBot => 2,
    }
}
