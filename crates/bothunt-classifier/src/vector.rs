use bothunt_core::{Feature, FeatureRow};

use crate::error::ClassifierError;

/// Numeric model input: the eight feature values in column order, booleans
/// as `0.0`/`1.0`. Built only from fully valued rows; the class label is
/// never part of it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; Feature::COUNT]);

impl FeatureVector {
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    #[must_use]
    pub fn get(&self, feature: Feature) -> f64 {
        self.0[feature.index()]
    }
}

impl TryFrom<&FeatureRow> for FeatureVector {
    type Error = ClassifierError;

    fn try_from(row: &FeatureRow) -> Result<Self, Self::Error> {
        let mut values = [0.0; Feature::COUNT];
        let mut missing = Vec::new();
        for (feature, cell) in row.iter() {
            match cell.value() {
                Some(v) => values[feature.index()] = v.as_f64(),
                None => missing.push(feature),
            }
        }
        if missing.is_empty() {
            Ok(Self(values))
        } else {
            Err(ClassifierError::IncompleteRow { missing })
        }
    }
}
