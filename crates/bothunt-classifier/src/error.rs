use bothunt_core::{Feature, FetchError};
use bothunt_dataset::DatasetError;
use thiserror::Error;

/// Training and prediction failures.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("row is missing feature values: {missing:?}")]
    IncompleteRow { missing: Vec<Feature> },

    #[error("need at least {needed} labelled rows to train, found {found}")]
    InsufficientData { needed: usize, found: usize },

    #[error("test fraction must be between 0 and 1, got {0}")]
    InvalidTestSize(f32),

    #[error("model returned unknown class code {0}")]
    UnknownClass(i32),

    #[error("model error: {0}")]
    Model(#[from] smartcore::error::Failed),
}

/// Failures classifying a single account by screen name.
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("account lookup failed for {screen_name}: {source}")]
    Fetch {
        screen_name: String,
        #[source]
        source: FetchError,
    },

    #[error("features incomplete for {screen_name}: missing {missing:?}")]
    IncompleteFeatures {
        screen_name: String,
        missing: Vec<Feature>,
    },

    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Classifier(#[from] ClassifierError),
}
