//! Random-forest classification of accounts into human, traditional bot,
//! and social bot.

pub mod account;
pub mod error;
pub mod model;
pub mod training;
pub mod vector;

#[cfg(test)]
pub(crate) mod test_support;

pub use account::{cache_path, AccountClassifier};
pub use error::{ClassifierError, ClassifyError};
pub use model::{BotModel, ConfusionMatrix, Evaluation, TrainOptions};
pub use training::TrainingSet;
pub use vector::FeatureVector;
