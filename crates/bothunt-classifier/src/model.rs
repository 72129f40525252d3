//! Random forest training, evaluation and prediction.

use std::fmt;

use bothunt_core::{BotClass, Feature};
use smartcore::ensemble::random_forest_classifier::{
    RandomForestClassifier, RandomForestClassifierParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::model_selection::train_test_split;

use crate::error::ClassifierError;
use crate::training::{class_slot, TrainingSet};
use crate::vector::FeatureVector;

type Forest = RandomForestClassifier<f64, i32, DenseMatrix<f64>, Vec<i32>>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainOptions {
    /// Fraction of rows held out for evaluation.
    pub test_size: f32,
    pub seed: u64,
    pub n_trees: u16,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            test_size: 0.25,
            seed: 42,
            n_trees: 100,
        }
    }
}

/// Actual-by-predicted counts over the three classes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfusionMatrix {
    counts: [[usize; 3]; 3],
}

impl ConfusionMatrix {
    #[must_use]
    pub fn from_predictions(actual: &[BotClass], predicted: &[BotClass]) -> Self {
        let mut matrix = Self::default();
        for (a, p) in actual.iter().zip(predicted) {
            matrix.counts[class_slot(*a)][class_slot(*p)] += 1;
        }
        matrix
    }

    #[must_use]
    pub fn get(&self, actual: BotClass, predicted: BotClass) -> usize {
        self.counts[class_slot(actual)][class_slot(predicted)]
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    /// Share of correct predictions; `0.0` for an empty matrix.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let correct: usize = (0..3).map(|i| self.counts[i][i]).sum();
        correct as f64 / total as f64
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>18} {:>8} {:>8} {:>8}", "actual \\ predicted", "human", "trad", "social")?;
        for class in BotClass::ALL {
            let row = self.counts[class_slot(class)];
            writeln!(f, "{:>18} {:>8} {:>8} {:>8}", class.to_string(), row[0], row[1], row[2])?;
        }
        Ok(())
    }
}

/// Held-out evaluation of a freshly trained model.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub train: ConfusionMatrix,
    pub test: ConfusionMatrix,
}

impl Evaluation {
    #[must_use]
    pub fn train_accuracy(&self) -> f64 {
        self.train.accuracy()
    }

    #[must_use]
    pub fn test_accuracy(&self) -> f64 {
        self.test.accuracy()
    }
}

/// A trained three-class account model.
pub struct BotModel {
    forest: Forest,
}

impl fmt::Debug for BotModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotModel").finish_non_exhaustive()
    }
}

impl BotModel {
    /// Fits a random forest on a shuffled split of `set` and scores it on
    /// both halves. Features are used unscaled.
    ///
    /// # Errors
    ///
    /// [`ClassifierError::InvalidTestSize`] for a fraction outside `(0, 1)`,
    /// [`ClassifierError::InsufficientData`] when either split would be
    /// empty, or [`ClassifierError::Model`] if fitting fails.
    pub fn train(
        set: &TrainingSet,
        options: &TrainOptions,
    ) -> Result<(Self, Evaluation), ClassifierError> {
        if !(options.test_size > 0.0 && options.test_size < 1.0) {
            return Err(ClassifierError::InvalidTestSize(options.test_size));
        }
        let needed = min_rows(options.test_size);
        if set.len() < needed {
            return Err(ClassifierError::InsufficientData {
                needed,
                found: set.len(),
            });
        }

        let x = to_matrix(&set.features);
        let y: Vec<i32> = set.labels.iter().map(|c| c.code()).collect();
        let (x_train, x_test, y_train, y_test) =
            train_test_split(&x, &y, options.test_size, true, Some(options.seed));

        tracing::info!(
            train_rows = y_train.len(),
            test_rows = y_test.len(),
            n_trees = options.n_trees,
            "training random forest"
        );
        // Every tree shares the seed, so each split must see all features or
        // the trees end up with identical feature subsets.
        let params = RandomForestClassifierParameters::default()
            .with_n_trees(options.n_trees)
            .with_m(Feature::COUNT)
            .with_seed(options.seed);
        let forest = Forest::fit(&x_train, &y_train, params)?;
        let model = Self { forest };

        let train = model.confusion(&x_train, &y_train)?;
        let test = model.confusion(&x_test, &y_test)?;
        let evaluation = Evaluation { train, test };
        tracing::info!(
            train_accuracy = evaluation.train_accuracy(),
            test_accuracy = evaluation.test_accuracy(),
            "model evaluated"
        );
        Ok((model, evaluation))
    }

    /// # Errors
    ///
    /// [`ClassifierError::Model`] if prediction fails, or
    /// [`ClassifierError::UnknownClass`] for an out-of-range class code.
    pub fn predict(&self, vector: &FeatureVector) -> Result<BotClass, ClassifierError> {
        let x = to_matrix(std::slice::from_ref(vector));
        let codes = self.forest.predict(&x)?;
        let code = codes.first().copied().unwrap_or(-1);
        decode(code)
    }

    fn confusion(
        &self,
        x: &DenseMatrix<f64>,
        y: &[i32],
    ) -> Result<ConfusionMatrix, ClassifierError> {
        let predicted = self
            .forest
            .predict(x)?
            .into_iter()
            .map(decode)
            .collect::<Result<Vec<_>, _>>()?;
        let actual = y.iter().copied().map(decode).collect::<Result<Vec<_>, _>>()?;
        Ok(ConfusionMatrix::from_predictions(&actual, &predicted))
    }
}

fn decode(code: i32) -> Result<BotClass, ClassifierError> {
    BotClass::from_code(code).ok_or(ClassifierError::UnknownClass(code))
}

fn to_matrix(vectors: &[FeatureVector]) -> DenseMatrix<f64> {
    let rows: Vec<Vec<f64>> = vectors.iter().map(|v| v.as_slice().to_vec()).collect();
    DenseMatrix::from_2d_vec(&rows)
}

/// Smallest row count that leaves at least one row on each side of the
/// split.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn min_rows(test_size: f32) -> usize {
    let mut n = 2usize;
    while ((n as f32) * test_size) < 1.0 || ((n as f32) * test_size) as usize >= n {
        n += 1;
    }
    n
}
