//! Model commands: `train` and `classify`.

use std::path::Path;

use anyhow::Context;
use bothunt_classifier::{AccountClassifier, BotModel, Evaluation, TrainOptions, TrainingSet};
use bothunt_core::AppConfig;
use bothunt_dataset::CsvStore;
use bothunt_twitter::TwitterClient;

fn train_model(
    config: &AppConfig,
    data: Option<&Path>,
    options: &TrainOptions,
) -> anyhow::Result<(BotModel, Evaluation)> {
    let store = CsvStore::new(data.unwrap_or(&config.training_data_path));
    let labelled = store
        .load()
        .with_context(|| format!("failed to read training data {}", store.path().display()))?;
    let set = TrainingSet::from_dataset(&labelled);
    Ok(BotModel::train(&set, options)?)
}

pub(crate) fn run_train(config: &AppConfig, data: Option<&Path>, trees: u16) -> anyhow::Result<()> {
    let options = TrainOptions {
        n_trees: trees,
        ..TrainOptions::default()
    };
    let (_, evaluation) = train_model(config, data, &options)?;

    println!("train accuracy: {:.3}", evaluation.train_accuracy());
    print!("{}", evaluation.train);
    println!();
    println!("test accuracy: {:.3}", evaluation.test_accuracy());
    print!("{}", evaluation.test);
    Ok(())
}

/// Trains on the labelled data, then classifies each screen name. A failed
/// account prints `Error` and does not stop the others.
pub(crate) async fn run_classify(
    config: &AppConfig,
    data: Option<&Path>,
    screen_names: &[String],
) -> anyhow::Result<()> {
    let (model, evaluation) = train_model(config, data, &TrainOptions::default())?;
    tracing::info!(test_accuracy = evaluation.test_accuracy(), "model ready");

    let client = TwitterClient::from_config(config)
        .map_err(|e| anyhow::anyhow!("failed to build Twitter client: {e}"))?;
    let classifier = AccountClassifier::new(
        &client,
        &model,
        &config.features_dir,
        config.timeline_page_size,
    );

    for name in screen_names {
        match classifier.classify(name).await {
            Ok(class) => println!("{name}: {class}"),
            Err(e) => {
                tracing::warn!(screen_name = %name, error = %e, "classification failed");
                println!("{name}: Error");
            }
        }
    }
    Ok(())
}
