//! Dataset maintenance commands: `register`, `fill` and `tweets`.

use std::path::Path;

use anyhow::Context;
use bothunt_core::{AccountProvider, AppConfig};
use bothunt_dataset::{export_tweets, CsvStore, FillOptions, RowFiller};
use bothunt_twitter::TwitterClient;

fn twitter_client(config: &AppConfig) -> anyhow::Result<TwitterClient> {
    TwitterClient::from_config(config)
        .map_err(|e| anyhow::anyhow!("failed to build Twitter client: {e}"))
}

/// Adds `ids` as empty rows, creating the dataset file if needed.
pub(crate) fn run_register(
    config: &AppConfig,
    dataset: Option<&Path>,
    ids: &[u64],
) -> anyhow::Result<()> {
    let store = CsvStore::new(dataset.unwrap_or(&config.dataset_path));
    let mut data = store
        .load_or_default()
        .with_context(|| format!("failed to read {}", store.path().display()))?;

    let added = ids.iter().filter(|id| data.register(**id)).count();
    store.save(&data)?;

    println!(
        "registered {added} new account(s), {} already present; dataset has {} row(s)",
        ids.len() - added,
        data.len()
    );
    Ok(())
}

/// Fills every empty cell the API can provide, checkpointing after each
/// changed row.
pub(crate) async fn run_fill(
    config: &AppConfig,
    dataset: Option<&Path>,
    max_rounds: Option<u32>,
) -> anyhow::Result<()> {
    let mut store = CsvStore::new(dataset.unwrap_or(&config.dataset_path));
    let mut data = store
        .load()
        .with_context(|| format!("failed to read {}", store.path().display()))?;
    let client = twitter_client(config)?;

    let mut options = FillOptions::from_config(config);
    if let Some(rounds) = max_rounds {
        options.max_rounds = rounds;
    }

    let report = RowFiller::new(&client, config.timeline_page_size)
        .fill_dataset(&mut data, &mut store, &options)
        .await?;

    println!(
        "fill finished after {} retry round(s): {} row update(s), {} unresolved, {} given up",
        report.rounds,
        report.rows_changed,
        report.unresolved.len(),
        report.unfillable.len()
    );
    println!("rows missing timeline features per pass: {:?}", report.wrong_rows_per_round);
    if !report.unfillable.is_empty() {
        println!("given up: {:?}", report.unfillable);
    }
    Ok(())
}

/// Writes an account's full timeline to `out`.
pub(crate) async fn run_tweets(
    config: &AppConfig,
    screen_name: &str,
    out: &Path,
) -> anyhow::Result<()> {
    let client = twitter_client(config)?;
    let name = screen_name.trim_start_matches('@');

    let account = client
        .get_account_by_screen_name(name)
        .await
        .with_context(|| format!("failed to look up @{name}"))?;
    let tweets = client
        .fetch_timeline(account.id, config.timeline_page_size)
        .await
        .with_context(|| format!("failed to fetch timeline of @{name}"))?;

    export_tweets(out, &tweets)?;
    println!("wrote {} tweet(s) from @{name} to {}", tweets.len(), out.display());
    Ok(())
}
