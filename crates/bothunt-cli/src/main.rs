mod classify;
mod dataset;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "bothunt")]
#[command(about = "Twitter account feature collection and bot classification")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Add account ids to a dataset as empty rows
    Register {
        /// Dataset CSV (defaults to `BOTHUNT_DATASET_PATH`)
        #[arg(long)]
        dataset: Option<PathBuf>,
        /// Numeric account ids
        #[arg(required = true)]
        ids: Vec<u64>,
    },
    /// Fill empty feature cells from the Twitter API
    Fill {
        /// Dataset CSV (defaults to `BOTHUNT_DATASET_PATH`)
        #[arg(long)]
        dataset: Option<PathBuf>,
        /// Override the number of retry rounds
        #[arg(long)]
        max_rounds: Option<u32>,
    },
    /// Train the classifier and print its held-out evaluation
    Train {
        /// Labelled CSV (defaults to `BOTHUNT_TRAINING_DATA_PATH`)
        #[arg(long)]
        data: Option<PathBuf>,
        /// Number of trees in the forest
        #[arg(long, default_value = "100")]
        trees: u16,
    },
    /// Classify accounts by screen name
    Classify {
        /// Labelled CSV used to train the model first
        #[arg(long)]
        data: Option<PathBuf>,
        /// Screen names, with or without a leading `@`
        #[arg(required = true)]
        screen_names: Vec<String>,
    },
    /// Export an account's timeline to CSV
    Tweets {
        screen_name: String,
        /// Output file
        #[arg(long)]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = bothunt_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::debug!(env = %config.env, "configuration loaded");

    match cli.command {
        Some(Commands::Register { dataset, ids }) => {
            dataset::run_register(&config, dataset.as_deref(), &ids)?;
        }
        Some(Commands::Fill {
            dataset,
            max_rounds,
        }) => dataset::run_fill(&config, dataset.as_deref(), max_rounds).await?,
        Some(Commands::Train { data, trees }) => {
            classify::run_train(&config, data.as_deref(), trees)?;
        }
        Some(Commands::Classify { data, screen_names }) => {
            classify::run_classify(&config, data.as_deref(), &screen_names).await?;
        }
        Some(Commands::Tweets { screen_name, out }) => {
            dataset::run_tweets(&config, &screen_name, &out).await?;
        }
        None => println!("no command given; run `bothunt --help` for usage"),
    }

    Ok(())
}
