//! Shared domain types for the bothunt workspace.
//!
//! Holds the account/tweet snapshot types, the fixed feature catalogue and
//! its cell model, the [`AccountProvider`] seam that every data source
//! implements, and environment-driven configuration.

pub mod account;
pub mod app_config;
pub mod config;
pub mod error;
pub mod feature;
pub mod provider;

pub use account::{AccountId, AccountSnapshot, TweetRecord};
pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::{ConfigError, FetchError};
pub use feature::{BotClass, Cell, Feature, FeatureDependency, FeatureRow, FeatureValue, ValueKind};
pub use provider::{AccountProvider, MAX_TIMELINE_PAGES};
