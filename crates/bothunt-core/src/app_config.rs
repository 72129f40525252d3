use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub twitter_bearer_token: Option<String>,
    pub twitter_base_url: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_secs: u64,
    pub timeline_page_size: u32,
    pub fill_max_rounds: u32,
    pub fill_round_backoff_base_secs: u64,
    pub fill_max_account_failures: u32,
    pub dataset_path: PathBuf,
    pub training_data_path: PathBuf,
    pub features_dir: PathBuf,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field(
                "twitter_bearer_token",
                &self.twitter_bearer_token.as_ref().map(|_| "[redacted]"),
            )
            .field("twitter_base_url", &self.twitter_base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_secs", &self.retry_backoff_base_secs)
            .field("timeline_page_size", &self.timeline_page_size)
            .field("fill_max_rounds", &self.fill_max_rounds)
            .field(
                "fill_round_backoff_base_secs",
                &self.fill_round_backoff_base_secs,
            )
            .field("fill_max_account_failures", &self.fill_max_account_failures)
            .field("dataset_path", &self.dataset_path)
            .field("training_data_path", &self.training_data_path)
            .field("features_dir", &self.features_dir)
            .finish()
    }
}
