//! HTTP client for the Twitter v1.1 REST API.
//!
//! Wraps `reqwest` with bearer-token auth, status-code classification and
//! retry on transient failures. Use [`TwitterClient::new`] for production
//! or [`TwitterClient::with_base_url`] to point at a mock server in tests.

use std::time::Duration;

use bothunt_core::{AccountId, AppConfig};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::error::TwitterError;
use crate::rate_limit::retry_with_backoff;
use crate::types::{ApiErrorBody, ApiTweet, ApiUser};

const DEFAULT_BASE_URL: &str = "https://api.twitter.com/1.1/";

/// Error codes v1.1 returns with a 403 for suspended accounts.
const SUSPENDED_CODES: [i64; 2] = [63, 64];

/// Wait assumed when a 429 carries no usable reset header.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Client for the Twitter v1.1 REST API.
pub struct TwitterClient {
    client: Client,
    base_url: Url,
    /// Maximum number of retry attempts after the first failure.
    max_retries: u32,
    /// Base delay in seconds for exponential backoff.
    backoff_base_secs: u64,
}

impl TwitterClient {
    /// Creates a client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`TwitterError::InvalidCredentials`] if the token cannot be
    /// used as a header value, or [`TwitterError::Http`] if the underlying
    /// `reqwest::Client` cannot be constructed.
    pub fn new(
        bearer_token: &str,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, TwitterError> {
        Self::with_base_url(
            bearer_token,
            DEFAULT_BASE_URL,
            timeout_secs,
            user_agent,
            max_retries,
            backoff_base_secs,
        )
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// As [`Self::new`], plus [`TwitterError::InvalidBaseUrl`] if `base_url`
    /// does not parse.
    pub fn with_base_url(
        bearer_token: &str,
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, TwitterError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {bearer_token}"))
            .map_err(|e| TwitterError::InvalidCredentials(e.to_string()))?;
        auth.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .default_headers(headers)
            .build()?;

        // Exactly one trailing slash so `join` appends endpoint paths instead
        // of replacing the last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| TwitterError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            max_retries,
            backoff_base_secs,
        })
    }

    /// Builds a client from application configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TwitterError::InvalidCredentials`] when no bearer token is
    /// configured, otherwise as [`Self::with_base_url`].
    pub fn from_config(config: &AppConfig) -> Result<Self, TwitterError> {
        let token = config.twitter_bearer_token.as_deref().ok_or_else(|| {
            TwitterError::InvalidCredentials("TWITTER_BEARER_TOKEN is not set".to_owned())
        })?;
        Self::with_base_url(
            token,
            &config.twitter_base_url,
            config.request_timeout_secs,
            &config.user_agent,
            config.max_retries,
            config.retry_backoff_base_secs,
        )
    }

    /// Fetches an account's profile by numeric id (`users/show`).
    ///
    /// # Errors
    ///
    /// - [`TwitterError::NotFound`] for deleted or unknown accounts.
    /// - [`TwitterError::Suspended`] for suspended accounts.
    /// - [`TwitterError::RateLimited`] / [`TwitterError::Http`] after retries.
    /// - [`TwitterError::Deserialize`] if the payload does not match.
    pub async fn user_by_id(&self, id: AccountId) -> Result<ApiUser, TwitterError> {
        let url = self.endpoint_url("users/show.json", &[("user_id", &id.to_string())])?;
        self.get_json(&url, &format!("users/show(user_id={id})"))
            .await
    }

    /// Fetches an account's profile by screen name (`users/show`).
    ///
    /// # Errors
    ///
    /// As [`Self::user_by_id`].
    pub async fn user_by_screen_name(&self, screen_name: &str) -> Result<ApiUser, TwitterError> {
        let handle = screen_name.trim_start_matches('@');
        let url = self.endpoint_url("users/show.json", &[("screen_name", handle)])?;
        self.get_json(&url, &format!("users/show(screen_name={handle})"))
            .await
    }

    /// Fetches one timeline page, newest first (`statuses/user_timeline`).
    ///
    /// # Errors
    ///
    /// - [`TwitterError::Unauthorized`] for protected timelines.
    /// - Otherwise as [`Self::user_by_id`].
    pub async fn user_timeline(
        &self,
        id: AccountId,
        count: u32,
        max_id: Option<u64>,
    ) -> Result<Vec<ApiTweet>, TwitterError> {
        let id_param = id.to_string();
        let count_param = count.to_string();
        let max_id_param = max_id.map(|m| m.to_string());
        let mut params = vec![
            ("user_id", id_param.as_str()),
            ("count", count_param.as_str()),
            ("trim_user", "true"),
            ("include_rts", "true"),
        ];
        if let Some(m) = &max_id_param {
            params.push(("max_id", m.as_str()));
        }
        let url = self.endpoint_url("statuses/user_timeline.json", &params)?;
        self.get_json(
            &url,
            &format!("statuses/user_timeline(user_id={id}, max_id={max_id:?})"),
        )
        .await
    }

    /// Joins `path` onto the base URL and appends percent-encoded parameters.
    fn endpoint_url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, TwitterError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| TwitterError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    /// Sends a GET with retry, classifies the status, and parses the body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &Url,
        context: &str,
    ) -> Result<T, TwitterError> {
        retry_with_backoff(self.max_retries, self.backoff_base_secs, || async move {
            let response = self.client.get(url.clone()).send().await?;
            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                return Err(TwitterError::RateLimited {
                    retry_after_secs: retry_after_secs(response.headers()),
                });
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(classify_failure(status, &body, url.as_str()));
            }

            let body = response.text().await?;
            serde_json::from_str::<T>(&body).map_err(|e| TwitterError::Deserialize {
                context: context.to_owned(),
                source: e,
            })
        })
        .await
    }
}

/// Maps a non-2xx, non-429 response onto a typed error.
fn classify_failure(status: StatusCode, body: &str, url: &str) -> TwitterError {
    let url = url.to_owned();
    match status {
        StatusCode::NOT_FOUND => TwitterError::NotFound { url },
        StatusCode::UNAUTHORIZED => TwitterError::Unauthorized { url },
        StatusCode::FORBIDDEN => {
            let parsed: ApiErrorBody = serde_json::from_str(body).unwrap_or_default();
            match parsed
                .errors
                .iter()
                .find(|e| SUSPENDED_CODES.contains(&e.code))
            {
                Some(entry) => {
                    tracing::debug!(code = entry.code, message = %entry.message, "account suspended");
                    TwitterError::Suspended { url }
                }
                None => TwitterError::Unauthorized { url },
            }
        }
        other => TwitterError::UnexpectedStatus {
            status: other.as_u16(),
            url,
        },
    }
}

/// Seconds to wait before the rate-limit window reopens.
///
/// Prefers `Retry-After`, then `x-rate-limit-reset` (epoch seconds).
fn retry_after_secs(headers: &HeaderMap) -> u64 {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<i64>().ok())
    };

    if let Some(secs) = header("retry-after") {
        return u64::try_from(secs).unwrap_or(0);
    }
    if let Some(reset) = header("x-rate-limit-reset") {
        let remaining = reset - chrono::Utc::now().timestamp();
        return u64::try_from(remaining).unwrap_or(0);
    }
    DEFAULT_RETRY_AFTER_SECS
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
