//! [`AccountProvider`] implementation backed by the REST client.

use bothunt_core::{AccountId, AccountProvider, AccountSnapshot, FetchError, TweetRecord};

use crate::client::TwitterClient;
use crate::error::TwitterError;

impl From<TwitterError> for FetchError {
    fn from(err: TwitterError) -> Self {
        match err {
            TwitterError::NotFound { .. } => FetchError::NotFound,
            TwitterError::Suspended { .. } => FetchError::Suspended,
            TwitterError::Unauthorized { .. } | TwitterError::InvalidCredentials(_) => {
                FetchError::Unauthorized
            }
            TwitterError::RateLimited { retry_after_secs } => {
                FetchError::RateLimited { retry_after_secs }
            }
            TwitterError::Deserialize { .. } => FetchError::Malformed(err.to_string()),
            TwitterError::Http(_)
            | TwitterError::UnexpectedStatus { .. }
            | TwitterError::InvalidBaseUrl { .. } => FetchError::Transient(err.to_string()),
        }
    }
}

impl AccountProvider for TwitterClient {
    async fn get_account(&self, id: AccountId) -> Result<AccountSnapshot, FetchError> {
        let user = self.user_by_id(id).await?;
        Ok(user.into())
    }

    async fn get_account_by_screen_name(
        &self,
        screen_name: &str,
    ) -> Result<AccountSnapshot, FetchError> {
        let user = self.user_by_screen_name(screen_name).await?;
        Ok(user.into())
    }

    async fn get_timeline_page(
        &self,
        id: AccountId,
        page_size: u32,
        max_id: Option<u64>,
    ) -> Result<Vec<TweetRecord>, FetchError> {
        let page = self.user_timeline(id, page_size, max_id).await?;
        Ok(page.into_iter().map(TweetRecord::from).collect())
    }
}
