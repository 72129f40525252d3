//! The account/timeline data source seam.
//!
//! Feature filling and account classification take an [`AccountProvider`] as
//! an explicit parameter. The production implementation talks to the Twitter
//! REST API; tests substitute in-memory fakes.

use crate::account::{AccountId, AccountSnapshot, TweetRecord};
use crate::error::FetchError;

/// Upper bound on timeline pages per account.
///
/// The API stops serving history after ~3 200 tweets (16 pages of 200), so
/// hitting this limit means the cursor is not advancing.
pub const MAX_TIMELINE_PAGES: usize = 100;

/// Source of account snapshots and timeline pages.
#[allow(async_fn_in_trait)]
pub trait AccountProvider {
    /// Looks up the current profile of the account with the given id.
    async fn get_account(&self, id: AccountId) -> Result<AccountSnapshot, FetchError>;

    /// Looks up an account by its screen name (the `@handle` without `@`).
    async fn get_account_by_screen_name(
        &self,
        screen_name: &str,
    ) -> Result<AccountSnapshot, FetchError>;

    /// Fetches one page of at most `page_size` tweets, newest first, with ids
    /// no greater than `max_id` when given.
    async fn get_timeline_page(
        &self,
        id: AccountId,
        page_size: u32,
        max_id: Option<u64>,
    ) -> Result<Vec<TweetRecord>, FetchError>;

    /// Fetches an account's entire available timeline.
    ///
    /// Walks pages backwards in time using the oldest id seen so far minus
    /// one as the next `max_id`, until a page comes back empty. Ids strictly
    /// decrease between pages, so no tweet is returned twice.
    ///
    /// All-or-nothing: if any page fails, tweets from earlier pages are
    /// discarded and the error is returned.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`Self::get_timeline_page`], or
    /// [`FetchError::PaginationLimit`] after [`MAX_TIMELINE_PAGES`] non-empty
    /// pages.
    async fn fetch_timeline(
        &self,
        id: AccountId,
        page_size: u32,
    ) -> Result<Vec<TweetRecord>, FetchError> {
        let mut all_tweets: Vec<TweetRecord> = Vec::new();
        let mut max_id: Option<u64> = None;

        for page_number in 1..=MAX_TIMELINE_PAGES {
            let page = self.get_timeline_page(id, page_size, max_id).await?;
            let Some(oldest) = page.iter().map(|t| t.id).min() else {
                return Ok(all_tweets);
            };
            tracing::debug!(
                account_id = id,
                page = page_number,
                tweets = page.len(),
                oldest,
                "fetched timeline page"
            );
            all_tweets.extend(page);
            if oldest == 0 {
                return Ok(all_tweets);
            }
            max_id = Some(oldest - 1);
        }

        Err(FetchError::PaginationLimit {
            max_pages: MAX_TIMELINE_PAGES,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use chrono::{TimeZone, Utc};

    use super::*;

    /// Serves a fixed descending id range in pages and records every `max_id`.
    struct PagedTimeline {
        ids: Vec<u64>,
        requested: RefCell<Vec<Option<u64>>>,
        fail_on_call: Option<usize>,
    }

    impl PagedTimeline {
        fn new(ids: Vec<u64>) -> Self {
            Self {
                ids,
                requested: RefCell::new(Vec::new()),
                fail_on_call: None,
            }
        }
    }

    impl AccountProvider for PagedTimeline {
        async fn get_account(&self, _id: AccountId) -> Result<AccountSnapshot, FetchError> {
            Err(FetchError::NotFound)
        }

        async fn get_account_by_screen_name(
            &self,
            _screen_name: &str,
        ) -> Result<AccountSnapshot, FetchError> {
            Err(FetchError::NotFound)
        }

        async fn get_timeline_page(
            &self,
            _id: AccountId,
            page_size: u32,
            max_id: Option<u64>,
        ) -> Result<Vec<TweetRecord>, FetchError> {
            let call = {
                let mut requested = self.requested.borrow_mut();
                requested.push(max_id);
                requested.len()
            };
            if self.fail_on_call == Some(call) {
                return Err(FetchError::Transient("connection reset".to_owned()));
            }
            let created_at = Utc.with_ymd_and_hms(2021, 3, 1, 12, 0, 0).unwrap();
            Ok(self
                .ids
                .iter()
                .copied()
                .filter(|id| max_id.is_none_or(|max| *id <= max))
                .take(page_size as usize)
                .map(|id| TweetRecord {
                    id,
                    created_at,
                    text: format!("tweet {id}"),
                })
                .collect())
        }
    }

    #[tokio::test]
    async fn walks_pages_with_oldest_minus_one_cursor() {
        let provider = PagedTimeline::new(vec![50, 40, 30, 20, 10]);
        let tweets = provider.fetch_timeline(7, 2).await.unwrap();

        let ids: Vec<u64> = tweets.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![50, 40, 30, 20, 10]);
        assert_eq!(
            *provider.requested.borrow(),
            vec![None, Some(39), Some(19), Some(9)]
        );
    }

    #[tokio::test]
    async fn empty_first_page_yields_empty_timeline() {
        let provider = PagedTimeline::new(vec![]);
        let tweets = provider.fetch_timeline(7, 200).await.unwrap();
        assert!(tweets.is_empty());
        assert_eq!(provider.requested.borrow().len(), 1);
    }

    #[tokio::test]
    async fn failed_page_discards_earlier_pages() {
        let mut provider = PagedTimeline::new(vec![5, 4, 3, 2, 1]);
        provider.fail_on_call = Some(2);
        let result = provider.fetch_timeline(7, 2).await;
        assert!(matches!(result, Err(FetchError::Transient(_))));
    }
}
