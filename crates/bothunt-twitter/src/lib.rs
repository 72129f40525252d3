//! Client for the Twitter v1.1 REST API.
//!
//! Covers the two endpoints feature extraction needs (`users/show` and
//! `statuses/user_timeline`), maps platform failures onto typed errors, and
//! retries transient ones. [`TwitterClient`] implements
//! [`bothunt_core::AccountProvider`].

pub mod client;
pub mod error;
pub mod types;

mod provider;
mod rate_limit;

pub use client::TwitterClient;
pub use error::TwitterError;
pub use types::{ApiTweet, ApiUser};
