//! Behavioural feature extraction for Twitter accounts.
//!
//! Every function here is pure: given an optional account snapshot, an
//! optional tweet list and the current instant, it derives one feature.
//! Missing inputs produce `None` (a `Null` cell), never an error.

pub mod extract;
pub mod histogram;
pub mod links;

pub use extract::{
    average_daily_tweets, bio_is_empty, compute, compute_feature, friends_followers_ratio,
    has_default_image, inactive_days, is_protected, is_verified, time_of_existence,
    DEFAULT_PROFILE_IMAGE_URL,
};
pub use histogram::{AverageMode, TweetHistogram, UnknownAverageMode};
pub use links::tweet_links;
