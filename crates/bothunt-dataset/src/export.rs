//! Timeline export to CSV.

use std::fs;
use std::io::Write;
use std::path::Path;

use bothunt_core::TweetRecord;
use bothunt_features::tweet_links;

use crate::error::DatasetError;

const TWEET_HEADER: [&str; 4] = ["id", "created_at", "text", "link_count"];

/// Writes one row per tweet: id, RFC 3339 timestamp, text, and the number of
/// links in the text.
///
/// # Errors
///
/// Returns [`DatasetError::Csv`] on write failure.
pub fn write_tweets<W: Write>(writer: W, tweets: &[TweetRecord]) -> Result<(), DatasetError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(TWEET_HEADER)?;
    for tweet in tweets {
        let (_, link_count) = tweet_links(&tweet.text);
        csv_writer.write_record([
            tweet.id.to_string(),
            tweet.created_at.to_rfc3339(),
            tweet.text.clone(),
            link_count.to_string(),
        ])?;
    }
    csv_writer
        .flush()
        .map_err(|e| DatasetError::Csv(csv::Error::from(e)))?;
    Ok(())
}

/// [`write_tweets`] to a file, creating parent directories.
///
/// # Errors
///
/// [`DatasetError::Io`] if the file cannot be created, otherwise as
/// [`write_tweets`].
pub fn export_tweets(path: &Path, tweets: &[TweetRecord]) -> Result<(), DatasetError> {
    let io_error = |source| DatasetError::Io {
        path: path.display().to_string(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error)?;
    }
    let file = fs::File::create(path).map_err(io_error)?;
    write_tweets(file, tweets)?;
    tracing::info!(path = %path.display(), tweets = tweets.len(), "tweets exported");
    Ok(())
}
