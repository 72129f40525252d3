/// Prefix of embedded media URLs; these are not counted as links.
const MEDIA_PREFIX: &str = "https://pbs.twimg.com/";

/// Returns the space-separated tokens of `text` that contain `http`, and the
/// total number of `http` occurrences, after stripping embedded media URL
/// prefixes.
#[must_use]
pub fn tweet_links(text: &str) -> (Vec<String>, usize) {
    let stripped = text.replace(MEDIA_PREFIX, "");
    let links = stripped
        .split(' ')
        .filter(|token| token.contains("http"))
        .map(str::to_owned)
        .collect();
    let count = stripped.matches("http").count();
    (links, count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_links_between_words() {
        let (links, count) = tweet_links("read this https://t.co/abc and http://example.com/x now");
        assert_eq!(links, vec!["https://t.co/abc", "http://example.com/x"]);
        assert_eq!(count, 2);
    }

    #[test]
    fn media_urls_are_ignored() {
        let (links, count) = tweet_links("pic https://pbs.twimg.com/media/abc.jpg");
        assert!(links.is_empty());
        assert_eq!(count, 0);
    }

    #[test]
    fn text_without_links() {
        let (links, count) = tweet_links("just words");
        assert!(links.is_empty());
        assert_eq!(count, 0);
    }
}
