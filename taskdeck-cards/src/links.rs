//! Web links embedded in card titles

use url::Url;

/// Links found in a title, and the title with those words removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleLinks {
    pub urls: Vec<String>,
    pub remaining_title: String,
}

impl TitleLinks {
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

/// Find the link inside one whitespace-separated word, if any
fn link_in_word(word: &str) -> Option<String> {
    let start = word.find("https://").or_else(|| word.find("http://"))?;
    let candidate = word[start..].trim_end_matches(['.', ',', ';', ')', ']', '>', '"', '\'']);
    let parsed = Url::parse(candidate).ok()?;
    let host = parsed.host_str()?;
    host.contains('.').then(|| candidate.to_string())
}

/// Split a title into its links and the words that remain.
///
/// Every word containing a link is dropped from the remaining title. A title
/// made only of links keeps its original text so the card is never nameless.
pub fn extract_links(title: &str) -> TitleLinks {
    let mut urls = Vec::new();
    let mut words = Vec::new();
    for word in title.split_whitespace() {
        match link_in_word(word) {
            Some(url) => {
                if !urls.contains(&url) {
                    urls.push(url);
                }
            }
            None => words.push(word),
        }
    }
    let remaining_title = if words.is_empty() {
        title.trim().to_string()
    } else {
        words.join(" ")
    };
    TitleLinks {
        urls,
        remaining_title,
    }
}

/// Whether a title carries at least one link
pub fn has_link(title: &str) -> bool {
    title.split_whitespace().any(|w| link_in_word(w).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_and_strips() {
        let links = extract_links("Read https://example.com/post later");
        assert_eq!(links.urls, vec!["https://example.com/post"]);
        assert_eq!(links.remaining_title, "Read later");
    }

    #[test]
    fn test_trailing_punctuation_and_parens() {
        let links = extract_links("See (http://docs.rs/regex), thanks");
        assert_eq!(links.urls, vec!["http://docs.rs/regex"]);
        assert_eq!(links.remaining_title, "See thanks");
    }

    #[test]
    fn test_duplicates_collapse() {
        let links = extract_links("https://a.io x https://a.io");
        assert_eq!(links.urls, vec!["https://a.io"]);
        assert_eq!(links.remaining_title, "x");
    }

    #[test]
    fn test_link_only_title_is_kept() {
        let links = extract_links("https://example.com");
        assert_eq!(links.urls.len(), 1);
        assert_eq!(links.remaining_title, "https://example.com");
    }

    #[test]
    fn test_no_links() {
        assert!(extract_links("Buy milk").is_empty());
        assert!(!has_link("http://localhost is not a web link"));
        assert!(has_link("watch https://youtu.be/abc"));
    }
}
