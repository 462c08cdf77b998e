use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::config::Config;
use crate::error::WordSourceError;
use crate::generator::{WordSource, fallback, normalize_words};

/// Tries each remote endpoint in order, then the built-in list.
///
/// URLs may contain `{count}`, which is replaced with the requested pool size.
pub struct RemoteWordSource {
    urls: Vec<String>,
    timeout: Duration,
    rng: SmallRng,
}

impl RemoteWordSource {
    pub fn new(urls: Vec<String>, timeout: Duration) -> Self {
        Self {
            urls,
            timeout,
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let urls = vec![config.primary_word_url.clone(), config.secondary_word_url.clone()];
        Self::new(urls, Duration::from_secs(config.fetch_timeout_secs))
    }

    fn try_fetch(&self, url: &str, count: usize) -> Result<Vec<String>, WordSourceError> {
        let url = url.replace("{count}", &count.to_string());
        let body = fetch_url(&url, self.timeout)?;
        parse_word_list(&body)
    }
}

impl WordSource for RemoteWordSource {
    fn fetch_words(&mut self, count: usize) -> Vec<String> {
        for url in &self.urls {
            match self.try_fetch(url, count) {
                Ok(words) => {
                    tracing::debug!(url = %url, words = words.len(), "Fetched word pool");
                    return words;
                }
                Err(e) => tracing::warn!(url = %url, error = %e, "Word source failed, trying next"),
            }
        }
        tracing::info!("Using built-in word list");
        fallback::sample(count, &mut self.rng)
    }
}

/// Parse a JSON array of words and keep the usable ones.
pub fn parse_word_list(body: &str) -> Result<Vec<String>, WordSourceError> {
    let raw: Vec<String> = serde_json::from_str(body)?;
    let words = normalize_words(raw);
    if words.is_empty() {
        return Err(WordSourceError::Empty);
    }
    Ok(words)
}

#[cfg(feature = "network")]
pub fn fetch_url(url: &str, timeout: Duration) -> Result<String, WordSourceError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| WordSourceError::Http(e.to_string()))?;
    let response = client
        .get(url)
        .send()
        .map_err(|e| WordSourceError::Http(e.to_string()))?;
    let status = response.status();
    if !status.is_success() {
        return Err(WordSourceError::Status(status.as_u16()));
    }
    response
        .text()
        .map_err(|e| WordSourceError::Http(e.to_string()))
}

#[cfg(not(feature = "network"))]
pub fn fetch_url(_url: &str, _timeout: Duration) -> Result<String, WordSourceError> {
    Err(WordSourceError::Disabled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_keeps_usable_words() {
        let words = parse_word_list(r#"["Apple", "an", "keyboard", "supercalifragilistic"]"#).unwrap();
        assert_eq!(words, vec!["apple", "keyboard"]);
    }

    #[test]
    fn parse_rejects_empty_and_malformed() {
        assert!(matches!(parse_word_list(r#"["a", "bb"]"#), Err(WordSourceError::Empty)));
        assert!(matches!(parse_word_list("not json"), Err(WordSourceError::Parse(_))));
        assert!(matches!(parse_word_list(r#"{"words": []}"#), Err(WordSourceError::Parse(_))));
    }

    #[test]
    fn unreachable_sources_fall_back_to_built_in_list() {
        let mut source = RemoteWordSource::new(
            vec![
                "http://127.0.0.1:9/words?n={count}".to_string(),
                "not a url".to_string(),
            ],
            Duration::from_millis(200),
        );
        let words = source.fetch_words(20);
        assert_eq!(words.len(), 20);
        assert!(words.iter().all(|w| fallback::words().contains(w)));
    }

    #[test]
    fn config_urls_are_tried_in_order() {
        let config = Config {
            primary_word_url: "http://a/{count}".to_string(),
            secondary_word_url: "http://b/{count}".to_string(),
            fetch_timeout_secs: 2,
            ..Config::default()
        };
        let source = RemoteWordSource::from_config(&config);
        assert_eq!(source.urls, vec!["http://a/{count}", "http://b/{count}"]);
        assert_eq!(source.timeout, Duration::from_secs(2));
    }
}
