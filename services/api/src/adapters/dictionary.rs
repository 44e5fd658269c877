//! services/api/src/adapters/dictionary.rs
//!
//! This module contains the adapter for the public dictionary API.
//! It implements the `DictionaryService` port from the `core` crate.

use async_trait::async_trait;
use reqwest::{Client, Url};
use saily_core::ports::{DictionaryLookup, DictionaryService, PortError, PortResult};
use serde_json::Value;
use tracing::debug;

/// An adapter that implements `DictionaryService` with a single GET per word.
#[derive(Clone)]
pub struct HttpDictionaryAdapter {
    client: Client,
    base_url: Url,
}

impl HttpDictionaryAdapter {
    /// Creates a new `HttpDictionaryAdapter` that looks words up under `base_url`.
    pub fn new(client: Client, base_url: &str) -> PortResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| PortError::InvalidInput(format!("dictionary url: {}", e)))?;
        if base_url.cannot_be_a_base() {
            return Err(PortError::InvalidInput(format!(
                "dictionary url '{}' cannot be a base",
                base_url
            )));
        }
        Ok(Self { client, base_url })
    }

    fn word_url(&self, word: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(word);
        }
        url
    }
}

#[async_trait]
impl DictionaryService for HttpDictionaryAdapter {
    async fn lookup(&self, word: &str) -> PortResult<DictionaryLookup> {
        let url = self.word_url(word);
        debug!(%url, "Looking up word");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        // Any non-success status counts as "no definition" rather than a failure.
        if !response.status().is_success() {
            debug!(word, status = %response.status(), "Dictionary has no entry");
            return Ok(DictionaryLookup::NotFound);
        }

        let details = response
            .json::<Value>()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(DictionaryLookup::Found(details))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn adapter(server: &MockServer) -> HttpDictionaryAdapter {
        HttpDictionaryAdapter::new(Client::new(), &format!("{}/api/v2/entries/en", server.uri()))
            .expect("valid url")
    }

    #[tokio::test]
    async fn returns_definition_payload() {
        let server = MockServer::start().await;
        let body = json!([{ "word": "lucid", "meanings": [] }]);
        Mock::given(method("GET"))
            .and(path("/api/v2/entries/en/lucid"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
            .expect(1)
            .mount(&server)
            .await;

        let result = adapter(&server).lookup("lucid").await.unwrap();

        assert_eq!(result, DictionaryLookup::Found(body));
    }

    #[tokio::test]
    async fn missing_word_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({ "title": "No Definitions Found" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let result = adapter(&server).lookup("qwxz").await.unwrap();

        assert_eq!(result, DictionaryLookup::NotFound);
    }

    #[tokio::test]
    async fn unparsable_body_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let result = adapter(&server).lookup("lucid").await;

        assert!(matches!(result, Err(PortError::Unexpected(_))));
    }

    #[tokio::test]
    async fn unreachable_host_is_an_error() {
        let adapter = HttpDictionaryAdapter::new(Client::new(), "http://127.0.0.1:9/entries").unwrap();
        assert!(adapter.lookup("lucid").await.is_err());
    }

    #[test]
    fn trailing_slash_in_base_is_tolerated() {
        let adapter = HttpDictionaryAdapter::new(Client::new(), "https://dict.test/entries/en/").unwrap();
        assert_eq!(adapter.word_url("zenith").as_str(), "https://dict.test/entries/en/zenith");
    }
}
