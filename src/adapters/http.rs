use crate::config::toml_config::FetchConfig;
use crate::domain::model::Source;
use crate::utils::error::{HunterError, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;

/// Thin JSON-over-HTTP client shared by the provider adapters.
#[derive(Debug, Clone)]
pub struct ProviderClient {
    source: Source,
    client: Client,
    headers: HeaderMap,
    timeout: Duration,
    rate_limit_backoff: Duration,
}

impl ProviderClient {
    pub fn new(source: Source, fetch: &FetchConfig) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        Self {
            source,
            client: Client::new(),
            headers,
            timeout: Duration::from_secs(fetch.timeout_seconds),
            rate_limit_backoff: Duration::from_secs(fetch.rate_limit_backoff_seconds),
        }
    }

    /// Header names or values that are not valid HTTP are skipped with a warning.
    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        match (HeaderName::try_from(key), HeaderValue::try_from(value)) {
            (Ok(name), Ok(mut value)) => {
                value.set_sensitive(true);
                self.headers.insert(name, value);
            }
            _ => tracing::warn!("⚠️ [{}] Skipping invalid header {}", self.source, key),
        }
        self
    }

    async fn send(&self, url: &str, params: &[(&str, String)]) -> Result<reqwest::Response> {
        let request = self
            .client
            .get(url)
            .query(params)
            .headers(self.headers.clone())
            .timeout(self.timeout);

        tracing::debug!("[{}] GET {}", self.source, url);
        let response = request.send().await?;
        tracing::debug!("[{}] API response status: {}", self.source, response.status());
        Ok(response)
    }

    /// GET returning parsed JSON. A 429 is retried once after the configured
    /// backoff; any other non-success status is an error.
    pub async fn get_json(&self, url: &str, params: &[(&str, String)]) -> Result<Value> {
        let mut response = self.send(url, params).await?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            tracing::warn!(
                "⏳ [{}] Rate limited. Waiting {}s...",
                self.source,
                self.rate_limit_backoff.as_secs()
            );
            tokio::time::sleep(self.rate_limit_backoff).await;
            response = self.send(url, params).await?;

            if response.status() == StatusCode::TOO_MANY_REQUESTS {
                return Err(HunterError::RateLimited {
                    provider: self.source.to_string(),
                });
            }
        }

        let status = response.status();
        if !status.is_success() {
            return Err(HunterError::provider(
                self.source.as_str(),
                format!("HTTP {}", status),
            ));
        }

        let body = response.text().await?;
        let json = serde_json::from_str(&body)?;
        Ok(json)
    }

    /// Like [`get_json`](Self::get_json) but logs the failure and yields `None`.
    pub async fn get_json_or_log(&self, url: &str, params: &[(&str, String)]) -> Option<Value> {
        match self.get_json(url, params).await {
            Ok(json) => Some(json),
            Err(HunterError::SerializationError(e)) => {
                tracing::error!("❌ [{}] Invalid JSON response: {}", self.source, e);
                None
            }
            Err(e) => {
                tracing::error!("❌ [{}] Request failed: {}", self.source, e);
                None
            }
        }
    }
}

/// Price bounds shared by every provider, under provider-specific names.
pub fn price_params(
    min_price: Option<u32>,
    max_price: Option<u32>,
    min_key: &'static str,
    max_key: &'static str,
) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    if let Some(max) = max_price.filter(|p| *p > 0) {
        params.push((max_key, max.to_string()));
    }
    if let Some(min) = min_price.filter(|p| *p > 0) {
        params.push((min_key, min.to_string()));
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn fast_fetch() -> FetchConfig {
        FetchConfig {
            timeout_seconds: 5,
            rate_limit_backoff_seconds: 0,
            ..FetchConfig::default()
        }
    }

    #[tokio::test]
    async fn test_get_json_sends_headers_and_params() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/listings")
                .query_param("city", "San Francisco")
                .header("X-Api-Key", "secret");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!([{"id": "1"}]));
        });

        let client = ProviderClient::new(Source::RentCast, &fast_fetch()).with_header("X-Api-Key", "secret");
        let json = client
            .get_json(&server.url("/listings"), &[("city", "San Francisco".to_string())])
            .await
            .unwrap();

        api_mock.assert();
        assert_eq!(json[0]["id"], "1");
    }

    #[tokio::test]
    async fn test_invalid_header_is_skipped() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/listings")
                .header("accept", "application/json")
                .header("x-rapidapi-key", "good");
            then.status(200).json_body(serde_json::json!({"props": []}));
        });

        let client = ProviderClient::new(Source::Zillow, &fast_fetch())
            .with_header("x-rapidapi-key", "good")
            .with_header("x-rapidapi-host", "bad\nvalue");
        let json = client.get_json(&server.url("/listings"), &[]).await.unwrap();

        api_mock.assert();
        assert_eq!(client.headers.len(), 2);
        assert!(json["props"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rate_limit_is_retried_once() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/limited");
            then.status(429);
        });

        let client = ProviderClient::new(Source::Zillow, &fast_fetch());
        let result = client.get_json(&server.url("/limited"), &[]).await;

        api_mock.assert_hits(2);
        assert!(matches!(result, Err(HunterError::RateLimited { .. })));
    }

    #[tokio::test]
    async fn test_server_error_is_not_retried() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/broken");
            then.status(500);
        });

        let client = ProviderClient::new(Source::Redfin, &fast_fetch());
        let result = client.get_json_or_log(&server.url("/broken"), &[]).await;

        api_mock.assert_hits(1);
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_invalid_json_yields_none() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/html");
            then.status(200).body("<html>not json</html>");
        });

        let client = ProviderClient::new(Source::RentCast, &fast_fetch());
        assert!(client.get_json_or_log(&server.url("/html"), &[]).await.is_none());
    }

    #[test]
    fn test_price_params_skip_unset_bounds() {
        let params = price_params(None, Some(8000), "minPrice", "maxPrice");
        assert_eq!(params, vec![("maxPrice", "8000".to_string())]);
        assert!(price_params(None, None, "minPrice", "maxPrice").is_empty());
    }
}
