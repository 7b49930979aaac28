//! reqwest implementation of `LawApi`
//!
//! Issues `GET {base_url}/{segments...}?{query}` against the e-Gov law API v2.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Url};

use super::{ApiResponse, LawApi};
use crate::error::{LawsError, Result};
use crate::tools::OutboundRequest;

/// e-Gov law API v2 base URL
pub const DEFAULT_BASE_URL: &str = "https://elaws.e-gov.go.jp/api/2";

/// HTTP client bound to one base URL
#[derive(Debug, Clone)]
pub struct HttpLawApi {
    client: Client,
    base_url: Url,
    timeout: Duration,
}

impl HttpLawApi {
    /// Create a client against `base_url` with a per-request timeout
    pub fn new(base_url: &str, timeout: Duration, user_agent: &str) -> Result<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| LawsError::Config(format!("Invalid base URL '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(LawsError::Config(format!("Base URL '{}' cannot carry a path", base_url)));
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| LawsError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Full URL for a request. Each segment is percent-encoded on its own, so
    /// an identifier can never add path components.
    pub fn url_for(&self, request: &OutboundRequest) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| LawsError::Config(format!("Base URL '{}' cannot carry a path", self.base_url)))?
            .pop_if_empty()
            .extend(request.segments());
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(request.query.iter());
        }
        Ok(url)
    }

    fn classify(&self, err: reqwest::Error) -> LawsError {
        if err.is_timeout() {
            LawsError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
            }
        } else {
            LawsError::Http(err)
        }
    }
}

#[async_trait]
impl LawApi for HttpLawApi {
    async fn get(&self, request: &OutboundRequest) -> Result<ApiResponse> {
        let url = self.url_for(request)?;
        log::debug!("{} {}", request.method, url);

        let response = self
            .client
            .request(request.method.clone(), url)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let body = response.bytes().await.map_err(|e| self.classify(e))?.to_vec();

        ApiResponse {
            status,
            content_type,
            body,
        }
        .into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(base: &str) -> HttpLawApi {
        HttpLawApi::new(base, Duration::from_secs(5), "test-agent").unwrap()
    }

    #[test]
    fn test_url_for_list() {
        let request = OutboundRequest::get(["laws"]).with_query("limit", "5").with_query("law_title", "建築基準法");
        let url = api(DEFAULT_BASE_URL).url_for(&request).unwrap();

        assert_eq!(url.path(), "/api/2/laws");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("limit".to_string(), "5".to_string()),
                ("law_title".to_string(), "建築基準法".to_string()),
            ]
        );
    }

    #[test]
    fn test_url_for_trailing_slash_base() {
        let url = api("http://localhost:8080/api/2/").url_for(&OutboundRequest::get(["laws"])).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/2/laws");
    }

    #[test]
    fn test_url_for_encodes_identifier_segment() {
        let request = OutboundRequest::get(["law_data", "a/../b"]);
        let url = api(DEFAULT_BASE_URL).url_for(&request).unwrap();
        assert_eq!(url.path(), "/api/2/law_data/a%2F..%2Fb");
    }

    #[test]
    fn test_url_for_without_query() {
        let url = api(DEFAULT_BASE_URL)
            .url_for(&OutboundRequest::get(["law_file", "json", "L1"]))
            .unwrap();
        assert_eq!(url.query(), None);
        assert_eq!(url.path(), "/api/2/law_file/json/L1");
    }

    #[test]
    fn test_invalid_base_url() {
        let err = HttpLawApi::new("not a url", Duration::from_secs(1), "x").unwrap_err();
        assert!(matches!(err, LawsError::Config(_)));

        let err = HttpLawApi::new("mailto:someone@example.com", Duration::from_secs(1), "x").unwrap_err();
        assert!(matches!(err, LawsError::Config(_)));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_failure() {
        let api = HttpLawApi::new("http://127.0.0.1:9/api/2", Duration::from_millis(500), "x").unwrap();
        let err = api.get(&OutboundRequest::get(["laws"])).await.unwrap_err();
        assert!(err.is_transport_failure());
    }
}
