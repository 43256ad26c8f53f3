//! Transport boundary: GET/PUT against a cluster endpoint.
//!
//! The engine only sees the [`ClusterClient`] trait; the reqwest-backed
//! [`HttpClient`] is the production implementation, tests substitute their
//! own. A 404 is surfaced as a distinct [`TransportError::NotFound`] so the
//! existence oracle can tell true absence from an ambiguous failure.

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

use crate::config::ClusterConfig;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("resource not found at {endpoint}")]
    NotFound { endpoint: String },

    #[error("request to {endpoint} failed with status {status}: {detail}")]
    Status {
        endpoint: String,
        status: u16,
        detail: String,
    },

    #[error("connection failed: {0}")]
    Connection(#[from] reqwest::Error),
}

#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// Fetch the raw body at `path` (relative to the cluster base URL).
    async fn get(&self, path: &str) -> Result<String, TransportError>;

    /// Write `body` to `path` on the cluster.
    async fn put(&self, path: &str, body: String) -> Result<(), TransportError>;
}

pub struct HttpClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Option<(String, String)>,
}

impl HttpClient {
    pub fn new(config: &ClusterConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.url.trim_end_matches('/').to_string(),
            credentials: config.credentials(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn with_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.credentials {
            Some((user, pass)) => req.basic_auth(user, Some(pass)),
            None => req,
        }
    }
}

#[async_trait]
impl ClusterClient for HttpClient {
    async fn get(&self, path: &str) -> Result<String, TransportError> {
        let endpoint = self.endpoint(path);
        let response = self.with_auth(self.http.get(&endpoint)).send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(TransportError::NotFound { endpoint });
        }
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                endpoint,
                status: status.as_u16(),
                detail,
            });
        }

        Ok(response.text().await?)
    }

    async fn put(&self, path: &str, body: String) -> Result<(), TransportError> {
        let endpoint = self.endpoint(path);
        let response = self
            .with_auth(self.http.put(&endpoint))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(TransportError::NotFound { endpoint });
        }
        if !status.is_success() {
            // The cluster's error body usually names the offending field;
            // carry it into the ledger instead of just the status line.
            let detail = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                endpoint,
                status: status.as_u16(),
                detail,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slash() {
        let config = ClusterConfig {
            url: "http://localhost:9200/".to_string(),
            username: None,
            password: None,
        };
        let client = HttpClient::new(&config);
        assert_eq!(
            client.endpoint("/_cat/indices?format=json"),
            "http://localhost:9200/_cat/indices?format=json"
        );
        assert_eq!(client.endpoint("my-index/"), "http://localhost:9200/my-index/");
    }

    #[test]
    fn not_found_is_a_distinct_variant() {
        let err = TransportError::NotFound {
            endpoint: "http://localhost:9200/_scripts/missing".to_string(),
        };
        assert!(matches!(err, TransportError::NotFound { .. }));
        assert!(err.to_string().contains("_scripts/missing"));
    }
}
