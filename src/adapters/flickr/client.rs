//! Flickr REST client
//!
//! Implements [`PhotoSource`] over the Flickr JSON REST endpoint. Every call
//! is a `GET` with `method`, `api_key`, `format=json` and `nojsoncallback=1`;
//! transient failures are retried with exponential backoff.

use super::models::{Envelope, LicensesResponse, PoolPhotosResponse};
use super::source::PhotoSource;
use crate::config::FlickrConfig;
use crate::domain::{FlickrError, HarvesterError, LicenseTable, PageRequest, PhotoPage, Result};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

pub const POOL_PHOTOS_METHOD: &str = "flickr.groups.pools.getPhotos";
pub const LICENSES_METHOD: &str = "flickr.photos.licenses.getInfo";

/// Flickr API client
pub struct FlickrClient {
    endpoint: Url,
    client: Client,
    config: FlickrConfig,
}

impl FlickrClient {
    /// Create a new client
    ///
    /// # Errors
    ///
    /// Returns a configuration error when `base_url` does not parse or the
    /// HTTP client cannot be built.
    pub fn new(config: FlickrConfig) -> Result<Self> {
        let endpoint = Url::parse(&config.base_url).map_err(|e| {
            HarvesterError::Configuration(format!(
                "Invalid flickr.base_url '{}': {e}",
                config.base_url
            ))
        })?;

        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(30))
            .user_agent(concat!("flickr-harvester/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                HarvesterError::Configuration(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            endpoint,
            client,
            config,
        })
    }

    /// Query parameters for a pool page request
    fn pool_params(request: &PageRequest) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("group_id", request.group_id().to_string()),
            ("per_page", request.per_page().to_string()),
            ("page", request.page().to_string()),
        ];
        if let Some(user_id) = request.user_id() {
            params.push(("user_id", user_id.to_string()));
        }
        if !request.machine_tags().is_empty() {
            params.push(("tags", request.machine_tags().join(" ")));
        }
        if !request.extras().is_empty() {
            params.push(("extras", request.extras().join(",")));
        }
        params
    }

    /// Issue one API call and decode the `stat = ok` payload
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &[(&'static str, String)],
    ) -> Result<T> {
        let api_key: &str = self.config.api_key.expose_secret().as_ref();
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[
                ("method", method),
                ("api_key", api_key),
                ("format", "json"),
                ("nojsoncallback", "1"),
            ])
            .query(params)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FlickrError::Timeout(e.to_string())
                } else {
                    FlickrError::ConnectionFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            return Err(FlickrError::ServerError {
                status: status.as_u16(),
                message: body,
            }
            .into());
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FlickrError::ClientError {
                status: status.as_u16(),
                message: body,
            }
            .into());
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| FlickrError::InvalidResponse(e.to_string()))?;

        let envelope: Envelope = serde_json::from_value(body.clone())
            .map_err(|e| FlickrError::InvalidResponse(format!("missing stat: {e}")))?;
        envelope.check()?;

        serde_json::from_value(body)
            .map_err(|e| FlickrError::InvalidResponse(format!("{method}: {e}")).into())
    }

    /// Retry a request with exponential backoff
    ///
    /// Only retryable failures (connection, timeout, 5xx) are retried.
    async fn retry_request<F, T, Fut>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let retry = &self.config.retry;
        let max_attempts = retry.max_retries.max(1);
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    attempt += 1;
                    if attempt >= max_attempts || !e.is_retryable() {
                        return Err(e);
                    }

                    let factor = retry.backoff_multiplier.powi(attempt as i32 - 1);
                    let delay_ms = ((retry.initial_delay_ms as f64) * factor) as u64;
                    let delay_ms = delay_ms.min(retry.max_delay_ms);

                    crate::log_retry_attempt!(attempt, max_attempts, delay_ms, e);

                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
            }
        }
    }
}

#[async_trait]
impl PhotoSource for FlickrClient {
    async fn fetch_page(&self, request: &PageRequest) -> Result<PhotoPage> {
        let params = Self::pool_params(request);
        tracing::debug!(
            group_id = %request.group_id(),
            page = request.page(),
            per_page = request.per_page(),
            "Requesting pool page"
        );

        let response: PoolPhotosResponse = self
            .retry_request(|| self.call(POOL_PHOTOS_METHOD, &params))
            .await?;

        response.photos.into_page()
    }

    async fn fetch_licenses(&self) -> Result<LicenseTable> {
        let response: LicensesResponse = self
            .retry_request(|| self.call(LICENSES_METHOD, &[]))
            .await?;
        let table = response.licenses.into_table();
        tracing::info!(licenses = table.len(), "Got licenses from Flickr");
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PoolQuery;

    #[test]
    fn test_pool_params() {
        let query = PoolQuery {
            group_id: "806927@N20".to_string(),
            user_id: Some("1@N01".to_string()),
            machine_tags: vec!["taxonomy:".to_string(), "geo:".to_string()],
            extras: vec!["geo".to_string(), "tags".to_string()],
            per_page: 50,
        };
        let request = PageRequest::new(&query, 4).unwrap();
        let params = FlickrClient::pool_params(&request);

        assert!(params.contains(&("group_id", "806927@N20".to_string())));
        assert!(params.contains(&("user_id", "1@N01".to_string())));
        assert!(params.contains(&("tags", "taxonomy: geo:".to_string())));
        assert!(params.contains(&("extras", "geo,tags".to_string())));
        assert!(params.contains(&("per_page", "50".to_string())));
        assert!(params.contains(&("page", "4".to_string())));
    }

    #[test]
    fn test_pool_params_omit_empty_filters() {
        let query = PoolQuery {
            group_id: "g".to_string(),
            per_page: 100,
            ..Default::default()
        };
        let request = PageRequest::new(&query, 1).unwrap();
        let params = FlickrClient::pool_params(&request);
        assert!(params.iter().all(|(k, _)| *k != "user_id" && *k != "tags" && *k != "extras"));
    }
}
