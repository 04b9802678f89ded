//! HTTP client for the route service

use super::{ApiError, ApiResult, RouteApi};
use async_trait::async_trait;
use reqwest::{Client, Request, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use strava_route_lib::{RouteDetails, RouteId, RouteStats, RouteSummary};

/// Connection settings for [`HttpRouteApi`]
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Prefix of every endpoint, e.g. `http://localhost:8000/api`
    pub base_url: String,
    /// Sent verbatim as a bearer token
    pub token: Option<String>,
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
            token: None,
            timeout: Duration::from_secs(10),
        }
    }
}

/// [`RouteApi`] over REST
pub struct HttpRouteApi {
    http: Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpRouteApi {
    pub fn new(config: ApiConfig) -> ApiResult<Self> {
        // A trailing slash makes `Url::join` append instead of replacing the last segment
        let mut base = config.base_url.trim_end_matches('/').to_string();
        base.push('/');
        let base_url = Url::parse(&base).map_err(|err| ApiError::BaseUrl {
            url: config.base_url.clone(),
            message: err.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::BaseUrl {
                url: config.base_url,
                message: "not a hierarchical URL".to_string(),
            });
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ApiError::Client)?;

        tracing::info!("Route API at {} (timeout {:?})", base_url, config.timeout);
        Ok(Self {
            http,
            base_url,
            token: config.token.filter(|token| !token.is_empty()),
        })
    }

    fn endpoint(&self, path: &str) -> ApiResult<Url> {
        self.base_url.join(path).map_err(|err| ApiError::BaseUrl {
            url: self.base_url.to_string(),
            message: err.to_string(),
        })
    }

    fn request(&self, path: &str, query: &[(&str, &str)]) -> ApiResult<Request> {
        let url = self.endpoint(path)?;
        let mut builder = self
            .http
            .get(url.clone())
            .header(reqwest::header::ACCEPT, "application/json");
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        builder.build().map_err(|source| ApiError::Transport {
            url: url.to_string(),
            source,
        })
    }

    pub(crate) fn search_request(&self, query: &str) -> ApiResult<Request> {
        self.request("routes/search", &[("q", query)])
    }

    pub(crate) fn details_request(&self, id: RouteId) -> ApiResult<Request> {
        self.request(&format!("routes/{id}"), &[])
    }

    pub(crate) fn stats_request(&self, id: RouteId) -> ApiResult<Request> {
        self.request(&format!("routes/{id}/stats"), &[])
    }

    async fn fetch<T: DeserializeOwned>(&self, request: Request) -> ApiResult<T> {
        let url = request.url().to_string();
        tracing::debug!("GET {}", url);

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|source| ApiError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| ApiError::Transport {
                url: url.clone(),
                source,
            })?;
        serde_json::from_slice(&body).map_err(|source| ApiError::Decode { url, source })
    }
}

#[async_trait]
impl RouteApi for HttpRouteApi {
    async fn search(&self, query: &str) -> ApiResult<Vec<RouteSummary>> {
        let request = self.search_request(query)?;
        self.fetch(request).await
    }

    async fn get_details(&self, id: RouteId) -> ApiResult<RouteDetails> {
        let request = self.details_request(id)?;
        self.fetch(request).await
    }

    async fn get_stats(&self, id: RouteId) -> ApiResult<RouteStats> {
        let request = self.stats_request(id)?;
        self.fetch(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(base_url: &str, token: Option<&str>) -> HttpRouteApi {
        HttpRouteApi::new(ApiConfig {
            base_url: base_url.to_string(),
            token: token.map(str::to_string),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_search_url_encodes_query() {
        let request = api("http://localhost:8000/api", None)
            .search_request("morning ride & climb")
            .unwrap();
        assert_eq!(
            request.url().as_str(),
            "http://localhost:8000/api/routes/search?q=morning+ride+%26+climb"
        );
    }

    #[test]
    fn test_detail_and_stats_urls() {
        let api = api("https://example.com/api/", None);
        assert_eq!(
            api.details_request(42).unwrap().url().as_str(),
            "https://example.com/api/routes/42"
        );
        assert_eq!(
            api.stats_request(42).unwrap().url().as_str(),
            "https://example.com/api/routes/42/stats"
        );
    }

    #[test]
    fn test_bearer_token_is_sent_when_configured() {
        let request = api("http://localhost/api", Some("secret"))
            .details_request(1)
            .unwrap();
        assert_eq!(
            request.headers().get(reqwest::header::AUTHORIZATION).unwrap(),
            "Bearer secret"
        );

        let request = api("http://localhost/api", Some("")).details_request(1).unwrap();
        assert!(request.headers().get(reqwest::header::AUTHORIZATION).is_none());
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let result = HttpRouteApi::new(ApiConfig {
            base_url: "not a url".to_string(),
            ..Default::default()
        });
        assert!(matches!(result, Err(ApiError::BaseUrl { .. })));
    }

    #[test]
    fn test_not_found_detection() {
        let err = ApiError::Status {
            url: "http://localhost/api/routes/1".to_string(),
            status: 404,
        };
        assert!(err.is_not_found());
        assert!(err.to_string().contains("404"));
    }
}
