//! Client for the balloon route backend.
//!
//! The backend serves two snapshots (balloon telemetry and wind) and computes
//! shortest paths between two coordinates over its balloon graph.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Response};
use router_common::{
    BalloonSample, Position, Route, RouteResponse, RouterError, RouterResult, TelemetrySnapshot,
    WindSample, WindSnapshot,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::config::ClientConfig;
use crate::{build_http_client, join_url, transport_error};

pub const TELEMETRY_PATH: &str = "/balloon-data";
pub const WIND_PATH: &str = "/wind-data";
pub const ROUTE_PATH: &str = "/calculate-shortest-path";

/// Read and compute operations offered by the route backend.
#[async_trait]
pub trait RouteService: Send + Sync {
    /// Current balloon positions. All or nothing.
    async fn fetch_telemetry(&self) -> RouterResult<Vec<BalloonSample>>;

    /// Current wind samples, aligned with telemetry by ordinal.
    async fn fetch_wind(&self) -> RouterResult<Vec<WindSample>>;

    /// Shortest path from `start` to `end`.
    ///
    /// Both endpoints are rounded to 6 decimal digits before transmission.
    async fn compute_route(&self, start: Position, end: Position) -> RouterResult<Route>;
}

#[async_trait]
impl<T: RouteService + ?Sized> RouteService for Arc<T> {
    async fn fetch_telemetry(&self) -> RouterResult<Vec<BalloonSample>> {
        (**self).fetch_telemetry().await
    }

    async fn fetch_wind(&self) -> RouterResult<Vec<WindSample>> {
        (**self).fetch_wind().await
    }

    async fn compute_route(&self, start: Position, end: Position) -> RouterResult<Route> {
        (**self).compute_route(start, end).await
    }
}

/// Error body shapes the backend may return. FastAPI uses `detail`.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ErrorBody {
    fn into_message(self) -> Option<String> {
        let detail = self.detail.map(|d| match d {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        });
        detail.or(self.error).or(self.message)
    }
}

/// reqwest implementation of [`RouteService`].
pub struct HttpRouteService {
    client: Client,
    base_url: String,
}

impl HttpRouteService {
    pub fn new(config: &ClientConfig) -> RouterResult<Self> {
        Ok(Self {
            client: build_http_client(config)?,
            base_url: config.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> RouterResult<T> {
        let url = join_url(&self.base_url, path);
        debug!(url = %url, "Requesting backend");

        let response = self.client.get(&url).send().await.map_err(transport_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(RouterError::Transport(format!(
                "{} returned HTTP {}",
                path, status
            )));
        }
        decode(response, path).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response, path: &str) -> RouterResult<T> {
    let body = response.text().await.map_err(transport_error)?;
    serde_json::from_str(&body).map_err(|e| RouterError::invalid_response(path, e.to_string()))
}

#[async_trait]
impl RouteService for HttpRouteService {
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn fetch_telemetry(&self) -> RouterResult<Vec<BalloonSample>> {
        let snapshot: TelemetrySnapshot = self.get_json(TELEMETRY_PATH).await?;
        let samples = snapshot.into_samples();
        info!(count = samples.len(), "Fetched telemetry snapshot");
        Ok(samples)
    }

    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn fetch_wind(&self) -> RouterResult<Vec<WindSample>> {
        let snapshot: WindSnapshot = self.get_json(WIND_PATH).await?;
        let samples = snapshot.into_samples();
        info!(count = samples.len(), "Fetched wind snapshot");
        Ok(samples)
    }

    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn compute_route(&self, start: Position, end: Position) -> RouterResult<Route> {
        let start = start.rounded();
        let end = end.rounded();
        let url = join_url(&self.base_url, ROUTE_PATH);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("start_lat", start.latitude),
                ("start_lon", start.longitude),
                ("end_lat", end.latitude),
                ("end_lon", end.longitude),
            ])
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(ErrorBody::into_message);
            return Err(match message {
                Some(message) => RouterError::Domain(message),
                None => RouterError::Transport(format!("{} returned HTTP {}", ROUTE_PATH, status)),
            });
        }

        let route = decode::<RouteResponse>(response, ROUTE_PATH)
            .await?
            .into_route()?;
        info!(points = route.len(), weight = ?route.weight(), "Computed route");
        Ok(route)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_prefers_detail() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"detail": "Start point not in graph", "error": "x"}"#)
                .unwrap();
        assert_eq!(body.into_message().unwrap(), "Start point not in graph");
    }

    #[test]
    fn test_error_body_structured_detail() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"detail": [{"loc": ["query", "start_lat"]}]}"#).unwrap();
        assert!(body.into_message().unwrap().contains("start_lat"));
    }

    #[test]
    fn test_error_body_fallbacks() {
        let body: ErrorBody = serde_json::from_str(r#"{"message": "busy"}"#).unwrap();
        assert_eq!(body.into_message().unwrap(), "busy");

        let body: ErrorBody = serde_json::from_str("{}").unwrap();
        assert!(body.into_message().is_none());
    }
}
