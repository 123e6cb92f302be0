//! Place name geocoding.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use router_common::{Position, RouterError, RouterResult};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::config::ClientConfig;
use crate::{build_http_client, join_url, transport_error};

/// Resolves a free-text place name to a position.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve `place_name` to the position of its best match.
    ///
    /// Fails with [`RouterError::NotFound`] when the service has no match and
    /// [`RouterError::Transport`] on network or HTTP failure. No retry.
    async fn resolve(&self, place_name: &str) -> RouterResult<Position>;
}

#[async_trait]
impl<T: Geocoder + ?Sized> Geocoder for Arc<T> {
    async fn resolve(&self, place_name: &str) -> RouterResult<Position> {
        (**self).resolve(place_name).await
    }
}

/// A single search hit. Nominatim encodes coordinates as strings.
#[derive(Debug, Deserialize)]
struct Place {
    lat: Coordinate,
    lon: Coordinate,
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Coordinate {
    Text(String),
    Number(f64),
}

impl Coordinate {
    fn value(&self) -> RouterResult<f64> {
        match self {
            Coordinate::Number(v) => Ok(*v),
            Coordinate::Text(s) => s.trim().parse().map_err(|_| {
                RouterError::invalid_response("geocoder", format!("bad coordinate '{}'", s))
            }),
        }
    }
}

/// Geocoder backed by the Nominatim search API.
pub struct NominatimGeocoder {
    client: Client,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new(config: &ClientConfig) -> RouterResult<Self> {
        Ok(Self {
            client: build_http_client(config)?,
            base_url: config.base_url.clone(),
        })
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn resolve(&self, place_name: &str) -> RouterResult<Position> {
        let url = join_url(&self.base_url, "/search");

        let response = self
            .client
            .get(&url)
            .query(&[("format", "json"), ("limit", "1"), ("q", place_name)])
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(RouterError::Transport(format!(
                "geocoder returned HTTP {}",
                status
            )));
        }

        let body = response.text().await.map_err(transport_error)?;
        let places: Vec<Place> = serde_json::from_str(&body)
            .map_err(|e| RouterError::invalid_response("geocoder", e.to_string()))?;

        let place = places
            .first()
            .ok_or_else(|| RouterError::NotFound(place_name.to_string()))?;

        let position = Position::new(place.lat.value()?, place.lon.value()?)?;
        debug!(
            place = %place_name,
            matched = place.display_name.as_deref().unwrap_or(""),
            latitude = position.latitude,
            longitude = position.longitude,
            "Resolved place"
        );
        Ok(position)
    }
}
