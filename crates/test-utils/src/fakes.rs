//! In-memory stand-ins for the geocoding service and the route backend.
//!
//! Both fakes record every call so tests can assert which network requests
//! would have been issued.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use router_client::{Geocoder, RouteService};
use router_common::{BalloonSample, Position, Route, RouterError, RouterResult, WindSample};

/// A request received by [`FakeRouteService`].
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceCall {
    Telemetry,
    Wind,
    Route { start: Position, end: Position },
}

/// Route backend returning canned results.
pub struct FakeRouteService {
    telemetry: Mutex<RouterResult<Vec<BalloonSample>>>,
    wind: Mutex<RouterResult<Vec<WindSample>>>,
    route: Mutex<RouterResult<Route>>,
    calls: Mutex<Vec<ServiceCall>>,
}

impl FakeRouteService {
    /// Empty snapshots and an empty route.
    pub fn new() -> Self {
        Self {
            telemetry: Mutex::new(Ok(Vec::new())),
            wind: Mutex::new(Ok(Vec::new())),
            route: Mutex::new(Ok(Route::default())),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_telemetry(self, samples: Vec<BalloonSample>) -> Self {
        self.set_telemetry(Ok(samples));
        self
    }

    pub fn with_wind(self, samples: Vec<WindSample>) -> Self {
        self.set_wind(Ok(samples));
        self
    }

    pub fn with_route(self, route: Route) -> Self {
        self.set_route(Ok(route));
        self
    }

    pub fn set_telemetry(&self, result: RouterResult<Vec<BalloonSample>>) {
        *self.telemetry.lock().unwrap() = result;
    }

    pub fn set_wind(&self, result: RouterResult<Vec<WindSample>>) {
        *self.wind.lock().unwrap() = result;
    }

    pub fn set_route(&self, result: RouterResult<Route>) {
        *self.route.lock().unwrap() = result;
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<ServiceCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of route computations requested.
    pub fn route_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, ServiceCall::Route { .. }))
            .count()
    }

    fn record(&self, call: ServiceCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Default for FakeRouteService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RouteService for FakeRouteService {
    async fn fetch_telemetry(&self) -> RouterResult<Vec<BalloonSample>> {
        self.record(ServiceCall::Telemetry);
        self.telemetry.lock().unwrap().clone()
    }

    async fn fetch_wind(&self) -> RouterResult<Vec<WindSample>> {
        self.record(ServiceCall::Wind);
        self.wind.lock().unwrap().clone()
    }

    async fn compute_route(&self, start: Position, end: Position) -> RouterResult<Route> {
        self.record(ServiceCall::Route { start, end });
        self.route.lock().unwrap().clone()
    }
}

/// Geocoder resolving from a fixed table. Unknown names are `NotFound`.
#[derive(Default)]
pub struct FakeGeocoder {
    places: HashMap<String, RouterResult<Position>>,
    queries: Mutex<Vec<String>>,
}

impl FakeGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_place(mut self, name: &str, latitude: f64, longitude: f64) -> Self {
        let position = Position::new(latitude, longitude);
        self.places.insert(name.to_string(), position);
        self
    }

    /// Make lookups of `name` fail with `error`.
    pub fn with_failure(mut self, name: &str, error: RouterError) -> Self {
        self.places.insert(name.to_string(), Err(error));
        self
    }

    /// Every name looked up so far, in order.
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn resolve(&self, place_name: &str) -> RouterResult<Position> {
        self.queries.lock().unwrap().push(place_name.to_string());
        self.places
            .get(place_name)
            .cloned()
            .unwrap_or_else(|| Err(RouterError::NotFound(place_name.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{pos, telemetry};

    #[tokio::test]
    async fn test_fake_service_records_calls() {
        let service = FakeRouteService::new().with_telemetry(telemetry(&[(1.0, 2.0)]));
        assert_eq!(service.fetch_telemetry().await.unwrap().len(), 1);
        service
            .compute_route(pos(1.0, 1.0), pos(2.0, 2.0))
            .await
            .unwrap();

        assert_eq!(service.calls().len(), 2);
        assert_eq!(service.route_calls(), 1);
    }

    #[tokio::test]
    async fn test_fake_geocoder_unknown_place() {
        let geocoder = FakeGeocoder::new().with_place("Paris", 48.85, 2.35);
        assert!(geocoder.resolve("Paris").await.is_ok());
        assert!(matches!(
            geocoder.resolve("Atlantis").await,
            Err(RouterError::NotFound(_))
        ));
        assert_eq!(geocoder.queries(), vec!["Paris", "Atlantis"]);
    }
}
