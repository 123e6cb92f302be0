//! Tests for the HTTP clients against an in-process backend.
//!
//! Each test binds an axum server to an ephemeral local port that mimics the
//! route backend and the Nominatim search endpoint.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use router_client::{ClientConfig, Geocoder, HttpRouteService, NominatimGeocoder, RouteService};
use router_common::{Position, RouterError};

type Recorded = Arc<Mutex<Vec<HashMap<String, String>>>>;

async fn spawn_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn balloon_data() -> Json<serde_json::Value> {
    Json(json!({
        "balloon_data": [
            {"latitude": 10.0, "longitude": 20.0, "altitude": 15.3},
            {"latitude": -33.9, "longitude": 151.2, "altitude": 9.8},
            {"latitude": null, "longitude": 3.0}
        ]
    }))
}

async fn wind_data() -> Json<serde_json::Value> {
    Json(json!({
        "speed_direction": [
            {"speed": 5.0, "direction": 90.0},
            {"speed": 12.25, "direction": 270.5}
        ]
    }))
}

async fn shortest_path(
    State(recorded): State<Recorded>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    recorded.lock().unwrap().push(params.clone());

    let start_lat = params
        .get("start_lat")
        .and_then(|v| v.parse::<f64>().ok())
        .unwrap_or(-1.0);

    match start_lat as i64 {
        0 => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"detail": "Start point is not a known balloon"})),
        )
            .into_response(),
        1 => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        2 => Json(json!({"route": null, "weight": null})).into_response(),
        3 => Json(json!({
            "route": [
                {"latitude": 1.0, "longitude": 1.0},
                {"latitude": 2.0, "longitude": 2.0},
                {"latitude": 3.0, "longitude": 3.0}
            ]
        }))
        .into_response(),
        _ => Json(json!({"route": [[1.0, 1.0], [2.0, 2.0], [3.0, 3.0]], "weight": 42.5}))
            .into_response(),
    }
}

async fn search(Query(params): Query<HashMap<String, String>>) -> Json<serde_json::Value> {
    let q = params.get("q").cloned().unwrap_or_default();
    match q.as_str() {
        "New York" => Json(json!([
            {"lat": "40.7127281", "lon": "-74.0060152", "display_name": "New York, United States"}
        ])),
        "Numeric" => Json(json!([{"lat": 48.85, "lon": 2.35}])),
        "Broken" => Json(json!([{"lat": "north-ish", "lon": "1.0"}])),
        _ => Json(json!([])),
    }
}

async fn backend() -> (String, Recorded) {
    let recorded: Recorded = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/balloon-data", get(balloon_data))
        .route("/wind-data", get(wind_data))
        .route("/calculate-shortest-path", get(shortest_path))
        .route("/search", get(search))
        .with_state(recorded.clone());
    (spawn_server(app).await, recorded)
}

fn route_service(base_url: &str) -> HttpRouteService {
    HttpRouteService::new(&ClientConfig::new(base_url)).unwrap()
}

fn pos(lat: f64, lon: f64) -> Position {
    Position::new(lat, lon).unwrap()
}

// ============================================================================
// Snapshots
// ============================================================================

#[tokio::test]
async fn test_fetch_telemetry() {
    let (url, _) = backend().await;
    let samples = route_service(&url).fetch_telemetry().await.unwrap();

    assert_eq!(samples.len(), 3);
    assert_eq!(samples[0].position, Some(pos(10.0, 20.0)));
    assert_eq!(samples[1].index, 1);
    assert!(samples[2].position.is_none());
}

#[tokio::test]
async fn test_fetch_wind() {
    let (url, _) = backend().await;
    let samples = route_service(&url).fetch_wind().await.unwrap();

    assert_eq!(samples.len(), 2);
    assert_eq!(samples[1].speed, 12.25);
    assert_eq!(samples[1].direction, 270.5);
}

#[tokio::test]
async fn test_missing_endpoint_is_transport_error() {
    let app = Router::new();
    let url = spawn_server(app).await;
    let err = route_service(&url).fetch_telemetry().await.unwrap_err();
    assert!(matches!(err, RouterError::Transport(_)));
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_error() {
    let service = route_service("http://127.0.0.1:1");
    assert!(matches!(
        service.fetch_wind().await,
        Err(RouterError::Transport(_))
    ));
}

#[tokio::test]
async fn test_malformed_body_is_invalid_response() {
    async fn garbage() -> &'static str {
        "<html>not json</html>"
    }
    let url = spawn_server(Router::new().route("/wind-data", get(garbage))).await;
    let err = route_service(&url).fetch_wind().await.unwrap_err();
    assert!(matches!(err, RouterError::InvalidResponse { .. }));
}

// ============================================================================
// Route computation
// ============================================================================

#[tokio::test]
async fn test_compute_route_pairs() {
    let (url, _) = backend().await;
    let route = route_service(&url)
        .compute_route(pos(10.0, 20.0), pos(30.0, 40.0))
        .await
        .unwrap();

    assert_eq!(route.as_pairs(), vec![[1.0, 1.0], [2.0, 2.0], [3.0, 3.0]]);
    assert_eq!(route.weight(), Some(42.5));
}

#[tokio::test]
async fn test_compute_route_records_match_pairs() {
    let (url, _) = backend().await;
    let service = route_service(&url);
    let from_records = service
        .compute_route(pos(3.0, 0.0), pos(30.0, 40.0))
        .await
        .unwrap();
    let from_pairs = service
        .compute_route(pos(10.0, 20.0), pos(30.0, 40.0))
        .await
        .unwrap();

    assert_eq!(from_records.coordinates(), from_pairs.coordinates());
}

#[tokio::test]
async fn test_compute_route_rounds_coordinates() {
    let (url, recorded) = backend().await;
    route_service(&url)
        .compute_route(pos(40.712_775_9, -74.005_974_1), pos(34.052_234_9, -118.243_684_9))
        .await
        .unwrap();

    let params = recorded.lock().unwrap()[0].clone();
    let value = |key: &str| params[key].parse::<f64>().unwrap();
    assert_eq!(value("start_lat"), 40.712_776);
    assert_eq!(value("start_lon"), -74.005_974);
    assert_eq!(value("end_lat"), 34.052_235);
    assert_eq!(value("end_lon"), -118.243_685);
}

#[tokio::test]
async fn test_compute_route_forwards_backend_message() {
    let (url, _) = backend().await;
    let err = route_service(&url)
        .compute_route(pos(0.0, 0.0), pos(1.0, 1.0))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        RouterError::Domain("Start point is not a known balloon".to_string())
    );
    assert_eq!(err.to_string(), "Start point is not a known balloon");
}

#[tokio::test]
async fn test_compute_route_server_error_without_message() {
    let (url, _) = backend().await;
    let err = route_service(&url)
        .compute_route(pos(1.0, 0.0), pos(1.0, 1.0))
        .await
        .unwrap_err();
    assert!(matches!(err, RouterError::Transport(_)));
}

#[tokio::test]
async fn test_compute_route_no_path() {
    let (url, _) = backend().await;
    let err = route_service(&url)
        .compute_route(pos(2.0, 0.0), pos(1.0, 1.0))
        .await
        .unwrap_err();
    assert!(matches!(err, RouterError::Domain(_)));
}

// ============================================================================
// Geocoding
// ============================================================================

#[tokio::test]
async fn test_geocode_match() {
    let (url, _) = backend().await;
    let geocoder = NominatimGeocoder::new(&ClientConfig::new(&url)).unwrap();
    let position = geocoder.resolve("New York").await.unwrap();

    assert!((position.latitude - 40.712_728_1).abs() < 1e-9);
    assert!((position.longitude - (-74.006_015_2)).abs() < 1e-9);
}

#[tokio::test]
async fn test_geocode_numeric_coordinates() {
    let (url, _) = backend().await;
    let geocoder = NominatimGeocoder::new(&ClientConfig::new(&url)).unwrap();
    assert_eq!(geocoder.resolve("Numeric").await.unwrap(), pos(48.85, 2.35));
}

#[tokio::test]
async fn test_geocode_no_match() {
    let (url, _) = backend().await;
    let geocoder = NominatimGeocoder::new(&ClientConfig::new(&url)).unwrap();
    let err = geocoder.resolve("Atlantis").await.unwrap_err();
    assert_eq!(err, RouterError::NotFound("Atlantis".to_string()));
}

#[tokio::test]
async fn test_geocode_bad_coordinate() {
    let (url, _) = backend().await;
    let geocoder = NominatimGeocoder::new(&ClientConfig::new(&url)).unwrap();
    let err = geocoder.resolve("Broken").await.unwrap_err();
    assert!(matches!(err, RouterError::InvalidResponse { .. }));
}

#[tokio::test]
async fn test_geocode_unreachable() {
    let geocoder = NominatimGeocoder::new(&ClientConfig::new("http://127.0.0.1:1")).unwrap();
    assert!(matches!(
        geocoder.resolve("New York").await,
        Err(RouterError::Transport(_))
    ));
}
