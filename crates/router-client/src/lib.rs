//! Clients for the two remote collaborators of the balloon router:
//! a geocoding service (place name to coordinates) and the route backend
//! (telemetry, wind and shortest-path computation).

pub mod backend;
pub mod config;
pub mod geocode;

pub use backend::{HttpRouteService, RouteService};
pub use config::ClientConfig;
pub use geocode::{Geocoder, NominatimGeocoder};

use reqwest::Client;
use router_common::{RouterError, RouterResult};

/// Build a reqwest client from the shared client configuration.
pub(crate) fn build_http_client(config: &ClientConfig) -> RouterResult<Client> {
    Client::builder()
        .timeout(config.request_timeout)
        .connect_timeout(config.connect_timeout)
        .user_agent(config.user_agent.clone())
        .pool_max_idle_per_host(4)
        .tcp_nodelay(true)
        .build()
        .map_err(|e| RouterError::Transport(format!("Failed to create HTTP client: {}", e)))
}

/// Map a reqwest failure onto the transport error kind.
pub(crate) fn transport_error(err: reqwest::Error) -> RouterError {
    RouterError::Transport(err.to_string())
}

/// Join a base URL and an absolute path without doubling the slash.
pub(crate) fn join_url(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}
