//! Connection settings shared by the HTTP clients.

use std::time::Duration;

/// Default route backend address.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// Default geocoding service (OpenStreetMap Nominatim).
pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org";

/// Settings for one remote collaborator.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL, without a trailing path.
    pub base_url: String,
    /// Sent with every request. Nominatim rejects requests without one.
    pub user_agent: String,
    /// Whole-request timeout
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Settings for the route backend.
    pub fn backend() -> Self {
        Self::new(DEFAULT_BACKEND_URL)
    }

    /// Settings for the geocoding service.
    pub fn geocoder() -> Self {
        Self::new(DEFAULT_GEOCODER_URL)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BACKEND_URL.to_string(),
            user_agent: format!("balloon-router/{}", env!("CARGO_PKG_VERSION")),
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}
