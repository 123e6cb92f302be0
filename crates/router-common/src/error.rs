//! Error types for the balloon router.

use thiserror::Error;

/// Result type alias using RouterError.
pub type RouterResult<T> = Result<T, RouterError>;

/// Primary error type for routing, geocoding and rendering operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RouterError {
    // === Collaborator Errors ===
    #[error("Could not find coordinates for {0}")]
    NotFound(String),

    #[error("Transport error: {0}")]
    Transport(String),

    /// Rejection reported by the route backend, message kept verbatim.
    #[error("{0}")]
    Domain(String),

    #[error("Invalid response from {service}: {message}")]
    InvalidResponse { service: String, message: String },

    // === Local Errors ===
    #[error("Invalid position: {0}")]
    InvalidPosition(String),

    #[error("Missing {0} location")]
    MissingEndpoint(&'static str),

    #[error("Map surface unavailable: {0}")]
    SurfaceUnavailable(String),
}

impl RouterError {
    /// Short machine-readable name of the error kind, used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            RouterError::NotFound(_) => "not_found",
            RouterError::Transport(_) => "transport",
            RouterError::Domain(_) => "domain",
            RouterError::InvalidResponse { .. } => "invalid_response",
            RouterError::InvalidPosition(_) => "invalid_position",
            RouterError::MissingEndpoint(_) => "missing_endpoint",
            RouterError::SurfaceUnavailable(_) => "surface_unavailable",
        }
    }

    /// Whether the user can fix this by editing their input.
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            RouterError::NotFound(_) | RouterError::MissingEndpoint(_) | RouterError::Domain(_)
        )
    }

    pub fn invalid_response(service: impl Into<String>, message: impl Into<String>) -> Self {
        RouterError::InvalidResponse {
            service: service.into(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for RouterError {
    fn from(err: serde_json::Error) -> Self {
        RouterError::invalid_response("json", err.to_string())
    }
}
