//! Route request form.
//!
//! Owns the start and end place names, resolves them through a [`Geocoder`]
//! and asks a [`RouteService`] for the path between them. Successful routes
//! are published whole on a `tokio::sync::watch` channel; subscribers such as
//! the map engine only ever see complete values.
//!
//! Overlapping submits are allowed. Each one takes a generation number and
//! only the newest may publish or change the status.
//!
//! [`Geocoder`]: router_client::Geocoder
//! [`RouteService`]: router_client::RouteService

pub mod form;
pub mod status;

pub use form::RouteForm;
pub use status::{FormStatus, SubmitOutcome};
