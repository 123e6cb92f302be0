use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use router_client::{Geocoder, RouteService};
use router_common::{Position, Route, RouterError, RouterResult};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::status::{FormStatus, SubmitOutcome};

#[derive(Debug, Default)]
struct Endpoints {
    start: String,
    end: String,
}

/// Collects two place names and turns them into a published route.
///
/// The form holds the latest route and hands out shared, immutable copies
/// through a watch channel. It never touches the map.
pub struct RouteForm<G, S> {
    geocoder: G,
    service: S,
    endpoints: Mutex<Endpoints>,
    status: Mutex<FormStatus>,
    generation: AtomicU64,
    route_tx: watch::Sender<Option<Arc<Route>>>,
}

impl<G, S> RouteForm<G, S>
where
    G: Geocoder,
    S: RouteService,
{
    pub fn new(geocoder: G, service: S) -> Self {
        let (route_tx, _) = watch::channel(None);
        Self {
            geocoder,
            service,
            endpoints: Mutex::new(Endpoints::default()),
            status: Mutex::new(FormStatus::Idle),
            generation: AtomicU64::new(0),
            route_tx,
        }
    }

    pub fn set_start(&self, name: impl Into<String>) {
        lock(&self.endpoints).start = name.into();
    }

    pub fn set_end(&self, name: impl Into<String>) {
        lock(&self.endpoints).end = name.into();
    }

    /// Current `(start, end)` names as entered.
    pub fn endpoints(&self) -> (String, String) {
        let endpoints = lock(&self.endpoints);
        (endpoints.start.clone(), endpoints.end.clone())
    }

    /// Whether both names are filled in.
    pub fn can_submit(&self) -> bool {
        let endpoints = lock(&self.endpoints);
        !endpoints.start.trim().is_empty() && !endpoints.end.trim().is_empty()
    }

    pub fn status(&self) -> FormStatus {
        lock(&self.status).clone()
    }

    /// Receive every published route. The channel starts at `None`.
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<Route>>> {
        self.route_tx.subscribe()
    }

    /// The most recently published route.
    pub fn current_route(&self) -> Option<Arc<Route>> {
        self.route_tx.borrow().clone()
    }

    /// Return a finished form to `Idle`. No effect while loading.
    pub fn dismiss(&self) {
        let mut status = lock(&self.status);
        if status.is_finished() {
            *status = FormStatus::Idle;
        }
    }

    /// Geocode both endpoints, request the route and publish it.
    ///
    /// An empty endpoint is rejected before any network call and leaves the
    /// status as it was. Any later failure sets `Failed` and is returned;
    /// the previously published route stays in place.
    #[instrument(skip(self))]
    pub async fn submit(&self) -> RouterResult<SubmitOutcome> {
        let (start_name, end_name) = {
            let endpoints = lock(&self.endpoints);
            (
                endpoints.start.trim().to_string(),
                endpoints.end.trim().to_string(),
            )
        };
        if start_name.is_empty() {
            return Err(RouterError::MissingEndpoint("start"));
        }
        if end_name.is_empty() {
            return Err(RouterError::MissingEndpoint("end"));
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *lock(&self.status) = FormStatus::Loading;
        info!(generation, start = %start_name, end = %end_name, "Requesting route");

        let result = self.request(&start_name, &end_name).await;

        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(generation, "Discarding response from superseded request");
            return Ok(SubmitOutcome::Superseded);
        }

        match result {
            Ok(route) => {
                let points = route.len();
                *lock(&self.status) = FormStatus::Success;
                self.route_tx.send_replace(Some(Arc::new(route)));
                info!(generation, points, "Published route");
                Ok(SubmitOutcome::Published { points })
            }
            Err((err, message)) => {
                warn!(generation, error = %err, kind = err.kind(), "Route request failed");
                *lock(&self.status) = FormStatus::Failed(message);
                Err(err)
            }
        }
    }

    /// Geocode start, then end, then ask for the route. Errors carry the
    /// message to show the user.
    async fn request(
        &self,
        start_name: &str,
        end_name: &str,
    ) -> Result<Route, (RouterError, String)> {
        let start = self.resolve(start_name).await?;
        let end = self.resolve(end_name).await?;

        self.service.compute_route(start, end).await.map_err(|err| {
            let message = err.to_string();
            (err, message)
        })
    }

    async fn resolve(&self, place_name: &str) -> Result<Position, (RouterError, String)> {
        self.geocoder.resolve(place_name).await.map_err(|err| {
            let message = format!("Error getting coordinates for {}: {}", place_name, err);
            (err, message)
        })
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
