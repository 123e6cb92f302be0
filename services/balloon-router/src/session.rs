//! One run of the router: mount the map, handle route requests, export.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use map_sync::{EngineConfig, EngineStats, MapSyncEngine, MemorySurface};
use route_form::{RouteForm, SubmitOutcome};
use router_client::{Geocoder, RouteService};
use tokio::io::AsyncBufReadExt;
use tracing::{debug, info, warn};

/// How a session runs.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Route requested once at startup.
    pub from: Option<String>,
    pub to: Option<String>,
    /// GeoJSON destination; stdout when unset.
    pub output: Option<PathBuf>,
    /// Keep running until shutdown, refreshing snapshots periodically.
    pub watch: bool,
    pub refresh_interval: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            from: None,
            to: None,
            output: None,
            watch: false,
            refresh_interval: Duration::from_secs(3600),
        }
    }
}

/// Wires the route form to the map engine over one memory surface.
pub struct Session<G, S> {
    engine: MapSyncEngine<MemorySurface>,
    surface: MemorySurface,
    form: RouteForm<G, Arc<S>>,
    service: Arc<S>,
    options: SessionOptions,
}

impl<G, S> Session<G, S>
where
    G: Geocoder,
    S: RouteService,
{
    pub fn new(
        engine_config: EngineConfig,
        geocoder: G,
        service: Arc<S>,
        options: SessionOptions,
    ) -> Self {
        Self {
            engine: MapSyncEngine::new(engine_config),
            surface: MemorySurface::new(),
            form: RouteForm::new(geocoder, service.clone()),
            service,
            options,
        }
    }

    pub fn form(&self) -> &RouteForm<G, Arc<S>> {
        &self.form
    }

    /// Run until done and return the final engine stats.
    ///
    /// In watch mode every line read from `requests` of the form
    /// `<from> -> <to>` is submitted as a route request, and the loop exits
    /// when `shutdown` completes.
    pub async fn run<R, F>(mut self, requests: R, shutdown: F) -> Result<EngineStats>
    where
        R: tokio::io::AsyncBufRead + Unpin,
        F: Future<Output = ()>,
    {
        let surface = self.surface.clone();
        self.engine
            .mount(move || surface, self.service.as_ref())
            .await
            .context("Failed to mount map")?;

        let mut routes = self.form.subscribe();

        if let (Some(from), Some(to)) = (self.options.from.clone(), self.options.to.clone()) {
            self.request_route(&from, &to).await;
        }
        if routes.has_changed().unwrap_or(false) {
            let route = routes.borrow_and_update().clone();
            self.engine.set_route(route)?;
        }
        self.write_output().await?;

        if self.options.watch {
            self.watch(&mut routes, requests, shutdown).await?;
        }

        let stats = self.engine.stats();
        self.engine.dispose();
        Ok(stats)
    }

    async fn watch<R, F>(
        &mut self,
        routes: &mut tokio::sync::watch::Receiver<Option<Arc<router_common::Route>>>,
        requests: R,
        shutdown: F,
    ) -> Result<()>
    where
        R: tokio::io::AsyncBufRead + Unpin,
        F: Future<Output = ()>,
    {
        info!(
            refresh_secs = self.options.refresh_interval.as_secs(),
            "Watching for snapshot updates and route requests"
        );

        let mut lines = requests.lines();
        let mut reading = true;
        let mut ticker = tokio::time::interval(self.options.refresh_interval);
        // The first tick fires immediately; mount already fetched.
        ticker.tick().await;
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;

                Ok(()) = routes.changed() => {
                    let route = routes.borrow_and_update().clone();
                    self.engine.set_route(route)?;
                }
                _ = &mut shutdown => {
                    info!("Received shutdown signal");
                    break;
                }
                line = lines.next_line(), if reading => {
                    match line {
                        Ok(Some(line)) => {
                            match parse_request(&line) {
                                Some((from, to)) => self.request_route(from, to).await,
                                None if line.trim().is_empty() => {}
                                None => warn!(line = %line, "Expected '<from> -> <to>'"),
                            }
                            continue;
                        }
                        Ok(None) => {
                            debug!("Route request input closed");
                            reading = false;
                            continue;
                        }
                        Err(e) => {
                            warn!(error = %e, "Failed to read route request");
                            reading = false;
                            continue;
                        }
                    }
                }
                _ = ticker.tick() => {
                    self.engine.refresh_snapshots(self.service.as_ref()).await;
                }
            }

            self.write_output().await?;
        }

        Ok(())
    }

    async fn request_route(&self, from: &str, to: &str) {
        self.form.set_start(from);
        self.form.set_end(to);
        match self.form.submit().await {
            Ok(SubmitOutcome::Published { points }) => {
                info!(from, to, points, "Route ready");
            }
            Ok(SubmitOutcome::Superseded) => {}
            Err(e) => {
                let status = self.form.status();
                let message = status.message().map(str::to_string).unwrap_or_else(|| e.to_string());
                warn!(from, to, error = %message, "Route request failed");
            }
        }
    }

    async fn write_output(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.surface.to_geojson())?;
        match &self.options.output {
            Some(path) => {
                tokio::fs::write(path, json)
                    .await
                    .with_context(|| format!("Failed to write output: {:?}", path))?;
                debug!(path = %path.display(), "Wrote map snapshot");
            }
            None => println!("{}", json),
        }
        Ok(())
    }
}

/// Split `"<from> -> <to>"` into trimmed names.
fn parse_request(line: &str) -> Option<(&str, &str)> {
    let (from, to) = line.split_once("->")?;
    let (from, to) = (from.trim(), to.trim());
    if from.is_empty() || to.is_empty() {
        return None;
    }
    Some((from, to))
}
