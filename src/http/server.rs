//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router for the selected service
//! - Wire up middleware (request ID, tracing, timeout, metrics, chaos)
//! - Start the scheduler (platform) and apply chaos reloads (rental, vehicles)
//! - Serve until the shutdown signal
//!
//! # Layer order (outermost first)
//! ```text
//! SetRequestId → Trace → PropagateRequestId → track_metrics → chaos → Timeout → handlers
//! ```
//! Chaos sits inside the metrics layer so injected faults and delays show up
//! in `http_requests_total` and `http_request_duration_ms`. The timeout sits
//! inside chaos: it bounds the handler, never the injected delay.

use std::sync::Arc;
use std::time::Duration;

use axum::{body::Body, http::Request, middleware, routing::get, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::chaos::{self, chaos_middleware, ChaosCell, ChaosConfig, ChaosState};
use crate::config::{ChaosSettings, ServiceConfig, ServiceKind};
use crate::http::middleware::track_metrics;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::lifecycle::shutdown::wait_for;
use crate::observability::{metrics, tracing::make_request_span};
use crate::rental::{self, RentalStore};
use crate::scheduler::{self, startup_interval, Poller, Scheduler};
use crate::vehicles::{self, fleet::FLEET_SIZE, Fleet};

/// One of the three services, ready to serve.
pub struct ServiceServer {
    kind: ServiceKind,
    config: ServiceConfig,
    router: Router,
    chaos: Option<ChaosCell>,
    scheduler: Option<Scheduler>,
}

impl ServiceServer {
    /// Build the service's state and router.
    ///
    /// Fails only if the scheduler's HTTP client cannot be built.
    pub fn new(
        kind: ServiceKind,
        config: ServiceConfig,
        metrics_handle: PrometheusHandle,
    ) -> Result<Self, reqwest::Error> {
        let service: Arc<str> = Arc::from(config.service_name.as_str());
        let mut routes = metrics::router(metrics_handle);
        let mut scheduler = None;

        match kind {
            ServiceKind::Platform => {
                let poller = Poller::new(&config.downstream)?;
                let handle = Scheduler::new(poller, service.clone());
                routes = routes
                    .route("/health", get(health))
                    .merge(scheduler::router(handle.clone()));
                scheduler = Some(handle);
            }
            ServiceKind::Rental => {
                routes = routes.merge(rental::router(RentalStore::new()));
            }
            ServiceKind::Vehicles => {
                let fleet = Fleet::generate(FLEET_SIZE, &mut rand::thread_rng());
                routes = routes
                    .route("/health", get(health))
                    .merge(vehicles::router(fleet));
            }
        }

        #[allow(deprecated)]
        let mut routes = routes.layer(TimeoutLayer::new(Duration::from_secs(
            config.timeouts.request_secs,
        )));

        let chaos = if kind.chaos_enabled() {
            let cell = ChaosCell::new(ChaosConfig::from(config.chaos));
            let state = ChaosState::new(cell.clone(), service.clone());
            routes = routes
                .merge(chaos::router(state.clone()))
                .layer(middleware::from_fn_with_state(state, chaos_middleware));
            Some(cell)
        } else {
            None
        };

        let router = Self::build_router(service, routes);

        Ok(Self {
            kind,
            config,
            router,
            chaos,
            scheduler,
        })
    }

    /// Wrap the service routes with the shared middleware stack.
    fn build_router(service: Arc<str>, routes: Router) -> Router {
        let span_service = service.clone();

        routes
            .layer(middleware::from_fn_with_state(service, track_metrics))
            .layer(propagate_request_id_layer())
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(move |req: &Request<Body>| make_request_span(&span_service, req)),
            )
            .layer(set_request_id_layer())
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// `chaos_updates` carries the `[chaos]` section of each config file
    /// reload; a section is applied only when it differs from the previous one.
    pub async fn run(
        self,
        listener: TcpListener,
        chaos_updates: mpsc::UnboundedReceiver<ChaosSettings>,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            service = %self.config.service_name,
            kind = %self.kind,
            "{} listening on port {}",
            self.config.service_name,
            addr.port()
        );

        if let Some(scheduler) = &self.scheduler {
            scheduler.start(startup_interval(&self.config.scheduler));
        }

        if let Some(cell) = self.chaos.clone() {
            tokio::spawn(apply_reloads(cell, self.config.chaos, chaos_updates));
        }

        axum::serve(listener, self.router)
            .with_graceful_shutdown(wait_for(shutdown))
            .await?;

        if let Some(scheduler) = &self.scheduler {
            scheduler.stop();
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Router with all layers, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn kind(&self) -> ServiceKind {
        self.kind
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Live chaos configuration (rental, vehicles).
    pub fn chaos(&self) -> Option<&ChaosCell> {
        self.chaos.as_ref()
    }

    /// Scheduler handle (platform).
    pub fn scheduler(&self) -> Option<&Scheduler> {
        self.scheduler.as_ref()
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn apply_reloads(
    cell: ChaosCell,
    mut last: ChaosSettings,
    mut updates: mpsc::UnboundedReceiver<ChaosSettings>,
) {
    while let Some(settings) = updates.recv().await {
        if settings == last {
            tracing::debug!("Config file saved, chaos settings unchanged");
            continue;
        }

        last = settings;
        let reloaded = ChaosConfig::from(settings);
        cell.replace(reloaded);
        tracing::info!(
            error_rate = reloaded.error_rate,
            latency_max = reloaded.latency_max,
            "Config reloaded: errorRate={}, latencyMax={}",
            reloaded.error_rate,
            reloaded.latency_max
        );
    }
}
