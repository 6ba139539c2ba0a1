//! Shared application state.
//!
//! Owns the metric registry handle and the route table. Everything is built
//! once at startup and shared by clone; there is no ambient global state.

use std::sync::Arc;

use reqscope_core::error::Result;
use reqscope_core::handler::Handler;
use reqscope_core::instrument::{http_registry, instrument};
use reqscope_core::metrics::MetricRegistry;

use crate::config::ServiceConfig;
use crate::dispatch::Dispatcher;
use crate::services::{FailService, HomeService, WorkService};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: ServiceConfig,
    metrics: Arc<MetricRegistry>,
    dispatcher: Dispatcher,
}

impl AppState {
    /// Build state with the request metrics declared from config.
    pub fn new(cfg: ServiceConfig) -> Result<Self> {
        let metrics = Arc::new(http_registry(&cfg.metrics.latency_buckets)?);
        Ok(Self::with_registry(cfg, metrics))
    }

    /// Build state around an existing registry.
    pub fn with_registry(cfg: ServiceConfig, metrics: Arc<MetricRegistry>) -> Self {
        let dispatcher = Dispatcher::new();

        register(&dispatcher, &metrics, "/", HomeService::new());
        register(&dispatcher, &metrics, "/work", WorkService::new(&cfg.demo));
        register(&dispatcher, &metrics, "/fail", FailService::new());

        tracing::debug!(routes = ?dispatcher.registered_routes(), "routes registered");

        Self {
            inner: Arc::new(AppStateInner { cfg, metrics, dispatcher }),
        }
    }

    pub fn cfg(&self) -> &ServiceConfig {
        &self.inner.cfg
    }

    pub fn metrics(&self) -> Arc<MetricRegistry> {
        Arc::clone(&self.inner.metrics)
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.inner.dispatcher
    }
}

fn register<H: Handler + 'static>(
    dispatcher: &Dispatcher,
    metrics: &Arc<MetricRegistry>,
    route: &str,
    body: H,
) {
    dispatcher.register(route, Arc::new(instrument(route, body, Arc::clone(metrics))));
}
