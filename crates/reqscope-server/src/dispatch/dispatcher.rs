use std::sync::Arc;

use dashmap::DashMap;

use reqscope_core::error::{ReqScopeError, Result};
use reqscope_core::handler::{Handler, Request, Response};

/// Route table: declared route path -> handler.
#[derive(Default)]
pub struct Dispatcher {
    routes: DashMap<String, Arc<dyn Handler>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self { routes: DashMap::new() }
    }

    pub fn register(&self, route: &str, handler: Arc<dyn Handler>) {
        if self.routes.insert(route.to_string(), handler).is_some() {
            tracing::warn!(route = %route, "route registered twice; previous handler replaced");
        }
    }

    pub fn registered_routes(&self) -> Vec<String> {
        let mut routes: Vec<String> = self.routes.iter().map(|e| e.key().clone()).collect();
        routes.sort();
        routes
    }

    pub async fn dispatch(&self, route: &str, req: Request) -> Result<Response> {
        let handler = self
            .routes
            .get(route)
            .ok_or_else(|| ReqScopeError::BadRequest(format!("unknown route: {route}")))?
            .value()
            .clone();
        handler.call(req).await
    }
}
