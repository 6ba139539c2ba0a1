//! Axum router wiring.
//!
//! Instrumented demo routes come from the dispatcher's route table;
//! `/metrics` and `/healthz` are mounted directly and are not measured.

use axum::{routing::get, Router};

use crate::{app_state::AppState, ops, transport};

pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/metrics", get(ops::metrics))
        .route("/healthz", get(ops::healthz));

    for route in state.dispatcher().registered_routes() {
        router = router.route(&route, get(transport::http::serve_route));
    }

    router.with_state(state)
}
