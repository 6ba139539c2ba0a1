use std::collections::HashMap;

use axum::{
    extract::{MatchedPath, Query, State},
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};

use reqscope_core::handler::{Request, Response as CoreResponse};

use crate::app_state::AppState;

/// Entry for every instrumented route.
pub async fn serve_route(
    State(app): State<AppState>,
    matched: MatchedPath,
    method: Method,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let req = Request {
        method: method.as_str().to_string(),
        path: uri.path().to_string(),
        query,
    };

    match app.dispatcher().dispatch(matched.as_str(), req).await {
        Ok(resp) => into_http(resp),
        Err(e) => {
            tracing::warn!(route = %matched.as_str(), code = e.code().as_str(), error = %e, "dispatch failed");
            (StatusCode::NOT_FOUND, "not found\n").into_response()
        }
    }
}

/// Status and body are passed through untouched.
pub fn into_http(resp: CoreResponse) -> Response {
    let status = StatusCode::from_u16(resp.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, resp.body).into_response()
}
