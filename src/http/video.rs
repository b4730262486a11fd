use axum::{
    extract::{Path, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
};

use crate::http::state::AppState;

/// GET /video/{id} — direct stream (with Range) or live transcode, per entry.
pub async fn serve_video_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
    req_headers: HeaderMap,
) -> Response {
    let plan = match state.router.resolve(&id) {
        Ok(plan) => plan,
        Err(e) => return e.into_response(),
    };
    match state
        .router
        .deliver(plan, req_headers.get(header::RANGE))
        .await
    {
        Ok(response) => response,
        Err(e) => e.into_response(),
    }
}

/// HEAD /video/{id} — headers only. Does not open the file or start a transcode.
pub async fn serve_video_head(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.router.resolve(&id) {
        Ok(plan) => state.router.head(plan),
        Err(e) => e.into_response(),
    }
}
