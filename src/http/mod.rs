pub mod listing;
pub mod state;
pub mod video;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;
use crate::http::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(listing::serve_listing))
        .route("/video/{id}", get(video::serve_video_get).head(video::serve_video_head))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
