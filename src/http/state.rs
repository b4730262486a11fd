use crate::delivery::DeliveryRouter;

/// Shared application state injected into all route handlers via axum::extract::State.
/// The catalog inside the router is an immutable `Arc` snapshot: cloning is cheap
/// and reads need no lock.
#[derive(Clone)]
pub struct AppState {
    pub router: DeliveryRouter,
    pub title: String,
}
