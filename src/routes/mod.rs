use axum::{routing::get, Router};

use crate::store::SharedStore;

pub mod cycle;
pub mod cycle_stats;
pub mod symptoms;

pub fn app(store: SharedStore) -> Router {
    Router::new()
        .merge(cycle::routes(store.clone()))
        .merge(symptoms::routes(store.clone()))
        .merge(cycle_stats::routes(store))
        .route("/health", get(|| async { "✅ Backend up" }))
}
