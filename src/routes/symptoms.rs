use axum::{extract::State, routing::get, Json, Router};

use crate::auth::Owner;
use crate::error::ApiError;
use crate::models::SymptomStat;
use crate::stats;
use crate::store::SharedStore;

pub fn routes(store: SharedStore) -> Router {
    Router::new()
        .route("/symptom-stats", get(get_symptom_stats))
        .with_state(store)
}

async fn get_symptom_stats(
    State(store): State<SharedStore>,
    owner: Option<Owner>,
) -> Result<Json<Option<Vec<SymptomStat>>>, ApiError> {
    let Some(Owner(owner)) = owner else {
        return Ok(Json(None));
    };
    let history = store.list(owner).await?;
    Ok(Json(Some(stats::aggregate(&history))))
}
