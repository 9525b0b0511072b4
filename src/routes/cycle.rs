use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use uuid::Uuid;

use crate::auth::Owner;
use crate::error::ApiError;
use crate::models::{CycleRecord, EndCycle, NewCycle};
use crate::store::SharedStore;

pub fn routes(store: SharedStore) -> Router {
    Router::new()
        .route("/cycles", get(list_cycles).post(create_cycle))
        .route("/cycles/:id", patch(end_cycle))
        .with_state(store)
}

async fn create_cycle(
    State(store): State<SharedStore>,
    Owner(owner): Owner,
    Json(body): Json<NewCycle>,
) -> Result<(StatusCode, Json<CycleRecord>), ApiError> {
    let record = store.insert(owner, body).await?;
    tracing::info!("🩸 cycle {} logged from {}", record.id, record.start_date);
    Ok((StatusCode::CREATED, Json(record)))
}

async fn end_cycle(
    State(store): State<SharedStore>,
    Owner(owner): Owner,
    Path(id): Path<Uuid>,
    Json(body): Json<EndCycle>,
) -> Result<Json<CycleRecord>, ApiError> {
    let record = store.set_end_date(owner, id, body.end_date).await?;
    tracing::info!("✅ cycle {} ended on {}", record.id, body.end_date);
    Ok(Json(record))
}

async fn list_cycles(
    State(store): State<SharedStore>,
    owner: Option<Owner>,
) -> Result<Json<Vec<CycleRecord>>, ApiError> {
    let Some(Owner(owner)) = owner else {
        return Ok(Json(Vec::new()));
    };
    Ok(Json(store.list(owner).await?))
}
