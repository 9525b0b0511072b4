use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::{Datelike, Utc};
use serde::Deserialize;

use crate::auth::Owner;
use crate::error::ApiError;
use crate::models::{MonthView, Prediction};
use crate::stats;
use crate::store::SharedStore;

#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    year: Option<i32>,
    month: Option<u32>,
}

pub fn routes(store: SharedStore) -> Router {
    Router::new()
        .route("/predictions", get(get_predictions))
        .route("/calendar", get(get_calendar))
        .with_state(store)
}

/// `null` for anonymous callers and for owners with fewer than two cycles.
async fn get_predictions(
    State(store): State<SharedStore>,
    owner: Option<Owner>,
) -> Result<Json<Option<Prediction>>, ApiError> {
    let Some(Owner(owner)) = owner else {
        return Ok(Json(None));
    };
    let history = store.list(owner).await?;
    let prediction = stats::predict(&history);
    if prediction.is_none() {
        tracing::debug!("not enough cycles to predict ({} logged)", history.len());
    }
    Ok(Json(prediction))
}

async fn get_calendar(
    State(store): State<SharedStore>,
    owner: Option<Owner>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<MonthView>, ApiError> {
    let today = Utc::now().date_naive();
    let year = query.year.unwrap_or_else(|| today.year());
    let month = query.month.unwrap_or_else(|| today.month());

    let history = match owner {
        Some(Owner(owner)) => store.list(owner).await?,
        None => Vec::new(),
    };
    let prediction = stats::predict(&history);

    stats::month_view(year, month, today, &history, prediction.as_ref())
        .map(Json)
        .ok_or(ApiError::InvalidMonth { year, month })
}
