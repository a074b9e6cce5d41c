use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::{
    api::{identity::CurrentUser, AppState},
    forecast::{ForecastError, ForecastPoint, ForecastRequest},
};

#[derive(Debug, Default, Deserialize)]
pub struct ForecastParams {
    pub horizon: Option<i64>,
    pub model: Option<String>,
}

/// `GET /forecast/:metric?horizon=&model=`
pub async fn forecast_metric(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(metric): Path<String>,
    Query(params): Query<ForecastParams>,
) -> Result<Json<Vec<ForecastPoint>>, ForecastError> {
    let request = ForecastRequest::parse(&metric, params.horizon, params.model.as_deref())?;

    let _permit = state
        .fit_permits
        .acquire()
        .await
        .map_err(|e| ForecastError::Source(anyhow::anyhow!("forecast permits closed: {e}")))?;

    let points = state.engine.forecast(user_id, &request).await?;
    Ok(Json(points))
}
