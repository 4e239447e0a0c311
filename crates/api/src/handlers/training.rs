use axum::{
    extract::{Path, Query, State},
    Json,
};
use fuelcast_core::TaskState;
use serde::Deserialize;

use crate::{
    error::ApiResult,
    response::{TrainingDateResponse, TrainingResultResponse, TriggerResponse},
    routes::TrainingState,
};

#[derive(Debug, Default, Deserialize)]
pub struct TrainingDateQuery {
    pub target: Option<String>,
}

pub async fn trigger_training(
    State(state): State<TrainingState>,
    Path(target): Path<String>,
) -> ApiResult<Json<TriggerResponse>> {
    let handle = state.trigger.trigger(&target).await?;
    Ok(Json(TriggerResponse {
        task_id: handle.id,
        status: TaskState::Pending,
    }))
}

pub async fn training_result(
    State(state): State<TrainingState>,
    Path(task_id): Path<String>,
) -> ApiResult<Json<TrainingResultResponse>> {
    let record = state.trigger.result(&task_id).await?;
    Ok(Json(record.into()))
}

/// 读取训练水位，供漂移检测比较
pub async fn training_date(
    State(state): State<TrainingState>,
    Query(query): Query<TrainingDateQuery>,
) -> ApiResult<Json<TrainingDateResponse>> {
    let watermark = state.trigger.training_date(query.target.as_deref()).await?;
    Ok(Json(watermark.into()))
}
