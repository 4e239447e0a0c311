use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use fuelcast_core::OrchestratorError;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    error::{ApiError, ApiResult},
    response::{PredictionStatus, SubmitResponse},
    routes::GatewayState,
};

/// 预测请求
///
/// 字段缺失不在反序列化阶段拒绝，由提交逻辑给出对应的错误类型。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRequest {
    #[serde(default)]
    pub fuel_type: Option<Value>,
    #[serde(default)]
    pub dates: Option<Vec<String>>,
}

/// 提交预测任务，立即返回任务句柄
pub async fn submit_prediction(
    State(state): State<GatewayState>,
    payload: Result<Json<PredictionRequest>, JsonRejection>,
) -> ApiResult<Json<SubmitResponse>> {
    let Json(request) = payload.map_err(|rejection| match rejection {
        // JSON合法但字段类型不符
        JsonRejection::JsonDataError(_) => {
            ApiError::from(OrchestratorError::InvalidPayload(rejection.body_text()))
        }
        _ => ApiError::BadRequest(rejection.body_text()),
    })?;

    let fuel_type = match request.fuel_type {
        Some(Value::String(fuel_type)) => fuel_type,
        Some(other) => {
            return Err(OrchestratorError::InvalidCategory(other.to_string()).into());
        }
        None => return Err(OrchestratorError::InvalidCategory("缺少 fuelType".to_string()).into()),
    };

    let handle = state
        .gateway
        .submit_prediction(&fuel_type, request.dates.unwrap_or_default())
        .await?;
    Ok(Json(handle.into()))
}

/// 轮询预测任务
pub async fn prediction_status(
    State(state): State<GatewayState>,
    Path((fuel_type, task_id)): Path<(String, String)>,
) -> ApiResult<PredictionStatus> {
    let record = state.gateway.status(&fuel_type, &task_id).await?;
    Ok(PredictionStatus(record))
}
