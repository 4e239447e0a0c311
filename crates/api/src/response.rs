use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use fuelcast_core::{ServiceRecord, TaskHandle, TaskId, TaskRecord, TaskState, TrainingWatermark};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceResponse {
    pub name: String,
    pub host: String,
    pub port: u16,
}

impl From<ServiceRecord> for ServiceResponse {
    fn from(record: ServiceRecord) -> Self {
        Self {
            name: record.name,
            host: record.host,
            port: record.port,
        }
    }
}

/// 预测提交的同步响应
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub task_id: TaskId,
    pub task_type: String,
    pub status: TaskState,
}

impl From<TaskHandle> for SubmitResponse {
    fn from(handle: TaskHandle) -> Self {
        Self {
            task_id: handle.id,
            task_type: handle.category.to_string(),
            status: TaskState::Pending,
        }
    }
}

/// 预测任务轮询结果
///
/// Success -> 200 `{taskId, status, result}`；Failure -> 500 `{error}`；其余 -> 202 `{taskId, status}`。
#[derive(Debug)]
pub struct PredictionStatus(pub TaskRecord);

impl IntoResponse for PredictionStatus {
    fn into_response(self) -> Response {
        let record = self.0;
        match record.state {
            TaskState::Success => (
                StatusCode::OK,
                Json(serde_json::json!({
                    "taskId": record.id,
                    "status": record.state,
                    "result": record.result.unwrap_or(Value::Null),
                })),
            )
                .into_response(),
            TaskState::Failure => {
                ApiError::TaskFailed(record.error.unwrap_or_else(|| "任务失败".to_string()))
                    .into_response()
            }
            TaskState::Pending | TaskState::Processing => (
                StatusCode::ACCEPTED,
                Json(serde_json::json!({
                    "taskId": record.id,
                    "status": record.state,
                })),
            )
                .into_response(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerResponse {
    pub task_id: TaskId,
    pub status: TaskState,
}

/// 训练任务结果，任何状态都以200返回
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingResultResponse {
    pub task_id: TaskId,
    pub status: TaskState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<TaskRecord> for TrainingResultResponse {
    fn from(record: TaskRecord) -> Self {
        Self {
            task_id: record.id,
            status: record.state,
            result: record.result,
            error: record.error,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingDateResponse {
    pub target: String,
    pub trained_date: NaiveDate,
}

impl From<TrainingWatermark> for TrainingDateResponse {
    fn from(watermark: TrainingWatermark) -> Self {
        Self {
            target: watermark.target,
            trained_date: watermark.trained_through,
        }
    }
}
