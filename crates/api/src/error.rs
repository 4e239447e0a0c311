use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use fuelcast_core::OrchestratorError;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Orchestrator(#[from] OrchestratorError),

    /// 任务已执行但处理器失败，内容为任务记录中的错误信息
    #[error("{0}")]
    TaskFailed(String),

    #[error("请求参数错误: {0}")]
    BadRequest(String),

    #[error("API密钥无效")]
    Unauthorized,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Orchestrator(err) => match err {
                OrchestratorError::InvalidRegistration(_)
                | OrchestratorError::InvalidCategory(_)
                | OrchestratorError::UnknownCategory(_)
                | OrchestratorError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
                OrchestratorError::ServiceNotFound { .. }
                | OrchestratorError::WatermarkNotFound { .. }
                | OrchestratorError::UnknownTask { .. } => StatusCode::NOT_FOUND,
                OrchestratorError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
                OrchestratorError::UpstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::TaskFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Orchestrator(err) => err.kind(),
            ApiError::TaskFailed(_) => "HANDLER_FAILURE",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Unauthorized => "UNAUTHORIZED",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        let body = Json(json!({
            "error": self.to_string(),
            "kind": self.kind(),
            "code": status.as_u16(),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
