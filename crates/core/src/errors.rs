use thiserror::Error;

use crate::models::TaskState;

/// 编排层错误类型定义
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("无效的服务注册: {0}")]
    InvalidRegistration(String),

    #[error("服务未找到: {name}")]
    ServiceNotFound { name: String },

    #[error("训练水位未找到: {target}")]
    WatermarkNotFound { target: String },

    #[error("任务未找到: {id}")]
    UnknownTask { id: String },

    #[error("无效的任务类别: {0}")]
    InvalidCategory(String),

    #[error("未知的任务类别: {0}")]
    UnknownCategory(String),

    #[error("无效的任务负载: {0}")]
    InvalidPayload(String),

    #[error("请求过于频繁: {client}")]
    RateLimited { client: String },

    #[error("任务处理失败: {0}")]
    HandlerFailure(String),

    #[error("上游服务不可用: {0}")]
    UpstreamUnavailable(String),

    #[error("非法的任务状态转换: {id} {from} -> {to}")]
    InvalidTransition {
        id: String,
        from: TaskState,
        to: TaskState,
    },

    #[error("消息队列错误: {0}")]
    MessageQueue(String),

    #[error("存储错误: {0}")]
    Storage(String),

    #[error("序列化错误: {0}")]
    Serialization(String),

    #[error("配置错误: {0}")]
    Configuration(String),

    #[error("内部错误: {0}")]
    Internal(String),
}

impl OrchestratorError {
    /// 稳定的机器可读错误类型，对外接口直接返回给调用方
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidRegistration(_) => "INVALID_REGISTRATION",
            Self::ServiceNotFound { .. } => "SERVICE_NOT_FOUND",
            Self::WatermarkNotFound { .. } => "WATERMARK_NOT_FOUND",
            Self::UnknownTask { .. } => "UNKNOWN_TASK",
            Self::InvalidCategory(_) => "INVALID_CATEGORY",
            Self::UnknownCategory(_) => "UNKNOWN_CATEGORY",
            Self::InvalidPayload(_) => "INVALID_PAYLOAD",
            Self::RateLimited { .. } => "RATE_LIMITED",
            Self::HandlerFailure(_) => "HANDLER_FAILURE",
            Self::UpstreamUnavailable(_) => "UPSTREAM_UNAVAILABLE",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::MessageQueue(_) => "MESSAGE_QUEUE_ERROR",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 是否属于调用方输入错误（在入队之前即可拒绝）
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidRegistration(_)
                | Self::ServiceNotFound { .. }
                | Self::WatermarkNotFound { .. }
                | Self::UnknownTask { .. }
                | Self::InvalidCategory(_)
                | Self::UnknownCategory(_)
                | Self::InvalidPayload(_)
                | Self::RateLimited { .. }
        )
    }

    pub fn unknown_task(id: impl ToString) -> Self {
        Self::UnknownTask { id: id.to_string() }
    }
}

impl From<serde_json::Error> for OrchestratorError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds_are_stable() {
        assert_eq!(
            OrchestratorError::InvalidCategory("gas".into()).kind(),
            "INVALID_CATEGORY"
        );
        assert_eq!(OrchestratorError::unknown_task("abc").kind(), "UNKNOWN_TASK");
        assert_eq!(
            OrchestratorError::HandlerFailure("boom".into()).kind(),
            "HANDLER_FAILURE"
        );
    }

    #[test]
    fn test_client_error_classification() {
        assert!(OrchestratorError::InvalidPayload("x".into()).is_client_error());
        assert!(OrchestratorError::RateLimited {
            client: "127.0.0.1".into()
        }
        .is_client_error());
        assert!(!OrchestratorError::UpstreamUnavailable("redis".into()).is_client_error());
        assert!(!OrchestratorError::HandlerFailure("x".into()).is_client_error());
    }

    #[test]
    fn test_invalid_transition_display() {
        let err = OrchestratorError::InvalidTransition {
            id: "t-1".into(),
            from: TaskState::Success,
            to: TaskState::Failure,
        };
        assert_eq!(err.to_string(), "非法的任务状态转换: t-1 Success -> Failure");
    }
}
