//! Redis后端：列表承载任务队列，字符串键承载任务记录与训练水位。

mod queue;
mod store;

pub use queue::RedisMessageQueue;
pub use store::{RedisTaskStore, RedisWatermarkStore};

use fuelcast_core::{OrchestratorError, OrchestratorResult};
use redis::aio::ConnectionManager;
use redis::Client;
use tracing::{debug, error};

/// 建立带自动重连的异步连接，并用PING确认可用
pub async fn connect(redis_url: &str) -> OrchestratorResult<ConnectionManager> {
    let client = Client::open(redis_url).map_err(|e| {
        OrchestratorError::Configuration(format!("Failed to create Redis client: {e}"))
    })?;

    let mut conn = ConnectionManager::new(client).await.map_err(|e| {
        error!("Failed to connect to Redis: {}", e);
        OrchestratorError::UpstreamUnavailable(format!("Failed to connect to Redis: {e}"))
    })?;

    let response: String = redis::cmd("PING")
        .query_async(&mut conn)
        .await
        .map_err(|e| OrchestratorError::UpstreamUnavailable(format!("Redis PING failed: {e}")))?;
    if response != "PONG" {
        return Err(OrchestratorError::UpstreamUnavailable(format!(
            "Unexpected PING response: {response}"
        )));
    }

    debug!("Redis connection test successful");
    Ok(conn)
}

/// 键名布局
#[derive(Debug, Clone)]
pub(crate) struct KeySpace {
    prefix: String,
}

impl KeySpace {
    pub(crate) fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub(crate) fn queue(&self, queue: &str) -> String {
        format!("{}:queue:{}", self.prefix, queue)
    }

    pub(crate) fn task(&self, id: &str) -> String {
        format!("{}:task:{}", self.prefix, id)
    }

    pub(crate) fn watermark(&self, target: &str) -> String {
        format!("{}:watermark:{}", self.prefix, target)
    }

    /// 最近一次写入水位的目标名
    pub(crate) fn latest_watermark(&self) -> String {
        format!("{}:watermark_latest", self.prefix)
    }
}

fn queue_error(e: redis::RedisError) -> OrchestratorError {
    OrchestratorError::MessageQueue(format!("Redis command failed: {e}"))
}

fn storage_error(e: redis::RedisError) -> OrchestratorError {
    OrchestratorError::Storage(format!("Redis command failed: {e}"))
}
