use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 队列与任务记录的后端类型
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// 进程内通道与哈希表，适用于单进程部署和测试
    #[default]
    Memory,
    /// 外部Redis代理，多个进程共享队列和任务记录
    Redis,
}

/// Queue backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub kind: BackendKind,
    pub redis_url: String,
    /// Redis键前缀
    pub key_prefix: String,
    /// Redis中任务记录的保留时间（秒），0表示永久保留
    pub task_ttl_seconds: u64,
    /// Redis队列为空时的轮询间隔（毫秒）
    pub poll_interval_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::Memory,
            redis_url: "redis://localhost:6379".to_string(),
            key_prefix: "fuelcast".to_string(),
            task_ttl_seconds: 86400,
            poll_interval_ms: 200,
        }
    }
}

impl BackendConfig {
    /// Validate backend configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.kind == BackendKind::Redis {
            if !self.redis_url.starts_with("redis://") && !self.redis_url.starts_with("rediss://")
            {
                return Err(anyhow::anyhow!("Redis URL必须是redis://或rediss://格式"));
            }
            if self.key_prefix.trim().is_empty() {
                return Err(anyhow::anyhow!("Redis键前缀不能为空"));
            }
            if self.poll_interval_ms == 0 {
                return Err(anyhow::anyhow!("轮询间隔必须大于0"));
            }
        }
        Ok(())
    }

    pub fn is_redis(&self) -> bool {
        self.kind == BackendKind::Redis
    }

    pub fn task_ttl(&self) -> Option<Duration> {
        (self.task_ttl_seconds > 0).then(|| Duration::from_secs(self.task_ttl_seconds))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
