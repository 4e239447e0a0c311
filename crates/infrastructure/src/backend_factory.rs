use fuelcast_core::{BackendConfig, BackendKind, MessageQueue, OrchestratorResult, TaskStore, WatermarkStore};
use std::sync::Arc;
use tracing::{debug, info};

use crate::{
    redis_backend, InMemoryMessageQueue, InMemoryTaskStore, InMemoryWatermarkStore,
    RedisMessageQueue, RedisTaskStore, RedisWatermarkStore, TaskFabric,
};

/// 按配置创建的一组共享后端
#[derive(Clone)]
pub struct Backends {
    pub queue: Arc<dyn MessageQueue>,
    pub tasks: Arc<dyn TaskStore>,
    pub watermarks: Arc<dyn WatermarkStore>,
}

impl Backends {
    pub async fn create(config: &BackendConfig) -> OrchestratorResult<Self> {
        debug!("Creating backends with kind: {:?}", config.kind);

        match config.kind {
            BackendKind::Memory => {
                info!("Initializing in-memory queue backend");
                Ok(Self::in_memory())
            }
            BackendKind::Redis => {
                info!("Initializing Redis queue backend at {}", config.redis_url);
                let conn = redis_backend::connect(&config.redis_url).await?;
                Ok(Self {
                    queue: Arc::new(RedisMessageQueue::new(
                        conn.clone(),
                        &config.key_prefix,
                        config.poll_interval(),
                    )),
                    tasks: Arc::new(RedisTaskStore::new(
                        conn.clone(),
                        &config.key_prefix,
                        config.task_ttl(),
                    )),
                    watermarks: Arc::new(RedisWatermarkStore::new(conn, &config.key_prefix)),
                })
            }
        }
    }

    pub fn in_memory() -> Self {
        Self {
            queue: Arc::new(InMemoryMessageQueue::new()),
            tasks: Arc::new(InMemoryTaskStore::new()),
            watermarks: Arc::new(InMemoryWatermarkStore::new()),
        }
    }

    pub fn fabric(&self) -> TaskFabric {
        TaskFabric::new(self.queue.clone(), self.tasks.clone())
    }
}
