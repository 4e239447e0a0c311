use async_trait::async_trait;
use fuelcast_core::{
    OrchestratorError, OrchestratorResult, TaskId, TaskOutcome, TaskRecord, TaskStore,
    TrainingWatermark, WatermarkStore,
};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use super::{storage_error, KeySpace};

async fn read_json<T: DeserializeOwned>(
    conn: &mut ConnectionManager,
    key: &str,
) -> OrchestratorResult<Option<T>> {
    let raw: Option<String> = conn.get(key).await.map_err(storage_error)?;
    raw.map(|raw| serde_json::from_str(&raw).map_err(OrchestratorError::from))
        .transpose()
}

/// Redis任务表，每条记录是一个JSON字符串键
///
/// 状态推进采用读-改-写：一条消息只会被一个消费者 `RPOP` 出来，
/// 因此同一记录不存在并发写者。
#[derive(Clone)]
pub struct RedisTaskStore {
    conn: ConnectionManager,
    keys: KeySpace,
    ttl: Option<Duration>,
}

impl RedisTaskStore {
    pub fn new(conn: ConnectionManager, key_prefix: &str, ttl: Option<Duration>) -> Self {
        Self {
            conn,
            keys: KeySpace::new(key_prefix),
            ttl,
        }
    }

    async fn write(&self, record: &TaskRecord) -> OrchestratorResult<()> {
        let key = self.keys.task(&record.id.to_string());
        let payload = serde_json::to_string(record)?;
        let mut conn = self.conn.clone();
        match self.ttl {
            Some(ttl) => conn
                .set_ex::<_, _, ()>(key, payload, ttl.as_secs())
                .await
                .map_err(storage_error),
            None => conn
                .set::<_, _, ()>(key, payload)
                .await
                .map_err(storage_error),
        }
    }

    async fn update(
        &self,
        id: &TaskId,
        change: impl FnOnce(&mut TaskRecord) -> OrchestratorResult<()>,
    ) -> OrchestratorResult<TaskRecord> {
        let mut record = self
            .get(id)
            .await?
            .ok_or_else(|| OrchestratorError::unknown_task(id))?;
        change(&mut record)?;
        self.write(&record).await?;
        Ok(record)
    }
}

#[async_trait]
impl TaskStore for RedisTaskStore {
    async fn insert(&self, record: TaskRecord) -> OrchestratorResult<()> {
        debug!("Inserting task record {} ({})", record.id, record.category);
        self.write(&record).await
    }

    async fn get(&self, id: &TaskId) -> OrchestratorResult<Option<TaskRecord>> {
        let mut conn = self.conn.clone();
        read_json(&mut conn, &self.keys.task(&id.to_string())).await
    }

    async fn start(&self, id: &TaskId) -> OrchestratorResult<TaskRecord> {
        self.update(id, |record| record.start()).await
    }

    async fn complete(&self, id: &TaskId, outcome: TaskOutcome) -> OrchestratorResult<TaskRecord> {
        self.update(id, |record| record.apply(outcome)).await
    }

    async fn discard(&self, id: &TaskId) -> OrchestratorResult<()> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(self.keys.task(&id.to_string()))
            .await
            .map_err(storage_error)
    }
}

/// Redis训练水位表
#[derive(Clone)]
pub struct RedisWatermarkStore {
    conn: ConnectionManager,
    keys: KeySpace,
}

impl RedisWatermarkStore {
    pub fn new(conn: ConnectionManager, key_prefix: &str) -> Self {
        Self {
            conn,
            keys: KeySpace::new(key_prefix),
        }
    }
}

#[async_trait]
impl WatermarkStore for RedisWatermarkStore {
    async fn record(&self, watermark: TrainingWatermark) -> OrchestratorResult<()> {
        let payload = serde_json::to_string(&watermark)?;
        let mut conn = self.conn.clone();
        redis::pipe()
            .atomic()
            .set(self.keys.watermark(&watermark.target), payload)
            .ignore()
            .set(self.keys.latest_watermark(), &watermark.target)
            .ignore()
            .query_async::<()>(&mut conn)
            .await
            .map_err(storage_error)
    }

    async fn get(&self, target: &str) -> OrchestratorResult<Option<TrainingWatermark>> {
        let mut conn = self.conn.clone();
        read_json(&mut conn, &self.keys.watermark(target)).await
    }

    async fn latest(&self) -> OrchestratorResult<Option<TrainingWatermark>> {
        let mut conn = self.conn.clone();
        let target: Option<String> = conn
            .get(self.keys.latest_watermark())
            .await
            .map_err(storage_error)?;
        match target {
            Some(target) => read_json(&mut conn, &self.keys.watermark(&target)).await,
            None => Ok(None),
        }
    }
}
