//! 进程内的任务表、服务注册表和训练水位表。

use async_trait::async_trait;
use fuelcast_core::{
    OrchestratorError, OrchestratorResult, ServiceRecord, ServiceRegistry, TaskId, TaskOutcome,
    TaskRecord, TaskStore, TrainingWatermark, WatermarkStore,
};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use tracing::debug;

/// 内存任务表
#[derive(Debug, Default)]
pub struct InMemoryTaskStore {
    records: RwLock<HashMap<TaskId, TaskRecord>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn insert(&self, record: TaskRecord) -> OrchestratorResult<()> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.id) {
            return Err(OrchestratorError::Storage(format!(
                "任务记录已存在: {}",
                record.id
            )));
        }
        debug!("Inserting task record {} ({})", record.id, record.category);
        records.insert(record.id, record);
        Ok(())
    }

    async fn get(&self, id: &TaskId) -> OrchestratorResult<Option<TaskRecord>> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn start(&self, id: &TaskId) -> OrchestratorResult<TaskRecord> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(id)
            .ok_or_else(|| OrchestratorError::unknown_task(id))?;
        record.start()?;
        Ok(record.clone())
    }

    async fn complete(&self, id: &TaskId, outcome: TaskOutcome) -> OrchestratorResult<TaskRecord> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(id)
            .ok_or_else(|| OrchestratorError::unknown_task(id))?;
        record.apply(outcome)?;
        Ok(record.clone())
    }

    async fn discard(&self, id: &TaskId) -> OrchestratorResult<()> {
        self.records.write().await.remove(id);
        Ok(())
    }
}

/// 内存服务注册表，按名称有序存储
#[derive(Debug, Default)]
pub struct InMemoryServiceRegistry {
    services: RwLock<BTreeMap<String, ServiceRecord>>,
}

impl InMemoryServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ServiceRegistry for InMemoryServiceRegistry {
    async fn register(&self, record: ServiceRecord) -> OrchestratorResult<()> {
        record.validate()?;
        self.services
            .write()
            .await
            .insert(record.name.clone(), record);
        Ok(())
    }

    async fn lookup(&self, name: &str) -> OrchestratorResult<ServiceRecord> {
        self.services
            .read()
            .await
            .get(name.trim())
            .cloned()
            .ok_or_else(|| OrchestratorError::ServiceNotFound {
                name: name.to_string(),
            })
    }

    async fn list(&self) -> OrchestratorResult<Vec<ServiceRecord>> {
        Ok(self.services.read().await.values().cloned().collect())
    }
}

#[derive(Debug, Default)]
struct WatermarkTable {
    by_target: HashMap<String, TrainingWatermark>,
    latest_target: Option<String>,
}

/// 内存训练水位表
#[derive(Debug, Default)]
pub struct InMemoryWatermarkStore {
    table: RwLock<WatermarkTable>,
}

impl InMemoryWatermarkStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WatermarkStore for InMemoryWatermarkStore {
    async fn record(&self, watermark: TrainingWatermark) -> OrchestratorResult<()> {
        let mut table = self.table.write().await;
        table.latest_target = Some(watermark.target.clone());
        table
            .by_target
            .insert(watermark.target.clone(), watermark);
        Ok(())
    }

    async fn get(&self, target: &str) -> OrchestratorResult<Option<TrainingWatermark>> {
        Ok(self.table.read().await.by_target.get(target).cloned())
    }

    async fn latest(&self) -> OrchestratorResult<Option<TrainingWatermark>> {
        let table = self.table.read().await;
        Ok(table
            .latest_target
            .as_ref()
            .and_then(|target| table.by_target.get(target))
            .cloned())
    }
}
