use async_trait::async_trait;

use crate::{models::TrainingWatermark, OrchestratorResult};

/// 训练水位存储，每个目标一条记录，写入即覆盖
#[async_trait]
pub trait WatermarkStore: Send + Sync {
    async fn record(&self, watermark: TrainingWatermark) -> OrchestratorResult<()>;

    async fn get(&self, target: &str) -> OrchestratorResult<Option<TrainingWatermark>>;

    /// 最近一次写入的水位（不区分目标）
    async fn latest(&self) -> OrchestratorResult<Option<TrainingWatermark>>;
}
