use async_trait::async_trait;
use fuelcast_core::{
    Category, DataSource, JobMessage, JobPayload, OrchestratorError, OrchestratorResult,
    TaskHandle, TaskRecord, TrainingWatermark, WatermarkStore,
};
use fuelcast_worker::CompletionHook;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

use crate::DispatchGateway;

/// 训练触发器
///
/// 从数据服务拉取目标的完整序列并提交训练任务；训练成功后由 [`WatermarkHook`]
/// 记录训练水位，供漂移检测读取。
#[derive(Clone)]
pub struct TrainingTrigger {
    gateway: DispatchGateway,
    data_source: Arc<dyn DataSource>,
    watermarks: Arc<dyn WatermarkStore>,
    targets: Vec<String>,
}

impl TrainingTrigger {
    pub fn new(
        gateway: DispatchGateway,
        data_source: Arc<dyn DataSource>,
        watermarks: Arc<dyn WatermarkStore>,
        targets: Vec<String>,
    ) -> Self {
        Self {
            gateway,
            data_source,
            watermarks,
            targets,
        }
    }

    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    pub async fn trigger(&self, target: &str) -> OrchestratorResult<TaskHandle> {
        if !self.targets.iter().any(|t| t == target) {
            return Err(OrchestratorError::InvalidCategory(format!(
                "未知的训练目标: {target}"
            )));
        }

        info!("Fetching training data for {}", target);
        let dataset = self.data_source.full(target).await?;
        info!("Received {} observations for {}", dataset.len(), target);

        let handle = self
            .gateway
            .submit(
                Category::Training,
                JobPayload::Training {
                    target: target.to_string(),
                    dataset,
                },
            )
            .await?;
        info!("Training task triggered for {} ({})", target, handle.id);
        Ok(handle)
    }

    pub async fn result(&self, task_id: &str) -> OrchestratorResult<TaskRecord> {
        self.gateway
            .status(Category::Training.as_str(), task_id)
            .await
    }

    /// 读取训练水位，未指定目标时返回最近写入的一条
    pub async fn training_date(&self, target: Option<&str>) -> OrchestratorResult<TrainingWatermark> {
        let watermark = match target {
            Some(target) => self.watermarks.get(target).await?,
            None => self.watermarks.latest().await?,
        };

        watermark.ok_or_else(|| OrchestratorError::WatermarkNotFound {
            target: target.unwrap_or("*").to_string(),
        })
    }

    pub fn watermark_hook(&self) -> WatermarkHook {
        WatermarkHook::new(self.watermarks.clone())
    }
}

/// 训练成功后写入 `trainedThrough = 数据集中最大的ds`
pub struct WatermarkHook {
    watermarks: Arc<dyn WatermarkStore>,
}

impl WatermarkHook {
    pub fn new(watermarks: Arc<dyn WatermarkStore>) -> Self {
        Self { watermarks }
    }
}

#[async_trait]
impl CompletionHook for WatermarkHook {
    async fn on_success(&self, message: &JobMessage, _result: &Value) -> OrchestratorResult<()> {
        let target = match &message.payload {
            JobPayload::Training { target, .. } => target,
            JobPayload::Prediction { .. } => return Ok(()),
        };

        let Some(trained_through) = message.payload.trained_through() else {
            warn!("Training task {} carried no dated observations", message.task_id);
            return Err(OrchestratorError::InvalidPayload(format!(
                "目标 {target} 的训练数据没有有效日期"
            )));
        };

        self.watermarks
            .record(TrainingWatermark::new(target.clone(), trained_through))
            .await?;
        info!("Recorded training watermark {} for {}", trained_through, target);
        Ok(())
    }
}
