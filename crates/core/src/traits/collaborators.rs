//! 外部协作者的边界接口：预测模型、模型训练器和时间序列数据源。

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::{models::Observation, OrchestratorResult};

/// 预测模型：给定日期和上下界，返回点估计
pub trait ForecastModel: Send + Sync {
    fn predict(&self, date: NaiveDate, floor: f64, cap: f64) -> OrchestratorResult<f64>;
}

/// 模型训练器，返回可序列化的训练摘要
pub trait ModelTrainer: Send + Sync {
    fn train(&self, target: &str, dataset: &[Observation])
        -> OrchestratorResult<serde_json::Value>;
}

/// 时间序列数据源
#[async_trait]
pub trait DataSource: Send + Sync {
    /// 目标的完整历史序列
    async fn full(&self, target: &str) -> OrchestratorResult<Vec<Observation>>;

    /// 目标最近的观测值
    async fn latest(&self, target: &str) -> OrchestratorResult<Vec<Observation>>;
}
