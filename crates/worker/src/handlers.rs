use fuelcast_core::{
    parse_job_date, FuelConfig, FuelType, ForecastModel, JobPayload, ModelTrainer,
    OrchestratorError, OrchestratorResult,
};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::TrendModel;

/// 类别绑定的任务处理器
///
/// 在阻塞线程池中执行，返回值写入任务记录的 `result`。
pub trait JobHandler: Send + Sync {
    fn name(&self) -> &str;

    fn handle(&self, payload: &JobPayload) -> OrchestratorResult<Value>;
}

/// 预测处理器：持有某个燃料类型的模型和上下界
pub struct PredictionHandler {
    fuel: FuelType,
    model: Arc<dyn ForecastModel>,
    floor: f64,
    cap: f64,
}

impl PredictionHandler {
    pub fn new(fuel: FuelType, model: Arc<dyn ForecastModel>, floor: f64, cap: f64) -> Self {
        Self {
            fuel,
            model,
            floor,
            cap,
        }
    }

    /// 使用配置中的趋势模型系数和上下界
    pub fn from_config(fuel: FuelType, config: &FuelConfig) -> Self {
        Self::new(
            fuel,
            Arc::new(TrendModel::from(&config.model)),
            config.floor,
            config.cap,
        )
    }
}

impl JobHandler for PredictionHandler {
    fn name(&self) -> &str {
        self.fuel.as_str()
    }

    fn handle(&self, payload: &JobPayload) -> OrchestratorResult<Value> {
        let dates = match payload {
            JobPayload::Prediction { dates } => dates,
            other => {
                return Err(OrchestratorError::InvalidPayload(format!(
                    "{} 处理器不接受 {} 任务",
                    self.fuel,
                    other.kind()
                )))
            }
        };

        if dates.is_empty() {
            return Err(OrchestratorError::HandlerFailure(
                "no dates provided".to_string(),
            ));
        }

        let results = dates
            .iter()
            .map(|ds| {
                let date = parse_job_date(ds)?;
                let yhat = self.model.predict(date, self.floor, self.cap)?;
                Ok(json!({ "ds": ds, "yhat": yhat }))
            })
            .collect::<OrchestratorResult<Vec<_>>>()?;

        Ok(json!({ "results": results }))
    }
}

/// 训练处理器
pub struct TrainingHandler {
    trainer: Arc<dyn ModelTrainer>,
}

impl TrainingHandler {
    pub fn new(trainer: Arc<dyn ModelTrainer>) -> Self {
        Self { trainer }
    }
}

impl JobHandler for TrainingHandler {
    fn name(&self) -> &str {
        "training"
    }

    fn handle(&self, payload: &JobPayload) -> OrchestratorResult<Value> {
        let (target, dataset) = match payload {
            JobPayload::Training { target, dataset } => (target, dataset),
            other => {
                return Err(OrchestratorError::InvalidPayload(format!(
                    "训练处理器不接受 {} 任务",
                    other.kind()
                )))
            }
        };

        let model = self.trainer.train(target, dataset)?;
        let trained_through = payload
            .trained_through()
            .map(|date| date.format("%Y-%m-%d").to_string());

        Ok(json!({
            "target": target,
            "trainedThrough": trained_through,
            "observations": dataset.len(),
            "model": model,
        }))
    }
}
