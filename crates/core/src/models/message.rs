use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{Category, TaskId};
use crate::errors::OrchestratorError;

/// 时间序列中的一个观测点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub ds: String,
    pub y: f64,
}

/// 任务负载
///
/// 预测任务携带待预测的日期序列；训练任务携带目标列名和完整训练数据。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum JobPayload {
    Prediction { dates: Vec<String> },
    Training {
        target: String,
        dataset: Vec<Observation>,
    },
}

impl JobPayload {
    pub fn kind(&self) -> &'static str {
        match self {
            JobPayload::Prediction { .. } => "prediction",
            JobPayload::Training { .. } => "training",
        }
    }

    /// 训练数据覆盖到的最后日期
    pub fn trained_through(&self) -> Option<NaiveDate> {
        match self {
            JobPayload::Training { dataset, .. } => dataset
                .iter()
                .filter_map(|obs| parse_job_date(&obs.ds).ok())
                .max(),
            JobPayload::Prediction { .. } => None,
        }
    }
}

/// 分发给Worker的队列消息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobMessage {
    pub task_id: TaskId,
    pub category: Category,
    pub payload: JobPayload,
    pub submitted_at: DateTime<Utc>,
}

impl JobMessage {
    pub fn new(task_id: TaskId, category: Category, payload: JobPayload) -> Self {
        Self {
            task_id,
            category,
            payload,
            submitted_at: Utc::now(),
        }
    }

    pub fn to_json(&self) -> Result<String, OrchestratorError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(raw: &str) -> Result<Self, OrchestratorError> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// 解析任务中使用的日期，支持 `20240101` 与 `2024-01-01` 两种格式
pub fn parse_job_date(raw: &str) -> Result<NaiveDate, OrchestratorError> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y%m%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .map_err(|_| OrchestratorError::InvalidPayload(format!("无法解析日期: '{raw}'")))
}
