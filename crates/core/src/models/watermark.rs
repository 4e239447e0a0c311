use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// 训练水位：某个目标最近一次成功训练所使用数据的截止日期
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingWatermark {
    pub target: String,
    pub trained_through: NaiveDate,
    pub recorded_at: DateTime<Utc>,
}

impl TrainingWatermark {
    pub fn new(target: impl Into<String>, trained_through: NaiveDate) -> Self {
        Self {
            target: target.into(),
            trained_through,
            recorded_at: Utc::now(),
        }
    }
}
