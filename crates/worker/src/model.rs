//! 内置的线性趋势模型
//!
//! 作为预测模型与训练器边界的参考实现，使服务在没有外部机器学习组件时也能完整运行。

use chrono::NaiveDate;
use fuelcast_core::{
    parse_job_date, ForecastModel, ModelCoefficients, ModelTrainer, Observation,
    OrchestratorError, OrchestratorResult,
};
use serde::{Deserialize, Serialize};

/// 线性趋势：`y = intercept + slope_per_day * (date - origin)`，结果截断到 `[floor, cap]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendModel {
    pub origin: NaiveDate,
    pub intercept: f64,
    pub slope_per_day: f64,
}

impl TrendModel {
    pub fn new(origin: NaiveDate, intercept: f64, slope_per_day: f64) -> Self {
        Self {
            origin,
            intercept,
            slope_per_day,
        }
    }
}

impl From<&ModelCoefficients> for TrendModel {
    fn from(coefficients: &ModelCoefficients) -> Self {
        Self::new(
            coefficients.origin,
            coefficients.intercept,
            coefficients.slope_per_day,
        )
    }
}

impl ForecastModel for TrendModel {
    fn predict(&self, date: NaiveDate, floor: f64, cap: f64) -> OrchestratorResult<f64> {
        if floor > cap {
            return Err(OrchestratorError::InvalidPayload(format!(
                "floor ({floor}) 大于 cap ({cap})"
            )));
        }

        let days = (date - self.origin).num_days() as f64;
        let value = self.intercept + self.slope_per_day * days;
        if !value.is_finite() {
            return Err(OrchestratorError::HandlerFailure(format!(
                "预测值不是有限数值: {date}"
            )));
        }

        Ok(value.clamp(floor, cap))
    }
}

/// 最小二乘拟合线性趋势
#[derive(Debug, Clone, Copy, Default)]
pub struct TrendTrainer;

impl TrendTrainer {
    pub fn fit(&self, dataset: &[Observation]) -> OrchestratorResult<TrendModel> {
        let mut points = dataset
            .iter()
            .map(|obs| {
                if !obs.y.is_finite() {
                    return Err(OrchestratorError::InvalidPayload(format!(
                        "观测值不是有限数值: {}",
                        obs.ds
                    )));
                }
                Ok((parse_job_date(&obs.ds)?, obs.y))
            })
            .collect::<OrchestratorResult<Vec<_>>>()?;
        points.sort_by_key(|(date, _)| *date);

        let origin = match points.first() {
            Some((date, _)) => *date,
            None => {
                return Err(OrchestratorError::InvalidPayload(
                    "训练数据为空".to_string(),
                ))
            }
        };

        let n = points.len() as f64;
        let xs: Vec<f64> = points
            .iter()
            .map(|(date, _)| (*date - origin).num_days() as f64)
            .collect();
        let mean_x = xs.iter().sum::<f64>() / n;
        let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;

        let (mut sxy, mut sxx) = (0.0, 0.0);
        for (x, (_, y)) in xs.iter().zip(&points) {
            sxy += (x - mean_x) * (y - mean_y);
            sxx += (x - mean_x) * (x - mean_x);
        }

        // 所有观测落在同一天时只能拟合水平线
        let slope_per_day = if sxx > 0.0 { sxy / sxx } else { 0.0 };
        let intercept = mean_y - slope_per_day * mean_x;

        Ok(TrendModel::new(origin, intercept, slope_per_day))
    }
}

impl ModelTrainer for TrendTrainer {
    fn train(&self, _target: &str, dataset: &[Observation]) -> OrchestratorResult<serde_json::Value> {
        let model = self.fit(dataset)?;
        Ok(serde_json::to_value(model)?)
    }
}
