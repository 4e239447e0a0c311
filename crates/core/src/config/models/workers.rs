use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::models::{Category, FuelType};

/// 每个类别的Worker数量
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkersConfig {
    /// 本进程运行Worker池的类别
    pub categories: Vec<Category>,
    pub euro95: usize,
    pub diesel: usize,
    pub lpg: usize,
    pub training: usize,
    /// Worker单次等待队列消息的最长时间（毫秒），决定响应关闭信号的延迟
    pub dequeue_wait_ms: u64,
}

impl Default for WorkersConfig {
    fn default() -> Self {
        Self {
            categories: Category::ALL.to_vec(),
            euro95: 1,
            diesel: 1,
            lpg: 1,
            training: 1,
            dequeue_wait_ms: 1000,
        }
    }
}

impl WorkersConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.categories.is_empty() {
            return Err(anyhow::anyhow!("至少需要启用一个任务类别"));
        }

        for category in Category::ALL {
            if self.count_for(category) == 0 {
                return Err(anyhow::anyhow!(
                    "类别 {} 的Worker数量必须大于0",
                    category
                ));
            }
        }

        if self.dequeue_wait_ms == 0 {
            return Err(anyhow::anyhow!("队列等待时间必须大于0"));
        }

        Ok(())
    }

    pub fn count_for(&self, category: Category) -> usize {
        match category {
            Category::Prediction(FuelType::Euro95) => self.euro95,
            Category::Prediction(FuelType::Diesel) => self.diesel,
            Category::Prediction(FuelType::Lpg) => self.lpg,
            Category::Training => self.training,
        }
    }

    pub fn dequeue_wait(&self) -> Duration {
        Duration::from_millis(self.dequeue_wait_ms)
    }
}

/// 启动时加载的趋势模型系数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelCoefficients {
    pub origin: NaiveDate,
    pub intercept: f64,
    pub slope_per_day: f64,
}

/// 单一燃料类型的预测参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuelConfig {
    pub floor: f64,
    pub cap: f64,
    pub model: ModelCoefficients,
}

impl FuelConfig {
    fn new(floor: f64, cap: f64, intercept: f64) -> Self {
        Self {
            floor,
            cap,
            model: ModelCoefficients {
                origin: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
                intercept,
                slope_per_day: 0.0,
            },
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.floor.is_finite() || !self.cap.is_finite() {
            return Err(anyhow::anyhow!("floor/cap 必须是有限数值"));
        }
        if self.floor >= self.cap {
            return Err(anyhow::anyhow!(
                "floor ({}) 必须小于 cap ({})",
                self.floor,
                self.cap
            ));
        }
        if !self.model.intercept.is_finite() || !self.model.slope_per_day.is_finite() {
            return Err(anyhow::anyhow!("模型系数必须是有限数值"));
        }
        Ok(())
    }
}

/// 各燃料类型的预测参数
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FuelSettings {
    pub euro95: FuelConfig,
    pub diesel: FuelConfig,
    pub lpg: FuelConfig,
}

impl Default for FuelSettings {
    fn default() -> Self {
        Self {
            euro95: FuelConfig::new(1.2, 2.6, 1.95),
            diesel: FuelConfig::new(1.0, 2.4, 1.75),
            lpg: FuelConfig::new(0.5, 1.4, 0.85),
        }
    }
}

impl FuelSettings {
    pub fn get(&self, fuel: FuelType) -> &FuelConfig {
        match fuel {
            FuelType::Euro95 => &self.euro95,
            FuelType::Diesel => &self.diesel,
            FuelType::Lpg => &self.lpg,
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        for fuel in FuelType::ALL {
            self.get(fuel)
                .validate()
                .map_err(|e| anyhow::anyhow!("fuel.{}: {}", fuel, e))?;
        }
        Ok(())
    }
}
