use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::OrchestratorError;

/// 燃料类型（预测类别）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FuelType {
    Euro95,
    Diesel,
    Lpg,
}

impl FuelType {
    pub const ALL: [FuelType; 3] = [FuelType::Euro95, FuelType::Diesel, FuelType::Lpg];

    pub fn as_str(&self) -> &'static str {
        match self {
            FuelType::Euro95 => "euro95",
            FuelType::Diesel => "diesel",
            FuelType::Lpg => "lpg",
        }
    }
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FuelType {
    type Err = OrchestratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "euro95" => Ok(FuelType::Euro95),
            "diesel" => Ok(FuelType::Diesel),
            "lpg" => Ok(FuelType::Lpg),
            other => Err(OrchestratorError::InvalidCategory(format!(
                "'{other}'，可选值为 euro95, diesel, lpg"
            ))),
        }
    }
}

/// 任务类别
///
/// 每个类别对应一个队列和一个Worker池，集合在编译期固定。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Category {
    Prediction(FuelType),
    Training,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Prediction(FuelType::Euro95),
        Category::Prediction(FuelType::Diesel),
        Category::Prediction(FuelType::Lpg),
        Category::Training,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Prediction(fuel) => fuel.as_str(),
            Category::Training => "training",
        }
    }

    /// 该类别专属的队列名称
    pub fn queue_name(&self) -> String {
        format!("{}_queue", self.as_str())
    }

    pub fn is_training(&self) -> bool {
        matches!(self, Category::Training)
    }

    pub fn fuel_type(&self) -> Option<FuelType> {
        match self {
            Category::Prediction(fuel) => Some(*fuel),
            Category::Training => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = OrchestratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("training") {
            return Ok(Category::Training);
        }
        s.parse::<FuelType>().map(Category::Prediction)
    }
}

impl From<FuelType> for Category {
    fn from(fuel: FuelType) -> Self {
        Category::Prediction(fuel)
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.as_str().to_string()
    }
}

impl TryFrom<String> for Category {
    type Error = OrchestratorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fuel_types() {
        assert_eq!("lpg".parse::<FuelType>().unwrap(), FuelType::Lpg);
        assert_eq!("EURO95".parse::<FuelType>().unwrap(), FuelType::Euro95);
        assert_eq!(" diesel ".parse::<FuelType>().unwrap(), FuelType::Diesel);
    }

    #[test]
    fn test_unknown_category_is_rejected() {
        let err = "kerosene".parse::<Category>().unwrap_err();
        assert_eq!(err.kind(), "INVALID_CATEGORY");
    }

    #[test]
    fn test_queue_names_are_distinct() {
        let names: std::collections::HashSet<_> =
            Category::ALL.iter().map(|c| c.queue_name()).collect();
        assert_eq!(names.len(), Category::ALL.len());
        assert_eq!(Category::Training.queue_name(), "training_queue");
        assert_eq!(Category::from(FuelType::Lpg).queue_name(), "lpg_queue");
    }

    #[test]
    fn test_category_serializes_as_plain_string() {
        let json = serde_json::to_string(&Category::Prediction(FuelType::Diesel)).unwrap();
        assert_eq!(json, "\"diesel\"");
        let parsed: Category = serde_json::from_str("\"training\"").unwrap();
        assert_eq!(parsed, Category::Training);
        assert!(serde_json::from_str::<Category>("\"petrol\"").is_err());
    }
}
