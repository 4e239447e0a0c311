pub mod config;
pub mod errors;
pub mod models;
pub mod traits;

pub use config::*;
pub use errors::*;
pub use models::{
    parse_job_date, Category, FuelType, JobMessage, JobPayload, Observation, ServiceRecord,
    TaskHandle, TaskId, TaskOutcome, TaskRecord, TaskState, TrainingWatermark,
};
pub use traits::{
    DataSource, ForecastModel, MessageQueue, ModelTrainer, ServiceRegistry, TaskStore,
    WatermarkStore,
};

/// 统一的Result类型
pub type OrchestratorResult<T> = std::result::Result<T, OrchestratorError>;
