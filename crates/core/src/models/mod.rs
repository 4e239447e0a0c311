//! # 数据模型
//!
//! 定义编排层的核心数据结构：服务注册记录、任务类别、任务记录、队列消息与训练水位。
//!
//! ## 核心模型
//!
//! ### Category - 任务类别
//! 封闭枚举：三种燃料类型的预测类别加上训练类别。每个类别拥有独立的队列和Worker池。
//!
//! ### TaskRecord - 任务记录
//! 跟踪一次提交从 `Pending` 到终态（`Success` / `Failure`）的完整生命周期。
//! 状态转换只能通过 [`TaskRecord::start`]、[`TaskRecord::succeed`]、[`TaskRecord::fail`] 完成，
//! 终态不可变。
//!
//! ### JobMessage - 队列消息
//! 分发给Worker的任务描述，入队后不可变。
//!
//! ## 设计原则
//! - 所有时间字段使用 `DateTime<Utc>`
//! - 对外序列化统一使用 camelCase 字段名
//! - 未知类别只在无类型的网络边界被报告，进入系统后即为类型安全的枚举值

pub mod category;
pub mod message;
pub mod service;
pub mod task;
pub mod watermark;

pub use category::{Category, FuelType};
pub use message::{parse_job_date, JobMessage, JobPayload, Observation};
pub use service::ServiceRecord;
pub use task::{TaskHandle, TaskId, TaskOutcome, TaskRecord, TaskState};
pub use watermark::TrainingWatermark;
