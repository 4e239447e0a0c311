pub mod handlers;
pub mod model;
pub mod pool;

pub use handlers::{JobHandler, PredictionHandler, TrainingHandler};
pub use model::{TrendModel, TrendTrainer};
pub use pool::{CompletionHook, WorkerPool};
