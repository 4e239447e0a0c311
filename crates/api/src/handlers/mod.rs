pub mod discovery;
pub mod health;
pub mod metrics;
pub mod predictions;
pub mod training;
