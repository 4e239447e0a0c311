pub mod data_source;
pub mod discovery;
pub mod discovery_client;
pub mod gateway;
pub mod rate_limit;
pub mod training;

pub use data_source::HttpDataSource;
pub use discovery::DiscoveryService;
pub use discovery_client::DiscoveryClient;
pub use gateway::DispatchGateway;
pub use rate_limit::SlidingWindowLimiter;
pub use training::{TrainingTrigger, WatermarkHook};
