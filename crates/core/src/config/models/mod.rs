pub mod app_config;
pub mod backend;
pub mod services;
pub mod workers;

// Re-export main types for easier imports
pub use app_config::AppConfig;
pub use backend::{BackendConfig, BackendKind};
pub use services::{
    DiscoveryConfig, GatewayConfig, ObservabilityConfig, RateLimitConfig, TrainingConfig,
};
pub use workers::{FuelConfig, FuelSettings, ModelCoefficients, WorkersConfig};
