//! 配置管理
//!
//! 配置按以下顺序加载，后者覆盖前者：
//! 1. 内置默认值（各配置结构的 `Default` 实现）
//! 2. TOML 配置文件
//! 3. `FUELCAST_` 前缀的环境变量，层级之间使用 `__` 分隔，
//!    例如 `FUELCAST_GATEWAY__BIND_ADDRESS=0.0.0.0:5000`
//!
//! ```rust,no_run
//! use fuelcast_core::config::AppConfig;
//!
//! let config = AppConfig::load(Some("config/fuelcast.toml"))?;
//! println!("gateway listens on {}", config.gateway.bind_address);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod models;

#[cfg(test)]
mod tests;

pub use models::{
    AppConfig, BackendConfig, BackendKind, DiscoveryConfig, FuelConfig, FuelSettings,
    GatewayConfig, ModelCoefficients, ObservabilityConfig, RateLimitConfig, TrainingConfig,
    WorkersConfig,
};
