use crate::config::models::{AppConfig, BackendKind};
use crate::models::{Category, FuelType};

#[test]
fn test_default_config() {
    let config = AppConfig::default();
    assert!(config.validate().is_ok());

    // 验证默认值
    assert_eq!(config.gateway.rate_limit.max_requests, 10);
    assert_eq!(config.gateway.rate_limit.window_seconds, 60);
    assert_eq!(config.gateway.port(), 5000);
    assert_eq!(config.backend.kind, BackendKind::Memory);
    assert_eq!(config.training.data_service_name, "dataservice");
    for category in Category::ALL {
        assert_eq!(config.workers.count_for(category), 1);
    }
}

#[test]
fn test_config_from_toml() {
    let toml_content = r#"
[gateway]
bind_address = "127.0.0.1:9090"

[gateway.rate_limit]
max_requests = 30
window_seconds = 10

[training]
targets = ["lpg_3"]
api_key = "s3cret"

[workers]
lpg = 4
categories = ["lpg", "training"]

[fuel.lpg]
floor = 0.4
cap = 1.6

[fuel.lpg.model]
origin = "2024-03-04"
intercept = 0.9
slope_per_day = 0.001

[backend]
kind = "redis"
redis_url = "redis://cache:6379"
"#;

    let config = AppConfig::from_toml(toml_content).unwrap();
    assert_eq!(config.gateway.port(), 9090);
    assert_eq!(config.gateway.rate_limit.max_requests, 30);
    assert_eq!(config.training.targets, vec!["lpg_3".to_string()]);
    assert_eq!(config.training.api_key.as_deref(), Some("s3cret"));
    assert_eq!(config.workers.count_for(Category::Prediction(FuelType::Lpg)), 4);
    assert_eq!(
        config.workers.categories,
        vec![Category::Prediction(FuelType::Lpg), Category::Training]
    );
    // 未覆盖的类别保持默认
    assert_eq!(config.workers.count_for(Category::Training), 1);
    assert_eq!(config.fuel.get(FuelType::Lpg).cap, 1.6);
    assert_eq!(config.fuel.get(FuelType::Diesel).floor, 1.0);
    assert!(config.backend.is_redis());
}

#[test]
fn test_invalid_fuel_bounds_are_rejected() {
    let toml_content = r#"
[fuel.diesel]
floor = 3.0
cap = 2.0

[fuel.diesel.model]
origin = "2024-01-01"
intercept = 1.0
slope_per_day = 0.0
"#;
    assert!(AppConfig::from_toml(toml_content).is_err());
}

#[test]
fn test_zero_workers_is_rejected() {
    let mut config = AppConfig::default();
    config.workers.training = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_unknown_category_is_rejected() {
    let toml_content = r#"
[workers]
categories = ["kerosene"]
"#;
    assert!(AppConfig::from_toml(toml_content).is_err());
}

#[test]
fn test_invalid_backend_url_is_rejected() {
    let mut config = AppConfig::default();
    config.backend.kind = BackendKind::Redis;
    config.backend.redis_url = "http://localhost:6379".to_string();
    assert!(config.validate().is_err());

    // 内存后端不关心Redis地址
    config.backend.kind = BackendKind::Memory;
    assert!(config.validate().is_ok());
}

#[test]
fn test_rate_limit_validation() {
    let mut config = AppConfig::default();
    config.gateway.rate_limit.max_requests = 0;
    assert!(config.validate().is_err());

    config.gateway.rate_limit.enabled = false;
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_toml_roundtrip() {
    let config = AppConfig::default();
    let serialized = config.to_toml().unwrap();
    let parsed = AppConfig::from_toml(&serialized).unwrap();
    assert_eq!(parsed.gateway.bind_address, config.gateway.bind_address);
    assert_eq!(parsed.training.targets, config.training.targets);
}
