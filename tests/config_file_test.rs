use fuelcast_core::{AppConfig, BackendKind, Category, FuelType};

#[test]
fn test_sample_config_loads() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/fuelcast.toml");
    let config = AppConfig::load(Some(path)).unwrap();

    assert_eq!(config.gateway.service_name, "predservice");
    assert_eq!(config.gateway.port(), 5000);
    assert_eq!(config.gateway.rate_limit.max_requests, 10);
    assert_eq!(config.training.targets, vec!["euro95_1", "diesel_2", "lpg_3"]);
    assert_eq!(config.backend.kind, BackendKind::Memory);
    assert_eq!(config.workers.categories, Category::ALL.to_vec());
    assert_eq!(config.fuel.get(FuelType::Lpg).floor, 0.5);
}
