pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;

pub use error::{ApiError, ApiResult};
pub use routes::{
    discovery_routes, prediction_routes, training_routes, with_observability, DiscoveryState,
    GatewayState, MetricsEndpoint, TrainingState,
};
