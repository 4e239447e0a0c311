use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use fuelcast_dispatcher::{DiscoveryService, DispatchGateway, SlidingWindowLimiter, TrainingTrigger};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

use crate::{
    handlers::{
        discovery::{discover_service, list_services, register_service},
        health::health_body,
        metrics::render_metrics,
        predictions::{prediction_status, submit_prediction},
        training::{training_date, training_result, trigger_training},
    },
    middleware::{cors_layer, rate_limit, request_logging, require_api_key, trace_layer},
};

/// 服务发现的应用状态
#[derive(Clone)]
pub struct DiscoveryState {
    pub discovery: DiscoveryService,
}

/// 预测网关的应用状态
#[derive(Clone)]
pub struct GatewayState {
    pub gateway: DispatchGateway,
    /// 为空时不限流
    pub limiter: Option<Arc<SlidingWindowLimiter>>,
}

/// 训练触发器的应用状态
#[derive(Clone)]
pub struct TrainingState {
    pub trigger: TrainingTrigger,
    pub api_key: Option<Arc<str>>,
}

impl TrainingState {
    pub fn new(trigger: TrainingTrigger, api_key: Option<String>) -> Self {
        Self {
            trigger,
            api_key: api_key.map(Arc::from),
        }
    }
}

#[derive(Clone)]
pub struct MetricsEndpoint {
    pub path: String,
    pub handle: PrometheusHandle,
}

pub fn discovery_routes(state: DiscoveryState) -> Router {
    Router::new()
        .route("/register", post(register_service))
        .route("/discover/{name}", get(discover_service))
        .route("/services", get(list_services))
        .with_state(state)
}

/// 预测提交和状态轮询共用同一个限流窗口
pub fn prediction_routes(state: GatewayState) -> Router {
    let mut router = Router::new()
        .route("/api/v1/predictions", post(submit_prediction))
        .route(
            "/api/v1/predictions/{fuel_type}/{task_id}",
            get(prediction_status),
        );

    if let Some(limiter) = state.limiter.clone() {
        router = router.route_layer(from_fn_with_state(limiter, rate_limit));
    }

    router.with_state(state)
}

pub fn training_routes(state: TrainingState) -> Router {
    let guarded: Router<TrainingState> = Router::new()
        .route("/api/v1/trainingdate", get(training_date))
        .route_layer(from_fn_with_state(state.api_key.clone(), require_api_key));

    Router::new()
        .route("/api/v1/triggers/{target}", post(trigger_training))
        .route("/api/v1/results/{task_id}", get(training_result))
        .merge(guarded)
        .with_state(state)
}

/// 为服务路由附加健康检查、指标导出以及日志/追踪/CORS中间件
pub fn with_observability(
    router: Router,
    service: &str,
    metrics: Option<&MetricsEndpoint>,
) -> Router {
    let service = service.to_string();
    let mut router = router.route(
        "/health",
        get(move || {
            let service = service.clone();
            async move { health_body(&service) }
        }),
    );

    if let Some(endpoint) = metrics {
        router = router.route(
            &endpoint.path,
            get(render_metrics).with_state(endpoint.handle.clone()),
        );
    }

    router
        .layer(from_fn(request_logging))
        .layer(trace_layer())
        .layer(cors_layer())
}
