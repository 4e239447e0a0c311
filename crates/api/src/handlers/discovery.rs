use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use fuelcast_core::OrchestratorError;
use serde::Deserialize;
use tracing::warn;

use crate::{
    error::ApiResult,
    response::{MessageResponse, ServiceResponse},
    routes::DiscoveryState,
};

const INVALID_REGISTRATION: &str = "Invalid data provided";

/// 服务注册请求，缺失任一字段都按无效注册处理
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

pub async fn register_service(
    State(state): State<DiscoveryState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("Rejected registration body: {}", rejection.body_text());
        OrchestratorError::InvalidRegistration(INVALID_REGISTRATION.to_string())
    })?;

    let (Some(name), Some(host), Some(port)) = (request.name, request.host, request.port) else {
        return Err(
            OrchestratorError::InvalidRegistration(INVALID_REGISTRATION.to_string()).into(),
        );
    };

    let record = state.discovery.register(&name, &host, port).await?;
    Ok(Json(MessageResponse {
        message: format!("Service {} registered successfully", record.name),
    }))
}

pub async fn discover_service(
    State(state): State<DiscoveryState>,
    Path(name): Path<String>,
) -> ApiResult<Json<ServiceResponse>> {
    let record = state.discovery.lookup(&name).await?;
    Ok(Json(record.into()))
}

pub async fn list_services(
    State(state): State<DiscoveryState>,
) -> ApiResult<Json<Vec<ServiceResponse>>> {
    let records = state.discovery.list().await?;
    Ok(Json(records.into_iter().map(ServiceResponse::from).collect()))
}
