use fuelcast_core::{OrchestratorError, OrchestratorResult, ServiceRecord};
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, info};

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: String,
}

/// 把连接错误统一映射为上游不可用
pub(crate) fn unavailable(url: &str, e: reqwest::Error) -> OrchestratorError {
    error!("Request to {} failed: {}", url, e);
    OrchestratorError::UpstreamUnavailable(format!("{url}: {e}"))
}

pub(crate) fn http_client(timeout: Duration) -> OrchestratorResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| OrchestratorError::Configuration(format!("创建HTTP客户端失败: {e}")))
}

/// 服务发现客户端：自注册和查找协作服务
#[derive(Debug, Clone)]
pub struct DiscoveryClient {
    base_url: String,
    http_client: reqwest::Client,
}

impl DiscoveryClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> OrchestratorResult<Self> {
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client: http_client(timeout)?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn register(&self, record: &ServiceRecord) -> OrchestratorResult<()> {
        let url = format!("{}/register", self.base_url);
        let response = self
            .http_client
            .post(&url)
            .json(record)
            .send()
            .await
            .map_err(|e| unavailable(&url, e))?;

        let status = response.status();
        if status.is_success() {
            info!(
                "Registered {} at {}:{} with discovery",
                record.name, record.host, record.port
            );
            return Ok(());
        }

        let body: ErrorBody = response.json().await.unwrap_or_default();
        if status == StatusCode::BAD_REQUEST {
            return Err(OrchestratorError::InvalidRegistration(body.error));
        }
        Err(OrchestratorError::UpstreamUnavailable(format!(
            "服务注册失败: HTTP {status} {}",
            body.error
        )))
    }

    pub async fn lookup(&self, name: &str) -> OrchestratorResult<ServiceRecord> {
        let url = format!("{}/discover/{}", self.base_url, name);
        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| unavailable(&url, e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(OrchestratorError::ServiceNotFound {
                name: name.to_string(),
            });
        }
        if !status.is_success() {
            return Err(OrchestratorError::UpstreamUnavailable(format!(
                "服务查找失败: HTTP {status}"
            )));
        }

        let record: ServiceRecord = response
            .json()
            .await
            .map_err(|e| OrchestratorError::Serialization(format!("无效的服务记录: {e}")))?;
        debug!("Resolved {} to {}", name, record.base_url());
        Ok(record)
    }
}
