use async_trait::async_trait;
use fuelcast_core::{DataSource, Observation, OrchestratorError, OrchestratorResult};
use serde::Deserialize;
use std::time::Duration;
use tracing::info;

use crate::discovery_client::{http_client, unavailable};
use crate::DiscoveryClient;

/// 数据服务的响应：直接的记录数组，或带 `data` 字段的对象
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SeriesResponse {
    Records(Vec<Observation>),
    Wrapped { data: Vec<Observation> },
}

impl SeriesResponse {
    fn into_observations(self) -> Vec<Observation> {
        match self {
            SeriesResponse::Records(records) => records,
            SeriesResponse::Wrapped { data } => data,
        }
    }
}

/// 通过服务发现定位数据服务的时间序列数据源
#[derive(Debug, Clone)]
pub struct HttpDataSource {
    discovery: DiscoveryClient,
    service_name: String,
    http_client: reqwest::Client,
}

impl HttpDataSource {
    pub fn new(
        discovery: DiscoveryClient,
        service_name: impl Into<String>,
        timeout: Duration,
    ) -> OrchestratorResult<Self> {
        Ok(Self {
            discovery,
            service_name: service_name.into(),
            http_client: http_client(timeout)?,
        })
    }

    async fn fetch(&self, target: &str, view: &str) -> OrchestratorResult<Vec<Observation>> {
        let service = self.discovery.lookup(&self.service_name).await?;
        let url = format!("{}/api/v1/{}/{}", service.base_url(), target, view);
        info!("Fetching {} series for {} from {}", view, target, url);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| unavailable(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(OrchestratorError::UpstreamUnavailable(format!(
                "数据服务返回 HTTP {status}: {url}"
            )));
        }

        let series: SeriesResponse = response
            .json()
            .await
            .map_err(|e| OrchestratorError::Serialization(format!("无效的时间序列数据: {e}")))?;
        Ok(series.into_observations())
    }
}

#[async_trait]
impl DataSource for HttpDataSource {
    async fn full(&self, target: &str) -> OrchestratorResult<Vec<Observation>> {
        self.fetch(target, "full").await
    }

    async fn latest(&self, target: &str) -> OrchestratorResult<Vec<Observation>> {
        self.fetch(target, "latest").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_response_shapes() {
        let plain = r#"[{"ds": "20240101", "y": 1.9, "cap": 2.1, "floor": 1.5}]"#;
        let series: SeriesResponse = serde_json::from_str(plain).unwrap();
        assert_eq!(series.into_observations().len(), 1);

        let wrapped = r#"{"data": [{"ds": "20240101", "y": 1.9}], "latestDate": "20240101"}"#;
        let series: SeriesResponse = serde_json::from_str(wrapped).unwrap();
        let observations = series.into_observations();
        assert_eq!(observations[0].ds, "20240101");
        assert_eq!(observations[0].y, 1.9);
    }

    #[tokio::test]
    async fn test_unreachable_discovery() {
        let discovery = DiscoveryClient::new("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();
        let source = HttpDataSource::new(discovery, "dataservice", Duration::from_secs(2)).unwrap();
        let err = source.full("lpg_3").await.unwrap_err();
        assert_eq!(err.kind(), "UPSTREAM_UNAVAILABLE");
    }
}
