use fuelcast_core::{OrchestratorResult, ServiceRecord, ServiceRegistry};
use metrics::counter;
use std::sync::Arc;
use tracing::info;

/// 服务发现：注册表之上的一层薄封装，负责校验和日志
#[derive(Clone)]
pub struct DiscoveryService {
    registry: Arc<dyn ServiceRegistry>,
}

impl DiscoveryService {
    pub fn new(registry: Arc<dyn ServiceRegistry>) -> Self {
        Self { registry }
    }

    /// 注册或覆盖服务记录，后写者生效
    pub async fn register(
        &self,
        name: &str,
        host: &str,
        port: u16,
    ) -> OrchestratorResult<ServiceRecord> {
        let record = ServiceRecord::new(name, host, port)?;
        self.registry.register(record.clone()).await?;

        counter!("fuelcast_registrations_total").increment(1);
        info!(
            "Registered service {} at {}:{}",
            record.name, record.host, record.port
        );
        Ok(record)
    }

    pub async fn lookup(&self, name: &str) -> OrchestratorResult<ServiceRecord> {
        let record = self.registry.lookup(name).await?;
        info!(
            "Discovered service {} at {}:{}",
            record.name, record.host, record.port
        );
        Ok(record)
    }

    pub async fn list(&self) -> OrchestratorResult<Vec<ServiceRecord>> {
        self.registry.list().await
    }
}
