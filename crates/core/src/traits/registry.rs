use async_trait::async_trait;

use crate::{models::ServiceRecord, OrchestratorResult};

/// 服务注册表
#[async_trait]
pub trait ServiceRegistry: Send + Sync {
    /// 按名称插入或覆盖记录，后写者生效
    async fn register(&self, record: ServiceRecord) -> OrchestratorResult<()>;

    /// 按名称查询，不存在时返回 `ServiceNotFound`
    async fn lookup(&self, name: &str) -> OrchestratorResult<ServiceRecord>;

    /// 列出所有记录（按名称排序）
    async fn list(&self) -> OrchestratorResult<Vec<ServiceRecord>>;
}
