use std::time::Duration;

use async_trait::async_trait;

use crate::{models::JobMessage, OrchestratorResult};

/// 消息队列抽象接口
///
/// 每个任务类别对应一个独立的FIFO队列，不保证跨队列顺序。
#[async_trait]
pub trait MessageQueue: Send + Sync {
    /// 创建队列（已存在时不做任何操作）
    async fn create_queue(&self, queue: &str) -> OrchestratorResult<()>;

    /// 发布消息到指定队列，不会等待消费者
    async fn publish_message(&self, queue: &str, message: &JobMessage) -> OrchestratorResult<()>;

    /// 从指定队列取出一条消息，最多等待 `wait`，超时返回 `None`
    async fn consume_message(
        &self,
        queue: &str,
        wait: Duration,
    ) -> OrchestratorResult<Option<JobMessage>>;

    /// 获取队列中的消息数量
    async fn get_queue_size(&self, queue: &str) -> OrchestratorResult<u32>;

    /// 清空队列
    async fn purge_queue(&self, queue: &str) -> OrchestratorResult<()>;
}
