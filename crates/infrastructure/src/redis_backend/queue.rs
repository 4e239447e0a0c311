use async_trait::async_trait;
use metrics::counter;
use fuelcast_core::{JobMessage, MessageQueue, OrchestratorResult};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use super::{queue_error, KeySpace};

/// 基于Redis列表的消息队列
///
/// 生产者 `LPUSH`，消费者 `RPOP`，同一列表内保持FIFO。共享的多路复用连接上不能使用阻塞命令，
/// 队列为空时按 `poll_interval` 轮询直到等待时间耗尽。
#[derive(Clone)]
pub struct RedisMessageQueue {
    conn: ConnectionManager,
    keys: KeySpace,
    poll_interval: Duration,
}

impl RedisMessageQueue {
    pub fn new(conn: ConnectionManager, key_prefix: &str, poll_interval: Duration) -> Self {
        Self {
            conn,
            keys: KeySpace::new(key_prefix),
            poll_interval,
        }
    }
}

#[async_trait]
impl MessageQueue for RedisMessageQueue {
    async fn create_queue(&self, queue: &str) -> OrchestratorResult<()> {
        // Redis列表在首次写入时自动创建
        info!("Queue '{}' ready at key {}", queue, self.keys.queue(queue));
        Ok(())
    }

    async fn publish_message(&self, queue: &str, message: &JobMessage) -> OrchestratorResult<()> {
        let payload = message.to_json()?;
        let mut conn = self.conn.clone();
        conn.lpush::<_, _, ()>(self.keys.queue(queue), payload)
            .await
            .map_err(queue_error)?;

        debug!(
            "Published message {} to queue '{}'",
            message.task_id, queue
        );
        Ok(())
    }

    async fn consume_message(
        &self,
        queue: &str,
        wait: Duration,
    ) -> OrchestratorResult<Option<JobMessage>> {
        let key = self.keys.queue(queue);
        let deadline = Instant::now() + wait;
        let mut conn = self.conn.clone();

        loop {
            let raw: Option<String> = conn.rpop(&key, None).await.map_err(queue_error)?;
            if let Some(raw) = raw {
                match JobMessage::from_json(&raw) {
                    Ok(message) => {
                        debug!("Consumed message {} from queue '{}'", message.task_id, queue);
                        return Ok(Some(message));
                    }
                    Err(e) => {
                        // 无法解析的消息直接丢弃，继续取下一条
                        warn!("Dropping malformed message on queue '{}': {}", queue, e);
                        counter!("fuelcast_malformed_messages_total").increment(1);
                        continue;
                    }
                }
            }

            let now = Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            sleep(self.poll_interval.min(deadline - now)).await;
        }
    }

    async fn get_queue_size(&self, queue: &str) -> OrchestratorResult<u32> {
        let mut conn = self.conn.clone();
        let size: u32 = conn
            .llen(self.keys.queue(queue))
            .await
            .map_err(queue_error)?;
        debug!("Queue '{}' size: {}", queue, size);
        Ok(size)
    }

    async fn purge_queue(&self, queue: &str) -> OrchestratorResult<()> {
        info!("Purging queue '{}'", queue);
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(self.keys.queue(queue))
            .await
            .map_err(queue_error)?;
        Ok(())
    }
}
