use async_trait::async_trait;
use fuelcast_core::{JobMessage, MessageQueue, OrchestratorError, OrchestratorResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex, RwLock};
use tracing::{debug, error, info};

/// 内存消息队列实现
///
/// 使用 Tokio channels 实现的无界FIFO队列，适用于单进程部署场景和测试。
/// 同一队列的多个消费者共享接收端，每条消息只会被一个消费者取走。
#[derive(Debug, Default)]
pub struct InMemoryMessageQueue {
    /// 队列存储：队列名 -> 通道
    queues: RwLock<HashMap<String, QueueChannels>>,
}

#[derive(Debug, Clone)]
struct QueueChannels {
    sender: mpsc::UnboundedSender<JobMessage>,
    /// 使用 Arc 包装接收端，支持多个消费者
    receiver: Arc<Mutex<mpsc::UnboundedReceiver<JobMessage>>>,
    /// 队列大小统计
    size: Arc<AtomicU32>,
}

impl QueueChannels {
    fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender,
            receiver: Arc::new(Mutex::new(receiver)),
            size: Arc::new(AtomicU32::new(0)),
        }
    }
}

impl InMemoryMessageQueue {
    /// 创建新的内存消息队列实例
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取或创建队列通道
    async fn channels(&self, queue_name: &str) -> QueueChannels {
        if let Some(channels) = self.queues.read().await.get(queue_name) {
            return channels.clone();
        }

        let mut queues = self.queues.write().await;
        queues
            .entry(queue_name.to_string())
            .or_insert_with(|| {
                debug!("Creating new queue: {}", queue_name);
                QueueChannels::new()
            })
            .clone()
    }
}

#[async_trait]
impl MessageQueue for InMemoryMessageQueue {
    async fn create_queue(&self, queue: &str) -> OrchestratorResult<()> {
        self.channels(queue).await;
        info!("Queue '{}' ready", queue);
        Ok(())
    }

    async fn publish_message(&self, queue: &str, message: &JobMessage) -> OrchestratorResult<()> {
        debug!(
            "Publishing message to queue '{}': {}",
            queue, message.task_id
        );

        let channels = self.channels(queue).await;
        // 先计数再发送，已阻塞在recv的消费者不会把计数减到0以下
        channels.size.fetch_add(1, Ordering::SeqCst);
        channels.sender.send(message.clone()).map_err(|e| {
            channels.size.fetch_sub(1, Ordering::SeqCst);
            error!("Failed to send message to queue '{}': {}", queue, e);
            OrchestratorError::MessageQueue(format!(
                "Failed to send message to queue '{}': {}",
                queue, e
            ))
        })?;

        Ok(())
    }

    async fn consume_message(
        &self,
        queue: &str,
        wait: Duration,
    ) -> OrchestratorResult<Option<JobMessage>> {
        let channels = self.channels(queue).await;

        // 等待接收端锁的时间同样计入wait
        let received = tokio::time::timeout(wait, async {
            let mut rx = channels.receiver.lock().await;
            rx.recv().await
        })
        .await;

        match received {
            Ok(Some(message)) => {
                channels.size.fetch_sub(1, Ordering::SeqCst);
                debug!("Consumed message {} from queue '{}'", message.task_id, queue);
                Ok(Some(message))
            }
            // 发送端始终由队列表持有，通道不会关闭
            Ok(None) => Err(OrchestratorError::MessageQueue(format!(
                "Queue '{}' channel closed",
                queue
            ))),
            Err(_) => Ok(None),
        }
    }

    async fn get_queue_size(&self, queue: &str) -> OrchestratorResult<u32> {
        let queues = self.queues.read().await;
        let size = queues
            .get(queue)
            .map(|channels| channels.size.load(Ordering::SeqCst))
            .ok_or_else(|| {
                OrchestratorError::MessageQueue(format!("Queue '{}' not found", queue))
            })?;

        debug!("Queue '{}' size: {}", queue, size);
        Ok(size)
    }

    async fn purge_queue(&self, queue: &str) -> OrchestratorResult<()> {
        info!("Purging queue '{}'", queue);

        let channels = self.channels(queue).await;
        let mut purged_count = 0;
        {
            let mut rx = channels.receiver.lock().await;
            while rx.try_recv().is_ok() {
                purged_count += 1;
            }
        }
        channels.size.store(0, Ordering::SeqCst);

        info!("Purged {} messages from queue '{}'", purged_count, queue);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fuelcast_core::{Category, FuelType, JobPayload, TaskId};

    fn message(dates: &[&str]) -> JobMessage {
        JobMessage::new(
            TaskId::new(),
            Category::Prediction(FuelType::Lpg),
            JobPayload::Prediction {
                dates: dates.iter().map(|d| d.to_string()).collect(),
            },
        )
    }

    #[tokio::test]
    async fn test_create_and_publish_message() {
        let queue = InMemoryMessageQueue::new();
        let queue_name = "lpg_queue";

        queue.create_queue(queue_name).await.unwrap();
        assert_eq!(queue.get_queue_size(queue_name).await.unwrap(), 0);

        let message = message(&["20240301"]);
        queue.publish_message(queue_name, &message).await.unwrap();
        assert_eq!(queue.get_queue_size(queue_name).await.unwrap(), 1);

        let consumed = queue
            .consume_message(queue_name, Duration::from_millis(50))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(consumed.task_id, message.task_id);

        // 消费后队列为空
        assert_eq!(queue.get_queue_size(queue_name).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_consume_times_out_on_empty_queue() {
        let queue = InMemoryMessageQueue::new();
        let consumed = queue
            .consume_message("diesel_queue", Duration::from_millis(20))
            .await
            .unwrap();
        assert!(consumed.is_none());
    }

    #[tokio::test]
    async fn test_fifo_order_within_queue() {
        let queue = InMemoryMessageQueue::new();
        let first = message(&["20240301"]);
        let second = message(&["20240302"]);
        queue.publish_message("euro95_queue", &first).await.unwrap();
        queue.publish_message("euro95_queue", &second).await.unwrap();

        let wait = Duration::from_millis(50);
        let a = queue.consume_message("euro95_queue", wait).await.unwrap().unwrap();
        let b = queue.consume_message("euro95_queue", wait).await.unwrap().unwrap();
        assert_eq!(a.task_id, first.task_id);
        assert_eq!(b.task_id, second.task_id);
    }

    #[tokio::test]
    async fn test_queues_are_independent() {
        let queue = InMemoryMessageQueue::new();
        queue.publish_message("euro95_queue", &message(&["20240301"])).await.unwrap();

        let wait = Duration::from_millis(20);
        assert!(queue.consume_message("lpg_queue", wait).await.unwrap().is_none());
        assert!(queue.consume_message("euro95_queue", wait).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_consumer_wakes_up_on_publish() {
        let queue = Arc::new(InMemoryMessageQueue::new());
        queue.create_queue("training_queue").await.unwrap();

        let consumer = {
            let queue = queue.clone();
            tokio::spawn(async move {
                queue
                    .consume_message("training_queue", Duration::from_secs(5))
                    .await
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        let message = message(&["20240301"]);
        queue.publish_message("training_queue", &message).await.unwrap();

        let consumed = consumer.await.unwrap().unwrap().unwrap();
        assert_eq!(consumed.task_id, message.task_id);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_size_never_underflows_with_parked_consumer() {
        let queue = Arc::new(InMemoryMessageQueue::new());
        queue.create_queue("diesel_queue").await.unwrap();

        for _ in 0..200 {
            let consumer = {
                let queue = queue.clone();
                tokio::spawn(async move {
                    queue
                        .consume_message("diesel_queue", Duration::from_secs(5))
                        .await
                })
            };
            tokio::task::yield_now().await;

            queue
                .publish_message("diesel_queue", &message(&["20240301"]))
                .await
                .unwrap();
            assert!(queue.get_queue_size("diesel_queue").await.unwrap() <= 1);

            consumer.await.unwrap().unwrap().unwrap();
            assert_eq!(queue.get_queue_size("diesel_queue").await.unwrap(), 0);
        }
    }

    #[tokio::test]
    async fn test_purge_queue() {
        let queue = InMemoryMessageQueue::new();
        for i in 0..5 {
            let date = format!("2024030{}", i + 1);
            queue
                .publish_message("lpg_queue", &message(&[date.as_str()]))
                .await
                .unwrap();
        }
        assert_eq!(queue.get_queue_size("lpg_queue").await.unwrap(), 5);

        queue.purge_queue("lpg_queue").await.unwrap();
        assert_eq!(queue.get_queue_size("lpg_queue").await.unwrap(), 0);
        assert!(queue
            .consume_message("lpg_queue", Duration::from_millis(20))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_size_of_unknown_queue_fails() {
        let queue = InMemoryMessageQueue::new();
        assert!(queue.get_queue_size("nope").await.is_err());
    }
}
