use fuelcast_core::{
    Category, JobMessage, JobPayload, MessageQueue, OrchestratorError, OrchestratorResult,
    TaskHandle, TaskId, TaskOutcome, TaskRecord, TaskStore,
};
use metrics::counter;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// 任务队列织网
///
/// 把按类别分片的消息队列和任务记录表组合在一起：提交方只拿到任务句柄，
/// Worker通过它认领任务、写入终态，调用方通过它轮询状态。
#[derive(Clone)]
pub struct TaskFabric {
    queue: Arc<dyn MessageQueue>,
    tasks: Arc<dyn TaskStore>,
}

impl TaskFabric {
    pub fn new(queue: Arc<dyn MessageQueue>, tasks: Arc<dyn TaskStore>) -> Self {
        Self { queue, tasks }
    }

    /// 为所有类别声明队列
    pub async fn declare_queues(&self) -> OrchestratorResult<()> {
        for category in Category::ALL {
            self.queue.create_queue(&category.queue_name()).await?;
        }
        Ok(())
    }

    /// 入队：先写Pending记录再发布消息，发布失败时撤销记录
    pub async fn enqueue(
        &self,
        category: Category,
        payload: JobPayload,
    ) -> OrchestratorResult<TaskHandle> {
        let id = TaskId::new();
        let record = TaskRecord::pending(id, category);
        let handle = record.handle();
        self.tasks.insert(record).await?;

        let message = JobMessage::new(id, category, payload);
        if let Err(e) = self
            .queue
            .publish_message(&category.queue_name(), &message)
            .await
        {
            error!("Failed to publish task {} to {}: {}", id, category.queue_name(), e);
            if let Err(discard_err) = self.tasks.discard(&id).await {
                error!("Failed to discard task record {}: {}", id, discard_err);
            }
            return Err(OrchestratorError::UpstreamUnavailable(format!(
                "任务队列不可用: {e}"
            )));
        }

        counter!("fuelcast_jobs_submitted_total", "category" => category.as_str()).increment(1);
        info!("Enqueued task {} on {}", id, category.queue_name());
        Ok(handle)
    }

    /// 从类别队列取出下一条消息，最多等待 `wait`
    pub async fn dequeue(
        &self,
        category: Category,
        wait: Duration,
    ) -> OrchestratorResult<Option<JobMessage>> {
        self.queue
            .consume_message(&category.queue_name(), wait)
            .await
    }

    /// 认领任务。记录缺失或已不是Pending（重复投递）时返回 `None`
    pub async fn claim(&self, id: &TaskId) -> OrchestratorResult<Option<TaskRecord>> {
        match self.tasks.start(id).await {
            Ok(record) => Ok(Some(record)),
            Err(OrchestratorError::UnknownTask { .. })
            | Err(OrchestratorError::InvalidTransition { .. }) => {
                debug!("Task {} is not claimable, skipping", id);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// 写入终态
    pub async fn complete(
        &self,
        id: &TaskId,
        outcome: TaskOutcome,
    ) -> OrchestratorResult<TaskRecord> {
        let record = self.tasks.complete(id, outcome).await?;
        counter!(
            "fuelcast_jobs_completed_total",
            "category" => record.category.as_str(),
            "outcome" => record.state.as_str()
        )
        .increment(1);
        Ok(record)
    }

    /// 查询任务记录，不存在时返回 `UnknownTask`
    pub async fn status(&self, id: &TaskId) -> OrchestratorResult<TaskRecord> {
        self.tasks
            .get(id)
            .await?
            .ok_or_else(|| OrchestratorError::unknown_task(id))
    }

    pub async fn queue_size(&self, category: Category) -> OrchestratorResult<u32> {
        self.queue.get_queue_size(&category.queue_name()).await
    }
}
