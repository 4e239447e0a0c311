use async_trait::async_trait;
use fuelcast_core::{
    Category, JobMessage, OrchestratorError, OrchestratorResult, TaskOutcome, TaskRecord,
    TaskState,
};
use fuelcast_infrastructure::TaskFabric;
use metrics::histogram;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::JobHandler;

/// 处理器成功后、写入Success之前调用的钩子
///
/// 钩子失败只记录警告，不改变任务结果。
#[async_trait]
pub trait CompletionHook: Send + Sync {
    async fn on_success(&self, message: &JobMessage, result: &Value) -> OrchestratorResult<()>;
}

/// 单一类别的Worker池
///
/// 池内每个Worker独立地从类别队列取任务、认领、执行并写回终态。
/// 处理器错误、负载错误和panic都会转成Failure，Worker继续处理下一条消息。
#[derive(Clone)]
pub struct WorkerPool {
    category: Category,
    fabric: TaskFabric,
    handler: Arc<dyn JobHandler>,
    hook: Option<Arc<dyn CompletionHook>>,
    workers: usize,
    dequeue_wait: Duration,
}

impl WorkerPool {
    pub fn new(
        category: Category,
        fabric: TaskFabric,
        handler: Arc<dyn JobHandler>,
        workers: usize,
        dequeue_wait: Duration,
    ) -> Self {
        Self {
            category,
            fabric,
            handler,
            hook: None,
            workers: workers.max(1),
            dequeue_wait,
        }
    }

    pub fn with_hook(mut self, hook: Arc<dyn CompletionHook>) -> Self {
        self.hook = Some(hook);
        self
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// 启动所有Worker，收到关闭信号后各Worker在手头任务完成后退出
    pub fn start(&self, shutdown: &broadcast::Sender<()>) -> Vec<JoinHandle<()>> {
        info!(
            "Starting {} worker(s) for {} using handler '{}'",
            self.workers,
            self.category.queue_name(),
            self.handler.name()
        );

        (0..self.workers)
            .map(|index| {
                let pool = self.clone();
                let shutdown_rx = shutdown.subscribe();
                let worker_id = format!("{}-worker-{}", self.category, index);
                tokio::spawn(async move { pool.run_worker(worker_id, shutdown_rx).await })
            })
            .collect()
    }

    async fn run_worker(self, worker_id: String, mut shutdown_rx: broadcast::Receiver<()>) {
        info!("Worker {} started", worker_id);

        // 关闭信号只在两次取消息之间检查，已出队的消息总会被处理完
        loop {
            match shutdown_rx.try_recv() {
                Err(broadcast::error::TryRecvError::Empty) => {}
                _ => {
                    info!("Worker {} shutting down", worker_id);
                    break;
                }
            }

            match self.fabric.dequeue(self.category, self.dequeue_wait).await {
                Ok(Some(message)) => {
                    if let Err(e) = self.execute(message).await {
                        error!("Worker {} failed to record task outcome: {}", worker_id, e);
                    }
                }
                Ok(None) => continue,
                Err(e) => {
                    error!("Worker {} failed to dequeue: {}", worker_id, e);
                    tokio::time::sleep(self.dequeue_wait).await;
                }
            }
        }
    }

    /// 取出并处理一条消息，队列在 `wait` 内为空时返回 `None`
    pub async fn process_next(&self, wait: Duration) -> OrchestratorResult<Option<TaskRecord>> {
        match self.fabric.dequeue(self.category, wait).await? {
            Some(message) => self.execute(message).await,
            None => Ok(None),
        }
    }

    /// 认领并执行一条消息，返回写入终态后的记录；无法认领时返回 `None`
    pub async fn execute(&self, message: JobMessage) -> OrchestratorResult<Option<TaskRecord>> {
        let task_id = message.task_id;
        let claimed = self.fabric.claim(&task_id).await.map_err(|e| {
            error!(
                "Failed to claim task {} on {}, record left in state {}: {}",
                task_id,
                self.category,
                TaskState::Pending,
                e
            );
            e
        })?;
        if claimed.is_none() {
            warn!("Skipping task {}: record missing or already claimed", task_id);
            return Ok(None);
        }
        debug!("Processing task {} on {}", task_id, self.category);

        let started = Instant::now();
        let handler = self.handler.clone();
        let payload = message.payload.clone();
        let joined = tokio::task::spawn_blocking(move || handler.handle(&payload)).await;
        histogram!("fuelcast_job_duration_seconds", "category" => self.category.as_str())
            .record(started.elapsed().as_secs_f64());

        let outcome = match joined {
            Ok(Ok(result)) => {
                if let Some(hook) = &self.hook {
                    if let Err(e) = hook.on_success(&message, &result).await {
                        warn!("Completion hook failed for task {}: {}", task_id, e);
                    }
                }
                TaskOutcome::Success(result)
            }
            Ok(Err(OrchestratorError::HandlerFailure(reason))) => {
                warn!("Task {} failed: {}", task_id, reason);
                TaskOutcome::Failure(reason)
            }
            Ok(Err(e)) => {
                warn!("Task {} failed: {}", task_id, e);
                TaskOutcome::Failure(e.to_string())
            }
            Err(join_err) => {
                error!("Handler for task {} aborted: {}", task_id, join_err);
                TaskOutcome::Failure(format!("处理器异常退出: {join_err}"))
            }
        };

        let terminal = outcome.state();
        let record = self.fabric.complete(&task_id, outcome).await.map_err(|e| {
            error!(
                "Failed to record {} for task {} on {}, record left in state {}: {}",
                terminal,
                task_id,
                self.category,
                TaskState::Processing,
                e
            );
            e
        })?;
        info!(
            "Task {} finished with state {} in {:?}",
            task_id,
            record.state,
            started.elapsed()
        );
        Ok(Some(record))
    }
}
