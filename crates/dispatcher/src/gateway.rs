use fuelcast_core::{
    parse_job_date, Category, FuelType, JobPayload, OrchestratorError, OrchestratorResult,
    TaskHandle, TaskId, TaskRecord,
};
use fuelcast_infrastructure::TaskFabric;
use tracing::{debug, info};

/// 调度网关：校验请求、入队并签发任务句柄，提供状态轮询
///
/// 网关从不等待任务完成，所有无效输入都在入队之前被拒绝。
#[derive(Clone)]
pub struct DispatchGateway {
    fabric: TaskFabric,
}

impl DispatchGateway {
    pub fn new(fabric: TaskFabric) -> Self {
        Self { fabric }
    }

    pub fn fabric(&self) -> &TaskFabric {
        &self.fabric
    }

    /// 提交任务
    pub async fn submit(
        &self,
        category: Category,
        payload: JobPayload,
    ) -> OrchestratorResult<TaskHandle> {
        Self::validate(category, &payload)?;
        let handle = self.fabric.enqueue(category, payload).await?;
        info!("Submitted task {} to {}", handle.id, category);
        Ok(handle)
    }

    /// 网络边界上的预测提交：燃料类型以字符串给出
    pub async fn submit_prediction(
        &self,
        fuel_type: &str,
        dates: Vec<String>,
    ) -> OrchestratorResult<TaskHandle> {
        let fuel: FuelType = fuel_type.parse()?;
        self.submit(Category::from(fuel), JobPayload::Prediction { dates })
            .await
    }

    /// 查询任务状态
    ///
    /// 类别无效时返回 `UnknownCategory`；任务不存在或属于其他类别时返回 `UnknownTask`。
    pub async fn status(&self, category: &str, task_id: &str) -> OrchestratorResult<TaskRecord> {
        let category: Category = category
            .parse()
            .map_err(|_| OrchestratorError::UnknownCategory(category.to_string()))?;
        let id: TaskId = task_id.parse()?;

        let record = self.fabric.status(&id).await?;
        if record.category != category {
            debug!(
                "Task {} belongs to {}, not {}",
                id, record.category, category
            );
            return Err(OrchestratorError::unknown_task(task_id));
        }
        Ok(record)
    }

    fn validate(category: Category, payload: &JobPayload) -> OrchestratorResult<()> {
        match (category, payload) {
            (Category::Prediction(_), JobPayload::Prediction { dates }) => {
                if dates.is_empty() {
                    return Err(OrchestratorError::InvalidPayload(
                        "no dates provided".to_string(),
                    ));
                }
                for date in dates {
                    parse_job_date(date)?;
                }
                Ok(())
            }
            (Category::Training, JobPayload::Training { target, dataset }) => {
                if target.trim().is_empty() {
                    return Err(OrchestratorError::InvalidPayload(
                        "训练目标不能为空".to_string(),
                    ));
                }
                if dataset.is_empty() {
                    return Err(OrchestratorError::InvalidPayload(format!(
                        "目标 {target} 的训练数据为空"
                    )));
                }
                for observation in dataset {
                    parse_job_date(&observation.ds)?;
                }
                Ok(())
            }
            (category, payload) => Err(OrchestratorError::InvalidPayload(format!(
                "{} 任务不能提交到 {} 队列",
                payload.kind(),
                category.queue_name()
            ))),
        }
    }
}
