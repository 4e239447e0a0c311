use async_trait::async_trait;

use crate::{
    models::{TaskId, TaskOutcome, TaskRecord},
    OrchestratorResult,
};

/// 任务记录表
///
/// 只有认领了任务的Worker会推进该记录的状态，状态转换规则由 [`TaskRecord`] 自身保证。
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// 写入新的Pending记录
    async fn insert(&self, record: TaskRecord) -> OrchestratorResult<()>;

    /// 按ID查询记录
    async fn get(&self, id: &TaskId) -> OrchestratorResult<Option<TaskRecord>>;

    /// 认领任务：Pending -> Processing
    async fn start(&self, id: &TaskId) -> OrchestratorResult<TaskRecord>;

    /// 写入终态：Processing -> Success / Failure
    async fn complete(&self, id: &TaskId, outcome: TaskOutcome) -> OrchestratorResult<TaskRecord>;

    /// 丢弃从未成功入队的记录
    async fn discard(&self, id: &TaskId) -> OrchestratorResult<()>;
}
