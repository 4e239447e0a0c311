use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Category;
use crate::errors::OrchestratorError;

/// 任务唯一标识，随机UUID保证在队列后端生命周期内不冲突
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = OrchestratorError;

    /// 无法解析的ID一定不对应任何提交，按未知任务处理
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(TaskId)
            .map_err(|_| OrchestratorError::unknown_task(s))
    }
}

/// 任务状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskState {
    Pending,
    Processing,
    Success,
    Failure,
}

impl TaskState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskState::Success | TaskState::Failure)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskState::Pending => "Pending",
            TaskState::Processing => "Processing",
            TaskState::Success => "Success",
            TaskState::Failure => "Failure",
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 提交时同步返回给调用方的任务句柄
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskHandle {
    pub id: TaskId,
    pub category: Category,
    pub submitted_at: DateTime<Utc>,
}

/// 任务执行结果
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome {
    Success(serde_json::Value),
    Failure(String),
}

impl TaskOutcome {
    /// 该结果对应的终态
    pub fn state(&self) -> TaskState {
        match self {
            TaskOutcome::Success(_) => TaskState::Success,
            TaskOutcome::Failure(_) => TaskState::Failure,
        }
    }
}

/// 任务记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub id: TaskId,
    pub category: Category,
    pub state: TaskState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub submitted_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl TaskRecord {
    pub fn pending(id: TaskId, category: Category) -> Self {
        Self {
            id,
            category,
            state: TaskState::Pending,
            result: None,
            error: None,
            submitted_at: Utc::now(),
            started_at: None,
            completed_at: None,
        }
    }

    pub fn handle(&self) -> TaskHandle {
        TaskHandle {
            id: self.id,
            category: self.category,
            submitted_at: self.submitted_at,
        }
    }

    /// Pending -> Processing
    pub fn start(&mut self) -> Result<(), OrchestratorError> {
        self.transition(TaskState::Pending, TaskState::Processing)?;
        self.started_at = Some(Utc::now());
        Ok(())
    }

    /// Processing -> Success
    pub fn succeed(&mut self, result: serde_json::Value) -> Result<(), OrchestratorError> {
        self.transition(TaskState::Processing, TaskState::Success)?;
        self.result = Some(result);
        self.completed_at = Some(Utc::now());
        Ok(())
    }

    /// Processing -> Failure
    pub fn fail(&mut self, error: impl Into<String>) -> Result<(), OrchestratorError> {
        self.transition(TaskState::Processing, TaskState::Failure)?;
        self.error = Some(error.into());
        self.completed_at = Some(Utc::now());
        Ok(())
    }

    pub fn apply(&mut self, outcome: TaskOutcome) -> Result<(), OrchestratorError> {
        match outcome {
            TaskOutcome::Success(result) => self.succeed(result),
            TaskOutcome::Failure(error) => self.fail(error),
        }
    }

    fn transition(&mut self, from: TaskState, to: TaskState) -> Result<(), OrchestratorError> {
        if self.state != from {
            return Err(OrchestratorError::InvalidTransition {
                id: self.id.to_string(),
                from: self.state,
                to,
            });
        }
        self.state = to;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FuelType;
    use serde_json::json;

    fn record() -> TaskRecord {
        TaskRecord::pending(TaskId::new(), Category::Prediction(FuelType::Lpg))
    }

    #[test]
    fn test_happy_path_transitions() {
        let mut record = record();
        assert_eq!(record.state, TaskState::Pending);

        record.start().unwrap();
        assert_eq!(record.state, TaskState::Processing);
        assert!(record.started_at.is_some());

        record.succeed(json!({"results": []})).unwrap();
        assert_eq!(record.state, TaskState::Success);
        assert_eq!(record.result, Some(json!({"results": []})));
        assert!(record.completed_at.is_some());
    }

    #[test]
    fn test_terminal_state_is_immutable() {
        let mut record = record();
        record.start().unwrap();
        record.fail("model exploded").unwrap();

        assert!(record.succeed(json!(1)).is_err());
        assert!(record.fail("again").is_err());
        assert!(record.start().is_err());
        assert_eq!(record.state, TaskState::Failure);
        assert_eq!(record.error.as_deref(), Some("model exploded"));
    }

    #[test]
    fn test_cannot_complete_without_claim() {
        let mut record = record();
        let err = record.succeed(json!(null)).unwrap_err();
        assert!(matches!(
            err,
            OrchestratorError::InvalidTransition {
                from: TaskState::Pending,
                to: TaskState::Success,
                ..
            }
        ));
    }

    #[test]
    fn test_outcome_maps_to_terminal_state() {
        assert_eq!(TaskOutcome::Success(json!({})).state(), TaskState::Success);
        assert_eq!(
            TaskOutcome::Failure("boom".to_string()).state(),
            TaskState::Failure
        );
    }

    #[test]
    fn test_task_id_parsing() {
        let id = TaskId::new();
        assert_eq!(id.to_string().parse::<TaskId>().unwrap(), id);
        let err = "not-a-task".parse::<TaskId>().unwrap_err();
        assert_eq!(err.kind(), "UNKNOWN_TASK");
    }

    #[test]
    fn test_task_ids_are_unique() {
        let ids: std::collections::HashSet<_> = (0..1000).map(|_| TaskId::new()).collect();
        assert_eq!(ids.len(), 1000);
    }
}
