//! Task execution models

use std::fmt;

/// Execution state of the latest parlay task for a host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskState {
    Running,
    Completed,
    Failed,
    /// Any state string parlay reports that we do not recognise
    Unknown(String),
}

impl TaskState {
    /// Completed and Failed are final: once observed, parlay never reports
    /// another state for the same execution.
    pub fn is_final(&self) -> bool {
        matches!(self, TaskState::Completed | TaskState::Failed)
    }
}

impl From<&str> for TaskState {
    fn from(state: &str) -> Self {
        match state {
            "Running" => TaskState::Running,
            "Completed" => TaskState::Completed,
            "Failed" => TaskState::Failed,
            other => TaskState::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskState::Running => write!(f, "Running"),
            TaskState::Completed => write!(f, "Completed"),
            TaskState::Failed => write!(f, "Failed"),
            TaskState::Unknown(state) => write!(f, "{}", state),
        }
    }
}
