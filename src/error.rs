//! Task failure taxonomy.

use thiserror::Error;

use crate::models::TaskKind;

/// Why a task ended in the failed state. Every variant is recovered locally
/// and shown to the user; none of them is fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// Input rejected before any network activity.
    #[error("{0}")]
    Validation(String),
    /// The request never produced a response.
    #[error("Connection error: {0}")]
    Transport(String),
    /// Non-2xx status or explicit error payload from the service.
    #[error("{0}")]
    Service(String),
    /// The response could not be interpreted.
    #[error("Unexpected response: {0}")]
    Format(String),
}

impl TaskError {
    pub fn is_validation(&self) -> bool {
        matches!(self, TaskError::Validation(_))
    }

    /// Short category name, used in logs.
    pub fn category(&self) -> &'static str {
        match self {
            TaskError::Validation(_) => "validation",
            TaskError::Transport(_) => "transport",
            TaskError::Service(_) => "service",
            TaskError::Format(_) => "format",
        }
    }

    /// Message used when the service gave no usable error text.
    pub fn fallback_message(kind: TaskKind) -> String {
        format!("The {} service returned an error", kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_keep_service_text() {
        let err = TaskError::Service("disk full".to_string());
        assert_eq!(err.to_string(), "disk full");
        assert!(TaskError::Transport("refused".into()).to_string().contains("refused"));
        assert!(TaskError::Validation("bad".into()).is_validation());
        assert!(!err.is_validation());
    }

    #[test]
    fn test_fallback_names_the_task() {
        assert_eq!(
            TaskError::fallback_message(TaskKind::PortScan),
            "The port scan service returned an error"
        );
    }
}
