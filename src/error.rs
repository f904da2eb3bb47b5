//! Structured error types for engine operations.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    NotFound,
    StateError,
    CapacityError,
    PersistenceError,
}

/// Which kind of entity a lookup failed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Worker,
    Task,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Worker => f.write_str("Worker"),
            EntityKind::Task => f.write_str("Task"),
        }
    }
}

/// Every way an engine entry point can reject a request.
///
/// All variants leave the store exactly as it was before the call.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },
    #[error("{0}")]
    State(String),
    #[error("{0}")]
    Capacity(String),
    #[error("failed to persist roster: {0}")]
    Persistence(String),
    /// The stored roster could not be read back at startup.
    #[error("failed to load roster: {0}")]
    Load(String),
}

impl EngineError {
    pub fn code(&self) -> ErrorCode {
        match self {
            EngineError::Validation { .. } => ErrorCode::ValidationError,
            EngineError::NotFound { .. } => ErrorCode::NotFound,
            EngineError::State(_) => ErrorCode::StateError,
            EngineError::Capacity(_) => ErrorCode::CapacityError,
            EngineError::Persistence(_) | EngineError::Load(_) => ErrorCode::PersistenceError,
        }
    }

    // Convenience constructors

    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        EngineError::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn worker_not_found(worker_id: &str) -> Self {
        EngineError::NotFound {
            kind: EntityKind::Worker,
            id: worker_id.to_string(),
        }
    }

    pub fn task_not_found(task_id: &str) -> Self {
        EngineError::NotFound {
            kind: EntityKind::Task,
            id: task_id.to_string(),
        }
    }

    pub fn already_completed(task_id: &str) -> Self {
        EngineError::State(format!("Task {} is already completed", task_id))
    }

    pub fn already_assigned(task_id: &str, worker_id: &str) -> Self {
        EngineError::State(format!(
            "Task {} is already assigned to {}; unassign it first",
            task_id, worker_id
        ))
    }

    pub fn ids_exhausted(kind: EntityKind) -> Self {
        EngineError::State(format!("{} id space is exhausted", kind))
    }

    pub fn load_failed(err: anyhow::Error) -> Self {
        EngineError::Load(format!("{:#}", err))
    }

    /// Whether the request itself was refused, as opposed to storage failing.
    pub fn is_rejection(&self) -> bool {
        self.code() != ErrorCode::PersistenceError
    }

    pub fn not_assigned(task_id: &str) -> Self {
        EngineError::State(format!("Task {} is not assigned to anyone", task_id))
    }

    pub fn worker_unavailable(worker_id: &str) -> Self {
        EngineError::Capacity(format!("Worker {} is not available", worker_id))
    }

    pub fn over_capacity(worker_id: &str, assigned: f64, requested: f64, limit: f64) -> Self {
        EngineError::Capacity(format!(
            "Worker {} has {}h assigned; adding {}h would exceed the {}h daily limit",
            worker_id, assigned, requested, limit
        ))
    }

    /// Serializable view for JSON output.
    pub fn to_body(&self) -> ErrorBody {
        let field = match self {
            EngineError::Validation { field, .. } => Some(field.to_string()),
            _ => None,
        };
        ErrorBody {
            code: self.code(),
            message: self.to_string(),
            field,
        }
    }
}

// Backend failures surface as persistence errors
impl From<anyhow::Error> for EngineError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<EngineError>() {
            Ok(engine_err) => engine_err,
            Err(err) => EngineError::Persistence(format!("{:#}", err)),
        }
    }
}

/// Structured error for JSON responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// Result type for engine operations.
pub type EngineResult<T> = std::result::Result<T, EngineError>;
