//! Unified error handling system
//!
//! Provides structured error types with context, recovery suggestions, and proper error chaining

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

pub type SnapshotResult<T> = Result<T, SnapshotError>;

/// Error context providing additional information for debugging and recovery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Timestamp when error occurred
    pub timestamp: DateTime<Utc>,
    /// Component where error originated
    pub component: String,
    /// Operation being performed when error occurred
    pub operation: Option<String>,
    /// Additional metadata
    pub metadata: std::collections::HashMap<String, String>,
    /// Recovery suggestions
    pub recovery_suggestions: Vec<String>,
}

impl ErrorContext {
    pub fn new(component: &str) -> Self {
        Self {
            error_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            component: component.to_string(),
            operation: None,
            metadata: std::collections::HashMap::new(),
            recovery_suggestions: Vec::new(),
        }
    }

    pub fn with_operation(mut self, operation: &str) -> Self {
        self.operation = Some(operation.to_string());
        self
    }

    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.recovery_suggestions.push(suggestion.to_string());
        self
    }
}

/// Main error type for snapshot analysis
///
/// Every failure aborts the whole `analyze` call; nothing is retried or
/// downgraded, and no partial statistics are ever returned.
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// The git invocation could not be started or exited non-zero
    #[error("Clone failed: {message}")]
    Clone {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    /// Directory listing or file read failed during the snapshot walk
    #[error("Traversal failed: {message}")]
    Traversal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    /// Snapshot removal failed on the success path
    #[error("Cleanup failed: {message}")]
    Cleanup {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SnapshotError {
    /// Get the error context
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            SnapshotError::Clone { context, .. } => Some(context),
            SnapshotError::Traversal { context, .. } => Some(context),
            SnapshotError::Cleanup { context, .. } => Some(context),
            SnapshotError::Io(_) => None,
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        match self {
            SnapshotError::Cleanup { .. } => {
                warn!(
                    error_id = ?self.context().map(|c| &c.error_id),
                    error = %self,
                    "Snapshot cleanup failed"
                );
            }
            _ => {
                error!(
                    error_id = ?self.context().map(|c| &c.error_id),
                    error = %self,
                    "Error occurred"
                );
            }
        }
    }
}

/// Convenience macro for creating clone errors with context
#[macro_export]
macro_rules! clone_error {
    ($msg:expr, $component:expr) => {
        SnapshotError::Clone {
            message: $msg.to_string(),
            source: None,
            context: ErrorContext::new($component),
        }
    };
    ($msg:expr, $component:expr, $source:expr) => {
        SnapshotError::Clone {
            message: $msg.to_string(),
            source: Some(Box::new($source)),
            context: ErrorContext::new($component),
        }
    };
}

/// Convenience macro for creating traversal errors with context
#[macro_export]
macro_rules! traversal_error {
    ($msg:expr, $component:expr) => {
        SnapshotError::Traversal {
            message: $msg.to_string(),
            source: None,
            context: ErrorContext::new($component),
        }
    };
    ($msg:expr, $component:expr, $source:expr) => {
        SnapshotError::Traversal {
            message: $msg.to_string(),
            source: Some(Box::new($source)),
            context: ErrorContext::new($component),
        }
    };
}
