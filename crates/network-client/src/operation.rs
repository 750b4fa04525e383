//! Long-running operation handles
//!
//! Mutations against the provider are asynchronous: the initial request is accepted
//! and the caller polls a status location until the operation reaches a terminal state.

use std::time::Duration;

/// Kind of mutation a handle tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    /// PUT of a resource
    CreateOrUpdate,
    /// DELETE of a resource
    Delete,
}

/// How the provider asked to be polled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollTarget {
    /// `Azure-AsyncOperation` URL, answering with a JSON `status` body
    AsyncOperation(String),
    /// `Location` URL, answering 202 while running and 200/204 when done
    Location(String),
    /// The initial response was already terminal
    Completed,
    /// Opaque token understood by a non-HTTP client implementation
    Token(u64),
}

/// Handle to an in-flight provider operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationHandle {
    /// What the operation does
    pub kind: OperationKind,
    /// Identity path of the resource being mutated
    pub resource_path: String,
    /// Where to poll for completion
    pub target: PollTarget,
    /// Provider hint for the first poll
    pub retry_after: Option<Duration>,
}

impl OperationHandle {
    /// Handle for an operation that finished with the initial response
    pub fn completed(kind: OperationKind, resource_path: impl Into<String>) -> Self {
        Self {
            kind,
            resource_path: resource_path.into(),
            target: PollTarget::Completed,
            retry_after: None,
        }
    }
}

/// Status reported by one poll of an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationStatus {
    /// Still running; poll again after the hint (if any)
    InProgress {
        /// Provider supplied `Retry-After`
        retry_after: Option<Duration>,
    },
    /// Finished successfully
    Succeeded,
    /// Finished with a provider failure
    Failed {
        /// Provider error code
        code: String,
        /// Provider supplied diagnostic message
        message: String,
    },
    /// Cancelled on the provider side
    Canceled,
    /// The resource (or the operation) no longer exists
    NotFound,
}

impl OperationStatus {
    /// Whether polling can stop
    pub fn is_terminal(&self) -> bool {
        !matches!(self, OperationStatus::InProgress { .. })
    }

    /// Map an `Azure-AsyncOperation` status string
    pub fn from_provider_status(status: &str, code: String, message: String) -> Self {
        match status.to_ascii_lowercase().as_str() {
            "succeeded" => OperationStatus::Succeeded,
            "failed" => OperationStatus::Failed { code, message },
            "canceled" | "cancelled" => OperationStatus::Canceled,
            _ => OperationStatus::InProgress { retry_after: None },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_status_mapping() {
        assert_eq!(
            OperationStatus::from_provider_status("Succeeded", String::new(), String::new()),
            OperationStatus::Succeeded
        );
        assert_eq!(
            OperationStatus::from_provider_status("Canceled", String::new(), String::new()),
            OperationStatus::Canceled
        );
        assert!(matches!(
            OperationStatus::from_provider_status("Failed", "Conflict".to_string(), "busy".to_string()),
            OperationStatus::Failed { ref code, .. } if code == "Conflict"
        ));
        assert!(!OperationStatus::from_provider_status("InProgress", String::new(), String::new()).is_terminal());
    }
}
