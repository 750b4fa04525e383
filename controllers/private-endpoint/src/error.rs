//! Reconciler error types.
//!
//! Every failure that leaves a phase is classified here and carries the resource
//! kind, name and resource group it concerns.

use endpoint_types::ResourceIdError;
use network_client::NetworkError;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Kind of remote object an error concerns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    PrivateEndpoint,
    PrivateDnsZoneGroup,
    NetworkInterface,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::PrivateEndpoint => write!(f, "Private Endpoint"),
            ResourceKind::PrivateDnsZoneGroup => write!(f, "Private Endpoint DNS Zone Group"),
            ResourceKind::NetworkInterface => write!(f, "Network Interface"),
        }
    }
}

/// Remote step that was in progress when an error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CheckExisting,
    Create,
    Update,
    WaitForCreate,
    WaitForUpdate,
    Retrieve,
    Read,
    Delete,
    WaitForDelete,
}

impl Operation {
    /// The wait step that follows an issued mutation
    pub fn wait(self) -> Self {
        match self {
            Operation::Create => Operation::WaitForCreate,
            Operation::Update => Operation::WaitForUpdate,
            Operation::Delete => Operation::WaitForDelete,
            other => other,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Operation::CheckExisting => "checking for presence of existing",
            Operation::Create => "creating",
            Operation::Update => "updating",
            Operation::WaitForCreate => "waiting for creation of",
            Operation::WaitForUpdate => "waiting for update of",
            Operation::Retrieve => "retrieving",
            Operation::Read => "reading",
            Operation::Delete => "deleting",
            Operation::WaitForDelete => "waiting for deletion of",
        };
        f.write_str(text)
    }
}

/// Errors that can occur while reconciling a private endpoint.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Desired state violates one or more invariants; no remote call was made
    #[error("validating the configuration for the Private Endpoint: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Import protection found an object with the same identity
    #[error("a resource with the ID {id:?} already exists - to be managed via this tool it needs to be imported into the state ({kind})")]
    AlreadyExists {
        kind: ResourceKind,
        id: String,
    },

    /// The provider rejected a call or the operation failed remotely
    #[error("{operation} {kind} {name:?} (Resource Group {resource_group:?}): {source}")]
    Provider {
        operation: Operation,
        kind: ResourceKind,
        name: String,
        resource_group: String,
        #[source]
        source: NetworkError,
    },

    /// The provider needs a sub-resource selector for the connection target
    #[error("creating Private Endpoint {name:?} (Resource Group {resource_group:?}) due to missing 'group Id', ensure that the 'subresource_names' type is populated: {source}")]
    MissingSubresourceSelector {
        name: String,
        resource_group: String,
        #[source]
        source: NetworkError,
    },

    /// The phase deadline elapsed before the remote side reached a terminal state
    #[error("timed out after {}s {operation} {kind} {name:?} (Resource Group {resource_group:?})", .after.as_secs())]
    Timeout {
        operation: Operation,
        kind: ResourceKind,
        name: String,
        resource_group: String,
        after: Duration,
    },

    /// The provider answered in a way that leaves the object unaddressable
    #[error("provider contract violation: {0}")]
    ContractViolation(String),

    /// A persisted identity could not be parsed
    #[error("invalid resource id: {0}")]
    InvalidId(#[from] ResourceIdError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ReconcileError {
    /// Wrap a client error with the step and object it concerns
    pub fn provider(
        operation: Operation,
        kind: ResourceKind,
        name: &str,
        resource_group: &str,
        source: NetworkError,
    ) -> Self {
        ReconcileError::Provider {
            operation,
            kind,
            name: name.to_string(),
            resource_group: resource_group.to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_names_operation_and_scope() {
        let err = ReconcileError::provider(
            Operation::WaitForDelete,
            ResourceKind::PrivateEndpoint,
            "pe-sql",
            "rg-app",
            NetworkError::OperationFailed {
                code: "InternalError".to_string(),
                message: "boom".to_string(),
            },
        );
        assert_eq!(
            err.to_string(),
            "waiting for deletion of Private Endpoint \"pe-sql\" (Resource Group \"rg-app\"): operation failed (InternalError): boom"
        );
    }

    #[test]
    fn test_validation_lists_every_violation() {
        let err = ReconcileError::Validation(vec!["first".to_string(), "second".to_string()]);
        assert!(err.to_string().ends_with("first; second"));
    }

    #[test]
    fn test_wait_follows_mutation() {
        assert_eq!(Operation::Create.wait(), Operation::WaitForCreate);
        assert_eq!(Operation::Delete.wait(), Operation::WaitForDelete);
        assert_eq!(Operation::Read.wait(), Operation::Read);
    }
}
