//! Long-running operation bookkeeping for MockNetworkClient
//!
//! A mutation is recorded as a pending effect; the effect is applied to the store
//! when the operation is polled to completion.

use super::{endpoints, MockNetworkClient, RecordedCall};
use crate::error::NetworkError;
use crate::models::{PrivateDnsZoneGroup, PrivateEndpoint};
use crate::operation::{OperationHandle, OperationKind, OperationStatus, PollTarget};

/// Store change an operation applies once it completes
#[derive(Debug, Clone)]
pub(crate) enum PendingEffect {
    WriteEndpoint { resource_group: String, name: String, endpoint: PrivateEndpoint },
    WriteZoneGroup { resource_group: String, endpoint_name: String, group_name: String, group: PrivateDnsZoneGroup },
    DeleteEndpoint { resource_group: String, name: String },
}

#[derive(Debug, Clone)]
pub(crate) struct PendingOperation {
    remaining_polls: u32,
    effect: PendingEffect,
}

/// Register an operation and hand out its handle
pub(crate) fn start(client: &MockNetworkClient, kind: OperationKind, resource_path: String, effect: PendingEffect) -> OperationHandle {
    let token = client.next_id();
    let remaining_polls = *client.polls_to_complete.lock().unwrap();
    client
        .operations
        .lock()
        .unwrap()
        .insert(token, PendingOperation { remaining_polls, effect });

    OperationHandle {
        kind,
        resource_path,
        target: PollTarget::Token(token),
        retry_after: None,
    }
}

pub(crate) fn poll_operation(client: &MockNetworkClient, handle: &OperationHandle) -> Result<OperationStatus, NetworkError> {
    let token = match handle.target {
        PollTarget::Token(token) => token,
        PollTarget::Completed => return Ok(OperationStatus::Succeeded),
        _ => {
            return Err(NetworkError::InvalidRequest(format!(
                "operation for {} was not issued by the mock",
                handle.resource_path
            )));
        }
    };
    client.record(RecordedCall::PollOperation { token });

    if client.faults.lock().unwrap().stall_operations {
        return Ok(OperationStatus::InProgress { retry_after: None });
    }

    let operation = {
        let mut operations = client.operations.lock().unwrap();
        let Some(pending) = operations.get_mut(&token) else {
            return Ok(OperationStatus::NotFound);
        };
        if pending.remaining_polls > 1 {
            pending.remaining_polls -= 1;
            return Ok(OperationStatus::InProgress { retry_after: None });
        }
        operations.remove(&token)
    };
    let Some(operation) = operation else {
        return Ok(OperationStatus::NotFound);
    };

    let (failure, delete_not_found) = {
        let mut faults = client.faults.lock().unwrap();
        (faults.fail_next_operation.take(), faults.delete_poll_not_found)
    };
    if let Some((code, message)) = failure {
        return Ok(OperationStatus::Failed { code, message });
    }

    match operation.effect {
        PendingEffect::WriteEndpoint { resource_group, name, endpoint } => {
            endpoints::apply_endpoint_write(client, &resource_group, &name, endpoint);
        }
        PendingEffect::WriteZoneGroup { resource_group, endpoint_name, group_name, group } => {
            if !endpoints::apply_zone_group_write(client, &resource_group, &endpoint_name, &group_name, group) {
                return Ok(OperationStatus::NotFound);
            }
        }
        PendingEffect::DeleteEndpoint { resource_group, name } => {
            endpoints::apply_endpoint_delete(client, &resource_group, &name);
            if delete_not_found {
                return Ok(OperationStatus::NotFound);
            }
        }
    }

    Ok(OperationStatus::Succeeded)
}
