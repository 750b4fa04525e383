//! Operation executor.
//!
//! Issues one remote call and, for mutations, polls the returned handle until the
//! provider reports a terminal state. Every call runs under the deadline of the
//! phase that issued it. There are no retries here: a failed call is surfaced once.

use crate::backoff::FibonacciBackoff;
use crate::config::ReconcilerSettings;
use crate::error::{Operation, ReconcileError, ResourceKind};
use network_client::{NetworkClientTrait, NetworkError, OperationHandle, OperationStatus};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Roughly thirty years, used when a budget does not fit on the clock
const FAR_FUTURE_SECONDS: u64 = 86_400 * 365 * 30;

/// Point in time a phase must finish by
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Instant,
    budget: Duration,
}

impl Deadline {
    /// Deadline `budget` from now; saturates instead of overflowing the clock
    pub fn after(budget: Duration) -> Self {
        let now = Instant::now();
        Self {
            at: now
                .checked_add(budget)
                .unwrap_or_else(|| now + Duration::from_secs(FAR_FUTURE_SECONDS)),
            budget,
        }
    }

    /// Budget the deadline was created with
    pub fn budget(&self) -> Duration {
        self.budget
    }
}

/// Object a call is addressed to, for error context
#[derive(Debug, Clone, Copy)]
pub struct Target<'a> {
    /// Kind of object addressed
    pub kind: ResourceKind,
    /// Object name (the identity for network interfaces)
    pub name: &'a str,
    /// Resource group the object lives in
    pub resource_group: &'a str,
}

impl<'a> Target<'a> {
    /// A private endpoint
    pub fn endpoint(name: &'a str, resource_group: &'a str) -> Self {
        Self {
            kind: ResourceKind::PrivateEndpoint,
            name,
            resource_group,
        }
    }

    /// A DNS zone group of a private endpoint
    pub fn zone_group(name: &'a str, resource_group: &'a str) -> Self {
        Self {
            kind: ResourceKind::PrivateDnsZoneGroup,
            name,
            resource_group,
        }
    }

    /// A network interface, addressed by its full identity
    pub fn network_interface(id: &'a str, resource_group: &'a str) -> Self {
        Self {
            kind: ResourceKind::NetworkInterface,
            name: id,
            resource_group,
        }
    }

    fn error(&self, operation: Operation, source: NetworkError) -> ReconcileError {
        ReconcileError::provider(operation, self.kind, self.name, self.resource_group, source)
    }

    fn timeout(&self, operation: Operation, deadline: Deadline) -> ReconcileError {
        ReconcileError::Timeout {
            operation,
            kind: self.kind,
            name: self.name.to_string(),
            resource_group: self.resource_group.to_string(),
            after: deadline.budget(),
        }
    }
}

/// Terminal outcome of a mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Succeeded,
    /// The object was gone when the call was issued or while it was running
    NotFound,
}

/// Issues calls against the provider and waits for their completion
pub struct OperationExecutor<'a> {
    client: &'a dyn NetworkClientTrait,
    min_poll_seconds: u64,
    max_poll_seconds: u64,
}

impl std::fmt::Debug for OperationExecutor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationExecutor")
            .field("base_url", &self.client.base_url())
            .field("min_poll_seconds", &self.min_poll_seconds)
            .field("max_poll_seconds", &self.max_poll_seconds)
            .finish()
    }
}

impl<'a> OperationExecutor<'a> {
    /// Executor using the poll bounds from `settings`
    pub fn new(client: &'a dyn NetworkClientTrait, settings: &ReconcilerSettings) -> Self {
        Self {
            client,
            min_poll_seconds: settings.min_poll_seconds,
            max_poll_seconds: settings.max_poll_seconds,
        }
    }

    /// Read an object; `None` when the provider reports it does not exist
    pub async fn fetch<T, F>(
        &self,
        operation: Operation,
        target: Target<'_>,
        deadline: Deadline,
        call: F,
    ) -> Result<Option<T>, ReconcileError>
    where
        F: Future<Output = Result<T, NetworkError>>,
    {
        match tokio::time::timeout_at(deadline.at, call).await {
            Err(_) => Err(target.timeout(operation, deadline)),
            Ok(Ok(value)) => Ok(Some(value)),
            Ok(Err(e)) if e.is_not_found() => Ok(None),
            Ok(Err(e)) => Err(target.error(operation, e)),
        }
    }

    /// Issue a mutation and wait for it to reach a terminal state
    ///
    /// Not-found at issue time or while waiting is reported as `Completion::NotFound`;
    /// whether that is acceptable is up to the caller.
    pub async fn execute<F>(
        &self,
        operation: Operation,
        target: Target<'_>,
        deadline: Deadline,
        issue: F,
    ) -> Result<Completion, ReconcileError>
    where
        F: Future<Output = Result<OperationHandle, NetworkError>>,
    {
        let handle = match tokio::time::timeout_at(deadline.at, issue).await {
            Err(_) => return Err(target.timeout(operation, deadline)),
            Ok(Ok(handle)) => handle,
            Ok(Err(e)) if e.is_not_found() => return Ok(Completion::NotFound),
            Ok(Err(e)) => return Err(target.error(operation, e)),
        };

        self.wait(operation.wait(), target, deadline, &handle).await
    }

    /// Poll a handle until it is terminal or the deadline passes
    pub async fn wait(
        &self,
        operation: Operation,
        target: Target<'_>,
        deadline: Deadline,
        handle: &OperationHandle,
    ) -> Result<Completion, ReconcileError> {
        let polling = async {
            let mut backoff = FibonacciBackoff::new(self.min_poll_seconds, self.max_poll_seconds);
            if let Some(delay) = handle.retry_after {
                tokio::time::sleep(delay).await;
            }

            loop {
                let status = match self.client.poll_operation(handle).await {
                    Ok(status) => status,
                    Err(e) if e.is_not_found() => OperationStatus::NotFound,
                    Err(e) => return Err(target.error(operation, e)),
                };

                match status {
                    OperationStatus::Succeeded => return Ok(Completion::Succeeded),
                    OperationStatus::NotFound => return Ok(Completion::NotFound),
                    OperationStatus::Failed { code, message } => {
                        return Err(target.error(operation, NetworkError::OperationFailed { code, message }));
                    }
                    OperationStatus::Canceled => {
                        return Err(target.error(
                            operation,
                            NetworkError::OperationFailed {
                                code: "Canceled".to_string(),
                                message: "the operation was canceled".to_string(),
                            },
                        ));
                    }
                    OperationStatus::InProgress { retry_after } => {
                        let delay = retry_after.unwrap_or_else(|| backoff.next_backoff());
                        debug!(
                            "{} {} {} still in progress, polling again in {:?}",
                            operation, target.kind, target.name, delay
                        );
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        };

        tokio::time::timeout_at(deadline.at, polling)
            .await
            .map_err(|_elapsed| target.timeout(operation, deadline))?
    }
}
