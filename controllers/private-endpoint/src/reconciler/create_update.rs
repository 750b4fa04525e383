//! Create-or-Update phase

use super::{validation, Reconciler};
use crate::error::{Operation, ReconcileError, ResourceKind};
use crate::executor::{Completion, Deadline, Target};
use crate::transform;
use endpoint_types::{EndpointConfig, ObservedEndpoint};
use network_client::NetworkError;
use tracing::{debug, info, warn};

/// Provider text returned when a connection target needs a sub-resource selector
const MISSING_GROUP_ID: &str = "is missing required parameter 'group Id'";

impl Reconciler {
    /// Converge a private endpoint (and its DNS zone group) on the desired state.
    ///
    /// `existing_id` is the persisted identity from a previous run; `None` means this
    /// is a first creation. Re-running after a partial failure completes the
    /// remaining steps.
    pub async fn create_or_update(
        &self,
        desired: &EndpointConfig,
        existing_id: Option<&str>,
    ) -> Result<ObservedEndpoint, ReconcileError> {
        let name = desired.name.as_str();
        let resource_group = desired.resource_group_name.as_str();

        if let Err(e) = validation::validate(desired, self.predicates.as_ref()) {
            warn!(
                "Rejected configuration for private endpoint {} (resource group {}): {}",
                name, resource_group, e
            );
            return Err(e);
        }

        let is_new = existing_id.is_none();
        let (operation, budget) = if is_new {
            (Operation::Create, self.settings.timeouts.create)
        } else {
            (Operation::Update, self.settings.timeouts.update)
        };
        let deadline = Deadline::after(budget);
        let executor = self.executor();
        let target = Target::endpoint(name, resource_group);

        if is_new && self.settings.import_protection {
            debug!("Checking for an existing private endpoint {} (resource group {})", name, resource_group);
            let existing = executor
                .fetch(
                    Operation::CheckExisting,
                    target,
                    deadline,
                    self.client.get_private_endpoint(resource_group, name),
                )
                .await?;
            if let Some(id) = existing.and_then(|e| e.id).filter(|id| !id.is_empty()) {
                return Err(ReconcileError::AlreadyExists {
                    kind: ResourceKind::PrivateEndpoint,
                    id,
                });
            }
        }

        info!("{} private endpoint {} (resource group {})", operation, name, resource_group);
        let body = transform::expand_private_endpoint(desired);
        let completion = executor
            .execute(
                operation,
                target,
                deadline,
                self.client
                    .begin_create_or_update_private_endpoint(resource_group, name, &body),
            )
            .await
            .map_err(enrich_missing_selector)?;
        require_completed(completion, operation, target)?;

        let group = transform::expand_private_dns_zone_group(desired.private_dns_zone_group.as_ref());
        match group.name.as_deref() {
            Some(group_name) => {
                info!(
                    "{} DNS zone group {} of private endpoint {} (resource group {})",
                    operation, group_name, name, resource_group
                );
                let group_target = Target::zone_group(group_name, resource_group);
                let completion = executor
                    .execute(
                        operation,
                        group_target,
                        deadline,
                        self.client.begin_create_or_update_private_dns_zone_group(
                            resource_group,
                            name,
                            group_name,
                            &group,
                        ),
                    )
                    .await?;
                require_completed(completion, operation, group_target)?;
            }
            None => debug!("No DNS zone group requested for private endpoint {}", name),
        }

        let endpoint = executor
            .fetch(
                Operation::Retrieve,
                target,
                deadline,
                self.client.get_private_endpoint(resource_group, name),
            )
            .await?
            .ok_or_else(|| {
                ReconcileError::ContractViolation(format!(
                    "Private Endpoint {:?} (Resource Group {:?}) was not found after it was written",
                    name, resource_group
                ))
            })?;
        let id = endpoint.id.filter(|id| !id.is_empty()).ok_or_else(|| {
            ReconcileError::ContractViolation(format!(
                "API returned a nil/empty id on Private Endpoint {:?} (Resource Group {:?})",
                name, resource_group
            ))
        })?;
        info!("Private endpoint {} converged with ID {}", name, id);

        let zone_group_name = desired.private_dns_zone_group.as_ref().map(|g| g.name.as_str());
        self.read(&id, zone_group_name).await?.ok_or_else(|| {
            ReconcileError::ContractViolation(format!(
                "Private Endpoint {:?} disappeared while being read back",
                id
            ))
        })
    }
}

/// A write that reports not-found left nothing to address afterwards
fn require_completed(completion: Completion, operation: Operation, target: Target<'_>) -> Result<(), ReconcileError> {
    match completion {
        Completion::Succeeded => Ok(()),
        Completion::NotFound => Err(ReconcileError::provider(
            operation.wait(),
            target.kind,
            target.name,
            target.resource_group,
            NetworkError::NotFound(format!("{} {} was not found", target.kind, target.name)),
        )),
    }
}

/// Point the caller at `subresource_names` when the provider asks for a group id
fn enrich_missing_selector(err: ReconcileError) -> ReconcileError {
    match err {
        ReconcileError::Provider {
            operation: operation @ (Operation::Create | Operation::Update),
            kind: ResourceKind::PrivateEndpoint,
            name,
            resource_group,
            source,
        } => {
            let missing_selector = source
                .provider_message()
                .is_some_and(|m| m.to_ascii_lowercase().contains(MISSING_GROUP_ID.to_ascii_lowercase().as_str()));
            if missing_selector {
                ReconcileError::MissingSubresourceSelector {
                    name,
                    resource_group,
                    source,
                }
            } else {
                ReconcileError::Provider {
                    operation,
                    kind: ResourceKind::PrivateEndpoint,
                    name,
                    resource_group,
                    source,
                }
            }
        }
        other => other,
    }
}
