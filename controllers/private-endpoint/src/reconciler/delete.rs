//! Delete phase

use super::{endpoint_scope, Reconciler};
use crate::error::{Operation, ReconcileError};
use crate::executor::{Completion, Deadline, Target};
use tracing::info;

impl Reconciler {
    /// Delete a private endpoint by its persisted identity.
    ///
    /// An endpoint that is already gone counts as deleted. The provider removes the
    /// DNS zone group together with its endpoint.
    pub async fn delete(&self, id: &str) -> Result<(), ReconcileError> {
        let (resource_group, name) = endpoint_scope(id)?;
        let deadline = Deadline::after(self.settings.timeouts.delete);

        info!("Deleting private endpoint {} (resource group {})", name, resource_group);
        let completion = self
            .executor()
            .execute(
                Operation::Delete,
                Target::endpoint(&name, &resource_group),
                deadline,
                self.client.begin_delete_private_endpoint(&resource_group, &name),
            )
            .await?;

        match completion {
            Completion::Succeeded => info!("Deleted private endpoint {}", id),
            Completion::NotFound => info!("Private endpoint {} was already absent", id),
        }
        Ok(())
    }
}
