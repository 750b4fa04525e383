//! Read phase

use super::{endpoint_scope, Reconciler};
use crate::error::{Operation, ReconcileError};
use crate::executor::{Deadline, OperationExecutor, Target};
use crate::transform;
use endpoint_types::{normalize_location, ObservedEndpoint};
use network_client::{NetworkError, PrivateEndpointProperties};
use tracing::{debug, info, warn};

impl Reconciler {
    /// Read the authoritative state of a private endpoint.
    ///
    /// Returns `Ok(None)` when the endpoint no longer exists; the caller should
    /// forget the identity. The DNS zone group is only fetched when
    /// `zone_group_name` is given, and failing to read it is an error.
    pub async fn read(
        &self,
        id: &str,
        zone_group_name: Option<&str>,
    ) -> Result<Option<ObservedEndpoint>, ReconcileError> {
        let (resource_group, name) = endpoint_scope(id)?;
        let deadline = Deadline::after(self.settings.timeouts.read);
        let executor = self.executor();

        debug!("Reading private endpoint {} (resource group {})", name, resource_group);
        let Some(endpoint) = executor
            .fetch(
                Operation::Read,
                Target::endpoint(&name, &resource_group),
                deadline,
                self.client.get_private_endpoint(&resource_group, &name),
            )
            .await?
        else {
            info!("Private endpoint {} does not exist - removing from state", id);
            return Ok(None);
        };

        let mut observed = ObservedEndpoint {
            id: endpoint.id.clone().filter(|i| !i.is_empty()).unwrap_or_else(|| id.to_string()),
            name: endpoint.name.clone().unwrap_or_else(|| name.clone()),
            resource_group_name: resource_group.clone(),
            location: endpoint.location.as_deref().map(normalize_location).unwrap_or_default(),
            tags: transform::flatten_tags(endpoint.tags.as_ref()),
            ..Default::default()
        };

        let Some(props) = endpoint.properties.as_ref() else {
            return Ok(Some(observed));
        };

        let address = self.private_ip_address(&executor, props, &resource_group, deadline).await;
        observed.private_service_connections = transform::flatten_service_connections(
            props.private_link_service_connections.as_deref(),
            props.manual_private_link_service_connections.as_deref(),
        );
        for connection in &mut observed.private_service_connections {
            connection.private_ip_address = address.clone();
        }

        // Unlike the interface address, a referenced zone group must be readable
        if let Some(group_name) = zone_group_name {
            let target = Target::zone_group(group_name, &resource_group);
            let group = executor
                .fetch(
                    Operation::Read,
                    target,
                    deadline,
                    self.client.get_private_dns_zone_group(&resource_group, &name, group_name),
                )
                .await?
                .ok_or_else(|| {
                    ReconcileError::provider(
                        Operation::Read,
                        target.kind,
                        target.name,
                        target.resource_group,
                        NetworkError::NotFound(format!(
                            "DNS zone group {} of private endpoint {} does not exist",
                            group_name, name
                        )),
                    )
                })?;
            observed.private_dns_zone_group = transform::flatten_private_dns_zone_group(Some(&group));
        }

        observed.subnet_id = props
            .subnet
            .as_ref()
            .and_then(|s| s.id.clone())
            .unwrap_or_default();
        observed.custom_dns_configs = transform::flatten_custom_dns_configs(props.custom_dns_configs.as_deref());

        Ok(Some(observed))
    }

    /// Address of the first attached interface; empty when it cannot be resolved
    async fn private_ip_address(
        &self,
        executor: &OperationExecutor<'_>,
        props: &PrivateEndpointProperties,
        resource_group: &str,
        deadline: Deadline,
    ) -> String {
        let Some(nic_id) = props
            .network_interfaces
            .as_deref()
            .and_then(|nics| nics.first())
            .and_then(|nic| nic.id.as_deref())
            .filter(|id| !id.is_empty())
        else {
            return String::new();
        };

        match executor
            .fetch(
                Operation::Read,
                Target::network_interface(nic_id, resource_group),
                deadline,
                self.client.get_network_interface(nic_id),
            )
            .await
        {
            Ok(Some(nic)) => nic.private_ip_address().unwrap_or_default().to_string(),
            Ok(None) => {
                warn!("Network interface {} not found, leaving private IP address empty", nic_id);
                String::new()
            }
            Err(e) => {
                warn!("Unable to resolve private IP address: {}", e);
                String::new()
            }
        }
    }
}
