//! Private endpoint, DNS zone group and network interface operations for MockNetworkClient

use super::helpers::{endpoint_key, zone_group_key};
use super::operations::{self, PendingEffect};
use super::{MockNetworkClient, RecordedCall};
use crate::error::NetworkError;
use crate::models::*;
use crate::operation::{OperationHandle, OperationKind};

fn provider_error(status: u16, code: &str, message: String) -> NetworkError {
    NetworkError::Api {
        status,
        code: code.to_string(),
        message,
    }
}

pub fn get_private_endpoint(client: &MockNetworkClient, resource_group: &str, name: &str) -> Result<PrivateEndpoint, NetworkError> {
    client.record(RecordedCall::GetPrivateEndpoint {
        resource_group: resource_group.to_string(),
        name: name.to_string(),
    });

    let mut endpoint = client
        .endpoints
        .lock()
        .unwrap()
        .get(&endpoint_key(resource_group, name))
        .cloned()
        .ok_or_else(|| NetworkError::NotFound(format!("Private endpoint {} not found", name)))?;

    if client.faults.lock().unwrap().omit_endpoint_id {
        endpoint.id = None;
    }
    Ok(endpoint)
}

pub fn begin_create_or_update_private_endpoint(
    client: &MockNetworkClient,
    resource_group: &str,
    name: &str,
    parameters: &PrivateEndpoint,
) -> Result<OperationHandle, NetworkError> {
    client.record(RecordedCall::CreateOrUpdatePrivateEndpoint {
        resource_group: resource_group.to_string(),
        name: name.to_string(),
    });

    if let Some((status, code, message)) = client.faults.lock().unwrap().reject_endpoint_write.take() {
        return Err(provider_error(status, &code, message));
    }

    let has_subnet = parameters
        .properties
        .as_ref()
        .and_then(|p| p.subnet.as_ref())
        .and_then(|s| s.id.as_ref())
        .is_some();
    if !has_subnet {
        return Err(provider_error(
            400,
            "InvalidRequestFormat",
            "Cannot parse the request: subnet is required".to_string(),
        ));
    }

    let path = client.helpers().endpoint_id(resource_group, name);
    Ok(operations::start(
        client,
        OperationKind::CreateOrUpdate,
        path,
        PendingEffect::WriteEndpoint {
            resource_group: resource_group.to_string(),
            name: name.to_string(),
            endpoint: parameters.clone(),
        },
    ))
}

pub fn begin_delete_private_endpoint(client: &MockNetworkClient, resource_group: &str, name: &str) -> Result<OperationHandle, NetworkError> {
    client.record(RecordedCall::DeletePrivateEndpoint {
        resource_group: resource_group.to_string(),
        name: name.to_string(),
    });

    if !client
        .endpoints
        .lock()
        .unwrap()
        .contains_key(&endpoint_key(resource_group, name))
    {
        return Err(NetworkError::NotFound(format!("Private endpoint {} not found", name)));
    }

    let path = client.helpers().endpoint_id(resource_group, name);
    Ok(operations::start(
        client,
        OperationKind::Delete,
        path,
        PendingEffect::DeleteEndpoint {
            resource_group: resource_group.to_string(),
            name: name.to_string(),
        },
    ))
}

pub fn get_private_dns_zone_group(
    client: &MockNetworkClient,
    resource_group: &str,
    endpoint_name: &str,
    group_name: &str,
) -> Result<PrivateDnsZoneGroup, NetworkError> {
    client.record(RecordedCall::GetPrivateDnsZoneGroup {
        resource_group: resource_group.to_string(),
        endpoint_name: endpoint_name.to_string(),
        group_name: group_name.to_string(),
    });

    if client.faults.lock().unwrap().zone_group_lookup_fails {
        return Err(provider_error(500, "InternalServerError", "zone group lookup failed".to_string()));
    }

    client
        .zone_groups
        .lock()
        .unwrap()
        .get(&zone_group_key(resource_group, endpoint_name, group_name))
        .cloned()
        .ok_or_else(|| NetworkError::NotFound(format!("Private DNS zone group {} not found", group_name)))
}

pub fn begin_create_or_update_private_dns_zone_group(
    client: &MockNetworkClient,
    resource_group: &str,
    endpoint_name: &str,
    group_name: &str,
    parameters: &PrivateDnsZoneGroup,
) -> Result<OperationHandle, NetworkError> {
    client.record(RecordedCall::CreateOrUpdatePrivateDnsZoneGroup {
        resource_group: resource_group.to_string(),
        endpoint_name: endpoint_name.to_string(),
        group_name: group_name.to_string(),
    });

    if !client
        .endpoints
        .lock()
        .unwrap()
        .contains_key(&endpoint_key(resource_group, endpoint_name))
    {
        return Err(NetworkError::NotFound(format!(
            "Parent private endpoint {} not found",
            endpoint_name
        )));
    }

    let path = client.helpers().zone_group_id(resource_group, endpoint_name, group_name);
    Ok(operations::start(
        client,
        OperationKind::CreateOrUpdate,
        path,
        PendingEffect::WriteZoneGroup {
            resource_group: resource_group.to_string(),
            endpoint_name: endpoint_name.to_string(),
            group_name: group_name.to_string(),
            group: parameters.clone(),
        },
    ))
}

pub fn get_network_interface(client: &MockNetworkClient, id: &str) -> Result<NetworkInterface, NetworkError> {
    client.record(RecordedCall::GetNetworkInterface { id: id.to_string() });

    if client.faults.lock().unwrap().nic_lookup_fails {
        return Err(provider_error(500, "InternalServerError", "network interface lookup failed".to_string()));
    }

    client
        .interfaces
        .lock()
        .unwrap()
        .get(&id.to_lowercase())
        .cloned()
        .ok_or_else(|| NetworkError::NotFound(format!("Network interface {} not found", id)))
}

/// First attached interface's address, if the endpoint has one
fn endpoint_address(client: &MockNetworkClient, endpoint: &PrivateEndpoint) -> Option<String> {
    let nic_id = endpoint
        .properties
        .as_ref()?
        .network_interfaces
        .as_ref()?
        .first()?
        .id
        .clone()?;
    client
        .interfaces
        .lock()
        .unwrap()
        .get(&nic_id.to_lowercase())
        .and_then(|nic| nic.private_ip_address().map(str::to_string))
}

fn stamp_connections(connections: &mut Option<Vec<PrivateLinkServiceConnection>>, endpoint_id: &str, status: &str) {
    for connection in connections.iter_mut().flatten() {
        let name = connection.name.clone().unwrap_or_default();
        connection.id = Some(format!("{}/privateLinkServiceConnections/{}", endpoint_id, name));
        let props = connection.properties.get_or_insert_with(Default::default);
        props.provisioning_state = Some("Succeeded".to_string());
        props.private_link_service_connection_state = Some(PrivateLinkServiceConnectionState {
            status: Some(status.to_string()),
            description: Some(props.request_message.clone().unwrap_or_default()),
            actions_required: Some("None".to_string()),
        });
    }
}

/// Apply a completed endpoint create-or-update to the store
pub(crate) fn apply_endpoint_write(client: &MockNetworkClient, resource_group: &str, name: &str, mut endpoint: PrivateEndpoint) {
    let helpers = client.helpers();
    let existing = client
        .endpoints
        .lock()
        .unwrap()
        .get(&endpoint_key(resource_group, name))
        .cloned();

    let endpoint_id = helpers.endpoint_id(resource_group, name);
    endpoint.id = Some(endpoint_id.clone());
    endpoint.name = Some(name.to_string());
    endpoint.resource_type = Some("Microsoft.Network/privateEndpoints".to_string());
    endpoint.etag = Some(format!("W/\"{}\"", client.next_id()));

    // Keep the interface across updates; attach a new one on first creation
    let interfaces = match existing
        .as_ref()
        .and_then(|e| e.properties.as_ref())
        .and_then(|p| p.network_interfaces.clone())
    {
        Some(interfaces) => interfaces,
        None => {
            let nic = helpers.network_interface(resource_group, name, client.next_id());
            let nic_id = nic.id.clone().unwrap_or_default();
            client.add_network_interface(nic);
            vec![SubResource::new(nic_id)]
        }
    };

    let props = endpoint.properties.get_or_insert_with(Default::default);
    props.provisioning_state = Some("Succeeded".to_string());
    props.network_interfaces = Some(interfaces);
    stamp_connections(&mut props.private_link_service_connections, &endpoint_id, "Approved");
    stamp_connections(&mut props.manual_private_link_service_connections, &endpoint_id, "Pending");

    let address = endpoint_address(client, &endpoint);
    let dns = helpers.custom_dns_configs(&endpoint, address.as_deref());
    if let Some(props) = endpoint.properties.as_mut() {
        props.custom_dns_configs = Some(dns);
    }

    client
        .endpoints
        .lock()
        .unwrap()
        .insert(endpoint_key(resource_group, name), endpoint);
}

/// Apply a completed zone group create-or-update; false when the parent is gone
pub(crate) fn apply_zone_group_write(
    client: &MockNetworkClient,
    resource_group: &str,
    endpoint_name: &str,
    group_name: &str,
    mut group: PrivateDnsZoneGroup,
) -> bool {
    let helpers = client.helpers();
    let Some(endpoint) = client
        .endpoints
        .lock()
        .unwrap()
        .get(&endpoint_key(resource_group, endpoint_name))
        .cloned()
    else {
        return false;
    };
    let address = endpoint_address(client, &endpoint);

    group.id = Some(helpers.zone_group_id(resource_group, endpoint_name, group_name));
    group.name = Some(group_name.to_string());
    group.etag = Some(format!("W/\"{}\"", client.next_id()));
    let props = group.properties.get_or_insert_with(Default::default);
    props.provisioning_state = Some("Succeeded".to_string());
    for config in props.private_dns_zone_configs.iter_mut().flatten() {
        let format = config.properties.get_or_insert_with(Default::default);
        let zone_id = format.private_dns_zone_id.clone().unwrap_or_default();
        format.record_sets = Some(helpers.record_sets(&zone_id, endpoint_name, address.as_deref()));
    }

    client
        .zone_groups
        .lock()
        .unwrap()
        .insert(zone_group_key(resource_group, endpoint_name, group_name), group);
    true
}

/// Apply a completed endpoint delete, cascading to its zone groups and interface
pub(crate) fn apply_endpoint_delete(client: &MockNetworkClient, resource_group: &str, name: &str) {
    let removed = client
        .endpoints
        .lock()
        .unwrap()
        .remove(&endpoint_key(resource_group, name));

    let (rg_key, name_key) = endpoint_key(resource_group, name);
    client
        .zone_groups
        .lock()
        .unwrap()
        .retain(|(rg, endpoint, _), _| !(rg == &rg_key && endpoint == &name_key));

    let nic_ids: Vec<String> = removed
        .and_then(|e| e.properties)
        .and_then(|p| p.network_interfaces)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|n| n.id)
        .collect();
    let mut interfaces = client.interfaces.lock().unwrap();
    for id in nic_ids {
        interfaces.remove(&id.to_lowercase());
    }
}
