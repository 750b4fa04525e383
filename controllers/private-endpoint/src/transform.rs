//! Transforms between desired/observed state and the provider's wire models.
//!
//! Everything here is pure: no I/O, no waiting, and no input shape makes a
//! function fail. "Expand" builds wire shapes from desired state, "flatten" turns
//! wire shapes back into observed state, filling absent values with empty ones.

use endpoint_types::{
    normalize_location, CustomDnsBinding, DnsZoneGroup, EndpointConfig, ObservedDnsZoneGroup,
    ObservedServiceConnection, ServiceConnection, ZoneConfig,
};
use network_client::{
    CustomDnsConfig, PrivateDnsZoneConfig, PrivateDnsZoneGroup, PrivateDnsZoneGroupProperties,
    PrivateDnsZonePropertiesFormat, PrivateEndpoint, PrivateEndpointProperties,
    PrivateLinkServiceConnection, PrivateLinkServiceConnectionProperties, SubResource,
};
use std::collections::BTreeMap;

/// Build the full create-or-update body for an endpoint
pub fn expand_private_endpoint(config: &EndpointConfig) -> PrivateEndpoint {
    PrivateEndpoint {
        location: Some(normalize_location(&config.location)),
        tags: expand_tags(&config.tags),
        properties: Some(PrivateEndpointProperties {
            subnet: Some(SubResource::new(config.subnet_id.clone())),
            private_link_service_connections: Some(expand_service_connections(
                &config.private_service_connections,
                false,
            )),
            manual_private_link_service_connections: Some(expand_service_connections(
                &config.private_service_connections,
                true,
            )),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Wire collection for the connections whose discriminator equals `manual`
///
/// Relative order is preserved. Calling this once with `false` and once with `true`
/// partitions the input.
pub fn expand_service_connections(
    connections: &[ServiceConnection],
    manual: bool,
) -> Vec<PrivateLinkServiceConnection> {
    connections
        .iter()
        .filter(|c| c.is_manual_connection == manual)
        .map(expand_service_connection)
        .collect()
}

fn expand_service_connection(connection: &ServiceConnection) -> PrivateLinkServiceConnection {
    // Absent and empty are different on the wire
    let request_message = connection
        .request_message
        .as_ref()
        .filter(|m| connection.is_manual_connection && !m.trim().is_empty())
        .cloned();

    PrivateLinkServiceConnection {
        name: Some(connection.name.clone()),
        properties: Some(PrivateLinkServiceConnectionProperties {
            private_link_service_id: Some(connection.private_connection_resource_id.clone()),
            group_ids: Some(connection.subresource_names.clone()),
            request_message,
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Wire shape of the optional zone group; unnamed when none is requested
pub fn expand_private_dns_zone_group(group: Option<&DnsZoneGroup>) -> PrivateDnsZoneGroup {
    let Some(group) = group else {
        return PrivateDnsZoneGroup::default();
    };

    let configs = group
        .zone_configs
        .iter()
        .map(|z| PrivateDnsZoneConfig {
            name: Some(z.name.clone()),
            properties: Some(PrivateDnsZonePropertiesFormat {
                private_dns_zone_id: Some(z.private_dns_zone_id.clone()),
                ..Default::default()
            }),
        })
        .collect();

    PrivateDnsZoneGroup {
        name: Some(group.name.clone()),
        properties: Some(PrivateDnsZoneGroupProperties {
            private_dns_zone_configs: Some(configs),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Merge the provider's two connection collections, automatic entries first
///
/// `private_ip_address` is left empty; the reconciler fills it in afterwards.
pub fn flatten_service_connections(
    automatic: Option<&[PrivateLinkServiceConnection]>,
    manual: Option<&[PrivateLinkServiceConnection]>,
) -> Vec<ObservedServiceConnection> {
    let automatic = automatic.unwrap_or_default().iter().map(|c| flatten_service_connection(c, false));
    let manual = manual.unwrap_or_default().iter().map(|c| flatten_service_connection(c, true));
    automatic.chain(manual).collect()
}

fn flatten_service_connection(
    connection: &PrivateLinkServiceConnection,
    manual: bool,
) -> ObservedServiceConnection {
    let props = connection.properties.as_ref();
    ObservedServiceConnection {
        name: connection.name.clone().unwrap_or_default(),
        is_manual_connection: manual,
        private_connection_resource_id: props
            .and_then(|p| p.private_link_service_id.clone())
            .unwrap_or_default(),
        subresource_names: props.and_then(|p| p.group_ids.clone()).unwrap_or_default(),
        request_message: props
            .filter(|_| manual)
            .and_then(|p| p.request_message.clone())
            .unwrap_or_default(),
        private_ip_address: String::new(),
    }
}

/// Zone group as observed state: empty when absent, otherwise exactly one element
pub fn flatten_private_dns_zone_group(group: Option<&PrivateDnsZoneGroup>) -> Vec<ObservedDnsZoneGroup> {
    let Some(group) = group else {
        return Vec::new();
    };

    let zone_configs = group
        .properties
        .as_ref()
        .and_then(|p| p.private_dns_zone_configs.as_deref())
        .unwrap_or_default()
        .iter()
        .map(|z| ZoneConfig {
            name: z.name.clone().unwrap_or_default(),
            private_dns_zone_id: z
                .properties
                .as_ref()
                .and_then(|p| p.private_dns_zone_id.clone())
                .unwrap_or_default(),
        })
        .collect();

    vec![ObservedDnsZoneGroup {
        id: group.id.clone().unwrap_or_default(),
        name: group.name.clone().unwrap_or_default(),
        zone_configs,
    }]
}

/// Computed name bindings, order and address lists kept verbatim
pub fn flatten_custom_dns_configs(configs: Option<&[CustomDnsConfig]>) -> Vec<CustomDnsBinding> {
    configs
        .unwrap_or_default()
        .iter()
        .map(|c| CustomDnsBinding {
            fqdn: c.fqdn.clone().unwrap_or_default(),
            ip_addresses: c.ip_addresses.clone().unwrap_or_default(),
        })
        .collect()
}

/// Tags as sent on the wire; always present so removed tags are cleared
pub fn expand_tags(tags: &BTreeMap<String, String>) -> Option<BTreeMap<String, String>> {
    Some(tags.clone())
}

/// Tags as observed; an absent map reads as empty
pub fn flatten_tags(tags: Option<&BTreeMap<String, String>>) -> BTreeMap<String, String> {
    tags.cloned().unwrap_or_default()
}
