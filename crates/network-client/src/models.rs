//! Network resource provider models
//!
//! These models match the `Microsoft.Network` 2020-03-01 REST schema for private
//! endpoints, private DNS zone groups and network interfaces. Every field is optional
//! because the provider omits absent values instead of sending `null`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Reference to another resource by its identity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubResource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl SubResource {
    /// Reference a resource by identity
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: Some(id.into()) }
    }
}

/// Private endpoint resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateEndpoint {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<PrivateEndpointProperties>,
}

/// Properties of a private endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateEndpointProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnet: Option<SubResource>,
    /// Read-only: interfaces the provider attached to the endpoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_interfaces: Option<Vec<SubResource>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_link_service_connections: Option<Vec<PrivateLinkServiceConnection>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manual_private_link_service_connections: Option<Vec<PrivateLinkServiceConnection>>,
    /// Read-only: resolved names of the connected services
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_dns_configs: Option<Vec<CustomDnsConfig>>,
}

/// A connection from the endpoint to a private link service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateLinkServiceConnection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<PrivateLinkServiceConnectionProperties>,
}

/// Properties of a private link service connection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateLinkServiceConnectionProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_link_service_id: Option<String>,
    /// Sub-resource selectors (`sqlServer`, `blob`, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_link_service_connection_state: Option<PrivateLinkServiceConnectionState>,
}

/// Approval state of a connection as seen by the service owner
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateLinkServiceConnectionState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actions_required: Option<String>,
}

/// Name resolution entry computed by the provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomDnsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fqdn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_addresses: Option<Vec<String>>,
}

/// Private DNS zone group, a child resource of a private endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateDnsZoneGroup {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<PrivateDnsZoneGroupProperties>,
}

/// Properties of a private DNS zone group
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateDnsZoneGroupProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_dns_zone_configs: Option<Vec<PrivateDnsZoneConfig>>,
}

/// Binding of the zone group to one private DNS zone
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateDnsZoneConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<PrivateDnsZonePropertiesFormat>,
}

/// Properties of a zone config
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateDnsZonePropertiesFormat {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_dns_zone_id: Option<String>,
    /// Read-only: records the provider wrote into the zone
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_sets: Option<Vec<RecordSet>>,
}

/// Record written into a private DNS zone
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_set_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fqdn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_addresses: Option<Vec<String>>,
}

/// Network interface (read-only lookup)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInterface {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<NetworkInterfaceProperties>,
}

impl NetworkInterface {
    /// First private address assigned to the interface, primary configuration first
    pub fn private_ip_address(&self) -> Option<&str> {
        fn address_of(c: &IpConfiguration) -> Option<&str> {
            c.properties
                .as_ref()
                .and_then(|p| p.private_ip_address.as_deref())
                .filter(|a| !a.is_empty())
        }

        let configs = self.properties.as_ref()?.ip_configurations.as_ref()?;

        configs
            .iter()
            .filter(|c| c.properties.as_ref().and_then(|p| p.primary) == Some(true))
            .chain(configs.iter())
            .find_map(address_of)
    }
}

/// Properties of a network interface
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInterfaceProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_configurations: Option<Vec<IpConfiguration>>,
}

/// IP configuration of a network interface
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpConfiguration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<IpConfigurationProperties>,
}

/// Properties of an IP configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpConfigurationProperties {
    #[serde(rename = "privateIPAddress", skip_serializing_if = "Option::is_none")]
    pub private_ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary: Option<bool>,
}

/// Error envelope returned by the provider
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorResponse {
    pub error: Option<ErrorDetail>,
}

/// Error detail inside an [`ErrorResponse`]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

/// Body returned when polling an `Azure-AsyncOperation` URL
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AsyncOperationBody {
    #[serde(default)]
    pub status: String,
    pub error: Option<ErrorDetail>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_private_endpoint_deserializes_provider_payload() {
        let body = serde_json::json!({
            "id": "/subscriptions/s/resourceGroups/rg/providers/Microsoft.Network/privateEndpoints/pe1",
            "name": "pe1",
            "type": "Microsoft.Network/privateEndpoints",
            "location": "westeurope",
            "properties": {
                "subnet": { "id": "/subscriptions/s/resourceGroups/rg/providers/Microsoft.Network/virtualNetworks/vn/subnets/sn" },
                "networkInterfaces": [{ "id": "/subscriptions/s/resourceGroups/rg/providers/Microsoft.Network/networkInterfaces/nic1" }],
                "privateLinkServiceConnections": [{
                    "name": "conn1",
                    "properties": { "privateLinkServiceId": "/subscriptions/s/resourceGroups/rg/providers/Microsoft.Sql/servers/db", "groupIds": ["sqlServer"] }
                }],
                "customDnsConfigs": [{ "fqdn": "db.database.windows.net", "ipAddresses": ["10.0.0.4"] }]
            }
        });

        let endpoint: PrivateEndpoint = serde_json::from_value(body).unwrap();
        let props = endpoint.properties.unwrap();
        assert_eq!(endpoint.resource_type.as_deref(), Some("Microsoft.Network/privateEndpoints"));
        assert_eq!(props.private_link_service_connections.unwrap()[0].name.as_deref(), Some("conn1"));
        assert!(props.manual_private_link_service_connections.is_none());
        assert_eq!(props.custom_dns_configs.unwrap()[0].ip_addresses, Some(vec!["10.0.0.4".to_string()]));
    }

    #[test]
    fn test_absent_request_message_is_not_serialized() {
        let connection = PrivateLinkServiceConnection {
            name: Some("conn1".to_string()),
            properties: Some(PrivateLinkServiceConnectionProperties {
                private_link_service_id: Some("id".to_string()),
                group_ids: Some(vec!["blob".to_string()]),
                ..Default::default()
            }),
            ..Default::default()
        };

        let json = serde_json::to_value(&connection).unwrap();
        assert!(json["properties"].get("requestMessage").is_none());
        assert_eq!(json["properties"]["groupIds"][0], "blob");
    }

    #[test]
    fn test_nic_private_ip_prefers_primary_configuration() {
        let nic: NetworkInterface = serde_json::from_value(serde_json::json!({
            "properties": { "ipConfigurations": [
                { "name": "secondary", "properties": { "privateIPAddress": "10.0.0.9", "primary": false } },
                { "name": "primary", "properties": { "privateIPAddress": "10.0.0.5", "primary": true } }
            ]}
        }))
        .unwrap();
        assert_eq!(nic.private_ip_address(), Some("10.0.0.5"));
    }

    #[test]
    fn test_nic_private_ip_skips_blank_primary_address() {
        let nic: NetworkInterface = serde_json::from_value(serde_json::json!({
            "properties": { "ipConfigurations": [
                { "name": "primary", "properties": { "privateIPAddress": "", "primary": true } },
                { "name": "secondary", "properties": { "privateIPAddress": "10.0.0.9" } }
            ]}
        }))
        .unwrap();
        assert_eq!(nic.private_ip_address(), Some("10.0.0.9"));
    }

    #[test]
    fn test_nic_without_configurations_has_no_address() {
        assert_eq!(NetworkInterface::default().private_ip_address(), None);
    }
}
