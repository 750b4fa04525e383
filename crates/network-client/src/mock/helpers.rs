//! Helper functions for building identities and computed fields in the mock

use crate::models::*;

/// Store key of an endpoint
pub(crate) fn endpoint_key(resource_group: &str, name: &str) -> (String, String) {
    (resource_group.to_lowercase(), name.to_lowercase())
}

/// Store key of a zone group
pub(crate) fn zone_group_key(resource_group: &str, endpoint_name: &str, group_name: &str) -> (String, String, String) {
    (
        resource_group.to_lowercase(),
        endpoint_name.to_lowercase(),
        group_name.to_lowercase(),
    )
}

/// Helper functions for provider-assigned values
pub(crate) struct Helpers {
    subscription_id: String,
}

impl Helpers {
    pub(crate) fn new(subscription_id: String) -> Self {
        Self { subscription_id }
    }

    fn provider_path(&self, resource_group: &str) -> String {
        format!(
            "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Network",
            self.subscription_id, resource_group
        )
    }

    /// Identity the provider assigns to an endpoint
    pub(crate) fn endpoint_id(&self, resource_group: &str, name: &str) -> String {
        format!("{}/privateEndpoints/{}", self.provider_path(resource_group), name)
    }

    /// Identity the provider assigns to a zone group
    pub(crate) fn zone_group_id(&self, resource_group: &str, endpoint_name: &str, group_name: &str) -> String {
        format!(
            "{}/privateDnsZoneGroups/{}",
            self.endpoint_id(resource_group, endpoint_name),
            group_name
        )
    }

    /// Interface the provider attaches to a new endpoint
    pub(crate) fn network_interface(&self, resource_group: &str, endpoint_name: &str, ordinal: u64) -> NetworkInterface {
        let id = format!(
            "{}/networkInterfaces/{}.nic.{}",
            self.provider_path(resource_group),
            endpoint_name,
            ordinal
        );
        NetworkInterface {
            id: Some(id),
            name: Some(format!("{}.nic.{}", endpoint_name, ordinal)),
            properties: Some(NetworkInterfaceProperties {
                ip_configurations: Some(vec![IpConfiguration {
                    id: None,
                    name: Some("privateEndpointIpConfig".to_string()),
                    properties: Some(IpConfigurationProperties {
                        private_ip_address: Some(format!("10.0.{}.{}", ordinal / 250, ordinal % 250 + 4)),
                        primary: Some(true),
                    }),
                }]),
            }),
        }
    }

    /// Name resolution entries the provider computes for the endpoint's connections
    pub(crate) fn custom_dns_configs(&self, endpoint: &PrivateEndpoint, address: Option<&str>) -> Vec<CustomDnsConfig> {
        let Some(props) = endpoint.properties.as_ref() else {
            return Vec::new();
        };
        props
            .private_link_service_connections
            .iter()
            .chain(props.manual_private_link_service_connections.iter())
            .flatten()
            .filter_map(|c| c.properties.as_ref()?.private_link_service_id.as_deref())
            .map(|target| CustomDnsConfig {
                fqdn: Some(format!(
                    "{}.privatelink.mock.net",
                    target.rsplit('/').next().unwrap_or(target).to_lowercase()
                )),
                ip_addresses: Some(address.map(|a| vec![a.to_string()]).unwrap_or_default()),
            })
            .collect()
    }

    /// Records the provider writes for each zone config
    pub(crate) fn record_sets(&self, zone_id: &str, endpoint_name: &str, address: Option<&str>) -> Vec<RecordSet> {
        let zone = zone_id.rsplit('/').next().unwrap_or(zone_id);
        vec![RecordSet {
            record_type: Some("A".to_string()),
            record_set_name: Some(endpoint_name.to_string()),
            fqdn: Some(format!("{}.{}", endpoint_name, zone)),
            provisioning_state: Some("Succeeded".to_string()),
            ttl: Some(10),
            ip_addresses: Some(address.map(|a| vec![a.to_string()]).unwrap_or_default()),
        }]
    }
}
