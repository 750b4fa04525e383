//! Reconciliation logic for private endpoints.
//!
//! Each phase lives in its own module:
//! - `create_update`: validate, import check, endpoint write, zone group write, re-read
//! - `read`: authoritative read into observed state
//! - `delete`: delete by persisted identity
//!
//! Phases run strictly in sequence. Callers must not reconcile the same identity
//! from two places at once.

mod create_update;
mod delete;
#[cfg(test)]
mod delete_test;
mod read;
#[cfg(test)]
mod read_test;
pub mod validation;

use crate::config::ReconcilerSettings;
use crate::executor::OperationExecutor;
use endpoint_types::{FieldPredicates, ResourceId, StandardPredicates};
use network_client::NetworkClientTrait;

/// Reconciles private endpoints against the network resource provider.
pub struct Reconciler {
    pub(crate) client: Box<dyn NetworkClientTrait>,
    pub(crate) predicates: Box<dyn FieldPredicates>,
    pub(crate) settings: ReconcilerSettings,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("base_url", &self.client.base_url())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl Reconciler {
    /// Create a reconciler using the standard field predicates
    pub fn new(client: Box<dyn NetworkClientTrait>, settings: ReconcilerSettings) -> Self {
        Self {
            client,
            predicates: Box::new(StandardPredicates),
            settings,
        }
    }

    /// Replace the field predicates used by validation
    #[must_use]
    pub fn with_predicates(mut self, predicates: Box<dyn FieldPredicates>) -> Self {
        self.predicates = predicates;
        self
    }

    pub(crate) fn executor(&self) -> OperationExecutor<'_> {
        OperationExecutor::new(self.client.as_ref(), &self.settings)
    }
}

/// Resource group and endpoint name recovered from a persisted identity
pub(crate) fn endpoint_scope(id: &str) -> Result<(String, String), endpoint_types::ResourceIdError> {
    let parsed = ResourceId::parse(id)?;
    let name = parsed.require("privateEndpoints")?.to_string();
    Ok((parsed.resource_group, name))
}

#[cfg(test)]
pub(crate) mod test_utils {
    //! Fixtures shared by the reconciler tests

    use super::Reconciler;
    use crate::config::ReconcilerSettings;
    use endpoint_types::{DnsZoneGroup, EndpointConfig, ServiceConnection, ZoneConfig};
    use network_client::MockNetworkClient;
    use std::collections::BTreeMap;

    pub const SUBSCRIPTION: &str = "00000000-0000-0000-0000-000000000000";

    pub fn reconciler(client: &MockNetworkClient) -> Reconciler {
        Reconciler::new(Box::new(client.clone()), ReconcilerSettings::default())
    }

    pub fn endpoint_id(resource_group: &str, name: &str) -> String {
        format!(
            "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Network/privateEndpoints/{}",
            SUBSCRIPTION, resource_group, name
        )
    }

    pub fn sql_connection(name: &str) -> ServiceConnection {
        ServiceConnection {
            name: name.to_string(),
            is_manual_connection: false,
            private_connection_resource_id: format!(
                "/subscriptions/{}/resourceGroups/rg-data/providers/Microsoft.Sql/servers/sql1",
                SUBSCRIPTION
            ),
            subresource_names: vec!["sql".to_string()],
            request_message: None,
        }
    }

    pub fn storage_connection(name: &str, message: &str) -> ServiceConnection {
        ServiceConnection {
            name: name.to_string(),
            is_manual_connection: true,
            private_connection_resource_id: format!(
                "/subscriptions/{}/resourceGroups/rg-data/providers/Microsoft.Storage/storageAccounts/st1",
                SUBSCRIPTION
            ),
            subresource_names: vec!["blob".to_string()],
            request_message: Some(message.to_string()),
        }
    }

    pub fn zone_group() -> DnsZoneGroup {
        DnsZoneGroup {
            name: "default".to_string(),
            zone_configs: vec![ZoneConfig {
                name: "sql".to_string(),
                private_dns_zone_id: format!(
                    "/subscriptions/{}/resourceGroups/rg-dns/providers/Microsoft.Network/privateDnsZones/privatelink.database.windows.net",
                    SUBSCRIPTION
                ),
            }],
        }
    }

    pub fn desired(connections: Vec<ServiceConnection>, group: Option<DnsZoneGroup>) -> EndpointConfig {
        EndpointConfig {
            name: "pe-sql".to_string(),
            resource_group_name: "rg-app".to_string(),
            location: "West Europe".to_string(),
            subnet_id: format!(
                "/subscriptions/{}/resourceGroups/rg-net/providers/Microsoft.Network/virtualNetworks/vnet/subnets/endpoints",
                SUBSCRIPTION
            ),
            private_service_connections: connections,
            private_dns_zone_group: group,
            tags: BTreeMap::from([("env".to_string(), "test".to_string())]),
        }
    }
}
