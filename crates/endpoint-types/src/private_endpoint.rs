//! Private endpoint desired and observed state
//!
//! Desired state is what the host hands the reconciler. Observed state has the same
//! shape plus the computed fields the provider fills in; every observed field is a
//! concrete value so comparisons never have to tell "unset" from "omitted".

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading desired state
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML desired state: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON desired state: {0}")]
    Json(#[from] serde_json::Error),
}

/// Desired state of a private endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EndpointConfig {
    /// Endpoint name (immutable after creation)
    pub name: String,

    /// Resource group the endpoint lives in
    pub resource_group_name: String,

    /// Region (immutable after creation)
    pub location: String,

    /// Subnet the endpoint's interface is placed in (immutable after creation)
    pub subnet_id: String,

    /// Connections to remote services, automatic and manual mixed in one list
    pub private_service_connections: Vec<ServiceConnection>,

    /// Optional name-resolution binding, created after the endpoint exists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_dns_zone_group: Option<DnsZoneGroup>,

    /// Freeform tags
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

/// One connection to a remote service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ServiceConnection {
    pub name: String,

    /// Manual connections wait for approval by the target's owner
    #[serde(default)]
    pub is_manual_connection: bool,

    /// Identity of the target service
    pub private_connection_resource_id: String,

    /// Sub-resource selectors; required unless the target exposes exactly one
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subresource_names: Vec<String>,

    /// Message shown to the approver (manual connections only, 1-140 characters)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DnsZoneGroup {
    pub name: String,

    #[serde(default)]
    pub zone_configs: Vec<ZoneConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ZoneConfig {
    pub name: String,

    /// Identity of the private DNS zone
    pub private_dns_zone_id: String,
}

/// Authoritative state read back from the provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ObservedEndpoint {
    /// Provider-assigned identity; the only value a host needs to persist
    pub id: String,
    pub name: String,
    pub resource_group_name: String,
    pub location: String,
    pub subnet_id: String,
    pub private_service_connections: Vec<ObservedServiceConnection>,

    /// Empty when no zone group exists, otherwise exactly one element
    pub private_dns_zone_group: Vec<ObservedDnsZoneGroup>,

    /// Computed name-to-address bindings
    pub custom_dns_configs: Vec<CustomDnsBinding>,
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ObservedServiceConnection {
    pub name: String,
    pub is_manual_connection: bool,
    pub private_connection_resource_id: String,
    pub subresource_names: Vec<String>,
    pub request_message: String,

    /// Address of the endpoint's attached interface, empty when unknown
    pub private_ip_address: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ObservedDnsZoneGroup {
    pub id: String,
    pub name: String,
    pub zone_configs: Vec<ZoneConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CustomDnsBinding {
    pub fqdn: String,
    pub ip_addresses: Vec<String>,
}

impl EndpointConfig {
    /// Parse desired state from YAML
    pub fn from_yaml(input: &str) -> Result<Self, LoadError> {
        Ok(serde_yaml::from_str(input)?)
    }

    /// Parse desired state from JSON
    pub fn from_json(input: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(input)?)
    }

    /// Load desired state from a file; `.json` files are parsed as JSON, anything else as YAML
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json(&content)
        } else {
            Self::from_yaml(&content)
        }
    }

    /// Connections with the given discriminator, in declaration order
    pub fn connections(&self, manual: bool) -> impl Iterator<Item = &ServiceConnection> {
        self.private_service_connections
            .iter()
            .filter(move |c| c.is_manual_connection == manual)
    }
}
