//! Drift detection between desired and observed state
//!
//! Compares a desired configuration with the state read back from the provider and
//! lists every field that differs. Fields the provider cannot change in place are
//! flagged so callers know the endpoint has to be replaced.

use endpoint_types::{
    normalize_location, DnsZoneGroup, EndpointConfig, ObservedDnsZoneGroup, ObservedEndpoint,
    ObservedServiceConnection, ServiceConnection,
};
use serde::Serialize;
use std::collections::BTreeMap;

/// One differing field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldChange {
    /// Path of the field, e.g. `private_service_connections.0.name`
    pub field: String,
    /// Desired value, rendered as text
    pub desired: String,
    /// Observed value, rendered as text
    pub observed: String,
    /// The change can only be applied by replacing the endpoint
    pub force_new: bool,
}

/// Differences found by [`detect`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DriftReport {
    /// Changed fields in comparison order
    pub changes: Vec<FieldChange>,
}

impl DriftReport {
    /// Whether observed state matches desired state
    pub fn is_converged(&self) -> bool {
        self.changes.is_empty()
    }

    /// Whether any change touches a field that forces replacement
    pub fn requires_replacement(&self) -> bool {
        self.changes.iter().any(|c| c.force_new)
    }

    fn record(&mut self, field: impl Into<String>, desired: impl Into<String>, observed: impl Into<String>, force_new: bool) {
        self.changes.push(FieldChange {
            field: field.into(),
            desired: desired.into(),
            observed: observed.into(),
            force_new,
        });
    }

    fn compare(&mut self, field: &str, desired: &str, observed: &str, force_new: bool) {
        if desired != observed {
            self.record(field, desired, observed, force_new);
        }
    }
}

/// Compare desired state with observed state
pub fn detect(desired: &EndpointConfig, observed: &ObservedEndpoint) -> DriftReport {
    let mut report = DriftReport::default();

    report.compare("name", &desired.name, &observed.name, true);
    if !desired.resource_group_name.eq_ignore_ascii_case(&observed.resource_group_name) {
        report.record("resource_group_name", &desired.resource_group_name, &observed.resource_group_name, true);
    }
    report.compare(
        "location",
        &normalize_location(&desired.location),
        &normalize_location(&observed.location),
        true,
    );
    if !desired.subnet_id.eq_ignore_ascii_case(&observed.subnet_id) {
        report.record("subnet_id", &desired.subnet_id, &observed.subnet_id, true);
    }

    compare_connections(&mut report, desired, &observed.private_service_connections);

    let desired_group = desired.private_dns_zone_group.as_ref().map(describe_desired_group).unwrap_or_default();
    let observed_group = observed.private_dns_zone_group.first().map(describe_observed_group).unwrap_or_default();
    report.compare("private_dns_zone_group", &desired_group, &observed_group, false);

    report.compare("tags", &describe_tags(&desired.tags), &describe_tags(&observed.tags), false);

    report
}

/// Observed connections are ordered automatic first, so desired ones are put in the same order
fn compare_connections(report: &mut DriftReport, desired: &EndpointConfig, observed: &[ObservedServiceConnection]) {
    let ordered: Vec<&ServiceConnection> = desired.connections(false).chain(desired.connections(true)).collect();

    if ordered.len() != observed.len() {
        report.record(
            "private_service_connections.#",
            ordered.len().to_string(),
            observed.len().to_string(),
            true,
        );
    }

    for (index, (want, have)) in ordered.iter().zip(observed).enumerate() {
        let field = |name: &str| format!("private_service_connections.{}.{}", index, name);

        report.compare(&field("name"), &want.name, &have.name, true);
        report.compare(
            &field("is_manual_connection"),
            &want.is_manual_connection.to_string(),
            &have.is_manual_connection.to_string(),
            true,
        );
        if !want
            .private_connection_resource_id
            .eq_ignore_ascii_case(&have.private_connection_resource_id)
        {
            report.record(
                field("private_connection_resource_id"),
                &want.private_connection_resource_id,
                &have.private_connection_resource_id,
                true,
            );
        }
        report.compare(
            &field("subresource_names"),
            &want.subresource_names.join(","),
            &have.subresource_names.join(","),
            true,
        );
        report.compare(&field("request_message"), effective_message(want), &have.request_message, false);
    }
}

/// Message as the provider stores it: only manual connections keep a non-blank one
fn effective_message(connection: &ServiceConnection) -> &str {
    if !connection.is_manual_connection {
        return "";
    }
    connection
        .request_message
        .as_deref()
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_default()
}

fn describe_desired_group(group: &DnsZoneGroup) -> String {
    describe_group(&group.name, group.zone_configs.iter().map(|c| (&c.name, &c.private_dns_zone_id)))
}

fn describe_observed_group(group: &ObservedDnsZoneGroup) -> String {
    describe_group(&group.name, group.zone_configs.iter().map(|c| (&c.name, &c.private_dns_zone_id)))
}

fn describe_group<'a>(name: &str, configs: impl Iterator<Item = (&'a String, &'a String)>) -> String {
    let configs: Vec<String> = configs.map(|(n, zone)| format!("{}={}", n, zone)).collect();
    format!("{}[{}]", name, configs.join(","))
}

fn describe_tags(tags: &BTreeMap<String, String>) -> String {
    tags.iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use endpoint_types::{CustomDnsBinding, ZoneConfig};

    fn connection(name: &str, manual: bool, message: Option<&str>) -> ServiceConnection {
        ServiceConnection {
            name: name.to_string(),
            is_manual_connection: manual,
            private_connection_resource_id: format!("/subscriptions/s/resourceGroups/rg/providers/Microsoft.Sql/servers/{}", name),
            subresource_names: vec!["sqlServer".to_string()],
            request_message: message.map(str::to_string),
        }
    }

    fn desired() -> EndpointConfig {
        EndpointConfig {
            name: "pe1".to_string(),
            resource_group_name: "rg-app".to_string(),
            location: "West Europe".to_string(),
            subnet_id: "/subscriptions/s/resourceGroups/rg-net/providers/Microsoft.Network/virtualNetworks/vn/subnets/sn".to_string(),
            private_service_connections: vec![connection("manual1", true, Some("please approve")), connection("auto1", false, None)],
            private_dns_zone_group: Some(DnsZoneGroup {
                name: "default".to_string(),
                zone_configs: vec![ZoneConfig {
                    name: "sql".to_string(),
                    private_dns_zone_id: "/subscriptions/s/resourceGroups/rg-dns/providers/Microsoft.Network/privateDnsZones/z".to_string(),
                }],
            }),
            tags: BTreeMap::from([("env".to_string(), "test".to_string())]),
        }
    }

    fn observed_connection(c: &ServiceConnection) -> ObservedServiceConnection {
        ObservedServiceConnection {
            name: c.name.clone(),
            is_manual_connection: c.is_manual_connection,
            private_connection_resource_id: c.private_connection_resource_id.clone(),
            subresource_names: c.subresource_names.clone(),
            request_message: effective_message(c).to_string(),
            private_ip_address: "10.0.0.4".to_string(),
        }
    }

    /// Observed state the provider reports for `desired()`
    fn converged() -> ObservedEndpoint {
        let config = desired();
        let group = config.private_dns_zone_group.clone().unwrap();
        ObservedEndpoint {
            id: "/subscriptions/s/resourceGroups/RG-APP/providers/Microsoft.Network/privateEndpoints/pe1".to_string(),
            name: "pe1".to_string(),
            resource_group_name: "RG-APP".to_string(),
            location: "westeurope".to_string(),
            subnet_id: config.subnet_id.clone(),
            private_service_connections: vec![
                observed_connection(&config.private_service_connections[1]),
                observed_connection(&config.private_service_connections[0]),
            ],
            private_dns_zone_group: vec![ObservedDnsZoneGroup {
                id: "zg".to_string(),
                name: group.name,
                zone_configs: group.zone_configs,
            }],
            custom_dns_configs: vec![CustomDnsBinding {
                fqdn: "auto1.privatelink.database.windows.net".to_string(),
                ip_addresses: vec!["10.0.0.4".to_string()],
            }],
            tags: config.tags,
        }
    }

    #[test]
    fn test_converged_state_has_no_drift() {
        let report = detect(&desired(), &converged());
        assert!(report.is_converged(), "unexpected drift: {:?}", report.changes);
        assert!(!report.requires_replacement());
    }

    #[test]
    fn test_subnet_change_forces_replacement() {
        let mut observed = converged();
        observed.subnet_id = "/subscriptions/s/resourceGroups/rg-net/providers/Microsoft.Network/virtualNetworks/vn/subnets/other".to_string();

        let report = detect(&desired(), &observed);

        assert_eq!(report.changes.len(), 1);
        assert_eq!(report.changes[0].field, "subnet_id");
        assert!(report.requires_replacement());
    }

    #[test]
    fn test_message_and_tags_update_in_place() {
        let mut observed = converged();
        observed.private_service_connections[1].request_message = "old message".to_string();
        observed.tags.insert("owner".to_string(), "someone".to_string());

        let report = detect(&desired(), &observed);

        let fields: Vec<&str> = report.changes.iter().map(|c| c.field.as_str()).collect();
        assert_eq!(fields, vec!["private_service_connections.1.request_message", "tags"]);
        assert!(!report.requires_replacement());
    }

    #[test]
    fn test_missing_connection_forces_replacement() {
        let mut observed = converged();
        observed.private_service_connections.pop();

        let report = detect(&desired(), &observed);

        assert!(report.changes.iter().any(|c| c.field == "private_service_connections.#" && c.force_new));
    }

    #[test]
    fn test_absent_zone_group_is_drift() {
        let mut observed = converged();
        observed.private_dns_zone_group.clear();

        let report = detect(&desired(), &observed);

        assert_eq!(report.changes.len(), 1);
        assert_eq!(report.changes[0].field, "private_dns_zone_group");
        assert_eq!(report.changes[0].observed, "");
        assert!(!report.changes[0].force_new);
    }
}
