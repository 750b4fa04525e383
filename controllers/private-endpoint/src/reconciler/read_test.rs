//! Unit tests for the Read phase

#[cfg(test)]
mod tests {
    use super::super::test_utils::*;
    use crate::error::{Operation, ReconcileError, ResourceKind};
    use network_client::{
        CustomDnsConfig, MockNetworkClient, PrivateEndpoint, PrivateEndpointProperties,
        PrivateLinkServiceConnection, PrivateLinkServiceConnectionProperties, RecordedCall, SubResource,
    };
    use std::collections::BTreeMap;

    fn stored_connection(name: &str, target: &str, message: Option<&str>) -> PrivateLinkServiceConnection {
        PrivateLinkServiceConnection {
            name: Some(name.to_string()),
            properties: Some(PrivateLinkServiceConnectionProperties {
                private_link_service_id: Some(target.to_string()),
                group_ids: Some(vec!["blob".to_string()]),
                request_message: message.map(str::to_string),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    /// Endpoint written outside the reconciler, without an attached interface
    fn imported_endpoint() -> PrivateEndpoint {
        PrivateEndpoint {
            id: Some(endpoint_id("rg-app", "pe-imported")),
            name: Some("pe-imported".to_string()),
            location: Some("North Europe".to_string()),
            tags: Some(BTreeMap::from([("team".to_string(), "data".to_string())])),
            properties: Some(PrivateEndpointProperties {
                subnet: Some(SubResource::new("/subscriptions/s/resourceGroups/rg-net/providers/Microsoft.Network/virtualNetworks/vn/subnets/sn")),
                manual_private_link_service_connections: Some(vec![stored_connection(
                    "manual1",
                    "/subscriptions/s/resourceGroups/rg/providers/Microsoft.Storage/storageAccounts/st1",
                    Some("please approve"),
                )]),
                private_link_service_connections: Some(vec![stored_connection(
                    "auto1",
                    "/subscriptions/s/resourceGroups/rg/providers/Microsoft.Storage/storageAccounts/st2",
                    Some("ignored"),
                )]),
                custom_dns_configs: Some(vec![CustomDnsConfig {
                    fqdn: Some("st2.privatelink.blob.core.windows.net".to_string()),
                    ip_addresses: Some(vec!["10.1.0.4".to_string(), "10.1.0.5".to_string()]),
                }]),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_missing_endpoint_reads_as_absent() {
        let client = MockNetworkClient::new(SUBSCRIPTION);
        let reconciler = reconciler(&client);

        let observed = reconciler.read(&endpoint_id("rg-app", "pe-gone"), None).await.unwrap();

        assert!(observed.is_none());
    }

    #[tokio::test]
    async fn test_identity_without_endpoint_segment_is_rejected() {
        let client = MockNetworkClient::new(SUBSCRIPTION);
        let reconciler = reconciler(&client);

        let err = reconciler
            .read("/subscriptions/s/resourceGroups/rg-app/providers/Microsoft.Network/virtualNetworks/vn", None)
            .await
            .unwrap_err();

        assert!(matches!(err, ReconcileError::InvalidId(_)));
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_imported_endpoint_is_flattened() {
        let client = MockNetworkClient::new(SUBSCRIPTION);
        client.add_private_endpoint("rg-app", imported_endpoint());
        let reconciler = reconciler(&client);

        let observed = reconciler
            .read(&endpoint_id("rg-app", "pe-imported"), None)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(observed.name, "pe-imported");
        assert_eq!(observed.resource_group_name, "rg-app");
        assert_eq!(observed.location, "northeurope");
        assert_eq!(observed.tags.get("team").map(String::as_str), Some("data"));
        assert!(observed.subnet_id.ends_with("/subnets/sn"));

        // Automatic connections come first; their message is never reported
        let names: Vec<&str> = observed.private_service_connections.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["auto1", "manual1"]);
        assert_eq!(observed.private_service_connections[0].request_message, "");
        assert_eq!(observed.private_service_connections[1].request_message, "please approve");
        assert!(observed.private_service_connections.iter().all(|c| c.private_ip_address.is_empty()));

        assert_eq!(observed.custom_dns_configs.len(), 1);
        assert_eq!(observed.custom_dns_configs[0].ip_addresses, vec!["10.1.0.4", "10.1.0.5"]);
        assert!(observed.private_dns_zone_group.is_empty());
        assert!(!client.calls().iter().any(|c| matches!(c, RecordedCall::GetPrivateDnsZoneGroup { .. })));
    }

    #[tokio::test]
    async fn test_interface_failure_leaves_address_empty() {
        let client = MockNetworkClient::new(SUBSCRIPTION);
        let reconciler = reconciler(&client);
        let created = reconciler
            .create_or_update(&desired(vec![sql_connection("conn1")], None), None)
            .await
            .unwrap();
        client.fail_network_interface_lookups();

        let observed = reconciler.read(&created.id, None).await.unwrap().unwrap();

        assert_eq!(observed.private_service_connections[0].private_ip_address, "");
        assert_eq!(observed.custom_dns_configs, created.custom_dns_configs);
    }

    #[tokio::test]
    async fn test_zone_group_lookup_failure_is_fatal() {
        let client = MockNetworkClient::new(SUBSCRIPTION);
        let reconciler = reconciler(&client);
        let created = reconciler
            .create_or_update(&desired(vec![sql_connection("conn1")], Some(zone_group())), None)
            .await
            .unwrap();
        client.fail_zone_group_lookups();

        let err = reconciler.read(&created.id, Some("default")).await.unwrap_err();

        match err {
            ReconcileError::Provider { operation, kind, .. } => {
                assert_eq!(operation, Operation::Read);
                assert_eq!(kind, ResourceKind::PrivateDnsZoneGroup);
            }
            other => panic!("expected provider error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_referenced_zone_group_missing_is_fatal() {
        let client = MockNetworkClient::new(SUBSCRIPTION);
        let reconciler = reconciler(&client);
        let created = reconciler
            .create_or_update(&desired(vec![sql_connection("conn1")], None), None)
            .await
            .unwrap();

        let err = reconciler.read(&created.id, Some("default")).await.unwrap_err();

        match err {
            ReconcileError::Provider { operation, kind, name, source, .. } => {
                assert_eq!(operation, Operation::Read);
                assert_eq!(kind, ResourceKind::PrivateDnsZoneGroup);
                assert_eq!(name, "default");
                assert!(source.is_not_found());
            }
            other => panic!("expected provider error, got {other:?}"),
        }
    }
}
