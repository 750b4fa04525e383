//! Unit tests for executor module

#[cfg(test)]
mod tests {
    use crate::config::ReconcilerSettings;
    use crate::error::{Operation, ReconcileError};
    use crate::executor::*;
    use network_client::{
        MockNetworkClient, NetworkClientTrait, NetworkError, PrivateEndpoint,
        PrivateEndpointProperties, RecordedCall, SubResource,
    };
    use std::time::Duration;

    fn body() -> PrivateEndpoint {
        PrivateEndpoint {
            location: Some("westeurope".to_string()),
            properties: Some(PrivateEndpointProperties {
                subnet: Some(SubResource::new(
                    "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.Network/virtualNetworks/vn/subnets/sn",
                )),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn polls(client: &MockNetworkClient) -> usize {
        client
            .calls()
            .iter()
            .filter(|c| matches!(c, RecordedCall::PollOperation { .. }))
            .count()
    }

    #[tokio::test(start_paused = true)]
    async fn test_execute_polls_until_terminal() {
        let client = MockNetworkClient::new("sub");
        client.set_polls_to_complete(4);
        let executor = OperationExecutor::new(&client, &ReconcilerSettings::default());

        let completion = executor
            .execute(
                Operation::Create,
                Target::endpoint("pe1", "rg"),
                Deadline::after(Duration::from_secs(60)),
                client.begin_create_or_update_private_endpoint("rg", "pe1", &body()),
            )
            .await
            .unwrap();

        assert_eq!(completion, Completion::Succeeded);
        assert_eq!(polls(&client), 4);
        assert!(client.private_endpoint("rg", "pe1").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_operation_times_out() {
        let client = MockNetworkClient::new("sub");
        client.stall_operations();
        let executor = OperationExecutor::new(&client, &ReconcilerSettings::default());

        let err = executor
            .execute(
                Operation::Create,
                Target::endpoint("pe1", "rg"),
                Deadline::after(Duration::from_secs(120)),
                client.begin_create_or_update_private_endpoint("rg", "pe1", &body()),
            )
            .await
            .unwrap_err();

        match err {
            ReconcileError::Timeout { operation, after, .. } => {
                assert_eq!(operation, Operation::WaitForCreate);
                assert_eq!(after, Duration::from_secs(120));
            }
            other => panic!("expected timeout, got {other:?}"),
        }
        // Fibonacci pacing: far fewer polls than seconds elapsed
        assert!(polls(&client) < 20);
    }

    #[tokio::test]
    async fn test_not_found_at_issue_time() {
        let client = MockNetworkClient::new("sub");
        let executor = OperationExecutor::new(&client, &ReconcilerSettings::default());

        let completion = executor
            .execute(
                Operation::Delete,
                Target::endpoint("missing", "rg"),
                Deadline::after(Duration::from_secs(60)),
                client.begin_delete_private_endpoint("rg", "missing"),
            )
            .await
            .unwrap();

        assert_eq!(completion, Completion::NotFound);
        assert_eq!(polls(&client), 0);
    }

    #[tokio::test]
    async fn test_failed_operation_carries_provider_detail() {
        let client = MockNetworkClient::new("sub");
        client.fail_next_operation("InternalServerError", "subnet is busy");
        let executor = OperationExecutor::new(&client, &ReconcilerSettings::default());

        let err = executor
            .execute(
                Operation::Create,
                Target::endpoint("pe1", "rg"),
                Deadline::after(Duration::from_secs(60)),
                client.begin_create_or_update_private_endpoint("rg", "pe1", &body()),
            )
            .await
            .unwrap_err();

        match err {
            ReconcileError::Provider { operation, source: NetworkError::OperationFailed { message, .. }, .. } => {
                assert_eq!(operation, Operation::WaitForCreate);
                assert_eq!(message, "subnet is busy");
            }
            other => panic!("expected provider failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_rejected_issue_is_not_polled() {
        let client = MockNetworkClient::new("sub");
        client.reject_next_endpoint_write(400, "BadRequest", "nope");
        let executor = OperationExecutor::new(&client, &ReconcilerSettings::default());

        let err = executor
            .execute(
                Operation::Update,
                Target::endpoint("pe1", "rg"),
                Deadline::after(Duration::from_secs(60)),
                client.begin_create_or_update_private_endpoint("rg", "pe1", &body()),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ReconcileError::Provider { operation: Operation::Update, .. }));
        assert_eq!(polls(&client), 0);
    }

    #[tokio::test]
    async fn test_fetch_maps_not_found_to_none() {
        let client = MockNetworkClient::new("sub");
        let executor = OperationExecutor::new(&client, &ReconcilerSettings::default());

        let endpoint = executor
            .fetch(
                Operation::Read,
                Target::endpoint("pe1", "rg"),
                Deadline::after(Duration::from_secs(60)),
                client.get_private_endpoint("rg", "pe1"),
            )
            .await
            .unwrap();
        assert!(endpoint.is_none());
    }

    #[tokio::test]
    async fn test_fetch_surfaces_other_failures() {
        let client = MockNetworkClient::new("sub");
        client.fail_zone_group_lookups();
        let executor = OperationExecutor::new(&client, &ReconcilerSettings::default());

        let err = executor
            .fetch(
                Operation::Read,
                Target::zone_group("default", "rg"),
                Deadline::after(Duration::from_secs(60)),
                client.get_private_dns_zone_group("rg", "pe1", "default"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ReconcileError::Provider { .. }));
    }

    #[test]
    fn test_oversized_budget_saturates() {
        let deadline = Deadline::after(Duration::MAX);
        assert_eq!(deadline.budget(), Duration::MAX);
    }
}
