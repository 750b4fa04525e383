//! Unit tests for the Delete phase

#[cfg(test)]
mod tests {
    use super::super::test_utils::*;
    use crate::error::{Operation, ReconcileError};
    use network_client::{MockNetworkClient, RecordedCall};

    #[tokio::test]
    async fn test_delete_removes_endpoint_and_zone_group() {
        let client = MockNetworkClient::new(SUBSCRIPTION);
        let reconciler = reconciler(&client);
        let created = reconciler
            .create_or_update(&desired(vec![sql_connection("conn1")], Some(zone_group())), None)
            .await
            .unwrap();

        reconciler.delete(&created.id).await.unwrap();

        assert!(client.private_endpoint("rg-app", "pe-sql").is_none());
        assert!(client.private_dns_zone_group("rg-app", "pe-sql", "default").is_none());
        assert!(reconciler.read(&created.id, Some("default")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_of_absent_endpoint_succeeds() {
        let client = MockNetworkClient::new(SUBSCRIPTION);
        let reconciler = reconciler(&client);

        reconciler.delete(&endpoint_id("rg-app", "pe-gone")).await.unwrap();

        let calls = client.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].is_destructive());
    }

    #[tokio::test]
    async fn test_not_found_while_waiting_counts_as_deleted() {
        let client = MockNetworkClient::new(SUBSCRIPTION);
        let reconciler = reconciler(&client);
        let created = reconciler
            .create_or_update(&desired(vec![sql_connection("conn1")], None), None)
            .await
            .unwrap();
        client.report_not_found_while_deleting();

        reconciler.delete(&created.id).await.unwrap();

        assert!(client.calls().iter().any(|c| matches!(c, RecordedCall::PollOperation { .. })));
    }

    #[tokio::test]
    async fn test_failed_delete_is_reported() {
        let client = MockNetworkClient::new(SUBSCRIPTION);
        let reconciler = reconciler(&client);
        let created = reconciler
            .create_or_update(&desired(vec![sql_connection("conn1")], None), None)
            .await
            .unwrap();
        client.fail_next_operation("Conflict", "endpoint is in use");

        let err = reconciler.delete(&created.id).await.unwrap_err();

        assert!(matches!(err, ReconcileError::Provider { operation: Operation::WaitForDelete, .. }));
        assert!(err.to_string().contains("pe-sql"));
        assert!(client.private_endpoint("rg-app", "pe-sql").is_some());
    }

    #[tokio::test]
    async fn test_malformed_identity_is_rejected() {
        let client = MockNetworkClient::new(SUBSCRIPTION);
        let reconciler = reconciler(&client);

        let err = reconciler.delete("not-an-id").await.unwrap_err();

        assert!(matches!(err, ReconcileError::InvalidId(_)));
        assert!(client.calls().is_empty());
    }
}
