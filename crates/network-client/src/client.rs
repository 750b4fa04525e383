//! Network resource provider client
//!
//! Implements the `Microsoft.Network` REST operations the private endpoint
//! reconciler needs: private endpoints, their DNS zone groups and network interface
//! lookups, all scoped to one subscription.

use crate::common::{encode, HttpClient};
use crate::error::NetworkError;
use crate::models::*;
use crate::network_trait::NetworkClientTrait;
use crate::operation::{OperationHandle, OperationStatus};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Default management endpoint of the public cloud
pub const DEFAULT_MANAGEMENT_URL: &str = "https://management.azure.com";

/// API version the wire models are written against
pub const DEFAULT_API_VERSION: &str = "2020-03-01";

/// Network resource provider client
pub struct NetworkClient {
    http: HttpClient,
    subscription_id: String,
}

impl std::fmt::Debug for NetworkClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkClient")
            .field("base_url", &self.http.base_url())
            .field("subscription_id", &self.subscription_id)
            .finish_non_exhaustive()
    }
}

impl NetworkClient {
    /// Create a new network client
    ///
    /// # Arguments
    /// * `base_url` - Management endpoint (e.g., "https://management.azure.com")
    /// * `subscription_id` - Subscription all resource groups live in
    /// * `token` - Bearer token for authentication
    /// * `api_version` - `api-version` query parameter sent with every request
    pub fn new(
        base_url: String,
        subscription_id: String,
        token: String,
        api_version: String,
    ) -> Result<Self, NetworkError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(NetworkError::Http)?;

        Ok(Self {
            http: HttpClient::new(client, base_url, token, api_version),
            subscription_id,
        })
    }

    /// Get the subscription this client is scoped to
    pub fn subscription_id(&self) -> &str {
        &self.subscription_id
    }

    fn private_endpoint_path(&self, resource_group: &str, name: &str) -> String {
        format!(
            "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Network/privateEndpoints/{}",
            encode(&self.subscription_id),
            encode(resource_group),
            encode(name)
        )
    }

    fn private_dns_zone_group_path(&self, resource_group: &str, endpoint_name: &str, group_name: &str) -> String {
        format!(
            "{}/privateDnsZoneGroups/{}",
            self.private_endpoint_path(resource_group, endpoint_name),
            encode(group_name)
        )
    }
}

#[async_trait::async_trait]
impl NetworkClientTrait for NetworkClient {
    fn base_url(&self) -> &str {
        self.http.base_url()
    }

    /// Validate the access token by reading the subscription.
    ///
    /// # Returns
    /// * `Ok(())` - Token is valid and the management endpoint is reachable
    /// * `Err(NetworkError)` - Token is invalid or the endpoint is unreachable
    async fn validate_token(&self) -> Result<(), NetworkError> {
        debug!("Validating access token against subscription {}", self.subscription_id);
        let path = format!("/subscriptions/{}", encode(&self.subscription_id));
        let _: serde_json::Value = self.http.get(&path).await?;
        debug!("Token validated successfully");
        Ok(())
    }

    async fn get_private_endpoint(&self, resource_group: &str, name: &str) -> Result<PrivateEndpoint, NetworkError> {
        debug!("Fetching private endpoint {} (resource group {})", name, resource_group);
        self.http.get(&self.private_endpoint_path(resource_group, name)).await
    }

    async fn begin_create_or_update_private_endpoint(
        &self,
        resource_group: &str,
        name: &str,
        parameters: &PrivateEndpoint,
    ) -> Result<OperationHandle, NetworkError> {
        let body = serde_json::to_value(parameters)?;
        self.http.put(&self.private_endpoint_path(resource_group, name), &body).await
    }

    async fn begin_delete_private_endpoint(&self, resource_group: &str, name: &str) -> Result<OperationHandle, NetworkError> {
        self.http.delete(&self.private_endpoint_path(resource_group, name)).await
    }

    async fn get_private_dns_zone_group(
        &self,
        resource_group: &str,
        endpoint_name: &str,
        group_name: &str,
    ) -> Result<PrivateDnsZoneGroup, NetworkError> {
        debug!(
            "Fetching private DNS zone group {} of endpoint {} (resource group {})",
            group_name, endpoint_name, resource_group
        );
        self.http
            .get(&self.private_dns_zone_group_path(resource_group, endpoint_name, group_name))
            .await
    }

    async fn begin_create_or_update_private_dns_zone_group(
        &self,
        resource_group: &str,
        endpoint_name: &str,
        group_name: &str,
        parameters: &PrivateDnsZoneGroup,
    ) -> Result<OperationHandle, NetworkError> {
        let body = serde_json::to_value(parameters)?;
        self.http
            .put(&self.private_dns_zone_group_path(resource_group, endpoint_name, group_name), &body)
            .await
    }

    async fn get_network_interface(&self, id: &str) -> Result<NetworkInterface, NetworkError> {
        if !id.starts_with('/') {
            return Err(NetworkError::InvalidRequest(format!(
                "network interface id {:?} is not a resource path",
                id
            )));
        }
        debug!("Fetching network interface {}", id);
        self.http.get(id).await
    }

    async fn poll_operation(&self, handle: &OperationHandle) -> Result<OperationStatus, NetworkError> {
        self.http.poll(handle).await
    }
}
