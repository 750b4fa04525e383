//! NetworkClient trait for mocking
//!
//! This trait abstracts the network resource provider so the reconciler can be driven
//! by the HTTP client in production and by `MockNetworkClient` in unit tests.

use crate::error::NetworkError;
use crate::models::*;
use crate::operation::{OperationHandle, OperationStatus};

/// Trait for network resource provider operations
///
/// All async methods must be `Send` to work with Tokio's work-stealing runtime.
#[async_trait::async_trait]
pub trait NetworkClientTrait: Send + Sync {
    /// Get the management endpoint URL
    fn base_url(&self) -> &str;

    /// Validate the access token
    async fn validate_token(&self) -> Result<(), NetworkError>;

    // Private endpoints
    async fn get_private_endpoint(&self, resource_group: &str, name: &str) -> Result<PrivateEndpoint, NetworkError>;
    async fn begin_create_or_update_private_endpoint(&self, resource_group: &str, name: &str, parameters: &PrivateEndpoint) -> Result<OperationHandle, NetworkError>;
    async fn begin_delete_private_endpoint(&self, resource_group: &str, name: &str) -> Result<OperationHandle, NetworkError>;

    // Private DNS zone groups (addressed through their endpoint)
    async fn get_private_dns_zone_group(&self, resource_group: &str, endpoint_name: &str, group_name: &str) -> Result<PrivateDnsZoneGroup, NetworkError>;
    async fn begin_create_or_update_private_dns_zone_group(&self, resource_group: &str, endpoint_name: &str, group_name: &str, parameters: &PrivateDnsZoneGroup) -> Result<OperationHandle, NetworkError>;

    // Network interfaces (read-only, by full identity)
    async fn get_network_interface(&self, id: &str) -> Result<NetworkInterface, NetworkError>;

    // Long-running operations
    async fn poll_operation(&self, handle: &OperationHandle) -> Result<OperationStatus, NetworkError>;
}
