//! Mock NetworkClient for unit testing
//!
//! This module provides an in-memory implementation of `NetworkClientTrait` that can be
//! used in unit tests without a live subscription.
//!
//! The mock is organized into modules:
//! - `endpoints.rs` - private endpoints, DNS zone groups and network interfaces
//! - `operations.rs` - long-running operation bookkeeping and polling
//! - `helpers.rs` - identity builders and synthesized computed fields

mod endpoints;
mod helpers;
mod operations;

use crate::error::NetworkError;
use crate::models::*;
use crate::network_trait::NetworkClientTrait;
use crate::operation::{OperationHandle, OperationStatus};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// A remote call observed by the mock, in issue order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    GetPrivateEndpoint { resource_group: String, name: String },
    CreateOrUpdatePrivateEndpoint { resource_group: String, name: String },
    DeletePrivateEndpoint { resource_group: String, name: String },
    GetPrivateDnsZoneGroup { resource_group: String, endpoint_name: String, group_name: String },
    CreateOrUpdatePrivateDnsZoneGroup { resource_group: String, endpoint_name: String, group_name: String },
    GetNetworkInterface { id: String },
    PollOperation { token: u64 },
}

impl RecordedCall {
    /// Whether the call changes remote state
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            RecordedCall::CreateOrUpdatePrivateEndpoint { .. }
                | RecordedCall::DeletePrivateEndpoint { .. }
                | RecordedCall::CreateOrUpdatePrivateDnsZoneGroup { .. }
        )
    }

    /// Whether the call removes remote state
    pub fn is_destructive(&self) -> bool {
        matches!(self, RecordedCall::DeletePrivateEndpoint { .. })
    }
}

/// Failures the mock has been told to produce
#[derive(Debug, Clone, Default)]
pub(crate) struct Faults {
    /// Rejection returned by the next endpoint create-or-update: (status, code, message)
    pub(crate) reject_endpoint_write: Option<(u16, String, String)>,
    /// Terminal failure for the next operation that completes: (code, message)
    pub(crate) fail_next_operation: Option<(String, String)>,
    /// Delete operations report not-found while polling
    pub(crate) delete_poll_not_found: bool,
    /// Network interface lookups fail with a provider error
    pub(crate) nic_lookup_fails: bool,
    /// Zone group lookups fail with a provider error
    pub(crate) zone_group_lookup_fails: bool,
    /// Endpoint reads come back without an identity
    pub(crate) omit_endpoint_id: bool,
    /// Operations never reach a terminal state
    pub(crate) stall_operations: bool,
}

/// Mock NetworkClient for testing
///
/// Resources are stored in memory; mutations only take effect once their operation
/// has been polled to completion, mirroring the provider.
#[derive(Clone)]
pub struct MockNetworkClient {
    pub(crate) base_url: String,
    pub(crate) subscription_id: String,
    // In-memory storage, keyed case-insensitively like the provider
    pub(crate) endpoints: Arc<Mutex<HashMap<(String, String), PrivateEndpoint>>>,
    pub(crate) zone_groups: Arc<Mutex<HashMap<(String, String, String), PrivateDnsZoneGroup>>>,
    pub(crate) interfaces: Arc<Mutex<HashMap<String, NetworkInterface>>>,
    pub(crate) operations: Arc<Mutex<HashMap<u64, operations::PendingOperation>>>,
    pub(crate) calls: Arc<Mutex<Vec<RecordedCall>>>,
    pub(crate) faults: Arc<Mutex<Faults>>,
    pub(crate) polls_to_complete: Arc<Mutex<u32>>,
    // Counter for generating operation tokens and addresses
    pub(crate) next_id: Arc<Mutex<u64>>,
}

impl std::fmt::Debug for MockNetworkClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockNetworkClient")
            .field("base_url", &self.base_url)
            .field("subscription_id", &self.subscription_id)
            .finish_non_exhaustive()
    }
}

impl MockNetworkClient {
    /// Create a new mock client
    pub fn new(subscription_id: impl Into<String>) -> Self {
        Self {
            base_url: "https://management.mock".to_string(),
            subscription_id: subscription_id.into(),
            endpoints: Arc::new(Mutex::new(HashMap::new())),
            zone_groups: Arc::new(Mutex::new(HashMap::new())),
            interfaces: Arc::new(Mutex::new(HashMap::new())),
            operations: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            faults: Arc::new(Mutex::new(Faults::default())),
            polls_to_complete: Arc::new(Mutex::new(1)),
            next_id: Arc::new(Mutex::new(1)),
        }
    }

    /// Number of polls every new operation needs before it is terminal
    pub fn set_polls_to_complete(&self, polls: u32) {
        *self.polls_to_complete.lock().unwrap() = polls;
    }

    /// Add a private endpoint to the mock store (for test setup)
    pub fn add_private_endpoint(&self, resource_group: &str, endpoint: PrivateEndpoint) {
        let name = endpoint.name.clone().unwrap_or_default();
        self.endpoints
            .lock()
            .unwrap()
            .insert(helpers::endpoint_key(resource_group, &name), endpoint);
    }

    /// Add a network interface to the mock store (for test setup)
    pub fn add_network_interface(&self, nic: NetworkInterface) {
        let id = nic.id.clone().unwrap_or_default();
        self.interfaces.lock().unwrap().insert(id.to_lowercase(), nic);
    }

    /// Stored private endpoint, if any
    pub fn private_endpoint(&self, resource_group: &str, name: &str) -> Option<PrivateEndpoint> {
        self.endpoints
            .lock()
            .unwrap()
            .get(&helpers::endpoint_key(resource_group, name))
            .cloned()
    }

    /// Stored private DNS zone group, if any
    pub fn private_dns_zone_group(&self, resource_group: &str, endpoint_name: &str, group_name: &str) -> Option<PrivateDnsZoneGroup> {
        self.zone_groups
            .lock()
            .unwrap()
            .get(&helpers::zone_group_key(resource_group, endpoint_name, group_name))
            .cloned()
    }

    /// Every remote call issued so far
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Forget the recorded calls
    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Reject the next endpoint create-or-update with a provider error
    pub fn reject_next_endpoint_write(&self, status: u16, code: &str, message: &str) {
        self.faults.lock().unwrap().reject_endpoint_write =
            Some((status, code.to_string(), message.to_string()));
    }

    /// Make the next operation to complete end in a provider failure
    pub fn fail_next_operation(&self, code: &str, message: &str) {
        self.faults.lock().unwrap().fail_next_operation = Some((code.to_string(), message.to_string()));
    }

    /// Make delete operations report not-found while being polled
    pub fn report_not_found_while_deleting(&self) {
        self.faults.lock().unwrap().delete_poll_not_found = true;
    }

    /// Make every network interface lookup fail
    pub fn fail_network_interface_lookups(&self) {
        self.faults.lock().unwrap().nic_lookup_fails = true;
    }

    /// Make every zone group lookup fail
    pub fn fail_zone_group_lookups(&self) {
        self.faults.lock().unwrap().zone_group_lookup_fails = true;
    }

    /// Strip the identity from every endpoint read
    pub fn omit_endpoint_ids(&self) {
        self.faults.lock().unwrap().omit_endpoint_id = true;
    }

    /// Keep every operation in progress forever
    pub fn stall_operations(&self) {
        self.faults.lock().unwrap().stall_operations = true;
    }

    pub(crate) fn record(&self, call: RecordedCall) {
        self.calls.lock().unwrap().push(call);
    }

    /// Generate next ID
    pub(crate) fn next_id(&self) -> u64 {
        let mut id = self.next_id.lock().unwrap();
        let current = *id;
        *id += 1;
        current
    }

    pub(crate) fn helpers(&self) -> helpers::Helpers {
        helpers::Helpers::new(self.subscription_id.clone())
    }
}

#[async_trait::async_trait]
impl NetworkClientTrait for MockNetworkClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn validate_token(&self) -> Result<(), NetworkError> {
        Ok(())
    }

    async fn get_private_endpoint(&self, resource_group: &str, name: &str) -> Result<PrivateEndpoint, NetworkError> {
        endpoints::get_private_endpoint(self, resource_group, name)
    }

    async fn begin_create_or_update_private_endpoint(&self, resource_group: &str, name: &str, parameters: &PrivateEndpoint) -> Result<OperationHandle, NetworkError> {
        endpoints::begin_create_or_update_private_endpoint(self, resource_group, name, parameters)
    }

    async fn begin_delete_private_endpoint(&self, resource_group: &str, name: &str) -> Result<OperationHandle, NetworkError> {
        endpoints::begin_delete_private_endpoint(self, resource_group, name)
    }

    async fn get_private_dns_zone_group(&self, resource_group: &str, endpoint_name: &str, group_name: &str) -> Result<PrivateDnsZoneGroup, NetworkError> {
        endpoints::get_private_dns_zone_group(self, resource_group, endpoint_name, group_name)
    }

    async fn begin_create_or_update_private_dns_zone_group(&self, resource_group: &str, endpoint_name: &str, group_name: &str, parameters: &PrivateDnsZoneGroup) -> Result<OperationHandle, NetworkError> {
        endpoints::begin_create_or_update_private_dns_zone_group(self, resource_group, endpoint_name, group_name, parameters)
    }

    async fn get_network_interface(&self, id: &str) -> Result<NetworkInterface, NetworkError> {
        endpoints::get_network_interface(self, id)
    }

    async fn poll_operation(&self, handle: &OperationHandle) -> Result<OperationStatus, NetworkError> {
        operations::poll_operation(self, handle)
    }
}
