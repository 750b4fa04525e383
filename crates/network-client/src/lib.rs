//! Network Resource Provider Client
//!
//! A Rust client library for the `Microsoft.Network` resource provider, covering the
//! objects a private endpoint reconciler touches: private endpoints, their private DNS
//! zone groups, and the network interfaces the provider attaches to them.
//!
//! # Example
//!
//! ```no_run
//! use network_client::{NetworkClient, NetworkClientTrait, OperationStatus};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = NetworkClient::new(
//!     "https://management.azure.com".to_string(),
//!     "00000000-0000-0000-0000-000000000000".to_string(),
//!     "access-token".to_string(),
//!     "2020-03-01".to_string(),
//! )?;
//!
//! // Read an endpoint
//! let endpoint = client.get_private_endpoint("rg-app", "pe-sql").await?;
//!
//! // Start a delete and poll it once
//! let handle = client.begin_delete_private_endpoint("rg-app", "pe-sql").await?;
//! if client.poll_operation(&handle).await? == OperationStatus::Succeeded {
//!     println!("deleted {:?}", endpoint.id);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - **Typed wire models** for endpoints, zone groups and interfaces
//! - **Long-running operations**: `Azure-AsyncOperation` and `Location` polling
//! - **Mocking**: `MockNetworkClient` behind the `test-util` feature

pub mod client;
pub mod common;
pub mod error;
pub mod models;
#[path = "trait.rs"]
pub mod network_trait;
pub mod operation;
#[cfg(feature = "test-util")]
pub mod mock;

pub use client::{NetworkClient, DEFAULT_API_VERSION, DEFAULT_MANAGEMENT_URL};
pub use common::HttpClient;
pub use error::NetworkError;
pub use models::*;
pub use network_trait::NetworkClientTrait;
pub use operation::{OperationHandle, OperationKind, OperationStatus, PollTarget};
#[cfg(feature = "test-util")]
pub use mock::{MockNetworkClient, RecordedCall};
