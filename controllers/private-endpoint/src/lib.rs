//! Private Endpoint Controller
//!
//! Reconciles a private endpoint and its optional private DNS zone group against the
//! network resource provider:
//! - `transform`: pure conversions between the desired-state model and wire models
//! - `executor`: issues remote mutations and waits for their long-running operations
//! - `reconciler`: Create-or-Update, Read and Delete phases
//! - `drift`: differences between desired state and the state read back

pub mod backoff;
pub mod config;
pub mod drift;
pub mod error;
pub mod executor;
pub mod reconciler;
pub mod transform;

#[cfg(test)]
mod executor_test;

pub use config::{Action, ControllerConfig, ReconcilerSettings, Timeouts};
pub use drift::{DriftReport, FieldChange};
pub use error::{Operation, ReconcileError, ResourceKind};
pub use reconciler::Reconciler;
