//! Private Endpoint Types
//!
//! Desired-state and observed-state model for private endpoints, plus the identity and
//! field-format helpers shared by the reconciler and its host.

pub mod location;
pub mod predicates;
pub mod private_endpoint;
pub mod resource_id;

pub use location::normalize_location;
pub use predicates::{FieldPredicates, StandardPredicates};
pub use private_endpoint::*;
pub use resource_id::{ResourceId, ResourceIdError};
