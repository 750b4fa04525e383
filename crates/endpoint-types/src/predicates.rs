//! Field format predicates
//!
//! Naming policy belongs to the host tool. The reconciler only asks these
//! predicates before it talks to the provider; hosts with stricter rules supply
//! their own `FieldPredicates`.

use crate::resource_id::ResourceId;

/// Format checks applied to user-supplied fields
pub trait FieldPredicates: Send + Sync {
    /// Endpoint, connection, zone group and zone config names
    fn private_link_name(&self, value: &str) -> Result<(), String>;

    /// Entries of `subresource_names`
    fn subresource_name(&self, value: &str) -> Result<(), String>;

    /// Subnet and connection target references
    fn resource_id(&self, value: &str) -> Result<(), String>;
}

/// Default predicates matching the provider's documented limits
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardPredicates;

const MAX_NAME_LENGTH: usize = 80;

impl FieldPredicates for StandardPredicates {
    fn private_link_name(&self, value: &str) -> Result<(), String> {
        if value.is_empty() || value.len() > MAX_NAME_LENGTH {
            return Err(format!(
                "{:?} must be between 1 and {} characters",
                value, MAX_NAME_LENGTH
            ));
        }
        if !value.starts_with(|c: char| c.is_ascii_alphanumeric()) {
            return Err(format!("{:?} must start with a letter or number", value));
        }
        if value.ends_with(['.', '-']) {
            return Err(format!("{:?} must end with a letter, number or underscore", value));
        }
        if let Some(c) = value
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
        {
            return Err(format!("{:?} contains the invalid character {:?}", value, c));
        }
        Ok(())
    }

    fn subresource_name(&self, value: &str) -> Result<(), String> {
        if value.trim().is_empty() {
            return Err("sub-resource names must not be empty".to_string());
        }
        if value.chars().any(char::is_whitespace) {
            return Err(format!("sub-resource name {:?} must not contain whitespace", value));
        }
        Ok(())
    }

    fn resource_id(&self, value: &str) -> Result<(), String> {
        ResourceId::parse(value).map(|_| ()).map_err(|e| e.to_string())
    }
}
