//! Structured resource identities
//!
//! The provider identifies every object by a path of alternating type and name
//! segments:
//!
//! ```text
//! /subscriptions/{sub}/resourceGroups/{rg}/providers/{namespace}/{type}/{name}[/{childType}/{childName}]...
//! ```
//!
//! The reconciler persists only this string; resource group and names are always
//! recovered from it rather than re-derived from desired state.

use std::fmt;
use thiserror::Error;

/// Errors produced while parsing a resource identity
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceIdError {
    /// The identity is empty
    #[error("resource id is empty")]
    Empty,

    /// Type and name segments do not pair up
    #[error("resource id {0:?} does not consist of type/name pairs")]
    UnpairedSegments(String),

    /// A type segment carries an empty name
    #[error("resource id {id:?} has an empty value for {key:?}")]
    EmptySegment {
        /// Whole identity
        id: String,
        /// Type segment with the empty value
        key: String,
    },

    /// No `subscriptions` segment
    #[error("resource id {0:?} has no subscription")]
    MissingSubscription(String),

    /// No `resourceGroups` segment
    #[error("resource id {0:?} has no resource group")]
    MissingResourceGroup(String),

    /// The requested type segment is absent
    #[error("resource id {id:?} has no {key:?} segment")]
    MissingSegment {
        /// Whole identity
        id: String,
        /// Type segment that was looked up
        key: String,
    },
}

/// Parsed resource identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceId {
    /// Subscription the object lives in
    pub subscription_id: String,
    /// Resource group the object lives in
    pub resource_group: String,
    /// Provider namespace (e.g. `Microsoft.Network`), absent for group-level ids
    pub provider: Option<String>,
    /// Remaining type/name pairs in order
    pub path: Vec<(String, String)>,
}

impl ResourceId {
    /// Parse an identity string
    pub fn parse(id: &str) -> Result<Self, ResourceIdError> {
        let trimmed = id.trim().trim_matches('/');
        if trimmed.is_empty() {
            return Err(ResourceIdError::Empty);
        }

        let segments: Vec<&str> = trimmed.split('/').collect();
        if segments.len() % 2 != 0 {
            return Err(ResourceIdError::UnpairedSegments(id.to_string()));
        }

        let mut subscription_id = None;
        let mut resource_group = None;
        let mut provider = None;
        let mut path = Vec::new();

        for pair in segments.chunks(2) {
            let (key, value) = (pair[0], pair[1]);
            if key.is_empty() || value.is_empty() {
                return Err(ResourceIdError::EmptySegment {
                    id: id.to_string(),
                    key: key.to_string(),
                });
            }

            if key.eq_ignore_ascii_case("subscriptions") && subscription_id.is_none() {
                subscription_id = Some(value.to_string());
            } else if key.eq_ignore_ascii_case("resourceGroups") && resource_group.is_none() {
                resource_group = Some(value.to_string());
            } else if key.eq_ignore_ascii_case("providers") && provider.is_none() {
                provider = Some(value.to_string());
            } else {
                path.push((key.to_string(), value.to_string()));
            }
        }

        Ok(Self {
            subscription_id: subscription_id
                .ok_or_else(|| ResourceIdError::MissingSubscription(id.to_string()))?,
            resource_group: resource_group
                .ok_or_else(|| ResourceIdError::MissingResourceGroup(id.to_string()))?,
            provider,
            path,
        })
    }

    /// Name recorded under a type segment, matched case-insensitively
    pub fn get(&self, key: &str) -> Option<&str> {
        self.path
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Name recorded under a type segment, or an error naming the missing segment
    pub fn require(&self, key: &str) -> Result<&str, ResourceIdError> {
        self.get(key).ok_or_else(|| ResourceIdError::MissingSegment {
            id: self.to_string(),
            key: key.to_string(),
        })
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "/subscriptions/{}/resourceGroups/{}",
            self.subscription_id, self.resource_group
        )?;
        if let Some(provider) = &self.provider {
            write!(f, "/providers/{}", provider)?;
        }
        for (key, value) in &self.path {
            write!(f, "/{}/{}", key, value)?;
        }
        Ok(())
    }
}
