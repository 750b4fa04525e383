//! Controller configuration.
//!
//! Everything is read from environment variables. Parsing goes through a lookup
//! closure so tests can supply their own environment.

use crate::error::ReconcileError;
use network_client::{DEFAULT_API_VERSION, DEFAULT_MANAGEMENT_URL};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Deadline of each reconciliation phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// First creation, including the zone group and read-back
    pub create: Duration,
    /// Standalone reads
    pub read: Duration,
    /// Create-or-Update of an existing endpoint
    pub update: Duration,
    /// Deletion
    pub delete: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            create: Duration::from_secs(60 * 60),
            read: Duration::from_secs(5 * 60),
            update: Duration::from_secs(60 * 60),
            delete: Duration::from_secs(60 * 60),
        }
    }
}

/// Behaviour switches of the reconciler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcilerSettings {
    /// Refuse to adopt an object that already exists on first creation
    pub import_protection: bool,
    /// Phase deadlines
    pub timeouts: Timeouts,
    /// Lower bound of the poll interval, in seconds, when the provider gives no hint
    pub min_poll_seconds: u64,
    /// Upper bound of the poll interval, in seconds
    pub max_poll_seconds: u64,
}

impl Default for ReconcilerSettings {
    fn default() -> Self {
        Self {
            import_protection: true,
            timeouts: Timeouts::default(),
            min_poll_seconds: 1,
            max_poll_seconds: 30,
        }
    }
}

/// Phase the runner executes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Create or update from `ENDPOINT_SPEC`
    Apply,
    /// Read the endpoint named by `ENDPOINT_ID`
    Read,
    /// Delete the endpoint named by `ENDPOINT_ID`
    Delete,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Apply => write!(f, "apply"),
            Action::Read => write!(f, "read"),
            Action::Delete => write!(f, "delete"),
        }
    }
}

impl std::str::FromStr for Action {
    type Err = ReconcileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "apply" => Ok(Action::Apply),
            "read" => Ok(Action::Read),
            "delete" => Ok(Action::Delete),
            other => Err(ReconcileError::Config(format!(
                "RECONCILE_ACTION must be one of apply, read, delete (got {:?})",
                other
            ))),
        }
    }
}

/// Runner configuration
#[derive(Clone)]
pub struct ControllerConfig {
    /// Management endpoint (`ARM_ENDPOINT`)
    pub management_url: String,
    /// Subscription all resource groups live in
    pub subscription_id: String,
    /// Bearer token sent with every request
    pub access_token: String,
    /// `api-version` query parameter
    pub api_version: String,
    /// Reconciler behaviour
    pub settings: ReconcilerSettings,
    /// Desired-state file (YAML or JSON)
    pub endpoint_spec: Option<PathBuf>,
    /// Persisted identity of an existing endpoint
    pub endpoint_id: Option<String>,
    /// Phase to run
    pub action: Action,
}

impl fmt::Debug for ControllerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerConfig")
            .field("management_url", &self.management_url)
            .field("subscription_id", &self.subscription_id)
            .field("access_token", &"<redacted>")
            .field("api_version", &self.api_version)
            .field("settings", &self.settings)
            .field("endpoint_spec", &self.endpoint_spec)
            .field("endpoint_id", &self.endpoint_id)
            .field("action", &self.action)
            .finish()
    }
}

impl ControllerConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ReconcileError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through a variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ReconcileError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            var(key).ok_or_else(|| {
                ReconcileError::Config(format!("{} environment variable is required", key))
            })
        };

        let defaults = Timeouts::default();
        let timeouts = Timeouts {
            create: minutes(&var, "TIMEOUT_CREATE_MINUTES", defaults.create)?,
            read: minutes(&var, "TIMEOUT_READ_MINUTES", defaults.read)?,
            update: minutes(&var, "TIMEOUT_UPDATE_MINUTES", defaults.update)?,
            delete: minutes(&var, "TIMEOUT_DELETE_MINUTES", defaults.delete)?,
        };

        let import_protection = match var("IMPORT_PROTECTION") {
            None => true,
            Some(v) => parse_bool("IMPORT_PROTECTION", &v)?,
        };

        let action = match var("RECONCILE_ACTION") {
            None => Action::Apply,
            Some(v) => v.parse()?,
        };

        let config = Self {
            management_url: var("ARM_ENDPOINT").unwrap_or_else(|| DEFAULT_MANAGEMENT_URL.to_string()),
            subscription_id: required("ARM_SUBSCRIPTION_ID")?,
            access_token: required("ARM_ACCESS_TOKEN")?,
            api_version: var("ARM_API_VERSION").unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            settings: ReconcilerSettings {
                import_protection,
                timeouts,
                ..ReconcilerSettings::default()
            },
            endpoint_spec: var("ENDPOINT_SPEC").map(PathBuf::from),
            endpoint_id: var("ENDPOINT_ID"),
            action,
        };

        match config.action {
            Action::Apply if config.endpoint_spec.is_none() => Err(ReconcileError::Config(
                "ENDPOINT_SPEC environment variable is required for apply".to_string(),
            )),
            Action::Read | Action::Delete if config.endpoint_id.is_none() => {
                Err(ReconcileError::Config(format!(
                    "ENDPOINT_ID environment variable is required for {}",
                    config.action
                )))
            }
            _ => Ok(config),
        }
    }
}

fn minutes<F>(var: &F, key: &str, default: Duration) -> Result<Duration, ReconcileError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = var(key) else {
        return Ok(default);
    };
    match value.trim().parse::<u64>() {
        Ok(m) if m > 0 => m.checked_mul(60).map(Duration::from_secs).ok_or_else(|| {
            ReconcileError::Config(format!("{} is too large (got {} minutes)", key, m))
        }),
        _ => Err(ReconcileError::Config(format!(
            "{} must be a positive number of minutes (got {:?})",
            key, value
        ))),
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ReconcileError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ReconcileError::Config(format!(
            "{} must be a boolean (got {:?})",
            key, value
        ))),
    }
}
