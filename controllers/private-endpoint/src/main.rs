//! Private Endpoint Controller
//!
//! Runs one reconciliation phase against the network resource provider and prints
//! the observed state as YAML:
//! - apply: converge the endpoint described by ENDPOINT_SPEC
//! - read: read the endpoint identified by ENDPOINT_ID
//! - delete: delete the endpoint identified by ENDPOINT_ID

use anyhow::{Context, Result};
use endpoint_types::EndpointConfig;
use network_client::{NetworkClient, NetworkClientTrait};
use private_endpoint_controller::{drift, Action, ControllerConfig, Reconciler};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    info!("Starting Private Endpoint Controller");

    let config = ControllerConfig::from_env().context("loading configuration from the environment")?;

    info!("Configuration:");
    info!("  Management URL: {}", config.management_url);
    info!("  Subscription: {}", config.subscription_id);
    info!("  API version: {}", config.api_version);
    info!("  Action: {}", config.action);
    info!("  Import protection: {}", config.settings.import_protection);

    let client = NetworkClient::new(
        config.management_url.clone(),
        config.subscription_id.clone(),
        config.access_token.clone(),
        config.api_version.clone(),
    )
    .context("building the network client")?;

    info!("Validating access token and connectivity...");
    if let Err(e) = client.validate_token().await {
        error!("Failed to validate access token: {}", e);
        error!("Please ensure:");
        error!("  1. ARM_ACCESS_TOKEN is set to a valid bearer token");
        error!("  2. The token grants access to subscription {}", config.subscription_id);
        error!("  3. The management endpoint is reachable at {}", config.management_url);
        return Err(e).context("validating the access token");
    }
    info!("Access token validated");

    let desired = config
        .endpoint_spec
        .as_ref()
        .map(|path| {
            EndpointConfig::load(path).with_context(|| format!("loading desired state from {}", path.display()))
        })
        .transpose()?;

    let reconciler = Reconciler::new(Box::new(client), config.settings);

    match config.action {
        Action::Apply => {
            let desired = desired.context("ENDPOINT_SPEC is required for apply")?;
            let observed = reconciler
                .create_or_update(&desired, config.endpoint_id.as_deref())
                .await?;

            let report = drift::detect(&desired, &observed);
            if report.is_converged() {
                info!("Private endpoint {} matches the desired state", observed.id);
            } else if report.requires_replacement() {
                warn!("Private endpoint {} has drifted in fields that force replacement", observed.id);
            }
            for change in &report.changes {
                warn!(
                    "Drift on {}: desired {:?}, observed {:?}{}",
                    change.field,
                    change.desired,
                    change.observed,
                    if change.force_new { " (forces replacement)" } else { "" }
                );
            }
            print!("{}", serde_yaml::to_string(&observed)?);
        }
        Action::Read => {
            let id = config.endpoint_id.as_deref().context("ENDPOINT_ID is required for read")?;
            let zone_group_name = desired
                .as_ref()
                .and_then(|d| d.private_dns_zone_group.as_ref())
                .map(|g| g.name.as_str());
            let observed = reconciler.read(id, zone_group_name).await?;
            if observed.is_none() {
                info!("Private endpoint {} is gone - clear its identity from state", id);
            }
            print!("{}", serde_yaml::to_string(&observed)?);
        }
        Action::Delete => {
            let id = config.endpoint_id.as_deref().context("ENDPOINT_ID is required for delete")?;
            reconciler.delete(id).await?;
        }
    }

    Ok(())
}
