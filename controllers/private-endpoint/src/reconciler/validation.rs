//! Local checks run before any remote call.

use crate::error::ReconcileError;
use endpoint_types::{EndpointConfig, FieldPredicates};
use std::collections::HashSet;

/// Longest request message the provider accepts
pub const MAX_REQUEST_MESSAGE_LENGTH: usize = 140;

/// Check every invariant of the desired state, reporting all violations together
pub fn validate(config: &EndpointConfig, predicates: &dyn FieldPredicates) -> Result<(), ReconcileError> {
    let mut errors = Vec::new();
    let mut check = |field: String, result: Result<(), String>| {
        if let Err(e) = result {
            errors.push(format!("{}: {}", field, e));
        }
    };

    check("name".to_string(), predicates.private_link_name(&config.name));
    if config.resource_group_name.trim().is_empty() {
        check("resource_group_name".to_string(), Err("must not be empty".to_string()));
    }
    if config.location.trim().is_empty() {
        check("location".to_string(), Err("must not be empty".to_string()));
    }
    check("subnet_id".to_string(), predicates.resource_id(&config.subnet_id));

    if config.private_service_connections.is_empty() {
        check(
            "private_service_connections".to_string(),
            Err("at least one connection is required".to_string()),
        );
    }

    let mut seen = HashSet::new();
    for (i, connection) in config.private_service_connections.iter().enumerate() {
        let field = |name: &str| format!("private_service_connections[{}].{}", i, name);

        check(field("name"), predicates.private_link_name(&connection.name));
        if !seen.insert(connection.name.to_ascii_lowercase()) {
            check(field("name"), Err(format!("duplicate connection name {:?}", connection.name)));
        }
        check(
            field("private_connection_resource_id"),
            predicates.resource_id(&connection.private_connection_resource_id),
        );
        for (j, subresource) in connection.subresource_names.iter().enumerate() {
            check(
                format!("{}[{}]", field("subresource_names"), j),
                predicates.subresource_name(subresource),
            );
        }
        check(
            field("request_message"),
            request_message(connection.is_manual_connection, connection.request_message.as_deref()),
        );
    }

    if let Some(group) = &config.private_dns_zone_group {
        check("private_dns_zone_group.name".to_string(), predicates.private_link_name(&group.name));
        if group.zone_configs.is_empty() {
            check(
                "private_dns_zone_group.zone_configs".to_string(),
                Err("at least one zone config is required".to_string()),
            );
        }
        for (i, zone) in group.zone_configs.iter().enumerate() {
            let field = |name: &str| format!("private_dns_zone_group.zone_configs[{}].{}", i, name);
            check(field("name"), predicates.private_link_name(&zone.name));
            check(field("private_dns_zone_id"), predicates.resource_id(&zone.private_dns_zone_id));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ReconcileError::Validation(errors))
    }
}

fn request_message(manual: bool, message: Option<&str>) -> Result<(), String> {
    match message {
        None => Ok(()),
        Some(m) if !manual => {
            if m.trim().is_empty() {
                Ok(())
            } else {
                Err("may only be set when is_manual_connection is true".to_string())
            }
        }
        Some(m) => {
            let length = m.chars().count();
            if (1..=MAX_REQUEST_MESSAGE_LENGTH).contains(&length) {
                Ok(())
            } else {
                Err(format!(
                    "must be between 1 and {} characters (got {})",
                    MAX_REQUEST_MESSAGE_LENGTH, length
                ))
            }
        }
    }
}
