//! Print the desired-state JSON schema as YAML
//!
//! Usage: `cargo run -p endpoint-types --bin schemagen > endpoint.schema.yaml`

use endpoint_types::EndpointConfig;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let schema = schemars::schema_for!(EndpointConfig);
    print!("{}", serde_yaml::to_string(&schema)?);
    Ok(())
}
