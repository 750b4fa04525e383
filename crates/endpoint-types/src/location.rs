//! Region name normalization

/// Normalize a region name the way the provider reports it.
///
/// "West Europe" and "westeurope" name the same region; the provider always answers
/// with the compact lower-case form.
pub fn normalize_location(location: &str) -> String {
    location
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}
