//! Header schema validation.
//!
//! Peers must identify themselves with `version`, `port`, and `nethash`
//! headers. Violations are collected, not short-circuited, so the caller
//! sees every problem in one aggregated message.

use shared_types::PeerHeaders;

/// Validate peer headers against the schema.
///
/// Returns the full list of violations; an empty list means valid.
pub fn validate_headers(headers: &PeerHeaders) -> Vec<String> {
    let mut violations = Vec::new();

    match headers.get("version") {
        None => violations.push("headers.version is required".to_string()),
        Some(version) if !is_semver(version) => {
            violations.push("headers.version must be a semantic version".to_string());
        }
        Some(_) => {}
    }

    match headers.get("port") {
        None => violations.push("headers.port is required".to_string()),
        Some(port) => {
            let valid = port.parse::<u16>().map(|p| p > 0).unwrap_or(false);
            if !valid {
                violations
                    .push("headers.port must be an integer between 1 and 65535".to_string());
            }
        }
    }

    match headers.get("nethash") {
        None => violations.push("headers.nethash is required".to_string()),
        Some(nethash) => {
            if nethash.len() != 64 || !nethash.chars().all(|c| c.is_ascii_hexdigit()) {
                violations.push("headers.nethash must be 64 hex characters".to_string());
            }
        }
    }

    violations
}

/// `major.minor.patch`, numeric segments, optional `-suffix` on the patch.
fn is_semver(version: &str) -> bool {
    let version = version.split('-').next().unwrap_or(version);
    let segments: Vec<&str> = version.split('.').collect();
    segments.len() == 3
        && segments
            .iter()
            .all(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()))
}
