//! Configuration validation
//!
//! Rules:
//! - field-level constraints from the blueprint's `validator` derives
//! - sink names unique
//! - adapter sink references point at declared sinks
//! - a sync adapter with a zero timeout is rejected (always times out)

use std::collections::HashSet;

use contracts::{RelayBlueprint, RelayError};
use validator::Validate;

/// Validate a RelayBlueprint
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &RelayBlueprint) -> Result<(), RelayError> {
    validate_fields(blueprint)?;
    validate_sink_names(blueprint)?;
    validate_sink_references(blueprint)?;
    validate_sync_settings(blueprint)?;
    Ok(())
}

/// Field-level constraints (lengths, ranges)
fn validate_fields(blueprint: &RelayBlueprint) -> Result<(), RelayError> {
    blueprint.validate().map_err(|e| {
        let field = e
            .field_errors()
            .keys()
            .next()
            .map(|k| k.to_string())
            .unwrap_or_else(|| "blueprint".to_string());
        RelayError::config_validation(field, e.to_string())
    })
}

/// Sink name uniqueness
fn validate_sink_names(blueprint: &RelayBlueprint) -> Result<(), RelayError> {
    let mut seen = HashSet::new();
    for sink in &blueprint.sinks {
        if !seen.insert(&sink.name) {
            return Err(RelayError::config_validation(
                format!("sinks[name={}]", sink.name),
                "duplicate sink name",
            ));
        }
    }
    Ok(())
}

/// Adapter sink references must name declared sinks
fn validate_sink_references(blueprint: &RelayBlueprint) -> Result<(), RelayError> {
    let names: HashSet<_> = blueprint.sinks.iter().map(|s| s.name.as_str()).collect();

    for (field, reference) in [
        ("adapter.output_sink", &blueprint.adapter.output_sink),
        ("adapter.failure_sink", &blueprint.adapter.failure_sink),
    ] {
        if let Some(name) = reference {
            if !names.contains(name.as_str()) {
                return Err(RelayError::config_validation(
                    field,
                    format!("references undeclared sink '{name}'"),
                ));
            }
        }
    }
    Ok(())
}

/// Synchronous-mode settings sanity
fn validate_sync_settings(blueprint: &RelayBlueprint) -> Result<(), RelayError> {
    if blueprint.adapter.sync && blueprint.adapter.send_timeout_ms == Some(0) {
        return Err(RelayError::config_validation(
            "adapter.send_timeout_ms",
            "a zero timeout makes every synchronous send time out",
        ));
    }
    Ok(())
}
