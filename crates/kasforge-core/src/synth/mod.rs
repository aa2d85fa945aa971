//! Configuration synthesis
//!
//! Turns a validated selection plus collected field values into the
//! generated artifacts: the profile-tagged service document and the grouped
//! environment file. Everything except the release-tag lookup is pure; with
//! a warmed version cache two identical calls produce byte-identical text.

pub mod compose;
pub mod env;
pub mod versions;

pub use versions::{GithubReleaseSource, ReleaseMetadataSource, VersionResolver};

#[cfg(test)]
mod tests;

use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use crate::catalog::{Catalog, ProfileDefinition};
use crate::fields::{Audience, FieldRegistry, FieldValue};
use crate::resolver::findings::{ValidationError, ValidationWarning};

/// Renames from the flat pre-1.0 value schema onto current field keys.
///
/// Normalization never overrides a value supplied under its current name.
const LEGACY_FIELD_RENAMES: &[(&str, &str)] = &[
    ("mining_addr", "stratum_mining_address"),
    ("kaspad_rpc_port", "node_rpc_port"),
    ("var_diff", "stratum_var_diff"),
];

/// Synthesized artifacts plus the findings produced along the way.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedArtifact {
    /// Compose-style service document.
    pub compose: String,
    /// Grouped KEY=VALUE environment text.
    pub env: String,
    /// Version tags actually used, by repository key.
    pub versions: BTreeMap<String, String>,
    /// Field-level errors; each one names a field whose owning services
    /// were skipped.
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

/// Generates artifacts for validated selections.
pub struct Synthesizer {
    catalog: Arc<Catalog>,
    registry: Arc<FieldRegistry>,
    versions: VersionResolver,
}

impl Synthesizer {
    pub fn new(
        catalog: Arc<Catalog>,
        registry: Arc<FieldRegistry>,
        versions: VersionResolver,
    ) -> Self {
        Self {
            catalog,
            registry,
            versions,
        }
    }

    /// Generate artifacts for `selection`.
    ///
    /// Callers are expected to have validated the selection; ids that still
    /// fail to resolve are skipped with a log line rather than poisoning
    /// the output.
    pub async fn synthesize(
        &self,
        selection: &[String],
        field_values: &HashMap<String, serde_json::Value>,
    ) -> GeneratedArtifact {
        let migrated = self.catalog.migrate_ids(selection);
        for id in &migrated {
            if !self.catalog.contains(id) {
                log::warn!("Skipping unknown profile '{}' during synthesis", id);
            }
        }
        let profiles = self.catalog.in_declaration_order(&migrated);
        let selected: HashSet<&str> = profiles.iter().map(|p| p.id.as_str()).collect();

        let effective = normalize_legacy_values(field_values);
        let schema = self
            .registry
            .schema(&*self.catalog, &migrated, Audience::Backend);

        let mut typed: HashMap<String, FieldValue> = HashMap::new();
        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        let mut skipped: HashSet<String> = HashSet::new();

        for field in &schema {
            let provided = effective.get(&field.key);
            let candidate = match provided {
                Some(raw) => field.validate_value(raw),
                // Absent values fall back to the declared default, which
                // still has to pass the field's own checks when required.
                None => field.validate_value(&field.default.to_json()).map_err(|_| {
                    "required value is missing and the field has no usable default".to_string()
                }),
            };
            match candidate {
                Ok(value) => {
                    typed.insert(field.key.clone(), value);
                }
                Err(message) if field.required => {
                    errors.push(ValidationError::FieldValidation {
                        field: field.key.clone(),
                        message,
                    });
                    for id in &field.visible_for {
                        if selected.contains(id.as_str()) {
                            skipped.insert(id.clone());
                        }
                    }
                }
                Err(_) => {
                    warnings.push(ValidationWarning::FieldDefaulted {
                        field: field.key.clone(),
                    });
                    typed.insert(field.key.clone(), field.default.clone());
                }
            }
        }

        let emitted: Vec<&ProfileDefinition> = profiles
            .iter()
            .filter(|p| !skipped.contains(&p.id))
            .copied()
            .collect();
        if !skipped.is_empty() {
            log::warn!(
                "Skipping services of {:?}: required field values are invalid",
                skipped
            );
        }

        let endpoints = endpoint_decisions(&emitted, &selected);

        let mut resolved = BTreeMap::new();
        for profile in &emitted {
            for svc in &profile.services {
                if !resolved.contains_key(&svc.repository) {
                    let tag = self
                        .versions
                        .resolve(&svc.repository, &svc.pinned_version)
                        .await;
                    resolved.insert(svc.repository.clone(), tag);
                }
            }
        }

        let compose = compose::render(&emitted, &resolved);
        let env = env::render(&emitted, &schema, &typed, &endpoints);

        GeneratedArtifact {
            compose,
            env,
            versions: resolved,
            errors,
            warnings,
        }
    }
}

/// Map legacy keys onto their current equivalents, current names winning.
///
/// The retired `var_diff` toggle additionally forces the extranonce
/// subscription on when set, matching the coupling of older bridge builds.
fn normalize_legacy_values(
    values: &HashMap<String, serde_json::Value>,
) -> HashMap<String, serde_json::Value> {
    let mut effective = values.clone();
    for (legacy, current) in LEGACY_FIELD_RENAMES {
        let Some(value) = values.get(*legacy) else {
            continue;
        };
        effective.remove(*legacy);
        if effective.contains_key(*current) {
            continue;
        }
        effective.insert(current.to_string(), value.clone());
        if *legacy == "var_diff" && value.as_bool() == Some(true) {
            effective
                .entry("stratum_extranonce".to_string())
                .or_insert(serde_json::Value::Bool(true));
        }
    }
    effective
}

/// Per-profile endpoint values as a pure function of co-selection.
///
/// For each endpoint key the bindings are scanned in declaration order: the
/// first one whose companion profile is selected wins with its in-stack
/// address; with no companion present the first binding's public default is
/// used.
fn endpoint_decisions(
    profiles: &[&ProfileDefinition],
    selected: &HashSet<&str>,
) -> HashMap<String, Vec<(String, String)>> {
    let mut decisions = HashMap::new();
    for profile in profiles {
        let mut for_profile = Vec::new();
        let mut decided: HashSet<&str> = HashSet::new();
        for binding in &profile.config.endpoints {
            if !decided.insert(binding.key.as_str()) {
                continue;
            }
            let value = profile
                .config
                .endpoints
                .iter()
                .filter(|b| b.key == binding.key)
                .find(|b| selected.contains(b.companion.as_str()))
                .map(|b| b.local.clone())
                .unwrap_or_else(|| binding.public.clone());
            for_profile.push((binding.key.clone(), value));
        }
        if !for_profile.is_empty() {
            decisions.insert(profile.id.clone(), for_profile);
        }
    }
    decisions
}
