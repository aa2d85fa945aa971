//! Profile graph resolution
//!
//! Validates a requested selection against the catalog and aggregates its
//! resource requirements. Every check accumulates findings instead of
//! stopping at the first, so one pass yields a complete diagnostic. All
//! functions here are pure over the immutable catalog: no locks, no
//! suspension points, safe under unbounded concurrent invocation.

pub mod findings;

pub use findings::*;


use std::collections::{HashMap, HashSet};

use crate::catalog::{Catalog, PrerequisiteMode, ResourceSpec};
use crate::fields::registry::NETWORK_FIELD;
use crate::state::AppliedState;

/// Validates selections against a catalog.
pub struct GraphResolver<'a> {
    catalog: &'a Catalog,
}

impl<'a> GraphResolver<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Validate a requested selection.
    ///
    /// Input ids may be legacy or current and may repeat; they are migrated
    /// and deduplicated first. Unknown ids produce findings and drop out of
    /// the remaining checks.
    pub fn validate<I, S>(&self, selection: I) -> ValidationResult
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let migrated = self.catalog.migrate_ids(selection);

        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        let mut known = Vec::new();
        for id in &migrated {
            if self.catalog.contains(id) {
                known.push(id.clone());
            } else {
                errors.push(ValidationError::UnknownProfile { id: id.clone() });
            }
        }

        let profiles = self.catalog.in_declaration_order(&known);
        let selected: HashSet<&str> = profiles.iter().map(|p| p.id.as_str()).collect();

        for (i, a) in profiles.iter().enumerate() {
            for b in &profiles[i + 1..] {
                let conflicting = a.conflicts_with.contains(&b.id)
                    || b.conflicts_with.contains(&a.id);
                if conflicting {
                    errors.push(ValidationError::Conflict {
                        first: a.id.clone(),
                        second: b.id.clone(),
                    });
                    continue;
                }
                // Overlapping ports are only worth flagging for pairs that
                // may actually run together.
                for port in &a.ports {
                    if b.ports.contains(port) {
                        warnings.push(ValidationWarning::PortOverlap {
                            first: a.id.clone(),
                            second: b.id.clone(),
                            port: *port,
                        });
                    }
                }
            }
        }

        for profile in &profiles {
            for dependency in &profile.depends_on {
                if !selected.contains(dependency.as_str()) {
                    errors.push(ValidationError::MissingDependency {
                        profile: profile.id.clone(),
                        dependency: dependency.clone(),
                    });
                }
            }
        }

        for profile in &profiles {
            if profile.prerequisites.is_empty() {
                continue;
            }
            let present = profile
                .prerequisites
                .iter()
                .filter(|p| selected.contains(p.as_str()))
                .count();
            let satisfied = match profile.prerequisites_mode {
                PrerequisiteMode::All => present == profile.prerequisites.len(),
                PrerequisiteMode::Any => present > 0,
            };
            if !satisfied {
                errors.push(ValidationError::UnsatisfiedPrerequisite {
                    profile: profile.id.clone(),
                    prerequisites: profile.prerequisites.clone(),
                    mode: profile.prerequisites_mode,
                });
            }
        }

        let resources = ResourceRequirement::aggregate(profiles.iter().map(|p| &p.resources));

        log::debug!(
            "Validated selection {:?}: {} errors, {} warnings",
            migrated,
            errors.len(),
            warnings.len()
        );

        ValidationResult::new(errors, warnings, resources)
    }

    /// Check whether removing `id` would orphan a still-selected dependent.
    ///
    /// Removal is blocked unless every dependent is removed in the same
    /// operation. The returned resources describe the selection as it would
    /// look after the removal.
    pub fn validate_removal<I, S>(&self, id: &str, current_selection: I) -> ValidationResult
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let removal: Vec<String> = self.catalog.migrate_id(id);
        let removal_set: HashSet<&str> = removal.iter().map(String::as_str).collect();
        let current = self.catalog.migrate_ids(current_selection);
        let remaining_profiles = self.catalog.in_declaration_order(
            current
                .iter()
                .filter(|c| !removal_set.contains(c.as_str())),
        );

        let mut errors = Vec::new();
        for removed in &removal {
            for profile in &remaining_profiles {
                if profile.depends_on.contains(removed) {
                    errors.push(ValidationError::InvalidRemoval {
                        removed: removed.clone(),
                        dependent: profile.id.clone(),
                    });
                }
            }
        }

        let resources =
            ResourceRequirement::aggregate(remaining_profiles.iter().map(|p| &p.resources));
        ValidationResult::new(errors, Vec::new(), resources)
    }

    /// Validate and additionally compare against the previously-applied
    /// state, attaching cross-run change warnings.
    pub fn validate_with_previous<I, S>(
        &self,
        selection: I,
        field_values: &HashMap<String, serde_json::Value>,
        previous: Option<&AppliedState>,
    ) -> ValidationResult
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let migrated = self.catalog.migrate_ids(selection);
        let mut result = self.validate(&migrated);

        let Some(previous) = previous else {
            return result;
        };

        let current: HashSet<&str> = migrated.iter().map(String::as_str).collect();
        for id in self.catalog.migrate_ids(&previous.selection) {
            if self.catalog.contains(&id) && !current.contains(id.as_str()) {
                result
                    .warnings
                    .push(ValidationWarning::ProfileRemoved { id });
            }
        }

        let previous_network = previous
            .field_values
            .get(NETWORK_FIELD)
            .and_then(|v| v.as_str());
        let current_network = field_values.get(NETWORK_FIELD).and_then(|v| v.as_str());
        if let (Some(prev), Some(cur)) = (previous_network, current_network) {
            if prev != cur {
                result.warnings.push(ValidationWarning::NetworkChanged {
                    previous: prev.to_string(),
                    current: cur.to_string(),
                });
            }
        }

        result
    }
}

/// Compare an aggregated requirement against what the host offers.
///
/// Probing is the outer application's job; this only turns the comparison
/// into warnings the wizard can show next to the requirement totals.
pub fn resource_warnings(
    required: &ResourceRequirement,
    available: &ResourceSpec,
) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    if required.memory_mb > available.memory_mb {
        warnings.push(ValidationWarning::InsufficientResources {
            resource: "memory".to_string(),
            required: format!("{} MiB", required.memory_mb),
            available: format!("{} MiB", available.memory_mb),
        });
    }
    if required.cpu_cores > available.cpu_cores {
        warnings.push(ValidationWarning::InsufficientResources {
            resource: "cpu".to_string(),
            required: format!("{:.1} cores", required.cpu_cores),
            available: format!("{:.1} cores", available.cpu_cores),
        });
    }
    if required.disk_gb > available.disk_gb {
        warnings.push(ValidationWarning::InsufficientResources {
            resource: "disk".to_string(),
            required: format!("{} GiB", required.disk_gb),
            available: format!("{} GiB", available.disk_gb),
        });
    }
    warnings
}
