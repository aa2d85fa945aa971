//! Validation findings and resource aggregation
//!
//! Findings are structured data handed back to the caller in full, never
//! raised. Errors block a selection from being applied; warnings are
//! surfaced for explicit operator confirmation but never affect validity.

use serde::Serialize;
use thiserror::Error;

use crate::catalog::{PrerequisiteMode, ResourceSpec};

/// Error-class findings. Any one of these makes the selection invalid.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationError {
    #[error("Unknown profile '{id}'")]
    UnknownProfile { id: String },

    #[error("Profiles '{first}' and '{second}' cannot be installed together")]
    Conflict { first: String, second: String },

    #[error("Profile '{profile}' requires '{dependency}', which is not selected")]
    MissingDependency { profile: String, dependency: String },

    #[error("Profile '{profile}' prerequisites not satisfied ({mode:?} of {prerequisites:?})")]
    UnsatisfiedPrerequisite {
        profile: String,
        prerequisites: Vec<String>,
        mode: PrerequisiteMode,
    },

    #[error("Cannot remove '{removed}': '{dependent}' still depends on it")]
    InvalidRemoval { removed: String, dependent: String },

    #[error("Field '{field}': {message}")]
    FieldValidation { field: String, message: String },
}

/// Warning-class findings. Informational only.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationWarning {
    #[error("Profiles '{first}' and '{second}' both declare port {port}")]
    PortOverlap {
        first: String,
        second: String,
        port: u16,
    },

    #[error("Network changed from '{previous}' to '{current}'; chain data will be resynced")]
    NetworkChanged { previous: String, current: String },

    #[error("Profile '{id}' was removed since the last run; its data volumes will be orphaned")]
    ProfileRemoved { id: String },

    #[error("Selection needs {required} {resource} but only {available} available")]
    InsufficientResources {
        resource: String,
        required: String,
        available: String,
    },

    #[error("Field '{field}' has an invalid value; declared default used")]
    FieldDefaulted { field: String },
}

/// Aggregated resource minimums over a resolved selection.
///
/// Memory and disk add up because every selected service keeps its own
/// footprint resident; cpu takes the maximum because cores are shared, not
/// reserved per profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Default)]
pub struct ResourceRequirement {
    pub memory_mb: u64,
    pub cpu_cores: f64,
    pub disk_gb: u64,
}

impl ResourceRequirement {
    pub fn add(&mut self, spec: &ResourceSpec) {
        self.memory_mb += spec.memory_mb;
        self.disk_gb += spec.disk_gb;
        if spec.cpu_cores > self.cpu_cores {
            self.cpu_cores = spec.cpu_cores;
        }
    }

    pub fn aggregate<'a, I>(specs: I) -> Self
    where
        I: IntoIterator<Item = &'a ResourceSpec>,
    {
        let mut total = Self::default();
        for spec in specs {
            total.add(spec);
        }
        total
    }
}

/// Outcome of a validation pass: full findings plus aggregated resources.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
    pub resources: ResourceRequirement,
}

impl ValidationResult {
    pub fn new(
        errors: Vec<ValidationError>,
        warnings: Vec<ValidationWarning>,
        resources: ResourceRequirement,
    ) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
            warnings,
            resources,
        }
    }
}
