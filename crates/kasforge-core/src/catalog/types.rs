//! Profile catalog type definitions
//!
//! The catalog is the static table every other subsystem works from. Types
//! here are plain data: they derive serde traits so an outer layer can load
//! a catalog from YAML, but the crate ships a compiled-in catalog (see
//! [`super::builtin`]) and never mutates one after construction.

use serde::{Deserialize, Serialize};

/// A named, installable unit bundling one or more services plus declared
/// resource needs and relationships to other profiles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileDefinition {
    /// Unique catalog key, e.g. `kaspa-node`.
    pub id: String,
    /// Human-readable display name.
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: ProfileCategory,
    /// Use-case labels consumed by the wizard's recommendation row.
    #[serde(default)]
    pub use_cases: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Services in declared startup order.
    pub services: Vec<ServiceDescriptor>,
    /// Profiles that must be co-selected.
    #[serde(default)]
    pub depends_on: Vec<String>,
    /// Profiles that can never be co-selected. Symmetry is enforced at
    /// catalog construction, not per request.
    #[serde(default)]
    pub conflicts_with: Vec<String>,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(default)]
    pub prerequisites_mode: PrerequisiteMode,
    pub resources: ResourceSpec,
    /// Host ports this profile expects to bind.
    #[serde(default)]
    pub ports: Vec<u16>,
    #[serde(default)]
    pub config: ProfileConfig,
}

impl ProfileDefinition {
    /// Names of all services this profile emits.
    pub fn service_names(&self) -> Vec<&str> {
        self.services.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn is_bundle(&self) -> bool {
        self.config.is_bundle
    }
}

/// One deployable service unit within a profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    /// Service name, also the in-stack hostname of the container.
    pub name: String,
    /// Optional services may be skipped when their configuration is
    /// malformed; required services abort instead.
    #[serde(default = "default_required")]
    pub required: bool,
    /// Position in the profile's startup sequence, lowest first.
    #[serde(default)]
    pub startup_order: u32,
    /// Container image without a tag, e.g. `supertypo/rusty-kaspad`.
    pub image: String,
    /// Upstream repository key (`owner/repo`) for release-tag lookups.
    pub repository: String,
    /// Tag used whenever the upstream lookup fails or times out.
    pub pinned_version: String,
}

/// Coarse grouping used for display and recommendations.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProfileCategory {
    Node,
    Mining,
    App,
    Indexer,
    Explorer,
    Monitoring,
}

/// Whether a profile's prerequisite set must be fully present (`All`) or
/// partially present (`Any`) to be satisfied.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PrerequisiteMode {
    #[default]
    All,
    Any,
}

/// Declared resource minimums for a single profile.
///
/// Units are fixed crate-wide: memory in MiB, cpu in cores, disk in GiB.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ResourceSpec {
    pub memory_mb: u64,
    pub cpu_cores: f64,
    pub disk_gb: u64,
}

/// Free-form configuration block attached to a profile.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProfileConfig {
    /// Bundle profiles install all of their services as one group under the
    /// bundle's id.
    #[serde(default)]
    pub is_bundle: bool,
    /// Service names grouped by the bundle. Each entry must match a
    /// `ServiceDescriptor` name on the same profile.
    #[serde(default)]
    pub bundled_services: Vec<String>,
    /// Endpoint values decided by co-selection at synthesis time.
    #[serde(default)]
    pub endpoints: Vec<EndpointBinding>,
}

/// An externally-facing endpoint value resolved per selection.
///
/// When `companion` is part of the selection the in-stack `local` address is
/// emitted, otherwise the hosted `public` default. The decision depends only
/// on co-selection, never on field order or selection order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EndpointBinding {
    /// Environment key the decision is written to, e.g. `KASIA_INDEXER_URL`.
    pub key: String,
    /// Profile id whose presence switches the value to `local`.
    pub companion: String,
    pub local: String,
    pub public: String,
}

/// A retired profile id mapped onto one or more current ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyAlias {
    pub legacy_id: String,
    /// Fan-out targets in priority order; the first element is the winner
    /// for single-id lookups.
    pub targets: Vec<String>,
}

fn default_required() -> bool {
    true
}
