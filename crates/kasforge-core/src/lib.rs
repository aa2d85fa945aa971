//! Core library for the kasforge stack manager.
//!
//! kasforge turns an operator's choice of deployable profiles for the Kaspa
//! service stack into generated infrastructure artifacts. This crate is the
//! headless core: it validates selections, migrates the retired profile
//! taxonomy, computes configuration schemas, and synthesizes the service
//! document and environment text. It never talks to a container runtime and
//! never persists anything; the surrounding application does both.
//!
//! # Architecture Overview
//!
//! - **Catalog**: immutable profile table plus the legacy alias map,
//!   validated once at construction
//! - **Graph resolution**: conflict/dependency/prerequisite checking and
//!   resource aggregation, pure over the catalog
//! - **Field schemas**: audience-aware configuration field resolution with
//!   explicit tagged value kinds
//! - **Synthesis**: deterministic artifact generation with cached,
//!   single-flight upstream release lookups
//! - **Collaborator seams**: the installation-state store and the release
//!   metadata source are traits, injectable for tests

pub mod catalog;
pub mod errors;
pub mod fields;
pub mod resolver;
pub mod state;
pub mod synth;

pub use catalog::Catalog;
pub use errors::{ForgeError, ForgeResult};
pub use fields::{Audience, ConfigurationField, FieldRegistry, FieldValue, GroupSummary};
pub use resolver::{
    resource_warnings, GraphResolver, ResourceRequirement, ValidationError, ValidationResult,
    ValidationWarning,
};
pub use state::{AppliedState, InstallationStateStore, JsonStateReader};
pub use synth::{
    GeneratedArtifact, GithubReleaseSource, ReleaseMetadataSource, Synthesizer, VersionResolver,
};

use std::collections::HashMap;
use std::sync::Arc;

/// One-stop entry point bundling the catalog, field registry, and
/// synthesizer for the shipped stack.
pub struct Forge {
    catalog: Arc<Catalog>,
    registry: Arc<FieldRegistry>,
    synthesizer: Synthesizer,
}

impl Forge {
    /// Assemble the built-in stack over the given release source.
    pub fn builtin(source: Arc<dyn ReleaseMetadataSource>) -> ForgeResult<Self> {
        let catalog = Arc::new(Catalog::builtin()?);
        let registry = Arc::new(FieldRegistry::builtin(&catalog)?);
        let versions = VersionResolver::new(source);
        Ok(Self::new(catalog, registry, versions))
    }

    pub fn new(
        catalog: Arc<Catalog>,
        registry: Arc<FieldRegistry>,
        versions: VersionResolver,
    ) -> Self {
        let synthesizer = Synthesizer::new(catalog.clone(), registry.clone(), versions);
        Self {
            catalog,
            registry,
            synthesizer,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    pub fn migrate_ids<I, S>(&self, ids: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.catalog.migrate_ids(ids)
    }

    pub fn validate<I, S>(&self, selection: I) -> ValidationResult
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        GraphResolver::new(&self.catalog).validate(selection)
    }

    pub fn validate_removal<I, S>(&self, id: &str, current_selection: I) -> ValidationResult
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        GraphResolver::new(&self.catalog).validate_removal(id, current_selection)
    }

    pub fn field_schema<I, S>(&self, selection: I, audience: Audience) -> Vec<&ConfigurationField>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.registry.schema(&self.catalog, selection, audience)
    }

    pub async fn synthesize(
        &self,
        selection: &[String],
        field_values: &HashMap<String, serde_json::Value>,
    ) -> GeneratedArtifact {
        self.synthesizer.synthesize(selection, field_values).await
    }
}
