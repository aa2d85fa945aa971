//! Profile catalog and legacy migration
//!
//! The catalog is the static table of profile definitions plus the retired-id
//! alias map. It is constructed once per process through [`Catalog::new`],
//! which enforces the cross-profile invariants up front so that per-request
//! code never has to re-check them. A constructed catalog is immutable and
//! safe to share across any number of concurrent callers.

pub mod builtin;
pub mod migration;
pub mod types;

pub use migration::LegacyAliasMap;
pub use types::*;

#[cfg(test)]
mod tests;

use std::collections::{HashMap, HashSet};

use crate::errors::{ForgeError, ForgeResult};

/// Immutable profile table with id index and alias map.
#[derive(Debug, Clone)]
pub struct Catalog {
    profiles: Vec<ProfileDefinition>,
    index: HashMap<String, usize>,
    aliases: LegacyAliasMap,
}

impl Catalog {
    /// Build a catalog, enforcing the structural invariants.
    ///
    /// Violations are reported as [`ForgeError::CatalogError`] naming the
    /// offending profile, so a broken definition table fails loudly at
    /// startup rather than corrupting later validation results.
    pub fn new(profiles: Vec<ProfileDefinition>, aliases: Vec<LegacyAlias>) -> ForgeResult<Self> {
        let mut index = HashMap::new();
        for (position, profile) in profiles.iter().enumerate() {
            if index.insert(profile.id.clone(), position).is_some() {
                return Err(ForgeError::CatalogError(format!(
                    "Duplicate profile id '{}'",
                    profile.id
                )));
            }
        }

        let mut service_owner: HashMap<&str, &str> = HashMap::new();
        for profile in &profiles {
            for svc in &profile.services {
                if let Some(other) = service_owner.insert(svc.name.as_str(), profile.id.as_str()) {
                    return Err(ForgeError::CatalogError(format!(
                        "Service name '{}' is declared by both '{}' and '{}'",
                        svc.name, other, profile.id
                    )));
                }
            }
        }

        for profile in &profiles {
            Self::check_references(&index, profile)?;
            Self::check_bundle(profile)?;
        }

        // Conflict symmetry: if A lists B, B must list A.
        for profile in &profiles {
            for other_id in &profile.conflicts_with {
                let other = &profiles[index[other_id.as_str()]];
                if !other.conflicts_with.contains(&profile.id) {
                    return Err(ForgeError::CatalogError(format!(
                        "Conflict between '{}' and '{}' is not symmetric",
                        profile.id, other_id
                    )));
                }
            }
        }

        let aliases = LegacyAliasMap::new(aliases);
        for (legacy_id, targets) in aliases.entries() {
            if index.contains_key(legacy_id) {
                return Err(ForgeError::CatalogError(format!(
                    "Legacy alias '{}' collides with a current profile id",
                    legacy_id
                )));
            }
            if targets.is_empty() {
                return Err(ForgeError::CatalogError(format!(
                    "Legacy alias '{}' has no targets",
                    legacy_id
                )));
            }
            for target in targets {
                if !index.contains_key(target.as_str()) {
                    return Err(ForgeError::CatalogError(format!(
                        "Legacy alias '{}' targets unknown profile '{}'",
                        legacy_id, target
                    )));
                }
            }
        }

        log::debug!(
            "Catalog constructed with {} profiles, {} aliases",
            profiles.len(),
            aliases.entries().count()
        );

        Ok(Self {
            profiles,
            index,
            aliases,
        })
    }

    /// The shipped Kaspa stack catalog.
    pub fn builtin() -> ForgeResult<Self> {
        Self::new(builtin::builtin_profiles(), builtin::builtin_aliases())
    }

    fn check_references(index: &HashMap<String, usize>, profile: &ProfileDefinition) -> ForgeResult<()> {
        let relations = [
            ("dependency", &profile.depends_on),
            ("conflict", &profile.conflicts_with),
            ("prerequisite", &profile.prerequisites),
        ];
        for (kind, ids) in relations {
            for id in ids {
                if id == &profile.id {
                    return Err(ForgeError::CatalogError(format!(
                        "Profile '{}' lists itself as a {}",
                        profile.id, kind
                    )));
                }
                if !index.contains_key(id.as_str()) {
                    return Err(ForgeError::CatalogError(format!(
                        "Profile '{}' lists unknown {} '{}'",
                        profile.id, kind, id
                    )));
                }
            }
        }
        for binding in &profile.config.endpoints {
            if !index.contains_key(binding.companion.as_str()) {
                return Err(ForgeError::CatalogError(format!(
                    "Profile '{}' endpoint '{}' names unknown companion '{}'",
                    profile.id, binding.key, binding.companion
                )));
            }
        }
        Ok(())
    }

    fn check_bundle(profile: &ProfileDefinition) -> ForgeResult<()> {
        if !profile.config.is_bundle && !profile.config.bundled_services.is_empty() {
            return Err(ForgeError::CatalogError(format!(
                "Profile '{}' lists bundled services but is not a bundle",
                profile.id
            )));
        }
        let names: HashSet<&str> = profile.services.iter().map(|s| s.name.as_str()).collect();
        for bundled in &profile.config.bundled_services {
            if !names.contains(bundled.as_str()) {
                return Err(ForgeError::CatalogError(format!(
                    "Profile '{}' bundles unknown service '{}'",
                    profile.id, bundled
                )));
            }
        }
        Ok(())
    }

    /// Look up a profile by current or legacy id.
    ///
    /// A legacy id resolves to the first element of its fan-out; unknown ids
    /// return `None`.
    pub fn get(&self, id: &str) -> Option<&ProfileDefinition> {
        if let Some(&position) = self.index.get(id) {
            return Some(&self.profiles[position]);
        }
        let migrated = self.aliases.migrate_id(id);
        let first = migrated.first()?;
        self.index.get(first.as_str()).map(|&p| &self.profiles[p])
    }

    /// Whether `id` is a current profile id.
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Declaration position of a current id, used for stable ordering.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// All profiles in declaration order.
    pub fn profiles(&self) -> &[ProfileDefinition] {
        &self.profiles
    }

    pub fn aliases(&self) -> &LegacyAliasMap {
        &self.aliases
    }

    /// Resolve one id to its current equivalents (see
    /// [`LegacyAliasMap::migrate_id`]).
    pub fn migrate_id(&self, id: &str) -> Vec<String> {
        self.aliases.migrate_id(id)
    }

    /// Migrate, flatten, and deduplicate a selection. Idempotent.
    pub fn migrate_ids<I, S>(&self, ids: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.aliases.migrate_ids(ids)
    }

    /// Profiles whose use-case metadata matches, in declaration order.
    pub fn recommend(&self, use_case: &str) -> Vec<&ProfileDefinition> {
        self.profiles
            .iter()
            .filter(|p| p.use_cases.iter().any(|u| u == use_case))
            .collect()
    }

    /// Sort current ids by declaration order, dropping unknowns.
    ///
    /// Validation and synthesis both run over selections in this order so
    /// that results never depend on the order the operator clicked things.
    pub fn in_declaration_order<'a, I>(&self, ids: I) -> Vec<&ProfileDefinition>
    where
        I: IntoIterator<Item = &'a String>,
    {
        let mut known: Vec<usize> = ids
            .into_iter()
            .filter_map(|id| self.position(id))
            .collect();
        known.sort_unstable();
        known.dedup();
        known.into_iter().map(|p| &self.profiles[p]).collect()
    }
}
