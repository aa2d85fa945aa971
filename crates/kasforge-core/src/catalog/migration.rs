//! Legacy profile id migration
//!
//! Earlier releases shipped a coarser profile taxonomy (`core`, `mining`,
//! `kasia`, ...). Saved selections using those ids keep working through an
//! immutable alias table that fans each retired id out onto one or more
//! current ids. The table is built once alongside the catalog and never
//! patched at runtime.

use std::collections::HashMap;

use super::types::LegacyAlias;

/// Immutable retired-id to current-ids lookup table.
#[derive(Debug, Clone, Default)]
pub struct LegacyAliasMap {
    aliases: HashMap<String, Vec<String>>,
}

impl LegacyAliasMap {
    pub fn new(aliases: Vec<LegacyAlias>) -> Self {
        let aliases = aliases
            .into_iter()
            .map(|a| (a.legacy_id, a.targets))
            .collect();
        Self { aliases }
    }

    /// Whether `id` is a retired alias.
    pub fn is_legacy(&self, id: &str) -> bool {
        self.aliases.contains_key(id)
    }

    /// Resolve one id to its current equivalents.
    ///
    /// Current and unknown ids pass through unchanged as a single-element
    /// sequence; legacy ids return their fan-out targets in priority order.
    pub fn migrate_id(&self, id: &str) -> Vec<String> {
        match self.aliases.get(id) {
            Some(targets) => targets.clone(),
            None => vec![id.to_string()],
        }
    }

    /// Resolve a whole selection: migrate every element, flatten, and drop
    /// duplicates while keeping first-occurrence order.
    ///
    /// Applying this to its own output is a no-op, so callers may migrate
    /// defensively without tracking whether a selection was already current.
    pub fn migrate_ids<I, S>(&self, ids: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = std::collections::HashSet::new();
        let mut result = Vec::new();
        for id in ids {
            for migrated in self.migrate_id(id.as_ref()) {
                if seen.insert(migrated.clone()) {
                    result.push(migrated);
                }
            }
        }
        result
    }

    /// All alias entries, for catalog construction checks.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.aliases
            .iter()
            .map(|(id, targets)| (id.as_str(), targets.as_slice()))
    }
}
