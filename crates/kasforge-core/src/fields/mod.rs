//! Configuration field schema resolution
//!
//! Fields are declared once in the registry with an explicit tagged value
//! kind; collected values are validated against that tag before synthesis
//! rather than coerced implicitly. Which fields apply to a request depends
//! only on the resolved selection, so the schema handed to the wizard is a
//! pure function of catalog + selection + audience.

pub mod registry;


use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::catalog::Catalog;
use crate::errors::{ForgeError, ForgeResult};

/// Who a schema (or value map) is being prepared for.
///
/// `Backend` is the subset persisted and fed into synthesis; `Display` is
/// the superset redisplayed by the wizard, which additionally contains the
/// frontend-only fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Audience {
    Backend,
    Display,
}

/// Tagged value type of a configuration field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldKind {
    Bool,
    Number {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
    Text {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pattern: Option<String>,
    },
    Enum { options: Vec<String> },
}

/// A validated, typed field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Loose representation, for re-validating defaults and round-trips.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            FieldValue::Bool(b) => serde_json::Value::Bool(*b),
            FieldValue::Number(n) => serde_json::Value::from(*n),
            FieldValue::Text(t) => serde_json::Value::String(t.clone()),
        }
    }

    /// Plain ASCII rendering used in generated environment text.
    pub fn render(&self) -> String {
        match self {
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Number(n) if n.fract() == 0.0 => format!("{}", *n as i64),
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Text(t) => t.clone(),
        }
    }
}

/// One declared configuration field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigurationField {
    /// Stable key, also the basis of the generated environment name.
    pub key: String,
    pub label: String,
    /// Group label for wizard sections and env file grouping.
    pub group: String,
    pub kind: FieldKind,
    pub default: FieldValue,
    #[serde(default)]
    pub required: bool,
    /// Profile ids this field is collected for.
    pub visible_for: Vec<String>,
    /// Deprecated fields are excluded from every schema.
    #[serde(default)]
    pub deprecated: bool,
    /// Frontend-only fields never reach the Backend audience.
    #[serde(default)]
    pub frontend_only: bool,
}

impl ConfigurationField {
    /// Environment variable name for this field.
    pub fn env_key(&self) -> String {
        self.key.to_uppercase().replace('-', "_")
    }

    /// Check a collected value against the declared kind.
    pub fn validate_value(&self, value: &serde_json::Value) -> Result<FieldValue, String> {
        match &self.kind {
            FieldKind::Bool => value
                .as_bool()
                .map(FieldValue::Bool)
                .ok_or_else(|| format!("expected a boolean, got {}", value)),
            FieldKind::Number { min, max } => {
                let n = value
                    .as_f64()
                    .ok_or_else(|| format!("expected a number, got {}", value))?;
                if let Some(min) = min {
                    if n < *min {
                        return Err(format!("{} is below the minimum {}", n, min));
                    }
                }
                if let Some(max) = max {
                    if n > *max {
                        return Err(format!("{} is above the maximum {}", n, max));
                    }
                }
                Ok(FieldValue::Number(n))
            }
            FieldKind::Text { pattern } => {
                let s = value
                    .as_str()
                    .ok_or_else(|| format!("expected a string, got {}", value))?;
                if let Some(pattern) = pattern {
                    // Registry construction verified the pattern compiles.
                    let re = Regex::new(pattern)
                        .map_err(|e| format!("invalid pattern '{}': {}", pattern, e))?;
                    if !re.is_match(s) {
                        return Err(format!("'{}' does not match pattern '{}'", s, pattern));
                    }
                }
                Ok(FieldValue::Text(s.to_string()))
            }
            FieldKind::Enum { options } => {
                let s = value
                    .as_str()
                    .ok_or_else(|| format!("expected a string, got {}", value))?;
                if !options.iter().any(|o| o == s) {
                    return Err(format!("'{}' is not one of {:?}", s, options));
                }
                Ok(FieldValue::Text(s.to_string()))
            }
        }
    }
}

/// Per-group counters for wizard section headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub struct GroupSummary {
    pub fields: usize,
    pub required: usize,
}

/// Declaration-ordered field table.
#[derive(Debug, Clone)]
pub struct FieldRegistry {
    fields: Vec<ConfigurationField>,
}

impl FieldRegistry {
    /// Build a registry, checking keys are unique, visibility ids exist in
    /// the catalog, and text patterns compile.
    pub fn new(catalog: &Catalog, fields: Vec<ConfigurationField>) -> ForgeResult<Self> {
        let mut keys = HashSet::new();
        for field in &fields {
            if !keys.insert(field.key.as_str()) {
                return Err(ForgeError::FieldRegistryError(format!(
                    "Duplicate field key '{}'",
                    field.key
                )));
            }
            for id in &field.visible_for {
                if !catalog.contains(id) {
                    return Err(ForgeError::FieldRegistryError(format!(
                        "Field '{}' is visible for unknown profile '{}'",
                        field.key, id
                    )));
                }
            }
            if let FieldKind::Text { pattern: Some(pattern) } = &field.kind {
                Regex::new(pattern).map_err(|e| {
                    ForgeError::FieldRegistryError(format!(
                        "Field '{}' has an invalid pattern: {}",
                        field.key, e
                    ))
                })?;
            }
        }
        Ok(Self { fields })
    }

    /// The shipped field table for the built-in catalog.
    pub fn builtin(catalog: &Catalog) -> ForgeResult<Self> {
        Self::new(catalog, registry::builtin_fields())
    }

    pub fn fields(&self) -> &[ConfigurationField] {
        &self.fields
    }

    pub fn get(&self, key: &str) -> Option<&ConfigurationField> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// Fields to collect for a selection, in declaration order.
    ///
    /// The ordering never depends on the order ids were passed in, so the
    /// same selection always yields the same schema.
    pub fn schema<I, S>(
        &self,
        catalog: &Catalog,
        selection: I,
        audience: Audience,
    ) -> Vec<&ConfigurationField>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let resolved: HashSet<String> = catalog.migrate_ids(selection).into_iter().collect();
        self.fields
            .iter()
            .filter(|f| !f.deprecated)
            .filter(|f| audience == Audience::Display || !f.frontend_only)
            .filter(|f| f.visible_for.iter().any(|id| resolved.contains(id)))
            .collect()
    }

    /// Per-group field counts for the backend schema of a selection.
    pub fn summarize<I, S>(&self, catalog: &Catalog, selection: I) -> BTreeMap<String, GroupSummary>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut groups: BTreeMap<String, GroupSummary> = BTreeMap::new();
        for field in self.schema(catalog, selection, Audience::Backend) {
            let entry = groups.entry(field.group.clone()).or_default();
            entry.fields += 1;
            if field.required {
                entry.required += 1;
            }
        }
        groups
    }

    /// Apply the schema inclusion rule to an already-collected value map.
    ///
    /// Keys without a matching schema field are dropped, so a Backend
    /// consumer never sees frontend-only or stale keys.
    pub fn filter_for_audience<I, S>(
        &self,
        catalog: &Catalog,
        values: &HashMap<String, serde_json::Value>,
        selection: I,
        audience: Audience,
    ) -> HashMap<String, serde_json::Value>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed: HashSet<&str> = self
            .schema(catalog, selection, audience)
            .into_iter()
            .map(|f| f.key.as_str())
            .collect();
        values
            .iter()
            .filter(|(key, _)| allowed.contains(key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}
