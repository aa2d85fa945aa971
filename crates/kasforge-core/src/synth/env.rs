//! Environment file rendering
//!
//! One `KEY=VALUE` pair per line, grouped by profile with a comment header
//! per group. A field visible to several selected profiles is emitted once,
//! under the first such profile in declaration order. Values are the plain
//! ASCII renderings of validated field values; nothing here needs quoting.

use std::collections::HashMap;

use crate::catalog::ProfileDefinition;
use crate::fields::{ConfigurationField, FieldValue};

/// Render grouped environment text.
///
/// `endpoints` carries the per-profile endpoint decisions, already in
/// environment-key form.
pub fn render(
    profiles: &[&ProfileDefinition],
    schema: &[&ConfigurationField],
    values: &HashMap<String, FieldValue>,
    endpoints: &HashMap<String, Vec<(String, String)>>,
) -> String {
    let mut out = String::from("# Generated by kasforge. Do not edit by hand.\n");

    for profile in profiles {
        let mut lines = Vec::new();

        for field in schema {
            let owner = profiles
                .iter()
                .find(|p| field.visible_for.contains(&p.id))
                .map(|p| p.id.as_str());
            if owner != Some(profile.id.as_str()) {
                continue;
            }
            let rendered = values
                .get(&field.key)
                .unwrap_or(&field.default)
                .render();
            lines.push(format!("{}={}", field.env_key(), rendered));
        }

        if let Some(decisions) = endpoints.get(&profile.id) {
            for (key, value) in decisions {
                lines.push(format!("{}={}", key, value));
            }
        }

        if lines.is_empty() {
            continue;
        }
        out.push_str(&format!("\n# --- {} ---\n", profile.id));
        for line in lines {
            out.push_str(&line);
            out.push('\n');
        }
    }

    out
}
