//! Service document rendering
//!
//! Emits one compose-style document covering every selected profile. Each
//! service carries its owning profile id in a `profiles:` list, so a single
//! document expresses multiple installable subsets and the runtime starts
//! only the sections asked for. Rendering is purely positional: profiles in
//! catalog declaration order, services in startup order, so identical inputs
//! produce byte-identical text.

use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;

use crate::catalog::{ProfileDefinition, ServiceDescriptor};

/// First service in the startup sequence that is marked required.
fn first_required_service(profile: &ProfileDefinition) -> Option<&ServiceDescriptor> {
    services_in_startup_order(profile)
        .into_iter()
        .find(|s| s.required)
}

fn services_in_startup_order(profile: &ProfileDefinition) -> Vec<&ServiceDescriptor> {
    let mut services: Vec<&ServiceDescriptor> = profile.services.iter().collect();
    services.sort_by_key(|s| s.startup_order);
    services
}

fn yaml_str(value: &str) -> Value {
    Value::String(value.to_string())
}

/// Render the service document for the given profiles.
///
/// `versions` maps repository keys onto the tags to emit; repositories
/// absent from the map fall back to the service's pinned tag.
pub fn render(profiles: &[&ProfileDefinition], versions: &BTreeMap<String, String>) -> String {
    let emitted: Vec<&str> = profiles.iter().map(|p| p.id.as_str()).collect();

    let mut services = Mapping::new();
    for profile in profiles {
        let ordered = services_in_startup_order(profile);
        let mut previous: Option<&str> = None;
        for svc in ordered {
            let tag = versions
                .get(&svc.repository)
                .map(String::as_str)
                .unwrap_or(svc.pinned_version.as_str());

            let mut entry = Mapping::new();
            entry.insert(yaml_str("image"), yaml_str(&format!("{}:{}", svc.image, tag)));
            entry.insert(yaml_str("container_name"), yaml_str(&svc.name));
            entry.insert(yaml_str("restart"), yaml_str("unless-stopped"));
            entry.insert(
                yaml_str("profiles"),
                Value::Sequence(vec![yaml_str(&profile.id)]),
            );

            let mut depends = Vec::new();
            // Startup order becomes a chain between consecutive services.
            if let Some(previous) = previous {
                depends.push(yaml_str(previous));
            }
            if previous.is_none() {
                for dependency_id in &profile.depends_on {
                    if !emitted.contains(&dependency_id.as_str()) {
                        continue;
                    }
                    if let Some(dep_profile) =
                        profiles.iter().find(|p| &p.id == dependency_id)
                    {
                        if let Some(dep_svc) = first_required_service(dep_profile) {
                            depends.push(yaml_str(&dep_svc.name));
                        }
                    }
                }
            }
            if !depends.is_empty() {
                entry.insert(yaml_str("depends_on"), Value::Sequence(depends));
            }

            services.insert(yaml_str(&svc.name), Value::Mapping(entry));
            previous = Some(svc.name.as_str());
        }
    }

    let mut root = Mapping::new();
    root.insert(yaml_str("services"), Value::Mapping(services));

    let body = serde_yaml::to_string(&Value::Mapping(root))
        .unwrap_or_else(|e| format!("# render error: {}\n", e));
    format!("# Generated by kasforge. Do not edit by hand.\n{}", body)
}
