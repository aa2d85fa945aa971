//! Catalog construction and migration tests

use super::types::*;
use super::Catalog;

fn minimal_profile(id: &str) -> ProfileDefinition {
    ProfileDefinition {
        id: id.to_string(),
        name: id.to_string(),
        description: String::new(),
        category: ProfileCategory::App,
        use_cases: vec![],
        tags: vec![],
        services: vec![ServiceDescriptor {
            name: format!("{}-svc", id),
            required: true,
            startup_order: 0,
            image: format!("example/{}", id),
            repository: format!("example/{}", id),
            pinned_version: "v1.0.0".to_string(),
        }],
        depends_on: vec![],
        conflicts_with: vec![],
        prerequisites: vec![],
        prerequisites_mode: PrerequisiteMode::All,
        resources: ResourceSpec {
            memory_mb: 128,
            cpu_cores: 0.5,
            disk_gb: 1,
        },
        ports: vec![],
        config: ProfileConfig::default(),
    }
}

#[test]
fn test_builtin_catalog_constructs() {
    let catalog = Catalog::builtin().unwrap();
    assert!(catalog.contains("kaspa-node"));
    assert!(catalog.contains("kaspa-stratum"));
    assert!(!catalog.contains("core"));
}

#[test]
fn test_builtin_conflicts_are_symmetric() {
    let catalog = Catalog::builtin().unwrap();
    for profile in catalog.profiles() {
        for other_id in &profile.conflicts_with {
            let other = catalog.get(other_id).unwrap();
            assert!(
                other.conflicts_with.contains(&profile.id),
                "conflict {} -> {} has no reverse entry",
                profile.id,
                other_id
            );
        }
    }
}

#[test]
fn test_duplicate_id_rejected() {
    let result = Catalog::new(vec![minimal_profile("a"), minimal_profile("a")], vec![]);
    assert!(result.is_err());
}

#[test]
fn test_duplicate_service_name_rejected() {
    let mut a = minimal_profile("a");
    let mut b = minimal_profile("b");
    a.services[0].name = "shared".to_string();
    b.services[0].name = "shared".to_string();
    let result = Catalog::new(vec![a, b], vec![]);
    assert!(result.is_err());
}

#[test]
fn test_self_dependency_rejected() {
    let mut a = minimal_profile("a");
    a.depends_on = vec!["a".to_string()];
    assert!(Catalog::new(vec![a], vec![]).is_err());
}

#[test]
fn test_unknown_dependency_rejected() {
    let mut a = minimal_profile("a");
    a.depends_on = vec!["ghost".to_string()];
    assert!(Catalog::new(vec![a], vec![]).is_err());
}

#[test]
fn test_asymmetric_conflict_rejected() {
    let mut a = minimal_profile("a");
    a.conflicts_with = vec!["b".to_string()];
    let b = minimal_profile("b");
    assert!(Catalog::new(vec![a, b], vec![]).is_err());
}

#[test]
fn test_bundle_with_unknown_service_rejected() {
    let mut a = minimal_profile("a");
    a.config.is_bundle = true;
    a.config.bundled_services = vec!["nope".to_string()];
    assert!(Catalog::new(vec![a], vec![]).is_err());
}

#[test]
fn test_bundled_services_without_bundle_flag_rejected() {
    let mut a = minimal_profile("a");
    a.config.bundled_services = vec!["a-svc".to_string()];
    assert!(Catalog::new(vec![a], vec![]).is_err());
}

#[test]
fn test_alias_targeting_unknown_profile_rejected() {
    let alias = LegacyAlias {
        legacy_id: "old".to_string(),
        targets: vec!["ghost".to_string()],
    };
    assert!(Catalog::new(vec![minimal_profile("a")], vec![alias]).is_err());
}

#[test]
fn test_alias_colliding_with_current_id_rejected() {
    let alias = LegacyAlias {
        legacy_id: "a".to_string(),
        targets: vec!["a".to_string()],
    };
    assert!(Catalog::new(vec![minimal_profile("a")], vec![alias]).is_err());
}

#[test]
fn test_get_accepts_legacy_id() {
    let catalog = Catalog::builtin().unwrap();
    assert_eq!(catalog.get("core").unwrap().id, "kaspa-node");
    // Fan-out lookups land on the first target.
    assert_eq!(catalog.get("kasia").unwrap().id, "kasia-app");
    assert!(catalog.get("no-such-profile").is_none());
}

#[test]
fn test_migrate_ids_matches_retired_taxonomy() {
    let catalog = Catalog::builtin().unwrap();
    let forward = catalog.migrate_ids(["core", "mining"]);
    let reversed = catalog.migrate_ids(["mining", "core"]);
    let expected: std::collections::HashSet<&str> =
        ["kaspa-node", "kaspa-stratum"].into_iter().collect();
    assert_eq!(
        forward.iter().map(String::as_str).collect::<std::collections::HashSet<_>>(),
        expected
    );
    assert_eq!(
        reversed.iter().map(String::as_str).collect::<std::collections::HashSet<_>>(),
        expected
    );
    assert_eq!(catalog.migrate_ids(&forward), forward);
}

#[test]
fn test_recommend_preserves_declaration_order() {
    let catalog = Catalog::builtin().unwrap();
    let mining: Vec<&str> = catalog
        .recommend("mining")
        .iter()
        .map(|p| p.id.as_str())
        .collect();
    assert_eq!(mining, vec!["kaspa-node", "kaspa-stratum", "kaspa-dashboard"]);
}

#[test]
fn test_in_declaration_order_ignores_input_order() {
    let catalog = Catalog::builtin().unwrap();
    let ids = vec![
        "kaspa-stratum".to_string(),
        "kaspa-node".to_string(),
        "ghost".to_string(),
    ];
    let ordered: Vec<&str> = catalog
        .in_declaration_order(&ids)
        .iter()
        .map(|p| p.id.as_str())
        .collect();
    assert_eq!(ordered, vec!["kaspa-node", "kaspa-stratum"]);
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    fn arbitrary_id() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("kaspa-node".to_string()),
            Just("kaspa-stratum".to_string()),
            Just("kasia-app".to_string()),
            Just("core".to_string()),
            Just("mining".to_string()),
            Just("kasia".to_string()),
            Just("explorer".to_string()),
            Just("unknown-profile".to_string()),
        ]
    }

    proptest! {
        #[test]
        fn migration_is_idempotent(ids in proptest::collection::vec(arbitrary_id(), 0..12)) {
            let catalog = Catalog::builtin().unwrap();
            let once = catalog.migrate_ids(&ids);
            let twice = catalog.migrate_ids(&once);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn migration_output_has_no_duplicates(ids in proptest::collection::vec(arbitrary_id(), 0..12)) {
            let catalog = Catalog::builtin().unwrap();
            let migrated = catalog.migrate_ids(&ids);
            let unique: std::collections::HashSet<&String> = migrated.iter().collect();
            prop_assert_eq!(unique.len(), migrated.len());
        }
    }
}
