//! Built-in Kaspa stack catalog
//!
//! The shipped profile table. Definitions live in Rust rather than a data
//! file so that typos in ids, service names, and alias targets fail the
//! construction checks in [`super::Catalog::new`] during tests instead of at
//! an operator's first run.
//!
//! Alias target ordering is contractual: the first target of a fan-out is
//! the one single-id lookups resolve to.

use super::types::{
    EndpointBinding, LegacyAlias, ProfileCategory, ProfileConfig, ProfileDefinition,
    PrerequisiteMode, ResourceSpec, ServiceDescriptor,
};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn service(
    name: &str,
    image: &str,
    repository: &str,
    pinned_version: &str,
    startup_order: u32,
) -> ServiceDescriptor {
    ServiceDescriptor {
        name: name.to_string(),
        required: true,
        startup_order,
        image: image.to_string(),
        repository: repository.to_string(),
        pinned_version: pinned_version.to_string(),
    }
}

fn endpoint(key: &str, companion: &str, local: &str, public: &str) -> EndpointBinding {
    EndpointBinding {
        key: key.to_string(),
        companion: companion.to_string(),
        local: local.to_string(),
        public: public.to_string(),
    }
}

/// Profile definitions in declaration order.
///
/// Declaration order is load-bearing: it fixes field-schema ordering and the
/// order services appear in generated artifacts.
pub fn builtin_profiles() -> Vec<ProfileDefinition> {
    vec![
        ProfileDefinition {
            id: "kaspa-node".to_string(),
            name: "Kaspa Node".to_string(),
            description: "Pruning rusty-kaspa node with gRPC and wRPC endpoints".to_string(),
            category: ProfileCategory::Node,
            use_cases: strings(&["node", "mining", "apps"]),
            tags: strings(&["kaspad", "p2p"]),
            services: vec![service(
                "kaspad",
                "supertypo/rusty-kaspad",
                "kaspanet/rusty-kaspa",
                "v1.0.1",
                0,
            )],
            depends_on: vec![],
            conflicts_with: strings(&["kaspa-node-archive"]),
            prerequisites: vec![],
            prerequisites_mode: PrerequisiteMode::All,
            resources: ResourceSpec {
                memory_mb: 8192,
                cpu_cores: 2.0,
                disk_gb: 80,
            },
            ports: vec![16110, 16111, 17110],
            config: ProfileConfig::default(),
        },
        ProfileDefinition {
            id: "kaspa-node-archive".to_string(),
            name: "Kaspa Archive Node".to_string(),
            description: "Non-pruning node retaining full chain history".to_string(),
            category: ProfileCategory::Node,
            use_cases: strings(&["node", "explorer"]),
            tags: strings(&["kaspad", "p2p", "archival"]),
            services: vec![service(
                "kaspad-archive",
                "supertypo/rusty-kaspad",
                "kaspanet/rusty-kaspa",
                "v1.0.1",
                0,
            )],
            depends_on: vec![],
            conflicts_with: strings(&["kaspa-node"]),
            prerequisites: vec![],
            prerequisites_mode: PrerequisiteMode::All,
            resources: ResourceSpec {
                memory_mb: 16384,
                cpu_cores: 4.0,
                disk_gb: 700,
            },
            ports: vec![16110, 16111, 17110],
            config: ProfileConfig::default(),
        },
        ProfileDefinition {
            id: "kaspa-stratum".to_string(),
            name: "Stratum Bridge".to_string(),
            description: "Stratum endpoint bridging ASIC miners to the local node".to_string(),
            category: ProfileCategory::Mining,
            use_cases: strings(&["mining"]),
            tags: strings(&["stratum", "asic"]),
            services: vec![service(
                "kaspa-stratum",
                "onemorebsmith/kaspa-stratum-bridge",
                "onemorebsmith/kaspa-stratum-bridge",
                "v1.2.0",
                0,
            )],
            depends_on: strings(&["kaspa-node"]),
            conflicts_with: vec![],
            prerequisites: vec![],
            prerequisites_mode: PrerequisiteMode::All,
            resources: ResourceSpec {
                memory_mb: 256,
                cpu_cores: 0.5,
                disk_gb: 1,
            },
            ports: vec![5555],
            config: ProfileConfig::default(),
        },
        ProfileDefinition {
            id: "kasia-indexer".to_string(),
            name: "Kasia Indexer".to_string(),
            description: "Message indexer backing the Kasia messenger".to_string(),
            category: ProfileCategory::Indexer,
            use_cases: strings(&["apps"]),
            tags: strings(&["kasia", "indexer"]),
            services: vec![service(
                "kasia-indexer",
                "kasia-im/kasia-indexer",
                "kasia-im/kasia-indexer",
                "v0.9.3",
                0,
            )],
            depends_on: strings(&["kaspa-node"]),
            conflicts_with: vec![],
            prerequisites: vec![],
            prerequisites_mode: PrerequisiteMode::All,
            resources: ResourceSpec {
                memory_mb: 1024,
                cpu_cores: 1.0,
                disk_gb: 20,
            },
            ports: vec![8787],
            config: ProfileConfig::default(),
        },
        ProfileDefinition {
            id: "kasia-app".to_string(),
            name: "Kasia Messenger".to_string(),
            description: "End-to-end encrypted messenger on Kaspa".to_string(),
            category: ProfileCategory::App,
            use_cases: strings(&["apps"]),
            tags: strings(&["kasia", "web"]),
            services: vec![service(
                "kasia-web",
                "kasia-im/kasia",
                "kasia-im/kasia",
                "v1.4.0",
                0,
            )],
            depends_on: vec![],
            conflicts_with: vec![],
            prerequisites: vec![],
            prerequisites_mode: PrerequisiteMode::All,
            resources: ResourceSpec {
                memory_mb: 256,
                cpu_cores: 0.5,
                disk_gb: 1,
            },
            ports: vec![3001],
            config: ProfileConfig {
                is_bundle: false,
                bundled_services: vec![],
                endpoints: vec![endpoint(
                    "KASIA_INDEXER_URL",
                    "kasia-indexer",
                    "http://kasia-indexer:8787",
                    "https://indexer.kasia.fyi",
                )],
            },
        },
        ProfileDefinition {
            id: "k-social-app".to_string(),
            name: "K-Social".to_string(),
            description: "Social feed app with its own bundled indexer".to_string(),
            category: ProfileCategory::App,
            use_cases: strings(&["apps"]),
            tags: strings(&["k-social", "web"]),
            services: vec![
                service(
                    "k-social-indexer",
                    "k-social/k-social-indexer",
                    "k-social/k-social-indexer",
                    "v0.5.1",
                    0,
                ),
                service(
                    "k-social-web",
                    "k-social/k-social",
                    "k-social/k-social",
                    "v0.8.0",
                    1,
                ),
            ],
            depends_on: strings(&["kaspa-node"]),
            conflicts_with: vec![],
            prerequisites: vec![],
            prerequisites_mode: PrerequisiteMode::All,
            resources: ResourceSpec {
                memory_mb: 1536,
                cpu_cores: 1.0,
                disk_gb: 30,
            },
            ports: vec![3002, 8585],
            config: ProfileConfig {
                is_bundle: true,
                bundled_services: strings(&["k-social-indexer", "k-social-web"]),
                endpoints: vec![endpoint(
                    "K_SOCIAL_INDEXER_URL",
                    "k-social-app",
                    "http://k-social-indexer:8585",
                    "https://api.ksocial.network",
                )],
            },
        },
        ProfileDefinition {
            id: "kaspa-explorer".to_string(),
            name: "Kaspa Explorer".to_string(),
            description: "Block explorer frontend".to_string(),
            category: ProfileCategory::Explorer,
            use_cases: strings(&["explorer"]),
            tags: strings(&["explorer", "web"]),
            services: vec![service(
                "kaspa-explorer",
                "supertypo/kaspa-explorer",
                "lAmeR1/kaspa-explorer",
                "v2.1.0",
                0,
            )],
            depends_on: vec![],
            conflicts_with: vec![],
            // Works against either node flavor, so one of the two is enough.
            prerequisites: strings(&["kaspa-node", "kaspa-node-archive"]),
            prerequisites_mode: PrerequisiteMode::Any,
            resources: ResourceSpec {
                memory_mb: 512,
                cpu_cores: 0.5,
                disk_gb: 2,
            },
            ports: vec![4000],
            config: ProfileConfig {
                is_bundle: false,
                bundled_services: vec![],
                endpoints: vec![
                    endpoint(
                        "EXPLORER_NODE_WRPC_URL",
                        "kaspa-node",
                        "ws://kaspad:17110",
                        "wss://node.kaspa.ws",
                    ),
                    endpoint(
                        "EXPLORER_NODE_WRPC_URL",
                        "kaspa-node-archive",
                        "ws://kaspad-archive:17110",
                        "wss://node.kaspa.ws",
                    ),
                ],
            },
        },
        ProfileDefinition {
            id: "kaspa-dashboard".to_string(),
            name: "Stack Dashboard".to_string(),
            description: "Operator dashboard for the installed stack".to_string(),
            category: ProfileCategory::Monitoring,
            use_cases: strings(&["node", "mining", "apps", "explorer"]),
            tags: strings(&["monitoring", "web"]),
            services: vec![service(
                "kasboard",
                "kasforge/kasboard",
                "kasforge/kasboard",
                "v0.3.2",
                0,
            )],
            depends_on: vec![],
            conflicts_with: vec![],
            prerequisites: vec![],
            prerequisites_mode: PrerequisiteMode::All,
            resources: ResourceSpec {
                memory_mb: 256,
                cpu_cores: 0.25,
                disk_gb: 1,
            },
            ports: vec![3100],
            config: ProfileConfig::default(),
        },
    ]
}

/// Alias table for the retired coarse taxonomy.
pub fn builtin_aliases() -> Vec<LegacyAlias> {
    vec![
        LegacyAlias {
            legacy_id: "core".to_string(),
            targets: strings(&["kaspa-node"]),
        },
        LegacyAlias {
            legacy_id: "archive".to_string(),
            targets: strings(&["kaspa-node-archive"]),
        },
        LegacyAlias {
            legacy_id: "mining".to_string(),
            targets: strings(&["kaspa-stratum"]),
        },
        // The old "kasia" id installed the app and its indexer together;
        // the app comes first so single-id lookups land on it.
        LegacyAlias {
            legacy_id: "kasia".to_string(),
            targets: strings(&["kasia-app", "kasia-indexer"]),
        },
        LegacyAlias {
            legacy_id: "social".to_string(),
            targets: strings(&["k-social-app"]),
        },
        LegacyAlias {
            legacy_id: "explorer".to_string(),
            targets: strings(&["kaspa-explorer"]),
        },
    ]
}
