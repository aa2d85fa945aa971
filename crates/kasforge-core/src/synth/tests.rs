//! Synthesis integration tests
//!
//! All tests run against deterministic fake release sources so artifact
//! text can be compared byte for byte.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use super::*;
use crate::catalog::Catalog;
use crate::errors::{ForgeError, ForgeResult};

struct StaticSource {
    tag: String,
}

#[async_trait]
impl ReleaseMetadataSource for StaticSource {
    async fn latest_tag(&self, _repository: &str) -> ForgeResult<String> {
        Ok(self.tag.clone())
    }
}

struct FailingSource;

#[async_trait]
impl ReleaseMetadataSource for FailingSource {
    async fn latest_tag(&self, repository: &str) -> ForgeResult<String> {
        Err(ForgeError::ReleaseLookupError {
            repository: repository.to_string(),
            message: "unreachable".to_string(),
        })
    }
}

struct CountingSource {
    calls: AtomicUsize,
}

#[async_trait]
impl ReleaseMetadataSource for CountingSource {
    async fn latest_tag(&self, _repository: &str) -> ForgeResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(30)).await;
        Ok("v7.7.7".to_string())
    }
}

fn synthesizer(source: Arc<dyn ReleaseMetadataSource>) -> Synthesizer {
    let catalog = Arc::new(Catalog::builtin().unwrap());
    let registry = Arc::new(FieldRegistry::builtin(&catalog).unwrap());
    Synthesizer::new(catalog, registry, VersionResolver::new(source))
}

fn ids(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn mining_address() -> String {
    format!("kaspa:{}", "q".repeat(61))
}

#[tokio::test]
async fn test_kasia_endpoint_uses_public_default_alone() {
    let synth = synthesizer(Arc::new(StaticSource { tag: "v2.0.0".to_string() }));
    let artifact = synth.synthesize(&ids(&["kasia-app"]), &HashMap::new()).await;
    assert!(artifact
        .env
        .contains("KASIA_INDEXER_URL=https://indexer.kasia.fyi\n"));
    assert!(artifact.errors.is_empty());
}

#[tokio::test]
async fn test_kasia_endpoint_uses_local_with_companion() {
    let synth = synthesizer(Arc::new(StaticSource { tag: "v2.0.0".to_string() }));
    let artifact = synth
        .synthesize(&ids(&["kasia-app", "kasia-indexer", "kaspa-node"]), &HashMap::new())
        .await;
    assert!(artifact
        .env
        .contains("KASIA_INDEXER_URL=http://kasia-indexer:8787\n"));
}

#[tokio::test]
async fn test_endpoint_choice_ignores_selection_order() {
    let synth = synthesizer(Arc::new(StaticSource { tag: "v2.0.0".to_string() }));
    let forward = synth
        .synthesize(&ids(&["kasia-app", "kasia-indexer", "kaspa-node"]), &HashMap::new())
        .await;
    let reversed = synth
        .synthesize(&ids(&["kaspa-node", "kasia-indexer", "kasia-app"]), &HashMap::new())
        .await;
    assert_eq!(forward.env, reversed.env);
    assert_eq!(forward.compose, reversed.compose);
}

#[tokio::test]
async fn test_explorer_endpoint_follows_node_flavor() {
    let synth = synthesizer(Arc::new(StaticSource { tag: "v2.0.0".to_string() }));

    let with_pruning = synth
        .synthesize(&ids(&["kaspa-explorer", "kaspa-node"]), &HashMap::new())
        .await;
    assert!(with_pruning
        .env
        .contains("EXPLORER_NODE_WRPC_URL=ws://kaspad:17110\n"));

    let with_archive = synth
        .synthesize(&ids(&["kaspa-explorer", "kaspa-node-archive"]), &HashMap::new())
        .await;
    assert!(with_archive
        .env
        .contains("EXPLORER_NODE_WRPC_URL=ws://kaspad-archive:17110\n"));

    let alone = synth
        .synthesize(&ids(&["kaspa-explorer"]), &HashMap::new())
        .await;
    assert!(alone
        .env
        .contains("EXPLORER_NODE_WRPC_URL=wss://node.kaspa.ws\n"));
}

#[tokio::test]
async fn test_synthesis_is_deterministic_with_warmed_cache() {
    let synth = synthesizer(Arc::new(StaticSource { tag: "v2.0.0".to_string() }));
    let values = HashMap::from([("stratum_mining_address".to_string(), json!(mining_address()))]);
    let selection = ids(&["kaspa-node", "kaspa-stratum", "kasia-app"]);

    let first = synth.synthesize(&selection, &values).await;
    let second = synth.synthesize(&selection, &values).await;
    assert_eq!(first.compose, second.compose);
    assert_eq!(first.env, second.env);
    assert_eq!(first.versions, second.versions);
}

#[tokio::test]
async fn test_lookup_failure_degrades_to_pinned_versions() {
    let synth = synthesizer(Arc::new(FailingSource));
    let artifact = synth.synthesize(&ids(&["kaspa-node"]), &HashMap::new()).await;
    assert!(artifact.compose.contains("supertypo/rusty-kaspad:v1.0.1"));
    assert_eq!(
        artifact.versions.get("kaspanet/rusty-kaspa"),
        Some(&"v1.0.1".to_string())
    );
    // Operational failure, not a finding.
    assert!(artifact.errors.is_empty());
}

#[tokio::test]
async fn test_resolved_tags_flow_into_images() {
    let synth = synthesizer(Arc::new(StaticSource { tag: "v9.9.9".to_string() }));
    let artifact = synth.synthesize(&ids(&["kaspa-node"]), &HashMap::new()).await;
    assert!(artifact.compose.contains("supertypo/rusty-kaspad:v9.9.9"));
    assert_eq!(
        artifact.versions.get("kaspanet/rusty-kaspa"),
        Some(&"v9.9.9".to_string())
    );
}

#[tokio::test]
async fn test_bundle_emits_all_services_under_bundle_tag() {
    let synth = synthesizer(Arc::new(StaticSource { tag: "v2.0.0".to_string() }));
    let artifact = synth
        .synthesize(&ids(&["kaspa-node", "k-social-app"]), &HashMap::new())
        .await;

    let doc: serde_yaml::Value = serde_yaml::from_str(&artifact.compose).unwrap();
    let services = &doc["services"];

    for name in ["k-social-indexer", "k-social-web"] {
        assert_eq!(
            services[name]["profiles"][0].as_str(),
            Some("k-social-app"),
            "{} must carry the bundle's profile tag",
            name
        );
    }
    // Startup order becomes a chain: web waits for the bundled indexer.
    assert_eq!(
        services["k-social-web"]["depends_on"][0].as_str(),
        Some("k-social-indexer")
    );
}

#[tokio::test]
async fn test_profile_dependency_links_first_services() {
    let synth = synthesizer(Arc::new(StaticSource { tag: "v2.0.0".to_string() }));
    let values = HashMap::from([("stratum_mining_address".to_string(), json!(mining_address()))]);
    let artifact = synth
        .synthesize(&ids(&["kaspa-node", "kaspa-stratum"]), &values)
        .await;

    let doc: serde_yaml::Value = serde_yaml::from_str(&artifact.compose).unwrap();
    assert_eq!(
        doc["services"]["kaspa-stratum"]["depends_on"][0].as_str(),
        Some("kaspad")
    );
    // The k-social indexer chain depends on nothing outside its profile.
    assert!(doc["services"]["kaspad"]["depends_on"].is_null() || {
        doc["services"]["kaspad"]["depends_on"]
            .as_sequence()
            .map(|s| s.is_empty())
            .unwrap_or(false)
    });
}

#[tokio::test]
async fn test_invalid_required_field_skips_owning_service() {
    let synth = synthesizer(Arc::new(StaticSource { tag: "v2.0.0".to_string() }));
    let values = HashMap::from([(
        "stratum_mining_address".to_string(),
        json!("not-an-address"),
    )]);
    let artifact = synth
        .synthesize(&ids(&["kaspa-node", "kaspa-stratum"]), &values)
        .await;

    assert!(artifact.errors.iter().any(|e| matches!(
        e,
        crate::resolver::ValidationError::FieldValidation { field, .. }
            if field == "stratum_mining_address"
    )));
    assert!(!artifact.compose.contains("kaspa-stratum"));
    assert!(!artifact.env.contains("# --- kaspa-stratum ---"));
    // The node is unaffected.
    assert!(artifact.compose.contains("kaspad"));
}

#[tokio::test]
async fn test_missing_required_field_skips_owning_service() {
    let synth = synthesizer(Arc::new(StaticSource { tag: "v2.0.0".to_string() }));
    let artifact = synth
        .synthesize(&ids(&["kaspa-node", "kaspa-stratum"]), &HashMap::new())
        .await;
    assert!(!artifact.compose.contains("kaspa-stratum"));
    assert_eq!(artifact.errors.len(), 1);
}

#[tokio::test]
async fn test_invalid_optional_field_falls_back_with_warning() {
    let synth = synthesizer(Arc::new(StaticSource { tag: "v2.0.0".to_string() }));
    let values = HashMap::from([("node_rpc_port".to_string(), json!("eighty"))]);
    let artifact = synth.synthesize(&ids(&["kaspa-node"]), &values).await;

    assert!(artifact.errors.is_empty());
    assert!(artifact.warnings.iter().any(|w| matches!(
        w,
        crate::resolver::ValidationWarning::FieldDefaulted { field } if field == "node_rpc_port"
    )));
    assert!(artifact.env.contains("NODE_RPC_PORT=16110\n"));
    assert!(artifact.compose.contains("kaspad"));
}

#[tokio::test]
async fn test_legacy_value_names_are_normalized() {
    let synth = synthesizer(Arc::new(StaticSource { tag: "v2.0.0".to_string() }));
    let values = HashMap::from([
        ("stratum_mining_address".to_string(), json!(mining_address())),
        ("var_diff".to_string(), json!(true)),
    ]);
    let artifact = synth
        .synthesize(&ids(&["kaspa-node", "kaspa-stratum"]), &values)
        .await;

    assert!(artifact.env.contains("STRATUM_VAR_DIFF=true\n"));
    // The retired toggle forced the extranonce subscription along.
    assert!(artifact.env.contains("STRATUM_EXTRANONCE=true\n"));
}

#[tokio::test]
async fn test_current_value_names_win_over_legacy() {
    let synth = synthesizer(Arc::new(StaticSource { tag: "v2.0.0".to_string() }));
    let values = HashMap::from([
        ("stratum_mining_address".to_string(), json!(mining_address())),
        ("stratum_var_diff".to_string(), json!(false)),
        ("var_diff".to_string(), json!(true)),
    ]);
    let artifact = synth
        .synthesize(&ids(&["kaspa-node", "kaspa-stratum"]), &values)
        .await;

    assert!(artifact.env.contains("STRATUM_VAR_DIFF=false\n"));
    assert!(artifact.env.contains("STRATUM_EXTRANONCE=false\n"));
}

#[tokio::test]
async fn test_versions_cover_only_emitted_services() {
    let synth = synthesizer(Arc::new(StaticSource { tag: "v2.0.0".to_string() }));
    // No mining address, so the stratum profile is skipped entirely.
    let artifact = synth
        .synthesize(&ids(&["kaspa-node", "kaspa-stratum"]), &HashMap::new())
        .await;
    assert!(artifact.versions.contains_key("kaspanet/rusty-kaspa"));
    assert!(!artifact
        .versions
        .contains_key("onemorebsmith/kaspa-stratum-bridge"));
}

#[tokio::test]
async fn test_env_groups_by_profile_with_headers() {
    let synth = synthesizer(Arc::new(StaticSource { tag: "v2.0.0".to_string() }));
    let values = HashMap::from([("stratum_mining_address".to_string(), json!(mining_address()))]);
    let artifact = synth
        .synthesize(&ids(&["kaspa-stratum", "kaspa-node"]), &values)
        .await;

    let node_at = artifact.env.find("# --- kaspa-node ---").unwrap();
    let stratum_at = artifact.env.find("# --- kaspa-stratum ---").unwrap();
    assert!(node_at < stratum_at, "groups follow declaration order");
    assert!(artifact.env.contains("NETWORK=mainnet\n"));
    assert!(artifact.env.contains("STRATUM_PORT=5555\n"));
}

#[tokio::test]
async fn test_unknown_profile_is_skipped_quietly() {
    let synth = synthesizer(Arc::new(StaticSource { tag: "v2.0.0".to_string() }));
    let artifact = synth
        .synthesize(&ids(&["kaspa-node", "flux-capacitor"]), &HashMap::new())
        .await;
    assert!(artifact.compose.contains("kaspad"));
    assert!(!artifact.compose.contains("flux-capacitor"));
}

#[tokio::test]
async fn test_concurrent_synthesis_coalesces_lookups() {
    let source = Arc::new(CountingSource {
        calls: AtomicUsize::new(0),
    });
    let catalog = Arc::new(Catalog::builtin().unwrap());
    let registry = Arc::new(FieldRegistry::builtin(&catalog).unwrap());
    let synth = Arc::new(Synthesizer::new(
        catalog,
        registry,
        VersionResolver::new(source.clone()),
    ));

    let tasks = (0..8).map(|_| {
        let synth = synth.clone();
        tokio::spawn(async move {
            synth.synthesize(&ids(&["kaspa-node"]), &HashMap::new()).await
        })
    });
    for task in futures_util::future::join_all(tasks).await {
        let artifact = task.unwrap();
        assert!(artifact.compose.contains("supertypo/rusty-kaspad:v7.7.7"));
    }
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
}
