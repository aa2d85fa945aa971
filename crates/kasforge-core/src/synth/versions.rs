//! Upstream release version resolution
//!
//! Service images are tagged with the latest upstream release when it can be
//! fetched, and with the catalog's pinned tag when it cannot. Lookups go
//! through one injectable resolver object: a TTL cache in front of a
//! [`ReleaseMetadataSource`], with concurrent misses for the same key
//! coalesced into a single in-flight lookup. The lookup task is owned by the
//! resolver, not by any one caller, so an abandoned synthesis call never
//! cancels a fetch that other callers are still awaiting.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{watch, Mutex};

use crate::errors::{ForgeError, ForgeResult};

/// External `repository key -> latest tag` lookup.
#[async_trait]
pub trait ReleaseMetadataSource: Send + Sync {
    async fn latest_tag(&self, repository: &str) -> ForgeResult<String>;
}

/// Queries the GitHub releases API for `owner/repo` keys.
#[derive(Debug, Clone)]
pub struct GithubReleaseSource {
    client: Client,
}

impl GithubReleaseSource {
    pub fn new() -> ForgeResult<Self> {
        let client = Client::builder()
            .user_agent("kasforge/0.1.0")
            .build()
            .map_err(|e| ForgeError::SynthesisError(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

/// GitHub release API response, reduced to the field we use.
#[derive(Debug, Deserialize)]
struct GithubRelease {
    tag_name: String,
}

#[async_trait]
impl ReleaseMetadataSource for GithubReleaseSource {
    async fn latest_tag(&self, repository: &str) -> ForgeResult<String> {
        let url = format!("https://api.github.com/repos/{}/releases/latest", repository);
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ForgeError::ReleaseLookupError {
                repository: repository.to_string(),
                message: format!("GitHub API returned status {}", response.status()),
            });
        }
        let release: GithubRelease =
            response
                .json()
                .await
                .map_err(|e| ForgeError::ReleaseLookupError {
                    repository: repository.to_string(),
                    message: format!("Failed to parse release response: {}", e),
                })?;
        Ok(release.tag_name)
    }
}

enum Slot {
    Ready { tag: String, fresh_until: Instant },
    Pending(watch::Receiver<Option<String>>),
}

struct ResolverInner {
    source: Arc<dyn ReleaseMetadataSource>,
    slots: Mutex<HashMap<String, Slot>>,
    ttl: Duration,
    negative_ttl: Duration,
    lookup_timeout: Duration,
}

/// TTL cache with single-flight coalescing over a release source.
///
/// `resolve` never fails and never blocks on the network for a fresh cache
/// entry; the map lock is only ever held for map mutation, never across the
/// external call.
#[derive(Clone)]
pub struct VersionResolver {
    inner: Arc<ResolverInner>,
}

impl VersionResolver {
    pub fn new(source: Arc<dyn ReleaseMetadataSource>) -> Self {
        Self::with_timings(
            source,
            Duration::from_secs(30 * 60),
            Duration::from_secs(2 * 60),
            Duration::from_secs(5),
        )
    }

    /// Failed lookups are cached for `negative_ttl` so an unreachable
    /// upstream is not hammered on every synthesis call.
    pub fn with_timings(
        source: Arc<dyn ReleaseMetadataSource>,
        ttl: Duration,
        negative_ttl: Duration,
        lookup_timeout: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(ResolverInner {
                source,
                slots: Mutex::new(HashMap::new()),
                ttl,
                negative_ttl,
                lookup_timeout,
            }),
        }
    }

    /// Resolve the tag for `repository`, falling back to `pinned_fallback`
    /// on any lookup failure or timeout.
    pub async fn resolve(&self, repository: &str, pinned_fallback: &str) -> String {
        let mut rx = {
            let mut slots = self.inner.slots.lock().await;
            match slots.get(repository) {
                Some(Slot::Ready { tag, fresh_until }) if *fresh_until > Instant::now() => {
                    return tag.clone();
                }
                Some(Slot::Pending(rx)) => rx.clone(),
                _ => {
                    let (tx, rx) = watch::channel(None);
                    slots.insert(repository.to_string(), Slot::Pending(rx.clone()));
                    self.spawn_lookup(repository.to_string(), pinned_fallback.to_string(), tx);
                    rx
                }
            }
        };

        let resolved = match rx.wait_for(|value| value.is_some()).await {
            Ok(value) => (*value)
                .clone()
                .unwrap_or_else(|| pinned_fallback.to_string()),
            // The lookup task cannot complete anymore; degrade locally.
            Err(_) => pinned_fallback.to_string(),
        };
        resolved
    }

    fn spawn_lookup(&self, repository: String, fallback: String, tx: watch::Sender<Option<String>>) {
        let inner = self.inner.clone();
        tokio::spawn(async move {
            let outcome =
                tokio::time::timeout(inner.lookup_timeout, inner.source.latest_tag(&repository))
                    .await;
            let (tag, ttl) = match outcome {
                Ok(Ok(tag)) => {
                    log::debug!("Resolved '{}' to release {}", repository, tag);
                    (tag, inner.ttl)
                }
                Ok(Err(e)) => {
                    log::warn!(
                        "Release lookup for '{}' failed: {}; using pinned {}",
                        repository,
                        e,
                        fallback
                    );
                    (fallback, inner.negative_ttl)
                }
                Err(_) => {
                    log::warn!(
                        "Release lookup for '{}' timed out; using pinned {}",
                        repository,
                        fallback
                    );
                    (fallback, inner.negative_ttl)
                }
            };

            let mut slots = inner.slots.lock().await;
            slots.insert(
                repository,
                Slot::Ready {
                    tag: tag.clone(),
                    fresh_until: Instant::now() + ttl,
                },
            );
            let _ = tx.send(Some(tag));
        });
    }
}
