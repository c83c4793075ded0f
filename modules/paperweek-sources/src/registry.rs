//! Moderator-curated allow-list of trusted publication domains.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use tokio::sync::Mutex;
use tracing::{error, info};
use url::Url;

use crate::store::{LoadOutcome, SourceList, SourceStore};

/// Actor recorded for mutations not attributable to a person.
pub const SYSTEM_ACTOR: &str = "system";

/// Seed list used the first time the registry runs with no persisted state.
/// Subdomains are enumerated individually (`pubmed.ncbi.nlm.nih.gov`, not
/// `nih.gov`): suffix matching never widens a registered domain upward.
const DEFAULT_DOMAINS: [&str; 15] = [
    "arxiv.org",
    "nature.com",
    "science.org",
    "pnas.org",
    "cell.com",
    "nejm.org",
    "thelancet.com",
    "bmj.com",
    "pubmed.ncbi.nlm.nih.gov",
    "sciencedirect.com",
    "springer.com",
    "wiley.com",
    "ieee.org",
    "acm.org",
    "aaas.org",
];

/// Read-only snapshot of the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceInfo {
    pub count: usize,
    pub last_updated: DateTime<Utc>,
    pub domains: Vec<String>,
}

/// The trusted-source registry. Mutations are serialized through a single
/// writer lock; every operation re-reads the persisted state, so concurrent
/// processes sharing the file still see last-write-wins.
pub struct SourceRegistry<S: SourceStore> {
    store: S,
    write_lock: Mutex<()>,
}

impl<S: SourceStore> SourceRegistry<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Add a domain. The caller must already have normalized it (lower-case,
    /// trimmed). Returns `false` without mutation if it is already present.
    pub async fn add(&self, domain: &str, actor: &str) -> bool {
        let _guard = self.write_lock.lock().await;
        let mut list = self.current().await;

        if list.domains.iter().any(|d| d == domain) {
            return false;
        }

        list.domains.push(domain.to_string());
        list.last_updated = Utc::now();
        list.added_by = actor.to_string();
        self.persist(&list).await;

        info!(domain, actor, total = list.domains.len(), "Trusted source added");
        true
    }

    /// Remove a domain. Returns `false` if it was not present.
    pub async fn remove(&self, domain: &str) -> bool {
        let _guard = self.write_lock.lock().await;
        let mut list = self.current().await;

        let before = list.domains.len();
        list.domains.retain(|d| d != domain);
        if list.domains.len() == before {
            return false;
        }

        list.last_updated = Utc::now();
        self.persist(&list).await;

        info!(domain, total = list.domains.len(), "Trusted source removed");
        true
    }

    /// True iff `url` parses as an absolute URL and its hostname equals a
    /// registered domain or is a dot-delimited subdomain of one. The suffix
    /// check is anchored on the dot: `www.nature.com` matches `nature.com`,
    /// `notnature.com` and `nature.com.evil.org` do not.
    pub async fn is_valid(&self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url) else {
            return false;
        };
        let Some(host) = parsed.host_str() else {
            return false;
        };
        let host = host.to_lowercase();

        let list = self.current().await;
        list.domains
            .iter()
            .any(|domain| host == *domain || host.ends_with(&format!(".{domain}")))
    }

    pub async fn info(&self) -> SourceInfo {
        let list = self.current().await;
        SourceInfo {
            count: list.domains.len(),
            last_updated: list.last_updated,
            domains: list.domains,
        }
    }

    /// Read the current state, seeding the default list if nothing is
    /// persisted yet. A corrupt document degrades to an empty list so the
    /// bot stays available; the damage is logged, not propagated.
    async fn current(&self) -> SourceList {
        match self.store.load().await {
            Ok(LoadOutcome::Loaded(list)) => list,
            Ok(LoadOutcome::Missing) => {
                info!("No persisted source list, seeding defaults");
                let list = SourceList {
                    domains: DEFAULT_DOMAINS.iter().map(|d| d.to_string()).collect(),
                    last_updated: Utc::now(),
                    added_by: SYSTEM_ACTOR.to_string(),
                };
                self.persist(&list).await;
                list
            }
            Err(e) => {
                error!(error = %e, "Failed to load the source list");
                SourceList {
                    domains: Vec::new(),
                    last_updated: Utc::now(),
                    added_by: SYSTEM_ACTOR.to_string(),
                }
            }
        }
    }

    /// A failed save is logged and dropped; the caller's return value still
    /// reflects the attempted mutation.
    async fn persist(&self, list: &SourceList) {
        if let Err(e) = self.store.save(list).await {
            error!(error = %e, "Failed to save the source list");
        }
    }
}

static DOMAIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid regex"));

/// Lower-case and trim a user-supplied domain. Normalization is the
/// caller's contract; the registry stores exactly what it is given.
pub fn normalize_domain(input: &str) -> String {
    input.trim().to_lowercase()
}

/// Shallow format check for user-supplied domains (`nature.com`,
/// `pubmed.ncbi.nlm.nih.gov`). Not a full hostname validation.
pub fn looks_like_domain(domain: &str) -> bool {
    DOMAIN_RE.is_match(domain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{JsonFileStore, MemoryStore, StoreError};

    fn file_registry(dir: &tempfile::TempDir) -> SourceRegistry<JsonFileStore> {
        SourceRegistry::new(JsonFileStore::new(dir.path().join("sources.json")))
    }

    #[tokio::test]
    async fn seeds_defaults_when_nothing_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let registry = file_registry(&dir);

        let info = registry.info().await;
        assert_eq!(info.count, 15);
        assert!(info.domains.contains(&"nature.com".to_string()));
        assert!(dir.path().join("sources.json").exists());
    }

    #[tokio::test]
    async fn add_is_rejected_on_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let registry = file_registry(&dir);

        assert!(registry.add("example.org", "mod-1").await);
        let count = registry.info().await.count;

        assert!(!registry.add("example.org", "mod-2").await);
        assert_eq!(registry.info().await.count, count);
    }

    #[tokio::test]
    async fn distinct_domains_are_both_kept_exactly_once() {
        let dir = tempfile::tempdir().unwrap();
        let registry = file_registry(&dir);

        assert!(registry.add("alpha.org", "mod-1").await);
        assert!(registry.add("beta.org", "mod-1").await);

        let domains = registry.info().await.domains;
        assert_eq!(domains.iter().filter(|d| *d == "alpha.org").count(), 1);
        assert_eq!(domains.iter().filter(|d| *d == "beta.org").count(), 1);
    }

    #[tokio::test]
    async fn remove_absent_domain_leaves_set_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let registry = file_registry(&dir);
        let before = registry.info().await;

        assert!(!registry.remove("missing.org").await);
        assert_eq!(registry.info().await.domains, before.domains);
        assert_eq!(registry.info().await.last_updated, before.last_updated);
    }

    #[tokio::test]
    async fn remove_present_domain_decrements_count_by_one() {
        let dir = tempfile::tempdir().unwrap();
        let registry = file_registry(&dir);
        let before = registry.info().await.count;

        assert!(registry.remove("nature.com").await);
        assert_eq!(registry.info().await.count, before - 1);
    }

    #[tokio::test]
    async fn subdomains_match_on_the_dot_boundary() {
        let dir = tempfile::tempdir().unwrap();
        let registry = file_registry(&dir);

        assert!(registry.is_valid("https://www.nature.com/articles/x").await);
        assert!(registry.is_valid("https://nature.com/articles/x").await);
        assert!(!registry.is_valid("https://notnature.com/articles/x").await);
        assert!(!registry.is_valid("https://nature.com.evil.org/articles/x").await);
    }

    #[tokio::test]
    async fn malformed_urls_fail_closed() {
        let dir = tempfile::tempdir().unwrap();
        let registry = file_registry(&dir);

        assert!(!registry.is_valid("not a url").await);
        assert!(!registry.is_valid("nature.com/articles/x").await);
    }

    #[tokio::test]
    async fn registered_parent_does_not_follow_from_a_registered_subdomain() {
        // The seed list carries pubmed.ncbi.nlm.nih.gov, not nih.gov.
        let dir = tempfile::tempdir().unwrap();
        let registry = file_registry(&dir);

        assert!(registry.is_valid("https://pubmed.ncbi.nlm.nih.gov/123/").await);
        assert!(!registry.is_valid("https://www.nih.gov/news").await);
    }

    #[tokio::test]
    async fn info_is_stable_without_mutation() {
        let dir = tempfile::tempdir().unwrap();
        let registry = file_registry(&dir);

        let first = registry.info().await;
        let second = registry.info().await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn last_updated_changes_only_on_mutation() {
        let dir = tempfile::tempdir().unwrap();
        let registry = file_registry(&dir);
        let seeded = registry.info().await.last_updated;

        registry.is_valid("https://www.nature.com/x").await;
        assert_eq!(registry.info().await.last_updated, seeded);

        registry.add("example.org", "mod-1").await;
        assert!(registry.info().await.last_updated > seeded);
    }

    #[tokio::test]
    async fn reload_from_disk_preserves_the_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sources.json");

        let first = SourceRegistry::new(JsonFileStore::new(&path));
        first.add("example.org", "mod-7").await;
        let saved = first.info().await;

        let second = SourceRegistry::new(JsonFileStore::new(&path));
        let reloaded = second.info().await;

        assert_eq!(reloaded.last_updated, saved.last_updated);
        let mut expected = saved.domains.clone();
        let mut actual = reloaded.domains.clone();
        expected.sort();
        actual.sort();
        assert_eq!(actual, expected);
    }

    #[tokio::test]
    async fn corrupt_storage_degrades_to_an_empty_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sources.json");
        std::fs::write(&path, "{broken").unwrap();

        let registry = SourceRegistry::new(JsonFileStore::new(&path));
        assert_eq!(registry.info().await.count, 0);
        assert!(!registry.is_valid("https://www.nature.com/x").await);
    }

    #[tokio::test]
    async fn memory_store_registry_behaves_like_the_file_one() {
        let registry = SourceRegistry::new(MemoryStore::new());

        assert_eq!(registry.info().await.count, 15);
        assert!(registry.add("example.org", "mod-1").await);
        assert!(registry.is_valid("https://sub.example.org/paper").await);
    }

    #[tokio::test]
    async fn failed_save_still_reports_the_mutation() {
        struct ReadOnlyStore(MemoryStore);

        #[async_trait::async_trait]
        impl SourceStore for ReadOnlyStore {
            async fn load(&self) -> Result<LoadOutcome, StoreError> {
                self.0.load().await
            }

            async fn save(&self, _list: &SourceList) -> Result<(), StoreError> {
                Err(StoreError::Io(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "read-only",
                )))
            }
        }

        let list = SourceList {
            domains: vec!["nature.com".to_string()],
            last_updated: Utc::now(),
            added_by: SYSTEM_ACTOR.to_string(),
        };
        let registry = SourceRegistry::new(ReadOnlyStore(MemoryStore::preloaded(list)));

        assert!(registry.add("example.org", "mod-1").await);
        // The write was dropped, so a later read sees the old state.
        assert_eq!(registry.info().await.count, 1);
    }

    #[test]
    fn normalize_lowercases_and_trims() {
        assert_eq!(normalize_domain("  Nature.COM "), "nature.com");
    }

    #[test]
    fn domain_format_check() {
        assert!(looks_like_domain("nature.com"));
        assert!(looks_like_domain("pubmed.ncbi.nlm.nih.gov"));
        assert!(!looks_like_domain("nature"));
        assert!(!looks_like_domain("https://nature.com"));
        assert!(!looks_like_domain("nature com"));
    }
}
