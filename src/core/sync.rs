//! Upstream version synchronization
//!
//! For every record, fetch its upstream page, extract and normalize a
//! version token, and compare it with the stored version:
//!
//! - equal: the record is up to date and `markedForBuild` is cleared
//! - different: the record is marked for build and its version replaced
//!
//! Pages without a token leave the record untouched. Fetch and write
//! failures are reported for that record and the run continues.

use async_trait::async_trait;
use regex::Regex;
use std::fmt;

use crate::config::defaults;
use crate::core::record::PackageRecord;
use crate::core::store::PackageStore;
use crate::error::DownloadError;

/// Source of raw upstream pages
#[async_trait]
pub trait UpstreamFetcher: Send + Sync {
    /// Fetch the page at `url` as text
    async fn fetch_text(&self, url: &str) -> Result<String, DownloadError>;
}

/// Turns a raw upstream page into a normalized version token
pub trait VersionExtractor {
    /// `None` when the page carries no recognizable version
    fn extract(&self, raw: &str) -> Option<String>;
}

/// Extracts the version from an Arch Linux package page
///
/// Looks for the first tag with `itemprop="version"` and takes its
/// `content` attribute (or, failing that, its text), then strips the
/// configured noise substrings such as `.arch1-1`.
#[derive(Debug, Clone)]
pub struct ArchPageExtractor {
    tag: Regex,
    content: Regex,
    noise: Vec<String>,
}

impl ArchPageExtractor {
    /// Create an extractor that strips the given noise substrings
    pub fn new(noise: Vec<String>) -> Self {
        Self {
            tag: Regex::new(r#"(?is)<[a-z][a-z0-9]*\b([^>]*\bitemprop\s*=\s*"version"[^>]*)>([^<]*)"#)
                .expect("version tag pattern is valid"),
            content: Regex::new(r#"(?i)\bcontent\s*=\s*"([^"]*)""#)
                .expect("content attribute pattern is valid"),
            noise,
        }
    }

    /// Strip noise substrings and surrounding whitespace
    pub fn normalize(&self, token: &str) -> String {
        let mut clean = token.trim().to_string();
        for word in &self.noise {
            clean = clean.replace(word.as_str(), "");
        }
        clean
    }
}

impl Default for ArchPageExtractor {
    fn default() -> Self {
        Self::new(
            defaults::VERSION_NOISE
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        )
    }
}

impl VersionExtractor for ArchPageExtractor {
    fn extract(&self, raw: &str) -> Option<String> {
        let caps = self.tag.captures(raw)?;
        let attributes = caps.get(1).map_or("", |m| m.as_str());
        let text = caps.get(2).map_or("", |m| m.as_str());

        let token = self
            .content
            .captures(attributes)
            .and_then(|c| c.get(1))
            .map_or(text, |m| m.as_str());

        let clean = self.normalize(token);
        (!clean.is_empty()).then_some(clean)
    }
}

/// Result of syncing one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The template record is never synced
    Template,
    /// Upstream matches; record unmarked
    UpToDate {
        /// Current version
        version: String,
    },
    /// Upstream differs; record marked and version replaced
    Updated {
        /// Previous version
        from: String,
        /// New upstream version
        to: String,
    },
    /// No version token found; record untouched
    Inconclusive,
    /// Fetch or write failure; record untouched
    Failed {
        /// Human-readable cause
        cause: String,
    },
}

/// Per-record sync result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncEntry {
    /// Package name
    pub package: String,
    /// What happened
    pub outcome: SyncOutcome,
}

impl fmt::Display for SyncEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            SyncOutcome::Template => write!(f, "Skipping template package"),
            SyncOutcome::UpToDate { version } => {
                write!(f, "Marked for \"Do not Build\" || Current Version: v{version}")
            }
            SyncOutcome::Updated { from, to } => {
                write!(f, "Marked for \"Build\" || v{from} -> v{to}")
            }
            SyncOutcome::Inconclusive => write!(f, "No upstream version found, left unchanged"),
            SyncOutcome::Failed { cause } => write!(f, "Error while syncing package! || {cause}"),
        }
    }
}

/// Result of a sync run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// One entry per record, in store order
    pub entries: Vec<SyncEntry>,
}

impl SyncReport {
    /// Records found out of date
    pub fn updated(&self) -> usize {
        self.count(|o| matches!(o, SyncOutcome::Updated { .. }))
    }

    /// Records found up to date
    pub fn up_to_date(&self) -> usize {
        self.count(|o| matches!(o, SyncOutcome::UpToDate { .. }))
    }

    /// Records that could not be synced
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, SyncOutcome::Failed { .. }))
    }

    /// Records with no version token
    pub fn inconclusive(&self) -> usize {
        self.count(|o| matches!(o, SyncOutcome::Inconclusive))
    }

    /// Outcome for one package
    pub fn outcome(&self, package: &str) -> Option<&SyncOutcome> {
        self.entries
            .iter()
            .find(|e| e.package == package)
            .map(|e| &e.outcome)
    }

    fn count(&self, pred: impl Fn(&SyncOutcome) -> bool) -> usize {
        self.entries.iter().filter(|e| pred(&e.outcome)).count()
    }
}

/// Compares stored versions against upstream
#[derive(Debug)]
pub struct VersionSyncer<F, E = ArchPageExtractor> {
    fetcher: F,
    extractor: E,
    template_package: Option<String>,
}

impl<F: UpstreamFetcher, E: VersionExtractor> VersionSyncer<F, E> {
    /// Create a syncer; the default template package is skipped
    pub fn new(fetcher: F, extractor: E) -> Self {
        Self {
            fetcher,
            extractor,
            template_package: Some(defaults::TEMPLATE_PACKAGE.to_string()),
        }
    }

    /// Override (or with `None`, disable) the skipped template package
    #[must_use]
    pub fn with_template_package(mut self, name: Option<String>) -> Self {
        self.template_package = name;
        self
    }

    /// Sync every record
    pub async fn sync_all(&self, store: &mut PackageStore) -> SyncReport {
        self.sync_all_with(store, |_| {}).await
    }

    /// Sync every record, reporting each outcome as it is decided
    pub async fn sync_all_with(
        &self,
        store: &mut PackageStore,
        mut observer: impl FnMut(&SyncEntry),
    ) -> SyncReport {
        let mut report = SyncReport::default();

        for record in store.list() {
            let outcome = self.sync_one(store, &record).await;
            let entry = SyncEntry {
                package: record.name,
                outcome,
            };
            observer(&entry);
            report.entries.push(entry);
        }

        report
    }

    /// Sync one record
    pub async fn sync_one(&self, store: &mut PackageStore, record: &PackageRecord) -> SyncOutcome {
        if self.template_package.as_deref() == Some(record.name.as_str()) {
            tracing::debug!("Skipping template package {}", record.name);
            return SyncOutcome::Template;
        }

        tracing::info!("Pulling upstream info for {}", record.name);
        let raw = match self.fetcher.fetch_text(&record.urls.upstream_url).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Failed to fetch upstream page for {}: {e}", record.name);
                return SyncOutcome::Failed {
                    cause: e.to_string(),
                };
            }
        };

        let Some(upstream) = self.extractor.extract(&raw) else {
            tracing::warn!("No version found upstream for {}", record.name);
            return SyncOutcome::Inconclusive;
        };

        let result = if upstream == record.version {
            store
                .set_marked_for_build(&record.name, false)
                .map(|()| SyncOutcome::UpToDate {
                    version: record.version.clone(),
                })
        } else {
            store
                .mark_outdated(&record.name, &upstream)
                .map(|()| SyncOutcome::Updated {
                    from: record.version.clone(),
                    to: upstream,
                })
        };

        result.unwrap_or_else(|e| {
            tracing::warn!("Failed to update {}: {e}", record.name);
            SyncOutcome::Failed {
                cause: e.to_string(),
            }
        })
    }
}
