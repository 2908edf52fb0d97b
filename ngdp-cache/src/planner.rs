//! Fetch planner: turns a set of patch-server version entries into an
//! ordered, deduplicated queue of objects to pull through the object store.
//!
//! Planning happens in four phases, each one only knowable once the
//! previous phase's objects are in hand:
//!
//! 1. the three config documents a version names (`build_config`,
//!    `cdn_config`, `product_config`)
//! 2. the archive and patch-archive indices the CDN config names
//! 3. the encoding/install/download/patch manifests the build config names
//!    (by E-Key, fetched as data — the build config gives these directly
//!    rather than requiring an encoding-table lookup)
//! 4. the archive data objects the CDN config's archives resolve to
//!
//! Items are deduplicated across the whole plan (not just within a phase),
//! so two versions sharing a CDN config only queue its archives once.

use crate::store::DelegatingStore;
use crate::Result;
use std::collections::HashSet;
use tact_client::response_types::VersionEntry;
use tact_parser::config::{BuildConfig, CdnConfig, ConfigParsable, ProductConfig};
use tracing::*;

/// One object the planner wants fetched, in the order it should be fetched.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PlanItem {
    /// A config document (build/CDN/product config), keyed by its C-Key.
    Config(String),
    /// An archive or patch-archive index, keyed by the archive's C-Key.
    Index(String),
    /// A manifest (encoding/install/download/patch), keyed by its E-Key.
    Manifest(String),
    /// A full archive's data blob, keyed by the archive's C-Key.
    Data(String),
}

/// A version entry reduced to the three config keys that actually
/// determine what content needs fetching; region/build-id/name don't.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct VersionIdentity {
    build_config: String,
    cdn_config: String,
    product_config: String,
}

impl From<&VersionEntry> for VersionIdentity {
    fn from(v: &VersionEntry) -> Self {
        Self {
            build_config: v.build_config.clone(),
            cdn_config: v.cdn_config.clone(),
            product_config: v.product_config.clone(),
        }
    }
}

/// Remove versions that resolve to an identical `(build_config, cdn_config,
/// product_config)` triple — the common case across regions sharing a
/// release.
pub fn dedupe_versions(entries: &[VersionEntry]) -> Vec<&VersionEntry> {
    let mut seen = HashSet::new();
    entries
        .iter()
        .filter(|v| seen.insert(VersionIdentity::from(*v)))
        .collect()
}

fn md5_hex(bytes: &[u8; 16]) -> String {
    hex::encode(bytes)
}

/// Builds a deduplicated, phase-ordered fetch plan over a [`DelegatingStore`],
/// parsing each config as it arrives to discover the next phase's keys.
pub struct FetchPlanner<'a> {
    store: &'a DelegatingStore,
    cdn_host: String,
    cdn_path: String,
    queued: HashSet<PlanItem>,
    queue: Vec<PlanItem>,
}

impl<'a> FetchPlanner<'a> {
    pub fn new(store: &'a DelegatingStore, cdn_host: impl Into<String>, cdn_path: impl Into<String>) -> Self {
        Self {
            store,
            cdn_host: cdn_host.into(),
            cdn_path: cdn_path.into(),
            queued: HashSet::new(),
            queue: Vec::new(),
        }
    }

    fn push(&mut self, item: PlanItem) {
        if self.queued.insert(item.clone()) {
            self.queue.push(item);
        }
    }

    async fn config_bytes(&self, key: &str) -> Result<Vec<u8>> {
        self.store
            .get_config(&self.cdn_host, &self.cdn_path, key)
            .await
    }

    /// Plan every version in `entries`, deduplicating identical builds and
    /// emitting phase 1 through phase 4 items as each phase's sources are
    /// fetched and parsed.
    ///
    /// Returns the ordered plan alongside a list of versions that carry no
    /// product config — callers should fall back to the legacy
    /// `blobs`/`blob-game`/`blob-install` endpoints for those.
    pub async fn plan(&mut self, entries: &[VersionEntry]) -> Result<Vec<PlanItem>> {
        let versions = dedupe_versions(entries);
        let mut build_configs = Vec::new();
        let mut cdn_configs = Vec::new();

        // Phase 1: the config documents themselves.
        for version in &versions {
            if !version.build_config.is_empty() {
                self.push(PlanItem::Config(version.build_config.clone()));
            }
            if !version.cdn_config.is_empty() {
                self.push(PlanItem::Config(version.cdn_config.clone()));
            }
            if !version.product_config.is_empty() {
                self.push(PlanItem::Config(version.product_config.clone()));
            }
        }

        for version in &versions {
            if !version.build_config.is_empty() {
                let data = self.config_bytes(&version.build_config).await?;
                build_configs.push(BuildConfig::parse_config(std::io::Cursor::new(data))?);
            }
            if !version.cdn_config.is_empty() {
                let data = self.config_bytes(&version.cdn_config).await?;
                cdn_configs.push(CdnConfig::parse_config(std::io::Cursor::new(data))?);
            }
        }

        // Phase 2: archive and patch-archive indices.
        for cdn_config in &cdn_configs {
            for archive in cdn_config.archives.iter().flatten() {
                self.push(PlanItem::Index(md5_hex(archive)));
            }
            for archive in cdn_config.patch_archives.iter().flatten() {
                self.push(PlanItem::Index(md5_hex(archive)));
            }
        }

        // Phase 3: encoding/install/download/patch manifests, by E-Key.
        for build_config in &build_configs {
            if let Some(encoding) = build_config.encoding {
                self.push(PlanItem::Manifest(md5_hex(&encoding.current())));
            }
            if let Some(install) = build_config.install {
                self.push(PlanItem::Manifest(md5_hex(&install.current())));
            }
            if let Some(download) = build_config.download {
                self.push(PlanItem::Manifest(md5_hex(&download.current())));
            }
            if let Some(patch) = build_config.patch {
                self.push(PlanItem::Manifest(md5_hex(&patch)));
            }
        }

        // Phase 4: the archives' backing data, deferred behind everything
        // else since it's by far the largest part of the plan.
        for cdn_config in &cdn_configs {
            for archive in cdn_config.archives.iter().flatten() {
                self.push(PlanItem::Data(md5_hex(archive)));
            }
        }

        debug!(
            "planned {} objects across {} deduplicated versions",
            self.queue.len(),
            versions.len()
        );
        Ok(self.queue.clone())
    }

    /// Versions in `entries` with no `product_config` entry — these predate
    /// product-config-based decryption-key resolution and must fall back to
    /// the legacy `blobs`/`blob-game`/`blob-install` endpoints instead.
    pub fn legacy_versions(entries: &[VersionEntry]) -> Vec<&VersionEntry> {
        entries
            .iter()
            .filter(|v| v.product_config.is_empty())
            .collect()
    }

    /// Resolve the decryption key *name* a product needs, from its already
    /// fetched product config. The caller maps this name to a loaded key
    /// through its own [`ngdp_crypto::KeyService`] — product configs name
    /// keys by string, while `KeyService` is keyed by the numeric key ID
    /// encoded in BLTE headers, so this planner doesn't own that mapping.
    pub async fn decryption_key_name(&self, product_config_key: &str) -> Result<Option<String>> {
        let data = self.config_bytes(product_config_key).await?;
        let config = ProductConfig::parse_config(std::io::Cursor::new(data))?;
        Ok(config.decryption_key_name)
    }
}
