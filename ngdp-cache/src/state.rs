//! Digest-keyed cache for Ribbit/TACT patch-server responses.
//!
//! Every fetch is content-addressed by the MD5 digest of its raw body, so
//! repeated fetches of a byte-identical document (the common case: most
//! products' `versions` response doesn't change build-to-build) collapse to
//! one object on disk regardless of how many times it's fetched. A
//! product-scoped append-only history log records which digest answered
//! which endpoint and when; a "current" pointer file per PSV endpoint lets
//! [`Self::get_cached_versions`]/[`Self::get_cached_cdns`] skip the log
//! entirely for the common "what's current" query.

use crate::remote::{RemoteEndpoint, StateEndpoint};
use crate::{Cache, Result, ensure_dir};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tact_client::response_types::{self, BgdlEntry, CdnEntry, VersionEntry};
use tokio::io::{AsyncReadExt as _, AsyncWriteExt as _};
use tracing::*;

/// One fetch recorded in a product's history: which transport produced it,
/// which endpoint it answered, the digest of its body, and when.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRow {
    pub remote: String,
    pub endpoint: String,
    pub digest: String,
    pub fetched_at: u64,
}

fn now_unix() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// A cached patch-server state tree for one or more products.
pub struct StateCache {
    cache: Cache,
}

impl StateCache {
    /// Open (creating if necessary) a state cache rooted at `base_dir`.
    pub async fn with_base_dir(base_dir: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            cache: Cache::with_base_dir(base_dir).await?,
        })
    }

    fn responses_dir(&self, endpoint: StateEndpoint) -> PathBuf {
        Path::new("responses").join(endpoint.as_str())
    }

    fn product_dir(&self, product: &str) -> PathBuf {
        self.cache.base_dir().join("products").join(product)
    }

    fn log_path(&self, product: &str) -> PathBuf {
        self.product_dir(product).join("log.jsonl")
    }

    fn pointer_path(&self, product: &str, endpoint: StateEndpoint) -> PathBuf {
        self.product_dir(product)
            .join(format!("{}.current", endpoint.as_str()))
    }

    /// Fetch `endpoint` for `product` through `remote`, recording it in the
    /// response object store (keyed by the digest of its body, with a
    /// `.meta` sidecar carrying the fetch time), appending a history row,
    /// and — for PSV endpoints — updating the "current" pointer.
    ///
    /// Returns the digest the body was stored under, which is stable across
    /// byte-identical fetches.
    pub async fn fetch<R: RemoteEndpoint + ?Sized>(
        &self,
        remote: &R,
        remote_name: &str,
        product: &str,
        endpoint: StateEndpoint,
    ) -> Result<String> {
        let body = remote.fetch_endpoint(product, endpoint).await?;
        let digest = format!("{:x}", md5::compute(&body));
        let dir = self.responses_dir(endpoint);

        if self
            .cache
            .object_size(&dir, &digest)
            .await?
            .is_none()
        {
            let mut file = self.cache.write_object(&dir, &digest).await?;
            file.write_all(&body).await?;
            file.flush().await?;
        }

        let now = now_unix();
        let meta_path = self.cache.cache_path_with_suffix(&dir, &digest, ".meta");
        tokio::fs::write(&meta_path, now.to_string()).await?;

        self.append_row(
            product,
            &HistoryRow {
                remote: remote_name.to_string(),
                endpoint: endpoint.as_str().to_string(),
                digest: digest.clone(),
                fetched_at: now,
            },
        )
        .await?;

        if endpoint.is_psv() {
            let pointer_path = self.pointer_path(product, endpoint);
            if let Some(parent) = pointer_path.parent() {
                ensure_dir(parent).await?;
            }
            tokio::fs::write(&pointer_path, &digest).await?;
        }

        debug!(
            "fetched {} for {product} from {remote_name}, digest {digest}",
            endpoint.as_str()
        );
        Ok(digest)
    }

    async fn append_row(&self, product: &str, row: &HistoryRow) -> Result<()> {
        let path = self.log_path(product);
        if let Some(parent) = path.parent() {
            ensure_dir(parent).await?;
        }
        let mut line = serde_json::to_string(row)?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        Ok(())
    }

    /// The full fetch history recorded for `product`, oldest first.
    pub async fn history(&self, product: &str) -> Result<Vec<HistoryRow>> {
        let path = self.log_path(product);
        let Ok(text) = tokio::fs::read_to_string(&path).await else {
            return Ok(Vec::new());
        };
        text.lines()
            .filter(|l| !l.is_empty())
            .map(|l| Ok(serde_json::from_str(l)?))
            .collect()
    }

    /// Raw bytes of a previously-fetched response, keyed by endpoint and
    /// digest, independent of when or from which transport it was fetched.
    pub async fn read_raw(&self, endpoint: StateEndpoint, digest: &str) -> Result<Vec<u8>> {
        let dir = self.responses_dir(endpoint);
        let Some(mut file) = self.cache.read_object(&dir, digest).await? else {
            return Err(crate::Error::NotFound {
                kind: "state response",
                key: digest.to_string(),
            });
        };
        let mut buf = Vec::new();
        file.read_to_end(&mut buf).await?;
        Ok(buf)
    }

    /// The digest currently pointed to for `endpoint`, or `None` if it has
    /// never been fetched for this product.
    pub async fn current_digest(
        &self,
        product: &str,
        endpoint: StateEndpoint,
    ) -> Result<Option<String>> {
        match tokio::fs::read_to_string(self.pointer_path(product, endpoint)).await {
            Ok(digest) => Ok(Some(digest)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Parse a previously-fetched `versions` response, by digest, for
    /// replay — eg to diff two points in a product's history.
    pub async fn read_versions(&self, digest: &str) -> Result<Vec<VersionEntry>> {
        let body = self.read_raw(StateEndpoint::Versions, digest).await?;
        Ok(response_types::parse_versions(&String::from_utf8(body)?)?)
    }

    /// Parse a previously-fetched `cdns` response, by digest.
    pub async fn read_cdns(&self, digest: &str) -> Result<Vec<CdnEntry>> {
        let body = self.read_raw(StateEndpoint::Cdns, digest).await?;
        Ok(response_types::parse_cdns(&String::from_utf8(body)?)?)
    }

    /// Parse a previously-fetched `bgdl` response, by digest.
    pub async fn read_bgdl(&self, digest: &str) -> Result<Vec<BgdlEntry>> {
        let body = self.read_raw(StateEndpoint::Bgdl, digest).await?;
        Ok(response_types::parse_bgdl(&String::from_utf8(body)?)?)
    }

    /// The most recently fetched `versions` for `product`, parsed.
    pub async fn get_cached_versions(&self, product: &str) -> Result<Vec<VersionEntry>> {
        let digest = self
            .current_digest(product, StateEndpoint::Versions)
            .await?
            .ok_or_else(|| crate::Error::NotFound {
                kind: "versions",
                key: product.to_string(),
            })?;
        self.read_versions(&digest).await
    }

    /// The most recently fetched `cdns` for `product`, parsed.
    pub async fn get_cached_cdns(&self, product: &str) -> Result<Vec<CdnEntry>> {
        let digest = self
            .current_digest(product, StateEndpoint::Cdns)
            .await?
            .ok_or_else(|| crate::Error::NotFound {
                kind: "cdns",
                key: product.to_string(),
            })?;
        self.read_cdns(&digest).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    struct FakeRemote {
        body: &'static str,
    }

    #[async_trait::async_trait]
    impl RemoteEndpoint for FakeRemote {
        async fn fetch_endpoint(&self, _product: &str, _endpoint: StateEndpoint) -> Result<Vec<u8>> {
            Ok(self.body.as_bytes().to_vec())
        }
    }

    const SAMPLE_CDNS: &str = "Name!STRING:0|Path!STRING:0|Hosts!STRING:0|Servers!STRING:0|ConfigPath!STRING:0\nus|tpr/wow|cdn.blizzard.com|http://cdn.blizzard.com/|tpr/configs/data\n";

    #[tokio::test]
    async fn fetch_dedupes_identical_bodies_and_records_history() {
        let dir = tempfile::tempdir().unwrap();
        let state = StateCache::with_base_dir(dir.path()).await.unwrap();
        let remote = FakeRemote { body: SAMPLE_CDNS };

        let d1 = state
            .fetch(&remote, "ribbit-us", "wow", StateEndpoint::Cdns)
            .await
            .unwrap();
        let d2 = state
            .fetch(&remote, "ribbit-us", "wow", StateEndpoint::Cdns)
            .await
            .unwrap();
        assert_eq!(d1, d2);

        let history = state.history("wow").await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].digest, d1);

        let cdns = state.get_cached_cdns("wow").await.unwrap();
        assert_eq!(cdns.len(), 1);
        assert_eq!(cdns[0].name, "us");
    }

    #[tokio::test]
    async fn uncached_product_reports_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let state = StateCache::with_base_dir(dir.path()).await.unwrap();
        let err = state.get_cached_versions("wow").await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }
}
