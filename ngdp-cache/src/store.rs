//! Content-addressed object store: local filesystem, remote CDN, and a
//! delegating store that reads local-first and falls back to remote.
//!
//! Builds on [`crate::Cache`]'s partitioned-path primitive, adding the
//! verifying-sink commit [`Cache`] itself doesn't do: every object fetched
//! over the network is hashed incrementally while it's written to a temp
//! sibling, and only renamed into its final partitioned path once the digest
//! matches the key it was fetched for.

use crate::{Cache, Error, Result, ensure_dir};
use md5::{Digest, Md5 as Md5Hasher};
use tact_client::{HttpClient, ProtocolVersion, Region};
use std::{
    path::{Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering},
};
use tokio::{
    fs::{self, File},
    io::{AsyncReadExt as _, AsyncWriteExt as _},
};
use tracing::*;

static TEMP_NONCE: AtomicU64 = AtomicU64::new(0);

/// Which of the three content-addressed subtrees an object lives under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Config,
    Data,
    Patch,
}

impl Kind {
    fn dirname(self) -> &'static str {
        match self {
            Kind::Config => "config",
            Kind::Data => "data",
            Kind::Patch => "patch",
        }
    }
}

/// Local, filesystem-backed half of the object store.
///
/// Lays out `objects/{config,data,patch}/XX/YY/{key}[.index]` and
/// `fragments/XX/YY/{key}` under its base directory, per the repository
/// layout convention the rest of the cache uses.
pub struct LocalStore {
    cache: Cache,
}

impl LocalStore {
    /// Open (creating if necessary) a local store rooted at `base_dir`.
    pub async fn with_base_dir(base_dir: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            cache: Cache::with_base_dir(base_dir).await?,
        })
    }

    fn objects_dir(&self, kind: Kind) -> PathBuf {
        Path::new("objects").join(kind.dirname())
    }

    fn fragments_dir(&self) -> PathBuf {
        PathBuf::from("fragments")
    }

    pub fn base_dir(&self) -> &Path {
        self.cache.base_dir()
    }

    pub async fn has_config(&self, key: &str) -> bool {
        self.cache
            .object_size(self.objects_dir(Kind::Config), key)
            .await
            .unwrap_or(None)
            .is_some()
    }

    pub async fn has_index(&self, key: &str) -> bool {
        self.cache
            .object_size_with_suffix(self.objects_dir(Kind::Data), key, ".index")
            .await
            .unwrap_or(None)
            .is_some()
    }

    pub async fn has_data(&self, key: &str) -> bool {
        self.cache
            .object_size(self.objects_dir(Kind::Data), key)
            .await
            .unwrap_or(None)
            .is_some()
    }

    pub async fn has_fragment(&self, key: &str) -> bool {
        self.cache
            .object_size(self.fragments_dir(), key)
            .await
            .unwrap_or(None)
            .is_some()
    }

    /// Read a config document's full bytes.
    pub async fn get_config(&self, key: &str) -> Result<Vec<u8>> {
        self.read_full(self.objects_dir(Kind::Config), key, "").await
    }

    /// Read an archive index's full bytes.
    pub async fn get_index(&self, key: &str) -> Result<Vec<u8>> {
        self.read_full(self.objects_dir(Kind::Data), key, ".index")
            .await
    }

    /// Open an archive's backing data object for range reads.
    pub async fn get_archive(&self, key: &str) -> Result<File> {
        self.cache
            .read_object(self.objects_dir(Kind::Data), key)
            .await?
            .ok_or_else(|| Error::NotFound {
                kind: "archive",
                key: key.to_string(),
            })
    }

    /// Read a loose data object's full bytes.
    pub async fn get_data(&self, key: &str) -> Result<Vec<u8>> {
        self.read_full(self.objects_dir(Kind::Data), key, "").await
    }

    /// Read a standalone fragment's full bytes, if one exists.
    pub async fn get_fragment(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let Some(mut file) = self.cache.read_object(self.fragments_dir(), key).await? else {
            return Ok(None);
        };
        let mut buf = Vec::new();
        file.read_to_end(&mut buf).await?;
        Ok(Some(buf))
    }

    async fn read_full(&self, path: impl AsRef<Path>, key: &str, suffix: &str) -> Result<Vec<u8>> {
        let Some(mut file) = self
            .cache
            .read_object_with_suffix(&path, key, suffix)
            .await?
        else {
            return Err(Error::NotFound {
                kind: "object",
                key: key.to_string(),
            });
        };
        let mut buf = Vec::new();
        file.read_to_end(&mut buf).await?;
        Ok(buf)
    }

    /// Commit `data` as the content of `key` in `kind` (with optional
    /// `suffix`, eg `.index`), verifying its MD5 hashes to `key` before the
    /// object becomes visible.
    ///
    /// Writes through `{key}.{pid}-{nonce}.keg_temp` in the destination
    /// directory and renames on success; on a digest mismatch the temp file
    /// is removed and [`Error::IntegrityError`] is raised without ever
    /// exposing partial content at the final path.
    pub async fn commit(
        &self,
        kind: Kind,
        key: &str,
        suffix: &str,
        data: &[u8],
    ) -> Result<PathBuf> {
        self.commit_at(self.objects_dir(kind), key, suffix, data)
            .await
    }

    /// Commit a standalone fragment.
    pub async fn commit_fragment(&self, key: &str, data: &[u8]) -> Result<PathBuf> {
        self.commit_at(self.fragments_dir(), key, "", data).await
    }

    async fn commit_at(
        &self,
        dir: impl AsRef<Path>,
        key: &str,
        suffix: &str,
        data: &[u8],
    ) -> Result<PathBuf> {
        let nonce = TEMP_NONCE.fetch_add(1, Ordering::Relaxed);
        let temp_suffix = format!(".{}-{nonce}.keg_temp", std::process::id());

        let final_path = self.cache.cache_path_with_suffix(&dir, key, suffix);
        let temp_path = self.cache.cache_path_with_suffix(&dir, key, &temp_suffix);
        if let Some(parent) = temp_path.parent() {
            ensure_dir(parent).await?;
        }

        let mut hasher = Md5Hasher::new();
        hasher.update(data);
        let digest = hex::encode(hasher.finalize());

        if digest != key {
            return Err(Error::IntegrityError {
                key: key.to_string(),
                expected: key.to_string(),
                actual: digest,
            });
        }

        {
            let mut file = fs::File::create(&temp_path).await?;
            file.write_all(data).await?;
            file.flush().await?;
        }

        fs::rename(&temp_path, &final_path).await?;
        debug!("committed object {key} at {final_path:?}");
        Ok(final_path)
    }
}

/// Remote, read-only half of the object store. Streams content over HTTP
/// from a CDN server; never writes anything.
pub struct RemoteStore {
    client: HttpClient,
}

impl RemoteStore {
    pub async fn new() -> Result<Self> {
        Ok(Self {
            client: HttpClient::new(Region::US, ProtocolVersion::V2)?,
        })
    }

    /// Fetch a config document's full bytes from `cdn_host`/`path`.
    pub async fn fetch_config(&self, cdn_host: &str, path: &str, key: &str) -> Result<Vec<u8>> {
        let config_path = format!("{}/config", path.trim_end_matches('/'));
        let response = self.client.download_file(cdn_host, &config_path, key).await?;
        Ok(response.bytes().await?.to_vec())
    }

    /// Fetch an archive index's full bytes from `cdn_host`/`path`.
    pub async fn fetch_index(&self, cdn_host: &str, path: &str, key: &str) -> Result<Vec<u8>> {
        let data_path = format!("{}/data", path.trim_end_matches('/'));
        let indexed_key = format!("{key}.index");
        let response = self
            .client
            .download_file(cdn_host, &data_path, &indexed_key)
            .await?;
        Ok(response.bytes().await?.to_vec())
    }

    /// Fetch a data object's full bytes from `cdn_host`/`path`.
    pub async fn fetch_data(&self, cdn_host: &str, path: &str, key: &str) -> Result<Vec<u8>> {
        let data_path = format!("{}/data", path.trim_end_matches('/'));
        let response = self.client.download_file(cdn_host, &data_path, key).await?;
        Ok(response.bytes().await?.to_vec())
    }

    /// Fetch `[offset, offset + size)` of a data object (an archive), via a
    /// `Range` request.
    pub async fn fetch_data_range(
        &self,
        cdn_host: &str,
        path: &str,
        key: &str,
        offset: u64,
        size: u64,
    ) -> Result<Vec<u8>> {
        let data_path = format!("{}/data", path.trim_end_matches('/'));
        let response = self
            .client
            .download_file_range(cdn_host, &data_path, key, (offset, Some(offset + size - 1)))
            .await?;
        Ok(response.bytes().await?.to_vec())
    }
}

/// Composes [`LocalStore`] and [`RemoteStore`]: reads local first, falls
/// back to the remote on a miss, and verifies+commits the remote's bytes to
/// the local store before returning them, so subsequent reads bypass the
/// network entirely.
pub struct DelegatingStore {
    local: LocalStore,
    remote: RemoteStore,
}

impl DelegatingStore {
    pub fn new(local: LocalStore, remote: RemoteStore) -> Self {
        Self { local, remote }
    }

    pub fn local(&self) -> &LocalStore {
        &self.local
    }

    /// Get a config document, fetching and committing it from `cdn_host`/`path`
    /// on a local miss.
    pub async fn get_config(&self, cdn_host: &str, path: &str, key: &str) -> Result<Vec<u8>> {
        if let Ok(data) = self.local.get_config(key).await {
            return Ok(data);
        }
        let data = self.remote.fetch_config(cdn_host, path, key).await?;
        self.local.commit(Kind::Config, key, "", &data).await?;
        Ok(data)
    }

    /// Get an archive index, fetching and committing it on a local miss.
    pub async fn get_index(&self, cdn_host: &str, path: &str, key: &str) -> Result<Vec<u8>> {
        if let Ok(data) = self.local.get_index(key).await {
            return Ok(data);
        }
        let data = self.remote.fetch_index(cdn_host, path, key).await?;
        self.local.commit(Kind::Data, key, ".index", &data).await?;
        Ok(data)
    }

    /// Get a loose data object, fetching and committing it on a local miss.
    pub async fn get_data(&self, cdn_host: &str, path: &str, key: &str) -> Result<Vec<u8>> {
        if let Ok(data) = self.local.get_data(key).await {
            return Ok(data);
        }
        let data = self.remote.fetch_data(cdn_host, path, key).await?;
        self.local.commit(Kind::Data, key, "", &data).await?;
        Ok(data)
    }

    /// Get `[offset, offset + size)` of an archive's backing data object,
    /// fetching and committing the full archive on a local miss.
    pub async fn get_data_range(
        &self,
        cdn_host: &str,
        path: &str,
        key: &str,
        offset: u64,
        size: u64,
    ) -> Result<Vec<u8>> {
        if self.local.has_data(key).await {
            let mut file = self.local.get_archive(key).await?;
            use tokio::io::{AsyncReadExt, AsyncSeekExt};
            file.seek(std::io::SeekFrom::Start(offset)).await?;
            let mut buf = vec![0u8; size as usize];
            file.read_exact(&mut buf).await?;
            return Ok(buf);
        }
        self.remote
            .fetch_data_range(cdn_host, path, key, offset, size)
            .await
    }
}

/// Blocking counterpart of [`LocalStore`], over the same on-disk layout, for
/// [`tact_parser::build::BuildManager`].
///
/// The build manager's [`tact_parser::build::ObjectStore`] trait is
/// synchronous by design: it has no dependency on `ngdp-cache` or `tokio`, so
/// `tact-parser` stays usable outside an async runtime. By the time a build
/// manager is opened, the planner has already driven every object it
/// references through [`DelegatingStore`] into the local store, so this type
/// only ever needs to read what's already on disk — it never fetches, and
/// never needs `.await`.
pub struct SyncLocalStore {
    base_dir: PathBuf,
}

impl SyncLocalStore {
    /// Read the same on-disk layout a [`LocalStore`] at `base_dir` writes.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn partitioned_path(&self, subdir: &str, hex_key: &str, suffix: &str) -> PathBuf {
        let mut path = self.base_dir.join("objects").join(subdir);
        if hex_key.len() >= 4 {
            path.push(&hex_key[..2]);
            path.push(&hex_key[2..4]);
        }
        path.push(format!("{hex_key}{suffix}"));
        path
    }

    fn fragment_path(&self, hex_key: &str) -> PathBuf {
        let mut path = self.base_dir.join("fragments");
        if hex_key.len() >= 4 {
            path.push(&hex_key[..2]);
            path.push(&hex_key[2..4]);
        }
        path.push(hex_key);
        path
    }
}

impl tact_parser::build::ObjectStore for SyncLocalStore {
    type Error = std::io::Error;

    fn read_config(&self, key: &tact_parser::Md5) -> std::result::Result<Vec<u8>, Self::Error> {
        std::fs::read(self.partitioned_path("config", &hex::encode(key), ""))
    }

    fn has_data(&self, key: &tact_parser::Md5) -> bool {
        self.partitioned_path("data", &hex::encode(key), "").exists()
    }

    fn read_data(&self, key: &tact_parser::Md5) -> std::result::Result<Vec<u8>, Self::Error> {
        std::fs::read(self.partitioned_path("data", &hex::encode(key), ""))
    }

    fn read_data_range(
        &self,
        key: &tact_parser::Md5,
        offset: u64,
        size: u64,
    ) -> std::result::Result<Vec<u8>, Self::Error> {
        use std::io::{Read, Seek, SeekFrom};
        let mut file = std::fs::File::open(self.partitioned_path("data", &hex::encode(key), ""))?;
        file.seek(SeekFrom::Start(offset))?;
        let mut buf = vec![0u8; size as usize];
        file.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn read_fragment(
        &self,
        key: &tact_parser::Md5,
    ) -> std::result::Result<Option<Vec<u8>>, Self::Error> {
        match std::fs::read(self.fragment_path(&hex::encode(key))) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn commit_verifies_digest_before_rename() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::with_base_dir(dir.path()).await.unwrap();

        let data = b"hello world";
        let key = format!("{:x}", md5::compute(data));

        let path = store.commit(Kind::Config, &key, "", data).await.unwrap();
        assert!(path.exists());
        assert!(store.has_config(&key).await);

        let bad_key = "0".repeat(32);
        let err = store.commit(Kind::Config, &bad_key, "", data).await;
        assert!(err.is_err());
        assert!(!store.has_config(&bad_key).await);
    }

    #[tokio::test]
    async fn sync_store_reads_what_async_store_commits() {
        use tact_parser::build::ObjectStore as _;

        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::with_base_dir(dir.path()).await.unwrap();
        let data = b"a build config";
        let key_hex = format!("{:x}", md5::compute(data));
        store
            .commit(Kind::Config, &key_hex, "", data)
            .await
            .unwrap();

        let mut key = [0u8; 16];
        hex::decode_to_slice(&key_hex, &mut key).unwrap();

        let sync_store = SyncLocalStore::new(dir.path());
        assert_eq!(sync_store.read_config(&key).unwrap(), data);
    }

    #[tokio::test]
    async fn get_config_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::with_base_dir(dir.path()).await.unwrap();
        let data = b"some config text";
        let key = format!("{:x}", md5::compute(data));
        store.commit(Kind::Config, &key, "", data).await.unwrap();

        let read = store.get_config(&key).await.unwrap();
        assert_eq!(read, data);
    }
}
