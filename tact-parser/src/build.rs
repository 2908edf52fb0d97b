//! Build manager: opens a build from its `(build_config, cdn_config)` pair and
//! lazily resolves the manifests and archive group it references.
//!
//! This module is generic over an [`ObjectStore`] trait rather than any
//! concrete storage backend, so it has no dependency on `ngdp-cache` — the
//! caller supplies a type that knows how to fetch configs, loose data, and
//! fragments by key.

use crate::{
    Error, Md5, Result,
    archive::{ArchiveGroup, ArchiveGroupEntry},
    config::{BuildConfig, CdnConfig, ConfigParsable},
    download::DownloadManifest,
    encoding::EncodingFile,
    install::InstallManifest,
};
use ngdp_crypto::KeyService;
use std::io::Cursor;
use tracing::*;

/// Storage backend a [`BuildManager`] reads build content through.
///
/// Implementations are expected to be content-addressed: `key` is always the
/// MD5 (as C-Key or E-Key, depending on the method) of the content being
/// requested.
pub trait ObjectStore {
    /// Error type raised by this store.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read a config document (build config, CDN config, archive index) by key.
    fn read_config(&self, key: &Md5) -> std::result::Result<Vec<u8>, Self::Error>;

    /// Whether a loose (non-archived) data object exists for `key`.
    fn has_data(&self, key: &Md5) -> bool;

    /// Read a loose data object by its E-Key.
    fn read_data(&self, key: &Md5) -> std::result::Result<Vec<u8>, Self::Error>;

    /// Read a byte range `[offset, offset + size)` out of the data object `key`
    /// (an archive's backing object).
    fn read_data_range(
        &self,
        key: &Md5,
        offset: u64,
        size: u64,
    ) -> std::result::Result<Vec<u8>, Self::Error>;

    /// Read a standalone fragment by its E-Key, if one exists.
    fn read_fragment(&self, key: &Md5) -> std::result::Result<Option<Vec<u8>>, Self::Error>;
}

fn wrap_err<E: std::error::Error + Send + Sync + 'static>(e: E) -> Error {
    Error::Store(Box::new(e))
}

/// An opened build: lazily parses the configs, archive group, and manifests
/// a build references, caching each for the manager's lifetime.
pub struct BuildManager<S: ObjectStore> {
    store: S,
    build_config_key: Md5,
    cdn_config_key: Md5,
    key_service: Option<KeyService>,

    build_config: Option<BuildConfig>,
    cdn_config: Option<CdnConfig>,
    archive_group: Option<ArchiveGroup<Cursor<Vec<u8>>>>,
    encoding: Option<EncodingFile>,
    install: Option<InstallManifest>,
    download: Option<DownloadManifest>,
}

impl<S: ObjectStore> BuildManager<S> {
    /// Open a build from its config-key pair, over `store`.
    pub fn new(store: S, build_config_key: Md5, cdn_config_key: Md5) -> Self {
        Self {
            store,
            build_config_key,
            cdn_config_key,
            key_service: None,
            build_config: None,
            cdn_config: None,
            archive_group: None,
            encoding: None,
            install: None,
            download: None,
        }
    }

    /// Attach a decryption key table, used when decoding encrypted BLTE chunks.
    pub fn with_key_service(mut self, key_service: KeyService) -> Self {
        self.key_service = Some(key_service);
        self
    }

    /// The build config, parsing and caching it on first access.
    pub fn build_config(&mut self) -> Result<&BuildConfig> {
        if self.build_config.is_none() {
            let data = self
                .store
                .read_config(&self.build_config_key)
                .map_err(wrap_err)?;
            self.build_config = Some(BuildConfig::parse_config(Cursor::new(data))?);
        }
        Ok(self.build_config.as_ref().unwrap())
    }

    /// The CDN config, parsing and caching it on first access.
    pub fn cdn_config(&mut self) -> Result<&CdnConfig> {
        if self.cdn_config.is_none() {
            let data = self
                .store
                .read_config(&self.cdn_config_key)
                .map_err(wrap_err)?;
            self.cdn_config = Some(CdnConfig::parse_config(Cursor::new(data))?);
        }
        Ok(self.cdn_config.as_ref().unwrap())
    }

    /// The union of archive indices named by the CDN config, in CDN-config order.
    pub fn archive_group(&mut self) -> Result<&mut ArchiveGroup<Cursor<Vec<u8>>>> {
        if self.archive_group.is_none() {
            let archives = self
                .cdn_config()?
                .archives
                .clone()
                .unwrap_or_default();

            let mut group = ArchiveGroup::new();
            for archive_key in archives {
                let index_data = self.store.read_config(&archive_key).map_err(wrap_err)?;
                let parser =
                    crate::archive::ArchiveIndexParser::new(Cursor::new(index_data), &archive_key)?;
                group.push(archive_key, parser);
            }
            self.archive_group = Some(group);
        }
        Ok(self.archive_group.as_mut().unwrap())
    }

    /// The build's encoding file (CKey<->EKey directory).
    pub fn encoding(&mut self) -> Result<&EncodingFile> {
        if self.encoding.is_none() {
            let key = self
                .build_config()?
                .encoding
                .ok_or(Error::NotFound {
                    kind: "encoding",
                    key: String::new(),
                })?
                .current();
            let data = self.store.read_data(&key).map_err(wrap_err)?;
            self.encoding = Some(EncodingFile::parse(&data)?);
        }
        Ok(self.encoding.as_ref().unwrap())
    }

    /// The build's install manifest, if one is referenced.
    ///
    /// Like `encoding`, the build config gives `install`'s E-Key directly
    /// (`install = CKey EKey`) rather than requiring an encoding-file lookup.
    pub fn install(&mut self) -> Result<&InstallManifest> {
        if self.install.is_none() {
            let pair = self.build_config()?.install.ok_or(Error::NotFound {
                kind: "install",
                key: String::new(),
            })?;
            let bytes = self.decode_ekey(&pair.current())?;
            self.install = Some(InstallManifest::parse(&bytes)?);
        }
        Ok(self.install.as_ref().unwrap())
    }

    /// The build's download manifest, if one is referenced.
    pub fn download(&mut self) -> Result<&DownloadManifest> {
        if self.download.is_none() {
            let pair = self.build_config()?.download.ok_or(Error::NotFound {
                kind: "download",
                key: String::new(),
            })?;
            let bytes = self.decode_ekey(&pair.current())?;
            self.download = Some(DownloadManifest::parse(&bytes)?);
        }
        Ok(self.download.as_ref().unwrap())
    }

    /// Fetch and BLTE-decode the root manifest's raw bytes, resolving its
    /// C-Key through the encoding file. Callers parse the result with
    /// [`crate::wow_root`] for the product's root-file format.
    pub fn root_bytes(&mut self) -> Result<Vec<u8>> {
        let ckey = self.build_config()?.root.ok_or(Error::NotFound {
            kind: "root",
            key: String::new(),
        })?;
        self.get_file(&ckey)
    }

    /// Look up `ckey`'s E-Key in the encoding file.
    fn ckey_to_ekey(&mut self, ckey: &Md5) -> Result<Md5> {
        let ekey_vec = self
            .encoding()?
            .get_ekey_for_ckey(ckey)
            .ok_or_else(|| Error::NotFound {
                kind: "ckey",
                key: hex::encode(ckey),
            })?
            .clone();
        ekey_vec
            .as_slice()
            .try_into()
            .map_err(|_| Error::BadEncodingKeyLength)
    }

    /// Fetch and BLTE-decode the file identified by `ckey`.
    ///
    /// Resolution order: loose blob, then fragment, then the archive group.
    /// Fails with [`Error::NotFound`] when none of these have the E-Key the
    /// encoding file maps `ckey` to.
    pub fn get_file(&mut self, ckey: &Md5) -> Result<Vec<u8>> {
        let ekey = self.ckey_to_ekey(ckey)?;
        self.decode_ekey(&ekey)
    }

    fn decode_ekey(&mut self, ekey: &Md5) -> Result<Vec<u8>> {
        let (encoded, encoded_len) = self.read_encoded(ekey)?;
        debug!("decoding ekey {} ({encoded_len} bytes)", hex::encode(ekey));
        let decoded = blte::decode(
            Cursor::new(encoded),
            encoded_len,
            Some(ekey),
            self.key_service.as_ref(),
        )?;
        Ok(decoded.into_inner())
    }

    /// Fetch the raw (still BLTE-encoded) bytes for `ckey`, without decoding.
    pub fn get_file_raw(&mut self, ckey: &Md5) -> Result<Vec<u8>> {
        let ekey = self.ckey_to_ekey(ckey)?;
        Ok(self.read_encoded(&ekey)?.0)
    }

    /// Resolve `ekey` to its encoded bytes: loose blob, then fragment, then archive group.
    fn read_encoded(&mut self, ekey: &Md5) -> Result<(Vec<u8>, u64)> {
        if self.store.has_data(ekey) {
            let data = self.store.read_data(ekey).map_err(wrap_err)?;
            let len = data.len() as u64;
            return Ok((data, len));
        }

        if let Some(data) = self.store.read_fragment(ekey).map_err(wrap_err)? {
            let len = data.len() as u64;
            return Ok((data, len));
        }

        let entry = self.archive_group()?.lookup(ekey)?;
        match entry {
            Some(ArchiveGroupEntry {
                archive_key,
                size,
                offset,
            }) => {
                let data = self
                    .store
                    .read_data_range(&archive_key, offset, size)
                    .map_err(wrap_err)?;
                Ok((data, size))
            }
            None => Err(Error::NotFound {
                kind: "ekey",
                key: hex::encode(ekey),
            }),
        }
    }
}
