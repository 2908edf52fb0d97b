//! Generic cache implementation for arbitrary data

use crate::{Cache, Result};
use std::{
    ops::Deref,
    path::{Path, PathBuf},
};

/// Generic cache for storing arbitrary data
pub struct GenericCache {
    c: Cache,
}

impl GenericCache {
    /// Create a new generic cache in
    /// [the user's cache directory][crate::get_cache_dir].
    pub async fn new() -> Result<Self> {
        let c = Cache::with_subdirectory("generic").await?;
        Ok(Self { c })
    }

    /// Create a new generic cache with a custom subdirectory
    pub async fn with_subdirectory(subdir: impl AsRef<Path>) -> Result<Self> {
        let subdir = PathBuf::from("generic").join(subdir);
        let c = Cache::with_subdirectory(subdir).await?;
        Ok(Self { c })
    }

    /// Create a CDN cache with a custom base directory
    pub async fn with_base_dir(base_dir: impl AsRef<Path>) -> Result<Self> {
        let path = base_dir.as_ref().join("cdn");
        let c = Cache::with_base_dir(path).await?;
        Ok(Self { c })
    }
}

impl Deref for GenericCache {
    type Target = Cache;

    fn deref(&self) -> &Self::Target {
        &self.c
    }
}
