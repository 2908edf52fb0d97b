//! Unifies `tact-client`'s HTTP transport and `ribbit-client`'s Ribbit/MIME
//! transport behind a single trait, so [`crate::state::StateCache`] can
//! ingest either without caring which one produced a given response body.

use crate::{Error, Result};
use tact_client::HttpClient;

/// One of the patch-server endpoints both transports expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateEndpoint {
    Versions,
    Cdns,
    Bgdl,
    /// Legacy V1-only blobs manifest. Ribbit has no equivalent.
    Blobs,
    /// Legacy V1-only game blob. Ribbit has no equivalent.
    BlobGame,
    /// Legacy V1-only install blob. Ribbit has no equivalent.
    BlobInstall,
}

impl StateEndpoint {
    /// Directory name this endpoint's responses are logged under.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Versions => "versions",
            Self::Cdns => "cdns",
            Self::Bgdl => "bgdl",
            Self::Blobs => "blobs",
            Self::BlobGame => "blob-game",
            Self::BlobInstall => "blob-install",
        }
    }

    /// Whether this endpoint's body is PSV and should feed the denormalized views.
    pub fn is_psv(&self) -> bool {
        matches!(self, Self::Versions | Self::Cdns | Self::Bgdl)
    }
}

/// A transport capable of fetching a [`StateEndpoint`]'s raw response body for a product.
#[async_trait::async_trait]
pub trait RemoteEndpoint: Send + Sync {
    /// Fetch the raw response body for `endpoint` and `product`.
    ///
    /// Returns [`Error::UnsupportedEndpoint`] if this transport has no
    /// equivalent of `endpoint` (eg: Ribbit has no legacy blobs endpoints).
    async fn fetch_endpoint(&self, product: &str, endpoint: StateEndpoint) -> Result<Vec<u8>>;
}

#[async_trait::async_trait]
impl RemoteEndpoint for HttpClient {
    async fn fetch_endpoint(&self, product: &str, endpoint: StateEndpoint) -> Result<Vec<u8>> {
        let response = match endpoint {
            StateEndpoint::Versions => self.get_versions(product).await?,
            StateEndpoint::Cdns => self.get_cdns(product).await?,
            StateEndpoint::Bgdl => self.get_bgdl(product).await?,
            StateEndpoint::Blobs => self.get_blobs(product).await?,
            StateEndpoint::BlobGame => self.get_blob_game(product).await?,
            StateEndpoint::BlobInstall => self.get_blob_install(product).await?,
        };
        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait::async_trait]
impl RemoteEndpoint for ribbit_client::RibbitClient {
    async fn fetch_endpoint(&self, product: &str, endpoint: StateEndpoint) -> Result<Vec<u8>> {
        let ribbit_endpoint = match endpoint {
            StateEndpoint::Versions => {
                ribbit_client::Endpoint::ProductVersions(product.to_string())
            }
            StateEndpoint::Cdns => ribbit_client::Endpoint::ProductCdns(product.to_string()),
            StateEndpoint::Bgdl => ribbit_client::Endpoint::ProductBgdl(product.to_string()),
            StateEndpoint::Blobs | StateEndpoint::BlobGame | StateEndpoint::BlobInstall => {
                return Err(Error::UnsupportedEndpoint(endpoint.as_str()));
            }
        };
        Ok(self.request_raw(&ribbit_endpoint).await?)
    }
}
