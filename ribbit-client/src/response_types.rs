//! Strongly-typed response definitions for all Ribbit endpoints
//!
//! This module provides type-safe representations of responses from various
//! Ribbit endpoints, automatically parsing BPSV data into structured Rust types.

use crate::{Error, Response, error::Result};
use ngdp_bpsv::BpsvDocument;

/// Trait for typed responses that can be parsed from BPSV documents
pub trait TypedResponse: Sized {
    /// Parse the response from a BPSV document
    ///
    /// # Errors
    /// Returns an error if parsing the BPSV document fails.
    fn from_bpsv(doc: &BpsvDocument) -> Result<Self>;

    /// Parse from a raw response
    ///
    /// # Errors
    /// Returns an error if the response has no data or parsing fails.
    fn from_response(response: &Response) -> Result<Self> {
        match &response.data {
            Some(data) => {
                // Parse directly - BPSV parser now correctly handles HEX:N as N bytes
                let doc = BpsvDocument::parse(data)
                    .map_err(|e| Error::ParseError(format!("BPSV parse error: {e}")))?;
                Self::from_bpsv(&doc)
            }
            None => Err(Error::ParseError("No data in response".to_string())),
        }
    }
}

/// Product versions response containing build information for all regions
#[derive(Debug, Clone, PartialEq)]
pub struct ProductVersionsResponse {
    /// Sequence number from the BPSV document
    pub sequence_number: Option<u32>,
    /// Version entries for each region
    pub entries: Vec<VersionEntry>,
}

/// Single version entry for a specific region
#[derive(Debug, Clone, PartialEq)]
pub struct VersionEntry {
    /// Region code (us, eu, cn, kr, tw, sg)
    pub region: String,
    /// Build configuration hash (16 bytes hex)
    pub build_config: String,
    /// CDN configuration hash (16 bytes hex)
    pub cdn_config: String,
    /// Optional keyring hash (16 bytes hex)
    pub key_ring: Option<String>,
    /// Build ID number
    pub build_id: u32,
    /// Human-readable version name
    pub versions_name: String,
    /// Product configuration hash (16 bytes hex)
    pub product_config: String,
}

/// CDN server information response
#[derive(Debug, Clone, PartialEq)]
pub struct ProductCdnsResponse {
    /// Sequence number from the BPSV document
    pub sequence_number: Option<u32>,
    /// CDN entries for each region/configuration
    pub entries: Vec<CdnEntry>,
}

/// CDN configuration entry
#[derive(Debug, Clone, PartialEq)]
pub struct CdnEntry {
    /// CDN name/identifier
    pub name: String,
    /// CDN path prefix
    pub path: String,
    /// List of CDN hostnames
    pub hosts: Vec<String>,
    /// List of CDN server URLs
    pub servers: Vec<String>,
    /// Configuration path on the CDN
    pub config_path: String,
}

/// Background download configuration response
#[derive(Debug, Clone, PartialEq)]
pub struct ProductBgdlResponse {
    /// Sequence number from the BPSV document
    pub sequence_number: Option<u32>,
    /// Background download entries per region
    pub entries: Vec<BgdlEntry>,
}

/// Background download configuration entry
#[derive(Debug, Clone, PartialEq)]
pub struct BgdlEntry {
    /// Region code
    pub region: String,
    /// Build configuration hash
    pub build_config: String,
    /// CDN configuration hash
    pub cdn_config: String,
    /// Optional install background download config
    pub install_bgdl_config: Option<String>,
    /// Optional game background download config
    pub game_bgdl_config: Option<String>,
}

/// Summary of all available products
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryResponse {
    /// Sequence number from the BPSV document
    pub sequence_number: Option<u32>,
    /// List of available products
    pub products: Vec<ProductSummary>,
}

/// Summary information for a single product
#[derive(Debug, Clone, PartialEq)]
pub struct ProductSummary {
    /// Product code (e.g., "wow", "d3", "hero")
    pub product: String,
    /// Product-specific sequence number
    pub seqn: u32,
    /// Optional flags
    pub flags: Option<String>,
}

/// Helper struct for accessing BPSV row data by field name
struct FieldAccessor<'a> {
    row: &'a ngdp_bpsv::document::BpsvRow<'a>,
    schema: &'a ngdp_bpsv::BpsvSchema,
}

impl<'a> FieldAccessor<'a> {
    fn new(row: &'a ngdp_bpsv::document::BpsvRow, schema: &'a ngdp_bpsv::BpsvSchema) -> Self {
        Self { row, schema }
    }

    fn get_string(&self, field: &str) -> Result<String> {
        self.row
            .get_raw_by_name(field, self.schema)
            .map(std::string::ToString::to_string)
            .ok_or_else(|| Error::ParseError(format!("Missing field: {field}")))
    }

    fn get_string_optional(&self, field: &str) -> Option<String> {
        self.row.get_raw_by_name(field, self.schema).and_then(|s| {
            if s.is_empty() {
                None
            } else {
                Some(s.to_string())
            }
        })
    }

    fn get_u32(&self, field: &str) -> Result<u32> {
        let value = self.get_string(field)?;
        value
            .parse()
            .map_err(|_| Error::ParseError(format!("Invalid u32 for {field}: {value}")))
    }

    fn get_string_list(&self, field: &str, separator: char) -> Result<Vec<String>> {
        let value = self.get_string(field)?;
        if value.is_empty() {
            Ok(Vec::new())
        } else {
            Ok(value
                .split(separator)
                .map(|s| s.trim().to_string())
                .collect())
        }
    }
}

// Implementations for each response type

impl TypedResponse for ProductVersionsResponse {
    fn from_bpsv(doc: &BpsvDocument) -> Result<Self> {
        let mut entries = Vec::new();
        let schema = doc.schema();

        for row in doc.rows() {
            let accessor = FieldAccessor::new(row, schema);

            entries.push(VersionEntry {
                region: accessor.get_string("Region")?,
                build_config: accessor.get_string("BuildConfig")?,
                cdn_config: accessor.get_string("CDNConfig")?,
                key_ring: accessor.get_string_optional("KeyRing"),
                build_id: accessor.get_u32("BuildId")?,
                versions_name: accessor.get_string("VersionsName")?,
                product_config: accessor.get_string("ProductConfig")?,
            });
        }

        Ok(Self {
            sequence_number: doc.sequence_number(),
            entries,
        })
    }
}

impl TypedResponse for ProductCdnsResponse {
    fn from_bpsv(doc: &BpsvDocument) -> Result<Self> {
        let mut entries = Vec::new();
        let schema = doc.schema();

        for row in doc.rows() {
            let accessor = FieldAccessor::new(row, schema);

            entries.push(CdnEntry {
                name: accessor.get_string("Name")?,
                path: accessor.get_string("Path")?,
                hosts: accessor.get_string_list("Hosts", ' ')?,
                servers: accessor
                    .get_string_optional("Servers")
                    .map(|s| {
                        s.split_whitespace()
                            .map(std::string::ToString::to_string)
                            .collect::<Vec<_>>()
                    })
                    .unwrap_or_default(),
                config_path: accessor.get_string("ConfigPath")?,
            });
        }

        Ok(Self {
            sequence_number: doc.sequence_number(),
            entries,
        })
    }
}

impl TypedResponse for ProductBgdlResponse {
    fn from_bpsv(doc: &BpsvDocument) -> Result<Self> {
        let mut entries = Vec::new();
        let schema = doc.schema();

        for row in doc.rows() {
            let accessor = FieldAccessor::new(row, schema);

            entries.push(BgdlEntry {
                region: accessor.get_string("Region")?,
                build_config: accessor.get_string("BuildConfig")?,
                cdn_config: accessor.get_string("CDNConfig")?,
                install_bgdl_config: accessor.get_string_optional("InstallBGDLConfig"),
                game_bgdl_config: accessor.get_string_optional("GameBGDLConfig"),
            });
        }

        Ok(Self {
            sequence_number: doc.sequence_number(),
            entries,
        })
    }
}

impl TypedResponse for SummaryResponse {
    fn from_bpsv(doc: &BpsvDocument) -> Result<Self> {
        let mut products = Vec::new();
        let schema = doc.schema();

        for row in doc.rows() {
            let accessor = FieldAccessor::new(row, schema);

            products.push(ProductSummary {
                product: accessor.get_string("Product")?,
                seqn: accessor.get_u32("Seqn")?,
                flags: accessor.get_string_optional("Flags"),
            });
        }

        Ok(Self {
            sequence_number: doc.sequence_number(),
            products,
        })
    }
}

/// Convenience methods for response types
impl ProductVersionsResponse {
    /// Get version entry for a specific region
    #[must_use]
    pub fn get_region(&self, region: &str) -> Option<&VersionEntry> {
        self.entries.iter().find(|e| e.region == region)
    }

    /// Get all unique build IDs
    #[must_use]
    pub fn build_ids(&self) -> Vec<u32> {
        let mut ids: Vec<_> = self.entries.iter().map(|e| e.build_id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

impl ProductCdnsResponse {
    /// Get CDN entry by name
    #[must_use]
    pub fn get_cdn(&self, name: &str) -> Option<&CdnEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Get all unique CDN hosts
    #[must_use]
    pub fn all_hosts(&self) -> Vec<String> {
        let mut hosts = Vec::new();
        for entry in &self.entries {
            hosts.extend(entry.hosts.clone());
        }
        hosts.sort();
        hosts.dedup();
        hosts
    }
}

impl SummaryResponse {
    /// Get summary for a specific product
    #[must_use]
    pub fn get_product(&self, product: &str) -> Option<&ProductSummary> {
        self.products.iter().find(|p| p.product == product)
    }

    /// Get all product codes
    #[must_use]
    pub fn product_codes(&self) -> Vec<&str> {
        self.products.iter().map(|p| p.product.as_str()).collect()
    }
}
