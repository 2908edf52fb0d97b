use crate::{Error, Result, config::parser::ConfigParsableInternal};
use tracing::*;

/// Product-level configuration: decryption key naming and product metadata.
///
/// Unlike [`BuildConfig`][super::BuildConfig] and [`CdnConfig`][super::CdnConfig],
/// most of this document's keys are product-specific and not modeled here; only
/// the fields the build pipeline actually consumes are parsed.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ProductConfig {
    /// Name of the key used to decrypt this product's encrypted content, if any.
    pub decryption_key_name: Option<String>,

    /// Product identifier (eg: `wow`, `wow_classic`).
    pub product: Option<String>,

    /// Whether this product is active for its region.
    pub active: Option<bool>,
}

impl ConfigParsableInternal for ProductConfig {
    fn handle_kv(o: &mut Self, k: &str, v: &str) -> Result<()> {
        match k.to_ascii_lowercase().as_str() {
            "decryption-key-name" => {
                o.decryption_key_name = Some(v.to_string());
            }
            "product" => {
                o.product = Some(v.to_string());
            }
            "active" => {
                o.active = Some(match v {
                    "0" => false,
                    "1" => true,
                    _ => return Err(Error::ConfigTypeMismatch),
                });
            }
            other => {
                warn!("Unknown config key: {other:?}");
            }
        }

        Ok(())
    }
}
