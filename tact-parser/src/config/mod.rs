//! TACT configuration file parsers.
mod build;
mod cdn;
mod parser;
mod product;

pub use self::{build::BuildConfig, cdn::CdnConfig, product::ProductConfig};
pub use parser::ConfigParsable;
