//! Error types for netfold.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NetfoldError {
    #[error("Invalid IPv4 prefix: {0}")]
    InvalidPrefix(String),

    #[error("Invalid prefix length in: {0}")]
    InvalidPrefixLength(String),

    #[error("Invalid country code: {0} (expected ISO-3166 alpha-2)")]
    InvalidCountryCode(String),

    #[error("Prefix query failed: {0}")]
    Query(String),
}
