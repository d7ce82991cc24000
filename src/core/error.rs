//! Errors returned while reading or writing translation bundles.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BundleError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed XML at byte {position}: {message}")]
    Malformed { position: u64, message: String },

    #[error("invalid bundle: {0}")]
    InvalidBundle(String),

    #[error("duplicate translation key `{0}`")]
    DuplicateKey(String),
}

impl BundleError {
    pub fn malformed(position: u64, message: impl Into<String>) -> Self {
        BundleError::Malformed {
            position,
            message: message.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        BundleError::InvalidBundle(message.into())
    }
}
