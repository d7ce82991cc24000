//! msgkeys - message key extraction for Closure-style i18n
//!
//! msgkeys scans HTML templates for `[[text|description]]` placeholders,
//! gives every placeholder a stable message key, writes `goog.getMsg`
//! modules for the Closure compiler and keeps the per-locale XTB bundles in
//! sync, reusing existing keys and pruning the ones nothing references.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer
//! - `config`: Configuration file loading and parsing
//! - `core`: Extraction engine (index, extract, scan usage, generate and prune)

pub mod cli;
pub mod config;
pub mod core;
