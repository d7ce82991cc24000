//! Extraction engine.
//!
//! - `placeholder`, `namespace`: what a template contains and where its keys live
//! - `bundle`, `xtb`, `index`: translation bundles on disk and in memory
//! - `allocator`, `usage`, `prune`: key assignment and liveness
//! - `template`, `generator`: message modules and per-locale bundles
//! - `pipeline`: the stages of one run, driven by an [`ExtractContext`]

pub mod allocator;
pub mod bundle;
pub mod context;
pub mod error;
pub mod file_scanner;
pub mod generator;
pub mod index;
pub mod namespace;
pub mod pipeline;
pub mod placeholder;
pub mod prune;
pub mod template;
pub mod usage;
pub mod xtb;

pub use allocator::{Allocation, KeyAllocator, KeyOrigin};
pub use bundle::{Bundle, TranslationEntry};
pub use context::ExtractContext;
pub use error::BundleError;
pub use index::BundleIndex;
pub use namespace::Namespace;
pub use pipeline::{ExtractionReport, LocaleOutcome, LocaleReport, Pipeline, Stage};
pub use placeholder::{PlaceholderMatch, extract_placeholders};
pub use usage::{KeyReferenceScanner, LiveSet, UsageTracker};
