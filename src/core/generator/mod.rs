//! Per-locale bundle generation.
//!
//! A generator turns the messages of a run into the locale's next bundle,
//! before pruning. The built-in [`NativeGenerator`] merges in-process; the
//! [`CommandGenerator`] delegates to an external tool such as Closure's
//! `XtbGenerator.jar`.

mod command;
mod native;

use std::path::Path;

use anyhow::Result;

pub use command::CommandGenerator;
pub use native::NativeGenerator;

use crate::core::{bundle::Bundle, template::Message};

/// Everything a generator needs for one locale.
#[derive(Debug, Clone, Copy)]
pub struct GenerateRequest<'a> {
    pub locale: &'a str,
    /// Whether `locale` is the source language of the templates.
    pub is_primary: bool,
    /// Messages of every template, in processing order.
    pub messages: &'a [Message],
    /// Current bundle file of the locale (may not exist yet).
    pub bundle_path: &'a Path,
    /// Directory holding the generated message modules.
    pub messages_dir: &'a Path,
}

pub trait BundleGenerator: Send + Sync {
    /// Produce the locale's new bundle. Must not modify `bundle_path`.
    fn generate(&self, request: &GenerateRequest<'_>) -> Result<Bundle>;
}
