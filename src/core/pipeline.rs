//! One extraction run.
//!
//! Stages run strictly in order:
//!
//! 1. **Indexed**: the primary bundle is loaded into a reuse index.
//! 2. **Extracting**: the output directory is cleared, templates are read in
//!    parallel, then allocated sequentially in path order so ordinals are
//!    deterministic.
//! 3. **UsageScanned**: raw sources are scanned for direct key references and
//!    the usage tracker is frozen into a live set.
//! 4. **Pruned**: every locale is generated, pruned and written in parallel.
//!
//! Any I/O failure before **Pruned** aborts the run with every bundle untouched.
//! A failing locale never touches its bundle and does not stop the others.

use std::{
    collections::HashSet,
    fs, io,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use colored::Colorize;
use rayon::prelude::*;

use crate::core::{
    allocator::{KeyAllocator, KeyOrigin},
    bundle::TranslationEntry,
    context::ExtractContext,
    file_scanner::{ScanOptions, scan_files},
    generator::{BundleGenerator, GenerateRequest},
    index::BundleIndex,
    namespace::Namespace,
    placeholder::{PlaceholderMatch, extract_placeholders},
    prune::{PruneOutcome, prune},
    template::{Message, RenderedTemplate, render_template},
    usage::{KeyReferenceScanner, LiveSet, UsageTracker},
    xtb::{read_bundle, to_xtb_string, write_bundle},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Idle,
    Indexed,
    Extracting,
    UsageScanned,
    Pruned,
}

/// What happened to one locale bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleReport {
    /// Keys that were not in the bundle before this run.
    pub added: Vec<String>,
    /// Records dropped by pruning.
    pub removed: Vec<TranslationEntry>,
    /// Records in the resulting bundle.
    pub total: usize,
    /// Whether the resulting file differs from the one on disk.
    pub changed: bool,
    pub written: bool,
}

#[derive(Debug)]
pub struct LocaleOutcome {
    pub locale: String,
    pub bundle_path: PathBuf,
    pub result: Result<LocaleReport>,
}

#[derive(Debug, Default)]
pub struct ExtractionReport {
    pub templates: Vec<RenderedTemplate>,
    pub source_file_count: usize,
    /// Distinct keys referenced directly from raw sources.
    pub referenced_key_count: usize,
    pub live_key_count: usize,
    pub locales: Vec<LocaleOutcome>,
    pub apply: bool,
}

impl ExtractionReport {
    pub fn message_count(&self) -> usize {
        self.templates.iter().map(|t| t.messages.len()).sum()
    }

    pub fn count_origin(&self, origin: KeyOrigin) -> usize {
        self.templates
            .iter()
            .flat_map(|t| &t.messages)
            .filter(|m| m.origin == origin)
            .count()
    }

    pub fn failed_locales(&self) -> impl Iterator<Item = &LocaleOutcome> {
        self.locales.iter().filter(|l| l.result.is_err())
    }
}

pub struct Pipeline<'a> {
    ctx: &'a ExtractContext,
    generator: &'a dyn BundleGenerator,
    stage: Stage,
}

impl<'a> Pipeline<'a> {
    pub fn new(ctx: &'a ExtractContext, generator: &'a dyn BundleGenerator) -> Self {
        Self {
            ctx,
            generator,
            stage: Stage::Idle,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Run every stage. Bundles are only written when `apply` is set;
    /// message modules are always written.
    ///
    /// Each run starts from `Idle` with a fresh index and tracker.
    pub fn run(&mut self, apply: bool) -> Result<ExtractionReport> {
        self.stage = Stage::Idle;

        let index = self.load_index()?;
        self.advance(Stage::Indexed);

        self.advance(Stage::Extracting);
        self.clear_output_dir()?;
        let mut allocator = KeyAllocator::new(index);
        let templates = self.extract_templates(&mut allocator)?;
        self.write_modules(&templates)?;

        let mut tracker = allocator.into_tracker();
        let (source_file_count, referenced_key_count) = self.scan_sources(&mut tracker)?;
        let live = tracker.finish();
        self.advance(Stage::UsageScanned);

        let messages: Vec<Message> = templates
            .iter()
            .flat_map(|t| t.messages.iter().cloned())
            .collect();

        let locales = self
            .ctx
            .config
            .locales
            .par_iter()
            .map(|locale| {
                let bundle_path = self.ctx.bundle_path(locale);
                let result = self.process_locale(locale, &bundle_path, &messages, &live, apply);
                LocaleOutcome {
                    locale: locale.clone(),
                    bundle_path,
                    result,
                }
            })
            .collect();
        self.advance(Stage::Pruned);

        Ok(ExtractionReport {
            templates,
            source_file_count,
            referenced_key_count,
            live_key_count: live.len(),
            locales,
            apply,
        })
    }

    fn advance(&mut self, next: Stage) {
        debug_assert!(next > self.stage);
        self.stage = next;
    }

    fn load_index(&self) -> Result<BundleIndex> {
        let locale = &self.ctx.config.primary_locale;
        let path = self.ctx.bundle_path(locale);

        let bundle = read_bundle(&path)
            .with_context(|| format!("Failed to read primary bundle: {}", path.display()))?;
        match bundle {
            Some(bundle) => Ok(BundleIndex::from_bundle(&bundle)),
            None => {
                if self.ctx.verbose {
                    eprintln!(
                        "{} No bundle for primary locale {} at {}, all keys will be new",
                        "note:".bold().cyan(),
                        locale,
                        path.display()
                    );
                }
                Ok(BundleIndex::empty())
            }
        }
    }

    /// Remove artifacts of earlier runs. Refuses to clear a directory that
    /// holds the project, its templates or its bundles.
    fn clear_output_dir(&self) -> Result<()> {
        let output_dir = self.ctx.output_dir();
        let target = match output_dir.canonicalize() {
            Ok(target) => target,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Failed to resolve {}", output_dir.display()));
            }
        };

        let protected = [
            self.ctx.root_dir.clone(),
            self.ctx.template_root(),
            self.ctx.messages_root(),
        ];
        if let Some(path) = protected
            .iter()
            .filter_map(|path| path.canonicalize().ok())
            .find(|path| path.starts_with(&target))
        {
            bail!(
                "outputDir {} contains {}; refusing to clear it",
                output_dir.display(),
                path.display()
            );
        }

        fs::remove_dir_all(&target)
            .with_context(|| format!("Failed to clear {}", output_dir.display()))
    }

    fn extract_templates(&self, allocator: &mut KeyAllocator) -> Result<Vec<RenderedTemplate>> {
        let config = &self.ctx.config;
        let template_root = self.ctx.template_root();
        if !template_root.is_dir() {
            if self.ctx.verbose {
                eprintln!(
                    "{} Template root {} does not exist, no templates to extract",
                    "note:".bold().cyan(),
                    template_root.display()
                );
            }
            return Ok(Vec::new());
        }

        let files: Vec<PathBuf> = scan_files(
            &template_root,
            &ScanOptions {
                includes: &config.template_includes,
                ignores: &config.ignores,
                extensions: &config.template_extensions,
                verbose: self.ctx.verbose,
            },
        )
        .with_context(|| format!("Failed to scan templates in {}", template_root.display()))?
        .into_iter()
        .collect();
        let parsed: Vec<(PathBuf, String, Vec<PlaceholderMatch>)> = files
            .into_par_iter()
            .map(|path| -> Result<(PathBuf, String, Vec<PlaceholderMatch>)> {
                let content = fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read template: {}", path.display()))?;
                let placeholders = extract_placeholders(&content).collect();
                Ok((path, content, placeholders))
            })
            .collect::<Result<_>>()?;

        let mut rendered = Vec::with_capacity(parsed.len());
        for (path, content, placeholders) in parsed {
            let namespace = Namespace::for_template(&template_root, &path, &config.key_prefix);
            let allocations = allocator.allocate_template(&namespace, &placeholders);
            let relative_path = relative_slash_path(&template_root, &path);
            rendered.push(render_template(
                &relative_path,
                &namespace,
                &content,
                &placeholders,
                &allocations,
            )?);
        }

        Ok(rendered)
    }

    fn write_modules(&self, templates: &[RenderedTemplate]) -> Result<()> {
        let output_dir = self.ctx.output_dir();

        templates.par_iter().try_for_each(|template| -> Result<()> {
            let html_path = output_dir.join(&template.relative_path);
            let module_path = output_dir.join(format!("{}.js", template.relative_path));
            if let Some(parent) = html_path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            fs::write(&module_path, &template.module)
                .with_context(|| format!("Failed to write {}", module_path.display()))?;
            fs::write(&html_path, &template.html)
                .with_context(|| format!("Failed to write {}", html_path.display()))?;
            Ok(())
        })
    }

    fn scan_sources(&self, tracker: &mut UsageTracker) -> Result<(usize, usize)> {
        let config = &self.ctx.config;
        let scanner = KeyReferenceScanner::new(&config.key_prefix)
            .with_context(|| format!("Invalid key prefix: {}", config.key_prefix))?;

        let files = scan_files(
            &self.ctx.root_dir,
            &ScanOptions {
                includes: &config.source_includes,
                ignores: &config.ignores,
                extensions: &config.source_extensions,
                verbose: self.ctx.verbose,
            },
        )
        .context("Failed to scan sources")?;

        let file_count = files.len();
        let references = files
            .par_iter()
            .map(|path| -> Result<HashSet<String>> {
                let content = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read source: {}", path.display()))?;
                Ok(scanner.collect_references(&content))
            })
            .try_reduce(Default::default, |mut acc, keys| {
                acc.extend(keys);
                Ok(acc)
            })?;

        let referenced = references.len();
        tracker.extend(references);
        Ok((file_count, referenced))
    }

    fn process_locale(
        &self,
        locale: &str,
        bundle_path: &Path,
        messages: &[Message],
        live: &LiveSet,
        apply: bool,
    ) -> Result<LocaleReport> {
        let previous = read_bundle(bundle_path)
            .with_context(|| format!("Failed to read bundle: {}", bundle_path.display()))?;

        let request = GenerateRequest {
            locale,
            is_primary: locale == self.ctx.config.primary_locale,
            messages,
            bundle_path,
            messages_dir: &self.ctx.output_dir(),
        };
        let generated = self.generator.generate(&request)?;
        let PruneOutcome { bundle, removed } = prune(generated, live);

        let added: Vec<String> = bundle
            .entries()
            .iter()
            .filter(|entry| {
                previous
                    .as_ref()
                    .is_none_or(|prev| !prev.contains_key(&entry.key))
            })
            .map(|entry| entry.key.clone())
            .collect();

        let content = to_xtb_string(&bundle)?;
        let changed = fs::read_to_string(bundle_path).ok().as_deref() != Some(content.as_str());

        let written = apply && changed;
        if written {
            if let Some(parent) = bundle_path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            write_bundle(bundle_path, &bundle)
                .with_context(|| format!("Failed to write bundle: {}", bundle_path.display()))?;
        }

        Ok(LocaleReport {
            added,
            removed,
            total: bundle.len(),
            changed,
            written,
        })
    }
}

fn relative_slash_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
