use std::path::{Component, Path, PathBuf};

use anyhow::Result;
use colored::Colorize;

use crate::{
    cli::args::CommonArgs,
    config::{CONFIG_FILE_NAME, Config, GeneratorConfig, load_config},
    core::generator::{BundleGenerator, CommandGenerator, NativeGenerator},
};

/// Resolved settings of one extraction run.
///
/// Configuration is merged with the following priority (highest to lowest):
/// 1. CLI arguments (e.g. `--primary-locale en`)
/// 2. `.msgkeysrc.json` config file
/// 3. Built-in defaults
#[derive(Debug, Clone)]
pub struct ExtractContext {
    pub config: Config,
    /// Project root; every relative path in the config is resolved against it.
    pub root_dir: PathBuf,
    pub verbose: bool,
}

impl ExtractContext {
    pub fn new(common_args: &CommonArgs) -> Result<Self> {
        let verbose = common_args.verbose;
        let root_dir = common_args
            .source_root
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));

        let config_result = load_config(&root_dir)?;
        if verbose && !config_result.from_file {
            eprintln!(
                "{} No {} found, using default configuration",
                "note:".bold().cyan(),
                CONFIG_FILE_NAME
            );
        }

        let mut config = config_result.config;

        if let Some(ref primary_locale) = common_args.primary_locale {
            config.primary_locale = primary_locale.clone();
            if !config.locales.contains(primary_locale) {
                config.locales.insert(0, primary_locale.clone());
            }
        }

        if let Some(ref messages_root) = common_args.messages_root {
            config.messages_root = messages_root.to_string_lossy().to_string();
        }

        config.validate()?;

        Ok(Self::from_config(root_dir, config, verbose))
    }

    pub fn from_config(root_dir: impl Into<PathBuf>, config: Config, verbose: bool) -> Self {
        Self {
            config,
            root_dir: root_dir.into(),
            verbose,
        }
    }

    /// Resolve a config path against the project root.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            return path.to_path_buf();
        }
        let is_cur_dir = self
            .root_dir
            .components()
            .all(|c| matches!(c, Component::CurDir));
        if is_cur_dir {
            path.to_path_buf()
        } else {
            let rel = path.strip_prefix(Path::new(".")).unwrap_or(path);
            self.root_dir.join(rel)
        }
    }

    pub fn template_root(&self) -> PathBuf {
        self.resolve(&self.config.template_root)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.resolve(&self.config.output_dir)
    }

    pub fn messages_root(&self) -> PathBuf {
        self.resolve(&self.config.messages_root)
    }

    pub fn bundle_path(&self, locale: &str) -> PathBuf {
        self.resolve(self.config.bundle_path(locale))
    }

    pub fn generator(&self) -> Box<dyn BundleGenerator> {
        match &self.config.generator {
            GeneratorConfig::Native => Box::new(NativeGenerator),
            GeneratorConfig::Command {
                program,
                args,
                existing_bundle_args,
            } => Box::new(CommandGenerator {
                program: program.clone(),
                args: args.clone(),
                existing_bundle_args: existing_bundle_args.clone(),
                working_dir: self.root_dir.clone(),
            }),
        }
    }
}
