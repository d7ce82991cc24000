use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Ok, Result, bail};
use glob::Pattern;
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE_NAME: &str = ".msgkeysrc.json";

/// Placeholder replaced by the locale in `bundleFileName`.
pub const LOCALE_PLACEHOLDER: &str = "{locale}";

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Root that template namespaces are derived from.
    #[serde(default = "default_template_root")]
    pub template_root: String,
    /// Directories or globs under `templateRoot`; empty scans all of it.
    #[serde(default)]
    pub template_includes: Vec<String>,
    #[serde(default = "default_template_extensions")]
    pub template_extensions: Vec<String>,
    /// Directories or globs, relative to the project root, scanned for direct key references.
    #[serde(default = "default_source_includes")]
    pub source_includes: Vec<String>,
    #[serde(default = "default_source_extensions")]
    pub source_extensions: Vec<String>,
    #[serde(default = "default_ignores")]
    pub ignores: Vec<String>,
    #[serde(default = "default_messages_root", alias = "messagesDir")]
    pub messages_root: String,
    #[serde(default = "default_bundle_file_name")]
    pub bundle_file_name: String,
    #[serde(default = "default_primary_locale")]
    pub primary_locale: String,
    #[serde(default = "default_locales")]
    pub locales: Vec<String>,
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
    /// Where generated message modules are written.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default)]
    pub generator: GeneratorConfig,
}

/// How locale bundles are produced.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum GeneratorConfig {
    /// Merge bundles in-process.
    #[default]
    Native,
    /// Run an external generator per locale, e.g.
    /// `java -jar XtbGenerator.jar --lang {locale} --xtb_output_file {output} --js {messages}/**.js`.
    #[serde(rename_all = "camelCase")]
    Command {
        program: String,
        #[serde(default)]
        args: Vec<String>,
        /// Appended only when the locale already has a bundle.
        #[serde(default)]
        existing_bundle_args: Vec<String>,
    },
}

fn default_template_root() -> String {
    "./src/app/frontend".to_string()
}

fn default_template_extensions() -> Vec<String> {
    vec!["html".to_string()]
}

fn default_source_includes() -> Vec<String> {
    vec!["src/app/frontend".to_string()]
}

fn default_source_extensions() -> Vec<String> {
    vec!["js".to_string()]
}

fn default_ignores() -> Vec<String> {
    vec!["**/node_modules/**".to_string()]
}

fn default_messages_root() -> String {
    "./i18n".to_string()
}

fn default_bundle_file_name() -> String {
    "messages-{locale}.xtb".to_string()
}

fn default_primary_locale() -> String {
    "en".to_string()
}

fn default_locales() -> Vec<String> {
    vec![default_primary_locale()]
}

fn default_key_prefix() -> String {
    "MSG_".to_string()
}

fn default_output_dir() -> String {
    "./.tmp/messages_for_extraction".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            template_root: default_template_root(),
            template_includes: Vec::new(),
            template_extensions: default_template_extensions(),
            source_includes: default_source_includes(),
            source_extensions: default_source_extensions(),
            ignores: default_ignores(),
            messages_root: default_messages_root(),
            bundle_file_name: default_bundle_file_name(),
            primary_locale: default_primary_locale(),
            locales: default_locales(),
            key_prefix: default_key_prefix(),
            output_dir: default_output_dir(),
            generator: GeneratorConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values.
    ///
    /// Returns an error for invalid glob patterns, a key prefix that is not an
    /// identifier, a bundle file name without `{locale}`, or a primary locale
    /// missing from `locales`.
    pub fn validate(&self) -> Result<()> {
        for pattern in &self.ignores {
            Pattern::new(pattern)
                .with_context(|| format!("Invalid glob pattern in 'ignores': \"{}\"", pattern))?;
        }

        // Patterns without wildcards are treated as literal directory paths.
        for (field, patterns) in [
            ("templateIncludes", &self.template_includes),
            ("sourceIncludes", &self.source_includes),
        ] {
            for pattern in patterns {
                if pattern.contains('*') || pattern.contains('?') {
                    Pattern::new(pattern).with_context(|| {
                        format!("Invalid glob pattern in '{}': \"{}\"", field, pattern)
                    })?;
                }
            }
        }

        if self.key_prefix.is_empty()
            || !self
                .key_prefix
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            bail!(
                "Invalid 'keyPrefix': \"{}\" (expected letters, digits or '_')",
                self.key_prefix
            );
        }

        if !self.bundle_file_name.contains(LOCALE_PLACEHOLDER) {
            bail!(
                "'bundleFileName' must contain {}: \"{}\"",
                LOCALE_PLACEHOLDER,
                self.bundle_file_name
            );
        }

        if !self.locales.contains(&self.primary_locale) {
            bail!(
                "Primary locale \"{}\" is not listed in 'locales'",
                self.primary_locale
            );
        }

        if let GeneratorConfig::Command { program, .. } = &self.generator
            && program.trim().is_empty()
        {
            bail!("'generator.program' must not be empty");
        }

        Ok(())
    }

    /// Bundle file path of a locale, relative to the project root.
    pub fn bundle_path(&self, locale: &str) -> PathBuf {
        Path::new(&self.messages_root)
            .join(self.bundle_file_name.replace(LOCALE_PLACEHOLDER, locale))
    }
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// True if config was loaded from a file, false if using defaults.
    pub from_file: bool,
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            config.validate()?;
            Ok(ConfigLoadResult {
                config,
                from_file: true,
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            from_file: false,
        }),
    }
}
