use std::{
    fs,
    path::{Path, PathBuf},
    process::Command,
};

use anyhow::{Context, Result, bail};

use super::{BundleGenerator, GenerateRequest};
use crate::core::{bundle::Bundle, xtb::parse_xtb};

/// Runs an external XTB generator once per locale.
///
/// Arguments may contain `{locale}`, `{output}`, `{messages}` and `{bundle}`.
/// `existing_bundle_args` are appended only when the locale already has a
/// bundle, mirroring `XtbGenerator --translations_file`.
///
/// The tool writes to a scratch file next to the bundle which is read back
/// and removed; the real bundle is never touched by the tool.
#[derive(Debug, Clone)]
pub struct CommandGenerator {
    pub program: String,
    pub args: Vec<String>,
    pub existing_bundle_args: Vec<String>,
    pub working_dir: PathBuf,
}

impl CommandGenerator {
    fn output_path(bundle_path: &Path) -> PathBuf {
        let mut name = bundle_path.file_name().unwrap_or_default().to_os_string();
        name.push(".generated");
        bundle_path.with_file_name(name)
    }

    fn expand(arg: &str, request: &GenerateRequest<'_>, output: &Path) -> String {
        arg.replace("{locale}", request.locale)
            .replace("{output}", &output.to_string_lossy())
            .replace("{messages}", &request.messages_dir.to_string_lossy())
            .replace("{bundle}", &request.bundle_path.to_string_lossy())
    }

    /// Final argument list for a request.
    pub fn command_args(&self, request: &GenerateRequest<'_>) -> Vec<String> {
        let output = Self::output_path(request.bundle_path);
        let mut args: Vec<String> = self
            .args
            .iter()
            .map(|arg| Self::expand(arg, request, &output))
            .collect();
        if request.bundle_path.exists() {
            args.extend(
                self.existing_bundle_args
                    .iter()
                    .map(|arg| Self::expand(arg, request, &output)),
            );
        }
        args
    }
}

impl BundleGenerator for CommandGenerator {
    fn generate(&self, request: &GenerateRequest<'_>) -> Result<Bundle> {
        let output_path = Self::output_path(request.bundle_path);
        let args = self.command_args(request);
        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let output = Command::new(&self.program)
            .args(&args)
            .current_dir(&self.working_dir)
            .output()
            .with_context(|| format!("Failed to run generator `{}`", self.program))?;

        if !output.status.success() {
            let _ = fs::remove_file(&output_path);
            bail!(
                "Generator `{}` failed for locale {} ({})\n{}{}",
                self.program,
                request.locale,
                output.status,
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            );
        }

        let content = fs::read_to_string(&output_path).with_context(|| {
            format!(
                "Generator `{}` did not produce {}",
                self.program,
                output_path.display()
            )
        })?;
        let _ = fs::remove_file(&output_path);

        parse_xtb(&content).with_context(|| {
            format!(
                "Failed to parse generated bundle for locale {}",
                request.locale
            )
        })
    }
}
