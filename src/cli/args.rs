//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `extract`: Assign keys to template placeholders and update locale bundles
//! - `init`: Initialize msgkeys configuration file

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }

    pub fn verbose(&self) -> bool {
        match &self.command {
            Some(Command::Extract(cmd)) => cmd.args.common.verbose,
            Some(Command::Init) | None => false,
        }
    }
}

/// Common arguments shared by all commands.
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Primary locale (overrides config file)
    #[arg(long)]
    pub primary_locale: Option<String>,

    /// Project root directory, where the config file is searched from
    #[arg(long)]
    pub source_root: Option<PathBuf>,

    /// Directory holding the locale bundles (overrides config file)
    #[arg(long)]
    pub messages_root: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Parser)]
pub struct ExtractArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Actually write the locale bundles (default is dry-run)
    #[arg(long)]
    pub apply: bool,
}

#[derive(Debug, Args)]
pub struct ExtractCommand {
    #[command(flatten)]
    pub args: ExtractArgs,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract template messages, allocate keys and prune stale translations
    Extract(ExtractCommand),
    /// Initialize a new .msgkeysrc.json configuration file
    Init,
}
