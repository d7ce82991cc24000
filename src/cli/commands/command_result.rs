use crate::{cli::exit_status::ExitStatus, core::ExtractionReport};

#[derive(Debug)]
pub enum CommandSummary {
    Extract(ExtractionReport),
    Init(InitSummary),
}

#[derive(Debug)]
pub struct InitSummary {
    pub created: bool,
    pub error: Option<String>,
}

/// Result of running a msgkeys command.
#[derive(Debug)]
pub struct CommandResult {
    pub summary: CommandSummary,
    /// Failed locales, or 1 for a failed `init`.
    pub error_count: usize,
}

impl CommandResult {
    pub fn exit_status(&self) -> ExitStatus {
        if self.error_count > 0 {
            ExitStatus::Failure
        } else {
            ExitStatus::Success
        }
    }
}
