use std::process::ExitCode;

/// Process exit status of a command.
///
/// - `Success` (0): every locale bundle was generated
/// - `Failure` (1): the run completed but at least one locale failed, or `init` found an existing config
/// - `Error` (2): the run aborted (invalid config, corrupt primary bundle, unreadable template)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Failure,
    Error,
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        match status {
            ExitStatus::Success => ExitCode::from(0),
            ExitStatus::Failure => ExitCode::from(1),
            ExitStatus::Error => ExitCode::from(2),
        }
    }
}
