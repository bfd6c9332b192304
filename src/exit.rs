use std::fmt;

use crate::error::ScanError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    InvalidArgs,
    ScanFailed,
    ServiceFailed,
    ExportFailed,
}

impl ExitCode {
    pub const fn as_i32(self) -> i32 {
        match self {
            ExitCode::Success => 0,
            ExitCode::InvalidArgs => 2,
            ExitCode::ScanFailed => 10,
            ExitCode::ServiceFailed => 20,
            ExitCode::ExportFailed => 30,
        }
    }
}

#[derive(Debug)]
pub struct ExitError {
    pub code: ExitCode,
    pub err: anyhow::Error,
    /// The message was already shown to the user by the view.
    pub reported: bool,
}

impl ExitError {
    pub fn new(code: ExitCode, err: anyhow::Error) -> Self {
        Self {
            code,
            err,
            reported: false,
        }
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.err.fmt(f)
    }
}

impl std::error::Error for ExitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.err.as_ref())
    }
}

pub fn exit_code(err: &anyhow::Error) -> i32 {
    if let Some(exit) = err.downcast_ref::<ExitError>() {
        return exit.code.as_i32();
    }
    ExitCode::ScanFailed.as_i32()
}

pub fn is_reported(err: &anyhow::Error) -> bool {
    err.downcast_ref::<ExitError>()
        .is_some_and(|exit| exit.reported)
}

pub fn invalid_args(message: impl Into<String>) -> anyhow::Error {
    ExitError::new(ExitCode::InvalidArgs, anyhow::anyhow!(message.into())).into()
}

pub fn invalid_args_err(err: anyhow::Error) -> anyhow::Error {
    ExitError::new(ExitCode::InvalidArgs, err).into()
}

pub fn service_err(err: anyhow::Error) -> anyhow::Error {
    ExitError::new(ExitCode::ServiceFailed, err).into()
}

/// Maps a controller failure that the view has already displayed.
pub fn reported(err: ScanError) -> anyhow::Error {
    let code = match &err {
        ScanError::Validation(_) => ExitCode::InvalidArgs,
        ScanError::Transport(_) | ScanError::Busy => ExitCode::ScanFailed,
        ScanError::Service(_) => ExitCode::ServiceFailed,
        ScanError::ExportPrecondition | ScanError::Export(_) => ExitCode::ExportFailed,
    };
    ExitError {
        code,
        err: err.into(),
        reported: true,
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;

    #[test]
    fn reported_errors_keep_their_exit_code() {
        let err = reported(ScanError::Transport(TransportError::Status(500)));
        assert_eq!(exit_code(&err), 10);
        assert!(is_reported(&err));

        let err = reported(ScanError::Validation("URL is required".to_string()));
        assert_eq!(exit_code(&err), 2);
    }

    #[test]
    fn plain_errors_default_to_scan_failed() {
        let err = anyhow::anyhow!("boom");
        assert_eq!(exit_code(&err), 10);
        assert!(!is_reported(&err));
    }
}
