use std::fmt;
use std::panic::Location;

use thiserror::Error;

use super::result_code::ResultCode;
use super::state::DeviceRole;

/// What went wrong, independent of where.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[error("Failed to initialize audio context ({0}).")]
    ContextInit(ResultCode),

    #[error("Failed to get devices list ({0}).")]
    Enumeration(ResultCode),

    #[error("Failed to initialize {role} device ({code}).")]
    DeviceInit { role: DeviceRole, code: ResultCode },

    #[error("Failed to initialize ring buffer ({0}).")]
    RingBufferInit(ResultCode),

    #[error("Failed to start {role} device ({code}).")]
    DeviceStart { role: DeviceRole, code: ResultCode },

    #[error("Failed to stop {role} device ({code}).")]
    DeviceStop { role: DeviceRole, code: ResultCode },

    #[error("Failed to get {role} device volume ({code}).")]
    VolumeQuery { role: DeviceRole, code: ResultCode },

    #[error("Failed to set {role} device volume ({code}).")]
    VolumeUpdate { role: DeviceRole, code: ResultCode },

    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl ErrorKind {
    /// Engine result code behind this error, if it came from the audio subsystem.
    pub fn code(&self) -> Option<ResultCode> {
        match self {
            Self::ContextInit(code) | Self::Enumeration(code) | Self::RingBufferInit(code) => {
                Some(*code)
            }
            Self::DeviceInit { code, .. }
            | Self::DeviceStart { code, .. }
            | Self::DeviceStop { code, .. }
            | Self::VolumeQuery { code, .. }
            | Self::VolumeUpdate { code, .. } => Some(*code),
            Self::Configuration(_) => None,
        }
    }

    /// Device the failure concerns, if any.
    pub fn role(&self) -> Option<DeviceRole> {
        match self {
            Self::DeviceInit { role, .. }
            | Self::DeviceStart { role, .. }
            | Self::DeviceStop { role, .. }
            | Self::VolumeQuery { role, .. }
            | Self::VolumeUpdate { role, .. } => Some(*role),
            _ => None,
        }
    }
}

/// Error returned by every fallible redirect operation.
///
/// Carries the call site that raised it so a report can point at the failing
/// step without a backtrace.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{kind}")]
pub struct RedirectError {
    kind: ErrorKind,
    location: &'static Location<'static>,
}

impl RedirectError {
    #[track_caller]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            location: Location::caller(),
        }
    }

    #[track_caller]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration(message.into()))
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }

    /// `file:line:column` of the call site that raised this error.
    pub fn traceback(&self) -> String {
        format!(
            "{}:{}:{}",
            self.location.file(),
            self.location.line(),
            self.location.column()
        )
    }

    /// Message and traceback, formatted for an error dialog or a log line.
    pub fn report(&self) -> Report<'_> {
        Report(self)
    }
}

impl From<ErrorKind> for RedirectError {
    #[track_caller]
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

/// Display adapter returned by [`RedirectError::report`].
pub struct Report<'a>(&'a RedirectError);

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\nTraceback: {}", self.0.kind, self.0.traceback())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_names_role_and_code() {
        let err = RedirectError::new(ErrorKind::DeviceInit {
            role: DeviceRole::Playback,
            code: ResultCode::NoDevice,
        });
        assert_eq!(
            err.to_string(),
            "Failed to initialize playback device (No Device)."
        );
        assert_eq!(err.kind().role(), Some(DeviceRole::Playback));
        assert_eq!(err.kind().code(), Some(ResultCode::NoDevice));
    }

    #[test]
    fn traceback_points_at_call_site() {
        let line = line!() + 1;
        let err = RedirectError::configuration("bad rate");
        assert!(err.location().file().ends_with("error.rs"));
        assert_eq!(err.location().line(), line);

        let report = err.report().to_string();
        assert!(report.starts_with("Invalid configuration: bad rate\nTraceback: "));
        assert!(report.contains("error.rs"));
    }

    #[test]
    fn configuration_errors_have_no_code() {
        let err = RedirectError::configuration("nope");
        assert_eq!(err.kind().code(), None);
        assert_eq!(err.kind().role(), None);
    }
}
