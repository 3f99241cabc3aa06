use std::fmt;

use serde::{Deserialize, Serialize};

/// Redirect session state machine, one instance per mode.
///
/// State transitions:
/// ```text
/// idle → initializing → running → stopping → idle
///             ↓
///           idle   (initialization failed, everything rolled back)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedirectState {
    Idle,
    Initializing,
    Running,
    Stopping,
}

impl RedirectState {
    pub fn is_idle(self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Initializing => "initializing",
            Self::Running => "running",
            Self::Stopping => "stopping",
        }
    }
}

impl fmt::Display for RedirectState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Live state of a single device handle, as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceState {
    Uninitialized,
    Stopped,
    Started,
    Starting,
    Stopping,
}

impl DeviceState {
    /// Whether a stop request is needed before the handle can be released.
    pub fn needs_stop(self) -> bool {
        matches!(self, Self::Started | Self::Starting)
    }
}

/// The two independent redirect modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedirectMode {
    Loopback,
    Duplex,
}

impl fmt::Display for RedirectMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Loopback => "loopback",
            Self::Duplex => "duplex",
        })
    }
}

/// Which device handle an operation or failure concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceRole {
    /// Capture side of a loopback redirect (monitors a playback device).
    Loopback,
    /// Render side of a loopback redirect.
    Playback,
    /// The combined capture+playback handle of a duplex redirect.
    Duplex,
}

impl fmt::Display for DeviceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Loopback => "loopback",
            Self::Playback => "playback",
            Self::Duplex => "duplex",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_live_devices_need_stop() {
        assert!(DeviceState::Started.needs_stop());
        assert!(DeviceState::Starting.needs_stop());
        assert!(!DeviceState::Stopped.needs_stop());
        assert!(!DeviceState::Stopping.needs_stop());
        assert!(!DeviceState::Uninitialized.needs_stop());
    }

    #[test]
    fn display_names() {
        assert_eq!(RedirectState::Initializing.to_string(), "initializing");
        assert_eq!(DeviceRole::Playback.to_string(), "playback");
        assert_eq!(RedirectMode::Duplex.to_string(), "duplex");
    }
}
