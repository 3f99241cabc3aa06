use std::fmt;

use serde::{Deserialize, Serialize};

/// Backend-defined identifier of an audio endpoint.
///
/// Opaque to the core: only compared and handed back to the backend that
/// produced it. Stable within one audio-subsystem session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Whether an endpoint renders or records audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceDirection {
    Playback,
    Capture,
}

/// Snapshot of one endpoint, taken at enumeration time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    pub id: DeviceId,
    pub name: String,
    pub is_default: bool,
    pub direction: DeviceDirection,
}

/// Result of one enumeration pass, in subsystem order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceList {
    pub playback: Vec<DeviceDescriptor>,
    pub capture: Vec<DeviceDescriptor>,
}

impl DeviceList {
    pub fn default_playback(&self) -> Option<&DeviceDescriptor> {
        self.playback.iter().find(|d| d.is_default)
    }

    pub fn default_capture(&self) -> Option<&DeviceDescriptor> {
        self.capture.iter().find(|d| d.is_default)
    }

    /// Find a device of the given direction by id.
    pub fn find(&self, direction: DeviceDirection, id: &DeviceId) -> Option<&DeviceDescriptor> {
        self.of(direction).iter().find(|d| &d.id == id)
    }

    pub fn of(&self, direction: DeviceDirection) -> &[DeviceDescriptor] {
        match direction {
            DeviceDirection::Playback => &self.playback,
            DeviceDirection::Capture => &self.capture,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(id: &str, direction: DeviceDirection, is_default: bool) -> DeviceDescriptor {
        DeviceDescriptor {
            id: DeviceId::new(id),
            name: format!("{} name", id),
            is_default,
            direction,
        }
    }

    #[test]
    fn defaults_are_found_per_direction() {
        let list = DeviceList {
            playback: vec![
                descriptor("spk-1", DeviceDirection::Playback, false),
                descriptor("spk-2", DeviceDirection::Playback, true),
            ],
            capture: vec![descriptor("mic-1", DeviceDirection::Capture, false)],
        };

        assert_eq!(list.default_playback().map(|d| d.id.as_str()), Some("spk-2"));
        assert!(list.default_capture().is_none());
    }

    #[test]
    fn find_respects_direction() {
        let list = DeviceList {
            playback: vec![descriptor("dev", DeviceDirection::Playback, true)],
            capture: vec![],
        };

        assert!(list.find(DeviceDirection::Playback, &"dev".into()).is_some());
        assert!(list.find(DeviceDirection::Capture, &"dev".into()).is_none());
    }

    #[test]
    fn device_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&DeviceId::new("{0.0.0.00000000}.{abc}")).unwrap();
        assert_eq!(json, "\"{0.0.0.00000000}.{abc}\"");
    }
}
