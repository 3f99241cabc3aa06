use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;

use redirect_core::{
    format_to_string, sample_rate_label, DeviceDescriptor, RedirectError, RedirectMode,
    RedirectObserver, RedirectState, VolumeBoost, SUPPORTED_FORMATS, SUPPORTED_SAMPLE_RATES,
};

/// Observer that mirrors session events to the log and keeps the latest
/// state per mode for the status line.
pub struct CliObserver {
    states: Mutex<HashMap<RedirectMode, RedirectState>>,
    errors: Mutex<Vec<String>>,
}

impl CliObserver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            states: Mutex::new(HashMap::new()),
            errors: Mutex::new(Vec::new()),
        })
    }

    pub fn state(&self, mode: RedirectMode) -> RedirectState {
        self.states
            .lock()
            .get(&mode)
            .copied()
            .unwrap_or(RedirectState::Idle)
    }

    pub fn error_count(&self) -> usize {
        self.errors.lock().len()
    }
}

impl RedirectObserver for CliObserver {
    fn on_state_changed(&self, mode: RedirectMode, state: RedirectState) {
        log::debug!("{} redirect is {}", mode, state);
        self.states.lock().insert(mode, state);
    }

    fn on_error(&self, mode: RedirectMode, error: &RedirectError) {
        log::error!("{} redirect: {}", mode, error.report());
        self.errors.lock().push(error.to_string());
    }
}

// -- Serializable listings --

#[derive(Clone, Serialize)]
pub struct DeviceInfo {
    pub index: usize,
    pub id: String,
    pub name: String,
    pub is_default: bool,
}

impl DeviceInfo {
    pub fn list(devices: &[DeviceDescriptor]) -> Vec<DeviceInfo> {
        devices
            .iter()
            .enumerate()
            .map(|(index, d)| DeviceInfo {
                index,
                id: d.id.to_string(),
                name: d.name.clone(),
                is_default: d.is_default,
            })
            .collect()
    }
}

#[derive(Clone, Serialize)]
pub struct DeviceListing {
    pub playback: Vec<DeviceInfo>,
    pub capture: Vec<DeviceInfo>,
}

#[derive(Clone, Serialize)]
pub struct OptionInfo {
    pub value: String,
    pub label: String,
}

/// Every value the stream options accept, in picker order.
#[derive(Clone, Serialize)]
pub struct FormatListing {
    pub formats: Vec<OptionInfo>,
    pub sample_rates: Vec<OptionInfo>,
    pub boosts: Vec<OptionInfo>,
}

impl FormatListing {
    pub fn supported() -> Self {
        Self {
            formats: SUPPORTED_FORMATS
                .iter()
                .map(|f| OptionInfo {
                    value: f.short_name().to_string(),
                    label: format_to_string(*f).to_string(),
                })
                .collect(),
            sample_rates: SUPPORTED_SAMPLE_RATES
                .iter()
                .map(|rate| OptionInfo {
                    value: rate.to_string(),
                    label: sample_rate_label(*rate),
                })
                .collect(),
            boosts: VolumeBoost::all()
                .map(|b| OptionInfo {
                    value: b.multiplier().to_string(),
                    label: b.label(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use redirect_core::{DeviceDirection, DeviceId, ErrorKind, ResultCode};

    use super::*;

    #[test]
    fn observer_tracks_latest_state() {
        let observer = CliObserver::new();
        assert_eq!(observer.state(RedirectMode::Loopback), RedirectState::Idle);

        observer.on_state_changed(RedirectMode::Loopback, RedirectState::Running);
        assert_eq!(observer.state(RedirectMode::Loopback), RedirectState::Running);
        assert_eq!(observer.state(RedirectMode::Duplex), RedirectState::Idle);

        observer.on_error(
            RedirectMode::Duplex,
            &RedirectError::new(ErrorKind::Enumeration(ResultCode::NoBackend)),
        );
        assert_eq!(observer.error_count(), 1);
    }

    #[test]
    fn device_info_keeps_enumeration_order() {
        let devices = vec![
            DeviceDescriptor {
                id: DeviceId::new("b"),
                name: "B".into(),
                is_default: false,
                direction: DeviceDirection::Playback,
            },
            DeviceDescriptor {
                id: DeviceId::new("a"),
                name: "A".into(),
                is_default: true,
                direction: DeviceDirection::Playback,
            },
        ];
        let infos = DeviceInfo::list(&devices);
        assert_eq!(infos[0].id, "b");
        assert_eq!(infos[1].index, 1);
        assert!(infos[1].is_default);
    }

    #[test]
    fn format_listing_matches_supported_lists() {
        let listing = FormatListing::supported();
        assert_eq!(listing.formats.len(), 5);
        assert_eq!(listing.formats[0].label, "f32 (32-bit Float)");
        assert_eq!(listing.sample_rates.len(), 9);
        assert_eq!(listing.boosts.len(), 10);
    }
}
