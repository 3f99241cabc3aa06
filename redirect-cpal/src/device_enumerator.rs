//! Audio device enumeration via cpal.
//!
//! cpal exposes no stable endpoint ids, so the device name under the
//! selected host serves as the [`DeviceId`]. Names are stable within one
//! session, which is all the core relies on.

use cpal::traits::{DeviceTrait, HostTrait};
use cpal::{Device, Host};

use redirect_core::{DeviceDescriptor, DeviceDirection, DeviceId, DeviceList, ResultCode};

use crate::convert::devices_error_code;

/// Device directory over one cpal host.
pub struct DeviceEnumerator<'a> {
    host: &'a Host,
}

impl<'a> DeviceEnumerator<'a> {
    pub fn new(host: &'a Host) -> Self {
        Self { host }
    }

    /// Playback and capture endpoints, each in host order.
    pub fn list(&self) -> Result<DeviceList, ResultCode> {
        Ok(DeviceList {
            playback: self.list_render_devices()?,
            capture: self.list_capture_devices()?,
        })
    }

    pub fn list_render_devices(&self) -> Result<Vec<DeviceDescriptor>, ResultCode> {
        let default_name = self
            .host
            .default_output_device()
            .and_then(|d| d.name().ok());
        let devices = self
            .host
            .output_devices()
            .map_err(|e| devices_error_code(&e))?;
        Ok(describe(devices, default_name, DeviceDirection::Playback))
    }

    pub fn list_capture_devices(&self) -> Result<Vec<DeviceDescriptor>, ResultCode> {
        let default_name = self
            .host
            .default_input_device()
            .and_then(|d| d.name().ok());
        let devices = self
            .host
            .input_devices()
            .map_err(|e| devices_error_code(&e))?;
        Ok(describe(devices, default_name, DeviceDirection::Capture))
    }

    /// Resolve an id from a previous enumeration back to a cpal device.
    pub fn find(&self, direction: DeviceDirection, id: &DeviceId) -> Result<Device, ResultCode> {
        let mut devices = match direction {
            DeviceDirection::Playback => self.host.output_devices(),
            DeviceDirection::Capture => self.host.input_devices(),
        }
        .map_err(|e| devices_error_code(&e))?;

        devices
            .find(|d| d.name().ok().as_deref() == Some(id.as_str()))
            .ok_or(ResultCode::NoDevice)
    }
}

fn describe(
    devices: impl Iterator<Item = Device>,
    default_name: Option<String>,
    direction: DeviceDirection,
) -> Vec<DeviceDescriptor> {
    devices
        .filter_map(|device| {
            let name = match device.name() {
                Ok(n) => n,
                Err(e) => {
                    log::debug!("skipping unnamed {:?} device: {}", direction, e);
                    return None;
                }
            };
            Some(DeviceDescriptor {
                id: DeviceId::new(name.clone()),
                is_default: default_name.as_deref() == Some(name.as_str()),
                name,
                direction,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[ignore = "requires audio hardware"]
    fn lists_default_output() {
        let host = cpal::default_host();
        let devices = DeviceEnumerator::new(&host).list().unwrap();
        assert!(!devices.playback.is_empty());
        assert!(devices.default_playback().is_some());
    }

    #[test]
    #[ignore = "requires audio hardware"]
    fn enumerated_ids_resolve_back() {
        let host = cpal::default_host();
        let enumerator = DeviceEnumerator::new(&host);
        let devices = enumerator.list().unwrap();
        for descriptor in &devices.playback {
            assert!(enumerator.find(DeviceDirection::Playback, &descriptor.id).is_ok());
        }
        assert_eq!(
            enumerator
                .find(DeviceDirection::Playback, &DeviceId::new("no such device"))
                .err(),
            Some(ResultCode::NoDevice)
        );
    }
}
