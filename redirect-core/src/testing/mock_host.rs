//! Scripted in-memory audio host.
//!
//! Lets session logic run without audio hardware: devices are plain records,
//! failures are injected per stage and role, and data callbacks are invoked
//! directly with synthetic buffers via [`MockHost::drive`].

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::config::StreamConfig;
use crate::models::device::{DeviceDescriptor, DeviceDirection, DeviceId, DeviceList};
use crate::models::result_code::ResultCode;
use crate::models::state::{DeviceRole, DeviceState};
use crate::processing::gain::apply_gain;
use crate::traits::audio_host::{AudioHost, DeviceHandle};
use crate::traits::data_callback::DataCallback;

/// Step of a device's lifecycle a failure can be injected into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockStage {
    Open,
    Start,
    Stop,
    Volume,
}

struct MockDevice {
    role: DeviceRole,
    devices: (DeviceId, Option<DeviceId>),
    config: StreamConfig,
    state: DeviceState,
    volume: f32,
    callback: Box<dyn DataCallback>,
}

#[derive(Default)]
struct HostState {
    devices: DeviceList,
    enumeration_failure: Option<ResultCode>,
    failures: HashMap<(MockStage, DeviceRole), ResultCode>,
    next_handle: u64,
    live: HashMap<u64, Arc<Mutex<MockDevice>>>,
    opened: Vec<(DeviceRole, StreamConfig)>,
}

impl HostState {
    fn failure(&self, stage: MockStage, role: DeviceRole) -> Result<(), ResultCode> {
        match self.failures.get(&(stage, role)) {
            Some(code) => Err(*code),
            None => Ok(()),
        }
    }

    fn has(&self, direction: DeviceDirection, id: &DeviceId) -> bool {
        self.devices.find(direction, id).is_some()
    }
}

/// In-memory [`AudioHost`]. Clones share state, so a test can keep one
/// clone while a `Redirector` owns another.
#[derive(Clone)]
pub struct MockHost {
    inner: Arc<Mutex<HostState>>,
}

impl MockHost {
    /// Two speakers (`spk-1` default, `spk-2`) and one microphone (`mic-1`).
    pub fn new() -> Self {
        let descriptor = |id: &str, name: &str, direction, is_default| DeviceDescriptor {
            id: DeviceId::new(id),
            name: name.to_string(),
            is_default,
            direction,
        };
        Self::with_devices(DeviceList {
            playback: vec![
                descriptor("spk-1", "Speakers", DeviceDirection::Playback, true),
                descriptor("spk-2", "Headphones", DeviceDirection::Playback, false),
            ],
            capture: vec![descriptor("mic-1", "Microphone", DeviceDirection::Capture, true)],
        })
    }

    pub fn with_devices(devices: DeviceList) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HostState {
                devices,
                ..HostState::default()
            })),
        }
    }

    /// Make every later `stage` call on a `role` device fail with `code`.
    pub fn fail(&self, stage: MockStage, role: DeviceRole, code: ResultCode) {
        self.inner.lock().failures.insert((stage, role), code);
    }

    pub fn clear_failures(&self) {
        let mut state = self.inner.lock();
        state.failures.clear();
        state.enumeration_failure = None;
    }

    pub fn fail_enumeration(&self, code: ResultCode) {
        self.inner.lock().enumeration_failure = Some(code);
    }

    /// Handles opened and not yet dropped.
    pub fn live_handles(&self) -> usize {
        self.inner.lock().live.len()
    }

    /// Live handles of one role.
    pub fn live_handles_of(&self, role: DeviceRole) -> usize {
        self.devices_of(role).len()
    }

    /// Every successful open, oldest first, with the config it was given.
    pub fn opened(&self) -> Vec<(DeviceRole, StreamConfig)> {
        self.inner.lock().opened.clone()
    }

    /// State of the live handle of `role`, if there is one.
    pub fn device_state(&self, role: DeviceRole) -> Option<DeviceState> {
        self.devices_of(role).first().map(|device| device.lock().state)
    }

    /// Device ids the live handle of `role` was opened on.
    pub fn device_ids(&self, role: DeviceRole) -> Option<(DeviceId, Option<DeviceId>)> {
        self.devices_of(role)
            .first()
            .map(|device| device.lock().devices.clone())
    }

    /// Run one period of the started `role` device: invoke its callback,
    /// then apply its master volume to `output`. Returns `false` when no
    /// such device is streaming.
    pub fn drive(&self, role: DeviceRole, output: &mut [u8], input: &[u8], frame_count: usize) -> bool {
        let Some(device) = self.devices_of(role).into_iter().next() else {
            return false;
        };
        let mut device = device.lock();
        if device.state != DeviceState::Started {
            return false;
        }
        device.callback.process(output, input, frame_count);
        let (format, volume) = (device.config.format, device.volume);
        apply_gain(output, format, volume);
        true
    }

    fn devices_of(&self, role: DeviceRole) -> Vec<Arc<Mutex<MockDevice>>> {
        let state = self.inner.lock();
        let mut ids: Vec<_> = state.live.keys().copied().collect();
        ids.sort_unstable();
        ids.into_iter()
            .filter_map(|id| state.live.get(&id))
            .filter(|device| device.lock().role == role)
            .cloned()
            .collect()
    }

    fn open(
        &self,
        role: DeviceRole,
        devices: (DeviceId, Option<DeviceId>),
        config: &StreamConfig,
        callback: Box<dyn DataCallback>,
    ) -> Result<Box<dyn DeviceHandle>, ResultCode> {
        let mut state = self.inner.lock();
        state.failure(MockStage::Open, role)?;
        if config.bytes_per_frame() == 0 || config.sample_rate == 0 {
            return Err(ResultCode::InvalidDeviceConfig);
        }

        let id = state.next_handle;
        state.next_handle += 1;
        let device = Arc::new(Mutex::new(MockDevice {
            role,
            devices,
            config: *config,
            state: DeviceState::Stopped,
            volume: 1.0,
            callback,
        }));
        state.live.insert(id, Arc::clone(&device));
        state.opened.push((role, *config));

        Ok(Box::new(MockHandle {
            id,
            role,
            device,
            host: Arc::clone(&self.inner),
        }))
    }
}

impl Default for MockHost {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioHost for MockHost {
    fn enumerate_devices(&self) -> Result<DeviceList, ResultCode> {
        let state = self.inner.lock();
        match state.enumeration_failure {
            Some(code) => Err(code),
            None => Ok(state.devices.clone()),
        }
    }

    fn open_loopback_capture(
        &self,
        device: &DeviceId,
        config: &StreamConfig,
        callback: Box<dyn DataCallback>,
    ) -> Result<Box<dyn DeviceHandle>, ResultCode> {
        if !self.inner.lock().has(DeviceDirection::Playback, device) {
            return Err(ResultCode::NoDevice);
        }
        self.open(DeviceRole::Loopback, (device.clone(), None), config, callback)
    }

    fn open_playback(
        &self,
        device: &DeviceId,
        config: &StreamConfig,
        callback: Box<dyn DataCallback>,
    ) -> Result<Box<dyn DeviceHandle>, ResultCode> {
        if !self.inner.lock().has(DeviceDirection::Playback, device) {
            return Err(ResultCode::NoDevice);
        }
        self.open(DeviceRole::Playback, (device.clone(), None), config, callback)
    }

    fn open_duplex(
        &self,
        capture: &DeviceId,
        playback: &DeviceId,
        config: &StreamConfig,
        callback: Box<dyn DataCallback>,
    ) -> Result<Box<dyn DeviceHandle>, ResultCode> {
        {
            let state = self.inner.lock();
            if !state.has(DeviceDirection::Capture, capture)
                || !state.has(DeviceDirection::Playback, playback)
            {
                return Err(ResultCode::NoDevice);
            }
        }
        self.open(
            DeviceRole::Duplex,
            (capture.clone(), Some(playback.clone())),
            config,
            callback,
        )
    }
}

struct MockHandle {
    id: u64,
    role: DeviceRole,
    device: Arc<Mutex<MockDevice>>,
    host: Arc<Mutex<HostState>>,
}

impl MockHandle {
    fn check(&self, stage: MockStage) -> Result<(), ResultCode> {
        self.host.lock().failure(stage, self.role)
    }
}

impl DeviceHandle for MockHandle {
    fn state(&self) -> DeviceState {
        self.device.lock().state
    }

    fn start(&mut self) -> Result<(), ResultCode> {
        self.check(MockStage::Start)?;
        self.device.lock().state = DeviceState::Started;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), ResultCode> {
        self.check(MockStage::Stop)?;
        self.device.lock().state = DeviceState::Stopped;
        Ok(())
    }

    fn master_volume(&self) -> Result<f32, ResultCode> {
        self.check(MockStage::Volume)?;
        Ok(self.device.lock().volume)
    }

    fn set_master_volume(&mut self, volume: f32) -> Result<(), ResultCode> {
        self.check(MockStage::Volume)?;
        if !volume.is_finite() || volume < 0.0 {
            return Err(ResultCode::InvalidArgs);
        }
        self.device.lock().volume = volume;
        Ok(())
    }
}

impl Drop for MockHandle {
    fn drop(&mut self) {
        self.device.lock().state = DeviceState::Uninitialized;
        self.host.lock().live.remove(&self.id);
    }
}
