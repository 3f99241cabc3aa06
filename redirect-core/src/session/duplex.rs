use std::sync::Arc;

use crate::models::config::StreamConfig;
use crate::models::device::DeviceId;
use crate::models::error::{ErrorKind, RedirectError};
use crate::models::result_code::ResultCode;
use crate::models::state::{DeviceRole, RedirectMode, RedirectState};
use crate::session::callbacks::DuplexPassThrough;
use crate::session::loopback::release;
use crate::session::StateTracker;
use crate::traits::audio_host::{AudioHost, DeviceHandle};
use crate::traits::redirect_observer::RedirectObserver;

/// Duplex redirect: one combined handle captures from an input device and
/// renders to an output device on a single clock, copying each block
/// straight through.
///
/// Starting while a redirect is live replaces it silently.
pub struct DuplexSession {
    tracker: StateTracker,
    handle: Option<Box<dyn DeviceHandle>>,
    active_config: Option<StreamConfig>,
    last_devices: Option<(DeviceId, DeviceId)>,
}

impl DuplexSession {
    pub fn new() -> Self {
        Self {
            tracker: StateTracker::new(RedirectMode::Duplex),
            handle: None,
            active_config: None,
            last_devices: None,
        }
    }

    pub fn state(&self) -> RedirectState {
        self.tracker.state()
    }

    pub fn set_observer(&mut self, observer: Option<Arc<dyn RedirectObserver>>) {
        self.tracker.set_observer(observer);
    }

    pub fn last_devices(&self) -> Option<(&DeviceId, &DeviceId)> {
        self.last_devices.as_ref().map(|(c, p)| (c, p))
    }

    pub fn active_config(&self) -> Option<&StreamConfig> {
        self.active_config.as_ref()
    }

    /// Transitions: idle → initializing → running.
    pub fn start<H: AudioHost + ?Sized>(
        &mut self,
        host: &H,
        capture_id: &DeviceId,
        playback_id: &DeviceId,
        config: &StreamConfig,
    ) -> Result<(), RedirectError> {
        if self.handle.is_some() {
            if let Err(e) = self.stop() {
                log::warn!("duplex redirect: replacing session after stop failure: {}", e);
            }
        }

        self.last_devices = Some((capture_id.clone(), playback_id.clone()));
        self.tracker.set(RedirectState::Initializing);

        let result = host
            .open_duplex(
                capture_id,
                playback_id,
                config,
                Box::new(DuplexPassThrough::new(config)),
            )
            .map_err(|code| {
                RedirectError::new(ErrorKind::DeviceInit {
                    role: DeviceRole::Duplex,
                    code,
                })
            })
            .and_then(|mut handle| match handle.start() {
                Ok(()) => Ok(handle),
                Err(code) => Err(RedirectError::new(ErrorKind::DeviceStart {
                    role: DeviceRole::Duplex,
                    code,
                })),
            });

        match result {
            Ok(handle) => {
                log::info!(
                    "duplex redirect started: {} → {} ({} ch, {} Hz, {})",
                    capture_id,
                    playback_id,
                    config.channels,
                    config.sample_rate,
                    config.format.short_name()
                );
                self.handle = Some(handle);
                self.active_config = Some(*config);
                self.tracker.set(RedirectState::Running);
                Ok(())
            }
            Err(e) => {
                self.tracker.set(RedirectState::Idle);
                self.tracker.report(&e);
                Err(e)
            }
        }
    }

    /// Stop and release the duplex handle, if any. Idempotent.
    /// Transitions: running → stopping → idle.
    pub fn stop(&mut self) -> Result<(), RedirectError> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };
        self.tracker.set(RedirectState::Stopping);

        let result = release(DeviceRole::Duplex, handle);
        self.active_config = None;

        log::info!("duplex redirect stopped");
        self.tracker.set(RedirectState::Idle);

        if let Err(ref e) = result {
            log::warn!("duplex redirect: {}", e);
            self.tracker.report(e);
        }
        result
    }

    pub fn volume(&self) -> Result<f32, RedirectError> {
        let result = match self.handle {
            Some(ref handle) => handle.master_volume(),
            None => Err(ResultCode::DeviceNotInitialized),
        };
        result.map_err(|code| {
            let e = RedirectError::new(ErrorKind::VolumeQuery {
                role: DeviceRole::Duplex,
                code,
            });
            self.tracker.report(&e);
            e
        })
    }

    pub fn set_volume(&mut self, volume: f32) -> Result<(), RedirectError> {
        let result = match self.handle {
            Some(ref mut handle) => handle.set_master_volume(volume),
            None => Err(ResultCode::DeviceNotInitialized),
        };
        result.map_err(|code| {
            let e = RedirectError::new(ErrorKind::VolumeUpdate {
                role: DeviceRole::Duplex,
                code,
            });
            self.tracker.report(&e);
            e
        })
    }
}

impl Default for DuplexSession {
    fn default() -> Self {
        Self::new()
    }
}
