use std::sync::Arc;

use crate::models::config::StreamConfig;
use crate::models::device::DeviceId;
use crate::models::error::{ErrorKind, RedirectError};
use crate::models::result_code::ResultCode;
use crate::models::state::{DeviceRole, RedirectMode, RedirectState};
use crate::processing::ring_buffer::{ring_buffer, RingStatus};
use crate::session::callbacks::{LoopbackCapture, LoopbackPlayback};
use crate::session::StateTracker;
use crate::traits::audio_host::{AudioHost, DeviceHandle};
use crate::traits::redirect_observer::RedirectObserver;

/// Resources of a live loopback redirect. Dropping it releases all of them.
struct LoopbackResources {
    capture: Box<dyn DeviceHandle>,
    playback: Box<dyn DeviceHandle>,
    ring: RingStatus,
    config: StreamConfig,
}

/// Loopback redirect: records what one playback device renders and plays it
/// on another, bridged by a ring buffer.
///
/// ```text
/// [loopback capture] → LoopbackCapture → ring (1 s) → LoopbackPlayback → [playback]
/// ```
///
/// At most one redirect is live per session object. Starting while live
/// tears the previous redirect down first.
pub struct LoopbackSession {
    tracker: StateTracker,
    live: Option<LoopbackResources>,
    last_devices: Option<(DeviceId, DeviceId)>,
}

impl LoopbackSession {
    pub fn new() -> Self {
        Self {
            tracker: StateTracker::new(RedirectMode::Loopback),
            live: None,
            last_devices: None,
        }
    }

    pub fn state(&self) -> RedirectState {
        self.tracker.state()
    }

    pub fn set_observer(&mut self, observer: Option<Arc<dyn RedirectObserver>>) {
        self.tracker.set_observer(observer);
    }

    /// Device pair of the most recent start attempt.
    pub fn last_devices(&self) -> Option<(&DeviceId, &DeviceId)> {
        self.last_devices.as_ref().map(|(l, p)| (l, p))
    }

    /// Config the live redirect was opened with, `None` when idle.
    pub fn active_config(&self) -> Option<&StreamConfig> {
        self.live.as_ref().map(|live| &live.config)
    }

    /// Frames currently queued between capture and playback.
    pub fn buffered_frames(&self) -> Option<usize> {
        self.live.as_ref().map(|live| live.ring.buffered_frames())
    }

    /// Open both devices and the ring buffer, then start streaming.
    ///
    /// On any failure everything acquired so far is released and the
    /// session is back to idle. Transitions: idle → initializing → running.
    pub fn start<H: AudioHost + ?Sized>(
        &mut self,
        host: &H,
        loopback_id: &DeviceId,
        playback_id: &DeviceId,
        config: &StreamConfig,
    ) -> Result<(), RedirectError> {
        if self.live.is_some() {
            // Previous redirect is always released, even if its stop failed.
            if let Err(e) = self.stop() {
                log::warn!("loopback redirect: replacing session after stop failure: {}", e);
            }
        }

        self.last_devices = Some((loopback_id.clone(), playback_id.clone()));
        self.tracker.set(RedirectState::Initializing);

        match Self::open(host, loopback_id, playback_id, config) {
            Ok(live) => {
                log::info!(
                    "loopback redirect started: {} → {} ({} ch, {} Hz, {})",
                    loopback_id,
                    playback_id,
                    config.channels,
                    config.sample_rate,
                    config.format.short_name()
                );
                self.live = Some(live);
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

    fn open<H: AudioHost + ?Sized>(
        host: &H,
        loopback_id: &DeviceId,
        playback_id: &DeviceId,
        config: &StreamConfig,
    ) -> Result<LoopbackResources, RedirectError> {
        // The ring comes first: each callback owns one half of it.
        let capacity = config.ring_buffer_frames();
        let (producer, consumer) = ring_buffer(capacity, config.bytes_per_frame())
            .map_err(|code| RedirectError::new(ErrorKind::RingBufferInit(code)))?;
        let ring = producer.status();
        log::debug!(
            "loopback ring buffer: {} frames, {} bytes",
            capacity,
            ring.capacity_bytes()
        );

        let mut capture = host
            .open_loopback_capture(
                loopback_id,
                config,
                Box::new(LoopbackCapture::new(producer, config)),
            )
            .map_err(|code| {
                RedirectError::new(ErrorKind::DeviceInit {
                    role: DeviceRole::Loopback,
                    code,
                })
            })?;

        let mut playback = host
            .open_playback(
                playback_id,
                config,
                Box::new(LoopbackPlayback::new(consumer, config)),
            )
            .map_err(|code| {
                RedirectError::new(ErrorKind::DeviceInit {
                    role: DeviceRole::Playback,
                    code,
                })
            })?;

        capture.start().map_err(|code| {
            RedirectError::new(ErrorKind::DeviceStart {
                role: DeviceRole::Loopback,
                code,
            })
        })?;

        if let Err(code) = playback.start() {
            if let Err(stop_code) = capture.stop() {
                log::warn!("loopback rollback: capture stop failed ({})", stop_code);
            }
            return Err(RedirectError::new(ErrorKind::DeviceStart {
                role: DeviceRole::Playback,
                code,
            }));
        }

        Ok(LoopbackResources {
            capture,
            playback,
            ring,
            config: *config,
        })
    }

    /// Stop and release the live redirect, if any.
    ///
    /// Idempotent. A stop failure is returned after cleanup completes; the
    /// remaining devices and the ring buffer are released regardless.
    /// Transitions: running → stopping → idle.
    pub fn stop(&mut self) -> Result<(), RedirectError> {
        let Some(live) = self.live.take() else {
            return Ok(());
        };
        self.tracker.set(RedirectState::Stopping);

        let LoopbackResources {
            capture,
            playback,
            ring,
            ..
        } = live;

        let mut first_error = None;
        for (role, handle) in [(DeviceRole::Loopback, capture), (DeviceRole::Playback, playback)] {
            if let Err(e) = release(role, handle) {
                log::warn!("loopback redirect: {}", e);
                first_error.get_or_insert(e);
            }
        }
        drop(ring);

        log::info!("loopback redirect stopped");
        self.tracker.set(RedirectState::Idle);

        match first_error {
            Some(e) => {
                self.tracker.report(&e);
                Err(e)
            }
            None => Ok(()),
        }
    }

    pub fn playback_volume(&self) -> Result<f32, RedirectError> {
        let result = match self.live {
            Some(ref live) => live.playback.master_volume(),
            None => Err(ResultCode::DeviceNotInitialized),
        };
        result.map_err(|code| {
            let e = RedirectError::new(ErrorKind::VolumeQuery {
                role: DeviceRole::Playback,
                code,
            });
            self.tracker.report(&e);
            e
        })
    }

    pub fn set_playback_volume(&mut self, volume: f32) -> Result<(), RedirectError> {
        let result = match self.live {
            Some(ref mut live) => live.playback.set_master_volume(volume),
            None => Err(ResultCode::DeviceNotInitialized),
        };
        result.map_err(|code| {
            let e = RedirectError::new(ErrorKind::VolumeUpdate {
                role: DeviceRole::Playback,
                code,
            });
            self.tracker.report(&e);
            e
        })
    }
}

impl Default for LoopbackSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Stop `handle` if it is streaming, then uninitialize it by dropping it.
pub(crate) fn release(role: DeviceRole, mut handle: Box<dyn DeviceHandle>) -> Result<(), RedirectError> {
    let state = handle.state();
    let result = if state.needs_stop() {
        handle
            .stop()
            .map_err(|code| RedirectError::new(ErrorKind::DeviceStop { role, code }))
    } else {
        Ok(())
    };
    log::debug!("releasing {} device (was {:?})", role, state);
    drop(handle);
    result
}
