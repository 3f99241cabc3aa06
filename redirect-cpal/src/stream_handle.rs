use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use cpal::traits::StreamTrait;
use cpal::Stream;

use redirect_core::{DeviceHandle, DeviceRole, DeviceState, ResultCode};

use crate::convert::{pause_error_code, play_error_code};

/// Master volume shared between a handle and its output callback.
///
/// Stored as `f32` bits so the audio thread reads it without locking.
#[derive(Clone)]
pub(crate) struct SharedVolume(Arc<AtomicU32>);

impl SharedVolume {
    pub(crate) fn new() -> Self {
        Self(Arc::new(AtomicU32::new(1.0f32.to_bits())))
    }

    pub(crate) fn get(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    fn set(&self, volume: f32) {
        self.0.store(volume.to_bits(), Ordering::Relaxed);
    }
}

/// One or more cpal streams started and stopped as a unit.
///
/// Streams start in order and stop in reverse order. Volume scales the
/// rendered output of every output stream in the handle; capture-only
/// handles keep the value without applying it.
pub struct CpalDeviceHandle {
    role: DeviceRole,
    streams: Vec<Stream>,
    state: DeviceState,
    volume: SharedVolume,
}

impl CpalDeviceHandle {
    pub(crate) fn new(role: DeviceRole, streams: Vec<Stream>, volume: SharedVolume) -> Self {
        Self {
            role,
            streams,
            state: DeviceState::Stopped,
            volume,
        }
    }

    fn pause_all(&self) -> Result<(), ResultCode> {
        pause_streams(self.role, &self.streams)
    }
}

/// Play `streams` in order. On failure the streams already playing are
/// paused again in reverse order before the play error is returned.
fn play_streams<S: StreamTrait>(role: DeviceRole, streams: &[S]) -> Result<(), ResultCode> {
    for (index, stream) in streams.iter().enumerate() {
        if let Err(e) = stream.play() {
            log::warn!("{} stream play failed: {}", role, e);
            if let Err(code) = pause_streams(role, &streams[..index]) {
                log::warn!("{} rollback after failed start: {}", role, code);
            }
            return Err(play_error_code(&e));
        }
    }
    Ok(())
}

/// Pause every stream in reverse order, keeping the first failure.
fn pause_streams<S: StreamTrait>(role: DeviceRole, streams: &[S]) -> Result<(), ResultCode> {
    let mut result = Ok(());
    for stream in streams.iter().rev() {
        if let Err(e) = stream.pause() {
            log::warn!("{} stream pause failed: {}", role, e);
            if result.is_ok() {
                result = Err(pause_error_code(&e));
            }
        }
    }
    result
}

impl DeviceHandle for CpalDeviceHandle {
    fn state(&self) -> DeviceState {
        self.state
    }

    fn start(&mut self) -> Result<(), ResultCode> {
        self.state = DeviceState::Starting;
        if let Err(code) = play_streams(self.role, &self.streams) {
            self.state = DeviceState::Stopped;
            return Err(code);
        }
        self.state = DeviceState::Started;
        log::debug!("{} device started ({} stream(s))", self.role, self.streams.len());
        Ok(())
    }

    fn stop(&mut self) -> Result<(), ResultCode> {
        self.state = DeviceState::Stopping;
        let result = self.pause_all();
        self.state = DeviceState::Stopped;
        result
    }

    fn master_volume(&self) -> Result<f32, ResultCode> {
        Ok(self.volume.get())
    }

    fn set_master_volume(&mut self, volume: f32) -> Result<(), ResultCode> {
        if !volume.is_finite() || volume < 0.0 {
            return Err(ResultCode::InvalidArgs);
        }
        self.volume.set(volume);
        Ok(())
    }
}

impl Drop for CpalDeviceHandle {
    fn drop(&mut self) {
        // pause_all logs failures; streams close when the Vec drops
        if self.state.needs_stop() {
            let _ = self.pause_all();
        }
        self.state = DeviceState::Uninitialized;
        log::debug!("{} device uninitialized", self.role);
    }
}
