use std::sync::Arc;

use crate::models::config::StreamConfig;
use crate::models::device::{DeviceId, DeviceList};
use crate::models::error::{ErrorKind, RedirectError};
use crate::models::format::SampleFormat;
use crate::models::state::RedirectState;
use crate::session::duplex::DuplexSession;
use crate::session::loopback::LoopbackSession;
use crate::traits::audio_host::AudioHost;
use crate::traits::redirect_observer::RedirectObserver;

/// Top-level redirect controller.
///
/// Owns the audio host, one [`StreamConfig`] per mode, and the two
/// independent sessions. All methods run synchronously on the caller's
/// thread; audio flows on the backend's threads once a mode is started.
///
/// ```text
///                 ┌ loopback config ─→ LoopbackSession (capture + playback + ring)
/// Redirector<H> ──┤
///                 └ duplex config ───→ DuplexSession   (one combined handle)
/// ```
///
/// Config changes apply to the next start of that mode only. Dropping the
/// redirector stops both modes.
pub struct Redirector<H: AudioHost> {
    host: H,
    loopback_config: StreamConfig,
    duplex_config: StreamConfig,
    loopback: LoopbackSession,
    duplex: DuplexSession,
}

impl<H: AudioHost> Redirector<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            loopback_config: StreamConfig::default(),
            duplex_config: StreamConfig::default(),
            loopback: LoopbackSession::new(),
            duplex: DuplexSession::new(),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn set_observer(&mut self, observer: Arc<dyn RedirectObserver>) {
        self.loopback.set_observer(Some(Arc::clone(&observer)));
        self.duplex.set_observer(Some(observer));
    }

    pub fn clear_observer(&mut self) {
        self.loopback.set_observer(None);
        self.duplex.set_observer(None);
    }

    /// Fresh snapshot of playback and capture devices.
    pub fn enumerate_devices(&self) -> Result<DeviceList, RedirectError> {
        let devices = self
            .host
            .enumerate_devices()
            .map_err(|code| RedirectError::new(ErrorKind::Enumeration(code)))?;
        log::debug!(
            "enumerated {} playback and {} capture devices",
            devices.playback.len(),
            devices.capture.len()
        );
        Ok(devices)
    }

    // --- Loopback ---

    pub fn start_loopback_redirect(
        &mut self,
        loopback_id: &DeviceId,
        playback_id: &DeviceId,
    ) -> Result<(), RedirectError> {
        self.loopback
            .start(&self.host, loopback_id, playback_id, &self.loopback_config)
    }

    pub fn stop_loopback_redirect(&mut self) -> Result<(), RedirectError> {
        self.loopback.stop()
    }

    /// Stop and start again on the same devices with the current loopback
    /// config. Does nothing unless the mode is running.
    pub fn restart_loopback_redirect(&mut self) -> Result<(), RedirectError> {
        if !self.loopback.state().is_running() {
            return Ok(());
        }
        let Some((loopback_id, playback_id)) = self
            .loopback
            .last_devices()
            .map(|(l, p)| (l.clone(), p.clone()))
        else {
            return Ok(());
        };
        log::info!("restarting loopback redirect");
        self.loopback.stop()?;
        self.start_loopback_redirect(&loopback_id, &playback_id)
    }

    pub fn loopback_state(&self) -> RedirectState {
        self.loopback.state()
    }

    /// Config the running loopback redirect was started with.
    pub fn loopback_active_config(&self) -> Option<&StreamConfig> {
        self.loopback.active_config()
    }

    /// Frames queued in the loopback ring buffer; `None` when idle.
    pub fn loopback_buffered_frames(&self) -> Option<usize> {
        self.loopback.buffered_frames()
    }

    pub fn playback_volume(&self) -> Result<f32, RedirectError> {
        self.loopback.playback_volume()
    }

    pub fn set_playback_volume(&mut self, volume: f32) -> Result<(), RedirectError> {
        self.loopback.set_playback_volume(volume)
    }

    pub fn loopback_config(&self) -> &StreamConfig {
        &self.loopback_config
    }

    pub fn set_loopback_config(&mut self, config: StreamConfig) {
        self.loopback_config = config;
    }

    pub fn set_loopback_format(&mut self, format: SampleFormat) {
        self.loopback_config.format = format;
    }

    pub fn set_loopback_channels(&mut self, channels: u16) {
        self.loopback_config.channels = channels;
    }

    pub fn set_loopback_sample_rate(&mut self, sample_rate: u32) {
        self.loopback_config.sample_rate = sample_rate;
    }

    // --- Duplex ---

    /// Start a duplex redirect, replacing any live one.
    pub fn start_duplex_redirect(
        &mut self,
        capture_id: &DeviceId,
        playback_id: &DeviceId,
    ) -> Result<(), RedirectError> {
        self.duplex
            .start(&self.host, capture_id, playback_id, &self.duplex_config)
    }

    pub fn stop_duplex_redirect(&mut self) -> Result<(), RedirectError> {
        self.duplex.stop()
    }

    pub fn restart_duplex_redirect(&mut self) -> Result<(), RedirectError> {
        if !self.duplex.state().is_running() {
            return Ok(());
        }
        let Some((capture_id, playback_id)) = self
            .duplex
            .last_devices()
            .map(|(c, p)| (c.clone(), p.clone()))
        else {
            return Ok(());
        };
        log::info!("restarting duplex redirect");
        self.duplex.stop()?;
        self.start_duplex_redirect(&capture_id, &playback_id)
    }

    pub fn duplex_state(&self) -> RedirectState {
        self.duplex.state()
    }

    pub fn duplex_active_config(&self) -> Option<&StreamConfig> {
        self.duplex.active_config()
    }

    pub fn duplex_volume(&self) -> Result<f32, RedirectError> {
        self.duplex.volume()
    }

    pub fn set_duplex_volume(&mut self, volume: f32) -> Result<(), RedirectError> {
        self.duplex.set_volume(volume)
    }

    pub fn duplex_config(&self) -> &StreamConfig {
        &self.duplex_config
    }

    pub fn set_duplex_config(&mut self, config: StreamConfig) {
        self.duplex_config = config;
    }

    pub fn set_duplex_format(&mut self, format: SampleFormat) {
        self.duplex_config.format = format;
    }

    pub fn set_duplex_channels(&mut self, channels: u16) {
        self.duplex_config.channels = channels;
    }

    pub fn set_duplex_sample_rate(&mut self, sample_rate: u32) {
        self.duplex_config.sample_rate = sample_rate;
    }

    /// Stop both modes. Both are always attempted; the first failure is
    /// returned.
    pub fn shutdown(&mut self) -> Result<(), RedirectError> {
        let loopback = self.loopback.stop();
        let duplex = self.duplex.stop();
        loopback.and(duplex)
    }
}

impl<H: AudioHost> Drop for Redirector<H> {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            log::warn!("redirector shutdown: {}", e);
        }
    }
}
