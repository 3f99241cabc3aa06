use crate::models::config::StreamConfig;
use crate::models::device::{DeviceId, DeviceList};
use crate::models::result_code::ResultCode;
use crate::models::state::DeviceState;
use crate::traits::data_callback::DataCallback;

/// An opened device (or device pair) driving one [`DataCallback`].
///
/// Dropping the handle uninitializes the device: it stops streaming if
/// needed and releases every backend resource. The callback is never invoked
/// after `stop` or `drop` returns.
pub trait DeviceHandle {
    /// Live state as reported by the backend.
    fn state(&self) -> DeviceState;

    /// Begin hardware streaming. Callbacks start arriving on the backend's
    /// thread(s).
    fn start(&mut self) -> Result<(), ResultCode>;

    /// Halt hardware streaming. Blocks until an in-flight callback returns.
    fn stop(&mut self) -> Result<(), ResultCode>;

    /// Linear gain applied to the rendered output (1.0 = unity).
    fn master_volume(&self) -> Result<f32, ResultCode>;

    fn set_master_volume(&mut self, volume: f32) -> Result<(), ResultCode>;
}

/// Interface to the platform audio subsystem.
///
/// Acts as the device directory and as the factory for device handles.
/// Implemented by:
/// - `CpalHost` (redirect-cpal)
/// - `MockHost` (tests, feature `mock`)
pub trait AudioHost {
    /// All playback and capture endpoints currently visible, in subsystem
    /// order.
    fn enumerate_devices(&self) -> Result<DeviceList, ResultCode>;

    /// Open a capture handle recording what playback device `device` renders.
    fn open_loopback_capture(
        &self,
        device: &DeviceId,
        config: &StreamConfig,
        callback: Box<dyn DataCallback>,
    ) -> Result<Box<dyn DeviceHandle>, ResultCode>;

    /// Open a render handle on playback device `device`.
    fn open_playback(
        &self,
        device: &DeviceId,
        config: &StreamConfig,
        callback: Box<dyn DataCallback>,
    ) -> Result<Box<dyn DeviceHandle>, ResultCode>;

    /// Open one combined handle capturing from `capture` and rendering to
    /// `playback`, both sides sharing `config`. The callback receives equal
    /// length input and output blocks.
    fn open_duplex(
        &self,
        capture: &DeviceId,
        playback: &DeviceId,
        config: &StreamConfig,
        callback: Box<dyn DataCallback>,
    ) -> Result<Box<dyn DeviceHandle>, ResultCode>;
}
