use cpal::traits::{DeviceTrait, HostTrait};
use cpal::{Device, Host, Stream};

use redirect_core::session::callbacks::{LoopbackCapture, LoopbackPlayback};
use redirect_core::{
    apply_gain, ring_buffer, AudioHost, DataCallback, DeviceDirection, DeviceHandle, DeviceId,
    DeviceList, DeviceRole, ErrorKind, RedirectError, ResultCode, StreamConfig,
};

use crate::convert::{build_error_code, devices_error_code, to_cpal_config, to_cpal_format};
use crate::device_enumerator::DeviceEnumerator;
use crate::stream_handle::{CpalDeviceHandle, SharedVolume};

/// [`AudioHost`] backed by one cpal host (WASAPI, CoreAudio, ALSA, ...).
///
/// Device handles map onto cpal streams:
/// - loopback capture: an input stream opened on an *output* device
///   (WASAPI loopback; other platforms report `DeviceTypeNotSupported`)
/// - playback: an output stream
/// - duplex: an input and an output stream bridged by a ring buffer and
///   driven from the output clock, presented as one handle
pub struct CpalHost {
    host: Host,
}

impl CpalHost {
    /// The platform's default host.
    pub fn new() -> Result<Self, RedirectError> {
        Self::from_host(cpal::default_host())
    }

    /// A host by name (`"WASAPI"`, `"ALSA"`, `"JACK"`, ...), case-insensitive.
    pub fn with_host_name(name: &str) -> Result<Self, RedirectError> {
        let id = cpal::available_hosts()
            .into_iter()
            .find(|id| id.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| RedirectError::new(ErrorKind::ContextInit(ResultCode::NoBackend)))?;
        let host = cpal::host_from_id(id).map_err(|e| {
            log::warn!("audio host {} unavailable: {}", name, e);
            RedirectError::new(ErrorKind::ContextInit(ResultCode::BackendNotEnabled))
        })?;
        Self::from_host(host)
    }

    /// Names of the hosts compiled in and available on this machine.
    pub fn available_host_names() -> Vec<&'static str> {
        cpal::available_hosts().into_iter().map(|id| id.name()).collect()
    }

    fn from_host(host: Host) -> Result<Self, RedirectError> {
        // A host that cannot list devices is unusable for anything else.
        host.devices()
            .map_err(|e| RedirectError::new(ErrorKind::ContextInit(devices_error_code(&e))))?;
        log::info!("audio host: {}", host.id().name());
        Ok(Self { host })
    }

    pub fn name(&self) -> &'static str {
        self.host.id().name()
    }

    fn find(&self, direction: DeviceDirection, id: &DeviceId) -> Result<Device, ResultCode> {
        DeviceEnumerator::new(&self.host).find(direction, id)
    }
}

impl AudioHost for CpalHost {
    fn enumerate_devices(&self) -> Result<DeviceList, ResultCode> {
        DeviceEnumerator::new(&self.host).list()
    }

    fn open_loopback_capture(
        &self,
        device: &DeviceId,
        config: &StreamConfig,
        callback: Box<dyn DataCallback>,
    ) -> Result<Box<dyn DeviceHandle>, ResultCode> {
        if !cfg!(target_os = "windows") {
            return Err(ResultCode::DeviceTypeNotSupported);
        }
        let device = self.find(DeviceDirection::Playback, device)?;
        let stream = build_input(&device, config, callback, DeviceRole::Loopback)?;
        Ok(Box::new(CpalDeviceHandle::new(
            DeviceRole::Loopback,
            vec![stream],
            SharedVolume::new(),
        )))
    }

    fn open_playback(
        &self,
        device: &DeviceId,
        config: &StreamConfig,
        callback: Box<dyn DataCallback>,
    ) -> Result<Box<dyn DeviceHandle>, ResultCode> {
        let device = self.find(DeviceDirection::Playback, device)?;
        let volume = SharedVolume::new();
        let stream = build_output(&device, config, callback, volume.clone(), DeviceRole::Playback)?;
        Ok(Box::new(CpalDeviceHandle::new(
            DeviceRole::Playback,
            vec![stream],
            volume,
        )))
    }

    fn open_duplex(
        &self,
        capture: &DeviceId,
        playback: &DeviceId,
        config: &StreamConfig,
        mut callback: Box<dyn DataCallback>,
    ) -> Result<Box<dyn DeviceHandle>, ResultCode> {
        let input_device = self.find(DeviceDirection::Capture, capture)?;
        let output_device = self.find(DeviceDirection::Playback, playback)?;

        let bytes_per_frame = config.bytes_per_frame();
        let capacity = config.ring_buffer_frames();
        let (producer, consumer) = ring_buffer(capacity, bytes_per_frame)?;

        let input = build_input(
            &input_device,
            config,
            Box::new(LoopbackCapture::new(producer, config)),
            DeviceRole::Duplex,
        )?;

        // The output clock drives the pair: each output period pulls the same
        // number of captured frames (silence on underrun) and hands both
        // blocks to the duplex callback.
        let mut bridge = LoopbackPlayback::new(consumer, config);
        let mut captured = vec![0u8; capacity * bytes_per_frame];
        let pass = move |output: &mut [u8], _: &[u8], frame_count: usize| {
            let len = output.len().min(captured.len());
            let block = &mut captured[..len];
            bridge.process(block, &[], frame_count);
            callback.process(output, block, frame_count);
        };

        let volume = SharedVolume::new();
        let output = build_output(
            &output_device,
            config,
            Box::new(pass),
            volume.clone(),
            DeviceRole::Duplex,
        )?;

        Ok(Box::new(CpalDeviceHandle::new(
            DeviceRole::Duplex,
            vec![input, output],
            volume,
        )))
    }
}

fn build_input(
    device: &Device,
    config: &StreamConfig,
    mut callback: Box<dyn DataCallback>,
    role: DeviceRole,
) -> Result<Stream, ResultCode> {
    let sample_format = to_cpal_format(config.format)?;
    let stream_config = to_cpal_config(config)?;
    let bytes_per_frame = config.bytes_per_frame();

    device
        .build_input_stream_raw(
            &stream_config,
            sample_format,
            move |data: &cpal::Data, _info: &cpal::InputCallbackInfo| {
                let input = data.bytes();
                callback.process(&mut [], input, input.len() / bytes_per_frame);
            },
            move |err| {
                log::error!("{} input stream error: {}", role, err);
            },
            None,
        )
        .map_err(|e| {
            log::warn!("{} input stream build failed: {}", role, e);
            build_error_code(&e)
        })
}

fn build_output(
    device: &Device,
    config: &StreamConfig,
    mut callback: Box<dyn DataCallback>,
    volume: SharedVolume,
    role: DeviceRole,
) -> Result<Stream, ResultCode> {
    let sample_format = to_cpal_format(config.format)?;
    let stream_config = to_cpal_config(config)?;
    let bytes_per_frame = config.bytes_per_frame();
    let format = config.format;

    device
        .build_output_stream_raw(
            &stream_config,
            sample_format,
            move |data: &mut cpal::Data, _info: &cpal::OutputCallbackInfo| {
                let output = data.bytes_mut();
                let frame_count = output.len() / bytes_per_frame;
                callback.process(output, &[], frame_count);
                apply_gain(output, format, volume.get());
            },
            move |err| {
                log::error!("{} output stream error: {}", role, err);
            },
            None,
        )
        .map_err(|e| {
            log::warn!("{} output stream build failed: {}", role, e);
            build_error_code(&e)
        })
}
