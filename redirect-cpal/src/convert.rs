//! Mapping between cpal types and the core's format and result codes.

use cpal::{BuildStreamError, DevicesError, PauseStreamError, PlayStreamError};

use redirect_core::{ResultCode, SampleFormat, StreamConfig};

/// cpal sample type for `format`.
///
/// cpal has no packed 24-bit type, so `S24` (and `Unknown`) are refused the
/// way a device would refuse an unsupported format.
pub fn to_cpal_format(format: SampleFormat) -> Result<cpal::SampleFormat, ResultCode> {
    match format {
        SampleFormat::U8 => Ok(cpal::SampleFormat::U8),
        SampleFormat::S16 => Ok(cpal::SampleFormat::I16),
        SampleFormat::S32 => Ok(cpal::SampleFormat::I32),
        SampleFormat::F32 => Ok(cpal::SampleFormat::F32),
        SampleFormat::S24 | SampleFormat::Unknown => Err(ResultCode::FormatNotSupported),
    }
}

pub fn from_cpal_format(format: cpal::SampleFormat) -> SampleFormat {
    match format {
        cpal::SampleFormat::U8 => SampleFormat::U8,
        cpal::SampleFormat::I16 => SampleFormat::S16,
        cpal::SampleFormat::I32 => SampleFormat::S32,
        cpal::SampleFormat::F32 => SampleFormat::F32,
        _ => SampleFormat::Unknown,
    }
}

pub fn to_cpal_config(config: &StreamConfig) -> Result<cpal::StreamConfig, ResultCode> {
    if config.channels == 0 || config.sample_rate == 0 {
        return Err(ResultCode::InvalidDeviceConfig);
    }
    Ok(cpal::StreamConfig {
        channels: config.channels,
        sample_rate: cpal::SampleRate(config.sample_rate),
        buffer_size: cpal::BufferSize::Default,
    })
}

pub fn build_error_code(err: &BuildStreamError) -> ResultCode {
    match err {
        BuildStreamError::DeviceNotAvailable => ResultCode::NoDevice,
        BuildStreamError::StreamConfigNotSupported => ResultCode::FormatNotSupported,
        BuildStreamError::InvalidArgument => ResultCode::InvalidArgs,
        BuildStreamError::StreamIdOverflow => ResultCode::TooManyOpenFiles,
        BuildStreamError::BackendSpecific { .. } => ResultCode::FailedToOpenBackendDevice,
    }
}

pub fn play_error_code(err: &PlayStreamError) -> ResultCode {
    match err {
        PlayStreamError::DeviceNotAvailable => ResultCode::NoDevice,
        PlayStreamError::BackendSpecific { .. } => ResultCode::FailedToStartBackendDevice,
    }
}

pub fn pause_error_code(err: &PauseStreamError) -> ResultCode {
    match err {
        PauseStreamError::DeviceNotAvailable => ResultCode::NoDevice,
        PauseStreamError::BackendSpecific { .. } => ResultCode::FailedToStopBackendDevice,
    }
}

pub fn devices_error_code(err: &DevicesError) -> ResultCode {
    match err {
        DevicesError::BackendSpecific { .. } => ResultCode::FailedToInitBackend,
    }
}
