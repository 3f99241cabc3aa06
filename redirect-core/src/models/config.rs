use serde::{Deserialize, Serialize};

use super::format::{SampleFormat, SUPPORTED_SAMPLE_RATES};

/// How much audio the loopback ring buffer holds, in seconds.
pub const RING_BUFFER_SECONDS: u32 = 1;

/// Stream format for one redirect mode.
///
/// Loopback and duplex each own an instance. Changing it only affects the
/// next start of that mode; a running session keeps the config it was
/// started with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Sample format (default: f32).
    pub format: SampleFormat,

    /// Interleaved channel count (default: 2).
    pub channels: u16,

    /// Sample rate in Hz (default: 48000).
    pub sample_rate: u32,
}

impl StreamConfig {
    pub fn new(format: SampleFormat, channels: u16, sample_rate: u32) -> Self {
        Self {
            format,
            channels,
            sample_rate,
        }
    }

    pub fn bytes_per_frame(&self) -> usize {
        self.format.bytes_per_frame(self.channels)
    }

    /// Ring buffer capacity in frames for this config.
    pub fn ring_buffer_frames(&self) -> usize {
        self.sample_rate as usize * RING_BUFFER_SECONDS as usize
    }

    /// Boundary check for values coming from a user.
    ///
    /// The session manager does not call this: device negotiation decides
    /// what a backend accepts.
    pub fn validate(&self) -> Result<(), String> {
        if self.format == SampleFormat::Unknown {
            return Err("sample format must be known".into());
        }
        if self.channels == 0 {
            return Err("channel count must be positive".into());
        }
        if !SUPPORTED_SAMPLE_RATES.contains(&self.sample_rate) {
            return Err(format!("unsupported sample rate: {} Hz", self.sample_rate));
        }
        Ok(())
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            format: SampleFormat::F32,
            channels: 2,
            sample_rate: 48000,
        }
    }
}

/// Multiplier that widens the volume range a caller offers, 1x to 10x.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct VolumeBoost(u8);

impl VolumeBoost {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    pub fn new(multiplier: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX)
            .contains(&multiplier)
            .then_some(Self(multiplier))
    }

    pub fn multiplier(self) -> u8 {
        self.0
    }

    /// Upper end of the percentage range, e.g. 300 for 3x.
    pub fn max_percent(self) -> u32 {
        100 * self.0 as u32
    }

    /// Gain for a percentage picked within `0..=max_percent()`; larger
    /// values are clamped to the range.
    pub fn gain_for_percent(self, percent: u32) -> f32 {
        percent.min(self.max_percent()) as f32 / 100.0
    }

    pub fn label(self) -> String {
        const NAMES: [&str; 10] = [
            "Normal",
            "Double",
            "Triple",
            "Quadruple",
            "Quintuple",
            "Sextuple",
            "Septuple",
            "Octuple",
            "Nonuple",
            "Decuple",
        ];
        format!("{}x Boost — {}", self.0, NAMES[(self.0 - 1) as usize])
    }

    /// Every boost level, 1x first.
    pub fn all() -> impl Iterator<Item = VolumeBoost> {
        (Self::MIN..=Self::MAX).map(Self)
    }
}

impl Default for VolumeBoost {
    fn default() -> Self {
        Self(1)
    }
}

impl TryFrom<u8> for VolumeBoost {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("volume boost must be 1-10, got {}", value))
    }
}

impl From<VolumeBoost> for u8 {
    fn from(boost: VolumeBoost) -> Self {
        boost.0
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn default_is_stereo_f32_48k() {
        let config = StreamConfig::default();
        assert_eq!(config.format, SampleFormat::F32);
        assert_eq!(config.channels, 2);
        assert_eq!(config.sample_rate, 48000);
        assert_eq!(config.bytes_per_frame(), 8);
    }

    #[test]
    fn ring_buffer_holds_one_second() {
        let config = StreamConfig::new(SampleFormat::S16, 2, 44100);
        assert_eq!(config.ring_buffer_frames(), 44100);
    }

    #[test]
    fn validate_rejects_bad_values() {
        assert!(StreamConfig::default().validate().is_ok());
        assert!(StreamConfig::new(SampleFormat::Unknown, 2, 48000).validate().is_err());
        assert!(StreamConfig::new(SampleFormat::F32, 0, 48000).validate().is_err());
        assert!(StreamConfig::new(SampleFormat::F32, 2, 47999).validate().is_err());
    }

    #[test]
    fn boost_range_and_gain() {
        assert!(VolumeBoost::new(0).is_none());
        assert!(VolumeBoost::new(11).is_none());

        let boost = VolumeBoost::new(3).unwrap();
        assert_eq!(boost.max_percent(), 300);
        assert_relative_eq!(boost.gain_for_percent(150), 1.5);
        assert_relative_eq!(boost.gain_for_percent(1000), 3.0);
        assert_relative_eq!(VolumeBoost::default().gain_for_percent(0), 0.0);
    }

    #[test]
    fn boost_labels() {
        assert_eq!(VolumeBoost::default().label(), "1x Boost — Normal");
        assert_eq!(VolumeBoost::new(10).unwrap().label(), "10x Boost — Decuple");
        assert_eq!(VolumeBoost::all().count(), 10);
    }

    #[test]
    fn config_serializes_with_lowercase_format() {
        let json = serde_json::to_string(&StreamConfig::default()).unwrap();
        assert_eq!(json, r#"{"format":"f32","channels":2,"sample_rate":48000}"#);

        let boost: Result<VolumeBoost, _> = serde_json::from_str("12");
        assert!(boost.is_err());
    }
}
