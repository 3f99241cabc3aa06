use serde::{Deserialize, Serialize};

/// PCM sample format of a stream.
///
/// Discriminants match the audio engine's native numbering so raw values
/// coming from a backend can be looked up with [`SampleFormat::from_raw`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleFormat {
    Unknown = 0,
    U8 = 1,
    S16 = 2,
    S24 = 3,
    S32 = 4,
    F32 = 5,
}

/// Formats offered to callers, in the order a format picker lists them.
pub const SUPPORTED_FORMATS: [SampleFormat; 5] = [
    SampleFormat::F32,
    SampleFormat::S32,
    SampleFormat::S24,
    SampleFormat::S16,
    SampleFormat::U8,
];

/// Sample rates offered to callers, in Hz.
pub const SUPPORTED_SAMPLE_RATES: [u32; 9] = [
    8000, 11025, 16000, 22050, 32000, 44100, 48000, 96000, 192000,
];

impl SampleFormat {
    /// Every value of the enumeration, `Unknown` included.
    pub const ALL: [SampleFormat; 6] = [
        SampleFormat::Unknown,
        SampleFormat::U8,
        SampleFormat::S16,
        SampleFormat::S24,
        SampleFormat::S32,
        SampleFormat::F32,
    ];

    /// Size of one sample in bytes. `Unknown` has no size.
    pub fn bytes_per_sample(self) -> usize {
        match self {
            Self::Unknown => 0,
            Self::U8 => 1,
            Self::S16 => 2,
            Self::S24 => 3,
            Self::S32 | Self::F32 => 4,
        }
    }

    /// Size of one interleaved frame (one sample per channel) in bytes.
    pub fn bytes_per_frame(self, channels: u16) -> usize {
        self.bytes_per_sample() * channels as usize
    }

    pub fn from_raw(raw: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|f| *f as u32 == raw)
    }

    /// Short lowercase code (`"f32"`, `"s16"`, ...), as used on command lines.
    pub fn short_name(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::U8 => "u8",
            Self::S16 => "s16",
            Self::S24 => "s24",
            Self::S32 => "s32",
            Self::F32 => "f32",
        }
    }

    pub fn from_short_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.short_name().eq_ignore_ascii_case(name.trim()))
    }
}

/// Label shown next to a sample rate, e.g. `"48000 Hz"`.
pub fn sample_rate_label(sample_rate: u32) -> String {
    format!("{} Hz", sample_rate)
}

/// Parse a sample rate typed by a user or picked from a list.
///
/// Accepts bare numbers (`"44100"`) and labels (`"44100 Hz"`). Returns `None`
/// when the text is not a number; range checks are left to
/// [`StreamConfig::validate`](crate::StreamConfig::validate).
pub fn parse_sample_rate(text: &str) -> Option<u32> {
    let trimmed = text.trim();
    let digits = trimmed
        .strip_suffix("Hz")
        .or_else(|| trimmed.strip_suffix("hz"))
        .unwrap_or(trimmed)
        .trim();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_sizes() {
        assert_eq!(SampleFormat::F32.bytes_per_frame(2), 8);
        assert_eq!(SampleFormat::S24.bytes_per_frame(2), 6);
        assert_eq!(SampleFormat::U8.bytes_per_frame(1), 1);
        assert_eq!(SampleFormat::S16.bytes_per_frame(6), 12);
        assert_eq!(SampleFormat::Unknown.bytes_per_frame(2), 0);
    }

    #[test]
    fn raw_values_match_engine_numbering() {
        assert_eq!(SampleFormat::from_raw(0), Some(SampleFormat::Unknown));
        assert_eq!(SampleFormat::from_raw(5), Some(SampleFormat::F32));
        assert_eq!(SampleFormat::from_raw(6), None);
    }

    #[test]
    fn short_names_are_case_insensitive() {
        assert_eq!(SampleFormat::from_short_name("F32"), Some(SampleFormat::F32));
        assert_eq!(SampleFormat::from_short_name(" s24 "), Some(SampleFormat::S24));
        assert_eq!(SampleFormat::from_short_name("f64"), None);
    }

    #[test]
    fn parse_rate_accepts_labels() {
        assert_eq!(parse_sample_rate("48000 Hz"), Some(48000));
        assert_eq!(parse_sample_rate("44100"), Some(44100));
        assert_eq!(parse_sample_rate(&sample_rate_label(96000)), Some(96000));
        assert_eq!(parse_sample_rate("fast"), None);
        assert_eq!(parse_sample_rate(""), None);
    }

    #[test]
    fn supported_formats_exclude_unknown() {
        assert!(!SUPPORTED_FORMATS.contains(&SampleFormat::Unknown));
        assert_eq!(SUPPORTED_FORMATS[0], SampleFormat::F32);
    }
}
