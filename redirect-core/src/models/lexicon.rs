//! Human-readable names for sample formats and engine result codes.
//!
//! The format labels double as the values a UI puts in its format picker, so
//! [`string_to_format`] must accept exactly what [`format_to_string`] emits.

use super::format::SampleFormat;
use super::result_code::{ResultCode, UNKNOWN_ERROR};

/// Label returned for raw format values outside the known table.
pub const INVALID_FORMAT: &str = "Invalid Format";

const FORMAT_LABELS: [(SampleFormat, &str); 6] = [
    (SampleFormat::Unknown, "Unknown"),
    (SampleFormat::U8, "u8 (Unsigned 8-bit)"),
    (SampleFormat::S16, "s16 (Signed 16-bit)"),
    (SampleFormat::S24, "s24 (Signed 24-bit)"),
    (SampleFormat::S32, "s32 (Signed 32-bit)"),
    (SampleFormat::F32, "f32 (32-bit Float)"),
];

pub fn format_to_string(format: SampleFormat) -> &'static str {
    FORMAT_LABELS
        .iter()
        .find(|(f, _)| *f == format)
        .map(|(_, label)| *label)
        .unwrap_or(INVALID_FORMAT)
}

/// Label for a raw engine format value; unrecognized values get [`INVALID_FORMAT`].
pub fn raw_format_to_string(raw: u32) -> &'static str {
    SampleFormat::from_raw(raw)
        .map(format_to_string)
        .unwrap_or(INVALID_FORMAT)
}

/// Exact-match inverse of [`format_to_string`].
pub fn string_to_format(label: &str) -> Option<SampleFormat> {
    FORMAT_LABELS
        .iter()
        .find(|(_, l)| *l == label)
        .map(|(f, _)| *f)
}

pub fn result_code_to_string(code: ResultCode) -> &'static str {
    code.description()
}

/// Description for a raw engine result value. Never fails: codes outside the
/// defined set map to [`UNKNOWN_ERROR`].
pub fn raw_result_code_to_string(raw: i32) -> &'static str {
    ResultCode::from_raw(raw)
        .map(ResultCode::description)
        .unwrap_or(UNKNOWN_ERROR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::format::SUPPORTED_FORMATS;

    #[test]
    fn format_labels_round_trip() {
        for format in SampleFormat::ALL {
            assert_eq!(string_to_format(format_to_string(format)), Some(format));
        }
        for format in SUPPORTED_FORMATS {
            assert_ne!(format_to_string(format), INVALID_FORMAT);
        }
    }

    #[test]
    fn unrecognized_labels_yield_none() {
        assert_eq!(string_to_format("f32"), None);
        assert_eq!(string_to_format("F32 (32-bit Float)"), None);
        assert_eq!(string_to_format("f32 (32-bit Float) "), None);
        assert_eq!(string_to_format(""), None);
        assert_eq!(string_to_format(INVALID_FORMAT), None);
    }

    #[test]
    fn raw_formats_outside_table_are_invalid() {
        assert_eq!(raw_format_to_string(5), "f32 (32-bit Float)");
        assert_eq!(raw_format_to_string(0), "Unknown");
        assert_eq!(raw_format_to_string(42), INVALID_FORMAT);
    }

    #[test]
    fn defined_codes_have_specific_descriptions() {
        for code in ResultCode::ALL {
            let text = result_code_to_string(*code);
            assert!(!text.is_empty());
            assert_ne!(text, UNKNOWN_ERROR);
            assert_eq!(raw_result_code_to_string(code.raw()), text);
        }
    }

    #[test]
    fn undefined_codes_map_to_unknown_error() {
        for raw in [1, -53, -101, -209, -304, -404, i32::MIN, i32::MAX] {
            assert_eq!(raw_result_code_to_string(raw), UNKNOWN_ERROR);
        }
    }

    #[test]
    fn failure_codes_read_naturally() {
        assert_eq!(result_code_to_string(ResultCode::Success), "Success");
        assert_eq!(
            result_code_to_string(ResultCode::FailedToOpenBackendDevice),
            "Failed To Open Backend Device"
        );
    }
}
