//! Linear gain over interleaved PCM byte buffers.
//!
//! Integer formats saturate at their range limits. `f32` samples are scaled
//! without clamping; the device clips them on output.

use crate::models::format::SampleFormat;

/// Scale every sample in `bytes` by `gain`, in place.
///
/// `bytes` holds little-endian interleaved samples of `format`; a trailing
/// partial sample is left untouched. Unity gain and `Unknown` are no-ops.
pub fn apply_gain(bytes: &mut [u8], format: SampleFormat, gain: f32) {
    if (gain - 1.0).abs() < f32::EPSILON {
        return;
    }

    match format {
        SampleFormat::Unknown => {}
        SampleFormat::U8 => {
            for sample in bytes.iter_mut() {
                let centered = *sample as f32 - 128.0;
                *sample = (centered * gain + 128.0).round().clamp(0.0, 255.0) as u8;
            }
        }
        SampleFormat::S16 => {
            for chunk in bytes.chunks_exact_mut(2) {
                let value = i16::from_le_bytes([chunk[0], chunk[1]]) as f32;
                let scaled = (value * gain)
                    .round()
                    .clamp(i16::MIN as f32, i16::MAX as f32) as i16;
                chunk.copy_from_slice(&scaled.to_le_bytes());
            }
        }
        SampleFormat::S24 => {
            const MIN: f32 = -8_388_608.0;
            const MAX: f32 = 8_388_607.0;
            for chunk in bytes.chunks_exact_mut(3) {
                let value = read_s24(chunk) as f32;
                let scaled = (value * gain).round().clamp(MIN, MAX) as i32;
                write_s24(chunk, scaled);
            }
        }
        SampleFormat::S32 => {
            for chunk in bytes.chunks_exact_mut(4) {
                let value = i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]) as f64;
                let scaled = (value * gain as f64)
                    .round()
                    .clamp(i32::MIN as f64, i32::MAX as f64) as i32;
                chunk.copy_from_slice(&scaled.to_le_bytes());
            }
        }
        SampleFormat::F32 => {
            for chunk in bytes.chunks_exact_mut(4) {
                let value = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
                chunk.copy_from_slice(&(value * gain).to_le_bytes());
            }
        }
    }
}

fn read_s24(chunk: &[u8]) -> i32 {
    // Place the 24 bits at the top of an i32, then shift back to sign-extend.
    i32::from_le_bytes([0, chunk[0], chunk[1], chunk[2]]) >> 8
}

fn write_s24(chunk: &mut [u8], value: i32) {
    let bytes = value.to_le_bytes();
    chunk.copy_from_slice(&bytes[..3]);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f32_bytes(samples: &[f32]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    fn f32_samples(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect()
    }

    #[test]
    fn unity_gain_leaves_bytes_untouched() {
        let original = f32_bytes(&[0.25, -0.5]);
        let mut bytes = original.clone();
        apply_gain(&mut bytes, SampleFormat::F32, 1.0);
        assert_eq!(bytes, original);
    }

    #[test]
    fn f32_scales_without_clamping() {
        let mut bytes = f32_bytes(&[0.25, -0.5, 0.8]);
        apply_gain(&mut bytes, SampleFormat::F32, 2.0);

        let result = f32_samples(&bytes);
        assert!((result[0] - 0.5).abs() < 1e-6);
        assert!((result[1] + 1.0).abs() < 1e-6);
        assert!((result[2] - 1.6).abs() < 1e-6);
    }

    #[test]
    fn s16_saturates() {
        let mut bytes: Vec<u8> = [1000i16, -20000, 30000]
            .iter()
            .flat_map(|s| s.to_le_bytes())
            .collect();
        apply_gain(&mut bytes, SampleFormat::S16, 2.0);

        let result: Vec<i16> = bytes
            .chunks_exact(2)
            .map(|c| i16::from_le_bytes([c[0], c[1]]))
            .collect();
        assert_eq!(result, vec![2000, i16::MIN, i16::MAX]);
    }

    #[test]
    fn u8_scales_around_midpoint() {
        let mut bytes = vec![128u8, 138, 118, 250];
        apply_gain(&mut bytes, SampleFormat::U8, 0.5);
        assert_eq!(bytes, vec![128, 133, 123, 189]);
    }

    #[test]
    fn s24_sign_extends_and_saturates() {
        let mut bytes = Vec::new();
        for value in [-100i32, 4_000_000] {
            bytes.extend_from_slice(&value.to_le_bytes()[..3]);
        }
        apply_gain(&mut bytes, SampleFormat::S24, 3.0);

        assert_eq!(read_s24(&bytes[0..3]), -300);
        assert_eq!(read_s24(&bytes[3..6]), 8_388_607);
    }

    #[test]
    fn zero_gain_silences_integers() {
        let mut bytes: Vec<u8> = [i32::MAX, i32::MIN]
            .iter()
            .flat_map(|s| s.to_le_bytes())
            .collect();
        apply_gain(&mut bytes, SampleFormat::S32, 0.0);
        assert!(bytes.iter().all(|b| *b == 0));
    }
}
