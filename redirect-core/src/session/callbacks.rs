//! Data callbacks installed on device handles by the redirect sessions.
//!
//! ```text
//! loopback:  [capture device] → LoopbackCapture → ring → LoopbackPlayback → [playback device]
//! duplex:    [capture side] → DuplexPassThrough → [playback side]   (one clock, no ring)
//! ```

use crate::models::config::StreamConfig;
use crate::processing::ring_buffer::{RingConsumer, RingProducer};
use crate::traits::data_callback::DataCallback;

/// Capture side of a loopback redirect: pushes captured frames into the ring.
///
/// Frames that do not fit are dropped; the producer never waits for the
/// consumer.
pub struct LoopbackCapture {
    producer: RingProducer,
    bytes_per_frame: usize,
}

impl LoopbackCapture {
    pub fn new(producer: RingProducer, config: &StreamConfig) -> Self {
        Self {
            producer,
            bytes_per_frame: config.bytes_per_frame(),
        }
    }
}

impl DataCallback for LoopbackCapture {
    fn process(&mut self, _output: &mut [u8], input: &[u8], frame_count: usize) {
        let bpf = self.bytes_per_frame;
        if bpf == 0 {
            return;
        }
        let total = frame_count.min(input.len() / bpf);

        let mut grant = self.producer.acquire_write(total);
        let written = grant.copy_from(&input[..total * bpf]);
        grant.commit(written);
    }
}

/// Playback side of a loopback redirect: drains the ring into the output.
///
/// The output block is always fully written; whatever the ring cannot supply
/// is silence.
pub struct LoopbackPlayback {
    consumer: RingConsumer,
    bytes_per_frame: usize,
}

impl LoopbackPlayback {
    pub fn new(consumer: RingConsumer, config: &StreamConfig) -> Self {
        Self {
            consumer,
            bytes_per_frame: config.bytes_per_frame(),
        }
    }
}

impl DataCallback for LoopbackPlayback {
    fn process(&mut self, output: &mut [u8], _input: &[u8], frame_count: usize) {
        let bpf = self.bytes_per_frame;
        if bpf == 0 {
            output.fill(0);
            return;
        }
        let total = frame_count.min(output.len() / bpf);

        let grant = self.consumer.acquire_read(total);
        let read = grant.copy_to(&mut output[..total * bpf]);
        grant.commit(read);

        output[read * bpf..].fill(0);
    }
}

/// Duplex pass-through: copies the captured block straight to the output.
///
/// Both sides of a duplex handle share one format and channel count, so the
/// backend must hand over input and output blocks of identical size.
pub struct DuplexPassThrough {
    bytes_per_frame: usize,
}

impl DuplexPassThrough {
    pub fn new(config: &StreamConfig) -> Self {
        Self {
            bytes_per_frame: config.bytes_per_frame(),
        }
    }
}

impl DataCallback for DuplexPassThrough {
    fn process(&mut self, output: &mut [u8], input: &[u8], frame_count: usize) {
        let expected = frame_count * self.bytes_per_frame;
        debug_assert_eq!(
            input.len(),
            expected,
            "duplex capture block does not match the configured format and channel count"
        );
        debug_assert_eq!(
            output.len(),
            expected,
            "duplex playback block does not match the configured format and channel count"
        );

        let len = expected.min(input.len()).min(output.len());
        output[..len].copy_from_slice(&input[..len]);
        output[len..].fill(0);
    }
}
