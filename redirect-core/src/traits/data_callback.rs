/// Moves one block of audio between device buffers.
///
/// Invoked by the audio subsystem on its own thread, once per hardware
/// period. Buffers hold interleaved little-endian samples in the stream's
/// configured format:
/// - `output`: frames to render; empty for capture-only devices.
/// - `input`: frames just captured; empty for playback-only devices.
/// - `frame_count`: frames in each non-empty buffer.
///
/// Implementations must not block, allocate, or log: a late return is an
/// audible dropout.
pub trait DataCallback: Send + 'static {
    fn process(&mut self, output: &mut [u8], input: &[u8], frame_count: usize);
}

impl<F> DataCallback for F
where
    F: FnMut(&mut [u8], &[u8], usize) + Send + 'static,
{
    fn process(&mut self, output: &mut [u8], input: &[u8], frame_count: usize) {
        self(output, input, frame_count)
    }
}
