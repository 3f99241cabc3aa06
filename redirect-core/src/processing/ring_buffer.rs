//! Lock-free single-producer/single-consumer byte ring buffer.
//!
//! Bridges two audio callbacks that run on independent hardware clocks. The
//! buffer is frame-oriented on top of an `rtrb` byte ring: every grant is a
//! whole number of frames of `bytes_per_frame` bytes.
//!
//! Both halves use a two-phase protocol:
//! ```text
//! acquire_write(n) → fill grant → commit(filled)
//! acquire_read(n)  → copy grant → commit(copied)
//! ```
//! A grant covers at most two regions: up to the end of the storage, then
//! from its start after wrapping. Capacity is fixed at construction; nothing
//! here blocks or allocates after [`ring_buffer`] returns.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rtrb::chunks::{ReadChunk, WriteChunk};
use rtrb::{Consumer, Producer, RingBuffer};

use crate::models::result_code::ResultCode;

/// Monotonic frame counters behind [`RingStatus`].
///
/// `written` is bumped before a write is published and `read` after a read
/// is released, so an observer that loads `read` first never sees
/// `read > written`.
struct Counters {
    written: AtomicUsize,
    read: AtomicUsize,
    capacity_frames: usize,
    bytes_per_frame: usize,
}

impl Counters {
    fn buffered_frames(&self) -> usize {
        let read = self.read.load(Ordering::Acquire);
        let written = self.written.load(Ordering::Acquire);
        // A producer may count a write into slots freed by a read the
        // consumer has not counted yet.
        written.saturating_sub(read).min(self.capacity_frames)
    }
}

/// Allocate a ring buffer holding `capacity_frames` frames.
///
/// Fails with `InvalidArgs` for a zero capacity or frame size and `TooBig`
/// when the byte size overflows.
pub fn ring_buffer(
    capacity_frames: usize,
    bytes_per_frame: usize,
) -> Result<(RingProducer, RingConsumer), ResultCode> {
    if capacity_frames == 0 || bytes_per_frame == 0 {
        return Err(ResultCode::InvalidArgs);
    }
    let len = capacity_frames
        .checked_mul(bytes_per_frame)
        .filter(|len| *len <= isize::MAX as usize)
        .ok_or(ResultCode::TooBig)?;

    let (producer, consumer) = RingBuffer::<u8>::new(len);
    let counters = Arc::new(Counters {
        written: AtomicUsize::new(0),
        read: AtomicUsize::new(0),
        capacity_frames,
        bytes_per_frame,
    });

    Ok((
        RingProducer {
            producer,
            counters: Arc::clone(&counters),
        },
        RingConsumer { consumer, counters },
    ))
}

/// Writing half. Owned by exactly one execution context (the capture callback).
pub struct RingProducer {
    producer: Producer<u8>,
    counters: Arc<Counters>,
}

impl RingProducer {
    /// Reserve up to `requested_frames` frames for writing.
    ///
    /// The grant is smaller when the buffer is nearly full and empty when it
    /// is full.
    pub fn acquire_write(&mut self, requested_frames: usize) -> WriteGrant<'_> {
        let bpf = self.counters.bytes_per_frame;
        let frames = requested_frames.min(self.producer.slots() / bpf);
        WriteGrant {
            chunk: self.producer.write_chunk(frames * bpf).ok(),
            counters: &self.counters,
        }
    }

    pub fn free_frames(&self) -> usize {
        self.producer.slots() / self.counters.bytes_per_frame
    }

    pub fn status(&self) -> RingStatus {
        RingStatus {
            counters: Arc::clone(&self.counters),
        }
    }
}

/// Frames reserved by [`RingProducer::acquire_write`].
///
/// Dropping a grant without committing it publishes nothing.
pub struct WriteGrant<'a> {
    chunk: Option<WriteChunk<'a, u8>>,
    counters: &'a Counters,
}

impl WriteGrant<'_> {
    pub fn frames(&self) -> usize {
        self.chunk.as_ref().map_or(0, |c| c.len()) / self.counters.bytes_per_frame
    }

    pub fn is_empty(&self) -> bool {
        self.frames() == 0
    }

    /// The granted bytes: before the end of storage, then after wrapping.
    pub fn regions(&mut self) -> (&mut [u8], &mut [u8]) {
        match self.chunk.as_mut() {
            Some(chunk) => chunk.as_mut_slices(),
            None => (&mut [], &mut []),
        }
    }

    /// Copy whole frames from `bytes` into the grant. Returns frames copied.
    pub fn copy_from(&mut self, bytes: &[u8]) -> usize {
        let bpf = self.counters.bytes_per_frame;
        let usable = bytes.len() / bpf * bpf;
        let mut copied = 0;
        let (first, second) = self.regions();
        for region in [first, second] {
            let n = region.len().min(usable - copied);
            region[..n].copy_from_slice(&bytes[copied..copied + n]);
            copied += n;
        }
        copied / bpf
    }

    /// Publish the first `frames` frames of the grant to the consumer.
    ///
    /// Committing more than was granted is a caller bug; the excess is ignored.
    pub fn commit(self, frames: usize) {
        let granted = self.frames();
        debug_assert!(frames <= granted, "commit exceeds grant");
        let frames = frames.min(granted);
        if let Some(chunk) = self.chunk {
            self.counters.written.fetch_add(frames, Ordering::Release);
            chunk.commit(frames * self.counters.bytes_per_frame);
        }
    }
}

/// Reading half. Owned by exactly one execution context (the playback callback).
pub struct RingConsumer {
    consumer: Consumer<u8>,
    counters: Arc<Counters>,
}

impl RingConsumer {
    /// Claim up to `requested_frames` buffered frames; empty when nothing is
    /// buffered.
    pub fn acquire_read(&mut self, requested_frames: usize) -> ReadGrant<'_> {
        let bpf = self.counters.bytes_per_frame;
        let frames = requested_frames.min(self.consumer.slots() / bpf);
        ReadGrant {
            chunk: self.consumer.read_chunk(frames * bpf).ok(),
            counters: &self.counters,
        }
    }

    pub fn available_frames(&self) -> usize {
        self.consumer.slots() / self.counters.bytes_per_frame
    }

    pub fn status(&self) -> RingStatus {
        RingStatus {
            counters: Arc::clone(&self.counters),
        }
    }
}

/// Frames claimed by [`RingConsumer::acquire_read`].
pub struct ReadGrant<'a> {
    chunk: Option<ReadChunk<'a, u8>>,
    counters: &'a Counters,
}

impl ReadGrant<'_> {
    pub fn frames(&self) -> usize {
        self.chunk.as_ref().map_or(0, |c| c.len()) / self.counters.bytes_per_frame
    }

    pub fn is_empty(&self) -> bool {
        self.frames() == 0
    }

    pub fn regions(&self) -> (&[u8], &[u8]) {
        match self.chunk.as_ref() {
            Some(chunk) => chunk.as_slices(),
            None => (&[], &[]),
        }
    }

    /// Copy whole frames of the grant into `out`. Returns frames copied.
    pub fn copy_to(&self, out: &mut [u8]) -> usize {
        let bpf = self.counters.bytes_per_frame;
        let usable = out.len() / bpf * bpf;
        let mut copied = 0;
        let (first, second) = self.regions();
        for region in [first, second] {
            let n = region.len().min(usable - copied);
            out[copied..copied + n].copy_from_slice(&region[..n]);
            copied += n;
        }
        copied / bpf
    }

    /// Release the first `frames` frames of the grant back to the producer.
    pub fn commit(self, frames: usize) {
        let granted = self.frames();
        debug_assert!(frames <= granted, "commit exceeds grant");
        let frames = frames.min(granted);
        if let Some(chunk) = self.chunk {
            chunk.commit(frames * self.counters.bytes_per_frame);
            self.counters.read.fetch_add(frames, Ordering::Release);
        }
    }
}

/// Read-only view of a ring buffer's fill level, safe to poll from any thread.
#[derive(Clone)]
pub struct RingStatus {
    counters: Arc<Counters>,
}

impl RingStatus {
    /// Frames buffered, never more than [`capacity_frames`](Self::capacity_frames).
    pub fn buffered_frames(&self) -> usize {
        self.counters.buffered_frames()
    }

    pub fn capacity_frames(&self) -> usize {
        self.counters.capacity_frames
    }

    pub fn bytes_per_frame(&self) -> usize {
        self.counters.bytes_per_frame
    }

    /// Size of the backing storage; fixed for the buffer's lifetime.
    pub fn capacity_bytes(&self) -> usize {
        self.counters.capacity_frames * self.counters.bytes_per_frame
    }
}

impl std::fmt::Debug for RingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RingStatus")
            .field("buffered_frames", &self.buffered_frames())
            .field("capacity_frames", &self.capacity_frames())
            .field("bytes_per_frame", &self.bytes_per_frame())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    fn write_frames(producer: &mut RingProducer, bytes: &[u8], bpf: usize) -> usize {
        let mut grant = producer.acquire_write(bytes.len() / bpf);
        let copied = grant.copy_from(bytes);
        grant.commit(copied);
        copied
    }

    fn read_frames(consumer: &mut RingConsumer, frames: usize, bpf: usize) -> Vec<u8> {
        let grant = consumer.acquire_read(frames);
        let mut data = vec![0; grant.frames() * bpf];
        let copied = grant.copy_to(&mut data);
        grant.commit(copied);
        data
    }

    #[test]
    fn basic_write_read() {
        let (mut producer, mut consumer) = ring_buffer(8, 2).unwrap();

        assert_eq!(write_frames(&mut producer, &[1, 2, 3, 4, 5, 6], 2), 3);
        assert_eq!(consumer.available_frames(), 3);
        assert_eq!(read_frames(&mut consumer, 3, 2), vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(consumer.available_frames(), 0);
    }

    #[test]
    fn rejects_degenerate_sizes() {
        assert_eq!(ring_buffer(0, 4).err(), Some(ResultCode::InvalidArgs));
        assert_eq!(ring_buffer(16, 0).err(), Some(ResultCode::InvalidArgs));
        assert_eq!(ring_buffer(usize::MAX, 8).err(), Some(ResultCode::TooBig));
    }

    #[test]
    fn grants_less_when_nearly_full() {
        let (mut producer, _consumer) = ring_buffer(4, 1).unwrap();

        assert_eq!(write_frames(&mut producer, &[1, 2, 3], 1), 3);
        let grant = producer.acquire_write(10);
        assert_eq!(grant.frames(), 1);
        grant.commit(1);
        assert_eq!(producer.free_frames(), 0);
    }

    #[test]
    fn full_buffer_grants_zero_until_read() {
        let (mut producer, mut consumer) = ring_buffer(4, 1).unwrap();
        let capacity_bytes = producer.status().capacity_bytes();

        for _ in 0..10 {
            write_frames(&mut producer, &[9, 9, 9, 9], 1);
        }
        assert_eq!(producer.free_frames(), 0);
        let grant = producer.acquire_write(1);
        assert!(grant.is_empty());
        grant.commit(0);
        assert_eq!(producer.status().capacity_bytes(), capacity_bytes);

        read_frames(&mut consumer, 2, 1);
        assert_eq!(producer.acquire_write(4).frames(), 2);
    }

    #[test]
    fn empty_buffer_grants_zero() {
        let (_producer, mut consumer) = ring_buffer(4, 4).unwrap();
        let grant = consumer.acquire_read(4);
        assert!(grant.is_empty());
        grant.commit(0);
        assert_eq!(consumer.available_frames(), 0);
    }

    #[test]
    fn grant_wraps_around_storage_end() {
        let (mut producer, mut consumer) = ring_buffer(4, 1).unwrap();

        write_frames(&mut producer, &[1, 2, 3], 1);
        assert_eq!(read_frames(&mut consumer, 2, 1), vec![1, 2]);

        // write cursor at 3: one frame before the end, two after wrapping
        let mut grant = producer.acquire_write(3);
        assert_eq!(grant.frames(), 3);
        let (first, second) = grant.regions();
        assert_eq!((first.len(), second.len()), (1, 2));
        assert_eq!(grant.copy_from(&[4, 5, 6]), 3);
        grant.commit(3);

        assert_eq!(read_frames(&mut consumer, 4, 1), vec![3, 4, 5, 6]);
    }

    #[test]
    fn uncommitted_grant_publishes_nothing() {
        let (mut producer, consumer) = ring_buffer(4, 2).unwrap();
        {
            let mut grant = producer.acquire_write(2);
            grant.copy_from(&[1, 2, 3, 4]);
        }
        assert_eq!(consumer.available_frames(), 0);
        assert_eq!(consumer.status().buffered_frames(), 0);
    }

    #[test]
    fn partial_commit_keeps_remainder() {
        let (mut producer, mut consumer) = ring_buffer(8, 1).unwrap();
        write_frames(&mut producer, &[1, 2, 3, 4], 1);

        let grant = consumer.acquire_read(4);
        assert_eq!(grant.frames(), 4);
        grant.commit(1);

        assert_eq!(consumer.available_frames(), 3);
        assert_eq!(read_frames(&mut consumer, 8, 1), vec![2, 3, 4]);
    }

    #[test]
    fn status_tracks_fill_level() {
        let (mut producer, mut consumer) = ring_buffer(16, 4).unwrap();
        let status = consumer.status();

        write_frames(&mut producer, &[0u8; 20], 4);
        assert_eq!(status.buffered_frames(), 5);
        read_frames(&mut consumer, 2, 4);
        assert_eq!(status.buffered_frames(), 3);
        assert_eq!(status.capacity_frames(), 16);
        assert_eq!(status.capacity_bytes(), 64);
    }

    #[test]
    fn concurrent_producer_consumer_preserves_order() {
        const TOTAL: usize = 100_000;
        let (mut producer, mut consumer) = ring_buffer(64, 4).unwrap();

        let writer = thread::spawn(move || {
            let mut next = 0usize;
            while next < TOTAL {
                let mut grant = producer.acquire_write(7.min(TOTAL - next));
                let frames = grant.frames();
                let bytes: Vec<u8> = (next..next + frames)
                    .flat_map(|v| (v as u32).to_le_bytes())
                    .collect();
                grant.copy_from(&bytes);
                grant.commit(frames);
                next += frames;
                thread::yield_now();
            }
        });

        let mut expected = 0u32;
        while (expected as usize) < TOTAL {
            let data = read_frames(&mut consumer, 5, 4);
            for frame in data.chunks_exact(4) {
                let value = u32::from_le_bytes([frame[0], frame[1], frame[2], frame[3]]);
                assert_eq!(value, expected);
                expected += 1;
            }
        }

        writer.join().unwrap();
    }

    #[test]
    fn fill_level_stays_bounded_under_concurrent_use() {
        const TOTAL: usize = 200_000;
        let (mut producer, mut consumer) = ring_buffer(4, 1).unwrap();
        let status = consumer.status();

        let writer = thread::spawn(move || {
            let mut written = 0;
            while written < TOTAL {
                written += write_frames(&mut producer, &[7, 7, 7], 1);
            }
        });
        let reader = thread::spawn(move || {
            let mut read = 0;
            while read < TOTAL {
                read += read_frames(&mut consumer, 3, 1).len();
            }
        });

        while !reader.is_finished() {
            let buffered = status.buffered_frames();
            assert!(
                buffered <= status.capacity_frames(),
                "buffered_frames reported {} for capacity {}",
                buffered,
                status.capacity_frames()
            );
        }

        writer.join().unwrap();
        reader.join().unwrap();
    }
}
