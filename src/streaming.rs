//! Frame queue for threaded audio output
//!
//! The emulator thread produces frames through [`AudioSink`]; an audio
//! callback running on another thread drains them with [`FrameQueue::pop`].
//! Both ends hold clones of the same queue.
//!
//! Storage is a power-of-two ring of interleaved `i16` samples behind a
//! `parking_lot::Mutex`, with atomic positions so fill level can be queried
//! without taking the lock. When the producer outruns the consumer the
//! excess samples are dropped and counted as an overrun.

use crate::host::AudioSink;
use crate::{AicaError, Result};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Largest accepted capacity in samples (64 MiB of `i16`)
pub const MAX_CAPACITY: usize = 32 * 1024 * 1024;

#[derive(Debug)]
struct Shared {
    buffer: Mutex<Vec<i16>>,
    write_pos: AtomicUsize,
    read_pos: AtomicUsize,
    overruns: AtomicUsize,
    capacity: usize,
    mask: usize,
}

/// Bounded single-producer/single-consumer sample queue
#[derive(Debug, Clone)]
pub struct FrameQueue {
    shared: Arc<Shared>,
}

impl FrameQueue {
    /// Create a queue holding at least `requested` samples
    ///
    /// The capacity is rounded up to a power of two.
    ///
    /// # Errors
    ///
    /// Returns [`AicaError::ConfigError`] for a zero capacity or one above
    /// [`MAX_CAPACITY`].
    pub fn new(requested: usize) -> Result<Self> {
        if requested == 0 {
            return Err(AicaError::ConfigError(
                "frame queue capacity must be greater than 0".into(),
            ));
        }
        let capacity = requested.next_power_of_two();
        if capacity > MAX_CAPACITY {
            return Err(AicaError::ConfigError(format!(
                "frame queue capacity {capacity} exceeds maximum {MAX_CAPACITY}"
            )));
        }

        Ok(FrameQueue {
            shared: Arc::new(Shared {
                buffer: Mutex::new(vec![0; capacity]),
                write_pos: AtomicUsize::new(0),
                read_pos: AtomicUsize::new(0),
                overruns: AtomicUsize::new(0),
                capacity,
                mask: capacity - 1,
            }),
        })
    }

    /// Queue sized for `frames` stereo frames
    pub fn with_frames(frames: usize) -> Result<Self> {
        Self::new(frames * 2)
    }

    /// Capacity in samples
    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    /// Samples ready to be read
    pub fn available_read(&self) -> usize {
        let write = self.shared.write_pos.load(Ordering::Acquire);
        let read = self.shared.read_pos.load(Ordering::Acquire);
        write.wrapping_sub(read)
    }

    /// Free space in samples
    pub fn available_write(&self) -> usize {
        self.shared.capacity - self.available_read()
    }

    /// Number of pushes that had to drop samples
    pub fn overrun_count(&self) -> usize {
        self.shared.overruns.load(Ordering::Relaxed)
    }

    /// Fill level, 0.0 to 1.0
    pub fn fill_percentage(&self) -> f32 {
        self.available_read() as f32 / self.shared.capacity as f32
    }

    /// Append samples; returns how many fit
    pub fn push(&self, samples: &[i16]) -> usize {
        let s = &self.shared;
        let mut buf = s.buffer.lock();

        let write = s.write_pos.load(Ordering::Acquire);
        let read = s.read_pos.load(Ordering::Acquire);
        let free = s.capacity - write.wrapping_sub(read);
        let count = samples.len().min(free);

        let start = write & s.mask;
        let first = count.min(s.capacity - start);
        buf[start..start + first].copy_from_slice(&samples[..first]);
        buf[..count - first].copy_from_slice(&samples[first..count]);
        drop(buf);

        s.write_pos.store(write.wrapping_add(count), Ordering::Release);
        if count < samples.len() {
            s.overruns.fetch_add(1, Ordering::Relaxed);
        }
        count
    }

    /// Take up to `out.len()` samples; returns how many were read
    pub fn pop(&self, out: &mut [i16]) -> usize {
        let s = &self.shared;
        let buf = s.buffer.lock();

        let write = s.write_pos.load(Ordering::Acquire);
        let read = s.read_pos.load(Ordering::Acquire);
        let count = out.len().min(write.wrapping_sub(read));

        let start = read & s.mask;
        let first = count.min(s.capacity - start);
        out[..first].copy_from_slice(&buf[start..start + first]);
        out[first..count].copy_from_slice(&buf[..count - first]);
        drop(buf);

        s.read_pos.store(read.wrapping_add(count), Ordering::Release);
        count
    }

    /// Discard everything queued
    pub fn clear(&self) {
        let _buf = self.shared.buffer.lock();
        let write = self.shared.write_pos.load(Ordering::Acquire);
        self.shared.read_pos.store(write, Ordering::Release);
    }
}

impl AudioSink for FrameQueue {
    fn push_frames(&mut self, frames: &[i16]) {
        let written = self.push(frames);
        if written < frames.len() {
            log::trace!("frame queue overrun: dropped {} samples", frames.len() - written);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_rounds_to_power_of_two() {
        assert_eq!(FrameQueue::new(1000).unwrap().capacity(), 1024);
        assert_eq!(FrameQueue::with_frames(512).unwrap().capacity(), 1024);
    }

    #[test]
    fn test_invalid_capacity() {
        assert!(matches!(FrameQueue::new(0), Err(AicaError::ConfigError(_))));
        let err = FrameQueue::new(MAX_CAPACITY + 1).unwrap_err();
        assert!(err.to_string().contains("exceeds maximum"));
    }

    #[test]
    fn test_push_and_pop_wrap() {
        let q = FrameQueue::new(8).unwrap();
        assert_eq!(q.push(&[1, 2, 3, 4, 5, 6]), 6);

        let mut out = [0i16; 4];
        assert_eq!(q.pop(&mut out), 4);
        assert_eq!(out, [1, 2, 3, 4]);

        assert_eq!(q.push(&[7, 8, 9, 10, 11, 12]), 6);
        assert_eq!(q.available_read(), 8);

        let mut out = [0i16; 10];
        assert_eq!(q.pop(&mut out), 8);
        assert_eq!(&out[..8], &[5, 6, 7, 8, 9, 10, 11, 12]);
        assert_eq!(q.available_read(), 0);
    }

    #[test]
    fn test_overrun_drops_and_counts() {
        let mut q = FrameQueue::new(4).unwrap();
        q.push_frames(&[1, 1, 2, 2, 3, 3]);
        assert_eq!(q.available_read(), 4);
        assert_eq!(q.overrun_count(), 1);
        assert!((q.fill_percentage() - 1.0).abs() < f32::EPSILON);

        q.clear();
        assert_eq!(q.available_read(), 0);
        assert_eq!(q.available_write(), 4);
    }

    #[test]
    fn test_consumer_on_other_thread() {
        let q = FrameQueue::new(64).unwrap();
        let consumer = q.clone();
        let handle = std::thread::spawn(move || {
            let mut total = 0;
            let mut out = [0i16; 16];
            while total < 256 {
                let n = consumer.pop(&mut out);
                assert!(out[..n].iter().all(|&s| s == 7));
                total += n;
                std::thread::yield_now();
            }
            total
        });

        let mut sent = 0;
        while sent < 256 {
            sent += q.push(&[7; 16][..(256 - sent).min(16)]);
            std::thread::yield_now();
        }
        assert_eq!(handle.join().unwrap(), 256);
    }
}
