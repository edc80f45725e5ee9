// Audio output - playback through cpal
//
// Manages the output device, the stream and the bounded queue the
// playback callback reads from. Underruns play silence rather than
// blocking; backpressure is the caller's business - it checks
// `queued_samples` before rendering the next block.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use std::sync::{Arc, Mutex};

/// Bounded ring buffer of samples shared with the audio callback
pub struct SampleQueue {
    buffer: Vec<f32>,
    read_pos: usize,
    write_pos: usize,
    count: usize,
}

impl SampleQueue {
    /// Create a queue holding at most `capacity` samples
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: vec![0.0; capacity],
            read_pos: 0,
            write_pos: 0,
            count: 0,
        }
    }

    /// Push a sample; returns false when the queue is full
    pub fn push(&mut self, sample: f32) -> bool {
        if self.count >= self.buffer.len() {
            return false;
        }

        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
        self.count += 1;
        true
    }

    /// Pop the oldest sample; None when the queue is empty
    pub fn pop(&mut self) -> Option<f32> {
        if self.count == 0 {
            return None;
        }

        let sample = self.buffer[self.read_pos];
        self.read_pos = (self.read_pos + 1) % self.buffer.len();
        self.count -= 1;
        Some(sample)
    }

    /// Number of queued samples
    pub fn len(&self) -> usize {
        self.count
    }

    /// Check if the queue is empty
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Queue capacity
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Drop all queued samples
    pub fn clear(&mut self) {
        self.read_pos = 0;
        self.write_pos = 0;
        self.count = 0;
    }
}

/// Audio output handle
///
/// Owns the device and stream; samples flow through the shared queue.
pub struct AudioOutput {
    /// Audio device
    _device: Device,

    /// Audio stream
    stream: Stream,

    /// Shared sample queue
    queue: Arc<Mutex<SampleQueue>>,
}

impl AudioOutput {
    /// Open the default output device at `sample_rate` Hz (mono) with a
    /// queue of roughly `buffer_duration_ms` milliseconds
    pub fn new(sample_rate: u32, buffer_duration_ms: u32) -> Result<Self, String> {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .ok_or("No output device available")?;

        println!("Audio device: {}", device.name().unwrap_or_default());

        let stream_config = StreamConfig {
            channels: 1,
            sample_rate: cpal::SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let capacity = ((buffer_duration_ms as f64 / 1000.0) * sample_rate as f64) as usize;
        let queue = Arc::new(Mutex::new(SampleQueue::new(capacity)));
        let queue_clone = Arc::clone(&queue);

        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let mut queue = queue_clone.lock().unwrap();

                    for sample in data.iter_mut() {
                        *sample = queue.pop().unwrap_or(0.0);
                    }
                },
                move |err| {
                    eprintln!("Audio stream error: {}", err);
                },
                None,
            )
            .map_err(|e| format!("Failed to build audio stream: {}", e))?;

        stream
            .play()
            .map_err(|e| format!("Failed to start audio stream: {}", e))?;

        println!("Audio output initialized: {} Hz, mono", sample_rate);

        Ok(Self {
            _device: device,
            stream,
            queue,
        })
    }

    /// Queue a block of samples; returns how many were accepted before
    /// the queue filled up
    pub fn queue_samples(&self, samples: &[f32]) -> usize {
        let mut queue = self.queue.lock().unwrap();

        for (queued, &sample) in samples.iter().enumerate() {
            if !queue.push(sample) {
                return queued;
            }
        }
        samples.len()
    }

    /// Number of samples waiting in the queue
    pub fn queued_samples(&self) -> usize {
        self.queue.lock().unwrap().len()
    }

    /// Queue capacity
    pub fn queue_capacity(&self) -> usize {
        self.queue.lock().unwrap().capacity()
    }

    /// Drop everything queued
    pub fn clear(&self) {
        self.queue.lock().unwrap().clear();
    }

    /// Pause playback
    pub fn pause(&self) -> Result<(), String> {
        self.stream
            .pause()
            .map_err(|e| format!("Failed to pause audio: {}", e))
    }

    /// Resume playback
    pub fn resume(&self) -> Result<(), String> {
        self.stream
            .play()
            .map_err(|e| format!("Failed to resume audio: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_push_pop_order() {
        let mut queue = SampleQueue::new(4);

        assert!(queue.push(1.0));
        assert!(queue.push(2.0));
        assert_eq!(queue.pop(), Some(1.0));
        assert_eq!(queue.pop(), Some(2.0));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_queue_rejects_overflow() {
        let mut queue = SampleQueue::new(2);

        assert!(queue.push(1.0));
        assert!(queue.push(2.0));
        assert!(!queue.push(3.0));
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_queue_wraps_around() {
        let mut queue = SampleQueue::new(3);

        for round in 0..10 {
            let base = round as f32;
            queue.push(base);
            queue.push(base + 0.5);
            assert_eq!(queue.pop(), Some(base));
            assert_eq!(queue.pop(), Some(base + 0.5));
        }
        assert!(queue.is_empty());
    }

    #[test]
    fn test_queue_clear() {
        let mut queue = SampleQueue::new(4);
        queue.push(1.0);
        queue.push(2.0);

        queue.clear();
        assert!(queue.is_empty());
        assert_eq!(queue.pop(), None);
    }

    // Note: AudioOutput itself needs audio hardware; it is exercised by
    // running the player binary.
}
