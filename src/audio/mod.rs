// Audio module - sound card output for rendered samples
//
// This module provides:
// - A bounded sample queue shared with the audio callback
// - Cross-platform audio output using cpal
//
// The player renders one video frame of samples at a time and queues
// them here whenever the queue is running low; the cpal callback
// drains it from the device thread.

pub mod output;

pub use output::{AudioOutput, SampleQueue};
