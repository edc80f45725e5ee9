//! Triangle wave channel implementation

use crate::apu::components::{LengthCounter, LinearCounter, Timer};
use crate::apu::constants::TRIANGLE_SEQUENCE;

/// Triangle wave channel for bass and melody lines
///
/// The timer runs every APU cycle (not every other one) but the
/// sequencer only advances while both the length counter and the linear
/// counter are non-zero. There is no envelope: the channel emits the
/// ramp step latched at the last advance, so a halted channel holds a
/// constant level rather than dropping to zero.
#[derive(Debug, Clone)]
pub struct TriangleChannel {
    /// Linear counter
    pub(crate) linear_counter: LinearCounter,
    /// Length counter
    pub(crate) length_counter: LengthCounter,
    /// Timer
    pub(crate) timer: Timer,
    /// Sequence position; masked to 5 bits when reading the ramp
    sequence_position: u8,
    /// Ramp step latched at the last timer expiry
    sequence_value: u8,
}

impl Default for TriangleChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl TriangleChannel {
    /// Create a new triangle channel
    pub fn new() -> Self {
        Self {
            linear_counter: LinearCounter::new(),
            length_counter: LengthCounter::new(),
            timer: Timer::new(),
            sequence_position: 0,
            sequence_value: TRIANGLE_SEQUENCE[0],
        }
    }

    /// Write to register 0 (linear counter setup)
    pub fn write_register_0(&mut self, data: u8) {
        // Bit 7 doubles as the length counter halt flag
        self.length_counter.set_halt((data & 0x80) != 0);
        self.linear_counter.write_control(data);
    }

    /// Install the 11-bit period assembled from the timer registers
    pub fn set_period(&mut self, period: u16) {
        self.timer.set_period_direct(period);
    }

    /// Side effects of a high timer register write: reload the length
    /// counter when the channel is enabled and arm the linear reload
    pub fn write_register_3(&mut self, data: u8, enabled: bool) {
        if enabled {
            self.length_counter.load(data >> 3);
        }

        self.linear_counter.set_reload_flag();
    }

    /// Enable or disable the channel (status register)
    pub fn set_enabled(&mut self, enabled: bool) {
        if !enabled {
            self.length_counter.clear();
        }
    }

    /// Clock the timer; the sequencer is gated on both counters
    pub fn clock_timer(&mut self) {
        if !self.length_counter.is_active() || !self.linear_counter.is_active() {
            return;
        }

        if self.timer.clock() {
            self.sequence_value = TRIANGLE_SEQUENCE[(self.sequence_position & 0x1F) as usize];
            self.sequence_position = self.sequence_position.wrapping_add(1);
        }
    }

    /// Clock the linear counter (quarter frame)
    pub fn clock_linear_counter(&mut self) {
        self.linear_counter.clock();
    }

    /// Clock the length counter (half frame)
    pub fn clock_length_counter(&mut self) {
        self.length_counter.clock();
    }

    /// Get the current output level (0-15)
    pub fn output(&self) -> u8 {
        self.sequence_value
    }

    /// Check whether the length counter is running (status register read)
    pub fn is_active(&self) -> bool {
        self.length_counter.is_active()
    }
}
