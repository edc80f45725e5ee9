//! Pulse wave channel implementation

use crate::apu::components::{Envelope, LengthCounter, Sweep, Timer};
use crate::apu::constants::DUTY_PATTERNS;

/// Pulse wave channel (used for both Pulse 1 and Pulse 2)
///
/// The sequencer output is latched: the channel emits the duty bit
/// captured at the last timer expiry, so duty register writes only take
/// effect when the sequencer next advances.
#[derive(Debug, Clone)]
pub struct PulseChannel {
    /// Duty cycle selector (0-3)
    pub(crate) duty: u8,
    /// Duty sequence position; masked to 3 bits when reading the pattern
    duty_position: u8,
    /// Duty bit captured at the last timer expiry
    sequence_value: u8,
    /// Envelope generator
    pub(crate) envelope: Envelope,
    /// Sweep unit
    pub(crate) sweep: Sweep,
    /// Length counter
    pub(crate) length_counter: LengthCounter,
    /// Timer
    pub(crate) timer: Timer,
    /// Mute flag; set when the channel is disabled through the status
    /// register and owned by the sweep unit while the channel is enabled
    pub(crate) muted: bool,
}

impl PulseChannel {
    /// Create a new pulse channel
    ///
    /// `ones_complement` selects the pulse-1 sweep negate behavior.
    pub fn new(ones_complement: bool) -> Self {
        Self {
            duty: 0,
            duty_position: 0,
            sequence_value: DUTY_PATTERNS[0][0],
            envelope: Envelope::new(),
            sweep: Sweep::new(ones_complement),
            length_counter: LengthCounter::new(),
            timer: Timer::new(),
            muted: false,
        }
    }

    /// Write to register 0 (duty cycle and envelope)
    pub fn write_register_0(&mut self, data: u8) {
        self.duty = data >> 6;
        self.length_counter.set_halt((data & 0x20) != 0);
        self.envelope.write_control(data);
    }

    /// Write to register 1 (sweep unit)
    pub fn write_register_1(&mut self, data: u8) {
        self.sweep.write_control(data);
    }

    /// Install the 11-bit period assembled from the timer registers;
    /// both timer register writes also reset the sweep target
    pub fn set_period(&mut self, period: u16) {
        self.timer.set_period_direct(period);
        self.sweep.set_target(period);
    }

    /// Side effects of a high timer register write: restart the
    /// envelope, reload the length counter when the channel is enabled
    /// in the status register, and reset the sequencer phase
    pub fn write_register_3(&mut self, data: u8, enabled: bool) {
        self.envelope.restart();

        if enabled {
            self.length_counter.load(data >> 3);
        }

        self.timer.reload();
        self.duty_position = 0;
    }

    /// Enable or disable the channel (status register)
    pub fn set_enabled(&mut self, enabled: bool) {
        self.muted = !enabled;
        if !enabled {
            self.length_counter.clear();
        }
    }

    /// Clock the timer; on expiry latch the duty bit and advance
    pub fn clock_timer(&mut self) {
        if self.timer.clock() {
            self.sequence_value =
                DUTY_PATTERNS[self.duty as usize][(self.duty_position & 0x07) as usize];
            self.duty_position = self.duty_position.wrapping_add(1);
        }
    }

    /// Clock the envelope (quarter frame)
    pub fn clock_envelope(&mut self) {
        self.envelope.clock();
    }

    /// Clock the length counter (half frame)
    pub fn clock_length_counter(&mut self) {
        self.length_counter.clock();
    }

    /// Clock the sweep unit (half frame); may rewrite the channel
    /// period and the mute flag
    pub fn clock_sweep(&mut self) {
        self.sweep.clock(&mut self.timer.period, &mut self.muted);
    }

    /// Current envelope volume gated by mute and length state
    fn volume(&self) -> u8 {
        if self.muted || !self.length_counter.is_active() {
            0
        } else {
            self.envelope.volume()
        }
    }

    /// Get the current output level (0-15)
    pub fn output(&self) -> u8 {
        self.volume() * self.sequence_value
    }

    /// Check whether the length counter is running (status register read)
    pub fn is_active(&self) -> bool {
        self.length_counter.is_active()
    }
}

impl Default for PulseChannel {
    fn default() -> Self {
        Self::new(false)
    }
}
