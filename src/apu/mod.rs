// APU module - Audio Processing Unit implementation
//
// Cycle-accurate emulation of the 2A03 APU: five sound channels, the
// frame sequencer that paces their envelopes and counters, and the
// mixer/filter chain that turns the ~1.79 MHz channel levels into
// output-rate samples.
//
// ## Register Map
//
// Registers are addressed by their index in the $4000 page.
//
// ### Pulse 1 ($00-$03) / Pulse 2 ($04-$07)
// | Index | Description                           |
// |-------|---------------------------------------|
// | $00   | Duty cycle, envelope                  |
// | $01   | Sweep unit                            |
// | $02   | Timer low byte                        |
// | $03   | Length counter load, timer high bits  |
//
// ### Triangle ($08-$0B)
// | Index | Description                           |
// |-------|---------------------------------------|
// | $08   | Linear counter                        |
// | $0A   | Timer low byte                        |
// | $0B   | Length counter load, timer high bits  |
//
// ### Noise ($0C-$0F)
// | Index | Description                           |
// |-------|---------------------------------------|
// | $0C   | Envelope                              |
// | $0E   | Mode, period                          |
// | $0F   | Length counter load                   |
//
// ### DMC ($10-$13)
// | Index | Description                           |
// |-------|---------------------------------------|
// | $10   | IRQ enable, loop, rate                |
// | $11   | Direct output load                    |
// | $12   | Sample address                        |
// | $13   | Sample length                         |
//
// ### Control ($15, $17)
// | Index | Description                           |
// |-------|---------------------------------------|
// | $15   | Status / channel enable (R/W)         |
// | $17   | Frame counter (W)                     |

pub mod channels;
pub mod components;
pub mod constants;
pub mod filter;
pub mod mixer;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use crate::memory::ProgramMemory;
use channels::{DmcChannel, NoiseChannel, PulseChannel, TriangleChannel};
use components::{FrameCounter, FrameEvent};
use filter::{FirDecimator, HighPassFilter};
use mixer::Mixer;

/// Pulse 1 registers
pub const PULSE1_VOLUME: u8 = 0x00;
pub const PULSE1_SWEEP: u8 = 0x01;
pub const PULSE1_TIMER_LOW: u8 = 0x02;
pub const PULSE1_TIMER_HIGH: u8 = 0x03;

/// Pulse 2 registers
pub const PULSE2_VOLUME: u8 = 0x04;
pub const PULSE2_SWEEP: u8 = 0x05;
pub const PULSE2_TIMER_LOW: u8 = 0x06;
pub const PULSE2_TIMER_HIGH: u8 = 0x07;

/// Triangle registers
pub const TRIANGLE_LINEAR: u8 = 0x08;
pub const TRIANGLE_TIMER_LOW: u8 = 0x0A;
pub const TRIANGLE_TIMER_HIGH: u8 = 0x0B;

/// Noise registers
pub const NOISE_VOLUME: u8 = 0x0C;
pub const NOISE_PERIOD: u8 = 0x0E;
pub const NOISE_LENGTH: u8 = 0x0F;

/// DMC registers
pub const DMC_FREQ: u8 = 0x10;
pub const DMC_RAW: u8 = 0x11;
pub const DMC_ADDRESS: u8 = 0x12;
pub const DMC_LENGTH: u8 = 0x13;

/// Status / channel enable register
pub const STATUS: u8 = 0x15;

/// Frame counter control register
pub const FRAME_COUNTER_CTRL: u8 = 0x17;

/// Number of bytes in the register file
pub const REGISTER_COUNT: usize = 0x18;

/// The 2A03 APU
///
/// Owns the five channels, the frame counter, the register buffer and
/// the output filter chain. Drive it with [`Apu::clock`] exactly once
/// per APU cycle.
pub struct Apu {
    /// Register buffer; holds the last byte written to each register
    regs: [u8; REGISTER_COUNT],

    pub(crate) pulse1: PulseChannel,
    pub(crate) pulse2: PulseChannel,
    pub(crate) triangle: TriangleChannel,
    pub(crate) noise: NoiseChannel,
    pub(crate) dmc: DmcChannel,

    pub(crate) frame_counter: FrameCounter,

    mixer: Mixer,
    high_pass: HighPassFilter,
    low_pass: FirDecimator,

    /// Output sample rate in Hz
    sample_rate: u32,

    /// Shared program memory image (DMC sample fetches)
    memory: Arc<ProgramMemory>,
}

impl Apu {
    /// Create an APU reading DMC samples from `memory` and producing
    /// samples at `sample_rate` Hz
    ///
    /// Power-on state is established by writing zero through registers
    /// $00-$13 so that every write side-effect fires.
    pub fn new(memory: Arc<ProgramMemory>, sample_rate: u32) -> Self {
        let mut apu = Self {
            regs: [0; REGISTER_COUNT],
            pulse1: PulseChannel::new(true),
            pulse2: PulseChannel::new(false),
            triangle: TriangleChannel::new(),
            noise: NoiseChannel::new(),
            dmc: DmcChannel::new(Arc::clone(&memory)),
            frame_counter: FrameCounter::new(),
            mixer: Mixer::new(),
            high_pass: HighPassFilter::new(),
            low_pass: FirDecimator::new(sample_rate),
            sample_rate,
            memory,
        };

        for reg in 0x00..=0x13 {
            apu.write_register(reg, 0);
        }

        apu
    }

    /// Reset the APU to its power-on state
    pub fn reset(&mut self) {
        *self = Self::new(Arc::clone(&self.memory), self.sample_rate);
    }

    /// Get the output sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Set the master volume (0.0 - 1.0)
    pub fn set_volume(&mut self, volume: f32) {
        self.mixer.set_volume(volume);
    }

    /// Advance the APU by exactly one APU cycle
    ///
    /// `sample_out` is written only when the return value is true;
    /// `irq_out` is always written with the OR of the frame and DMC IRQ
    /// lines.
    pub fn clock(&mut self, sample_out: &mut f32, irq_out: &mut u32) -> bool {
        // Frame sequencer first; register writes from the previous
        // cycle are already in effect
        match self.frame_counter.clock() {
            Some(FrameEvent::QuarterFrame) => self.clock_quarter_frame(),
            Some(FrameEvent::HalfFrame) => self.clock_half_frame(),
            None => {}
        }

        // Pulse timers tick on odd cycles only
        if self.frame_counter.cycle() & 1 == 1 {
            self.pulse1.clock_timer();
            self.pulse2.clock_timer();
        }

        self.triangle.clock_timer();
        self.noise.clock_timer();
        self.dmc.clock_timer();

        let dac = self.mixer.mix(
            self.pulse1.output(),
            self.pulse2.output(),
            self.triangle.output(),
            self.noise.output(),
            self.dmc.output(),
        );

        let filtered = self.high_pass.process(dac);

        *irq_out = self.frame_counter.irq_flag() as u32 | self.dmc.irq_pending() as u32;

        match self.low_pass.push(-filtered) {
            Some(sample) => {
                *sample_out = sample;
                true
            }
            None => false,
        }
    }

    /// Write to an APU register and apply its side effects
    ///
    /// Out-of-range indices are ignored.
    pub fn write_register(&mut self, reg: u8, value: u8) {
        if reg as usize >= REGISTER_COUNT {
            return;
        }
        self.regs[reg as usize] = value;

        match reg {
            PULSE1_VOLUME => self.pulse1.write_register_0(value),
            PULSE1_SWEEP => self.pulse1.write_register_1(value),
            PULSE1_TIMER_LOW => {
                let period = self.timer_period(0);
                self.pulse1.set_period(period);
            }
            PULSE1_TIMER_HIGH => {
                let period = self.timer_period(0);
                let enabled = self.regs[STATUS as usize] & 0x01 != 0;
                self.pulse1.set_period(period);
                self.pulse1.write_register_3(value, enabled);
            }

            PULSE2_VOLUME => self.pulse2.write_register_0(value),
            PULSE2_SWEEP => self.pulse2.write_register_1(value),
            PULSE2_TIMER_LOW => {
                let period = self.timer_period(1);
                self.pulse2.set_period(period);
            }
            PULSE2_TIMER_HIGH => {
                let period = self.timer_period(1);
                let enabled = self.regs[STATUS as usize] & 0x02 != 0;
                self.pulse2.set_period(period);
                self.pulse2.write_register_3(value, enabled);
            }

            TRIANGLE_LINEAR => self.triangle.write_register_0(value),
            TRIANGLE_TIMER_LOW => {
                let period = self.timer_period(2);
                self.triangle.set_period(period);
            }
            TRIANGLE_TIMER_HIGH => {
                let period = self.timer_period(2);
                let enabled = self.regs[STATUS as usize] & 0x04 != 0;
                self.triangle.set_period(period);
                self.triangle.write_register_3(value, enabled);
            }

            NOISE_VOLUME => self.noise.write_register_0(value),
            NOISE_PERIOD => self.noise.write_register_2(value),
            NOISE_LENGTH => {
                let enabled = self.regs[STATUS as usize] & 0x08 != 0;
                self.noise.write_register_3(value, enabled);
            }

            DMC_FREQ => self.dmc.write_register_0(value),
            DMC_RAW => self.dmc.write_register_1(value),
            DMC_ADDRESS => self.dmc.write_register_2(value),
            DMC_LENGTH => self.dmc.write_register_3(value),

            STATUS => {
                self.pulse1.set_enabled(value & 0x01 != 0);
                self.pulse2.set_enabled(value & 0x02 != 0);
                self.triangle.set_enabled(value & 0x04 != 0);
                self.noise.set_enabled(value & 0x08 != 0);
                self.dmc.set_enabled(value & 0x10 != 0);
                self.dmc.clear_irq();
            }

            FRAME_COUNTER_CTRL => self.frame_counter.write_control(value),

            _ => {}
        }
    }

    /// Read an APU register
    ///
    /// Only the status register returns live state; everything else is
    /// write-only and reads as 0. Reading the status register clears
    /// the frame IRQ flag, except on the exact cycle the flag was
    /// raised.
    pub fn read_register(&mut self, reg: u8) -> u8 {
        if reg != STATUS {
            return 0;
        }

        let mut status = 0u8;
        if self.pulse1.is_active() {
            status |= 0x01;
        }
        if self.pulse2.is_active() {
            status |= 0x02;
        }
        if self.triangle.is_active() {
            status |= 0x04;
        }
        if self.noise.is_active() {
            status |= 0x08;
        }
        if self.dmc.is_active() {
            status |= 0x10;
        }
        if self.frame_counter.irq_flag() {
            status |= 0x40;
        }
        if self.dmc.irq_pending() {
            status |= 0x80;
        }

        if !self.frame_counter.irq_set_now() {
            self.frame_counter.clear_irq();
        }

        status
    }

    /// Read the last byte written to a register
    pub fn read_internal(&self, reg: u8) -> u8 {
        self.regs.get(reg as usize).copied().unwrap_or(0)
    }

    /// Clock envelopes and the linear counter (quarter frame)
    fn clock_quarter_frame(&mut self) {
        self.pulse1.clock_envelope();
        self.pulse2.clock_envelope();
        self.noise.clock_envelope();
        self.triangle.clock_linear_counter();
    }

    /// Quarter-frame work plus length counters and sweeps (half frame)
    fn clock_half_frame(&mut self) {
        self.clock_quarter_frame();

        self.pulse1.clock_length_counter();
        self.pulse2.clock_length_counter();
        self.triangle.clock_length_counter();
        self.noise.clock_length_counter();

        self.pulse1.clock_sweep();
        self.pulse2.clock_sweep();
    }

    /// Assemble the 11-bit timer period of channel `chan` from its
    /// register pair
    fn timer_period(&self, chan: usize) -> u16 {
        let low = self.regs[chan * 4 + 2] as u16;
        let high = self.regs[chan * 4 + 3] as u16;
        ((high << 8) | low) & 0x07FF
    }
}
