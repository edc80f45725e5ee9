//! DMC (Delta Modulation Channel) implementation for sample playback

use std::sync::Arc;

use crate::apu::components::Timer;
use crate::apu::constants::DMC_RATE_TABLE;
use crate::memory::ProgramMemory;

/// DMC channel playing 1-bit delta samples out of program memory
///
/// Two layers run off one timer: the output unit walks the bit buffer
/// adding or subtracting 2 from the 7-bit level, and the byte reload
/// refills the buffer from program memory whenever the bits run out.
#[derive(Debug, Clone)]
pub struct DmcChannel {
    /// IRQ enable flag (register bit 7)
    pub(crate) irq_enabled: bool,
    /// Loop flag (register bit 6)
    pub(crate) loop_flag: bool,
    /// Output timer; the stored period is the rate table entry minus one
    pub(crate) timer: Timer,
    /// Starting sample address ($C000 + register * 64)
    pub(crate) sample_address: u16,
    /// Starting sample length (register * 16 + 1 bytes)
    pub(crate) sample_length: u16,
    /// Current read address
    pub(crate) current_address: u16,
    /// Bytes remaining in the current sample
    pub(crate) bytes_remaining: u16,
    /// Bit shift buffer
    bit_buffer: u8,
    /// Bits remaining in the shift buffer
    bits_remaining: u8,
    /// Output level (7 bits, 0-127)
    pub(crate) output_level: u8,
    /// Silence flag; set when the sample runs dry
    silence: bool,
    /// Sticky IRQ flag
    pub(crate) irq_flag: bool,
    /// Shared program memory image for sample fetches
    memory: Arc<ProgramMemory>,
}

impl DmcChannel {
    /// Create a new DMC channel reading samples from `memory`
    pub fn new(memory: Arc<ProgramMemory>) -> Self {
        Self {
            irq_enabled: false,
            loop_flag: false,
            timer: Timer::new(),
            sample_address: 0,
            sample_length: 0,
            current_address: 0xC000,
            bytes_remaining: 0,
            bit_buffer: 0,
            bits_remaining: 0,
            output_level: 0,
            silence: false,
            irq_flag: false,
            memory,
        }
    }

    /// Write to register 0 (IRQ enable, loop flag and rate)
    pub fn write_register_0(&mut self, data: u8) {
        self.irq_enabled = (data & 0x80) != 0;
        self.loop_flag = (data & 0x40) != 0;

        if !self.irq_enabled {
            self.irq_flag = false;
        }

        self.timer
            .set_period_direct(DMC_RATE_TABLE[(data & 0x0F) as usize] - 1);
    }

    /// Write to register 1 (direct output level load, 7 bits)
    pub fn write_register_1(&mut self, data: u8) {
        self.output_level = data & 0x7F;
    }

    /// Write to register 2 (sample address = $C000 + value * 64)
    pub fn write_register_2(&mut self, data: u8) {
        self.sample_address = 0xC000 + ((data as u16) << 6);
    }

    /// Write to register 3 (sample length = value * 16 + 1)
    pub fn write_register_3(&mut self, data: u8) {
        self.sample_length = ((data as u16) << 4) + 1;
    }

    /// Enable or disable the channel (status register)
    ///
    /// Enabling restarts the sample only when no bytes are pending;
    /// disabling drops the remaining byte count to zero.
    pub fn set_enabled(&mut self, enabled: bool) {
        if !enabled {
            self.bytes_remaining = 0;
        } else if self.bytes_remaining == 0 {
            self.bytes_remaining = self.sample_length;
            self.current_address = self.sample_address;
        }
    }

    /// Check whether sample bytes are pending (status register read)
    pub fn is_active(&self) -> bool {
        self.bytes_remaining > 0
    }

    /// Check if the DMC IRQ is raised
    pub fn irq_pending(&self) -> bool {
        self.irq_flag
    }

    /// Clear the IRQ flag (status register write)
    pub fn clear_irq(&mut self) {
        self.irq_flag = false;
    }

    /// Clock the output timer
    pub fn clock_timer(&mut self) {
        if !self.timer.clock_held() {
            return;
        }

        // Output unit: walk one delta bit unless silenced
        if !self.silence {
            if self.bit_buffer & 0x01 != 0 {
                if self.output_level <= 125 {
                    self.output_level += 2;
                }
            } else if self.output_level >= 2 {
                self.output_level -= 2;
            }

            self.bit_buffer >>= 1;
        }

        // Byte reload: refill the shift buffer when the bits run out
        if self.bits_remaining == 0 {
            self.bits_remaining = 7;

            if self.bytes_remaining != 0 {
                self.silence = false;
                self.bit_buffer = self.memory.read(self.current_address);

                self.current_address = self.current_address.wrapping_add(1);
                if self.current_address == 0x0000 {
                    self.current_address = 0x8000;
                }

                self.bytes_remaining -= 1;

                if self.bytes_remaining == 0 && !self.loop_flag && self.irq_enabled {
                    self.irq_flag = true;
                }
            } else if self.loop_flag {
                self.silence = false;
                self.bytes_remaining = self.sample_length;
                self.current_address = self.sample_address;
            } else {
                self.silence = true;
            }
        } else {
            self.bits_remaining -= 1;
        }
    }

    /// Get the current output level (0-127)
    pub fn output(&self) -> u8 {
        self.output_level
    }
}
