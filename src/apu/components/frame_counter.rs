//! Frame counter for the APU
//!
//! The frame counter divides the APU clock into the quarter- and
//! half-frame beats that drive envelopes, linear counters, length
//! counters and sweep units.
//!
//! It operates in two modes:
//! - 4-step mode: raises the frame IRQ and repeats every 29 829 cycles
//! - 5-step mode: no IRQ, repeats every 32 781 cycles

/// Events the frame counter can emit on a clock
///
/// A half frame implies the quarter-frame work as well: the caller
/// clocks envelopes and linear counters for both events and adds length
/// counters and sweeps for half frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameEvent {
    /// Quarter frame - clock envelopes and linear counters
    QuarterFrame,
    /// Half frame - additionally clock length counters and sweep units
    HalfFrame,
}

/// Frame counter sequencer mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameMode {
    /// 4-step mode (default)
    FourStep,
    /// 5-step mode
    FiveStep,
}

/// Frame counter state
#[derive(Debug, Clone)]
pub struct FrameCounter {
    /// Current mode (4-step or 5-step)
    mode: FrameMode,
    /// APU cycle counter within the current sequence
    cycle: u32,
    /// IRQ inhibit flag (bit 6 of the frame counter register)
    irq_inhibit: bool,
    /// Frame interrupt flag
    irq_flag: bool,
    /// True only on the exact cycle the IRQ flag was raised; a status
    /// read on that cycle must not clear the flag
    irq_set_now: bool,
    /// Cycles left until a register write resets the sequence (0 = idle)
    restart_delay: u8,
}

impl FrameCounter {
    /// Create a new frame counter in 4-step mode
    pub fn new() -> Self {
        Self {
            mode: FrameMode::FourStep,
            cycle: 0,
            irq_inhibit: false,
            irq_flag: false,
            irq_set_now: false,
            restart_delay: 0,
        }
    }

    /// Write to the frame counter control register
    ///
    /// Bit 7 selects the mode, bit 6 inhibits the frame IRQ. The
    /// sequence restarts 3 cycles later when the write lands on an odd
    /// cycle, 4 cycles later on an even one; in 5-step mode the restart
    /// fires an immediate half-frame clock.
    pub fn write_control(&mut self, value: u8) {
        self.restart_delay = if self.cycle & 1 == 1 { 3 } else { 4 };

        self.mode = if (value & 0x80) != 0 {
            FrameMode::FiveStep
        } else {
            FrameMode::FourStep
        };
        self.irq_inhibit = (value & 0x40) != 0;

        if self.irq_inhibit {
            self.irq_flag = false;
        }
    }

    /// Advance the frame counter by one APU cycle
    pub fn clock(&mut self) -> Option<FrameEvent> {
        self.irq_set_now = false;
        self.cycle += 1;

        if self.restart_delay > 0 {
            self.restart_delay -= 1;
            if self.restart_delay == 0 {
                self.cycle = 0;
                if self.mode == FrameMode::FiveStep {
                    return Some(FrameEvent::HalfFrame);
                }
                return None;
            }
        }

        match self.mode {
            FrameMode::FourStep => match self.cycle {
                7_457 | 22_371 => Some(FrameEvent::QuarterFrame),
                14_913 => Some(FrameEvent::HalfFrame),
                29_828 => {
                    if !self.irq_inhibit {
                        self.irq_flag = true;
                        self.irq_set_now = true;
                    }
                    None
                }
                29_829 => {
                    self.cycle = 0;
                    Some(FrameEvent::HalfFrame)
                }
                _ => None,
            },
            FrameMode::FiveStep => match self.cycle {
                7_457 | 22_371 => Some(FrameEvent::QuarterFrame),
                14_913 => Some(FrameEvent::HalfFrame),
                32_781 => {
                    self.cycle = 0;
                    Some(FrameEvent::HalfFrame)
                }
                _ => None,
            },
        }
    }

    /// Check if the frame IRQ flag is raised
    pub fn irq_flag(&self) -> bool {
        self.irq_flag
    }

    /// True when the IRQ flag was raised on the current cycle
    pub fn irq_set_now(&self) -> bool {
        self.irq_set_now
    }

    /// Clear the IRQ flag (status register read)
    pub fn clear_irq(&mut self) {
        self.irq_flag = false;
    }

    /// Get the current mode
    pub fn mode(&self) -> FrameMode {
        self.mode
    }

    /// Get the current cycle count; the APU clocks the pulse timers on
    /// odd cycles
    pub fn cycle(&self) -> u32 {
        self.cycle
    }

    /// Check if the frame IRQ is inhibited
    pub fn irq_inhibited(&self) -> bool {
        self.irq_inhibit
    }
}

impl Default for FrameCounter {
    fn default() -> Self {
        Self::new()
    }
}
