//! APU behavior tests
//!
//! Component-level tests live next to their components; these suites
//! exercise the assembled APU through its register and clock interface.

mod init_tests;

use std::sync::Arc;

use super::Apu;
use crate::memory::ProgramMemory;

/// APU over an empty program image at 48 kHz
fn new_apu() -> Apu {
    Apu::new(Arc::new(ProgramMemory::new()), 48_000)
}

/// Clock the APU `cycles` times, collecting produced samples and the
/// final state of the IRQ line
fn run_cycles(apu: &mut Apu, cycles: u32) -> (Vec<f32>, u32) {
    let mut samples = Vec::new();
    let mut sample = 0.0f32;
    let mut irq = 0u32;

    for _ in 0..cycles {
        if apu.clock(&mut sample, &mut irq) {
            samples.push(sample);
        }
    }

    (samples, irq)
}
