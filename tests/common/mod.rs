//! Shared helpers for integration tests

use std::sync::Arc;

use ppmck_rs::driver::tables::TRACK_TABLE;
use ppmck_rs::memory::{ProgramMemory, PRG_SIZE};

/// Address of the idle program every unused voice points at
pub const IDLE: u16 = 0x8FF0;

/// Builder assembling a minimal song image
pub struct SongBuilder {
    image: Vec<u8>,
}

impl SongBuilder {
    pub fn new() -> Self {
        let mut builder = Self {
            image: vec![0u8; PRG_SIZE],
        };

        // A long rest keeps unused voices quiet
        builder.put(IDLE, &[0xFC, 0xFF]);
        for voice in 0..5 {
            builder.track(voice, IDLE);
        }
        builder
    }

    pub fn put(&mut self, addr: u16, bytes: &[u8]) {
        let start = addr as usize - 0x8000;
        self.image[start..start + bytes.len()].copy_from_slice(bytes);
    }

    pub fn put_word(&mut self, addr: u16, word: u16) {
        self.put(addr, &[(word & 0xFF) as u8, (word >> 8) as u8]);
    }

    pub fn track(&mut self, voice: usize, addr: u16) {
        self.put_word(TRACK_TABLE + ((voice as u16) << 1), addr);
    }

    pub fn build(self) -> Arc<ProgramMemory> {
        Arc::new(ProgramMemory::from_image(&self.image).unwrap())
    }
}
