// Sound driver module - PPMCK byte-code interpreter
//
// Five per-voice tracks (pulse 1/2, triangle, noise, DPCM) walk their
// command streams out of the song image once per video frame and feed
// the decoded state into the APU's register interface.

pub mod tables;
pub mod track;


use std::sync::Arc;

use crate::apu::{Apu, PULSE1_SWEEP, PULSE2_SWEEP, STATUS};
use crate::memory::ProgramMemory;
use tables::{TRACK_COUNT, TRACK_TABLE};
use track::{Track, REST_KEY_ON};

/// The PPMCK sound driver
///
/// Call [`SoundDriver::start`] once after loading a song image, then
/// [`SoundDriver::tick`] once per video frame (every 29 781 APU
/// cycles).
pub struct SoundDriver {
    tracks: [Track; TRACK_COUNT],
    memory: Arc<ProgramMemory>,
}

impl SoundDriver {
    /// Create a driver reading its command streams from `memory`
    pub fn new(memory: Arc<ProgramMemory>) -> Self {
        Self {
            tracks: Default::default(),
            memory,
        }
    }

    /// Reset the driver and key up the song
    ///
    /// Enables the four tone channels, silences both sweep units and
    /// points every voice at its start address from the track table.
    pub fn start(&mut self, apu: &mut Apu) {
        apu.write_register(STATUS, 0x0F);
        apu.write_register(PULSE1_SWEEP, 0x08);
        apu.write_register(PULSE2_SWEEP, 0x08);

        for (voice, track) in self.tracks.iter_mut().enumerate() {
            *track = Track::default();
            track.data_ptr = self.memory.read_word(TRACK_TABLE + ((voice as u16) << 1));
            track.wait_counter = 1;
        }
    }

    /// Advance all five voices by one video frame
    pub fn tick(&mut self, apu: &mut Apu) {
        for voice in 0..4 {
            self.tick_voice(voice, apu);
        }
        self.tick_dpcm(apu);
    }

    /// Advance one tone voice: run effects while the note is held,
    /// read new commands when the wait runs out, and flush the key-on
    /// registers afterwards
    fn tick_voice(&mut self, voice: usize, apu: &mut Apu) {
        let track = &mut self.tracks[voice];

        track.wait_counter = track.wait_counter.wrapping_sub(1);
        if track.wait_counter > 0 {
            track.apply_effects(voice, apu, self.memory.as_ref());
            return;
        }

        track.read_data(voice, apu, self.memory.as_ref());
        track.apply_effects(voice, apu, self.memory.as_ref());

        if track.rest_flags & REST_KEY_ON != 0 {
            let base = (voice as u8) << 2;
            apu.write_register(base, track.register_low | track.register_high);
            apu.write_register(base + 2, (track.freq & 0xFF) as u8);
            apu.write_register(base + 3, (track.freq >> 8) as u8);
            track.rest_flags &= !REST_KEY_ON;
        }
    }

    /// Advance the DPCM voice
    fn tick_dpcm(&mut self, apu: &mut Apu) {
        let track = &mut self.tracks[4];

        track.wait_counter = track.wait_counter.wrapping_sub(1);
        if track.wait_counter > 0 {
            return;
        }

        track.read_dpcm_data(apu, self.memory.as_ref());
    }
}
