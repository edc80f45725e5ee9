//! Non-linear channel mixer
//!
//! The DAC combines the five channel levels in two groups with the
//! curves published at <https://www.nesdev.org/wiki/APU_Mixer>:
//!
//! ```text
//! pulse_out = 95.88 / (8128 / (pulse1 + pulse2) + 100)
//! tnd_out   = 159.79 / (1 / (triangle/8227 + noise/12241 + dmc/22638) + 100)
//! ```
//!
//! The default build evaluates the closed forms directly; the
//! `mixer-lut` feature replaces them with the two precomputed lookup
//! tables (31 pulse entries, 203 tnd entries).

/// APU mixer combining the raw channel levels into one DAC value
pub struct Mixer {
    /// Master volume (0.0 = mute, 1.0 = full volume)
    volume: f32,

    #[cfg(feature = "mixer-lut")]
    pulse_table: [f32; 31],

    #[cfg(feature = "mixer-lut")]
    tnd_table: [f32; 203],
}

impl Mixer {
    /// Create a new mixer at full volume
    pub fn new() -> Self {
        Self {
            volume: 1.0,

            #[cfg(feature = "mixer-lut")]
            pulse_table: Self::build_pulse_table(),

            #[cfg(feature = "mixer-lut")]
            tnd_table: Self::build_tnd_table(),
        }
    }

    /// Set the master volume
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    /// Get the current volume
    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Mix the five channel levels into one DAC sample
    ///
    /// Inputs are the raw channel outputs: 0-15 for the pulses,
    /// triangle and noise, 0-127 for the DMC. The result sits in
    /// roughly `[0.0, 2.0]`; the downstream high-pass removes the DC
    /// component.
    pub fn mix(&self, pulse1: u8, pulse2: u8, triangle: u8, noise: u8, dmc: u8) -> f32 {
        (self.pulse_out(pulse1, pulse2) + self.tnd_out(triangle, noise, dmc)) * self.volume
    }

    #[cfg(not(feature = "mixer-lut"))]
    fn pulse_out(&self, pulse1: u8, pulse2: u8) -> f32 {
        let pulse_sum = pulse1 as f32 + pulse2 as f32;

        if pulse_sum == 0.0 {
            return 0.0;
        }

        95.88 / (8128.0 / pulse_sum + 100.0)
    }

    #[cfg(not(feature = "mixer-lut"))]
    fn tnd_out(&self, triangle: u8, noise: u8, dmc: u8) -> f32 {
        let tnd_sum =
            triangle as f32 / 8227.0 + noise as f32 / 12241.0 + dmc as f32 / 22638.0;

        if tnd_sum == 0.0 {
            return 0.0;
        }

        159.79 / (1.0 / tnd_sum + 100.0)
    }

    #[cfg(feature = "mixer-lut")]
    fn pulse_out(&self, pulse1: u8, pulse2: u8) -> f32 {
        self.pulse_table[(pulse1 + pulse2) as usize]
    }

    #[cfg(feature = "mixer-lut")]
    fn tnd_out(&self, triangle: u8, noise: u8, dmc: u8) -> f32 {
        self.tnd_table[3 * triangle as usize + 2 * noise as usize + dmc as usize]
    }

    #[cfg(feature = "mixer-lut")]
    fn build_pulse_table() -> [f32; 31] {
        let mut table = [0.0f32; 31];
        for (i, entry) in table.iter_mut().enumerate().skip(1) {
            *entry = 95.52 / (8128.0 / i as f32 + 100.0);
        }
        table
    }

    #[cfg(feature = "mixer-lut")]
    fn build_tnd_table() -> [f32; 203] {
        let mut table = [0.0f32; 203];
        for (i, entry) in table.iter_mut().enumerate().skip(1) {
            *entry = 163.67 / (24329.0 / i as f32 + 100.0);
        }
        table
    }
}

impl Default for Mixer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silence_mixes_to_zero() {
        let mixer = Mixer::new();
        assert_eq!(mixer.mix(0, 0, 0, 0, 0), 0.0);
    }

    #[test]
    fn test_output_is_finite_everywhere() {
        let mixer = Mixer::new();

        for p1 in 0..=15u8 {
            for p2 in 0..=15u8 {
                for t in 0..=15u8 {
                    for n in [0u8, 7, 15] {
                        for d in [0u8, 64, 127] {
                            let out = mixer.mix(p1, p2, t, n, d);
                            assert!(out.is_finite(), "mix({p1},{p2},{t},{n},{d}) = {out}");
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_mix_is_monotonic_in_pulse_level() {
        let mixer = Mixer::new();

        let mut previous = -1.0f32;
        for level in 0..=15u8 {
            let out = mixer.mix(level, 0, 0, 0, 0);
            assert!(out > previous);
            previous = out;
        }
    }

    #[cfg(not(feature = "mixer-lut"))]
    #[test]
    fn test_pulse_curve_matches_reference_point() {
        let mixer = Mixer::new();

        // 95.88 / (8128 / 16 + 100)
        let expected = 95.88 / (8128.0 / 16.0 + 100.0);
        assert!((mixer.mix(8, 8, 0, 0, 0) - expected).abs() < 1e-6);
    }

    #[cfg(feature = "mixer-lut")]
    #[test]
    fn test_tables_start_at_zero() {
        let mixer = Mixer::new();
        assert_eq!(mixer.pulse_table[0], 0.0);
        assert_eq!(mixer.tnd_table[0], 0.0);
    }

    #[test]
    fn test_volume_scales_output() {
        let mut mixer = Mixer::new();
        let full = mixer.mix(15, 15, 15, 15, 127);

        mixer.set_volume(0.5);
        let half = mixer.mix(15, 15, 15, 15, 127);

        assert!((half - full * 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_volume_clamps() {
        let mut mixer = Mixer::new();
        mixer.set_volume(2.0);
        assert_eq!(mixer.volume(), 1.0);
        mixer.set_volume(-1.0);
        assert_eq!(mixer.volume(), 0.0);
    }
}
