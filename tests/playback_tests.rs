// Full-pipeline playback tests
//
// Assemble a small song image, run it through the driver and APU via
// the player, and check the rendered audio end to end.

mod common;

use common::SongBuilder;
use ppmck_rs::{Player, WavRecorder};

/// Root-mean-square level of a sample block
fn rms(samples: &[f32]) -> f32 {
    let sum: f32 = samples.iter().map(|s| s * s).sum();
    (sum / samples.len() as f32).sqrt()
}

/// A one-voice song holding a single long note
fn single_note_song() -> SongBuilder {
    let mut builder = SongBuilder::new();
    // Volume 15, duty 2, octave-3 note held, then a long rest loop
    builder.put(0x9000, &[0xFD, 0x8F, 0xFE, 0x82, 0x30, 0xFF, 0xF4, 0xFF]);
    builder.track(0, 0x9000);
    builder
}

#[test]
fn test_single_note_renders_audible_tone() {
    let mut player = Player::new(single_note_song().build(), 48_000);

    // Skip the start-up transient, then measure one second
    let mut frame = vec![0.0f32; 800];
    for _ in 0..30 {
        player.fill(&mut frame);
    }

    let mut second = vec![0.0f32; 48_000];
    player.fill(&mut second);

    assert!(second.iter().all(|s| s.is_finite()));
    assert!(second.iter().all(|s| s.abs() <= 1.0));
    assert!(rms(&second) > 0.01, "rendered tone is silent");
}

#[test]
fn test_rest_goes_quiet() {
    let mut builder = SongBuilder::new();
    // Four frames of note, then a rest held effectively forever
    builder.put(0x9000, &[0xFD, 0x8F, 0x30, 0x04, 0xFC, 0xFF, 0xF4, 0xFF]);
    builder.track(0, 0x9000);

    let mut player = Player::new(builder.build(), 48_000);

    let mut frame = vec![0.0f32; 800];
    // Render two seconds to get deep into the rest
    for _ in 0..120 {
        player.fill(&mut frame);
    }

    let mut tail = vec![0.0f32; 4_800];
    player.fill(&mut tail);
    assert!(rms(&tail) < 1e-4, "rest still audible: rms {}", rms(&tail));
}

#[test]
fn test_two_voices_beat_against_each_other() {
    let mut builder = SongBuilder::new();
    builder.put(0x9000, &[0xFD, 0x8F, 0x30, 0xFF, 0xF4, 0xFF]);
    builder.put(0x9100, &[0xFD, 0x8F, 0x31, 0xFF, 0xF4, 0xFF]);
    builder.track(0, 0x9000);
    builder.track(1, 0x9100);

    let mut player = Player::new(builder.build(), 48_000);

    let mut frame = vec![0.0f32; 800];
    for _ in 0..30 {
        player.fill(&mut frame);
    }

    let mut second = vec![0.0f32; 48_000];
    player.fill(&mut second);
    // Two detuned pulses carry more energy than one
    assert!(rms(&second) > 0.02);
}

#[test]
fn test_recorded_playback_reads_back() {
    let mut player = Player::new(single_note_song().build(), 48_000);

    let path = std::env::temp_dir().join("ppmck_rs_playback_test.wav");
    let mut recorder = WavRecorder::create(&path, 48_000).unwrap();

    let mut frame = vec![0.0f32; 800];
    for _ in 0..60 {
        player.fill(&mut frame);
        recorder.write_samples(&frame).unwrap();
    }
    recorder.finalize().unwrap();

    let mut reader = hound::WavReader::open(&path).unwrap();
    assert_eq!(reader.spec().channels, 1);
    assert_eq!(reader.spec().sample_rate, 48_000);
    assert_eq!(reader.duration(), 48_000);

    let samples: Vec<f32> = reader.samples::<f32>().map(|s| s.unwrap()).collect();
    assert_eq!(samples.len(), 48_000);
    assert!(rms(&samples[24_000..]) > 0.01);

    let _ = std::fs::remove_file(&path);
}
