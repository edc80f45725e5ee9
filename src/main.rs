// PPMCK player - main entry point
//
// Loads a 32 KiB PPMCK song image, keys up the sound driver and either
// plays through the sound card or renders a fixed duration offline.
// Both modes record the rendered samples to a WAVE file when the
// configuration asks for it.

use std::env;
use std::error::Error;
use std::process;
use std::sync::Arc;

use ppmck_rs::{Player, PlayerConfig, ProgramMemory, WavRecorder};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let mut args = env::args().skip(1);
    let song_path = match args.next() {
        Some(path) => path,
        None => {
            eprintln!("usage: ppmck-rs <song.bin> [seconds]");
            process::exit(2);
        }
    };
    let seconds = args.next().map(|s| s.parse::<u64>()).transpose()?;

    let config = PlayerConfig::load_or_default();
    let sample_rate = config.audio.sample_rate;

    println!("PPMCK player (ppmck-rs) v0.1.0");
    println!("==============================");
    println!();
    println!("Song image: {}", song_path);

    let memory = Arc::new(ProgramMemory::load(&song_path)?);
    let mut player = Player::new(memory, sample_rate);
    player.set_volume(config.audio.volume);

    let mut recorder = if config.output.record_wav {
        let path = config.wav_path();
        println!("Recording to: {}", path.display());
        Some(WavRecorder::create(path, sample_rate)?)
    } else {
        None
    };

    // One video frame of samples per block
    let mut frame = vec![0.0f32; (sample_rate / 60) as usize];

    match seconds {
        Some(seconds) => render_offline(&mut player, recorder.as_mut(), seconds, &mut frame)?,
        None => play_realtime(&mut player, recorder.as_mut(), &config, &mut frame)?,
    }

    if let Some(recorder) = recorder {
        let path = recorder.path().to_path_buf();
        recorder.finalize()?;
        println!("Wrote {}", path.display());
    }

    Ok(())
}

/// Render `seconds` of audio as fast as possible
fn render_offline(
    player: &mut Player,
    mut recorder: Option<&mut WavRecorder>,
    seconds: u64,
    frame: &mut [f32],
) -> Result<(), Box<dyn Error>> {
    println!("Rendering {} seconds offline...", seconds);
    if recorder.is_none() {
        println!("Recording is disabled; rendered samples will be discarded.");
    }

    for _ in 0..seconds * 60 {
        player.fill(frame);
        if let Some(recorder) = recorder.as_deref_mut() {
            recorder.write_samples(frame)?;
        }
    }

    Ok(())
}

/// Play through the sound card until the process is interrupted
#[cfg(feature = "audio")]
fn play_realtime(
    player: &mut Player,
    mut recorder: Option<&mut WavRecorder>,
    config: &PlayerConfig,
    frame: &mut [f32],
) -> Result<(), Box<dyn Error>> {
    use ppmck_rs::AudioOutput;
    use std::thread;
    use std::time::Duration;

    let output = AudioOutput::new(config.audio.sample_rate, config.audio.buffer_duration_ms)?;

    println!("Playing... press Ctrl+C to stop.");

    loop {
        // Top the queue up one frame at a time, recording the same
        // block, then back off so the render loop doesn't spin a core
        if output.queued_samples() <= frame.len() {
            player.fill(frame);
            output.queue_samples(frame);

            if let Some(recorder) = recorder.as_deref_mut() {
                recorder.write_samples(frame)?;
                // Playback only ends with the process, so keep the
                // size fields on disk valid after every block
                recorder.flush()?;
            }
        }

        thread::sleep(Duration::from_millis(10));
    }
}

#[cfg(not(feature = "audio"))]
fn play_realtime(
    _player: &mut Player,
    _recorder: Option<&mut WavRecorder>,
    _config: &PlayerConfig,
    _frame: &mut [f32],
) -> Result<(), Box<dyn Error>> {
    Err("built without audio output; pass a duration to render offline".into())
}
