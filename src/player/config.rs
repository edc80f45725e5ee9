// Configuration management
//
// Player settings persisted as TOML next to the binary.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;

/// Default configuration file path
const CONFIG_FILE: &str = "player_config.toml";

/// Player configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Audio settings
    pub audio: AudioSettings,

    /// Recording settings
    pub output: OutputSettings,
}

/// Audio settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioSettings {
    /// Output sample rate in Hz (44100 or 48000)
    pub sample_rate: u32,

    /// Master volume (0.0 - 1.0)
    pub volume: f32,

    /// Playback buffer duration in milliseconds (affects latency)
    pub buffer_duration_ms: u32,
}

/// WAVE recording settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    /// Record playback to a WAVE file
    pub record_wav: bool,

    /// Directory WAVE files are written into
    pub wav_directory: PathBuf,

    /// Include a timestamp in the file name
    pub include_timestamp: bool,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        PlayerConfig {
            audio: AudioSettings {
                sample_rate: 48_000,
                volume: 1.0,
                buffer_duration_ms: 50,
            },
            output: OutputSettings {
                record_wav: true,
                wav_directory: PathBuf::from("."),
                include_timestamp: false,
            },
        }
    }
}

impl PlayerConfig {
    /// Load configuration from file or create the default
    ///
    /// A missing or unreadable file yields the default configuration,
    /// which is saved back so the user has something to edit.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|_| {
            let config = Self::default();
            // Try to save the default config, but don't fail if we can't
            let _ = config.save();
            config
        })
    }

    /// Load configuration from file
    pub fn load() -> Result<Self, io::Error> {
        let contents = fs::read_to_string(CONFIG_FILE)?;
        toml::from_str(&contents).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<(), io::Error> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(CONFIG_FILE, contents)
    }

    /// Path of the WAVE file the next recording should write
    pub fn wav_path(&self) -> PathBuf {
        let filename = if self.output.include_timestamp {
            let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
            format!("audio_{}.wav", timestamp)
        } else {
            String::from("audio_out.wav")
        };

        self.output.wav_directory.join(filename)
    }
}
