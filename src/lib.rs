// PPMCK player library
// 2A03 APU emulation and the PPMCK sound driver that feeds it

// Public modules
pub mod apu;
#[cfg(feature = "audio")]
pub mod audio;
pub mod driver;
pub mod memory;
pub mod player;
pub mod wav;

// Re-export main types for convenience
pub use apu::Apu;
#[cfg(feature = "audio")]
pub use audio::{AudioOutput, SampleQueue};
pub use driver::SoundDriver;
pub use memory::{ProgramMemory, RomError};
pub use player::{Player, PlayerConfig, FRAME_CYCLES};
pub use wav::WavRecorder;
