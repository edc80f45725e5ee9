// WAVE recording - 32-bit float mono via hound
//
// The container carries a 16-byte fmt subchunk with format code 3
// (IEEE float); hound patches the RIFF size fields when the writer is
// finalized.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavSpec, WavWriter};

/// Streaming WAVE recorder for rendered samples
pub struct WavRecorder {
    writer: WavWriter<BufWriter<File>>,
    path: PathBuf,
}

impl WavRecorder {
    /// Create a mono float-32 WAVE file at `path`
    pub fn create<P: AsRef<Path>>(path: P, sample_rate: u32) -> Result<Self, hound::Error> {
        let spec = WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };

        Ok(Self {
            writer: WavWriter::create(&path, spec)?,
            path: path.as_ref().to_path_buf(),
        })
    }

    /// Append a block of samples
    pub fn write_samples(&mut self, samples: &[f32]) -> Result<(), hound::Error> {
        for &sample in samples {
            self.writer.write_sample(sample)?;
        }
        Ok(())
    }

    /// Number of samples written so far
    pub fn len(&self) -> u32 {
        self.writer.len()
    }

    /// Check whether nothing has been written yet
    pub fn is_empty(&self) -> bool {
        self.writer.len() == 0
    }

    /// Path of the file being written
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rewrite the size fields and push buffered samples to disk,
    /// keeping the file valid while the writer stays open
    pub fn flush(&mut self) -> Result<(), hound::Error> {
        self.writer.flush()
    }

    /// Patch the size fields and close the file
    pub fn finalize(self) -> Result<(), hound::Error> {
        self.writer.finalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorded_file_reads_back() {
        let dir = std::env::temp_dir();
        let path = dir.join("ppmck_rs_wav_test.wav");

        let samples: Vec<f32> = (0..480).map(|i| (i as f32 / 480.0) - 0.5).collect();

        let mut recorder = WavRecorder::create(&path, 48_000).unwrap();
        recorder.write_samples(&samples).unwrap();
        assert_eq!(recorder.len(), 480);
        recorder.finalize().unwrap();

        let mut reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 48_000);
        assert_eq!(spec.sample_format, SampleFormat::Float);
        assert_eq!(spec.bits_per_sample, 32);

        let read_back: Vec<f32> = reader.samples::<f32>().map(|s| s.unwrap()).collect();
        assert_eq!(read_back, samples);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_flushed_file_is_readable_before_finalize() {
        let dir = std::env::temp_dir();
        let path = dir.join("ppmck_rs_wav_flush_test.wav");

        let mut recorder = WavRecorder::create(&path, 48_000).unwrap();
        recorder.write_samples(&[0.25; 100]).unwrap();
        recorder.flush().unwrap();

        // The header was patched on flush; the file reads back while
        // the writer is still open
        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.duration(), 100);
        drop(reader);

        recorder.finalize().unwrap();
        let _ = std::fs::remove_file(&path);
    }
}
