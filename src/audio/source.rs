// WAV source reader built on hound
// Reads PCM WAV containers in fixed-size chunks of interleaved f32 samples
// and supports frame-indexed repositioning. Compressed or malformed files
// fail at open; no transcoding is performed.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec};

use super::AudioError;

pub struct WavSource {
    reader: WavReader<BufReader<File>>,
    spec: WavSpec,
    total_frames: u64,
    position: u64,
}

impl WavSource {
    /// Open a WAV file and capture its header metadata.
    pub fn open(path: &Path) -> Result<Self, AudioError> {
        let reader = WavReader::open(path).map_err(|source| AudioError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let spec = reader.spec();
        let total_frames = reader.duration() as u64;
        Ok(Self {
            reader,
            spec,
            total_frames,
            position: 0,
        })
    }

    pub fn spec(&self) -> WavSpec {
        self.spec
    }

    /// Total frame count declared by the header.
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// Current read offset in frames.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Reposition the read cursor to the given frame, clamped to the end
    /// of the data. Takes effect on the next chunk read.
    pub fn seek(&mut self, frame: u64) -> std::io::Result<()> {
        let frame = frame.min(self.total_frames);
        self.reader.seek(frame as u32)?;
        self.position = frame;
        Ok(())
    }

    /// Read up to `frames` frames as interleaved f32 samples. An empty
    /// vector means end of data. Integer widths are rescaled to [-1, 1]
    /// the same way the output side expects.
    pub fn read_chunk(&mut self, frames: usize) -> Result<Vec<f32>, hound::Error> {
        let want = frames * self.spec.channels as usize;
        let mut chunk = Vec::with_capacity(want);
        match self.spec.sample_format {
            SampleFormat::Float => {
                for sample in self.reader.samples::<f32>().take(want) {
                    chunk.push(sample?);
                }
            }
            SampleFormat::Int => {
                let scale = 1.0 / (1i64 << (self.spec.bits_per_sample - 1)) as f32;
                for sample in self.reader.samples::<i32>().take(want) {
                    chunk.push(sample? as f32 * scale);
                }
            }
        }
        self.position += (chunk.len() / self.spec.channels as usize) as u64;
        Ok(chunk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::testutil::write_test_wav;
    use crate::audio::CHUNK_FRAMES;

    #[test]
    fn open_reports_header_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        write_test_wav(&path, 4500, 22050, 2);

        let source = WavSource::open(&path).unwrap();
        assert_eq!(source.total_frames(), 4500);
        assert_eq!(source.spec().sample_rate, 22050);
        assert_eq!(source.spec().channels, 2);
        assert_eq!(source.position(), 0);
    }

    #[test]
    fn open_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(WavSource::open(&dir.path().join("nope.wav")).is_err());
    }

    #[test]
    fn open_non_wav_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not_audio.wav");
        std::fs::write(&path, b"definitely not a riff container").unwrap();
        assert!(WavSource::open(&path).is_err());
    }

    #[test]
    fn chunked_reads_cover_the_whole_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        write_test_wav(&path, 2500, 8000, 2);

        let mut source = WavSource::open(&path).unwrap();
        let first = source.read_chunk(CHUNK_FRAMES).unwrap();
        assert_eq!(first.len(), CHUNK_FRAMES * 2);
        assert_eq!(source.position(), 1024);

        let mut total = first.len();
        loop {
            let chunk = source.read_chunk(CHUNK_FRAMES).unwrap();
            if chunk.is_empty() {
                break;
            }
            total += chunk.len();
        }
        assert_eq!(total, 2500 * 2);
        assert_eq!(source.position(), 2500);
    }

    #[test]
    fn seek_moves_the_read_cursor() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        write_test_wav(&path, 4000, 8000, 1);

        let mut source = WavSource::open(&path).unwrap();
        source.seek(3500).unwrap();
        assert_eq!(source.position(), 3500);

        let rest = source.read_chunk(CHUNK_FRAMES).unwrap();
        assert_eq!(rest.len(), 500);
        assert_eq!(source.position(), 4000);
    }

    #[test]
    fn seek_past_end_clamps() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        write_test_wav(&path, 1000, 8000, 1);

        let mut source = WavSource::open(&path).unwrap();
        source.seek(90_000).unwrap();
        assert_eq!(source.position(), 1000);
        assert!(source.read_chunk(CHUNK_FRAMES).unwrap().is_empty());
    }

    #[test]
    fn samples_are_rescaled_to_unit_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        write_test_wav(&path, 256, 8000, 1);

        let mut source = WavSource::open(&path).unwrap();
        let chunk = source.read_chunk(256).unwrap();
        assert!(chunk.iter().all(|s| s.abs() <= 1.0));
        // fixture ramp starts at -64 on a 16-bit scale
        assert!((chunk[0] - (-64.0 / 32768.0)).abs() < f32::EPSILON);
    }
}
