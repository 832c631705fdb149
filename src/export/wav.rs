//! WAV file export functionality

use crate::aica::SAMPLE_RATE;
use crate::host::AudioSink;
use crate::{AicaError, Result};
use parking_lot::Mutex;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::sync::Arc;

/// Output channels
pub const WAV_CHANNELS: u16 = 2;
/// Output sample width
pub const WAV_BITS_PER_SAMPLE: u16 = 16;

type Writer = hound::WavWriter<BufWriter<File>>;

#[derive(Default)]
struct WavState {
    writer: Option<Writer>,
    frames: u64,
    error: Option<String>,
}

/// Audio sink writing 16-bit stereo 44.1 kHz WAV
///
/// Clones share one file, so a clone can be handed to the emulator while the
/// caller keeps another to [`finalize`](WavSink::finalize) it. Write errors
/// cannot surface through [`AudioSink`]; the first one is kept and returned
/// by `finalize`.
///
/// # Examples
///
/// ```no_run
/// use aica::{Aica, AicaConfig, Host, WavSink};
///
/// # fn main() -> aica::Result<()> {
/// let wav = WavSink::create("out.wav")?;
/// let mut aica = Aica::new(AicaConfig::default(), Host::new().with_audio(wav.clone()));
/// for _ in 0..44_100 {
///     aica.time_step();
/// }
/// aica.flush_output();
/// wav.finalize()?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct WavSink {
    state: Arc<Mutex<WavState>>,
}

impl WavSink {
    /// Create (or truncate) the file at `path`
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let spec = hound::WavSpec {
            channels: WAV_CHANNELS,
            sample_rate: SAMPLE_RATE,
            bits_per_sample: WAV_BITS_PER_SAMPLE,
            sample_format: hound::SampleFormat::Int,
        };
        let writer = hound::WavWriter::create(path.as_ref(), spec)
            .map_err(|e| AicaError::AudioFileError(format!("Failed to create WAV file: {}", e)))?;
        log::debug!("writing WAV to {}", path.as_ref().display());

        Ok(WavSink {
            state: Arc::new(Mutex::new(WavState {
                writer: Some(writer),
                ..Default::default()
            })),
        })
    }

    /// Frames written so far
    pub fn frames_written(&self) -> u64 {
        self.state.lock().frames
    }

    /// Finish the file header and close it
    ///
    /// Returns the number of frames in the file, or the first write error.
    /// Later calls are no-ops returning the same count.
    pub fn finalize(&self) -> Result<u64> {
        let mut state = self.state.lock();
        if let Some(msg) = state.error.take() {
            return Err(AicaError::AudioFileError(msg));
        }
        if let Some(writer) = state.writer.take() {
            writer
                .finalize()
                .map_err(|e| AicaError::AudioFileError(format!("Failed to finalize WAV file: {}", e)))?;
        }
        Ok(state.frames)
    }
}

impl AudioSink for WavSink {
    fn push_frames(&mut self, frames: &[i16]) {
        let mut state = self.state.lock();
        if state.error.is_some() {
            return;
        }
        let Some(writer) = state.writer.as_mut() else {
            return;
        };

        let mut failure = None;
        for &sample in frames {
            if let Err(e) = writer.write_sample(sample) {
                failure = Some(format!("Failed to write sample: {}", e));
                break;
            }
        }
        match failure {
            Some(msg) => {
                log::warn!("{}", msg);
                state.error = Some(msg);
            }
            None => state.frames += (frames.len() / 2) as u64,
        }
    }
}

impl std::fmt::Debug for WavSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WavSink")
            .field("frames", &self.frames_written())
            .finish_non_exhaustive()
    }
}
