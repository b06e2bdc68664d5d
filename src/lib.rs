//! # pcmwav
//!
//! pcmwav reads and writes a strict subset of the RIFF/WAVE format: 16-bit linear PCM, mono or
//! stereo, at 44100 Hz.
//!
//! ## Reading
//!
//! Decoding walks the chunks of a file in order: `RIFF`, `fmt `, an optional `LIST`, an
//! optional `fact` and finally `data`. Every redundant field is cross-checked (the RIFF length
//! against the file size, the byte rate and block align against the channel count) and the first
//! inconsistency aborts the decode with a specific [`WavError`].
//!
//! The number of samples is taken from the `fact` chunk when present, otherwise from the
//! declared size of the `data` chunk.
//!
//! ```no_run
//! use pcmwav::{read, Samples, FormatDescriptor};
//!
//! let (samples, format): (Samples, FormatDescriptor) = read("input.wav")?;
//! println!("{} channel(s), {} frames", format.channels, samples.n_frames(format.channels));
//! # Ok::<(), pcmwav::WavError>(())
//! ```
//!
//! ## Writing
//!
//! Writing always produces the same four chunks, `RIFF`, `fmt `, `fact` and `data`. Any `LIST`
//! metadata of the source file is dropped. The file is first written next to its destination
//! and then renamed over it, so a failed write never leaves a partial file behind.
//!
//! ```no_run
//! use pcmwav::{write, FormatDescriptor};
//!
//! let samples: Vec<i16> = vec![100, -100, 200, -200];
//! write("out.wav", &samples, &FormatDescriptor::stereo())?;
//! # Ok::<(), pcmwav::WavError>(())
//! ```
//!
//! ## Transforming
//!
//! [`Samples`] derefs to `[i16]`, so any in-place transform can run between a read and a write.
//! [`effects::SineRipple`] is one such transform.
//!
//! ## Optional Features
//!
//! - `logging` (default): chunk-level diagnostics through the `log` facade. Pass
//!   [`DecodeOptions::verbose`] or [`EncodeOptions::verbose`] to raise them from `Debug` to `Info`.
//! - `colored`: colored `Display` output for the chunk structs.
//!
pub mod chunks;
pub mod core;
pub mod effects;
pub mod error;
pub mod header;

use std::path::Path;

pub use crate::chunks::{
    Chunk, ChunkTag, DataChunk, FactChunk, FmtChunk, ListChunk, RiffChunk, DATA, FACT, FMT, LIST,
    RIFF, SAMPLE_RATE, WAVE,
};
pub use crate::core::{
    encode_to, write_with, DecodeOptions, EncodeOptions, FormatDescriptor, SampleTable, Samples,
    Wav,
};
pub use crate::error::{WavError, WavResult};
pub use crate::header::{read_header, Probe, SampleCountSource, WavHeader};

/// A macro for logging messages if the logging feature is enabled.
#[macro_export]
macro_rules! log {
    ($level:expr, $($arg:tt)+) => {
        #[cfg(feature = "logging")]
        log::log!($level, $($arg)+);
    };
}

/// Reads a wav file and returns the samples and their format.
///
/// # Examples
///
/// ```no_run
/// use pcmwav::{read, Samples, FormatDescriptor};
///
/// fn main() {
///     let fp = "path/to/wav.wav";
///     let (samples, format): (Samples, FormatDescriptor) = read(fp).unwrap();
/// }
/// ```
#[inline(always)]
pub fn read<P: AsRef<Path>>(path: P) -> WavResult<(Samples, FormatDescriptor)> {
    read_with(path, &DecodeOptions::default())
}

/// Like [`read`] with explicit decode options.
pub fn read_with<P: AsRef<Path>>(
    path: P,
    options: &DecodeOptions,
) -> WavResult<(Samples, FormatDescriptor)> {
    let wav = Wav::from_path_with(&path, options)?;
    Ok(wav.into_parts())
}

/// Writes wav samples to disk in the canonical four chunk layout.
///
/// # Examples
///
/// The code below will generate a wav file from a 1 second, 1-channel sine wave and write it to disk.
/// ```no_run
/// use pcmwav::{write, FormatDescriptor, SAMPLE_RATE};
///
/// fn main() {
///     let fp = "./wav.wav";
///     let samples: Vec<i16> = (0..SAMPLE_RATE)
///         .map(|x| {
///             let t = x as f32 / SAMPLE_RATE as f32;
///             ((t * 440.0 * 2.0 * std::f32::consts::PI).sin() * i16::MAX as f32) as i16
///         })
///         .collect();
///     assert!(write(fp, &samples, &FormatDescriptor::mono()).is_ok());
///     std::fs::remove_file(fp).unwrap();
/// }
/// ```
#[inline(always)]
pub fn write<P: AsRef<Path>>(path: P, samples: &[i16], format: &FormatDescriptor) -> WavResult<()> {
    write_with(path, samples, format, &EncodeOptions::default(), |f| f)
}
