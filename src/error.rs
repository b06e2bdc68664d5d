/// Module containing the error types for pcmwav
use thiserror::Error;

use crate::chunks::ChunkTag;

pub type WavResult<T> = Result<T, WavError>;

/// Error types for pcmwav.
///
/// Every variant is terminal for the decode or encode call that produced it.
#[derive(Error, Debug)]
pub enum WavError {
    #[error("IO error with file")]
    Io(#[from] std::io::Error),

    // decode
    #[error("File too short to hold a wav header: read {read} bytes, need at least {required}")]
    TruncatedFile { read: usize, required: usize },
    #[error("Invalid magic: expected {expected}, found {found}")]
    InvalidMagic { expected: ChunkTag, found: ChunkTag },
    #[error("RIFF length {declared} does not match file size {actual_file_size} - 8")]
    LengthMismatch { declared: u32, actual_file_size: u64 },
    #[error("Invalid fmt chunk: {0}")]
    InvalidFormatChunk(String),
    #[error("Extensible fmt chunk (length {0}) is not supported")]
    UnsupportedFormatExtension(u32),
    #[error("Unsupported format code {0:#06x}, only PCM (1) is supported")]
    UnsupportedFormatCode(u16),
    #[error("Unsupported bits per sample {0}, only 16 is supported")]
    UnsupportedBitDepth(u16),
    #[error("Unsupported channel count {0}, only 1 or 2 are supported")]
    UnsupportedChannelCount(u16),
    #[error("Unsupported sample rate {found}, only {supported} is supported")]
    UnsupportedSampleRate { found: u32, supported: u32 },
    #[error("Byte rate {found} is inconsistent, expected {expected}")]
    InconsistentByteRate { found: u32, expected: u32 },
    #[error("Block align {found} is inconsistent, expected {expected}")]
    InconsistentBlockAlign { found: u16, expected: u16 },
    #[error("Invalid fact chunk: declared size {0}, expected 4")]
    InvalidFactChunk(u32),
    #[error("Missing data chunk at offset {offset}, found {found:?}")]
    MissingDataChunk { offset: u64, found: Option<ChunkTag> },
    #[error("Truncated sample data: need {required} bytes, only {available} available")]
    TruncatedSampleData { required: u64, available: u64 },

    // encode
    #[error("Invalid channel count {0}, only 1 or 2 can be written")]
    InvalidChannelCount(u16),
    #[error("Sample buffer of length {samples} is not a whole number of {channels}-channel frames")]
    MisalignedSampleBuffer { samples: usize, channels: u16 },
    #[error("Sample buffer of length {0} does not fit in a wav file")]
    SampleBufferTooLarge(usize),
    #[error("Failed to write temporary file {path}")]
    WriteFailure {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to rename {from} to {to}")]
    RenameFailure {
        from: std::path::PathBuf,
        to: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    // effects
    #[error("Parameter {name} = {value} not in [{min}, {max}]")]
    ParameterOutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}
