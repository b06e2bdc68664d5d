//! Contains the FmtChunk struct, its validation and its canonical byte layout.
use std::fmt::{Display, Formatter};
use std::io::{Read, Seek};

#[cfg(feature = "colored")]
use colored::Colorize;

use crate::{
    chunks::{
        Chunk, ChunkTag, BITS_PER_SAMPLE, BYTES_PER_SAMPLE, CHUNK_HEADER_SIZE, FMT,
        PCM_FORMAT_CODE, SAMPLE_RATE,
    },
    error::{WavError, WavResult},
    header::ChunkCursor,
};

pub const FMT_SIZE_BASE_SIZE: u32 = 16; // Standard wav file format size
pub const FMT_CB_SIZE: u32 = 18; // WAVEFORMATEX with a cbSize field, which must be 0 for PCM
pub const FMT_SIZE_EXTENDED_SIZE: u32 = 40; // CB_SIZE + 22 (2 bytes valid_bits_per_sample, 4 byte channel_mask, 16 byte sub_format GUID)

/// The format chunk of a wav file as it was declared on disk.
///
/// ``chunk_len`` is the declared body length (16 or 18 for the files this crate accepts). The
/// remaining fields are the 16 bytes every fmt chunk starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FmtChunk {
    pub chunk_len: u32,
    /// Format of the audio data. 1 for PCM.
    pub format: u16,
    /// Number of channels in the audio data.
    pub channels: u16,
    /// Sample rate of the audio data.
    pub sample_rate: u32,
    /// Byte rate of the audio data.
    pub byte_rate: u32,
    /// Block align of the audio data.
    pub block_align: u16,
    /// Bits per sample of the audio data.
    pub bits_per_sample: u16,
}

impl FmtChunk {
    /// Constructs a 16 byte PCM FmtChunk for `channels` channels at the supported sample rate.
    /// The byte rate and block align are derived.
    pub fn new(channels: u16) -> Self {
        let block_align = channels.saturating_mul(BYTES_PER_SAMPLE as u16);
        FmtChunk {
            chunk_len: FMT_SIZE_BASE_SIZE,
            format: PCM_FORMAT_CODE,
            channels,
            sample_rate: SAMPLE_RATE,
            byte_rate: SAMPLE_RATE.saturating_mul(block_align as u32),
            block_align,
            bits_per_sample: BITS_PER_SAMPLE,
        }
    }

    /// Reads the fmt chunk at the cursor and validates it.
    ///
    /// On success the cursor sits at the start of the next chunk, `8 + chunk_len` bytes after
    /// the fmt tag.
    pub fn read<R: Read + Seek>(cursor: &mut ChunkCursor<'_, R>) -> WavResult<Self> {
        let start = cursor.offset();
        let tag = cursor.read_tag()?;
        if tag != FMT {
            return Err(WavError::InvalidFormatChunk(format!(
                "expected {} at offset {}, found {}",
                ChunkTag::from(FMT),
                start,
                ChunkTag::from(tag)
            )));
        }

        let chunk_len: u32 = cursor.read_le()?;
        match chunk_len {
            FMT_SIZE_BASE_SIZE | FMT_CB_SIZE => (),
            FMT_SIZE_EXTENDED_SIZE => return Err(WavError::UnsupportedFormatExtension(chunk_len)),
            _ => {
                return Err(WavError::InvalidFormatChunk(format!(
                    "declared length {} is neither {} nor {}",
                    chunk_len, FMT_SIZE_BASE_SIZE, FMT_CB_SIZE
                )))
            }
        }

        let fmt = FmtChunk {
            chunk_len,
            format: cursor.read_le()?,
            channels: cursor.read_le()?,
            sample_rate: cursor.read_le()?,
            byte_rate: cursor.read_le()?,
            block_align: cursor.read_le()?,
            bits_per_sample: cursor.read_le()?,
        };

        if chunk_len == FMT_CB_SIZE {
            let extension_size: u16 = cursor.read_le()?;
            if extension_size != 0 {
                return Err(WavError::InvalidFormatChunk(format!(
                    "non-zero extension size {} in an {} byte fmt chunk",
                    extension_size, FMT_CB_SIZE
                )));
            }
        }

        fmt.validate()?;
        cursor.advance_to(start + CHUNK_HEADER_SIZE as u64 + chunk_len as u64);
        Ok(fmt)
    }

    /// Checks the format fields in a fixed order, failing on the first violation.
    ///
    /// The byte rate and block align must equal the values derived from the channel count.
    pub fn validate(&self) -> WavResult<()> {
        if self.bits_per_sample != BITS_PER_SAMPLE {
            return Err(WavError::UnsupportedBitDepth(self.bits_per_sample));
        }
        if !(1..=2).contains(&self.channels) {
            return Err(WavError::UnsupportedChannelCount(self.channels));
        }
        if self.sample_rate != SAMPLE_RATE {
            return Err(WavError::UnsupportedSampleRate {
                found: self.sample_rate,
                supported: SAMPLE_RATE,
            });
        }
        let expected = FmtChunk::new(self.channels);
        if self.byte_rate != expected.byte_rate {
            return Err(WavError::InconsistentByteRate {
                found: self.byte_rate,
                expected: expected.byte_rate,
            });
        }
        if self.block_align != expected.block_align {
            return Err(WavError::InconsistentBlockAlign {
                found: self.block_align,
                expected: expected.block_align,
            });
        }
        if self.format != PCM_FORMAT_CODE {
            return Err(WavError::UnsupportedFormatCode(self.format));
        }
        Ok(())
    }
}

impl Chunk for FmtChunk {
    /// Returns the ID of the FmtChunk - "fmt ".
    fn id(&self) -> &[u8; 4] {
        &FMT
    }

    /// The canonical layout always has a 16 byte body.
    fn size(&self) -> u32 {
        FMT_SIZE_BASE_SIZE
    }

    /// Returns the full 24 byte FmtChunk in its canonical 16 byte body form.
    fn as_bytes(&self) -> Box<[u8]> {
        let mut buf = [0; CHUNK_HEADER_SIZE + FMT_SIZE_BASE_SIZE as usize];
        buf[0..4].copy_from_slice(&FMT);
        buf[4..8].copy_from_slice(&FMT_SIZE_BASE_SIZE.to_le_bytes());
        buf[8..10].copy_from_slice(&self.format.to_le_bytes());
        buf[10..12].copy_from_slice(&self.channels.to_le_bytes());
        buf[12..16].copy_from_slice(&self.sample_rate.to_le_bytes());
        buf[16..20].copy_from_slice(&self.byte_rate.to_le_bytes());
        buf[20..22].copy_from_slice(&self.block_align.to_le_bytes());
        buf[22..24].copy_from_slice(&self.bits_per_sample.to_le_bytes());
        Box::new(buf)
    }
}

#[cfg(feature = "colored")]
impl Display for FmtChunk {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}\n\t{} {}\n\t{} {}\n\t{} {}\n\t{} {}\n\t{} {}\n\t{} {}\n\t{} {}",
            "FmtChunk: ".white().bold().underline(),
            "chunk_len:".green().bold(),
            self.chunk_len.to_string().white(),
            "format:".green().bold(),
            self.format.to_string().white(),
            "channels:".green().bold(),
            self.channels.to_string().white(),
            "sample_rate:".green().bold(),
            self.sample_rate.to_string().white(),
            "byte_rate:".green().bold(),
            self.byte_rate.to_string().white(),
            "block_align:".green().bold(),
            self.block_align.to_string().white(),
            "bits_per_sample:".green().bold(),
            self.bits_per_sample.to_string().white(),
        )
    }
}

#[cfg(not(feature = "colored"))]
impl Display for FmtChunk {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "FmtChunk: chunk_len: {}, format: {}, channels: {}, sample_rate: {}, byte_rate: {}, block_align: {}, bits_per_sample: {}",
            self.chunk_len,
            self.format,
            self.channels,
            self.sample_rate,
            self.byte_rate,
            self.block_align,
            self.bits_per_sample
        )
    }
}
