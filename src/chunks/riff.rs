//! Contains the RiffChunk struct and its implementation.
use std::fmt::{Display, Formatter};
use std::io::{Read, Seek};

#[cfg(feature = "colored")]
use colored::Colorize;

use crate::{
    chunks::{Chunk, ChunkTag, CHUNK_HEADER_SIZE, RIFF, RIFF_HEADER_SIZE, WAVE},
    error::{WavError, WavResult},
    header::ChunkCursor,
};

/// The RIFF header that opens every wav file. ``file_length`` is the size of the file less the
/// 8 bytes of the `RIFF` tag and the length field itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiffChunk {
    pub file_length: u32,
}

impl RiffChunk {
    pub fn new(file_length: u32) -> Self {
        Self { file_length }
    }

    /// Builds the header for a file whose remaining chunks occupy `chunks_size` bytes on disk.
    pub fn enclosing(chunks_size: u32) -> Self {
        Self::new(WAVE.len() as u32 + chunks_size)
    }

    /// Reads and validates the RIFF header at the cursor.
    ///
    /// Both magic values are checked before the declared length is compared against the
    /// actual size of the file.
    pub fn read<R: Read + Seek>(cursor: &mut ChunkCursor<'_, R>) -> WavResult<Self> {
        let riff = cursor.read_tag()?;
        let file_length: u32 = cursor.read_le()?;
        let wave = cursor.read_tag()?;

        if riff != RIFF {
            return Err(WavError::InvalidMagic {
                expected: RIFF.into(),
                found: ChunkTag::from(riff),
            });
        }
        if wave != WAVE {
            return Err(WavError::InvalidMagic {
                expected: WAVE.into(),
                found: ChunkTag::from(wave),
            });
        }

        let actual_file_size = cursor.file_size();
        if file_length as u64 + CHUNK_HEADER_SIZE as u64 != actual_file_size {
            return Err(WavError::LengthMismatch {
                declared: file_length,
                actual_file_size,
            });
        }
        Ok(Self::new(file_length))
    }
}

impl Chunk for RiffChunk {
    /// Returns the ID of the RiffChunk - "RIFF".
    fn id(&self) -> &[u8; 4] {
        &RIFF
    }

    fn size(&self) -> u32 {
        self.file_length
    }

    /// Returns the 12 byte RIFF header, ending with the `WAVE` form type.
    fn as_bytes(&self) -> Box<[u8]> {
        let mut buf = [0; RIFF_HEADER_SIZE];
        buf[0..4].copy_from_slice(&RIFF);
        buf[4..8].copy_from_slice(&self.file_length.to_le_bytes());
        buf[8..12].copy_from_slice(&WAVE);
        Box::new(buf)
    }
}

#[cfg(feature = "colored")]
impl Display for RiffChunk {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}\n\t{} {}",
            "RiffChunk: ".white().bold().underline(),
            "file_length:".green().bold(),
            self.file_length.to_string().white()
        )
    }
}

#[cfg(not(feature = "colored"))]
impl Display for RiffChunk {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "RiffChunk: file_length: {}", self.file_length)
    }
}
