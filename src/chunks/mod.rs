//! The chunk catalog: tags, fixed sizes and byte layouts of every chunk this crate understands.
pub mod data;
pub mod fact;
pub mod fmt;
pub mod list;
pub mod riff;

use std::fmt::Display;

pub use crate::chunks::data::DataChunk;
pub use crate::chunks::fact::FactChunk;
pub use crate::chunks::fmt::FmtChunk;
pub use crate::chunks::list::ListChunk;
pub use crate::chunks::riff::RiffChunk;

// 100% necessary to have these chunks
pub const RIFF: [u8; 4] = *b"RIFF";
pub const WAVE: [u8; 4] = *b"WAVE";
pub const DATA: [u8; 4] = *b"data";
pub const FMT: [u8; 4] = *b"fmt ";

// Optional chunks
pub const LIST: [u8; 4] = *b"LIST";
pub const FACT: [u8; 4] = *b"fact";

/// The only LIST type id this crate expects to see.
pub const INFO: [u8; 4] = *b"INFO";

/// Tag plus length field that prefixes every chunk.
pub const CHUNK_HEADER_SIZE: usize = 8;
/// `RIFF` + file length + `WAVE`.
pub const RIFF_HEADER_SIZE: usize = 12;
/// Body size of a `fact` chunk, a single u32.
pub const FACT_BODY_SIZE: u32 = 4;

pub const SAMPLE_RATE: u32 = 44100;
pub const BITS_PER_SAMPLE: u16 = 16;
pub const BYTES_PER_SAMPLE: usize = 2;
pub const PCM_FORMAT_CODE: u16 = 1;

/// Number of bytes read up front when decoding. Grows on demand if optional chunks push past it.
pub const HEADER_WINDOW_SIZE: usize = 1 << 10;
/// Smallest header region a decode accepts: RIFF header, a 16-byte fmt chunk and a fact chunk.
pub const MIN_HEADER_SIZE: usize = RIFF_HEADER_SIZE
    + CHUNK_HEADER_SIZE
    + fmt::FMT_SIZE_BASE_SIZE as usize
    + CHUNK_HEADER_SIZE
    + FACT_BODY_SIZE as usize;

/// A chunk that can be written in the canonical layout.
pub trait Chunk: Display {
    /// The 4 byte tag identifying the chunk.
    fn id(&self) -> &[u8; 4];
    /// Size of the chunk body in bytes, excluding the tag and size field.
    fn size(&self) -> u32;
    /// The chunk as it appears on disk. Chunks whose body is sample data return only their header.
    fn as_bytes(&self) -> Box<[u8]>;

    /// Size of the chunk on disk including its header.
    fn total_size(&self) -> u32 {
        CHUNK_HEADER_SIZE as u32 + self.size()
    }
}

/// Wrapper around a 4 byte tag. Used for storing and displaying/debugging the identifier of a chunk.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ChunkTag([u8; 4]);

impl ChunkTag {
    pub fn new(tag: [u8; 4]) -> Self {
        ChunkTag(tag)
    }
}

impl From<[u8; 4]> for ChunkTag {
    fn from(tag: [u8; 4]) -> Self {
        ChunkTag(tag)
    }
}

impl From<&[u8; 4]> for ChunkTag {
    fn from(tag: &[u8; 4]) -> Self {
        ChunkTag(*tag)
    }
}

impl PartialEq<[u8; 4]> for ChunkTag {
    fn eq(&self, other: &[u8; 4]) -> bool {
        self.0 == *other
    }
}

impl Display for ChunkTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match std::str::from_utf8(&self.0) {
            Ok(s) => write!(f, "{:?}", s),
            Err(_) => write!(f, "{:02x?}", self.0),
        }
    }
}
