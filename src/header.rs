//!
//! Walks the chunks at the front of a wav file and validates them in file order.
//!
use std::fmt::Display;
use std::io::{Read, Seek, SeekFrom};

use num_traits::FromBytes;

use crate::chunks::{
    DataChunk, FactChunk, FmtChunk, ListChunk, RiffChunk, BYTES_PER_SAMPLE, HEADER_WINDOW_SIZE,
    MIN_HEADER_SIZE,
};
use crate::core::DecodeOptions;
use crate::error::{WavError, WavResult};
use crate::log;

/// Result of probing for an optional chunk at the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe<T> {
    /// The chunk was present and has been consumed.
    Found(T),
    /// Some other tag sits at the cursor. Nothing was consumed.
    Absent,
}

impl<T> Probe<T> {
    pub fn found(self) -> Option<T> {
        match self {
            Probe::Found(chunk) => Some(chunk),
            Probe::Absent => None,
        }
    }
}

/// Tracks the next unread byte of a wav file while its header is parsed.
///
/// Bytes are served from an in-memory window. The window is refilled from the underlying
/// reader only when a read runs past its end, and always at the cursor's current offset,
/// so the cursor never moves backwards.
pub struct ChunkCursor<'r, R: Read + Seek> {
    reader: &'r mut R,
    window: Vec<u8>,
    window_start: u64,
    offset: u64,
    file_size: u64,
}

impl<'r, R: Read + Seek> ChunkCursor<'r, R> {
    /// Reads the initial header window from the start of `reader`.
    ///
    /// Fails with [`WavError::TruncatedFile`] if fewer than [`MIN_HEADER_SIZE`] bytes could be read.
    pub fn new(reader: &'r mut R, file_size: u64) -> WavResult<Self> {
        let mut cursor = ChunkCursor {
            reader,
            window: Vec::with_capacity(HEADER_WINDOW_SIZE),
            window_start: 0,
            offset: 0,
            file_size,
        };
        cursor.reload(HEADER_WINDOW_SIZE)?;
        if cursor.window.len() < MIN_HEADER_SIZE {
            return Err(WavError::TruncatedFile {
                read: cursor.window.len(),
                required: MIN_HEADER_SIZE,
            });
        }
        Ok(cursor)
    }

    /// File offset of the next unread byte.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Bytes between the cursor and the end of the file.
    pub fn remaining(&self) -> u64 {
        self.file_size.saturating_sub(self.offset)
    }

    fn reload(&mut self, len: usize) -> WavResult<()> {
        self.reader.seek(SeekFrom::Start(self.offset))?;
        self.window.clear();
        (&mut *self.reader)
            .take(len as u64)
            .read_to_end(&mut self.window)?;
        self.window_start = self.offset;
        Ok(())
    }

    /// Makes sure `n` bytes starting at the cursor are in the window. Returns false at end of file.
    fn fill(&mut self, n: usize) -> WavResult<bool> {
        let window_end = self.window_start + self.window.len() as u64;
        if self.offset >= self.window_start && self.offset + n as u64 <= window_end {
            return Ok(true);
        }
        if self.offset + n as u64 > self.file_size {
            return Ok(false);
        }
        self.reload(n.max(HEADER_WINDOW_SIZE))?;
        Ok(self.window.len() >= n)
    }

    /// Consumes `n` bytes at the cursor.
    pub fn bytes(&mut self, n: usize) -> WavResult<&[u8]> {
        if !self.fill(n)? {
            return Err(WavError::TruncatedFile {
                read: self.file_size as usize,
                required: (self.offset + n as u64) as usize,
            });
        }
        let start = (self.offset - self.window_start) as usize;
        self.offset += n as u64;
        Ok(&self.window[start..start + n])
    }

    /// Consumes one little-endian field at the cursor.
    pub fn read_le<T>(&mut self) -> WavResult<T>
    where
        T: FromBytes,
        T::Bytes: Sized + Default,
    {
        let mut field = T::Bytes::default();
        let width = field.as_ref().len();
        field.as_mut().copy_from_slice(self.bytes(width)?);
        Ok(T::from_le_bytes(&field))
    }

    /// Consumes a 4 byte chunk tag.
    pub fn read_tag(&mut self) -> WavResult<[u8; 4]> {
        let mut tag = [0; 4];
        tag.copy_from_slice(self.bytes(4)?);
        Ok(tag)
    }

    /// Looks at the 4 byte tag under the cursor without consuming it.
    /// Returns `None` if the file ends first.
    pub fn peek_tag(&mut self) -> WavResult<Option<[u8; 4]>> {
        if !self.fill(4)? {
            return Ok(None);
        }
        let start = (self.offset - self.window_start) as usize;
        let mut tag = [0; 4];
        tag.copy_from_slice(&self.window[start..start + 4]);
        Ok(Some(tag))
    }

    /// Moves the cursor forward to `offset` without reading the bytes in between.
    /// Offsets behind the cursor are ignored.
    pub fn advance_to(&mut self, offset: u64) {
        self.offset = self.offset.max(offset);
    }

    /// Skips `n` bytes.
    pub fn skip(&mut self, n: u64) {
        self.offset = self.offset.saturating_add(n);
    }
}

/// Where the decoded sample count came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleCountSource {
    /// The per-channel count stored in the `fact` chunk.
    Fact,
    /// The declared size of the `data` chunk.
    DataSize,
}

/// Every chunk found in the header of a wav file, plus the file offset of the sample data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WavHeader {
    pub riff: RiffChunk,
    pub fmt: FmtChunk,
    pub list: Option<ListChunk>,
    pub fact: Option<FactChunk>,
    pub data: DataChunk,
    /// File offset of the first sample, directly after the `data` chunk header.
    pub data_offset: u64,
}

impl WavHeader {
    /// Total number of samples across all channels.
    ///
    /// The `fact` chunk is authoritative when present, otherwise the count is derived from the
    /// declared size of the `data` chunk.
    pub fn total_samples(&self) -> u64 {
        match self.fact {
            Some(fact) => fact.num_samples as u64 * self.fmt.channels as u64,
            None => self.data.size as u64 / BYTES_PER_SAMPLE as u64,
        }
    }

    pub fn sample_count_source(&self) -> SampleCountSource {
        match self.fact {
            Some(_) => SampleCountSource::Fact,
            None => SampleCountSource::DataSize,
        }
    }

    /// Number of bytes of sample data to read from [`WavHeader::data_offset`].
    pub fn sample_bytes(&self) -> u64 {
        self.total_samples() * BYTES_PER_SAMPLE as u64
    }
}

impl Display for WavHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.riff)?;
        writeln!(f, "{}", self.fmt)?;
        if let Some(list) = &self.list {
            writeln!(f, "{}", list)?;
        }
        if let Some(fact) = &self.fact {
            writeln!(f, "{}", fact)?;
        }
        write!(f, "{} (offset: {})", self.data, self.data_offset)
    }
}

/// Reads and validates the header of a wav file, stopping at the first sample.
///
/// The chunks are expected in the order `RIFF`, `fmt `, optional `LIST`, optional `fact`,
/// `data`. The reader is left at an unspecified position.
pub fn read_header<R: Read + Seek>(reader: &mut R, options: &DecodeOptions) -> WavResult<WavHeader> {
    let file_size = reader.seek(SeekFrom::End(0))?;
    let mut cursor = ChunkCursor::new(reader, file_size)?;

    let riff = RiffChunk::read(&mut cursor)?;
    log!(options.level(), "{} (file size: {})", riff, file_size);

    let fmt = FmtChunk::read(&mut cursor)?;
    log!(options.level(), "{}", fmt);

    let list = ListChunk::probe(&mut cursor)?.found();
    if let Some(list) = &list {
        log!(options.level(), "{}", list);
    }

    let fact = FactChunk::probe(&mut cursor)?.found();
    if let Some(fact) = &fact {
        log!(options.level(), "{}", fact);
    }

    let data = DataChunk::read(&mut cursor)?;
    let data_offset = cursor.offset();
    log!(options.level(), "{} (offset: {})", data, data_offset);

    let header = WavHeader {
        riff,
        fmt,
        list,
        fact,
        data,
        data_offset,
    };

    if let Some(fact) = header.fact {
        let fact_bytes = fact.num_samples as u64 * fmt.block_align as u64;
        if fact_bytes != data.size as u64 {
            log!(
                log::Level::Warn,
                "fact chunk reports {} frames ({} bytes) but data chunk declares {} bytes",
                fact.num_samples,
                fact_bytes,
                data.size
            );
        }
    } else if data.size % BYTES_PER_SAMPLE as u32 != 0 {
        log!(
            log::Level::Warn,
            "data chunk size {} is odd, ignoring the trailing byte",
            data.size
        );
    }
    log!(
        options.level(),
        "{} samples in total ({:?})",
        header.total_samples(),
        header.sample_count_source()
    );

    Ok(header)
}
