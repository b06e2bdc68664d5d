//! Contains the DataChunk header. The samples it describes are handled by [`crate::core`].
use std::fmt::{Display, Formatter};
use std::io::{Read, Seek};

#[cfg(feature = "colored")]
use colored::Colorize;

use crate::{
    chunks::{Chunk, ChunkTag, CHUNK_HEADER_SIZE, DATA},
    error::{WavError, WavResult},
    header::ChunkCursor,
};

/// Header of the data chunk. ``size`` is the declared number of sample bytes that follow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DataChunk {
    pub size: u32,
}

impl DataChunk {
    pub fn new(size: u32) -> Self {
        Self { size }
    }

    /// Reads the data chunk header at the cursor. Any other tag, or the end of the file, is a
    /// [`WavError::MissingDataChunk`].
    pub fn read<R: Read + Seek>(cursor: &mut ChunkCursor<'_, R>) -> WavResult<Self> {
        let offset = cursor.offset();
        match cursor.peek_tag()? {
            Some(DATA) => (),
            found => {
                return Err(WavError::MissingDataChunk {
                    offset,
                    found: found.map(ChunkTag::from),
                })
            }
        }
        cursor.skip(DATA.len() as u64);
        let size: u32 = cursor.read_le()?;
        Ok(DataChunk::new(size))
    }
}

impl Chunk for DataChunk {
    /// Returns the ID of the DataChunk - "data".
    fn id(&self) -> &[u8; 4] {
        &DATA
    }

    fn size(&self) -> u32 {
        self.size
    }

    /// Returns only the 8 byte chunk header. The sample bytes follow it on disk.
    fn as_bytes(&self) -> Box<[u8]> {
        let mut buf = [0; CHUNK_HEADER_SIZE];
        buf[0..4].copy_from_slice(&DATA);
        buf[4..8].copy_from_slice(&self.size.to_le_bytes());
        Box::new(buf)
    }
}

#[cfg(feature = "colored")]
impl Display for DataChunk {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}\n\t{} {}",
            "DataChunk: ".white().bold().underline(),
            "size:".green().bold(),
            self.size.to_string().white()
        )
    }
}

#[cfg(not(feature = "colored"))]
impl Display for DataChunk {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "DataChunk: size: {}", self.size)
    }
}
