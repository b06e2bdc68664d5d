//! Contains the FactChunk struct and its implementation.
use std::fmt::{Display, Formatter};
use std::io::{Read, Seek};

#[cfg(feature = "colored")]
use colored::Colorize;

use crate::{
    chunks::{Chunk, FACT, FACT_BODY_SIZE},
    error::{WavError, WavResult},
    header::{ChunkCursor, Probe},
};

/// The fact chunk of a wav file. Contains a single field, ``num_samples``. This field is the number of samples in the wav file per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FactChunk {
    pub num_samples: u32,
}

impl FactChunk {
    /// Creates a new FactChunk with the given number of samples.
    pub fn new(num_samples: u32) -> Self {
        Self { num_samples }
    }

    /// Consumes a fact chunk if one sits at the cursor. The declared size must be exactly 4.
    pub fn probe<R: Read + Seek>(cursor: &mut ChunkCursor<'_, R>) -> WavResult<Probe<Self>> {
        if cursor.peek_tag()? != Some(FACT) {
            return Ok(Probe::Absent);
        }
        cursor.skip(FACT.len() as u64);

        let size: u32 = cursor.read_le()?;
        if size != FACT_BODY_SIZE {
            return Err(WavError::InvalidFactChunk(size));
        }
        let num_samples: u32 = cursor.read_le()?;
        Ok(Probe::Found(FactChunk::new(num_samples)))
    }
}

impl Chunk for FactChunk {
    /// Returns the ID of the FactChunk - "fact".
    fn id(&self) -> &[u8; 4] {
        &FACT
    }

    /// Returns the size of the FactChunk in bytes less the size of the ID and size field itself.
    fn size(&self) -> u32 {
        FACT_BODY_SIZE
    }

    /// Returns the full FactChunk in bytes.
    fn as_bytes(&self) -> Box<[u8]> {
        let mut buf = [0; 12];
        buf[0..4].copy_from_slice(&FACT);
        buf[4..8].copy_from_slice(&FACT_BODY_SIZE.to_le_bytes());
        buf[8..12].copy_from_slice(&self.num_samples.to_le_bytes());
        Box::new(buf)
    }
}

#[cfg(feature = "colored")]
impl Display for FactChunk {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}\n\t{} {}",
            "FactChunk: ".white().bold().underline(),
            "num_samples:".green().bold(),
            self.num_samples.to_string().white()
        )
    }
}

#[cfg(not(feature = "colored"))]
impl Display for FactChunk {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "FactChunk: num_samples: {}", self.num_samples)
    }
}
