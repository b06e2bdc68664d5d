//! List Chunk - optional metadata between the fmt chunk and the sample data.
//!
//! Only the list type id is read. The body is skipped using the declared size and is never
//! written back out.
use std::fmt::{Display, Formatter};
use std::io::{Read, Seek};

use crate::log;

#[cfg(feature = "colored")]
use colored::Colorize;

use crate::{
    chunks::{ChunkTag, INFO, LIST},
    error::WavResult,
    header::{ChunkCursor, Probe},
};

pub type ListTypeId = [u8; 4];

/// A LIST chunk found while decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListChunk {
    list_type_id: Option<ListTypeId>,
    /// Declared size of the chunk body, including the 4 byte type id.
    pub size: u32,
}

impl ListChunk {
    pub(crate) fn new(list_type_id: Option<ListTypeId>, size: u32) -> Self {
        Self { list_type_id, size }
    }

    /// The list type id, `None` if the declared size is too small to hold one.
    pub fn type_id(&self) -> Option<ListTypeId> {
        self.list_type_id
    }

    pub fn is_info(&self) -> bool {
        self.list_type_id == Some(INFO)
    }

    /// Consumes a LIST chunk if one sits at the cursor, skipping its body by its declared size.
    ///
    /// A type id other than `INFO` is reported but accepted.
    pub fn probe<R: Read + Seek>(cursor: &mut ChunkCursor<'_, R>) -> WavResult<Probe<Self>> {
        if cursor.peek_tag()? != Some(LIST) {
            return Ok(Probe::Absent);
        }
        let start = cursor.offset();
        cursor.skip(LIST.len() as u64);
        let size: u32 = cursor.read_le()?;
        let body_start = cursor.offset();

        let list_type_id = if size as usize >= INFO.len() {
            Some(cursor.read_tag()?)
        } else {
            log!(
                log::Level::Warn,
                "LIST chunk at offset {} is too small ({} bytes) to hold a type id",
                start,
                size
            );
            None
        };
        if let Some(id) = list_type_id {
            if id != INFO {
                log!(
                    log::Level::Warn,
                    "LIST chunk at offset {} has type {}, expected {}",
                    start,
                    ChunkTag::from(id),
                    ChunkTag::from(INFO)
                );
            }
        }

        cursor.advance_to(body_start + size as u64);
        Ok(Probe::Found(ListChunk::new(list_type_id, size)))
    }
}

#[cfg(feature = "colored")]
impl Display for ListChunk {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.list_type_id {
            Some(id) => write!(
                f,
                "{} ({})",
                "ListChunk:".white().bold(),
                ChunkTag::from(id).to_string().white().underline()
            )?,
            None => write!(
                f,
                "{} {}",
                "ListChunk:".white().bold(),
                "[NO TYPE]".red().bold().underline()
            )?,
        }
        write!(f, "\n\t{} {}", "size:".green().bold(), self.size.to_string().white())
    }
}

#[cfg(not(feature = "colored"))]
impl Display for ListChunk {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.list_type_id {
            Some(id) => write!(f, "ListChunk: {}", ChunkTag::from(id))?,
            None => write!(f, "ListChunk: [NO TYPE]")?,
        }
        write!(f, ", size: {}", self.size)
    }
}
