/// Module contains the core structs, ``Wav``, ``Samples`` and ``FormatDescriptor``, and the
/// decode and encode paths built on top of the chunk catalog.
use std::ffi::OsString;
use std::fmt::Display;
use std::fs::File;
use std::io::{BufWriter, ErrorKind, Read, Seek, SeekFrom, Write};
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};

use crate::chunks::{
    Chunk, DataChunk, FactChunk, FmtChunk, ListChunk, RiffChunk, BITS_PER_SAMPLE,
    BYTES_PER_SAMPLE, CHUNK_HEADER_SIZE, RIFF_HEADER_SIZE, SAMPLE_RATE,
};
use crate::error::{WavError, WavResult};
use crate::header::{read_header, WavHeader};
use crate::log;

/// Options for a single decode call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecodeOptions {
    /// Report every chunk and offset at `Info` instead of `Debug`.
    pub verbose: bool,
}

impl DecodeOptions {
    pub fn verbose() -> Self {
        DecodeOptions { verbose: true }
    }

    #[cfg(feature = "logging")]
    pub(crate) fn level(&self) -> log::Level {
        if self.verbose {
            log::Level::Info
        } else {
            log::Level::Debug
        }
    }
}

/// Options for a single encode call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncodeOptions {
    /// Report the chunk layout and the temporary file at `Info` instead of `Debug`.
    pub verbose: bool,
}

impl EncodeOptions {
    pub fn verbose() -> Self {
        EncodeOptions { verbose: true }
    }

    #[cfg(feature = "logging")]
    pub(crate) fn level(&self) -> log::Level {
        if self.verbose {
            log::Level::Info
        } else {
            log::Level::Debug
        }
    }
}

/// The format of a 16-bit PCM wav file. Only the channel count varies; the sample rate and bit
/// depth are fixed, and the byte rate and block align are derived from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FormatDescriptor {
    pub channels: u16,
}

impl FormatDescriptor {
    /// Constructs a FormatDescriptor, rejecting channel counts other than 1 or 2.
    pub fn new(channels: u16) -> WavResult<Self> {
        match channels {
            1 | 2 => Ok(FormatDescriptor { channels }),
            _ => Err(WavError::UnsupportedChannelCount(channels)),
        }
    }

    pub fn mono() -> Self {
        FormatDescriptor { channels: 1 }
    }

    pub fn stereo() -> Self {
        FormatDescriptor { channels: 2 }
    }

    pub fn n_channels(&self) -> u16 {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    pub fn bits_per_sample(&self) -> u16 {
        BITS_PER_SAMPLE
    }

    /// Bytes consumed by one frame.
    pub fn block_align(&self) -> u16 {
        self.channels.saturating_mul(BYTES_PER_SAMPLE as u16)
    }

    /// Bytes consumed by one second of audio.
    pub fn byte_rate(&self) -> u32 {
        self.sample_rate().saturating_mul(self.block_align() as u32)
    }

    fn is_writable(&self) -> bool {
        (1..=2).contains(&self.channels)
    }
}

impl From<&FmtChunk> for FormatDescriptor {
    fn from(fmt: &FmtChunk) -> Self {
        FormatDescriptor {
            channels: fmt.channels,
        }
    }
}

impl From<&FormatDescriptor> for FmtChunk {
    fn from(format: &FormatDescriptor) -> Self {
        FmtChunk::new(format.channels)
    }
}

impl Display for FormatDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} channel(s), {} Hz, {} bits",
            self.channels,
            self.sample_rate(),
            self.bits_per_sample()
        )
    }
}

/// Wrapper struct around a boxed slice of interleaved 16-bit samples.
/// Wrapping allows the extension of the struct to include more functionality.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Samples {
    pub(crate) samples: Box<[i16]>,
}

impl AsRef<[i16]> for Samples {
    fn as_ref(&self) -> &[i16] {
        &self.samples
    }
}

impl AsMut<[i16]> for Samples {
    fn as_mut(&mut self) -> &mut [i16] {
        &mut self.samples
    }
}

impl Deref for Samples {
    type Target = [i16];

    fn deref(&self) -> &Self::Target {
        &self.samples
    }
}

impl DerefMut for Samples {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.samples
    }
}

// From Vec
impl From<Vec<i16>> for Samples {
    fn from(samples: Vec<i16>) -> Self {
        Samples {
            samples: samples.into_boxed_slice(),
        }
    }
}

// From Slice
impl From<&[i16]> for Samples {
    fn from(samples: &[i16]) -> Self {
        Samples {
            samples: Box::from(samples),
        }
    }
}

// From boxed slice
impl From<Box<[i16]>> for Samples {
    fn from(samples: Box<[i16]>) -> Self {
        Samples { samples }
    }
}

impl Display for Samples {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", &self.samples)
    }
}

impl Samples {
    /// Construct a new Samples struct from a boxed slice of audio samples.
    pub fn new(samples: Box<[i16]>) -> Self {
        Self { samples }
    }

    /// Decodes little-endian 16-bit samples. A trailing odd byte is ignored.
    pub fn from_le_bytes(bytes: &[u8]) -> Self {
        bytes
            .chunks_exact(BYTES_PER_SAMPLE)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
            .collect::<Vec<i16>>()
            .into()
    }

    /// Converts the samples to their little-endian byte representation.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.samples.len() * BYTES_PER_SAMPLE);
        for sample in self.samples.iter() {
            bytes.extend_from_slice(&sample.to_le_bytes());
        }
        bytes
    }

    /// Number of frames for the given channel count.
    pub fn n_frames(&self, n_channels: u16) -> usize {
        match n_channels {
            0 => 0,
            n => self.samples.len() / n as usize,
        }
    }

    /// Returns a `Display` adapter printing the samples as a column-aligned table.
    pub fn table(&self) -> SampleTable<'_> {
        SampleTable {
            samples: &self.samples,
        }
    }
}

/// Prints samples six characters wide, sixteen to a row.
pub struct SampleTable<'a> {
    samples: &'a [i16],
}

impl SampleTable<'_> {
    pub const COLS_PER_ROW: usize = 16;
}

impl Display for SampleTable<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (row_idx, row) in self.samples.chunks(Self::COLS_PER_ROW).enumerate() {
            if row_idx > 0 {
                writeln!(f)?;
            }
            for sample in row {
                write!(f, "{:6} ", sample)?;
            }
        }
        Ok(())
    }
}

/// A decoded wav file: interleaved samples plus the format they were stored in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wav {
    pub samples: Samples,
    pub format: FormatDescriptor,
    /// The LIST chunk of the source file, if it had one. Never written back out.
    pub list: Option<ListChunk>,
}

impl Wav {
    pub fn new(samples: Samples, format: FormatDescriptor) -> Self {
        Wav {
            samples,
            format,
            list: None,
        }
    }

    /// Reads and decodes the wav file at `path`.
    pub fn from_path<P: AsRef<Path>>(path: P) -> WavResult<Self> {
        Self::from_path_with(path, &DecodeOptions::default())
    }

    pub fn from_path_with<P: AsRef<Path>>(path: P, options: &DecodeOptions) -> WavResult<Self> {
        let f = File::open(path.as_ref())?;
        let mut reader = std::io::BufReader::new(f);
        let wav = Self::decode_with(&mut reader, options)?;
        log!(
            options.level(),
            "Read wav file from {} ({}, {} frames)",
            path.as_ref().display(),
            wav.format,
            wav.n_frames()
        );
        Ok(wav)
    }

    /// Decodes a complete wav file from `reader`.
    pub fn decode<R: Read + Seek>(reader: &mut R) -> WavResult<Self> {
        Self::decode_with(reader, &DecodeOptions::default())
    }

    pub fn decode_with<R: Read + Seek>(reader: &mut R, options: &DecodeOptions) -> WavResult<Self> {
        let header = read_header(reader, options)?;
        let samples = read_samples(reader, &header)?;
        Ok(Wav {
            samples,
            format: FormatDescriptor::from(&header.fmt),
            list: header.list,
        })
    }

    pub fn n_channels(&self) -> u16 {
        self.format.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.format.sample_rate()
    }

    pub fn n_frames(&self) -> usize {
        self.samples.n_frames(self.format.channels)
    }

    /// Duration in seconds.
    pub fn duration(&self) -> f64 {
        self.n_frames() as f64 / self.sample_rate() as f64
    }

    /// Writes the samples to `path` in the canonical layout.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> WavResult<()> {
        write_with(path, &self.samples, &self.format, &EncodeOptions::default(), |f| f)
    }

    pub fn into_parts(self) -> (Samples, FormatDescriptor) {
        (self.samples, self.format)
    }
}

/// Seeks to the first sample and reads exactly the number of samples the header calls for.
fn read_samples<R: Read + Seek>(reader: &mut R, header: &WavHeader) -> WavResult<Samples> {
    let required = header.sample_bytes();
    let file_size = header.riff.file_length as u64 + CHUNK_HEADER_SIZE as u64;
    let available = file_size.saturating_sub(header.data_offset);
    if required > available {
        return Err(WavError::TruncatedSampleData {
            required,
            available,
        });
    }

    reader.seek(SeekFrom::Start(header.data_offset))?;
    let mut bytes = vec![0u8; required as usize];
    match reader.read_exact(&mut bytes) {
        Ok(()) => Ok(Samples::from_le_bytes(&bytes)),
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => Err(WavError::TruncatedSampleData {
            required,
            available,
        }),
        Err(e) => Err(e.into()),
    }
}

/// The four chunks of the canonical layout, sized for `samples`.
fn canonical_chunks(
    samples: &[i16],
    format: &FormatDescriptor,
) -> WavResult<(RiffChunk, FmtChunk, FactChunk, DataChunk)> {
    if !format.is_writable() {
        return Err(WavError::InvalidChannelCount(format.channels));
    }
    if samples.len() % format.channels as usize != 0 {
        return Err(WavError::MisalignedSampleBuffer {
            samples: samples.len(),
            channels: format.channels,
        });
    }

    let fmt = FmtChunk::from(format);
    // everything but the sample bytes must still fit in the u32 length fields
    let overhead = (RIFF_HEADER_SIZE + CHUNK_HEADER_SIZE) as u32
        + fmt.total_size()
        + FactChunk::default().total_size();
    let data_size = samples
        .len()
        .checked_mul(BYTES_PER_SAMPLE)
        .and_then(|n| u32::try_from(n).ok())
        .filter(|n| n.checked_add(overhead).is_some())
        .ok_or(WavError::SampleBufferTooLarge(samples.len()))?;

    let fact = FactChunk::new((samples.len() / format.channels as usize) as u32);
    let data = DataChunk::new(data_size);
    let riff = RiffChunk::enclosing(fmt.total_size() + fact.total_size() + data.total_size());
    Ok((riff, fmt, fact, data))
}

/// Serializes `samples` in the canonical layout: RIFF header, a 16 byte fmt chunk, a fact chunk
/// and the data chunk, in that order.
///
/// Any LIST metadata the samples were decoded alongside is not written.
pub fn encode_to<W: Write>(
    writer: &mut W,
    samples: &[i16],
    format: &FormatDescriptor,
) -> WavResult<()> {
    let chunks = canonical_chunks(samples, format)?;
    write_canonical(writer, &chunks, samples)
}

fn write_canonical<W: Write>(
    writer: &mut W,
    (riff, fmt, fact, data): &(RiffChunk, FmtChunk, FactChunk, DataChunk),
    samples: &[i16],
) -> WavResult<()> {
    writer.write_all(&riff.as_bytes())?;
    writer.write_all(&fmt.as_bytes())?;
    writer.write_all(&fact.as_bytes())?;
    writer.write_all(&data.as_bytes())?;
    writer.write_all(&Samples::from(samples).to_le_bytes())?;
    Ok(())
}

/// Path of the temporary file written next to `path` before it is renamed over it.
pub fn temp_path_for(path: &Path) -> PathBuf {
    let mut tmp_name = match path.file_name() {
        Some(name) => OsString::from(name),
        None => OsString::from("out.wav"),
    };
    tmp_name.push(".tmp");
    path.with_file_name(tmp_name)
}

/// Writes `samples` to `path` in the canonical layout, going through a temporary file in the
/// same directory that is renamed over `path` once it is complete.
///
/// `wrap` receives the freshly created temporary file and returns the writer the chunks are
/// written through. If anything fails before the rename the temporary file is removed and
/// `path` is left untouched.
pub fn write_with<P, W, F>(
    path: P,
    samples: &[i16],
    format: &FormatDescriptor,
    options: &EncodeOptions,
    wrap: F,
) -> WavResult<()>
where
    P: AsRef<Path>,
    W: Write,
    F: FnOnce(File) -> W,
{
    let path = path.as_ref();
    let chunks = canonical_chunks(samples, format)?;
    let tmp_path = temp_path_for(path);

    let write_failure = |source: std::io::Error| WavError::WriteFailure {
        path: tmp_path.clone(),
        source,
    };

    match std::fs::remove_file(&tmp_path) {
        Ok(()) => {
            log!(
                log::Level::Warn,
                "Removed stale temporary file {}",
                tmp_path.display()
            );
        }
        Err(e) if e.kind() == ErrorKind::NotFound => (),
        Err(e) => return Err(write_failure(e)),
    }

    log!(
        options.level(),
        "Writing {} bytes ({}) to {}",
        chunks.0.total_size(),
        format,
        tmp_path.display()
    );

    let written = File::create(&tmp_path)
        .map_err(write_failure)
        .and_then(|f| {
            // the sync has to go through a handle opened for writing
            let handle = f.try_clone().map_err(write_failure)?;
            let mut buf_writer = BufWriter::new(wrap(f));
            write_canonical(&mut buf_writer, &chunks, samples).map_err(|e| match e {
                WavError::Io(source) => write_failure(source),
                other => other,
            })?;
            buf_writer
                .into_inner()
                .map_err(|e| write_failure(e.into_error()))?
                .flush()
                .map_err(write_failure)?;
            handle.sync_all().map_err(write_failure)
        });

    if let Err(e) = written {
        discard(&tmp_path);
        return Err(e);
    }

    if let Err(source) = std::fs::rename(&tmp_path, path) {
        discard(&tmp_path);
        return Err(WavError::RenameFailure {
            from: tmp_path,
            to: path.to_path_buf(),
            source,
        });
    }

    log!(options.level(), "Wrote wav file to {}", path.display());
    Ok(())
}

fn discard(tmp_path: &Path) {
    if let Err(_e) = std::fs::remove_file(tmp_path) {
        log!(
            log::Level::Warn,
            "Failed to remove temporary file {}: {}",
            tmp_path.display(),
            _e
        );
    }
}
