use std::fs::File;
use std::io::{self, Cursor, Write};
use std::path::{Path, PathBuf};

use pcmwav::{
    encode_to, read, write, write_with, DecodeOptions, EncodeOptions, FormatDescriptor, Samples,
    Wav, WavError,
};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Assembles wav files chunk by chunk, including malformed ones.
struct WavBuilder {
    channels: u16,
    sample_rate: u32,
    byte_rate: Option<u32>,
    block_align: Option<u16>,
    bits_per_sample: u16,
    fmt_len: u32,
    list: Option<Vec<u8>>,
    fact: Option<u32>,
    fact_size: u32,
    data: Vec<u8>,
    riff_len_delta: i64,
}

impl WavBuilder {
    fn new(channels: u16, samples: &[i16]) -> Self {
        WavBuilder {
            channels,
            sample_rate: 44100,
            byte_rate: None,
            block_align: None,
            bits_per_sample: 16,
            fmt_len: 16,
            list: None,
            fact: Some((samples.len() / channels.max(1) as usize) as u32),
            fact_size: 4,
            data: samples.iter().flat_map(|s| s.to_le_bytes()).collect(),
            riff_len_delta: 0,
        }
    }

    fn build(&self) -> Vec<u8> {
        let block_align = self.block_align.unwrap_or(self.channels * 2);
        let byte_rate = self
            .byte_rate
            .unwrap_or(self.sample_rate * self.channels as u32 * 2);

        let mut body = b"WAVE".to_vec();
        body.extend_from_slice(b"fmt ");
        body.extend_from_slice(&self.fmt_len.to_le_bytes());
        let fmt_start = body.len();
        body.extend_from_slice(&1u16.to_le_bytes());
        body.extend_from_slice(&self.channels.to_le_bytes());
        body.extend_from_slice(&self.sample_rate.to_le_bytes());
        body.extend_from_slice(&byte_rate.to_le_bytes());
        body.extend_from_slice(&block_align.to_le_bytes());
        body.extend_from_slice(&self.bits_per_sample.to_le_bytes());
        body.resize(fmt_start + self.fmt_len as usize, 0);
        if self.fmt_len == 40 {
            body[fmt_start + 16..fmt_start + 18].copy_from_slice(&22u16.to_le_bytes());
        }

        if let Some(list) = &self.list {
            body.extend_from_slice(b"LIST");
            body.extend_from_slice(&(list.len() as u32).to_le_bytes());
            body.extend_from_slice(list);
        }
        if let Some(frames) = self.fact {
            body.extend_from_slice(b"fact");
            body.extend_from_slice(&self.fact_size.to_le_bytes());
            body.extend_from_slice(&frames.to_le_bytes());
            body.resize(body.len() + self.fact_size.saturating_sub(4) as usize, 0);
        }
        body.extend_from_slice(b"data");
        body.extend_from_slice(&(self.data.len() as u32).to_le_bytes());
        body.extend_from_slice(&self.data);

        let mut bytes = b"RIFF".to_vec();
        let riff_len = (body.len() as i64 + self.riff_len_delta) as u32;
        bytes.extend_from_slice(&riff_len.to_le_bytes());
        bytes.extend_from_slice(&body);
        bytes
    }

    fn decode(&self) -> Result<Wav, WavError> {
        Wav::decode(&mut Cursor::new(self.build()))
    }
}

fn info_list(payload_len: usize) -> Vec<u8> {
    let mut list = b"INFO".to_vec();
    list.extend((0..payload_len).map(|i| (i % 251) as u8));
    list
}

fn random_samples(rng: &mut StdRng, len: usize) -> Vec<i16> {
    (0..len).map(|_| rng.gen::<i16>()).collect()
}

#[test]
fn round_trip_random_buffers() {
    let mut rng = StdRng::seed_from_u64(0x5741_5645);
    for channels in [1u16, 2] {
        for frames in [0usize, 1, 2, 17, 1000, 44100] {
            let samples = random_samples(&mut rng, frames * channels as usize);
            let format = FormatDescriptor::new(channels).unwrap();

            let mut bytes = Vec::new();
            encode_to(&mut bytes, &samples, &format).unwrap();
            let wav = Wav::decode(&mut Cursor::new(bytes)).unwrap();

            assert_eq!(wav.format, format);
            assert_eq!(wav.n_frames(), frames);
            assert_eq!(wav.samples, Samples::from(samples));
            assert_eq!(wav.list, None);
        }
    }
}

#[test]
fn canonical_stereo_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scenario.wav");
    let samples = [100i16, -100, 200, -200];

    write(&path, &samples, &FormatDescriptor { channels: 2 }).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    // RIFF header, fmt chunk, fact chunk, data chunk
    assert_eq!(bytes.len(), 12 + (8 + 16) + (8 + 4) + (8 + 8));
    assert_eq!(&bytes[36..40], b"fact");
    assert_eq!(u32::from_le_bytes(bytes[44..48].try_into().unwrap()), 2);
    assert_eq!(&bytes[48..52], b"data");
    assert_eq!(u32::from_le_bytes(bytes[52..56].try_into().unwrap()), 8);

    let (decoded, format) = read(&path).unwrap();
    assert_eq!(&decoded[..], &samples[..]);
    assert_eq!(format, FormatDescriptor { channels: 2 });
}

#[test]
fn fact_and_data_size_agree() {
    let samples = [1i16, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12];
    for channels in [1u16, 2] {
        let with_fact = WavBuilder::new(channels, &samples);
        let mut without_fact = WavBuilder::new(channels, &samples);
        without_fact.fact = None;

        let a = with_fact.decode().unwrap();
        let b = without_fact.decode().unwrap();
        assert_eq!(a, b);
        assert_eq!(&a.samples[..], &samples[..]);
    }
}

#[test]
fn list_chunk_does_not_change_decode() {
    let samples = [10i16, -10, 20, -20, 30, -30];
    let plain = WavBuilder::new(2, &samples).decode().unwrap();

    for payload_len in [0usize, 1, 3, 30, 1023, 5000] {
        for with_fact in [true, false] {
            let mut builder = WavBuilder::new(2, &samples);
            builder.list = Some(info_list(payload_len));
            if !with_fact {
                builder.fact = None;
            }
            let wav = builder.decode().unwrap();
            assert_eq!(wav.samples, plain.samples, "LIST payload {}", payload_len);
            assert_eq!(wav.format, plain.format);
            let list = wav.list.expect("LIST chunk not reported");
            assert_eq!(list.size as usize, payload_len + 4);
            assert!(list.is_info());
        }
    }
}

#[test]
fn non_info_list_is_accepted() {
    let mut builder = WavBuilder::new(1, &[1, 2, 3]);
    let mut list = b"adtl".to_vec();
    list.extend_from_slice(&[0; 12]);
    builder.list = Some(list);
    let wav = builder.decode().unwrap();
    assert_eq!(&wav.samples[..], &[1, 2, 3]);
    assert_eq!(wav.list.unwrap().type_id(), Some(*b"adtl"));
}

#[test]
fn list_is_dropped_on_write() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no_list.wav");
    let mut builder = WavBuilder::new(2, &[1, 2, 3, 4]);
    builder.list = Some(info_list(40));

    let wav = builder.decode().unwrap();
    assert!(wav.list.is_some());
    wav.write(&path).unwrap();

    let rewritten = Wav::from_path(&path).unwrap();
    assert_eq!(rewritten.list, None);
    assert_eq!(rewritten.samples, wav.samples);
    assert_eq!(std::fs::metadata(&path).unwrap().len(), 12 + 24 + 12 + 8 + 8);
}

#[test]
fn eighteen_byte_fmt_chunk_is_accepted() {
    let mut builder = WavBuilder::new(2, &[7, 8, 9, 10]);
    builder.fmt_len = 18;
    let wav = builder.decode().unwrap();
    assert_eq!(&wav.samples[..], &[7, 8, 9, 10]);
    assert_eq!(wav.format.channels, 2);
}

#[test]
fn rejects_length_mismatch() {
    for delta in [-2i64, 1, 100] {
        let mut builder = WavBuilder::new(1, &[0; 16]);
        builder.riff_len_delta = delta;
        assert!(matches!(
            builder.decode(),
            Err(WavError::LengthMismatch { .. })
        ));
    }
}

#[test]
fn rejects_extensible_fmt() {
    let mut builder = WavBuilder::new(2, &[0; 16]);
    builder.fmt_len = 40;
    assert!(matches!(
        builder.decode(),
        Err(WavError::UnsupportedFormatExtension(40))
    ));
}

#[test]
fn rejects_three_channels() {
    let builder = WavBuilder::new(3, &[0; 18]);
    assert!(matches!(
        builder.decode(),
        Err(WavError::UnsupportedChannelCount(3))
    ));
}

#[test]
fn rejects_inconsistent_rates() {
    let mut builder = WavBuilder::new(2, &[0; 8]);
    builder.byte_rate = Some(44100 * 2);
    assert!(matches!(
        builder.decode(),
        Err(WavError::InconsistentByteRate { .. })
    ));

    // a block align fixed at 4 is only right for stereo
    let mut builder = WavBuilder::new(1, &[0; 8]);
    builder.block_align = Some(4);
    assert!(matches!(
        builder.decode(),
        Err(WavError::InconsistentBlockAlign {
            found: 4,
            expected: 2
        })
    ));
}

#[test]
fn rejects_other_formats() {
    let mut builder = WavBuilder::new(1, &[0; 8]);
    builder.sample_rate = 48000;
    builder.byte_rate = Some(96000);
    assert!(matches!(
        builder.decode(),
        Err(WavError::UnsupportedSampleRate { found: 48000, .. })
    ));

    let mut builder = WavBuilder::new(1, &[0; 8]);
    builder.bits_per_sample = 8;
    assert!(matches!(
        builder.decode(),
        Err(WavError::UnsupportedBitDepth(8))
    ));

    let mut builder = WavBuilder::new(1, &[0; 8]);
    builder.fmt_len = 20;
    assert!(matches!(
        builder.decode(),
        Err(WavError::InvalidFormatChunk(_))
    ));
}

#[test]
fn rejects_bad_fact_chunk() {
    let mut builder = WavBuilder::new(1, &[0; 8]);
    builder.fact_size = 8;
    assert!(matches!(builder.decode(), Err(WavError::InvalidFactChunk(8))));
}

#[test]
fn rejects_missing_data_chunk() {
    let mut bytes = WavBuilder::new(1, &[0; 8]).build();
    // rename the data tag
    let pos = bytes.windows(4).position(|w| w == b"data").unwrap();
    bytes[pos..pos + 4].copy_from_slice(b"junk");
    assert!(matches!(
        Wav::decode(&mut Cursor::new(bytes)),
        Err(WavError::MissingDataChunk { .. })
    ));
}

#[test]
fn rejects_truncated_files() {
    let bytes = WavBuilder::new(1, &[0; 8]).build();
    assert!(matches!(
        Wav::decode(&mut Cursor::new(bytes[..40].to_vec())),
        Err(WavError::TruncatedFile { read: 40, .. })
    ));
    assert!(matches!(
        Wav::decode(&mut Cursor::new(Vec::new())),
        Err(WavError::TruncatedFile { read: 0, .. })
    ));
}

#[test]
fn rejects_truncated_sample_data() {
    let mut builder = WavBuilder::new(2, &[0; 8]);
    builder.fact = Some(100);
    assert!(matches!(
        builder.decode(),
        Err(WavError::TruncatedSampleData { required: 400, .. })
    ));
}

#[test]
fn rejects_bad_magic() {
    let mut bytes = WavBuilder::new(1, &[0; 8]).build();
    bytes[8..12].copy_from_slice(b"WAVX");
    assert!(matches!(
        Wav::decode(&mut Cursor::new(bytes)),
        Err(WavError::InvalidMagic { .. })
    ));
}

/// Writes through to a file until its budget runs out, then fails like a full disk.
struct FailAfter {
    inner: File,
    budget: usize,
}

impl Write for FailAfter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.budget == 0 {
            return Err(io::Error::new(io::ErrorKind::Other, "no space left on device"));
        }
        let n = self.inner.write(&buf[..buf.len().min(self.budget)])?;
        self.budget -= n;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

fn temp_files(dir: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.extension().map_or(false, |ext| ext == "tmp"))
        .collect()
}

#[test]
fn failed_write_leaves_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.wav");
    let samples = vec![42i16; 10_000];

    for budget in [0usize, 10, 44, 9_000] {
        let result = write_with(
            &path,
            &samples,
            &FormatDescriptor::mono(),
            &EncodeOptions::default(),
            |inner| FailAfter { inner, budget },
        );
        assert!(matches!(result, Err(WavError::WriteFailure { .. })));
        assert!(!path.exists(), "destination created with budget {}", budget);
        assert!(temp_files(dir.path()).is_empty());
    }
}

#[test]
fn failed_write_keeps_previous_contents() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.wav");
    write(&path, &[1, 2, 3, 4], &FormatDescriptor::stereo()).unwrap();
    let before = std::fs::read(&path).unwrap();

    let result = write_with(
        &path,
        &[9; 4000],
        &FormatDescriptor::stereo(),
        &EncodeOptions::verbose(),
        |inner| FailAfter { inner, budget: 100 },
    );

    assert!(matches!(result, Err(WavError::WriteFailure { .. })));
    assert_eq!(std::fs::read(&path).unwrap(), before);
    assert!(temp_files(dir.path()).is_empty());
}

#[test]
fn stale_temp_file_is_replaced() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.wav");
    std::fs::write(dir.path().join("out.wav.tmp"), b"left over from a crash").unwrap();

    write(&path, &[3, 1, 4, 1], &FormatDescriptor::mono()).unwrap();

    let (samples, _) = read(&path).unwrap();
    assert_eq!(&samples[..], &[3, 1, 4, 1]);
    assert!(temp_files(dir.path()).is_empty());
}

#[test]
fn rename_failure_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.wav");
    std::fs::create_dir(&path).unwrap();

    let result = write(&path, &[1, 2], &FormatDescriptor::mono());

    assert!(matches!(result, Err(WavError::RenameFailure { .. })));
    assert!(path.is_dir());
    assert!(temp_files(dir.path()).is_empty());
}

#[cfg(unix)]
#[test]
fn sync_goes_through_the_written_handle() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.wav");
    let tmp_path = pcmwav::core::temp_path_for(&path);

    // unlinking the temp file leaves the open handle usable, but not its path
    let result = write_with(
        &path,
        &[1, 2, 3, 4],
        &FormatDescriptor::stereo(),
        &EncodeOptions::default(),
        |file| {
            std::fs::remove_file(&tmp_path).unwrap();
            file
        },
    );

    assert!(matches!(result, Err(WavError::RenameFailure { .. })));
    assert!(!path.exists());
    assert!(temp_files(dir.path()).is_empty());
}

#[test]
fn wrapper_is_created_once_after_preconditions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.wav");
    let mut calls = 0;

    let result = write_with(
        &path,
        &[1, 2, 3],
        &FormatDescriptor::stereo(),
        &EncodeOptions::default(),
        |file| {
            calls += 1;
            file
        },
    );
    assert!(matches!(result, Err(WavError::MisalignedSampleBuffer { .. })));
    assert_eq!(calls, 0);

    write_with(
        &path,
        &[1, 2, 3, 4],
        &FormatDescriptor::stereo(),
        &EncodeOptions::default(),
        |file| {
            calls += 1;
            file
        },
    )
    .unwrap();
    assert_eq!(calls, 1);
    let (samples, _) = read(&path).unwrap();
    assert_eq!(&samples[..], &[1, 2, 3, 4]);
}

#[test]
fn invalid_channel_count_fails_before_io() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.wav");
    let result = write(&path, &[0; 6], &FormatDescriptor { channels: 3 });
    assert!(matches!(result, Err(WavError::InvalidChannelCount(3))));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn hound_reads_our_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ours.wav");
    let mut rng = StdRng::seed_from_u64(7);
    let samples = random_samples(&mut rng, 2 * 500);

    write(&path, &samples, &FormatDescriptor::stereo()).unwrap();

    let mut reader = hound::WavReader::open(&path).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.channels, 2);
    assert_eq!(spec.sample_rate, 44100);
    assert_eq!(spec.bits_per_sample, 16);
    let theirs: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
    assert_eq!(theirs, samples);
}

#[test]
fn we_read_hound_files() {
    let dir = tempfile::tempdir().unwrap();
    let mut rng = StdRng::seed_from_u64(11);

    for channels in [1u16, 2] {
        let path = dir.path().join(format!("hound_{}.wav", channels));
        let samples = random_samples(&mut rng, channels as usize * 300);
        let spec = hound::WavSpec {
            channels,
            sample_rate: 44100,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for s in &samples {
            writer.write_sample(*s).unwrap();
        }
        writer.finalize().unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[12..16], b"fmt ");
        assert_eq!(u32::from_le_bytes(bytes[16..20].try_into().unwrap()), 16);
        // no fact chunk, so the sample count comes from the data size
        assert_eq!(&bytes[36..40], b"data");

        let (decoded, format) = read(&path).unwrap();
        assert_eq!(format.channels, channels);
        assert_eq!(&decoded[..], &samples[..]);
    }
}

#[test]
fn verbose_decode_matches_default() {
    let bytes = WavBuilder::new(2, &[5, 6, 7, 8]).build();
    let a = Wav::decode(&mut Cursor::new(bytes.clone())).unwrap();
    let b = Wav::decode_with(&mut Cursor::new(bytes), &DecodeOptions::verbose()).unwrap();
    assert_eq!(a, b);
}
