use std::{fmt::Display, time::Duration};

use pcmwav::{FormatDescriptor, Samples, SAMPLE_RATE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BenchType {
    Decode,
    Encode,
    Ripple,
}

impl Display for BenchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BenchType::Decode => write!(f, "decode"),
            BenchType::Encode => write!(f, "encode"),
            BenchType::Ripple => write!(f, "ripple"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PcmBenchConfig {
    pub format: FormatDescriptor,
    pub duration: Duration,
}

impl PcmBenchConfig {
    pub fn n_samples(&self) -> usize {
        let frames = (self.duration.as_secs_f64() * SAMPLE_RATE as f64).ceil() as usize;
        frames * self.format.channels as usize
    }

    pub fn name(&self) -> String {
        format!(
            "{}ch_{}s",
            self.format.channels,
            self.duration.as_secs_f32()
        )
    }
}

pub fn generate_bench_configs() -> Vec<PcmBenchConfig> {
    let durations = [1, 10, 60].map(Duration::from_secs);
    [FormatDescriptor::mono(), FormatDescriptor::stereo()]
        .into_iter()
        .flat_map(|format| {
            durations
                .iter()
                .map(move |&duration| PcmBenchConfig { format, duration })
        })
        .collect()
}

/// An A4 sine at half scale, the same tone on every channel.
pub fn generate_test_signal(config: &PcmBenchConfig) -> Samples {
    let channels = config.format.channels as usize;
    let freq = 440.0; // A4

    let data: Vec<i16> = (0..config.n_samples())
        .map(|i| {
            let t = (i / channels) as f64 / SAMPLE_RATE as f64;
            ((t * freq * std::f64::consts::TAU).sin() * 0.5 * i16::MAX as f64) as i16
        })
        .collect();
    Samples::from(data)
}
