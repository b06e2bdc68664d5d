//! In-place transforms applied to decoded samples before they are written back out.
use std::f64::consts::{FRAC_PI_2, TAU};

use crate::{
    chunks::SAMPLE_RATE,
    core::{FormatDescriptor, Samples},
    error::{WavError, WavResult},
    log,
};

/// Full-scale amplitude of the generated signal.
const MAX_VOLUME: f64 = (1 << 15) as f64;
/// Keeps full-scale output just inside the i16 range.
const HEADROOM: f64 = 0.9999;

/// Mixes an amplitude-modulated cosine into the existing signal.
///
/// Each sample becomes `old * (1 - a) + a * 32768 * cos(2π f t) * cos(2π m t) * gain`, where `t`
/// is the time of the sample's frame and `gain` pans the generated signal between the left and
/// right channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SineRipple {
    /// Frequency of the generated tone in Hz, 40 to 15000.
    pub freq: f64,
    /// Frequency of the modulating envelope in Hz, 0.1 to 10000.
    pub modulating_freq: f64,
    /// Share of the output taken by the generated tone, 0 to 1.
    pub fractional_amplitude: f64,
    /// Pan of the generated tone, -1 (left) to 1 (right). Must be 0 for mono input.
    pub left_right: f64,
}

impl Default for SineRipple {
    fn default() -> Self {
        SineRipple {
            freq: 440.0,
            modulating_freq: 1.0,
            fractional_amplitude: 0.2,
            left_right: 0.0,
        }
    }
}

fn check_range(name: &'static str, value: f64, min: f64, max: f64) -> WavResult<()> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(WavError::ParameterOutOfRange {
            name,
            value,
            min,
            max,
        })
    }
}

impl SineRipple {
    /// Checks every parameter against its allowed range.
    pub fn validate(&self, format: &FormatDescriptor) -> WavResult<()> {
        check_range("left_right", self.left_right, -1.0, 1.0)?;
        check_range("fractional_amplitude", self.fractional_amplitude, 0.0, 1.0)?;
        check_range("freq", self.freq, 40.0, 15000.0)?;
        check_range("modulating_freq", self.modulating_freq, 0.1, 10000.0)?;
        match format.channels {
            1 => check_range("left_right", self.left_right, 0.0, 0.0),
            2 => Ok(()),
            n => Err(WavError::UnsupportedChannelCount(n)),
        }
    }

    /// Per-channel gain of the generated signal. Stereo uses a constant-power pan.
    pub fn channel_gains(&self, format: &FormatDescriptor) -> Vec<f64> {
        match format.channels {
            2 => {
                let angle = (self.left_right + 1.0) / 2.0 * FRAC_PI_2;
                vec![angle.cos(), angle.sin()]
            }
            _ => vec![1.0],
        }
    }

    /// Applies the ripple to `samples` in place.
    pub fn apply(&self, samples: &mut Samples, format: &FormatDescriptor) -> WavResult<()> {
        self.validate(format)?;
        let gains = self.channel_gains(format);
        log!(
            log::Level::Debug,
            "Applying {:?} to {} samples with channel gains {:?}",
            self,
            samples.len(),
            gains
        );

        let a = self.fractional_amplitude;
        for (frame_idx, frame) in samples.chunks_mut(gains.len()).enumerate() {
            let t = frame_idx as f64 / SAMPLE_RATE as f64;
            let envelope =
                MAX_VOLUME * a * (TAU * self.freq * t).cos() * (TAU * self.modulating_freq * t).cos();
            for (sample, gain) in frame.iter_mut().zip(gains.iter()) {
                let mixed = (*sample as f64 * (1.0 - a) + envelope * gain) * HEADROOM;
                *sample = mixed.clamp(i16::MIN as f64, i16::MAX as f64) as i16;
            }
        }
        Ok(())
    }
}
