use crate::audio::device::{AudioInput, MagnitudeFrame};
use crate::config::{FREQUENCY_BIN_COUNT, SimulationConfig};
use crate::error::Result;
use crate::math::{Real, unit_rescale};

/// Rescale raw loudness onto `[0, 1]` through the configured thresholds.
#[inline]
pub fn normalize_volume(raw_volume: Real, config: &SimulationConfig) -> Real {
    unit_rescale(
        raw_volume,
        config.volume_threshold_min,
        config.volume_threshold_max,
    )
}

/// Mean of a magnitude frame, in `[0, 255]`.
#[inline]
pub fn mean_magnitude(bins: &MagnitudeFrame) -> Real {
    let sum: u32 = bins.iter().map(|&b| u32::from(b)).sum();
    sum as Real / bins.len() as Real
}

/// Owns the audio input for the duration of a listening session and turns
/// each frame's spectrum into one loudness value.
///
/// At most one stream is held at a time; `start` on an active sampler keeps
/// the existing stream.
pub struct VolumeSampler<I: AudioInput> {
    input: I,
    stream: Option<I::Stream>,
    bins: MagnitudeFrame,
}

impl<I: AudioInput> VolumeSampler<I> {
    pub fn new(input: I) -> Self {
        Self {
            input,
            stream: None,
            bins: [0; FREQUENCY_BIN_COUNT],
        }
    }

    /// Acquire the input device.
    ///
    /// # Errors
    ///
    /// Propagates the device's `Device` error; the sampler stays inactive.
    pub fn start(&mut self) -> Result<()> {
        if self.stream.is_some() {
            return Ok(());
        }
        self.stream = Some(self.input.request_access()?);
        Ok(())
    }

    /// Mean magnitude of the current window, or `None` while inactive.
    pub fn sample(&mut self) -> Option<Real> {
        let stream = self.stream.as_mut()?;
        self.input.read_frequency_magnitudes(stream, &mut self.bins);
        Some(mean_magnitude(&self.bins))
    }

    /// Release the device. Returns whether a stream was actually released.
    pub fn stop(&mut self) -> bool {
        match self.stream.take() {
            Some(stream) => {
                self.input.release(stream);
                true
            }
            None => false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.stream.is_some()
    }
}

impl<I: AudioInput> Drop for VolumeSampler<I> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::ScriptedInput;

    #[test]
    fn normalization_is_clamped() {
        let config = SimulationConfig::default();
        assert_eq!(normalize_volume(0.0, &config), 0.0);
        assert_eq!(normalize_volume(config.volume_threshold_min, &config), 0.0);
        assert_eq!(normalize_volume(config.volume_threshold_max, &config), 1.0);
        assert_eq!(normalize_volume(255.0, &config), 1.0);
        assert!((normalize_volume(55.0, &config) - 0.5).abs() < 1e-6);
        for raw in 0..=255 {
            let n = normalize_volume(raw as Real, &config);
            assert!((0.0..=1.0).contains(&n));
        }
    }

    #[test]
    fn mean_of_mixed_frame() {
        let mut bins = [0u8; FREQUENCY_BIN_COUNT];
        bins[..64].fill(200);
        assert_eq!(mean_magnitude(&bins), 100.0);
    }

    #[test]
    fn inactive_sampler_yields_nothing() {
        let mut sampler = VolumeSampler::new(ScriptedInput::constant(90));
        assert_eq!(sampler.sample(), None);
        assert!(!sampler.stop());
    }

    #[test]
    fn active_sampler_reports_mean_level() {
        let mut sampler = VolumeSampler::new(ScriptedInput::constant(90));
        sampler.start().unwrap();
        sampler.start().unwrap();
        assert_eq!(sampler.sample(), Some(90.0));
        assert!(sampler.stop());
        assert!(!sampler.is_active());
        assert_eq!(sampler.sample(), None);
    }

    #[test]
    fn failed_start_leaves_sampler_inactive() {
        let mut sampler = VolumeSampler::new(ScriptedInput::unavailable());
        assert!(sampler.start().is_err());
        assert!(!sampler.is_active());
    }
}
