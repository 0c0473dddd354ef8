//! Byte-scaled magnitude spectrum of the most recent input window
//!
//! Blackman window, forward FFT, magnitudes scaled by 1/N, exponential
//! smoothing against the previous frame, then decibels mapped linearly from
//! [MIN_DECIBELS, MAX_DECIBELS] onto 0..=255.

use std::sync::Arc;

use rustfft::num_complex::Complex32;
use rustfft::{Fft, FftPlanner};

use crate::config::{
    FFT_SIZE, FREQUENCY_BIN_COUNT, MAX_DECIBELS, MIN_DECIBELS, SMOOTHING_TIME_CONSTANT,
};
use crate::math::Real;

/// Classic Blackman window (alpha = 0.16), periodic form.
pub fn blackman_window(n: usize) -> Vec<Real> {
    let alpha = 0.16;
    let a0 = 0.5 * (1.0 - alpha);
    let a1 = 0.5;
    let a2 = 0.5 * alpha;
    let two_pi = std::f32::consts::PI * 2.0;
    (0..n)
        .map(|i| {
            let phi = two_pi * i as Real / n as Real;
            a0 - a1 * phi.cos() + a2 * (2.0 * phi).cos()
        })
        .collect()
}

pub struct FrequencyAnalyser {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<Real>,
    smoothed: Vec<Real>,
    buffer: Vec<Complex32>,
}

impl FrequencyAnalyser {
    pub fn new() -> Self {
        let mut planner = FftPlanner::<f32>::new();
        Self {
            fft: planner.plan_fft_forward(FFT_SIZE),
            window: blackman_window(FFT_SIZE),
            smoothed: vec![0.0; FREQUENCY_BIN_COUNT],
            buffer: vec![Complex32::new(0.0, 0.0); FFT_SIZE],
        }
    }

    /// Forget the smoothing history.
    pub fn reset(&mut self) {
        self.smoothed.iter_mut().for_each(|m| *m = 0.0);
    }

    /// Analyse the newest `FFT_SIZE` samples (older ones are ignored, a short
    /// input is zero-padded at the front) into `out`.
    pub fn analyse(&mut self, samples: &[Real], out: &mut [u8; FREQUENCY_BIN_COUNT]) {
        let recent = &samples[samples.len().saturating_sub(FFT_SIZE)..];
        let pad = FFT_SIZE - recent.len();

        for (i, slot) in self.buffer.iter_mut().enumerate() {
            let sample = if i < pad { 0.0 } else { recent[i - pad] };
            *slot = Complex32::new(sample * self.window[i], 0.0);
        }
        self.fft.process(&mut self.buffer);

        let scale = 1.0 / FFT_SIZE as Real;
        let db_range = MAX_DECIBELS - MIN_DECIBELS;
        for (bin, (smoothed, byte)) in self.smoothed.iter_mut().zip(out.iter_mut()).enumerate() {
            let magnitude = self.buffer[bin].norm() * scale;
            *smoothed = SMOOTHING_TIME_CONSTANT * *smoothed
                + (1.0 - SMOOTHING_TIME_CONSTANT) * magnitude;

            *byte = if *smoothed > 0.0 {
                let db = 20.0 * smoothed.log10();
                (255.0 * (db - MIN_DECIBELS) / db_range).clamp(0.0, 255.0) as u8
            } else {
                0
            };
        }
    }
}

impl Default for FrequencyAnalyser {
    fn default() -> Self {
        Self::new()
    }
}
