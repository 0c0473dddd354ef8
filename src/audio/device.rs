//! Audio input devices
//!
//! `AudioInput` is the boundary to whatever produces microphone data. The
//! live implementation captures the default input device through cpal;
//! `ScriptedInput` replays fixed magnitudes for headless runs.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, SizedSample, Stream, StreamConfig};

use crate::audio::analyser::FrequencyAnalyser;
use crate::config::{FFT_SIZE, FREQUENCY_BIN_COUNT};
use crate::error::{FreePlayError, Result};
use crate::math::Real;

/// One analyser frame of byte-range magnitudes.
pub type MagnitudeFrame = [u8; FREQUENCY_BIN_COUNT];

pub trait AudioInput {
    /// Open handle to an acquired device.
    type Stream;

    /// Acquire the device.
    ///
    /// # Errors
    ///
    /// `Device` when no device is present or access is denied.
    fn request_access(&mut self) -> Result<Self::Stream>;

    /// Fill `out` with the magnitudes of the current input window.
    fn read_frequency_magnitudes(&mut self, stream: &mut Self::Stream, out: &mut MagnitudeFrame);

    /// Give the device back. Called once per acquired stream.
    fn release(&mut self, stream: Self::Stream) {
        drop(stream);
    }
}

/// Most recent mono samples from the capture callback.
#[derive(Debug)]
struct SampleRing {
    samples: VecDeque<Real>,
}

impl SampleRing {
    fn new() -> Self {
        Self {
            samples: VecDeque::from(vec![0.0; FFT_SIZE]),
        }
    }

    fn push_interleaved<T>(&mut self, data: &[T], channels: usize)
    where
        T: Sample,
        f32: FromSample<T>,
    {
        for frame in data.chunks(channels.max(1)) {
            let sum: f32 = frame.iter().map(|&s| f32::from_sample(s)).sum();
            self.samples.push_back(sum / frame.len() as f32);
        }
        while self.samples.len() > FFT_SIZE {
            self.samples.pop_front();
        }
    }

    fn copy_into(&self, out: &mut Vec<Real>) {
        out.clear();
        out.extend(self.samples.iter().copied());
    }
}

/// Live stream on the default input device.
pub struct CpalStream {
    _stream: Stream,
    ring: Arc<Mutex<SampleRing>>,
}

/// Captures the default input device through cpal.
pub struct CpalInput {
    analyser: FrequencyAnalyser,
    window: Vec<Real>,
}

impl CpalInput {
    pub fn new() -> Self {
        Self {
            analyser: FrequencyAnalyser::new(),
            window: Vec::with_capacity(FFT_SIZE),
        }
    }

    fn build_stream<T>(
        device: &cpal::Device,
        config: &StreamConfig,
        ring: Arc<Mutex<SampleRing>>,
    ) -> Result<Stream>
    where
        T: SizedSample,
        f32: FromSample<T>,
    {
        let channels = config.channels as usize;
        device
            .build_input_stream(
                config,
                move |data: &[T], _: &cpal::InputCallbackInfo| {
                    if let Ok(mut ring) = ring.lock() {
                        ring.push_interleaved(data, channels);
                    }
                },
                |err| {
                    tracing::error!(error = %err, "audio capture error");
                },
                None,
            )
            .map_err(|e| FreePlayError::Device(e.to_string()))
    }
}

impl Default for CpalInput {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioInput for CpalInput {
    type Stream = CpalStream;

    fn request_access(&mut self) -> Result<CpalStream> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| FreePlayError::Device("no input device available".to_string()))?;

        let supported = device
            .default_input_config()
            .map_err(|e| FreePlayError::Device(e.to_string()))?;
        let sample_format = supported.sample_format();
        let config = supported.config();

        let ring = Arc::new(Mutex::new(SampleRing::new()));
        let stream = match sample_format {
            SampleFormat::F32 => Self::build_stream::<f32>(&device, &config, Arc::clone(&ring))?,
            SampleFormat::I16 => Self::build_stream::<i16>(&device, &config, Arc::clone(&ring))?,
            SampleFormat::U16 => Self::build_stream::<u16>(&device, &config, Arc::clone(&ring))?,
            other => {
                return Err(FreePlayError::Device(format!(
                    "unsupported sample format {other:?}"
                )));
            }
        };
        stream
            .play()
            .map_err(|e| FreePlayError::Device(e.to_string()))?;

        self.analyser.reset();
        tracing::debug!(
            device = device.name().unwrap_or_default(),
            sample_rate = config.sample_rate.0,
            channels = config.channels,
            "audio capture started"
        );

        Ok(CpalStream {
            _stream: stream,
            ring,
        })
    }

    fn read_frequency_magnitudes(&mut self, stream: &mut CpalStream, out: &mut MagnitudeFrame) {
        match stream.ring.lock() {
            Ok(ring) => ring.copy_into(&mut self.window),
            Err(_) => self.window.clear(),
        }
        self.analyser.analyse(&self.window, out);
    }

    fn release(&mut self, stream: CpalStream) {
        drop(stream);
        tracing::debug!("audio capture stopped");
    }
}

/// Deterministic input reporting scripted magnitudes for every bin.
///
/// Each read advances through `levels`, wrapping at the end.
#[derive(Debug, Clone)]
pub struct ScriptedInput {
    levels: Vec<u8>,
    available: bool,
}

/// Cursor into a [`ScriptedInput`] script.
#[derive(Debug)]
pub struct ScriptedStream {
    cursor: usize,
}

impl ScriptedInput {
    pub fn constant(level: u8) -> Self {
        Self::sequence(vec![level])
    }

    pub fn sequence(levels: Vec<u8>) -> Self {
        Self {
            levels,
            available: true,
        }
    }

    /// An input whose access request always fails.
    pub fn unavailable() -> Self {
        Self {
            levels: Vec::new(),
            available: false,
        }
    }
}

impl AudioInput for ScriptedInput {
    type Stream = ScriptedStream;

    fn request_access(&mut self) -> Result<ScriptedStream> {
        if !self.available {
            return Err(FreePlayError::Device(
                "scripted input has no device".to_string(),
            ));
        }
        Ok(ScriptedStream { cursor: 0 })
    }

    fn read_frequency_magnitudes(&mut self, stream: &mut ScriptedStream, out: &mut MagnitudeFrame) {
        let level = if self.levels.is_empty() {
            0
        } else {
            self.levels[stream.cursor % self.levels.len()]
        };
        stream.cursor = stream.cursor.wrapping_add(1);
        out.fill(level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_downmixes_and_keeps_latest_window() {
        let mut ring = SampleRing::new();
        let stereo: Vec<f32> = (0..(FFT_SIZE + 10) * 2)
            .map(|i| if i % 2 == 0 { 1.0 } else { 0.0 })
            .collect();
        ring.push_interleaved(&stereo, 2);

        let mut window = Vec::new();
        ring.copy_into(&mut window);
        assert_eq!(window.len(), FFT_SIZE);
        assert!(window.iter().all(|&s| (s - 0.5).abs() < 1e-6));
    }

    #[test]
    fn integer_samples_are_converted() {
        let mut ring = SampleRing::new();
        ring.push_interleaved(&[i16::MAX; 4], 1);
        let mut window = Vec::new();
        ring.copy_into(&mut window);
        assert!(window[FFT_SIZE - 1] > 0.99);
        assert_eq!(window[0], 0.0);
    }

    #[test]
    fn scripted_input_cycles_levels() {
        let mut input = ScriptedInput::sequence(vec![10, 200]);
        let mut stream = input.request_access().unwrap();
        let mut out = [0u8; FREQUENCY_BIN_COUNT];

        input.read_frequency_magnitudes(&mut stream, &mut out);
        assert!(out.iter().all(|&b| b == 10));
        input.read_frequency_magnitudes(&mut stream, &mut out);
        assert!(out.iter().all(|&b| b == 200));
        input.read_frequency_magnitudes(&mut stream, &mut out);
        assert!(out.iter().all(|&b| b == 10));
    }

    #[test]
    fn unavailable_input_reports_device_error() {
        let mut input = ScriptedInput::unavailable();
        assert!(matches!(
            input.request_access(),
            Err(FreePlayError::Device(_))
        ));
    }
}
