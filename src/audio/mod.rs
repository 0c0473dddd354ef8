//! Microphone loudness sampling
//!
//! * `device` - the input boundary plus cpal and scripted implementations
//! * `analyser` - byte-scaled frequency magnitudes of the latest window
//! * `sampler` - per-frame mean loudness and threshold normalization

pub mod analyser;
pub mod device;
pub mod sampler;

pub use analyser::FrequencyAnalyser;
pub use device::{
    AudioInput, CpalInput, CpalStream, MagnitudeFrame, ScriptedInput, ScriptedStream,
};
pub use sampler::{VolumeSampler, mean_magnitude, normalize_volume};
