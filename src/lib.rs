//! Voice-reactive bouncing balls.
//!
//! A field of balls rests on the ground; microphone loudness launches the
//! ones touching it. The core (`audio`, `solver`, `simulation`) is host
//! agnostic; `plugin` runs it inside a Bevy window.

pub mod audio;
pub mod config;
pub mod core;
pub mod error;
pub mod feedback;
pub mod math;
pub mod plugin;
pub mod simulation;
pub mod solver;

// Public re-exports for clean API
pub use audio::{AudioInput, CpalInput, ScriptedInput, VolumeSampler, normalize_volume};
pub use config::SimulationConfig;
pub use core::{BodyId, BodySet, ContainerBounds, ParticleBody, SimulationState};
pub use error::{FreePlayError, Result};
pub use feedback::VoiceFeedback;
pub use plugin::FreePlayPlugin;
pub use simulation::{
    FrameHandle, FrameQueue, FrameReport, FrameScheduler, LoopState, RenderSurface, SimulationLoop,
};
pub use solver::{FrameInput, ImpulseModel, PhysicsStepper};
