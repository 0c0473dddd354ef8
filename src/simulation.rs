//! Frame-driven free-play loop
//!
//! `Idle -> Listening -> Idle`. While listening, each scheduled frame samples
//! loudness, derives the launch impulse, steps every body and publishes the
//! result before the next frame is scheduled. Frames never overlap: the host
//! fires one handle at a time and stale handles are ignored.

use bevy::color::Color;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::audio::{AudioInput, VolumeSampler, normalize_volume};
use crate::config::SimulationConfig;
use crate::core::{BodyId, BodySet, ContainerBounds, SimulationState};
use crate::error::{FreePlayError, Result};
use crate::feedback::{VoiceFeedback, meter_fraction};
use crate::math::{Point, Real};
use crate::solver::{FrameInput, ImpulseModel, PhysicsStepper};

/// Token for one scheduled frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Host-side frame scheduling.
pub trait FrameScheduler {
    fn schedule_next_frame(&mut self) -> FrameHandle;
    fn cancel(&mut self, handle: FrameHandle);
}

/// Single-slot scheduler polled by the host once per display refresh.
#[derive(Debug, Default)]
pub struct FrameQueue {
    next_id: u64,
    pending: Option<FrameHandle>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out the pending frame, if any, for the host to run now.
    pub fn take_due(&mut self) -> Option<FrameHandle> {
        self.pending.take()
    }

    pub fn pending(&self) -> Option<FrameHandle> {
        self.pending
    }
}

impl FrameScheduler for FrameQueue {
    fn schedule_next_frame(&mut self) -> FrameHandle {
        let handle = FrameHandle(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.pending = Some(handle);
        handle
    }

    fn cancel(&mut self, handle: FrameHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
        }
    }
}

/// Where body positions go each frame. Coordinates are container-local with
/// y measured up from the bottom edge.
pub trait RenderSurface {
    fn bounds(&self) -> ContainerBounds;
    fn publish(&mut self, id: BodyId, position: Point, radius: Real, color: Color);
    /// Drop every published body.
    fn clear(&mut self);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Listening,
}

/// What one frame measured.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameReport {
    pub raw_volume: Real,
    pub normalized_volume: Real,
    pub impulse: Real,
    pub meter: Real,
    pub feedback: VoiceFeedback,
}

pub struct SimulationLoop<I: AudioInput, S: FrameScheduler> {
    config: SimulationConfig,
    impulse: ImpulseModel,
    sampler: VolumeSampler<I>,
    scheduler: S,
    stepper: PhysicsStepper<StdRng>,
    spawn_rng: StdRng,
    state: Option<SimulationState>,
    pending: Option<FrameHandle>,
}

impl<I: AudioInput, S: FrameScheduler> SimulationLoop<I, S> {
    /// Build an idle loop. All randomness derives from `seed`.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` when `config` breaks an invariant.
    pub fn new(config: SimulationConfig, input: I, scheduler: S, seed: u64) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            impulse: ImpulseModel::from_config(&config),
            stepper: PhysicsStepper::new(&config, StdRng::seed_from_u64(seed)),
            spawn_rng: StdRng::seed_from_u64(seed.rotate_left(32) ^ 0x5EED),
            sampler: VolumeSampler::new(input),
            scheduler,
            config,
            state: None,
            pending: None,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn state(&self) -> Option<&SimulationState> {
        self.state.as_ref()
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn is_in_free_play(&self) -> bool {
        self.state.is_some()
    }

    pub fn loop_state(&self) -> LoopState {
        match &self.state {
            Some(state) if state.is_listening() => LoopState::Listening,
            _ => LoopState::Idle,
        }
    }

    /// Create a fresh body field sized to the surface. Re-entering replaces
    /// the previous field.
    pub fn enter_free_play(&mut self, surface: &mut dyn RenderSurface) {
        if self.state.is_some() {
            self.stop_listening(surface);
            surface.clear();
        }

        let bounds = surface.bounds();
        if !bounds.is_laid_out() {
            tracing::warn!(
                width = bounds.width,
                height = bounds.height,
                "entering free play before the surface is laid out"
            );
        }
        let bodies = BodySet::spawn(&self.config, bounds.width, &mut self.spawn_rng);
        publish_bodies(&bodies, surface);
        tracing::info!(bodies = bodies.len(), width = bounds.width, "entered free play");
        self.state = Some(SimulationState::new(bodies, bounds));
    }

    /// Stop listening if needed and tear the field down. No-op outside free play.
    pub fn exit_free_play(&mut self, surface: &mut dyn RenderSurface) {
        if self.state.is_none() {
            return;
        }
        self.stop_listening(surface);
        surface.clear();
        self.state = None;
        tracing::info!("left free play");
    }

    /// Acquire the microphone and schedule the first frame.
    ///
    /// # Errors
    ///
    /// `NotInFreePlay` without a body field; `Device` when the microphone
    /// cannot be opened, in which case the loop stays idle.
    pub fn start_listening(&mut self) -> Result<()> {
        let Some(state) = self.state.as_mut() else {
            return Err(FreePlayError::NotInFreePlay);
        };
        if state.is_listening() {
            return Ok(());
        }

        if let Err(error) = self.sampler.start() {
            tracing::warn!(%error, "microphone unavailable");
            return Err(error);
        }
        state.set_listening(true);
        self.pending = Some(self.scheduler.schedule_next_frame());
        tracing::info!("listening");
        Ok(())
    }

    /// Release the microphone, cancel the pending frame and settle every body
    /// on the ground. Returns `false` (and does nothing) when already idle.
    pub fn stop_listening(&mut self, surface: &mut dyn RenderSurface) -> bool {
        let Some(state) = self.state.as_mut() else {
            return false;
        };
        if !state.is_listening() {
            return false;
        }

        state.set_listening(false);
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel(handle);
        }
        self.sampler.stop();

        state.bodies_mut().settle_all(self.config.ground_offset);
        publish_bodies(state.bodies(), surface);
        tracing::info!("stopped listening");
        true
    }

    /// Run the frame identified by `handle`. Handles that are not the pending
    /// one (cancelled or already run) are ignored and yield `None`.
    pub fn on_frame(
        &mut self,
        handle: FrameHandle,
        surface: &mut dyn RenderSurface,
    ) -> Option<FrameReport> {
        if self.pending != Some(handle) {
            tracing::trace!(?handle, "ignoring stale frame");
            return None;
        }
        self.pending = None;

        let state = self.state.as_mut()?;
        if !state.is_listening() {
            return None;
        }

        // A frame without a sample counts as silence.
        let raw_volume = self.sampler.sample().unwrap_or(0.0);
        let normalized_volume = normalize_volume(raw_volume, &self.config);
        let impulse = self.impulse.impulse(normalized_volume);

        let bounds = surface.bounds();
        if state.container() != bounds {
            tracing::debug!(width = bounds.width, height = bounds.height, "container resized");
            state.set_container(bounds);
        }
        if bounds.is_laid_out() {
            let input = FrameInput {
                normalized_volume,
                impulse,
                container_width: bounds.width,
            };
            self.stepper.step_all(state.bodies_mut().bodies_mut(), &input);
            publish_bodies(state.bodies(), surface);
        }

        self.pending = Some(self.scheduler.schedule_next_frame());
        tracing::trace!(raw_volume, normalized_volume, impulse, "frame");

        Some(FrameReport {
            raw_volume,
            normalized_volume,
            impulse,
            meter: meter_fraction(raw_volume),
            feedback: VoiceFeedback::classify(normalized_volume),
        })
    }
}

fn publish_bodies(bodies: &BodySet, surface: &mut dyn RenderSurface) {
    for body in bodies.iter() {
        surface.publish(body.id, body.position, body.radius(), body.color());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_hands_out_each_frame_once() {
        let mut queue = FrameQueue::new();
        assert_eq!(queue.take_due(), None);

        let first = queue.schedule_next_frame();
        assert_eq!(queue.pending(), Some(first));
        assert_eq!(queue.take_due(), Some(first));
        assert_eq!(queue.take_due(), None);

        let second = queue.schedule_next_frame();
        assert_ne!(first, second);
    }

    #[test]
    fn cancel_only_drops_matching_handle() {
        let mut queue = FrameQueue::new();
        let first = queue.schedule_next_frame();
        let second = queue.schedule_next_frame();
        queue.cancel(first);
        assert_eq!(queue.pending(), Some(second));
        queue.cancel(second);
        assert_eq!(queue.pending(), None);
    }
}
