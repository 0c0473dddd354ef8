use crate::core::body_set::BodySet;
use crate::math::Real;

/// Current size of the rendering surface; may change between frames.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct ContainerBounds {
    pub width: Real,
    pub height: Real,
}

impl ContainerBounds {
    pub fn new(width: Real, height: Real) -> Self {
        Self { width, height }
    }

    /// A surface that has been laid out.
    pub fn is_laid_out(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// Aggregate state of one free-play session.
///
/// Created on free-play entry, mutated once per frame while listening, and
/// dropped on exit.
#[derive(Debug)]
pub struct SimulationState {
    bodies: BodySet,
    listening: bool,
    container: ContainerBounds,
}

impl SimulationState {
    pub fn new(bodies: BodySet, container: ContainerBounds) -> Self {
        Self {
            bodies,
            listening: false,
            container,
        }
    }

    pub fn bodies(&self) -> &BodySet {
        &self.bodies
    }

    pub fn bodies_mut(&mut self) -> &mut BodySet {
        &mut self.bodies
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    pub fn set_listening(&mut self, listening: bool) {
        self.listening = listening;
    }

    pub fn container(&self) -> ContainerBounds {
        self.container
    }

    pub fn set_container(&mut self, container: ContainerBounds) {
        self.container = container;
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }
}
