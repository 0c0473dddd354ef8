//! Simulated balls for the free-play field
//!
//! A body carries position, velocity and a fixed radius.

use bevy::color::Color;

use crate::math::{Point, Real, Vector, zero_vector};

/// Stable identity of a body within one free-play session (its creation index).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub usize);

#[derive(Clone, Debug, PartialEq)]
pub struct ParticleBody {
    pub id: BodyId,
    pub position: Point, // centre, container-local, y up from the bottom edge
    pub velocity: Vector, // units per frame
    radius: Real,
    pub hue: Real, // degrees
}

impl ParticleBody {
    pub fn new(id: BodyId, position: Point, radius: Real) -> Self {
        debug_assert!(radius > 0.0, "body radius must be positive");
        Self {
            id,
            position,
            velocity: zero_vector(),
            radius,
            hue: 0.0,
        }
    }

    pub fn with_velocity(mut self, velocity: Vector) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_hue(mut self, hue: Real) -> Self {
        self.hue = hue;
        self
    }

    #[inline(always)]
    pub fn radius(&self) -> Real {
        self.radius
    }

    /// Height of the lowest point of the ball.
    #[inline(always)]
    pub fn bottom(&self) -> Real {
        self.position.y - self.radius
    }

    /// Drop to rest on the ground, keeping the horizontal position.
    pub fn settle(&mut self, ground_offset: Real) {
        self.velocity = zero_vector();
        self.position.y = ground_offset + self.radius;
    }

    pub fn color(&self) -> Color {
        Color::hsl(self.hue, 0.7, 0.6)
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.velocity.is_finite()
    }
}
