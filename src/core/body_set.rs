use bevy::math::Vec2;
use rand::Rng;

use crate::config::{SPAWN_SPEED_X, SimulationConfig};
use crate::core::body::{BodyId, ParticleBody};
use crate::math::{Real, centred_jitter};

/// Fixed-size collection of bodies for one free-play session.
///
/// Bodies are created together and dropped together; order only matters for
/// rendering identity.
#[derive(Clone, Debug, Default)]
pub struct BodySet {
    bodies: Vec<ParticleBody>,
}

impl BodySet {
    /// Scatter `config.ball_count` bodies just above the ground of a container
    /// `container_width` wide.
    pub fn spawn<R: Rng + ?Sized>(
        config: &SimulationConfig,
        container_width: Real,
        rng: &mut R,
    ) -> Self {
        let mut bodies = Vec::with_capacity(config.ball_count);
        let size_span = (config.ball_size_max - config.ball_size_min).floor() + 1.0;

        for index in 0..config.ball_count {
            let size = (rng.random::<Real>() * size_span).floor() + config.ball_size_min;
            let size = size.min(config.ball_size_max);
            let radius = size / 2.0;

            let x = rng.random::<Real>() * (container_width - size).max(0.0) + radius;
            let y = config.ground_offset
                + radius
                + rng.random::<Real>() * config.spawn_height_variation;
            let vx = centred_jitter(rng.random(), SPAWN_SPEED_X);
            let vy = rng.random::<Real>() * (config.impulse_max * 0.5) + config.impulse_min * 0.5;
            let hue = rng.random::<Real>() * 360.0;

            bodies.push(
                ParticleBody::new(BodyId(index), Vec2::new(x, y), radius)
                    .with_velocity(Vec2::new(vx, vy))
                    .with_hue(hue),
            );
        }

        Self { bodies }
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParticleBody> {
        self.bodies.iter()
    }

    pub fn bodies(&self) -> &[ParticleBody] {
        &self.bodies
    }

    pub fn bodies_mut(&mut self) -> &mut [ParticleBody] {
        &mut self.bodies
    }

    /// Rest every body on the ground with zero velocity.
    pub fn settle_all(&mut self, ground_offset: Real) {
        for body in self.bodies.iter_mut() {
            body.settle(ground_offset);
        }
    }
}
