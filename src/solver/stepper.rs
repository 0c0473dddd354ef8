//! Per-frame body integration
//!
//! Gravity, the voice-impulse gate, explicit Euler integration, then wall and
//! floor response. One call advances one frame; bodies never interact.

use rand::Rng;

use crate::config::{
    FLOOR_JITTER, GROUND_TOLERANCE, IMPULSE_CAP_FACTOR, IMPULSE_JITTER_FLOOR, REST_VELOCITY,
    SimulationConfig, VOICE_GATE, WALL_JITTER,
};
use crate::core::ParticleBody;
use crate::math::{Real, centred_jitter};

/// Everything one frame feeds into the stepper besides body state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameInput {
    pub normalized_volume: Real,
    pub impulse: Real,
    pub container_width: Real,
}

#[derive(Clone, Copy, Debug)]
struct StepParams {
    gravity: Real,
    ground_offset: Real,
    bounce_damping: Real,
    wall_damping: Real,
    impulse_cap: Real,
}

/// Advances bodies one frame using an injected random source for jitter.
pub struct PhysicsStepper<R: Rng> {
    params: StepParams,
    rng: R,
}

impl<R: Rng> PhysicsStepper<R> {
    pub fn new(config: &SimulationConfig, rng: R) -> Self {
        Self {
            params: StepParams {
                gravity: config.gravity,
                ground_offset: config.ground_offset,
                bounce_damping: config.bounce_damping,
                wall_damping: config.wall_damping,
                impulse_cap: config.impulse_max * IMPULSE_CAP_FACTOR,
            },
            rng,
        }
    }

    pub fn step_all(&mut self, bodies: &mut [ParticleBody], input: &FrameInput) {
        for body in bodies.iter_mut() {
            self.step_body(body, input);
        }
    }

    pub fn step_body(&mut self, body: &mut ParticleBody, input: &FrameInput) {
        debug_assert!(input.container_width > 0.0, "container must be laid out");
        let p = self.params;
        let radius = body.radius();

        body.velocity.y += p.gravity;

        // Voice only launches bodies resting near the ground.
        if input.normalized_volume > VOICE_GATE
            && body.bottom() <= p.ground_offset + GROUND_TOLERANCE
        {
            let kick = IMPULSE_JITTER_FLOOR + self.rng.random::<Real>() * (1.0 - IMPULSE_JITTER_FLOOR);
            body.velocity.y = (input.impulse * kick).min(p.impulse_cap);
        }

        body.position += body.velocity;

        if body.position.x - radius < 0.0 {
            body.position.x = radius;
            body.velocity.x *= -p.wall_damping;
            body.velocity.x += centred_jitter(self.rng.random(), WALL_JITTER);
        } else if body.position.x + radius > input.container_width {
            body.position.x = input.container_width - radius;
            body.velocity.x *= -p.wall_damping;
            body.velocity.x += centred_jitter(self.rng.random(), WALL_JITTER);
        }

        if body.bottom() < p.ground_offset {
            body.position.y = p.ground_offset + radius;
            body.velocity.y *= -p.bounce_damping;
            let speed = body.velocity.y.abs();
            if speed > 0.0 && speed < REST_VELOCITY {
                body.velocity.y = 0.0;
            }
            body.velocity.x += centred_jitter(self.rng.random(), FLOOR_JITTER);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::BodyId;
    use crate::solver::ImpulseModel;
    use bevy::math::Vec2;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const WIDTH: Real = 400.0;

    fn stepper(seed: u64) -> PhysicsStepper<StdRng> {
        PhysicsStepper::new(&SimulationConfig::default(), StdRng::seed_from_u64(seed))
    }

    fn frame(normalized_volume: Real) -> FrameInput {
        let model = ImpulseModel::from_config(&SimulationConfig::default());
        FrameInput {
            normalized_volume,
            impulse: model.impulse(normalized_volume),
            container_width: WIDTH,
        }
    }

    fn body_at(x: Real, y: Real, radius: Real) -> ParticleBody {
        ParticleBody::new(BodyId(0), Vec2::new(x, y), radius)
    }

    #[test]
    fn gravity_pulls_airborne_body_down() {
        let mut body = body_at(200.0, 300.0, 25.0);
        stepper(1).step_body(&mut body, &frame(0.0));
        assert!((body.velocity.y + 0.8).abs() < 1e-6);
        assert!((body.position.y - 299.2).abs() < 1e-4);
        assert_eq!(body.velocity.x, 0.0);
    }

    #[test]
    fn silent_body_on_ground_stays_at_rest() {
        let config = SimulationConfig::default();
        let mut body = body_at(50.0, 25.0, 25.0);
        stepper(2).step_body(&mut body, &frame(0.0));

        assert!(body.bottom() >= config.ground_offset - 1e-4);
        assert_eq!(body.velocity.y, 0.0);
        assert!(body.velocity.x.abs() <= FLOOR_JITTER);
    }

    #[test]
    fn loud_voice_launches_grounded_body() {
        let mut body = body_at(50.0, 25.0, 25.0);
        let before = body.position.y;
        stepper(3).step_body(&mut body, &frame(0.8));

        assert!(body.velocity.y >= 39.0 * 0.8 - 1e-3);
        assert!(body.velocity.y <= 39.0 + 1e-3);
        assert!(body.position.y > before);
    }

    #[test]
    fn airborne_body_ignores_voice() {
        let mut body = body_at(200.0, 300.0, 25.0);
        stepper(4).step_body(&mut body, &frame(1.0));
        assert!((body.velocity.y + 0.8).abs() < 1e-6);
    }

    #[test]
    fn quiet_voice_below_gate_does_not_launch() {
        let mut body = body_at(50.0, 45.0, 25.0);
        stepper(5).step_body(&mut body, &frame(0.1));
        assert_eq!(body.velocity.y, 0.0);
    }

    #[test]
    fn launch_is_capped() {
        let config = SimulationConfig::default();
        let mut body = body_at(50.0, 45.0, 25.0);
        let input = FrameInput {
            normalized_volume: 1.0,
            impulse: 1_000.0,
            container_width: WIDTH,
        };
        stepper(6).step_body(&mut body, &input);
        assert!(body.velocity.y <= config.impulse_max * IMPULSE_CAP_FACTOR);
    }

    #[test]
    fn left_wall_reflects_and_damps() {
        let mut body = body_at(3.0, 300.0, 25.0).with_velocity(Vec2::new(-5.0, 0.0));
        stepper(7).step_body(&mut body, &frame(0.0));

        assert_eq!(body.position.x, 25.0);
        let expected = 5.0 * SimulationConfig::default().wall_damping;
        assert!((body.velocity.x - expected).abs() <= WALL_JITTER + 1e-6);
        assert!(body.velocity.x > 0.0);
    }

    #[test]
    fn right_wall_reflects_and_damps() {
        let mut body = body_at(WIDTH - 10.0, 300.0, 25.0).with_velocity(Vec2::new(6.0, 0.0));
        stepper(8).step_body(&mut body, &frame(0.0));

        assert_eq!(body.position.x, WIDTH - 25.0);
        assert!(body.velocity.x < 0.0);
    }

    #[test]
    fn bodies_never_tunnel_below_ground_or_through_walls() {
        let config = SimulationConfig::default();
        let mut stepper = stepper(9);
        let mut bodies: Vec<ParticleBody> = (0..20)
            .map(|i| {
                body_at(30.0 + i as Real * 17.0, 60.0 + i as Real * 9.0, 12.0 + i as Real)
                    .with_velocity(Vec2::new(i as Real - 10.0, 5.0))
            })
            .collect();

        for frame_index in 0..600 {
            let volume = if frame_index % 90 < 30 { 0.9 } else { 0.0 };
            stepper.step_all(&mut bodies, &frame(volume));
            for body in &bodies {
                assert!(body.bottom() >= config.ground_offset - 1e-3);
                assert!(body.position.x >= body.radius() - 1e-3);
                assert!(body.position.x <= WIDTH - body.radius() + 1e-3);
                assert!(body.is_finite());
            }
        }
    }

    #[test]
    fn same_seed_replays_identically() {
        let start: Vec<ParticleBody> = (0..8)
            .map(|i| body_at(20.0 + i as Real * 40.0, 45.0, 25.0))
            .collect();
        let mut a = start.clone();
        let mut b = start;
        let mut left = stepper(42);
        let mut right = stepper(42);
        for _ in 0..120 {
            left.step_all(&mut a, &frame(0.6));
            right.step_all(&mut b, &frame(0.6));
        }
        assert_eq!(a, b);
    }
}
