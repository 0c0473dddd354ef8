use crate::config::SimulationConfig;
use crate::math::Real;

/// Maps normalized loudness onto an upward launch velocity.
///
/// Stateless and deterministic; any jitter belongs to the caller.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImpulseModel {
    min: Real,
    max: Real,
}

impl ImpulseModel {
    pub fn new(min: Real, max: Real) -> Self {
        debug_assert!(min <= max);
        Self { min, max }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(config.impulse_min, config.impulse_max)
    }

    #[inline(always)]
    pub fn impulse(&self, normalized_volume: Real) -> Real {
        self.min + normalized_volume * (self.max - self.min)
    }
}
