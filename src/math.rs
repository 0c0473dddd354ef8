use bevy::math::Vec2;

pub type Real = f32;

pub type Vector = Vec2;
pub type Point = Vec2;

#[inline(always)]
pub fn zero_vector() -> Vector {
    Vec2::ZERO
}

/// Centred uniform jitter: maps `u` in `[0, 1)` onto `[-amplitude, amplitude)`.
#[inline(always)]
pub fn centred_jitter(u: Real, amplitude: Real) -> Real {
    (u - 0.5) * 2.0 * amplitude
}

/// Rescale `value` from `[lo, hi]` onto `[0, 1]`, clamped at both ends.
#[inline(always)]
pub fn unit_rescale(value: Real, lo: Real, hi: Real) -> Real {
    ((value - lo) / (hi - lo)).clamp(0.0, 1.0)
}
