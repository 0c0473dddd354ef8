// Physical and analysis constants for the free-play simulation
use crate::math::Real;

// Defaults (pixels, pixels/frame, pixels/frame^2)
pub const GROUND_OFFSET: Real = 20.0;
pub const GRAVITY: Real = -0.8;
pub const BOUNCE_DAMPING: Real = 0.8;
pub const WALL_DAMPING: Real = 0.9;
pub const IMPULSE_MIN: Real = 15.0;
pub const IMPULSE_MAX: Real = 45.0;
pub const VOLUME_THRESHOLD_MIN: Real = 10.0;
pub const VOLUME_THRESHOLD_MAX: Real = 100.0;
pub const BALL_SIZE_MIN: Real = 30.0;
pub const BALL_SIZE_MAX: Real = 60.0;
pub const BALL_COUNT: usize = 200;
pub const MAX_BALL_COUNT: usize = 100_000;
pub const SPAWN_HEIGHT_VARIATION: Real = 50.0;

// Voice-impulse gate
pub const VOICE_GATE: Real = 0.1;
pub const GROUND_TOLERANCE: Real = 5.0;
pub const IMPULSE_CAP_FACTOR: Real = 1.5;
pub const IMPULSE_JITTER_FLOOR: Real = 0.8;

// Collision response jitter
pub const WALL_JITTER: Real = 0.25;
pub const FLOOR_JITTER: Real = 1.0;
pub const REST_VELOCITY: Real = 1.0;

// Spawn velocities
pub const SPAWN_SPEED_X: Real = 3.0;

// Spectral analysis
pub const FFT_SIZE: usize = 256;
pub const FREQUENCY_BIN_COUNT: usize = FFT_SIZE / 2;
pub const SMOOTHING_TIME_CONSTANT: Real = 0.8;
pub const MIN_DECIBELS: Real = -100.0;
pub const MAX_DECIBELS: Real = -30.0;
