//! Status text for the free-play screen.

use rand::Rng;
use rand::seq::IndexedRandom;

use crate::math::Real;

const ENCOURAGEMENT: [&str; 5] = [
    "Great job speaking!",
    "Keep talking!",
    "I can hear you!",
    "Amazing voice!",
    "You're doing great!",
];

pub const LISTENING_PROMPT: &str = "Listening... Speak to make the balls bounce!";
pub const IDLE_PROMPT: &str = "Press Space to start listening.";
pub const STOPPED_PROMPT: &str = "Press Space to play again!";
pub const DEVICE_FAILURE: &str = "Could not access microphone. Please check permissions.";

/// How loud the last frame was, coarsely.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoiceFeedback {
    Silent,
    Quiet,
    Loud,
}

impl VoiceFeedback {
    pub fn classify(normalized_volume: Real) -> Self {
        if normalized_volume > 0.5 {
            Self::Loud
        } else if normalized_volume > 0.0 {
            Self::Quiet
        } else {
            Self::Silent
        }
    }

    pub fn message<R: Rng + ?Sized>(self, rng: &mut R) -> &'static str {
        match self {
            Self::Loud => ENCOURAGEMENT.choose(rng).copied().unwrap_or(ENCOURAGEMENT[0]),
            Self::Quiet => "Making a sound!",
            Self::Silent => "Speak louder!",
        }
    }
}

/// Volume-bar fill in `[0, 1]` for a raw loudness.
#[inline]
pub fn meter_fraction(raw_volume: Real) -> Real {
    (raw_volume / 255.0).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn classification_thresholds() {
        assert_eq!(VoiceFeedback::classify(0.0), VoiceFeedback::Silent);
        assert_eq!(VoiceFeedback::classify(0.01), VoiceFeedback::Quiet);
        assert_eq!(VoiceFeedback::classify(0.5), VoiceFeedback::Quiet);
        assert_eq!(VoiceFeedback::classify(0.51), VoiceFeedback::Loud);
    }

    #[test]
    fn loud_messages_come_from_encouragement_pool() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..20 {
            let message = VoiceFeedback::Loud.message(&mut rng);
            assert!(ENCOURAGEMENT.contains(&message));
        }
        assert_eq!(VoiceFeedback::Silent.message(&mut rng), "Speak louder!");
    }

    #[test]
    fn meter_is_clamped() {
        assert_eq!(meter_fraction(0.0), 0.0);
        assert_eq!(meter_fraction(255.0), 1.0);
        assert_eq!(meter_fraction(300.0), 1.0);
    }
}
