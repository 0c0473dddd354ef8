pub mod impulse;
pub mod stepper;

pub use impulse::ImpulseModel;
pub use stepper::{FrameInput, PhysicsStepper};
