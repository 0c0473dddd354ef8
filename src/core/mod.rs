pub mod body;
pub mod body_set;
pub mod state;

pub use body::{BodyId, ParticleBody};
pub use body_set::BodySet;
pub use state::{ContainerBounds, SimulationState};
