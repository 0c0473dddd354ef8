//! Configuration and parameters
//!
//! Constants and simulation settings.

pub mod constants;
pub mod sim_config;

pub use constants::*;
pub use sim_config::*;
