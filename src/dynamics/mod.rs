pub mod angles;
pub mod kinematic;
pub mod state;

pub use angles::{saturate, wrap_angle};
pub use kinematic::derivatives;
pub use state::{ControlInput, SimConfig, State, StateDelta, StateVector};
