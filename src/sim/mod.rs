pub mod integrator;
pub mod runner;
pub mod event;

pub use runner::{simulate, simulate_with, step_frame, Sample};
pub use integrator::rk4;
