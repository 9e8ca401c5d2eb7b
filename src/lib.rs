pub mod control;
pub mod dynamics;
pub mod error;
pub mod io;
pub mod sim;
pub mod vehicle;

pub use error::ConfigError;
pub use vehicle::{Bicycle, VehicleParams};
