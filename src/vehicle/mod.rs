pub mod bicycle;
pub mod params;

pub use bicycle::Bicycle;
pub use params::{presets, VehicleParams, VehicleParamsBuilder};
