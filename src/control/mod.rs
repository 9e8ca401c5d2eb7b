pub mod driver;
pub mod keys;

pub use driver::{ConstantDriver, Driver, ScheduleDriver};
pub use keys::KeyState;
