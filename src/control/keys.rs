use crate::dynamics::state::ControlInput;
use crate::vehicle::Bicycle;
use super::driver::Driver;

// ---------------------------------------------------------------------------
// Keyboard mapping
// ---------------------------------------------------------------------------

/// Which drive keys are currently held.
///
/// Heading grows from north toward east, so a right turn is positive
/// steering torque. Opposing keys cancel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyState {
    pub forward: bool,
    pub reverse: bool,
    pub left: bool,
    pub right: bool,
}

impl KeyState {
    pub fn to_input(&self, max_force: f64, max_torque: f64) -> ControlInput {
        let throttle = axis(self.forward, self.reverse);
        let steer = axis(self.right, self.left);
        ControlInput::new(throttle * max_force, steer * max_torque)
    }

    pub fn any(&self) -> bool {
        self.forward || self.reverse || self.left || self.right
    }
}

fn axis(positive: bool, negative: bool) -> f64 {
    match (positive, negative) {
        (true, false) => 1.0,
        (false, true) => -1.0,
        _ => 0.0,
    }
}

impl Driver for KeyState {
    fn command(&mut self, vehicle: &Bicycle, _t: f64) -> ControlInput {
        self.to_input(vehicle.max_force(), vehicle.max_torque())
    }

    fn reset(&mut self) {
        *self = KeyState::default();
    }

    fn name(&self) -> &str {
        "keyboard"
    }
}
