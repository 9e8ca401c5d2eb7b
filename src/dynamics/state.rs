use std::ops::{Add, AddAssign};

use nalgebra::{SVector, Vector3};

// ---------------------------------------------------------------------------
// State layout
// ---------------------------------------------------------------------------

pub const PX: usize = 0;
pub const PY: usize = 1;
pub const PZ: usize = 2;
pub const VEL: usize = 3;
pub const PSI: usize = 4;
pub const THETA: usize = 5;
pub const NUM_STATES: usize = 6;

/// Flat state vector in `[north, east, up, speed, heading, steering]` order.
/// Also the layout of the `x0` configuration entry.
pub type StateVector = SVector<f64, NUM_STATES>;

/// Time derivative (or a dt-weighted increment) of the state, same layout as
/// [`StateVector`].
pub type StateDelta = SVector<f64, NUM_STATES>;

// ---------------------------------------------------------------------------
// Vehicle state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct State {
    pub pos: Vector3<f64>, // m, [north, east, up]; up is carried but never driven
    pub vel: f64,          // m/s, forward speed
    pub psi: f64,          // rad, heading
    pub theta: f64,        // rad, steering angle
}

impl State {
    pub fn from_vector(x: &StateVector) -> Self {
        Self {
            pos: Vector3::new(x[PX], x[PY], x[PZ]),
            vel: x[VEL],
            psi: x[PSI],
            theta: x[THETA],
        }
    }

    pub fn to_vector(&self) -> StateVector {
        StateVector::from([
            self.pos.x, self.pos.y, self.pos.z, self.vel, self.psi, self.theta,
        ])
    }

    /// Planar velocity `[north, east]` implied by speed and heading.
    pub fn planar_velocity(&self) -> [f64; 2] {
        [self.vel * self.psi.cos(), self.vel * self.psi.sin()]
    }
}

/// Component-wise sum. No wrapping or saturation happens here; RK4 stages
/// rely on that.
impl Add<StateDelta> for State {
    type Output = State;

    fn add(self, d: StateDelta) -> State {
        State {
            pos: self.pos + Vector3::new(d[PX], d[PY], d[PZ]),
            vel: self.vel + d[VEL],
            psi: self.psi + d[PSI],
            theta: self.theta + d[THETA],
        }
    }
}

impl AddAssign<StateDelta> for State {
    fn add_assign(&mut self, d: StateDelta) {
        *self = *self + d;
    }
}

// ---------------------------------------------------------------------------
// Control input
// ---------------------------------------------------------------------------

/// Force and steering torque, held constant over one integration step.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ControlInput {
    pub force: f64,  // N, along the heading
    pub torque: f64, // N·m, about the steering axis
}

impl ControlInput {
    pub fn new(force: f64, torque: f64) -> Self {
        Self { force, torque }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Saturate both channels to symmetric limits.
    pub fn clamped(self, max_force: f64, max_torque: f64) -> Self {
        Self {
            force: self.force.clamp(-max_force, max_force),
            torque: self.torque.clamp(-max_torque, max_torque),
        }
    }
}

// ---------------------------------------------------------------------------
// Simulation config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SimConfig {
    pub dt: f64,
    pub max_time: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            dt: 0.01,        // 100 Hz frame step
            max_time: 60.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector_layout_matches_fields() {
        let x = StateVector::from([1.0, 2.0, 0.0, 3.0, 0.4, -0.1]);
        let s = State::from_vector(&x);
        assert_eq!(s.pos, Vector3::new(1.0, 2.0, 0.0));
        assert_eq!(s.vel, 3.0);
        assert_eq!(s.psi, 0.4);
        assert_eq!(s.theta, -0.1);
        assert_eq!(s.to_vector(), x);
    }

    #[test]
    fn add_delta_is_plain_sum() {
        let s = State { pos: Vector3::zeros(), vel: 1.0, psi: 3.0, theta: 0.5 };
        let d = StateDelta::from([1.0, -1.0, 0.0, 0.5, 1.0, 2.0]);
        let out = s + d;
        // no wrap, no clamp mid-integration
        assert!((out.psi - 4.0).abs() < 1e-12);
        assert!((out.theta - 2.5).abs() < 1e-12);
        assert!((out.vel - 1.5).abs() < 1e-12);
        assert_eq!(out.pos, Vector3::new(1.0, -1.0, 0.0));
    }

    #[test]
    fn planar_velocity_follows_heading() {
        let s = State { pos: Vector3::zeros(), vel: 2.0, psi: std::f64::consts::FRAC_PI_2, theta: 0.0 };
        let [vn, ve] = s.planar_velocity();
        assert!(vn.abs() < 1e-12);
        assert!((ve - 2.0).abs() < 1e-12);

        let back = State { vel: -3.0, psi: 0.0, ..s }.planar_velocity();
        assert_eq!(back, [-3.0, 0.0]);
    }

    #[test]
    fn input_clamps_symmetrically() {
        let u = ControlInput::new(500.0, -80.0).clamped(100.0, 10.0);
        assert_eq!(u, ControlInput::new(100.0, -10.0));

        let mut u = ControlInput::new(3.0, 4.0);
        u.clear();
        assert_eq!(u, ControlInput::default());
    }
}
