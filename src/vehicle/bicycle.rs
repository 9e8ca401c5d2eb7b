use std::path::Path;

use tracing::{debug, trace};

use crate::dynamics::angles::{saturate, wrap_angle};
use crate::dynamics::kinematic::derivatives;
use crate::dynamics::state::{ControlInput, State};
use crate::error::ConfigError;
use crate::sim::integrator::rk4;
use super::params::VehicleParams;

// ---------------------------------------------------------------------------
// Kinematic bicycle vehicle
// ---------------------------------------------------------------------------

/// A single simulated vehicle. Owns its state, the control input the
/// front end writes each frame, and the parameters it was built from.
#[derive(Debug, Clone)]
pub struct Bicycle {
    params: VehicleParams,
    state: State,
    input: ControlInput,
    t_prev: Option<f64>, // None until the first propagate call
}

impl Bicycle {
    pub fn new(params: VehicleParams) -> Result<Self, ConfigError> {
        params.validate()?;
        let state = State::from_vector(&params.initial_state());
        debug!(
            name = %params.name,
            mass = params.mass,
            length = params.length,
            max_steering_angle = params.max_steering_angle,
            "vehicle loaded"
        );
        Ok(Self {
            params,
            state,
            input: ControlInput::default(),
            t_prev: None,
        })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::new(VehicleParams::from_file(path)?)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        Self::new(VehicleParams::from_yaml_str(text)?)
    }

    /// Advance the vehicle to absolute time `t` (s).
    ///
    /// The step is skipped, leaving the state untouched, on the first call,
    /// when `t <= 0`, when `t` does not move forward from the previous
    /// call, and when either time is NaN. `t` is remembered in every case.
    /// Otherwise one RK4 step of length `t - t_prev` is taken with the
    /// current input, then heading is wrapped into (-π, π] and steering is
    /// clamped to its bound.
    pub fn propagate(&mut self, t: f64) {
        let Some(t_prev) = self.t_prev.replace(t) else {
            trace!(t, "first propagate call, clock started");
            return;
        };
        let dt = t - t_prev;
        // Written positively so a NaN time is skipped too.
        if !(t > 0.0 && dt > 0.0) {
            debug!(t, dt, "non-advancing time, step skipped");
            return;
        }

        let params = &self.params;
        let delta = rk4(
            |x: &State, u: &ControlInput| derivatives(x, u, params),
            dt,
            &self.state,
            &self.input,
        );
        self.state += delta;

        let max_steer = self.params.max_steering_angle;
        self.state.psi = wrap_angle(self.state.psi);
        self.state.theta = saturate(self.state.theta, -max_steer, max_steer);
    }

    /// Return to the configured initial state with zero input and an
    /// unstarted clock.
    pub fn reset(&mut self) {
        self.state = State::from_vector(&self.params.initial_state());
        self.input.clear();
        self.t_prev = None;
    }

    pub fn name(&self) -> &str { &self.params.name }
    pub fn params(&self) -> &VehicleParams { &self.params }
    pub fn state(&self) -> &State { &self.state }
    pub fn x(&self) -> f64 { self.state.pos.x }
    pub fn y(&self) -> f64 { self.state.pos.y }
    pub fn psi(&self) -> f64 { self.state.psi }
    pub fn theta(&self) -> f64 { self.state.theta }
    pub fn speed(&self) -> f64 { self.state.vel }
    pub fn last_time(&self) -> Option<f64> { self.t_prev }

    pub fn input(&self) -> &ControlInput { &self.input }
    pub fn input_mut(&mut self) -> &mut ControlInput { &mut self.input }
    pub fn force_mut(&mut self) -> &mut f64 { &mut self.input.force }
    pub fn torque_mut(&mut self) -> &mut f64 { &mut self.input.torque }

    pub fn max_force(&self) -> f64 { self.params.max_force }
    pub fn max_torque(&self) -> f64 { self.params.max_torque }
    pub fn max_steering_angle(&self) -> f64 { self.params.max_steering_angle }

    /// Signed radius of the rear-axle path, `L / tan θ`. Infinite when
    /// driving straight.
    pub fn turn_radius(&self) -> f64 {
        let t = self.state.theta.tan();
        if t == 0.0 {
            f64::INFINITY
        } else {
            self.params.length / t
        }
    }

    /// Current heading rate, rad/s.
    pub fn yaw_rate(&self) -> f64 {
        self.state.vel * self.state.theta.tan() / self.params.length
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::params::{presets, VehicleParamsBuilder};
    use std::f64::consts::PI;

    fn car(x0: [f64; 6]) -> Bicycle {
        let params = VehicleParamsBuilder::new("test")
            .mass(1000.0)
            .inertia(1.0)
            .length(2.5)
            .max_force(5000.0)
            .max_torque(2.0)
            .max_steering_angle(0.5)
            .drag(0.2)
            .x0(x0)
            .build();
        Bicycle::new(params).unwrap()
    }

    #[test]
    fn first_call_only_starts_clock() {
        let mut b = car([0.0, 0.0, 0.0, 5.0, 0.0, 0.1]);
        *b.force_mut() = 1000.0;
        let before = *b.state();
        b.propagate(0.5);
        assert_eq!(*b.state(), before);
        assert_eq!(b.last_time(), Some(0.5));
        b.propagate(0.6);
        assert!(b.x() > 0.0);
    }

    #[test]
    fn non_advancing_time_is_noop() {
        let mut b = car([0.0, 0.0, 0.0, 5.0, 0.3, 0.1]);
        *b.force_mut() = 2000.0;
        *b.torque_mut() = 1.0;
        b.propagate(1.0);
        b.propagate(1.1);
        let snap = *b.state();

        b.propagate(1.1); // repeated
        assert_eq!(*b.state(), snap);
        b.propagate(0.9); // rewound
        assert_eq!(*b.state(), snap);
        assert_eq!(b.last_time(), Some(0.9));
    }

    #[test]
    fn non_positive_time_is_noop() {
        let mut b = car([0.0, 0.0, 0.0, 5.0, 0.0, 0.0]);
        *b.force_mut() = 2000.0;
        b.propagate(-2.0);
        b.propagate(-1.0); // dt > 0 but t <= 0
        b.propagate(0.0);
        assert_eq!(b.state().pos.x, 0.0);
        assert_eq!(b.speed(), 5.0);
        assert_eq!(b.last_time(), Some(0.0));
    }

    #[test]
    fn nan_time_is_skipped_and_recovers() {
        let mut b = car([0.0, 0.0, 0.0, 5.0, 0.2, 0.1]);
        *b.force_mut() = 1000.0;
        b.propagate(0.1);
        b.propagate(0.2);
        let snap = *b.state();

        b.propagate(f64::NAN);
        assert_eq!(*b.state(), snap);

        // The call after a NaN has a NaN dt as well; the one after that steps.
        b.propagate(0.3);
        assert_eq!(*b.state(), snap);
        b.propagate(0.4);
        assert!(b.x().is_finite() && b.speed().is_finite() && b.psi().is_finite());
        assert!(b.x() > snap.pos.x);
    }

    #[test]
    fn initial_steer_beyond_bound_is_clamped_on_first_step() {
        let mut b = car([0.0, 0.0, 0.0, 1.0, 0.0, 0.8]);
        assert_eq!(b.theta(), 0.8);
        b.propagate(0.0);
        assert_eq!(b.theta(), 0.8);
        b.propagate(0.01);
        assert_eq!(b.theta(), 0.5);
    }

    #[test]
    fn builds_from_yaml_text() {
        let b = Bicycle::from_yaml_str(
            "name: yaml-car\nmass: 900.0\ninertia: 1.0\nlength: 2.2\nmax_force: 3000.0\n\
             max_torque: 2.0\nmax_steering_angle: 0.4\ndrag: 0.1\nx0: [5.0, 6.0, 0.0, 1.0, 0.0, 0.0]\n",
        )
        .unwrap();
        assert_eq!(b.name(), "yaml-car");
        assert_eq!((b.x(), b.y()), (5.0, 6.0));
        assert_eq!(b.max_steering_angle(), 0.4);
        assert!(matches!(Bicycle::from_yaml_str("mass: 1.0\n"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn builds_from_shipped_kart_file() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/kart.yaml");
        let b = Bicycle::from_file(path).unwrap();
        let kart = presets::kart();
        assert_eq!(b.name(), "kart");
        assert_eq!(b.params().mass, kart.mass);
        assert_eq!(b.params().length, kart.length);
        assert!((b.max_steering_angle() - kart.max_steering_angle).abs() < 1e-12);
        assert!(matches!(
            Bicycle::from_file("/no/such/vehicle.yaml"),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn steering_saturates_under_sustained_torque() {
        let mut b = car([0.0; 6]);
        *b.torque_mut() = b.max_torque();
        for k in 0..=500 {
            b.propagate(k as f64 * 0.01);
            assert!(b.theta() <= b.max_steering_angle());
        }
        assert!((b.theta() - 0.5).abs() < 1e-12);

        *b.torque_mut() = -b.max_torque();
        for k in 501..=1500 {
            b.propagate(k as f64 * 0.01);
            assert!(b.theta() >= -b.max_steering_angle());
        }
        assert!((b.theta() + 0.5).abs() < 1e-12);
    }

    #[test]
    fn heading_wraps_instead_of_growing() {
        // Tight circle at speed: yaw rate ~ 10·tan(0.5)/2.5 ≈ 2.2 rad/s
        let mut b = car([0.0, 0.0, 0.0, 10.0, 0.0, 0.5]);
        *b.force_mut() = 1000.0 * 0.2 * 10.0; // hold speed against drag
        for k in 0..=3000 {
            b.propagate(k as f64 * 0.01);
            assert!(b.psi() > -PI && b.psi() <= PI, "psi={}", b.psi());
        }
    }

    #[test]
    fn up_component_stays_zero() {
        let mut b = car([0.0, 0.0, 0.0, 8.0, 1.0, 0.3]);
        for k in 0..100 {
            b.propagate(k as f64 * 0.05);
        }
        assert_eq!(b.state().pos.z, 0.0);
    }

    #[test]
    fn reset_restores_initial_state() {
        let x0 = [1.0, -1.0, 0.0, 2.0, 0.25, 0.0];
        let mut b = car(x0);
        *b.force_mut() = 3000.0;
        b.propagate(0.1);
        b.propagate(0.5);
        b.reset();
        assert_eq!(b.state().to_vector().as_slice(), &x0);
        assert_eq!(*b.input(), ControlInput::default());
        assert_eq!(b.last_time(), None);
    }

    #[test]
    fn turn_radius_and_yaw_rate() {
        let b = car([0.0, 0.0, 0.0, 4.0, 0.0, 0.0]);
        assert!(b.turn_radius().is_infinite());
        assert_eq!(b.yaw_rate(), 0.0);

        let b = car([0.0, 0.0, 0.0, 4.0, 0.0, 0.2]);
        let r = 2.5 / 0.2_f64.tan();
        assert!((b.turn_radius() - r).abs() < 1e-12);
        assert!((b.yaw_rate() - 4.0 / r).abs() < 1e-12);
    }

    #[test]
    fn invalid_params_are_rejected() {
        let mut p = presets::sedan();
        p.length = -1.0;
        assert!(matches!(
            Bicycle::new(p),
            Err(ConfigError::Invalid { field: "length", .. })
        ));
    }

    #[test]
    fn accessors_expose_configuration() {
        let b = Bicycle::new(presets::sedan()).unwrap();
        assert_eq!(b.name(), "sedan");
        assert_eq!(b.max_force(), 6000.0);
        assert_eq!(b.max_torque(), 3.0);
        assert_eq!(b.x(), 0.0);
        assert_eq!(b.y(), 0.0);
    }
}
