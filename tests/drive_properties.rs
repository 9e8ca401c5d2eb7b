use std::f64::consts::{PI, TAU};

use bicycle_sim::control::ConstantDriver;
use bicycle_sim::dynamics::{derivatives, ControlInput, SimConfig, State};
use bicycle_sim::sim::{self, rk4};
use bicycle_sim::vehicle::{presets, Bicycle, VehicleParams, VehicleParamsBuilder};

fn params(drag: f64, x0: [f64; 6]) -> VehicleParams {
    VehicleParamsBuilder::new("check")
        .mass(800.0)
        .inertia(1.5)
        .length(2.4)
        .max_force(4000.0)
        .max_torque(6.0)
        .max_steering_angle(0.55)
        .drag(drag)
        .x0(x0)
        .build()
}

/// Propagate at t = k·dt for k in 0..=steps, holding `input`.
fn drive(vehicle: &mut Bicycle, input: ControlInput, dt: f64, steps: usize) {
    *vehicle.input_mut() = input;
    for k in 0..=steps {
        vehicle.propagate(k as f64 * dt);
    }
}

#[test]
fn speed_decays_exponentially_without_input() {
    let (v0, d) = (12.0, 0.4);
    let mut car = Bicycle::new(params(d, [0.0, 0.0, 0.0, v0, 0.3, 0.0])).unwrap();
    drive(&mut car, ControlInput::default(), 0.02, 250);
    let expected = v0 * (-d * 5.0).exp();
    assert!(
        (car.speed() - expected).abs() < 1e-7,
        "speed {} vs analytic {}",
        car.speed(),
        expected
    );
}

#[test]
fn straight_line_under_constant_force() {
    let (v0, d, psi0, force) = (2.0, 0.25, 0.7, 2000.0);
    let mut car = Bicycle::new(params(d, [1.0, -3.0, 0.0, v0, psi0, 0.0])).unwrap();
    let dt = 0.01;
    let steps = 600;
    drive(&mut car, ControlInput::new(force, 0.0), dt, steps);

    let t = dt * steps as f64;
    let v_inf = force / (800.0 * d);
    let speed = v_inf + (v0 - v_inf) * (-d * t).exp();
    let dist = v_inf * t + (v0 - v_inf) * (1.0 - (-d * t).exp()) / d;

    assert_eq!(car.psi(), psi0);
    assert_eq!(car.theta(), 0.0);
    assert!((car.speed() - speed).abs() < 1e-7);

    let dn = car.x() - 1.0;
    let de = car.y() + 3.0;
    // on the ray through x0 along psi0
    assert!((dn * psi0.sin() - de * psi0.cos()).abs() < 1e-9);
    assert!(((dn * dn + de * de).sqrt() - dist).abs() < 1e-6);
}

fn circle_error(steps: usize, fraction: f64) -> f64 {
    let (v, theta) = (5.0, 0.3);
    let p = params(0.0, [0.0, 0.0, 0.0, v, 0.0, theta]);
    let r = p.length / theta.tan();
    let omega = v / r;
    let t_end = fraction * TAU / omega;
    let dt = t_end / steps as f64;

    let mut car = Bicycle::new(p).unwrap();
    drive(&mut car, ControlInput::default(), dt, steps);

    let phi = omega * t_end;
    let (n, e) = (r * phi.sin(), r * (1.0 - phi.cos()));
    ((car.x() - n).powi(2) + (car.y() - e).powi(2)).sqrt()
}

#[test]
fn full_circle_returns_to_start() {
    assert!(circle_error(200, 1.0) < 1e-6);
}

#[test]
fn rk4_error_shrinks_at_fourth_order() {
    let coarse = circle_error(20, 0.25);
    let fine = circle_error(40, 0.25);
    assert!(fine < coarse);
    let ratio = coarse / fine;
    assert!(ratio > 12.0 && ratio < 20.0, "halving dt reduced error by {}", ratio);
}

#[test]
fn heading_and_steering_stay_in_bounds_under_adversarial_input() {
    let mut car = Bicycle::new(params(0.05, [0.0; 6])).unwrap();
    let dt = 0.01;
    for k in 0..20_000 {
        // flip steering torque every 3 s, always full throttle
        let torque = if (k / 300) % 2 == 0 { 1.0e6 } else { -1.0e6 };
        *car.force_mut() = car.max_force();
        *car.torque_mut() = torque;
        car.propagate(k as f64 * dt);

        assert!(car.psi() > -PI && car.psi() <= PI, "psi {} at step {}", car.psi(), k);
        assert!(car.theta().abs() <= car.max_steering_angle(), "theta {} at step {}", car.theta(), k);
    }
}

#[test]
fn stale_or_negative_time_leaves_pose_unchanged() {
    let mut car = Bicycle::new(params(0.1, [0.0, 0.0, 0.0, 4.0, 0.2, 0.1])).unwrap();
    *car.force_mut() = 1000.0;
    *car.torque_mut() = 1.0;
    car.propagate(0.5);
    car.propagate(1.0);
    let snap: State = *car.state();

    for t in [1.0, 0.75, 0.0, -3.0] {
        car.propagate(t);
        assert_eq!(*car.state(), snap, "t={} moved the vehicle", t);
    }
}

#[test]
fn integrator_is_pure_over_model() {
    let p = presets::sedan();
    let x = State::from_vector(&[3.0, -1.0, 0.0, 7.5, 2.9, -0.4].into());
    let u = ControlInput::new(1234.5, -0.75);
    let f = |s: &State, u: &ControlInput| derivatives(s, u, &p);
    let a = rk4(f, 0.016, &x, &u);
    let b = rk4(f, 0.016, &x, &u);
    for (ai, bi) in a.iter().zip(b.iter()) {
        assert_eq!(ai.to_bits(), bi.to_bits());
    }
}

#[test]
fn yaml_config_drives_like_preset() {
    let text = std::fs::read_to_string(concat!(env!("CARGO_MANIFEST_DIR"), "/config/sedan.yaml")).unwrap();
    let from_file = VehicleParams::from_yaml_str(&text).unwrap();
    let preset = presets::sedan();
    assert_eq!(from_file.name, preset.name);
    assert!((from_file.max_steering_angle - preset.max_steering_angle).abs() < 1e-12);

    let config = SimConfig { dt: 0.01, max_time: 5.0 };
    let mut a = Bicycle::new(from_file).unwrap();
    let mut b = Bicycle::new(preset).unwrap();
    let ra = sim::simulate_with(&mut a, &config, &mut ConstantDriver::new(3000.0, 0.5));
    let rb = sim::simulate_with(&mut b, &config, &mut ConstantDriver::new(3000.0, 0.5));
    let (la, lb) = (ra.last().unwrap().state, rb.last().unwrap().state);
    assert!((la.pos - lb.pos).norm() < 1e-6);
}
