use tracing::{info, warn};

use crate::control::{ConstantDriver, Driver};
use crate::dynamics::state::{ControlInput, SimConfig, State};
use crate::vehicle::Bicycle;

// ---------------------------------------------------------------------------
// Recorded frame
// ---------------------------------------------------------------------------

/// Pose and applied input after one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub time: f64,
    pub state: State,
    pub input: ControlInput,
}

// ---------------------------------------------------------------------------
// Frame loop
// ---------------------------------------------------------------------------

/// Run one frame at time `t`: clear the input, take the driver's command
/// clamped to the vehicle's maxima, then propagate.
/// Returns the input that was applied.
pub fn step_frame(vehicle: &mut Bicycle, driver: &mut dyn Driver, t: f64) -> ControlInput {
    vehicle.input_mut().clear();
    let cmd = driver
        .command(vehicle, t)
        .clamped(vehicle.max_force(), vehicle.max_torque());
    *vehicle.input_mut() = cmd;
    vehicle.propagate(t);
    cmd
}

/// Drive `vehicle` from t = 0 to `config.max_time` in fixed frames of
/// `config.dt`, recording one sample per frame.
///
/// The frame at t = 0 only starts the vehicle clock, so the first sample is
/// the initial pose.
pub fn simulate_with(
    vehicle: &mut Bicycle,
    config: &SimConfig,
    driver: &mut dyn Driver,
) -> Vec<Sample> {
    if !(config.dt > 0.0 && config.dt.is_finite())
        || !(config.max_time >= 0.0 && config.max_time.is_finite())
    {
        warn!(dt = config.dt, max_time = config.max_time, "degenerate sim config, nothing to run");
        return Vec::new();
    }

    let frames = (config.max_time / config.dt).round() as usize;
    info!(
        vehicle = vehicle.name(),
        driver = driver.name(),
        frames,
        dt = config.dt,
        "simulation start"
    );

    let mut samples = Vec::with_capacity((frames + 1).min(1_000_000));
    for k in 0..=frames {
        // Step count instead of accumulating t += dt, so t never drifts.
        let t = k as f64 * config.dt;
        let input = step_frame(vehicle, driver, t);
        samples.push(Sample { time: t, state: *vehicle.state(), input });
    }

    if let Some(last) = samples.last() {
        info!(
            t = last.time,
            x = last.state.pos.x,
            y = last.state.pos.y,
            speed = last.state.vel,
            "simulation end"
        );
    }
    samples
}

/// Let the vehicle coast from its initial state.
pub fn simulate(vehicle: &mut Bicycle, config: &SimConfig) -> Vec<Sample> {
    let mut driver = ConstantDriver::default();
    simulate_with(vehicle, config, &mut driver)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
