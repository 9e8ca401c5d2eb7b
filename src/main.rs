use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use bicycle_sim::control::{Driver, ScheduleDriver};
use bicycle_sim::dynamics::SimConfig;
use bicycle_sim::io;
use bicycle_sim::sim::{self, Sample};
use bicycle_sim::sim::event::{
    detect_events, EventDetector, EventKind, FullTurnDetector, SteeringLimitDetector, StopDetector,
};
use bicycle_sim::vehicle::{presets, Bicycle, VehicleParams};

#[derive(Parser, Debug)]
#[command(name = "bicycle-sim", version, about = "Headless kinematic bicycle drive")]
struct Opts {
    /// Vehicle parameter file (YAML). Falls back to --preset when omitted.
    config: Option<PathBuf>,

    /// Built-in vehicle: sedan or kart
    #[arg(long, default_value = "sedan")]
    preset: String,

    /// Frame step, s
    #[arg(long, default_value_t = 0.01)]
    dt: f64,

    /// Drive length, s
    #[arg(long, default_value_t = 20.0)]
    duration: f64,

    /// Drive force as a fraction of max_force, -1..1
    #[arg(long, default_value_t = 0.5, allow_hyphen_values = true)]
    throttle: f64,

    /// Steering torque as a fraction of max_torque, -1..1 (positive turns right)
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    steer: f64,

    /// Release the steering torque after this many seconds, holding the angle
    #[arg(long)]
    steer_for: Option<f64>,

    /// Coast (zero force) from this time on
    #[arg(long)]
    coast_at: Option<f64>,

    /// Write the trajectory as CSV
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Write a JSON drive summary
    #[arg(long)]
    json: Option<PathBuf>,

    /// Log filter when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let opt = Opts::parse();
    init_tracing(&opt.log_level);

    let params = match &opt.config {
        Some(path) => VehicleParams::from_file(path)
            .with_context(|| format!("loading vehicle config {}", path.display()))?,
        None => match opt.preset.as_str() {
            "sedan" => presets::sedan(),
            "kart" => presets::kart(),
            other => bail!("unknown preset `{}` (expected sedan or kart)", other),
        },
    };
    if !(opt.dt > 0.0 && opt.dt.is_finite()) {
        bail!("--dt must be positive and finite, got {}", opt.dt);
    }
    if !(opt.duration >= 0.0 && opt.duration.is_finite()) {
        bail!("--duration must be non-negative and finite, got {}", opt.duration);
    }

    let mut vehicle = Bicycle::new(params).context("building vehicle")?;
    let config = SimConfig { dt: opt.dt, max_time: opt.duration };
    let mut driver = build_schedule(&opt, &vehicle);

    let samples = sim::simulate_with(&mut vehicle, &config, &mut driver);

    let mut detectors: Vec<Box<dyn EventDetector>> = vec![
        Box::new(FullTurnDetector::new()),
        Box::new(SteeringLimitDetector::new(vehicle.max_steering_angle())),
        Box::new(StopDetector::new(0.05)),
    ];
    let events = detect_events(&samples, &mut detectors);

    let summary = io::DriveSummary::from_samples(&samples).context("empty drive")?;
    print_report(&vehicle, &driver, &config, &samples, &events, &summary);

    if let Some(path) = &opt.csv {
        io::write_trajectory_file(path, &samples)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("  Trajectory written to {}", path.display());
    }
    if let Some(path) = &opt.json {
        io::write_summary_file(path, vehicle.params(), &summary)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("  Summary written to {}", path.display());
    }

    Ok(())
}

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

/// Scripted inputs from the command line: throttle and steer from t = 0,
/// optional steer release and coast points.
fn build_schedule(opt: &Opts, vehicle: &Bicycle) -> ScheduleDriver {
    let force = opt.throttle.clamp(-1.0, 1.0) * vehicle.max_force();
    let torque = opt.steer.clamp(-1.0, 1.0) * vehicle.max_torque();

    let mut schedule = ScheduleDriver::new().then(0.0, force, torque);
    match (opt.steer_for, opt.coast_at) {
        (Some(ts), Some(tc)) if ts < tc => {
            schedule = schedule.then(ts, force, 0.0).then(tc, 0.0, 0.0);
        }
        (Some(ts), Some(tc)) => {
            schedule = schedule.then(tc, 0.0, torque).then(ts, 0.0, 0.0);
        }
        (Some(ts), None) => schedule = schedule.then(ts, force, 0.0),
        (None, Some(tc)) => schedule = schedule.then(tc, 0.0, torque),
        (None, None) => {}
    }
    schedule
}

fn print_report(
    vehicle: &Bicycle,
    driver: &dyn Driver,
    config: &SimConfig,
    samples: &[Sample],
    events: &[sim::event::SimEvent],
    summary: &io::DriveSummary,
) {
    let p = vehicle.params();

    println!();
    println!("====================================================================");
    println!("  BICYCLE DRIVE SIMULATION — {}", p.name);
    println!("====================================================================");
    println!();
    println!("  Vehicle Parameters");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  Mass:          {:>8.1} kg    Inertia:      {:>8.2} kg·m^2",
        p.mass, p.inertia
    );
    println!(
        "  Wheelbase:     {:>8.2} m     Drag:         {:>8.3} 1/s",
        p.length, p.drag
    );
    println!(
        "  Max force:     {:>8.0} N     Max torque:   {:>8.2} N·m",
        p.max_force, p.max_torque
    );
    println!(
        "  Max steer:     {:>8.1} deg   Min radius:   {:>8.2} m",
        p.max_steering_angle.to_degrees(),
        p.length / p.max_steering_angle.tan()
    );
    println!();

    println!("  Drive Events ({})", driver.name());
    println!("  ──────────────────────────────────────────────────────────────────");
    if events.is_empty() {
        println!("  (none)");
    }
    for e in events {
        let label = match &e.kind {
            EventKind::FullTurn { direction } if *direction > 0 => "FULL TURN (right)".to_string(),
            EventKind::FullTurn { .. } => "FULL TURN (left)".to_string(),
            EventKind::SteeringLimit { angle } => format!("STEER LIMIT {:+.1} deg", angle.to_degrees()),
            EventKind::Stopped => "STOPPED".to_string(),
        };
        println!(
            "  t={:>7.2}s   x={:>9.2}m   y={:>9.2}m   v={:>6.2}m/s   {}",
            e.time, e.sample.state.pos.x, e.sample.state.pos.y, e.sample.state.vel, label
        );
    }
    println!();

    println!("  Drive Summary");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!("  Distance:      {:>8.1} m", summary.distance_m);
    println!("  Max speed:     {:>8.2} m/s ({:.1} km/h)", summary.max_speed_ms, summary.max_speed_ms * 3.6);
    println!(
        "  Final pose:    x={:.2} m  y={:.2} m  heading={:.1} deg  steer={:.1} deg",
        summary.final_x_m, summary.final_y_m, summary.final_heading_deg, summary.final_steering_deg
    );
    println!();

    println!("  Trajectory");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  {:>7}  {:>9}  {:>9}  {:>8}  {:>8}  {:>8}",
        "t (s)", "x (m)", "y (m)", "v (m/s)", "psi(deg)", "th(deg)"
    );
    println!("  {}", "─".repeat(60));

    let sample_interval = (samples.len() / 25).max(1);
    for (i, s) in samples.iter().enumerate() {
        if i % sample_interval != 0 && i != samples.len() - 1 {
            continue;
        }
        println!(
            "  {:>7.2}  {:>9.2}  {:>9.2}  {:>8.3}  {:>8.1}  {:>8.2}",
            s.time,
            s.state.pos.x,
            s.state.pos.y,
            s.state.vel,
            s.state.psi.to_degrees(),
            s.state.theta.to_degrees()
        );
    }

    println!();
    println!("  Simulation: {} frames, dt={} s", samples.len(), config.dt);
    println!("====================================================================");
    println!();
}
