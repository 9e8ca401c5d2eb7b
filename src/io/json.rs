use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;

use crate::sim::Sample;
use crate::vehicle::VehicleParams;

/// Summary statistics computed from a recorded drive.
#[derive(Debug, Clone, Serialize)]
pub struct DriveSummary {
    pub duration_s: f64,
    pub frames: usize,
    pub distance_m: f64,
    pub max_speed_ms: f64,
    pub final_x_m: f64,
    pub final_y_m: f64,
    pub final_heading_deg: f64,
    pub final_steering_deg: f64,
}

impl DriveSummary {
    /// Compute summary from samples. `None` for an empty drive.
    pub fn from_samples(samples: &[Sample]) -> Option<Self> {
        let first = samples.first()?;
        let last = samples.last()?;

        let distance_m: f64 = samples
            .windows(2)
            .map(|w| (w[1].state.pos - w[0].state.pos).norm())
            .sum();

        let max_speed_ms = samples
            .iter()
            .map(|s| s.state.vel.abs())
            .fold(0.0_f64, f64::max);

        Some(DriveSummary {
            duration_s: last.time - first.time,
            frames: samples.len(),
            distance_m,
            max_speed_ms,
            final_x_m: last.state.pos.x,
            final_y_m: last.state.pos.y,
            final_heading_deg: last.state.psi.to_degrees(),
            final_steering_deg: last.state.theta.to_degrees(),
        })
    }
}

#[derive(Serialize)]
struct VehicleInfo<'a> {
    name: &'a str,
    mass_kg: f64,
    wheelbase_m: f64,
    max_steering_deg: f64,
}

#[derive(Serialize)]
struct Report<'a> {
    vehicle: VehicleInfo<'a>,
    drive: &'a DriveSummary,
}

/// Write the drive summary as pretty JSON.
pub fn write_summary<W: Write>(
    writer: &mut W,
    params: &VehicleParams,
    summary: &DriveSummary,
) -> io::Result<()> {
    let report = Report {
        vehicle: VehicleInfo {
            name: &params.name,
            mass_kg: params.mass,
            wheelbase_m: params.length,
            max_steering_deg: params.max_steering_angle.to_degrees(),
        },
        drive: summary,
    };
    serde_json::to_writer_pretty(&mut *writer, &report)?;
    writeln!(writer)
}

/// Write the drive summary JSON to a file.
pub fn write_summary_file(
    path: impl AsRef<Path>,
    params: &VehicleParams,
    summary: &DriveSummary,
) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_summary(&mut file, params, summary)
}
