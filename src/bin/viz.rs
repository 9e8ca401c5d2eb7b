use std::collections::VecDeque;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use eframe::egui;
use egui_plot::{Line, Plot, PlotPoints, Polygon};

use bicycle_sim::control::{Driver, KeyState};
use bicycle_sim::sim;
use bicycle_sim::vehicle::{presets, Bicycle, VehicleParams};

const TRAIL_LEN: usize = 4000;

#[derive(Parser, Debug)]
#[command(name = "bicycle-viz", version, about = "Drive a kinematic bicycle with the arrow keys")]
struct Opts {
    /// Vehicle parameter file (YAML); the sedan preset when omitted
    config: Option<PathBuf>,

    /// Simulated seconds advanced per rendered frame
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f64,
}

fn main() -> Result<()> {
    let opt = Opts::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let params = match &opt.config {
        Some(path) => VehicleParams::from_file(path)
            .with_context(|| format!("loading vehicle config {}", path.display()))?,
        None => presets::sedan(),
    };
    let vehicle = Bicycle::new(params)?;

    let app = DriveViz::new(vehicle, opt.dt);
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([900.0, 900.0]),
        ..Default::default()
    };
    eframe::run_native("Car Simulator", options, Box::new(|_| Ok(Box::new(app))))
        .map_err(|e| anyhow::anyhow!("viewer failed: {e}"))
}

struct DriveViz {
    vehicle: Bicycle,
    keys: KeyState,
    t: f64,
    dt: f64,
    running: bool,
    trail: VecDeque<[f64; 2]>,
}

impl DriveViz {
    fn new(vehicle: Bicycle, dt: f64) -> Self {
        Self {
            vehicle,
            keys: KeyState::default(),
            t: 0.0,
            dt,
            running: true,
            trail: VecDeque::with_capacity(TRAIL_LEN),
        }
    }

    fn advance(&mut self) {
        sim::step_frame(&mut self.vehicle, &mut self.keys, self.t);
        self.t += self.dt;

        if self.trail.len() == TRAIL_LEN {
            self.trail.pop_front();
        }
        self.trail.push_back(plot_xy(self.vehicle.x(), self.vehicle.y()));
    }

    fn reset(&mut self) {
        self.vehicle.reset();
        self.keys.reset();
        self.t = 0.0;
        self.trail.clear();
    }
}

/// Plot axes: east to the right, north up.
fn plot_xy(north: f64, east: f64) -> [f64; 2] {
    [east, north]
}

/// Rectangle of `half_len` × `half_width` centred `ahead` metres along
/// `heading` from (north, east).
fn oriented_box(north: f64, east: f64, heading: f64, ahead: f64, half_len: f64, half_width: f64) -> Vec<[f64; 2]> {
    let (s, c) = heading.sin_cos();
    let cn = north + ahead * c;
    let ce = east + ahead * s;
    [(half_len, half_width), (half_len, -half_width), (-half_len, -half_width), (-half_len, half_width)]
        .iter()
        .map(|&(fwd, side)| {
            // right of the heading is (-sin, cos) in (north, east)
            plot_xy(cn + fwd * c - side * s, ce + fwd * s + side * c)
        })
        .collect()
}

impl eframe::App for DriveViz {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut single_step = false;
        ctx.input(|i| {
            self.keys.forward = i.key_down(egui::Key::ArrowUp);
            self.keys.reverse = i.key_down(egui::Key::ArrowDown);
            self.keys.left = i.key_down(egui::Key::ArrowLeft);
            self.keys.right = i.key_down(egui::Key::ArrowRight);
            if i.key_pressed(egui::Key::R) {
                self.running = !self.running;
            }
            if i.key_pressed(egui::Key::S) {
                self.running = false;
                single_step = true;
            }
        });
        if ctx.input(|i| i.key_pressed(egui::Key::Space)) {
            self.reset();
        }
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }

        if self.running || single_step {
            self.advance();
        }

        let v = &self.vehicle;
        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.heading(format!("Vehicle: {}", v.name()));
            ui.label(format!(
                "t = {:.2} s  |  speed {:.2} m/s  |  heading {:.1}°  |  steer {:.1}°  |  {}  |  driver: {}",
                self.t,
                v.speed(),
                v.psi().to_degrees(),
                v.theta().to_degrees(),
                if self.running { "running" } else { "paused" },
                self.keys.name(),
            ));
            ui.label("Arrows drive · R run/pause · S step · Space reset · Esc quit");
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let p = v.params();
            let (n, e, psi) = (v.x(), v.y(), v.psi());
            let body = oriented_box(n, e, psi, p.length / 2.0, p.length / 2.0 + 0.8, 0.9);
            let wheel_len = 0.35;
            let rear = oriented_box(n, e, psi, 0.0, wheel_len, 0.12);
            let fn_ = n + p.length * psi.cos();
            let fe = e + p.length * psi.sin();
            let front = oriented_box(fn_, fe, psi + v.theta(), 0.0, wheel_len, 0.12);
            let trail: PlotPoints = self.trail.iter().copied().collect();

            Plot::new("arena")
                .data_aspect(1.0)
                .x_axis_label("East (m)")
                .y_axis_label("North (m)")
                .show(ui, |plot_ui| {
                    plot_ui.line(Line::new("Path", trail));
                    plot_ui.polygon(Polygon::new("Body", PlotPoints::from(body)));
                    plot_ui.polygon(Polygon::new("Rear wheel", PlotPoints::from(rear)));
                    plot_ui.polygon(Polygon::new("Front wheel", PlotPoints::from(front)));
                });
        });

        if self.running {
            ctx.request_repaint();
        }
    }
}
