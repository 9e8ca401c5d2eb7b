use std::f64::consts::TAU;

use crate::dynamics::angles::wrap_angle;
use super::runner::Sample;

// ---------------------------------------------------------------------------
// Drive events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    /// Heading has accumulated a full revolution; +1 clockwise (right turns).
    FullTurn { direction: i8 },
    SteeringLimit { angle: f64 },
    Stopped,
}

#[derive(Debug, Clone)]
pub struct SimEvent {
    pub time: f64,
    pub kind: EventKind,
    pub sample: Sample,
}

/// Passive detector over consecutive samples.
pub trait EventDetector {
    fn check(&mut self, prev: &Sample, current: &Sample) -> Option<EventKind>;
}

/// Run every detector over a recorded drive.
pub fn detect_events(samples: &[Sample], detectors: &mut [Box<dyn EventDetector>]) -> Vec<SimEvent> {
    let mut events = Vec::new();
    for w in samples.windows(2) {
        for det in detectors.iter_mut() {
            if let Some(kind) = det.check(&w[0], &w[1]) {
                events.push(SimEvent { time: w[1].time, kind, sample: w[1] });
            }
        }
    }
    events
}

/// Fires each time the unwrapped heading change reaches another ±2π.
#[derive(Debug, Default)]
pub struct FullTurnDetector {
    swept: f64,
}

impl FullTurnDetector {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventDetector for FullTurnDetector {
    fn check(&mut self, prev: &Sample, current: &Sample) -> Option<EventKind> {
        // Stored heading is wrapped; undo that across the step.
        self.swept += wrap_angle(current.state.psi - prev.state.psi);
        if self.swept.abs() >= TAU {
            let direction = self.swept.signum();
            self.swept -= direction * TAU;
            Some(EventKind::FullTurn { direction: direction as i8 })
        } else {
            None
        }
    }
}

/// Fires when the steering angle reaches its bound, once per excursion.
#[derive(Debug)]
pub struct SteeringLimitDetector {
    pub limit: f64,
    engaged: bool,
}

impl SteeringLimitDetector {
    pub fn new(limit: f64) -> Self {
        Self { limit, engaged: false }
    }
}

impl EventDetector for SteeringLimitDetector {
    fn check(&mut self, _prev: &Sample, current: &Sample) -> Option<EventKind> {
        let at_limit = current.state.theta.abs() >= self.limit - 1e-9;
        let fire = at_limit && !self.engaged;
        self.engaged = at_limit;
        fire.then_some(EventKind::SteeringLimit { angle: current.state.theta })
    }
}

/// Fires when a moving vehicle slows below `threshold` (m/s).
#[derive(Debug)]
pub struct StopDetector {
    pub threshold: f64,
    moving: bool,
}

impl StopDetector {
    pub fn new(threshold: f64) -> Self {
        Self { threshold, moving: false }
    }
}

impl EventDetector for StopDetector {
    fn check(&mut self, prev: &Sample, current: &Sample) -> Option<EventKind> {
        if prev.state.vel.abs() > self.threshold {
            self.moving = true;
        }
        if self.moving && current.state.vel.abs() <= self.threshold {
            self.moving = false;
            Some(EventKind::Stopped)
        } else {
            None
        }
    }
}
