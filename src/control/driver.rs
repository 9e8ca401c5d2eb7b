use crate::dynamics::state::ControlInput;
use crate::vehicle::Bicycle;

/// Source of control input for the frame loop.
///
/// Implement this to steer a vehicle from a script, a keyboard, or a
/// controller. The returned command is clamped to the vehicle's configured
/// maxima before it is applied.
pub trait Driver {
    /// Force/torque to hold over the frame ending at time `t`.
    fn command(&mut self, vehicle: &Bicycle, t: f64) -> ControlInput;

    /// Reset internal state, if any.
    fn reset(&mut self) {}

    /// Human-readable name for logging/display.
    fn name(&self) -> &str {
        "unnamed"
    }
}

// ---------------------------------------------------------------------------
// Scripted drivers
// ---------------------------------------------------------------------------

/// Holds one command forever. The default coasts.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstantDriver {
    pub input: ControlInput,
}

impl ConstantDriver {
    pub fn new(force: f64, torque: f64) -> Self {
        Self { input: ControlInput::new(force, torque) }
    }
}

impl Driver for ConstantDriver {
    fn command(&mut self, _vehicle: &Bicycle, _t: f64) -> ControlInput {
        self.input
    }

    fn name(&self) -> &str {
        "constant"
    }
}

/// Piecewise-constant commands keyed by start time.
///
/// Before the first entry the driver coasts; afterwards the latest entry
/// whose start time has passed is held.
#[derive(Debug, Clone, Default)]
pub struct ScheduleDriver {
    segments: Vec<(f64, ControlInput)>,
}

impl ScheduleDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a segment starting at `start` (s). Segments may be added in any
    /// order.
    pub fn then(mut self, start: f64, force: f64, torque: f64) -> Self {
        self.segments.push((start, ControlInput::new(force, torque)));
        self.segments.sort_by(|a, b| a.0.total_cmp(&b.0));
        self
    }

    pub fn at(&self, t: f64) -> ControlInput {
        self.segments
            .iter()
            .take_while(|(start, _)| *start <= t)
            .last()
            .map(|(_, u)| *u)
            .unwrap_or_default()
    }
}

impl Driver for ScheduleDriver {
    fn command(&mut self, _vehicle: &Bicycle, t: f64) -> ControlInput {
        self.at(t)
    }

    fn name(&self) -> &str {
        "schedule"
    }
}
