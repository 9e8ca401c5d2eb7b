use crate::dynamics::state::{ControlInput, State, StateDelta, PSI, PX, PY, PZ, THETA, VEL};
use crate::vehicle::VehicleParams;

// ---------------------------------------------------------------------------
// Kinematic bicycle equations of motion
// ---------------------------------------------------------------------------

/// Continuous-time state derivative of the rear-axle kinematic bicycle.
///
///   ẋ_north = v·cos ψ
///   ẋ_east  = v·sin ψ
///   ẋ_up    = 0
///   ψ̇       = v·tan θ / L
///   v̇       = F/m − c_d·v
///   θ̇       = τ/I
///
/// No slip and no lateral dynamics. `tan θ` diverges at ±90°, which the
/// parameter validation keeps out of reach.
pub fn derivatives(state: &State, input: &ControlInput, params: &VehicleParams) -> StateDelta {
    let [v_north, v_east] = state.planar_velocity();
    let mut dx = StateDelta::zeros();
    dx[PX] = v_north;
    dx[PY] = v_east;
    dx[PZ] = 0.0;
    dx[PSI] = state.vel * state.theta.tan() / params.length;
    dx[VEL] = input.force / params.mass - params.drag * state.vel;
    dx[THETA] = input.torque / params.inertia;
    dx
}
