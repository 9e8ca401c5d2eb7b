use std::ops::{Add, Mul};

// ---------------------------------------------------------------------------
// Classical 4th-order Runge-Kutta, fixed step
// ---------------------------------------------------------------------------

/// One RK4 step of `f` from `x` over `dt`, with `u` held constant across all
/// four stages.
///
/// Returns the increment to add to `x`; the caller applies it together with
/// any wrapping or saturation. Stages are formed with plain `S + D` addition,
/// so no normalization happens between them. The function keeps no state:
/// identical arguments give bit-identical output.
pub fn rk4<S, U, D, F>(f: F, dt: f64, x: &S, u: &U) -> D
where
    S: Clone + Add<D, Output = S>,
    D: Copy + Add<Output = D> + Mul<f64, Output = D>,
    F: Fn(&S, &U) -> D,
{
    let k1 = f(x, u);
    let k2 = f(&(x.clone() + k1 * (dt / 2.0)), u);
    let k3 = f(&(x.clone() + k2 * (dt / 2.0)), u);
    let k4 = f(&(x.clone() + k3 * dt), u);
    (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (dt / 6.0)
}
