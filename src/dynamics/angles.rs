use std::f64::consts::{PI, TAU};

/// Wrap an angle into (-π, π].
pub fn wrap_angle(angle: f64) -> f64 {
    let mut a = angle % TAU;
    if a > PI {
        a -= TAU;
    } else if a <= -PI {
        a += TAU;
    }
    a
}

/// Hard-clamp `value` into `[min, max]`.
pub fn saturate(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}
