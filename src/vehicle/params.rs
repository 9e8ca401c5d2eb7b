use std::f64::consts::FRAC_PI_2;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dynamics::state::{StateVector, NUM_STATES};
use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Vehicle parameters (loaded once, never mutated)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleParams {
    #[serde(default = "default_name")]
    pub name: String,
    pub mass: f64,               // kg
    pub inertia: f64,            // kg·m^2, about the steering axis
    pub length: f64,             // m, wheelbase
    pub max_force: f64,          // N
    pub max_torque: f64,         // N·m
    pub max_steering_angle: f64, // rad, must stay below π/2
    pub drag: f64,               // 1/s, linear drag on speed
    pub x0: [f64; NUM_STATES],   // [north, east, up, speed, heading, steering]
}

fn default_name() -> String {
    "car".into()
}

impl VehicleParams {
    /// Parse parameters from a YAML document and validate them.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let params: VehicleParams = serde_yaml::from_str(text)?;
        params.validate()?;
        Ok(params)
    }

    /// Read and validate a YAML parameter file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    pub fn initial_state(&self) -> StateVector {
        StateVector::from(self.x0)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("mass", self.mass)?;
        positive("inertia", self.inertia)?;
        positive("length", self.length)?;
        non_negative("drag", self.drag)?;
        non_negative("max_force", self.max_force)?;
        non_negative("max_torque", self.max_torque)?;

        let max_steer = self.max_steering_angle;
        if !(max_steer > 0.0 && max_steer < FRAC_PI_2) {
            return Err(invalid(
                "max_steering_angle",
                format!("must be in (0, pi/2) rad, got {}", max_steer),
            ));
        }

        if let Some(i) = self.x0.iter().position(|v| !v.is_finite()) {
            return Err(invalid("x0", format!("entry {} is not finite", i)));
        }
        // An initial steer past the bound is accepted; the first step clamps it.
        Ok(())
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}

fn positive(field: &'static str, v: f64) -> Result<(), ConfigError> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("must be positive and finite, got {}", v)))
    }
}

fn non_negative(field: &'static str, v: f64) -> Result<(), ConfigError> {
    if v.is_finite() && v >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("must be non-negative and finite, got {}", v)))
    }
}

// ---------------------------------------------------------------------------
// Parameter builder
// ---------------------------------------------------------------------------

pub struct VehicleParamsBuilder {
    name: String,
    mass: f64,
    inertia: f64,
    length: f64,
    max_force: f64,
    max_torque: f64,
    max_steering_angle: f64,
    drag: f64,
    x0: [f64; NUM_STATES],
}

impl VehicleParamsBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mass: 1000.0,
            inertia: 1.0,
            length: 2.5,
            max_force: 4000.0,
            max_torque: 2.0,
            max_steering_angle: 0.5,
            drag: 0.1,
            x0: [0.0; NUM_STATES],
        }
    }

    pub fn mass(mut self, v: f64) -> Self { self.mass = v; self }
    pub fn inertia(mut self, v: f64) -> Self { self.inertia = v; self }
    pub fn length(mut self, v: f64) -> Self { self.length = v; self }
    pub fn max_force(mut self, v: f64) -> Self { self.max_force = v; self }
    pub fn max_torque(mut self, v: f64) -> Self { self.max_torque = v; self }
    pub fn max_steering_angle(mut self, v: f64) -> Self { self.max_steering_angle = v; self }
    pub fn drag(mut self, v: f64) -> Self { self.drag = v; self }
    pub fn x0(mut self, v: [f64; NUM_STATES]) -> Self { self.x0 = v; self }

    pub fn build(self) -> VehicleParams {
        VehicleParams {
            name: self.name,
            mass: self.mass,
            inertia: self.inertia,
            length: self.length,
            max_force: self.max_force,
            max_torque: self.max_torque,
            max_steering_angle: self.max_steering_angle,
            drag: self.drag,
            x0: self.x0,
        }
    }
}

// ---------------------------------------------------------------------------
// Preset vehicles
// ---------------------------------------------------------------------------

pub mod presets {
    use super::*;

    /// Mid-size car, parked at the origin facing north.
    /// Mirrors `config/sedan.yaml`.
    pub fn sedan() -> VehicleParams {
        VehicleParamsBuilder::new("sedan")
            .mass(1500.0)
            .inertia(2.0)
            .length(2.7)
            .max_force(6000.0)
            .max_torque(3.0)
            .max_steering_angle(35.0_f64.to_radians())
            .drag(0.15)
            .build()
    }

    /// Light go-kart: short wheelbase, sharp steering.
    pub fn kart() -> VehicleParams {
        VehicleParamsBuilder::new("kart")
            .mass(150.0)
            .inertia(0.5)
            .length(1.05)
            .max_force(1200.0)
            .max_torque(2.5)
            .max_steering_angle(30.0_f64.to_radians())
            .drag(0.3)
            .build()
    }
}
