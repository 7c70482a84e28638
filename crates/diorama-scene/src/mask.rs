//! Per-axis gate for scale, reflect, shear and projection magnitudes.

use std::fmt;

use glam::Vec3;
use crate::axis::Axis;

/// Per-axis magnitudes. An axis is "on" while its magnitude is positive.
///
/// Toggling flips an axis between zero and the mask's fixed magnitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DimensionMask {
    factors: Vec3,
    magnitude: f32,
}

impl DimensionMask {
    /// All axes on at `magnitude`.
    pub fn new(magnitude: f32) -> Self {
        Self {
            factors: Vec3::splat(magnitude),
            magnitude,
        }
    }

    pub fn magnitude(&self) -> f32 {
        self.magnitude
    }

    pub fn get(&self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.factors.x,
            Axis::Y => self.factors.y,
            Axis::Z => self.factors.z,
        }
    }

    pub fn is_on(&self, axis: Axis) -> bool {
        self.get(axis) > 0.0
    }

    /// Flip `axis` between off and the fixed magnitude. Returns the new state.
    pub fn toggle(&mut self, axis: Axis) -> bool {
        let value = if self.is_on(axis) { 0.0 } else { self.magnitude };
        match axis {
            Axis::X => self.factors.x = value,
            Axis::Y => self.factors.y = value,
            Axis::Z => self.factors.z = value,
        }
        value > 0.0
    }

    /// The coefficients fed to scale, reflect, shear and projection.
    pub fn factors(&self) -> Vec3 {
        self.factors
    }
}

impl Default for DimensionMask {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl fmt::Display for DimensionMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, axis) in Axis::ALL.into_iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            let state = if self.is_on(axis) { "ON" } else { "OFF" };
            write!(f, "{axis}: {state}")?;
        }
        Ok(())
    }
}

/// How rotation input is interpreted for the active instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RotationFocus {
    /// Spin in place about the instance's own axes.
    #[default]
    AroundSelf,
    /// Tumble around a point offset from the instance.
    AroundOrbitPoint,
}

impl RotationFocus {
    pub fn toggle(&mut self) {
        *self = match self {
            RotationFocus::AroundSelf => RotationFocus::AroundOrbitPoint,
            RotationFocus::AroundOrbitPoint => RotationFocus::AroundSelf,
        };
    }
}

impl fmt::Display for RotationFocus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RotationFocus::AroundSelf => f.write_str("axis"),
            RotationFocus::AroundOrbitPoint => f.write_str("point"),
        }
    }
}
