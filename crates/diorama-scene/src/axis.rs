//! Axis tokens used by bindings and edit intents.

use std::fmt;
use std::str::FromStr;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::SceneError;

/// One of the three principal axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Unit vector along the axis.
    pub fn unit(self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }

    pub fn token(self) -> char {
        match self {
            Axis::X => 'x',
            Axis::Y => 'y',
            Axis::Z => 'z',
        }
    }
}

impl FromStr for Axis {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "x" => Ok(Axis::X),
            "y" => Ok(Axis::Y),
            "z" => Ok(Axis::Z),
            _ => Err(SceneError::InvalidAxisToken(s.to_string())),
        }
    }
}

impl TryFrom<String> for Axis {
    type Error = SceneError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Axis> for String {
    fn from(value: Axis) -> Self {
        value.token().to_string()
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token().to_ascii_uppercase())
    }
}

/// Direction along an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Sign {
    Positive,
    Negative,
}

impl Sign {
    pub fn value(self) -> f32 {
        match self {
            Sign::Positive => 1.0,
            Sign::Negative => -1.0,
        }
    }
}

/// An axis with a direction, written `+x` / `-z` in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SignedAxis {
    pub axis: Axis,
    pub sign: Sign,
}

impl SignedAxis {
    pub const fn new(axis: Axis, sign: Sign) -> Self {
        Self { axis, sign }
    }

    pub const fn pos(axis: Axis) -> Self {
        Self::new(axis, Sign::Positive)
    }

    pub const fn neg(axis: Axis) -> Self {
        Self::new(axis, Sign::Negative)
    }

    /// Signed unit vector.
    pub fn vector(self) -> Vec3 {
        self.axis.unit() * self.sign.value()
    }
}

impl FromStr for SignedAxis {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        let (sign, rest) = match token.chars().next() {
            Some('+') => (Sign::Positive, &token[1..]),
            Some('-') => (Sign::Negative, &token[1..]),
            _ => return Err(SceneError::InvalidAxisToken(s.to_string())),
        };
        let axis = rest
            .parse::<Axis>()
            .map_err(|_| SceneError::InvalidAxisToken(s.to_string()))?;
        Ok(Self { axis, sign })
    }
}

impl TryFrom<String> for SignedAxis {
    type Error = SceneError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SignedAxis> for String {
    fn from(value: SignedAxis) -> Self {
        value.to_string()
    }
}

impl fmt::Display for SignedAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = match self.sign {
            Sign::Positive => '+',
            Sign::Negative => '-',
        };
        write!(f, "{sign}{}", self.axis.token())
    }
}
