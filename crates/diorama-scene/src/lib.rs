//! Scene composition core.
//!
//! This crate holds everything the interactive editor and the animation
//! sequencer share:
//! - Affine transform algebra over `glam::Mat4`
//! - The per-axis dimension mask
//! - The ordered instance list with its active-selection cursor
//! - The capability traits the core consumes (renderer, input, assets)

pub mod axis;
pub mod capability;
mod error;
pub mod mask;
pub mod scene;
pub mod transform;

pub use axis::{Axis, Sign, SignedAxis};
pub use capability::{AssetCatalog, InputSource, Key, ModelRef, Renderer};
pub use error::{Result, SceneError};
pub use mask::{DimensionMask, RotationFocus};
pub use scene::{Instance, Scene};
