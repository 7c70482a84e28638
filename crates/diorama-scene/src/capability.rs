//! Capabilities the core consumes from the platform.
//!
//! The scene, edit session and sequencer never talk to a window, a GPU or a
//! file system directly. They are handed implementations of these traits.

use glam::Mat4;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Opaque handle to a model resolved by an [`AssetCatalog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelRef(pub usize);

impl ModelRef {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Keys the core can bind intents to.
///
/// Platforms translate their native key codes into this set; anything
/// they cannot map is simply never reported as pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Key {
    Digit1,
    Digit2,
    Digit3,
    Digit4,
    Delete,
    ArrowLeft,
    ArrowRight,
    X,
    Y,
    Z,
    Numpad2,
    Numpad4,
    Numpad6,
    Numpad7,
    Numpad8,
    Numpad9,
    NumpadAdd,
    NumpadSubtract,
    I,
    J,
    K,
    L,
    U,
    O,
    V,
    N,
    G,
    B,
    F,
    H,
    P,
    ShiftLeft,
    ControlLeft,
    F1,
    F2,
}

/// Draws one instance under a transform and the shared camera pair.
pub trait Renderer {
    fn draw(&mut self, model: ModelRef, transform: &Mat4, view: &Mat4, projection: &Mat4);
}

/// Polled key state. Unknown keys read as not pressed.
pub trait InputSource {
    fn is_pressed(&self, key: Key) -> bool;
}

/// Resolves catalog identifiers into drawable models.
///
/// Loading may touch the disk and is allowed to be slow; callers invoke it
/// synchronously.
pub trait AssetCatalog {
    fn load(&mut self, id: &str) -> Result<ModelRef>;
}
