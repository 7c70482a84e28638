//! Controls and the intents they resolve to each frame.

use diorama_scene::{Axis, Sign, SignedAxis};

/// A bindable control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    Create(usize),
    Delete,
    SelectNext,
    SelectPrevious,
    ToggleMask(Axis),
    Translate(SignedAxis),
    ToggleFocus,
    Rotate(SignedAxis),
    ScaleIn,
    ScaleOut,
    Reflect,
    Shear(SignedAxis),
    Project,
    RunSequence(usize),
}

impl Control {
    /// Discrete controls fire once per physical press; the rest repeat every
    /// frame they are held.
    pub fn is_discrete(self) -> bool {
        !matches!(
            self,
            Control::Translate(_)
                | Control::Rotate(_)
                | Control::ScaleIn
                | Control::ScaleOut
                | Control::Shear(_)
        )
    }

    /// The intent this control produces for a frame of `dt` seconds.
    pub fn intent(self, dt: f32) -> Intent {
        match self {
            Control::Create(kind) => Intent::Create(kind),
            Control::Delete => Intent::Delete,
            Control::SelectNext => Intent::SelectNext,
            Control::SelectPrevious => Intent::SelectPrevious,
            Control::ToggleMask(axis) => Intent::ToggleMask(axis),
            Control::Translate(direction) => Intent::Translate { direction, dt },
            Control::ToggleFocus => Intent::ToggleFocus,
            Control::Rotate(direction) => Intent::Rotate { direction, dt },
            Control::ScaleIn => Intent::Scale {
                sign: Sign::Negative,
                dt,
            },
            Control::ScaleOut => Intent::Scale {
                sign: Sign::Positive,
                dt,
            },
            Control::Reflect => Intent::Reflect,
            Control::Shear(direction) => Intent::Shear { direction, dt },
            Control::Project => Intent::Project,
            Control::RunSequence(index) => Intent::RunSequence(index),
        }
    }
}

/// One edit to perform this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intent {
    Create(usize),
    Delete,
    SelectNext,
    SelectPrevious,
    ToggleMask(Axis),
    ToggleFocus,
    Translate { direction: SignedAxis, dt: f32 },
    Rotate { direction: SignedAxis, dt: f32 },
    Scale { sign: Sign, dt: f32 },
    Reflect,
    Shear { direction: SignedAxis, dt: f32 },
    Project,
    RunSequence(usize),
}

impl Intent {
    pub fn is_continuous(&self) -> bool {
        matches!(
            self,
            Intent::Translate { .. }
                | Intent::Rotate { .. }
                | Intent::Scale { .. }
                | Intent::Shear { .. }
        )
    }
}
