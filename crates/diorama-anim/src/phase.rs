//! Declarative phase records evaluated every tick of a running sequence.

use glam::{Mat4, Vec3};

use diorama_scene::{ModelRef, transform};

use crate::curve::PathCurve;
use crate::sequence::SequenceInstance;

const SINGULAR_EPSILON: f32 = 1e-8;

/// Predicate over the sequence clock. Bounds are exclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeWindow {
    Always,
    Before(f32),
    After(f32),
    Between(f32, f32),
}

impl TimeWindow {
    pub fn contains(&self, timer: f32) -> bool {
        match *self {
            TimeWindow::Always => true,
            TimeWindow::Before(end) => timer < end,
            TimeWindow::After(start) => timer > start,
            TimeWindow::Between(start, end) => timer > start && timer < end,
        }
    }
}

/// What a phase does to each of its targets.
///
/// Rates are per second and get multiplied by the tick's elapsed time.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Spin about `axis` at `rate` radians per second.
    Rotate { rate: f32, axis: Vec3 },
    /// Orbit step: `rate` radians per second, offset of `offset_rate · dt`.
    Orbit { rate: f32, axis: Vec3, offset_rate: Vec3 },
    /// Local-frame translation at `velocity` units per second.
    Translate { velocity: Vec3 },
    /// Uniform scale by `1 + rate · dt`.
    Scale { rate: f32 },
    /// Replace the drawable with asset slot `asset` and reset the transform.
    Swap { asset: usize, transform: Mat4 },
    /// Move so the origin sits on `curve` at the sequence's progress.
    FollowPath { curve: PathCurve },
}

/// Per-tick inputs shared by every phase.
#[derive(Debug, Clone, Copy)]
pub struct Tick {
    pub dt: f32,
    /// `timer / duration`, clamped to `[0, 1]`.
    pub progress: f32,
}

impl Effect {
    pub(crate) fn apply(&self, tick: Tick, target: &mut SequenceInstance, models: &[ModelRef]) {
        let dt = tick.dt;
        match self {
            Effect::Rotate { rate, axis } => {
                target.transform = transform::rotate(target.transform, rate * dt, *axis);
            }
            Effect::Orbit {
                rate,
                axis,
                offset_rate,
            } => {
                target.transform =
                    transform::orbit(target.transform, rate * dt, *axis, *offset_rate * dt);
            }
            Effect::Translate { velocity } => {
                target.transform = transform::translate(target.transform, *velocity * dt);
            }
            Effect::Scale { rate } => {
                target.transform =
                    transform::scale(target.transform, Vec3::splat(1.0 + rate * dt));
            }
            Effect::Swap { asset, transform } => {
                if let Some(model) = models.get(*asset) {
                    target.model = *model;
                }
                target.transform = *transform;
            }
            Effect::FollowPath { curve } => {
                let goal = curve.evaluate(tick.progress);
                let delta = goal - transform::position(&target.transform);
                target.transform = step_towards(target.transform, delta);
            }
        }
    }
}

/// Translate by a world-space `delta` while keeping the accumulated
/// rotation and scale of `t`.
fn step_towards(t: Mat4, delta: Vec3) -> Mat4 {
    if t.determinant().abs() < SINGULAR_EPSILON {
        return Mat4::from_translation(delta) * t;
    }
    let local = t.inverse().transform_vector3(delta);
    transform::translate(t, local)
}

/// A time-gated effect on a set of the sequence's instances.
#[derive(Debug, Clone, PartialEq)]
pub struct Phase {
    pub window: TimeWindow,
    pub targets: Vec<usize>,
    pub effect: Effect,
    /// Fire on the first tick inside the window, never again.
    pub once: bool,
}

impl Phase {
    pub fn new(window: TimeWindow, targets: impl Into<Vec<usize>>, effect: Effect) -> Self {
        Self {
            window,
            targets: targets.into(),
            effect,
            once: false,
        }
    }

    pub fn once(mut self) -> Self {
        self.once = true;
        self
    }
}
