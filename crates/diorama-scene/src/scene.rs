//! Ordered collection of placed instances with an active-selection cursor.

use glam::{Mat4, Vec3};
use log::debug;

use crate::capability::{ModelRef, Renderer};
use crate::error::{Result, SceneError};
use crate::transform;

/// Scale applied to freshly created instances.
const SPAWN_SCALE: f32 = 0.1;

/// One placed occurrence of a catalog model.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    pub model: ModelRef,
    pub transform: Mat4,
    /// Creation index, never reused.
    pub order: u32,
}

/// Instances in draw order.
///
/// Indices are not stable: removing an instance shifts every later one
/// down by one.
#[derive(Debug, Default)]
pub struct Scene {
    instances: Vec<Instance>,
    active: usize,
    next_order: u32,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an instance of `model` and make it active.
    ///
    /// Each new instance starts one unit further along +X than the previous
    /// one and pre-shrunk, so default placements never overlap.
    pub fn add_instance(&mut self, model: ModelRef) -> usize {
        let order = self.next_order;
        self.next_order += 1;

        let offset = Vec3::new(order as f32, 0.0, 0.0);
        let transform = transform::scale(
            transform::translate(Mat4::IDENTITY, offset),
            Vec3::splat(SPAWN_SCALE),
        );
        self.instances.push(Instance {
            model,
            transform,
            order,
        });
        self.active = self.instances.len() - 1;
        self.active
    }

    /// Remove the active instance.
    ///
    /// When the last entry is removed the cursor steps back one slot;
    /// otherwise it stays put and now names the instance that shifted into
    /// the slot.
    pub fn remove_active(&mut self) -> Result<Instance> {
        if self.instances.is_empty() {
            return Err(SceneError::EmptyScene);
        }
        let removed = self.instances.remove(self.active);
        if self.active == self.instances.len() && self.active > 0 {
            self.active -= 1;
        }
        Ok(removed)
    }

    pub fn select_next(&mut self) -> Result<usize> {
        let len = self.len_or_empty()?;
        self.active = (self.active + 1) % len;
        Ok(self.active)
    }

    pub fn select_previous(&mut self) -> Result<usize> {
        let len = self.len_or_empty()?;
        self.active = (self.active + len - 1) % len;
        Ok(self.active)
    }

    pub fn active(&self) -> Result<&Instance> {
        self.instances.get(self.active).ok_or(SceneError::EmptyScene)
    }

    pub fn active_mut(&mut self) -> Result<&mut Instance> {
        self.instances
            .get_mut(self.active)
            .ok_or(SceneError::EmptyScene)
    }

    /// Cursor position, or `None` for an empty scene.
    pub fn active_index(&self) -> Option<usize> {
        (!self.instances.is_empty()).then_some(self.active)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Drop every instance. Creation order keeps counting.
    pub fn clear(&mut self) {
        debug!("clearing {} scene instances", self.instances.len());
        self.instances.clear();
        self.active = 0;
    }

    /// Hand every instance to the renderer in draw order.
    pub fn render(&self, renderer: &mut impl Renderer, view: &Mat4, projection: &Mat4) {
        for instance in &self.instances {
            renderer.draw(instance.model, &instance.transform, view, projection);
        }
    }

    fn len_or_empty(&self) -> Result<usize> {
        match self.instances.len() {
            0 => Err(SceneError::EmptyScene),
            len => Ok(len),
        }
    }
}
