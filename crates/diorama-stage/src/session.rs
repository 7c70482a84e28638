use std::collections::HashMap;
use std::fmt;

use glam::Vec3;
use log::debug;
use serde::{Deserialize, Serialize};

use diorama_scene::{
    AssetCatalog, Axis, DimensionMask, InputSource, Result, RotationFocus, Scene, SceneError,
    transform,
};

use crate::bindings::KeyBindings;
use crate::intent::{Control, Intent};

/// Rates and constants for interactive edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditRates {
    /// Units per second.
    pub translate: f32,
    /// Degrees per second.
    pub rotate: f32,
    /// Orbit offset, units per second, perpendicular to the rotation axis.
    pub orbit_offset: f32,
    pub scale: f32,
    pub shear: f32,
    /// `k` in the reflect scale `-k·mask + 1`.
    pub reflect: f32,
    /// Magnitude an enabled mask axis carries.
    pub mask_magnitude: f32,
}

impl Default for EditRates {
    fn default() -> Self {
        Self {
            translate: 2.0,
            rotate: 120.0,
            orbit_offset: 15.0,
            scale: 1.0,
            shear: 1.0,
            reflect: 40.0,
            mask_magnitude: 1.0,
        }
    }
}

/// What the caller must do after an intent was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    StartSequence(usize),
}

#[derive(Debug, Clone, Copy)]
struct ControlState {
    armed: bool,
    held: f32,
}

impl Default for ControlState {
    fn default() -> Self {
        Self {
            armed: true,
            held: 0.0,
        }
    }
}

/// Interactive editing context: mask, rotation focus, bindings and
/// per-control debounce state.
pub struct EditSession {
    bindings: KeyBindings,
    rates: EditRates,
    kinds: Vec<String>,
    mask: DimensionMask,
    focus: RotationFocus,
    controls: HashMap<Control, ControlState>,
}

impl EditSession {
    /// `kinds[i]` is the catalog id created by create slot `i`.
    pub fn new(bindings: KeyBindings, rates: EditRates, kinds: Vec<String>) -> Self {
        let mask = DimensionMask::new(rates.mask_magnitude);
        Self {
            bindings,
            rates,
            kinds,
            mask,
            focus: RotationFocus::default(),
            controls: HashMap::new(),
        }
    }

    pub fn mask(&self) -> &DimensionMask {
        &self.mask
    }

    pub fn focus(&self) -> RotationFocus {
        self.focus
    }

    pub fn rates(&self) -> &EditRates {
        &self.rates
    }

    pub fn kinds(&self) -> &[String] {
        &self.kinds
    }

    /// Seconds `control` has been held, zero once released.
    pub fn held_for(&self, control: Control) -> f32 {
        self.controls.get(&control).map_or(0.0, |s| s.held)
    }

    /// Poll every bound control once and collect this frame's intents.
    ///
    /// Continuous controls yield an intent every frame they are down. A
    /// discrete control yields one on the frame it goes down and is not
    /// re-armed until its key is seen released.
    pub fn resolve(&mut self, dt: f32, input: &impl InputSource) -> Vec<Intent> {
        let mut intents = Vec::new();
        for (control, key) in self.bindings.controls() {
            let state = self.controls.entry(control).or_default();
            if !input.is_pressed(key) {
                *state = ControlState::default();
                continue;
            }
            state.held += dt;
            if !control.is_discrete() {
                intents.push(control.intent(dt));
            } else if state.armed {
                state.armed = false;
                intents.push(control.intent(dt));
            }
        }
        intents
    }

    /// Apply one intent to the scene's active instance.
    ///
    /// Edits on an empty scene return [`SceneError::EmptyScene`] and change
    /// nothing.
    pub fn apply(
        &mut self,
        intent: &Intent,
        scene: &mut Scene,
        catalog: &mut impl AssetCatalog,
    ) -> Result<Outcome> {
        match *intent {
            Intent::Create(kind) => {
                let id = self
                    .kinds
                    .get(kind)
                    .ok_or(SceneError::UnknownModelKind(kind))?;
                let model = catalog.load(id)?;
                let index = scene.add_instance(model);
                debug!("created '{id}' at slot {index}");
            }
            Intent::Delete => {
                scene.remove_active()?;
            }
            Intent::SelectNext => {
                scene.select_next()?;
            }
            Intent::SelectPrevious => {
                scene.select_previous()?;
            }
            Intent::ToggleMask(axis) => {
                self.mask.toggle(axis);
            }
            Intent::ToggleFocus => self.focus.toggle(),
            Intent::RunSequence(index) => return Ok(Outcome::StartSequence(index)),
            Intent::Translate { direction, dt } => {
                let offset = direction.vector() * self.rates.translate * dt;
                self.edit_active(scene, |t| transform::translate(t, offset))?;
            }
            Intent::Rotate { direction, dt } => {
                let axis = direction.vector();
                let angle = self.rates.rotate.to_radians() * dt;
                let focus = self.focus;
                let step = self.rates.orbit_offset * dt;
                self.edit_active(scene, |t| match focus {
                    RotationFocus::AroundSelf => transform::rotate(t, angle, axis),
                    RotationFocus::AroundOrbitPoint => {
                        let offset = Vec3::new(-step * (axis.y + axis.z), -step * axis.x, 0.0);
                        transform::orbit(t, angle, axis, offset)
                    }
                })?;
            }
            Intent::Scale { sign, dt } => {
                let factors = Vec3::ONE + self.mask.factors() * (sign.value() * dt * self.rates.scale);
                self.edit_active(scene, |t| transform::scale(t, factors))?;
            }
            Intent::Reflect => {
                let (mask, k) = (self.mask.factors(), self.rates.reflect);
                self.edit_active(scene, |t| transform::reflect(t, mask, k))?;
            }
            Intent::Shear { direction, dt } => {
                let p = direction.sign.value() * dt * self.rates.shear;
                let (s, u) = match direction.axis {
                    Axis::X => (self.mask.get(Axis::Y), self.mask.get(Axis::Z)),
                    Axis::Y => (self.mask.get(Axis::X), self.mask.get(Axis::Z)),
                    Axis::Z => (self.mask.get(Axis::X), self.mask.get(Axis::Y)),
                };
                self.edit_active(scene, |t| transform::shear(t, direction.axis, p * s, p * u))?;
            }
            Intent::Project => {
                let mask = self.mask.factors();
                self.edit_active(scene, |t| transform::project_onto_axes(t, mask))?;
            }
        }
        Ok(Outcome::Applied)
    }

    /// Snapshot for the status log line.
    pub fn status(&self, scene: &Scene) -> SessionStatus {
        SessionStatus {
            active: scene.active_index(),
            count: scene.len(),
            focus: self.focus,
            mask: self.mask,
        }
    }

    fn edit_active(
        &self,
        scene: &mut Scene,
        edit: impl FnOnce(glam::Mat4) -> glam::Mat4,
    ) -> Result<()> {
        let instance = scene.active_mut()?;
        instance.transform = edit(instance.transform);
        Ok(())
    }
}

/// Active model, rotation focus and mask state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionStatus {
    pub active: Option<usize>,
    pub count: usize,
    pub focus: RotationFocus,
    pub mask: DimensionMask,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.active {
            Some(i) => write!(f, "active model: {}/{}", i + 1, self.count)?,
            None => f.write_str("active model: none")?,
        }
        write!(f, " | rotation focus: {} | {}", self.focus, self.mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diorama_scene::{Key, ModelRef, SignedAxis};
    use std::collections::HashSet;

    #[derive(Default)]
    struct Keys(HashSet<Key>);

    impl InputSource for Keys {
        fn is_pressed(&self, key: Key) -> bool {
            self.0.contains(&key)
        }
    }

    struct Catalog;

    impl AssetCatalog for Catalog {
        fn load(&mut self, id: &str) -> Result<ModelRef> {
            Ok(ModelRef(id.len()))
        }
    }

    fn session() -> EditSession {
        EditSession::new(
            KeyBindings::default(),
            EditRates::default(),
            vec!["rock".into(), "planet".into()],
        )
    }

    #[test]
    fn discrete_control_fires_once_per_press() {
        let mut session = session();
        let mut keys = Keys::default();
        keys.0.insert(Key::Delete);

        assert_eq!(session.resolve(0.016, &keys), vec![Intent::Delete]);
        for _ in 0..30 {
            assert!(session.resolve(0.016, &keys).is_empty());
        }

        keys.0.clear();
        assert!(session.resolve(0.016, &keys).is_empty());
        keys.0.insert(Key::Delete);
        assert_eq!(session.resolve(0.016, &keys), vec![Intent::Delete]);
    }

    #[test]
    fn continuous_control_repeats_with_frame_dt() {
        let mut session = session();
        let mut keys = Keys::default();
        keys.0.insert(Key::Numpad6);

        let direction = SignedAxis::pos(Axis::X);
        for dt in [0.01, 0.02, 0.03] {
            assert_eq!(
                session.resolve(dt, &keys),
                vec![Intent::Translate { direction, dt }]
            );
        }
        assert!((session.held_for(Control::Translate(direction)) - 0.06).abs() < 1e-6);

        keys.0.clear();
        session.resolve(0.01, &keys);
        assert_eq!(session.held_for(Control::Translate(direction)), 0.0);
    }

    #[test]
    fn overlapping_controls_resolve_in_binding_order() {
        let mut session = session();
        let mut keys = Keys::default();
        keys.0.extend([Key::F1, Key::Digit2, Key::NumpadAdd]);

        let intents = session.resolve(0.5, &keys);
        assert_eq!(
            intents,
            vec![
                Intent::Create(1),
                Intent::Scale {
                    sign: diorama_scene::Sign::Positive,
                    dt: 0.5
                },
                Intent::RunSequence(0),
            ]
        );
    }

    #[test]
    fn edits_on_empty_scene_are_refused() {
        let mut session = session();
        let mut scene = Scene::new();
        let intents = [
            Intent::Delete,
            Intent::SelectNext,
            Intent::Reflect,
            Intent::Project,
            Intent::Translate {
                direction: SignedAxis::pos(Axis::Y),
                dt: 0.1,
            },
        ];
        for intent in intents {
            assert_eq!(
                session.apply(&intent, &mut scene, &mut Catalog),
                Err(SceneError::EmptyScene)
            );
        }
        assert!(scene.is_empty());
    }

    #[test]
    fn create_uses_kind_table() {
        let mut session = session();
        let mut scene = Scene::new();
        session.apply(&Intent::Create(1), &mut scene, &mut Catalog).unwrap();
        assert_eq!(scene.active().unwrap().model, ModelRef("planet".len()));
        assert_eq!(
            session.apply(&Intent::Create(7), &mut scene, &mut Catalog),
            Err(SceneError::UnknownModelKind(7))
        );
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn mask_gates_shear_coefficients() {
        let mut session = session();
        let mut scene = Scene::new();
        scene.add_instance(ModelRef(0));
        scene.active_mut().unwrap().transform = glam::Mat4::IDENTITY;
        session.apply(&Intent::ToggleMask(Axis::Z), &mut scene, &mut Catalog).unwrap();

        let shear = Intent::Shear {
            direction: SignedAxis::pos(Axis::X),
            dt: 0.5,
        };
        session.apply(&shear, &mut scene, &mut Catalog).unwrap();

        let t = scene.active().unwrap().transform;
        assert_eq!(t, transform::shear_x(glam::Mat4::IDENTITY, 0.5, 0.0));
    }

    #[test]
    fn shear_on_y_and_z_reads_the_other_two_mask_axes() {
        let mut session = session();
        let mut scene = Scene::new();
        scene.add_instance(ModelRef(0));
        scene.active_mut().unwrap().transform = glam::Mat4::IDENTITY;
        session.apply(&Intent::ToggleMask(Axis::X), &mut scene, &mut Catalog).unwrap();

        let shear_y = Intent::Shear {
            direction: SignedAxis::pos(Axis::Y),
            dt: 0.5,
        };
        session.apply(&shear_y, &mut scene, &mut Catalog).unwrap();
        assert_eq!(
            scene.active().unwrap().transform,
            transform::shear_y(glam::Mat4::IDENTITY, 0.0, 0.5)
        );

        let mut session = self::session();
        scene.active_mut().unwrap().transform = glam::Mat4::IDENTITY;
        session.apply(&Intent::ToggleMask(Axis::Y), &mut scene, &mut Catalog).unwrap();
        let shear_z = Intent::Shear {
            direction: SignedAxis::neg(Axis::Z),
            dt: 0.25,
        };
        session.apply(&shear_z, &mut scene, &mut Catalog).unwrap();
        assert_eq!(
            scene.active().unwrap().transform,
            transform::shear_z(glam::Mat4::IDENTITY, -0.25, 0.0)
        );
    }

    #[test]
    fn rotation_around_self_keeps_position() {
        let mut session = session();
        let mut scene = Scene::new();
        scene.add_instance(ModelRef(0));
        scene.add_instance(ModelRef(0));
        let start = scene.active().unwrap().transform;
        assert_eq!(session.focus(), RotationFocus::AroundSelf);

        let rotate = Intent::Rotate {
            direction: SignedAxis::pos(Axis::Y),
            dt: 0.25,
        };
        session.apply(&rotate, &mut scene, &mut Catalog).unwrap();

        let t = scene.active().unwrap().transform;
        let expected = transform::rotate(start, 30f32.to_radians(), glam::Vec3::Y);
        assert!(t.abs_diff_eq(expected, 1e-6), "{t:?}");
        assert!((transform::position(&t) - glam::Vec3::X).length() < 1e-6);
    }

    #[test]
    fn project_drops_the_enabled_axis_component() {
        let mut session = session();
        let mut scene = Scene::new();
        scene.add_instance(ModelRef(0));
        scene.add_instance(ModelRef(0));
        let start = scene.active().unwrap().transform;
        session.apply(&Intent::ToggleMask(Axis::Y), &mut scene, &mut Catalog).unwrap();
        session.apply(&Intent::ToggleMask(Axis::Z), &mut scene, &mut Catalog).unwrap();

        session.apply(&Intent::Project, &mut scene, &mut Catalog).unwrap();

        let t = scene.active().unwrap().transform;
        assert_eq!(t, transform::project_onto_axes(start, glam::Vec3::X));
        let p = t.transform_point3(glam::Vec3::new(1.0, 2.0, 3.0));
        assert!((p - glam::Vec3::new(1.0, 0.2, 0.3)).length() < 1e-6, "{p:?}");
    }

    #[test]
    fn sequence_request_is_handed_back() {
        let mut session = session();
        let mut scene = Scene::new();
        assert_eq!(
            session.apply(&Intent::RunSequence(1), &mut scene, &mut Catalog),
            Ok(Outcome::StartSequence(1))
        );
    }

    #[test]
    fn status_line_reads_like_a_banner() {
        let mut session = session();
        let mut scene = Scene::new();
        scene.add_instance(ModelRef(0));
        session.apply(&Intent::ToggleFocus, &mut scene, &mut Catalog).unwrap();
        session.apply(&Intent::ToggleMask(Axis::X), &mut scene, &mut Catalog).unwrap();
        assert_eq!(
            session.status(&scene).to_string(),
            "active model: 1/1 | rotation focus: point | X: OFF Y: ON Z: ON"
        );
    }
}
