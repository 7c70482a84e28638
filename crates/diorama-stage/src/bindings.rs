//! Key bindings for every interactive control.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use diorama_scene::{Axis, Key, SignedAxis};

use crate::intent::Control;

/// Keys bound to each control.
///
/// Movement maps are keyed by signed axis tokens (`"+x"`, `"-z"`); a
/// malformed token is rejected when the bindings are deserialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    /// Slot `i` creates model kind `i`.
    pub create: Vec<Key>,
    pub delete: Key,
    pub select_next: Key,
    pub select_previous: Key,
    pub toggle_mask: BTreeMap<Axis, Key>,
    pub translate: BTreeMap<SignedAxis, Key>,
    pub toggle_focus: Key,
    pub rotate: BTreeMap<SignedAxis, Key>,
    pub scale_in: Key,
    pub scale_out: Key,
    pub reflect: Key,
    pub shear: BTreeMap<SignedAxis, Key>,
    pub project: Key,
    /// Slot `i` runs sequence `i`.
    pub sequences: Vec<Key>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        use Axis::{X, Y, Z};

        Self {
            create: vec![Key::Digit1, Key::Digit2, Key::Digit3, Key::Digit4],
            delete: Key::Delete,
            select_next: Key::ArrowRight,
            select_previous: Key::ArrowLeft,
            toggle_mask: BTreeMap::from([(X, Key::X), (Y, Key::Y), (Z, Key::Z)]),
            translate: BTreeMap::from([
                (SignedAxis::pos(X), Key::Numpad6),
                (SignedAxis::neg(X), Key::Numpad4),
                (SignedAxis::pos(Y), Key::Numpad8),
                (SignedAxis::neg(Y), Key::Numpad2),
                (SignedAxis::pos(Z), Key::Numpad7),
                (SignedAxis::neg(Z), Key::Numpad9),
            ]),
            toggle_focus: Key::ControlLeft,
            rotate: BTreeMap::from([
                (SignedAxis::neg(X), Key::I),
                (SignedAxis::pos(X), Key::K),
                (SignedAxis::neg(Y), Key::J),
                (SignedAxis::pos(Y), Key::L),
                (SignedAxis::pos(Z), Key::U),
                (SignedAxis::neg(Z), Key::O),
            ]),
            scale_in: Key::NumpadSubtract,
            scale_out: Key::NumpadAdd,
            reflect: Key::ShiftLeft,
            shear: BTreeMap::from([
                (SignedAxis::neg(X), Key::V),
                (SignedAxis::pos(X), Key::N),
                (SignedAxis::neg(Y), Key::G),
                (SignedAxis::pos(Y), Key::B),
                (SignedAxis::neg(Z), Key::F),
                (SignedAxis::pos(Z), Key::H),
            ]),
            project: Key::P,
            sequences: vec![Key::F1, Key::F2],
        }
    }
}

impl KeyBindings {
    /// Every bound control with its key, in evaluation order.
    pub fn controls(&self) -> Vec<(Control, Key)> {
        let mut out = Vec::new();
        out.extend(self.create.iter().enumerate().map(|(i, &k)| (Control::Create(i), k)));
        out.push((Control::Delete, self.delete));
        out.push((Control::SelectNext, self.select_next));
        out.push((Control::SelectPrevious, self.select_previous));
        out.extend(self.toggle_mask.iter().map(|(&a, &k)| (Control::ToggleMask(a), k)));
        out.extend(self.translate.iter().map(|(&d, &k)| (Control::Translate(d), k)));
        out.push((Control::ToggleFocus, self.toggle_focus));
        out.extend(self.rotate.iter().map(|(&d, &k)| (Control::Rotate(d), k)));
        out.push((Control::ScaleIn, self.scale_in));
        out.push((Control::ScaleOut, self.scale_out));
        out.push((Control::Reflect, self.reflect));
        out.extend(self.shear.iter().map(|(&d, &k)| (Control::Shear(d), k)));
        out.push((Control::Project, self.project));
        out.extend(
            self.sequences
                .iter()
                .enumerate()
                .map(|(i, &k)| (Control::RunSequence(i), k)),
        );
        out
    }

    /// Keys bound to more than one control, with the first control that
    /// claimed the key and the later one that collides with it.
    pub fn conflicts(&self) -> Vec<(Key, Control, Control)> {
        let mut owners: HashMap<Key, Control> = HashMap::new();
        let mut out = Vec::new();
        for (control, key) in self.controls() {
            match owners.get(&key) {
                Some(&first) => out.push((key, first, control)),
                None => {
                    owners.insert(key, control);
                }
            }
        }
        out
    }
}
