use glam::Mat4;
use log::{debug, info, warn};

use diorama_scene::{AssetCatalog, ModelRef, Renderer, Result, Scene, SceneError};

use crate::phase::{Phase, Tick};
use crate::sequence::{SequenceDef, SequenceInstance};

/// Externally visible sequencer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
    Idle,
    Running(usize),
}

/// Result of advancing a running sequence by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceStatus {
    Running,
    Finished,
}

struct ActiveSequence {
    index: usize,
    name: String,
    duration: f32,
    timer: f32,
    models: Vec<ModelRef>,
    instances: Vec<SequenceInstance>,
    phases: Vec<Phase>,
    fired: Vec<bool>,
}

impl ActiveSequence {
    fn advance(&mut self, dt: f32) -> SequenceStatus {
        self.timer += dt;
        let tick = Tick {
            dt,
            progress: (self.timer / self.duration).clamp(0.0, 1.0),
        };

        for (phase, fired) in self.phases.iter().zip(self.fired.iter_mut()) {
            if !phase.window.contains(self.timer) || (phase.once && *fired) {
                continue;
            }
            if phase.once {
                debug!("{}: one-shot phase fired at {:.3}s", self.name, self.timer);
                *fired = true;
            }
            for &target in &phase.targets {
                if let Some(instance) = self.instances.get_mut(target) {
                    phase.effect.apply(tick, instance, &self.models);
                }
            }
        }

        if self.timer >= self.duration {
            SequenceStatus::Finished
        } else {
            SequenceStatus::Running
        }
    }
}

/// Runs one scripted sequence at a time in place of the interactive scene.
///
/// `Idle → Running → Idle`. Starting a sequence empties the main scene;
/// finishing discards every private instance and leaves the scene empty.
pub struct AnimationSequencer {
    definitions: Vec<SequenceDef>,
    active: Option<ActiveSequence>,
}

impl AnimationSequencer {
    pub fn new(definitions: Vec<SequenceDef>) -> Self {
        Self {
            definitions,
            active: None,
        }
    }

    pub fn definitions(&self) -> &[SequenceDef] {
        &self.definitions
    }

    pub fn state(&self) -> SequencerState {
        match &self.active {
            Some(active) => SequencerState::Running(active.index),
            None => SequencerState::Idle,
        }
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Local clock of the running sequence.
    pub fn timer(&self) -> Option<f32> {
        self.active.as_ref().map(|a| a.timer)
    }

    /// Enter `Running(index)`.
    ///
    /// Every asset is resolved before the scene is touched, so a load
    /// failure leaves both the scene and the sequencer as they were.
    pub fn start(
        &mut self,
        index: usize,
        catalog: &mut impl AssetCatalog,
        scene: &mut Scene,
    ) -> Result<()> {
        if let Some(active) = &self.active {
            warn!(
                "sequence '{}' already running, ignoring start of {index}",
                active.name
            );
            return Ok(());
        }
        let def = self
            .definitions
            .get(index)
            .ok_or(SceneError::UnknownSequence(index))?;

        let models = def
            .assets
            .iter()
            .map(|id| catalog.load(id))
            .collect::<Result<Vec<_>>>()?;

        let instances = def
            .instances
            .iter()
            .map(|inst| {
                let model = models
                    .get(inst.asset)
                    .copied()
                    .ok_or(SceneError::UnknownModelKind(inst.asset))?;
                Ok(SequenceInstance {
                    model,
                    transform: inst.transform,
                    display: inst.display,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        scene.clear();
        info!(
            "starting sequence '{}' ({:.1}s, {} instances)",
            def.name,
            def.duration,
            def.instances.len()
        );

        self.active = Some(ActiveSequence {
            index,
            name: def.name.clone(),
            duration: def.duration,
            timer: 0.0,
            models,
            instances,
            phases: def.phases.clone(),
            fired: vec![false; def.phases.len()],
        });
        Ok(())
    }

    /// Advance the clock by `dt` without drawing. Returns `None` while idle.
    pub fn advance(&mut self, dt: f32) -> Option<SequenceStatus> {
        let active = self.active.as_mut()?;
        let status = active.advance(dt);
        if status == SequenceStatus::Finished {
            info!("sequence '{}' finished after {:.2}s", active.name, active.timer);
            self.active = None;
        }
        Some(status)
    }

    /// Advance by `dt`, then draw the private instances.
    ///
    /// The tick that crosses the duration is still drawn before the
    /// sequencer drops back to idle.
    pub fn tick(
        &mut self,
        dt: f32,
        renderer: &mut impl Renderer,
        view: &Mat4,
        projection: &Mat4,
    ) -> Option<SequenceStatus> {
        let active = self.active.as_mut()?;
        let status = active.advance(dt);
        for instance in &active.instances {
            renderer.draw(instance.model, &instance.draw_transform(), view, projection);
        }
        if status == SequenceStatus::Finished {
            info!("sequence '{}' finished after {:.2}s", active.name, active.timer);
            self.active = None;
        }
        Some(status)
    }

    /// Private instances of the running sequence as they would be drawn.
    pub fn draw_list(&self) -> Vec<(ModelRef, Mat4)> {
        self.active
            .as_ref()
            .map(|a| {
                a.instances
                    .iter()
                    .map(|i| (i.model, i.draw_transform()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::{InstanceDef, builtin_sequences};
    use crate::{Effect, TimeWindow};
    use diorama_scene::transform;
    use glam::Vec3;
    use std::collections::HashMap;

    #[derive(Default)]
    struct Catalog {
        ids: HashMap<String, ModelRef>,
        missing: Vec<&'static str>,
    }

    impl AssetCatalog for Catalog {
        fn load(&mut self, id: &str) -> Result<ModelRef> {
            if self.missing.contains(&id) {
                return Err(SceneError::AssetLoad {
                    id: id.into(),
                    reason: "not found".into(),
                });
            }
            let next = ModelRef(self.ids.len());
            Ok(*self.ids.entry(id.to_string()).or_insert(next))
        }
    }

    #[derive(Default)]
    struct Recorder {
        draws: Vec<(ModelRef, Mat4)>,
    }

    impl Renderer for Recorder {
        fn draw(&mut self, model: ModelRef, transform: &Mat4, _view: &Mat4, _projection: &Mat4) {
            self.draws.push((model, *transform));
        }
    }

    fn populated_scene() -> Scene {
        let mut scene = Scene::new();
        scene.add_instance(ModelRef(0));
        scene.add_instance(ModelRef(1));
        scene
    }

    #[test]
    fn start_clears_scene_and_runs() {
        let mut sequencer = AnimationSequencer::new(builtin_sequences());
        let mut scene = populated_scene();

        sequencer.start(0, &mut Catalog::default(), &mut scene).unwrap();
        assert!(scene.is_empty());
        assert_eq!(sequencer.state(), SequencerState::Running(0));
        assert_eq!(sequencer.timer(), Some(0.0));
        assert_eq!(sequencer.draw_list().len(), 6);
    }

    #[test]
    fn failed_asset_load_leaves_scene_untouched() {
        let mut sequencer = AnimationSequencer::new(builtin_sequences());
        let mut scene = populated_scene();
        let mut catalog = Catalog {
            missing: vec!["doggo"],
            ..Default::default()
        };

        let err = sequencer.start(0, &mut catalog, &mut scene).unwrap_err();
        assert!(matches!(err, SceneError::AssetLoad { ref id, .. } if id == "doggo"));
        assert_eq!(scene.len(), 2);
        assert_eq!(sequencer.state(), SequencerState::Idle);
    }

    #[test]
    fn unknown_sequence_is_rejected() {
        let mut sequencer = AnimationSequencer::new(builtin_sequences());
        let mut scene = populated_scene();
        assert_eq!(
            sequencer.start(9, &mut Catalog::default(), &mut scene),
            Err(SceneError::UnknownSequence(9))
        );
        assert_eq!(scene.len(), 2);
    }

    #[test]
    fn instance_with_unbound_asset_slot_is_rejected() {
        let def = SequenceDef {
            name: "dangling".into(),
            duration: 1.0,
            assets: vec!["a".into()],
            instances: vec![
                InstanceDef::new(0, Mat4::IDENTITY),
                InstanceDef::new(3, Mat4::IDENTITY),
            ],
            phases: Vec::new(),
        };
        let mut sequencer = AnimationSequencer::new(vec![def]);
        let mut scene = populated_scene();

        assert_eq!(
            sequencer.start(0, &mut Catalog::default(), &mut scene),
            Err(SceneError::UnknownModelKind(3))
        );
        assert_eq!(scene.len(), 2);
        assert_eq!(sequencer.state(), SequencerState::Idle);
    }

    #[test]
    fn runs_until_duration_then_goes_idle() {
        let mut sequencer = AnimationSequencer::new(builtin_sequences());
        let mut scene = Scene::new();
        let mut recorder = Recorder::default();
        sequencer.start(1, &mut Catalog::default(), &mut scene).unwrap();

        let mut ticks = 0;
        while let Some(status) =
            sequencer.tick(0.25, &mut recorder, &Mat4::IDENTITY, &Mat4::IDENTITY)
        {
            ticks += 1;
            if status == SequenceStatus::Finished {
                break;
            }
        }

        assert_eq!(ticks, 20);
        assert_eq!(recorder.draws.len(), 20 * 5);
        assert_eq!(sequencer.state(), SequencerState::Idle);
        assert!(sequencer.draw_list().is_empty());
        assert!(scene.is_empty());
    }

    #[test]
    fn idle_sequencer_does_nothing() {
        let mut sequencer = AnimationSequencer::new(builtin_sequences());
        let mut recorder = Recorder::default();
        assert_eq!(sequencer.advance(0.1), None);
        assert_eq!(
            sequencer.tick(0.1, &mut recorder, &Mat4::IDENTITY, &Mat4::IDENTITY),
            None
        );
        assert!(recorder.draws.is_empty());
    }

    #[test]
    fn spline_position_at_half_time_is_curve_midpoint() {
        let mut sequencer = AnimationSequencer::new(builtin_sequences());
        let mut scene = Scene::new();
        sequencer.start(1, &mut Catalog::default(), &mut scene).unwrap();

        let def = &sequencer.definitions()[1];
        let crate::Effect::FollowPath { curve } = def.phases[0].effect.clone() else {
            panic!("spline flight follows a path");
        };
        let start = transform::position(&sequencer.draw_list()[4].1);

        let mut travelled = Vec3::ZERO;
        let mut previous = start;
        for _ in 0..5 {
            sequencer.advance(0.5);
            let now = transform::position(&sequencer.draw_list()[4].1);
            travelled += now - previous;
            previous = now;
        }

        assert_eq!(sequencer.timer(), Some(2.5));
        let midpoint = curve.evaluate(0.5);
        assert!((start + travelled - midpoint).length() < 1e-4);
        assert!((previous - midpoint).length() < 1e-4);
    }

    #[test]
    fn once_phase_fires_a_single_time() {
        let def = SequenceDef {
            name: "counter".into(),
            duration: 1.0,
            assets: vec!["a".into(), "b".into()],
            instances: vec![InstanceDef::new(0, Mat4::IDENTITY)],
            phases: vec![
                crate::Phase::new(
                    TimeWindow::After(0.25),
                    [0],
                    Effect::Swap {
                        asset: 1,
                        transform: Mat4::IDENTITY,
                    },
                )
                .once(),
                crate::Phase::new(
                    TimeWindow::Always,
                    [0],
                    Effect::Translate { velocity: Vec3::X },
                ),
            ],
        };
        let mut sequencer = AnimationSequencer::new(vec![def]);
        let mut catalog = Catalog::default();
        sequencer.start(0, &mut catalog, &mut Scene::new()).unwrap();

        for _ in 0..4 {
            sequencer.advance(0.1);
        }
        // Swap at 0.3 reset the transform; only the 0.3 and 0.4 translations remain.
        let (model, matrix) = sequencer.draw_list()[0];
        assert_eq!(model, ModelRef(1));
        assert!((transform::position(&matrix) - Vec3::new(0.2, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn planet_swaps_to_doggo_after_threshold() {
        let mut sequencer = AnimationSequencer::new(builtin_sequences());
        let mut catalog = Catalog::default();
        sequencer.start(0, &mut catalog, &mut Scene::new()).unwrap();
        let doggo = catalog.load("doggo").unwrap();

        for _ in 0..36 {
            sequencer.advance(0.125);
        }
        assert_eq!(sequencer.timer(), Some(4.5));
        assert_ne!(sequencer.draw_list()[0].0, doggo);
        sequencer.advance(0.125);
        assert_eq!(sequencer.draw_list()[0].0, doggo);
    }
}
