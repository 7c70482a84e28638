use glam::Mat4;
use log::{debug, error, info};

use diorama_anim::AnimationSequencer;
use diorama_scene::{AssetCatalog, InputSource, Renderer, Result, Scene, SceneError};

use crate::intent::Intent;
use crate::session::{EditSession, Outcome};

/// Owns the scene, the edit session and the sequencer and drives one frame
/// at a time.
///
/// While a sequence runs it owns the frame: input is not polled and the
/// main scene is neither edited nor drawn.
pub struct Stage {
    scene: Scene,
    session: EditSession,
    sequencer: AnimationSequencer,
}

impl Stage {
    pub fn new(session: EditSession, sequencer: AnimationSequencer) -> Self {
        Self {
            scene: Scene::new(),
            session,
            sequencer,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn session(&self) -> &EditSession {
        &self.session
    }

    pub fn sequencer(&self) -> &AnimationSequencer {
        &self.sequencer
    }

    /// The camera stays frozen while this is true.
    pub fn is_animating(&self) -> bool {
        self.sequencer.is_running()
    }

    /// Place the first model kind, if any, so the editor opens on something.
    pub fn spawn_initial(&mut self, catalog: &mut impl AssetCatalog) -> Result<()> {
        if self.session.kinds().is_empty() {
            return Ok(());
        }
        self.session
            .apply(&Intent::Create(0), &mut self.scene, catalog)?;
        info!("{}", self.session.status(&self.scene));
        Ok(())
    }

    /// Run one frame: either tick the active sequence, or resolve input into
    /// edits and draw the scene.
    pub fn frame(
        &mut self,
        dt: f32,
        input: &impl InputSource,
        catalog: &mut impl AssetCatalog,
        renderer: &mut impl Renderer,
        view: &Mat4,
        projection: &Mat4,
    ) {
        if self.sequencer.is_running() {
            self.sequencer.tick(dt, renderer, view, projection);
            return;
        }

        let intents = self.session.resolve(dt, input);
        let mut changed = false;
        for intent in &intents {
            match self.session.apply(intent, &mut self.scene, catalog) {
                Ok(Outcome::Applied) => changed |= !intent.is_continuous(),
                Ok(Outcome::StartSequence(index)) => {
                    if let Err(err) = self.sequencer.start(index, catalog, &mut self.scene) {
                        error!("cannot start sequence {index}: {err}");
                    }
                }
                Err(SceneError::EmptyScene) => debug!("{intent:?} ignored, scene is empty"),
                Err(err) => error!("{intent:?} failed: {err}"),
            }
            if self.sequencer.is_running() {
                break;
            }
        }
        if changed {
            info!("{}", self.session.status(&self.scene));
        }

        if self.sequencer.is_running() {
            self.sequencer.tick(dt, renderer, view, projection);
        } else {
            self.scene.render(renderer, view, projection);
        }
    }
}
