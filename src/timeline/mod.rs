//! Scene timeline: a forward-only state machine that walks a `TimelineScript`.
//!
//! The timeline never reads a clock. Callers hand it the current time in
//! milliseconds (`performance.now()` in the browser, a plain counter in tests) and
//! ask for the next wake-up via `next_deadline()`. Steps between two waits are
//! applied in one go; waits are measured from the previous wait's deadline so
//! late timer callbacks do not stretch the whole sequence.

pub mod script;

pub use script::TimelineScript;

use log::{debug, error, info, warn};

use crate::layout::touch_offsets;
use crate::stage::Stage;
use crate::{CardError, CardResult};

// --- Scenes / Targets --------------------------------------------------------

/// Full-screen visual states, in the only order they may appear.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Scene {
    Intro,
    Together,
    Reaction,
    PreConfirmation,
    Confirmation,
}

impl Scene {
    pub const ALL: [Scene; 5] = [
        Scene::Intro,
        Scene::Together,
        Scene::Reaction,
        Scene::PreConfirmation,
        Scene::Confirmation,
    ];

    pub fn element_id(self) -> &'static str {
        match self {
            Scene::Intro => "scene0",
            Scene::Together => "scene1",
            Scene::Reaction => "scenePut",
            Scene::PreConfirmation => "scene2",
            Scene::Confirmation => "scene4",
        }
    }
}

/// Non-scene elements the script mutates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Target {
    TogetherText,
    MidHeart,
    ReactionImage,
    LineOne,
    LineTwo,
    Ask,
    FinalWrap,
}

impl Target {
    pub const STAGE_ID: &'static str = "worldStage";
    pub const LEFT_IMAGE_ID: &'static str = "imgLeftWrap";
    pub const RIGHT_IMAGE_ID: &'static str = "imgRightWrap";
    pub const CONFETTI_CANVAS_ID: &'static str = "confetti";

    pub fn element_id(self) -> &'static str {
        match self {
            Target::TogetherText => "scene1Text",
            Target::MidHeart => "midHeart",
            Target::ReactionImage => "putImgWrap",
            Target::LineOne => "scene2Line1",
            Target::LineTwo => "scene2Line2",
            Target::Ask => "askWrap",
            Target::FinalWrap => "finalWrap",
        }
    }
}

// --- Steps -------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Step {
    /// Suspend for this many milliseconds.
    Wait(f64),
    ShowScene(Scene),
    SetText(Target, String),
    AddClasses(Target, Vec<String>),
    RemoveClasses(Target, Vec<String>),
    RestartClass(Target, String),
    /// Measure the together-scene images and slide them until they almost touch.
    MoveTogether,
}

// --- State machine -----------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    /// Script ran out; waiting for confirm.
    Finished,
    Confirmed,
    /// A stage operation failed; no further steps run.
    Halted,
}

pub struct Timeline {
    script: TimelineScript,
    cursor: usize,
    /// Virtual time the script has reached (start time plus elapsed waits).
    clock_ms: f64,
    phase: Phase,
    scene: Scene,
    moved: bool,
}

impl Timeline {
    pub fn new(script: TimelineScript) -> Self {
        Self {
            script,
            cursor: 0,
            clock_ms: 0.0,
            phase: Phase::Idle,
            scene: Scene::Intro,
            moved: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn scene(&self) -> Scene {
        self.scene
    }

    /// Launch the script. Only the first call does anything.
    pub fn start(&mut self, now_ms: f64, stage: &mut dyn Stage) -> CardResult<Option<f64>> {
        if self.phase != Phase::Idle {
            warn!("start ignored: timeline is {:?}", self.phase);
            return Err(CardError::AlreadyStarted);
        }
        info!("timeline started ({} steps)", self.script.steps.len());
        self.phase = Phase::Running;
        self.clock_ms = now_ms;
        self.advance(now_ms, stage)
    }

    /// Run every step that is due at `now_ms`. Returns the next deadline, if any.
    pub fn advance(&mut self, now_ms: f64, stage: &mut dyn Stage) -> CardResult<Option<f64>> {
        if self.phase != Phase::Running {
            return Ok(None);
        }
        while let Some(step) = self.script.steps.get(self.cursor) {
            if let Step::Wait(ms) = step {
                let due = self.clock_ms + ms;
                if now_ms < due {
                    return Ok(Some(due));
                }
                self.clock_ms = due;
                self.cursor += 1;
                continue;
            }
            let step = step.clone();
            self.cursor += 1;
            if let Err(e) = self.apply(&step, stage) {
                error!("timeline halted at step {}: {e}", self.cursor - 1);
                self.phase = Phase::Halted;
                return Err(e);
            }
        }
        info!("timeline finished on {:?}", self.scene);
        self.phase = Phase::Finished;
        Ok(None)
    }

    pub fn next_deadline(&self) -> Option<f64> {
        if self.phase != Phase::Running {
            return None;
        }
        match self.script.steps.get(self.cursor) {
            Some(Step::Wait(ms)) => Some(self.clock_ms + ms),
            Some(_) => Some(self.clock_ms),
            None => None,
        }
    }

    fn apply(&mut self, step: &Step, stage: &mut dyn Stage) -> CardResult<()> {
        debug!("step {:?}", step);
        match step {
            Step::Wait(_) => {}
            Step::ShowScene(scene) => {
                if *scene <= self.scene {
                    return Err(CardError::SceneRegression {
                        from: self.scene,
                        to: *scene,
                    });
                }
                stage.show_scene(*scene)?;
                info!("scene {:?} -> {:?}", self.scene, scene);
                self.scene = *scene;
            }
            Step::SetText(target, text) => stage.set_text(*target, text)?,
            Step::AddClasses(target, classes) => stage.add_classes(*target, classes)?,
            Step::RemoveClasses(target, classes) => stage.remove_classes(*target, classes)?,
            Step::RestartClass(target, class) => stage.restart_class(*target, class)?,
            Step::MoveTogether => {
                self.move_together(stage)?;
                self.moved = true;
            }
        }
        Ok(())
    }

    fn move_together(&self, stage: &mut dyn Stage) -> CardResult<()> {
        let geo = stage.measure_touch()?;
        let offsets = touch_offsets(&geo);
        debug!("touch offsets {:?}", offsets);
        stage.apply_offsets(offsets)
    }

    /// Switch to the confirmation scene and start the confetti. Stops whatever is
    /// left of the script. Returns false if already confirmed.
    pub fn confirm(&mut self, stage: &mut dyn Stage) -> CardResult<bool> {
        if self.phase == Phase::Confirmed {
            return Ok(false);
        }
        let from = self.scene;
        if let Err(e) = self.enter_confirmation(stage) {
            error!("confirm failed: {e}");
            self.phase = Phase::Halted;
            return Err(e);
        }
        info!("confirmed from {:?}", from);
        self.phase = Phase::Confirmed;
        Ok(true)
    }

    fn enter_confirmation(&mut self, stage: &mut dyn Stage) -> CardResult<()> {
        stage.show_scene(Scene::Confirmation)?;
        self.scene = Scene::Confirmation;
        stage.remove_classes(Target::FinalWrap, &["finalHidden".to_string()])?;
        stage.add_classes(Target::FinalWrap, &["finalShow".to_string()])?;
        stage.start_confetti()
    }

    /// Re-fit the together images after a layout change. Only acts while the
    /// together scene is showing and the images have been moved.
    pub fn on_resize(&mut self, stage: &mut dyn Stage) -> CardResult<bool> {
        if self.scene != Scene::Together || !self.moved {
            return Ok(false);
        }
        self.move_together(stage)?;
        Ok(true)
    }
}
