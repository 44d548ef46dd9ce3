//! The visual state surface the timeline drives.
//!
//! `Stage` is the seam between the scripted timeline and whatever actually shows the
//! scenes: `web::DomStage` toggles classes on real elements, `MemoryStage` keeps the
//! same state in plain collections so sequences can be checked without a browser.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::layout::{TouchGeometry, TouchOffsets};
use crate::particles::confetti::{Confetti, ConfettiConfig};
use crate::particles::{Bounds, ParticleField};
use crate::timeline::{Scene, Target};
use crate::{CardError, CardResult};

pub trait Stage {
    /// Hide every scene, then mark `scene` active.
    fn show_scene(&mut self, scene: Scene) -> CardResult<()>;
    fn set_text(&mut self, target: Target, text: &str) -> CardResult<()>;
    fn add_classes(&mut self, target: Target, classes: &[String]) -> CardResult<()>;
    fn remove_classes(&mut self, target: Target, classes: &[String]) -> CardResult<()>;
    /// Remove `class`, force a reflow, add it back so its CSS animation replays.
    fn restart_class(&mut self, target: Target, class: &str) -> CardResult<()>;
    /// Reset both together-images to zero offset and measure stage + images.
    fn measure_touch(&mut self) -> CardResult<TouchGeometry>;
    fn apply_offsets(&mut self, offsets: TouchOffsets) -> CardResult<()>;
    fn start_confetti(&mut self) -> CardResult<()>;
}

/// In-memory stage. Scenes start with Intro active and the final wrap hidden, like the
/// page markup.
pub struct MemoryStage {
    scenes: BTreeMap<Scene, bool>,
    classes: HashMap<Target, BTreeSet<String>>,
    texts: HashMap<Target, String>,
    offsets: TouchOffsets,
    geometry: TouchGeometry,
    missing: BTreeSet<&'static str>,
    restarts: usize,
    viewport: Bounds,
    confetti_cfg: ConfettiConfig,
    confetti_seed: u64,
    confetti: Option<ParticleField<Confetti>>,
    confetti_starts: usize,
}

impl MemoryStage {
    pub fn new(geometry: TouchGeometry, viewport: Bounds) -> Self {
        let scenes = Scene::ALL.iter().map(|s| (*s, *s == Scene::Intro)).collect();
        let mut classes: HashMap<Target, BTreeSet<String>> = HashMap::new();
        classes
            .entry(Target::FinalWrap)
            .or_default()
            .insert("finalHidden".to_string());
        Self {
            scenes,
            classes,
            texts: HashMap::new(),
            offsets: TouchOffsets::ZERO,
            geometry,
            missing: BTreeSet::new(),
            restarts: 0,
            viewport,
            confetti_cfg: ConfettiConfig::default(),
            confetti_seed: 0x5eed,
            confetti: None,
            confetti_starts: 0,
        }
    }

    pub fn with_confetti(mut self, cfg: ConfettiConfig, seed: u64) -> Self {
        self.confetti_cfg = cfg;
        self.confetti_seed = seed;
        self
    }

    /// Pretend the element with `id` is not in the document.
    pub fn remove_element(&mut self, id: &'static str) {
        self.missing.insert(id);
    }

    /// Simulate a layout change (window resize).
    pub fn set_geometry(&mut self, geometry: TouchGeometry) {
        self.geometry = geometry;
    }

    pub fn active_scenes(&self) -> Vec<Scene> {
        self.scenes.iter().filter(|(_, on)| **on).map(|(s, _)| *s).collect()
    }

    pub fn has_class(&self, target: Target, class: &str) -> bool {
        self.classes.get(&target).is_some_and(|set| set.contains(class))
    }

    pub fn classes(&self, target: Target) -> Vec<String> {
        self.classes
            .get(&target)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn text(&self, target: Target) -> &str {
        self.texts.get(&target).map(String::as_str).unwrap_or("")
    }

    pub fn offsets(&self) -> TouchOffsets {
        self.offsets
    }

    pub fn restarts(&self) -> usize {
        self.restarts
    }

    pub fn confetti(&self) -> Option<&ParticleField<Confetti>> {
        self.confetti.as_ref()
    }

    pub fn confetti_starts(&self) -> usize {
        self.confetti_starts
    }

    fn check(&self, id: &'static str) -> CardResult<()> {
        if self.missing.contains(id) {
            return Err(CardError::missing(id));
        }
        Ok(())
    }
}

impl Stage for MemoryStage {
    fn show_scene(&mut self, scene: Scene) -> CardResult<()> {
        self.check(scene.element_id())?;
        for on in self.scenes.values_mut() {
            *on = false;
        }
        self.scenes.insert(scene, true);
        Ok(())
    }

    fn set_text(&mut self, target: Target, text: &str) -> CardResult<()> {
        self.check(target.element_id())?;
        self.texts.insert(target, text.to_string());
        Ok(())
    }

    fn add_classes(&mut self, target: Target, classes: &[String]) -> CardResult<()> {
        self.check(target.element_id())?;
        self.classes.entry(target).or_default().extend(classes.iter().cloned());
        Ok(())
    }

    fn remove_classes(&mut self, target: Target, classes: &[String]) -> CardResult<()> {
        self.check(target.element_id())?;
        if let Some(set) = self.classes.get_mut(&target) {
            for c in classes {
                set.remove(c);
            }
        }
        Ok(())
    }

    fn restart_class(&mut self, target: Target, class: &str) -> CardResult<()> {
        self.check(target.element_id())?;
        self.restarts += 1;
        self.classes.entry(target).or_default().insert(class.to_string());
        Ok(())
    }

    fn measure_touch(&mut self) -> CardResult<TouchGeometry> {
        self.check(Target::STAGE_ID)?;
        self.offsets = TouchOffsets::ZERO;
        Ok(self.geometry)
    }

    fn apply_offsets(&mut self, offsets: TouchOffsets) -> CardResult<()> {
        self.check(Target::LEFT_IMAGE_ID)?;
        self.check(Target::RIGHT_IMAGE_ID)?;
        self.offsets = offsets;
        Ok(())
    }

    fn start_confetti(&mut self) -> CardResult<()> {
        self.check(Target::CONFETTI_CANVAS_ID)?;
        self.confetti_starts += 1;
        self.confetti = Some(ParticleField::new(
            Confetti::new(self.confetti_cfg.clone()),
            self.viewport,
            self.confetti_seed,
        ));
        Ok(())
    }
}
