//! Built-in timeline scripts.
//!
//! Both revisions of the page run on the same engine and only differ in captions
//! and timings. `valentine()` is the one the page uses by default.

use super::{Scene, Step, Target};
use crate::{CardError, CardResult};

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimelineScript {
    pub name: String,
    pub steps: Vec<Step>,
}

impl Default for TimelineScript {
    fn default() -> Self {
        Self::valentine()
    }
}

// Class names the stylesheet animates.
const SHOW: &str = "show";
const THUMP: &str = "thump";
const PUNCH_IN: &str = "putPunchIn";
const SHAKE: &str = "putShake";
const IMPACT: &str = "putImpactOn";

fn wait(ms: f64) -> Step {
    Step::Wait(ms)
}

fn text(target: Target, s: &str) -> Step {
    Step::SetText(target, s.to_string())
}

fn add(target: Target, classes: &[&str]) -> Step {
    Step::AddClasses(target, classes.iter().map(|c| c.to_string()).collect())
}

fn remove(target: Target, classes: &[&str]) -> Step {
    Step::RemoveClasses(target, classes.iter().map(|c| c.to_string()).collect())
}

/// Timings and captions for the together + reaction scenes.
struct Beats {
    enter: f64,
    first_caption: &'static str,
    caption_hold: f64,
    meet: f64,
    second_caption: &'static str,
    scene_hold: f64,
    reaction_hold: f64,
}

fn together_and_reaction(b: &Beats) -> Vec<Step> {
    use Target::*;
    vec![
        Step::ShowScene(Scene::Together),
        wait(b.enter),
        remove(MidHeart, &[SHOW, THUMP]),
        remove(TogetherText, &[SHOW]),
        wait(60.0),
        Step::MoveTogether,
        text(TogetherText, b.first_caption),
        add(TogetherText, &[SHOW]),
        wait(b.caption_hold),
        remove(TogetherText, &[SHOW]),
        // images finish sliding (4.2s CSS transition)
        wait(b.meet),
        add(MidHeart, &[SHOW]),
        Step::RestartClass(MidHeart, THUMP.to_string()),
        text(TogetherText, b.second_caption),
        wait(120.0),
        add(TogetherText, &[SHOW]),
        wait(b.scene_hold),
        remove(TogetherText, &[SHOW]),
        remove(MidHeart, &[SHOW, THUMP]),
        wait(350.0),
        Step::ShowScene(Scene::Reaction),
        remove(ReactionImage, &[PUNCH_IN, SHAKE, IMPACT]),
        wait(120.0),
        add(ReactionImage, &[PUNCH_IN, IMPACT]),
        wait(260.0),
        add(ReactionImage, &[SHAKE]),
        wait(b.reaction_hold),
        remove(ReactionImage, &[PUNCH_IN, SHAKE, IMPACT]),
    ]
}

impl TimelineScript {
    /// Current page: together → reaction → pre-confirmation with the question
    /// revealed at the end.
    pub fn valentine() -> Self {
        use Target::*;
        let mut steps = together_and_reaction(&Beats {
            enter: 160.0,
            first_caption: "Even though we are so far apart, you always keep me close.",
            caption_hold: 3000.0,
            meet: 1350.0,
            second_caption: "I love you more than you love PUTTU AND KADALA",
            scene_hold: 4000.0,
            reaction_hold: 4000.0,
        });
        steps.extend([
            Step::ShowScene(Scene::PreConfirmation),
            remove(LineOne, &[SHOW]),
            remove(LineTwo, &[SHOW]),
            text(LineOne, ""),
            text(LineTwo, ""),
            text(LineOne, "I KNOW YOURE MY VALENTINE, NOW AND FORVER."),
            wait(120.0),
            add(LineOne, &[SHOW]),
            wait(2200.0),
            text(LineTwo, "BUT STILL"),
            wait(120.0),
            add(LineTwo, &[SHOW]),
            wait(1400.0),
            add(Ask, &[SHOW]),
        ]);
        Self {
            name: "valentine".to_string(),
            steps,
        }
    }

    /// Earlier revision: shorter holds, different captions, stops on the reaction
    /// scene.
    pub fn first_draft() -> Self {
        Self {
            name: "first-draft".to_string(),
            steps: together_and_reaction(&Beats {
                enter: 160.0,
                first_caption: "Even though we are miles apart, you are always right here.",
                caption_hold: 2600.0,
                meet: 1600.0,
                second_caption: "I love you more than PUTTU AND KADALA",
                scene_hold: 3500.0,
                reaction_hold: 3500.0,
            }),
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "valentine" => Some(Self::valentine()),
            "first-draft" => Some(Self::first_draft()),
            _ => None,
        }
    }

    /// Sum of every wait.
    pub fn total_duration_ms(&self) -> f64 {
        self.steps
            .iter()
            .map(|s| match s {
                Step::Wait(ms) => *ms,
                _ => 0.0,
            })
            .sum()
    }

    /// Scenes the script visits, in order.
    pub fn scenes(&self) -> Vec<Scene> {
        self.steps
            .iter()
            .filter_map(|s| match s {
                Step::ShowScene(scene) => Some(*scene),
                _ => None,
            })
            .collect()
    }

    /// Scenes strictly forward, confirmation left to the confirm control, waits
    /// finite and non-negative, images only moved on the together scene.
    pub fn validate(&self) -> CardResult<()> {
        let mut scene = Scene::Intro;
        for (i, step) in self.steps.iter().enumerate() {
            match step {
                Step::Wait(ms) if !ms.is_finite() || *ms < 0.0 => {
                    return Err(CardError::invalid_script(format!("step {i}: bad wait {ms}")));
                }
                Step::ShowScene(Scene::Confirmation) => {
                    return Err(CardError::invalid_script(format!(
                        "step {i}: confirmation is reached only through confirm"
                    )));
                }
                Step::ShowScene(next) => {
                    if *next <= scene {
                        return Err(CardError::SceneRegression { from: scene, to: *next });
                    }
                    scene = *next;
                }
                Step::MoveTogether if scene != Scene::Together => {
                    return Err(CardError::invalid_script(format!(
                        "step {i}: images can only move on the together scene"
                    )));
                }
                Step::AddClasses(_, classes) | Step::RemoveClasses(_, classes)
                    if classes.iter().any(|c| c.trim().is_empty()) =>
                {
                    return Err(CardError::invalid_script(format!("step {i}: empty class name")));
                }
                Step::RestartClass(_, class) if class.trim().is_empty() => {
                    return Err(CardError::invalid_script(format!("step {i}: empty class name")));
                }
                _ => {}
            }
        }
        Ok(())
    }

    #[cfg(feature = "serde_json")]
    pub fn from_json(json: &str) -> CardResult<Self> {
        let script: Self = serde_json::from_str(json)?;
        script.validate()?;
        Ok(script)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_scripts_validate() {
        TimelineScript::valentine().validate().unwrap();
        TimelineScript::first_draft().validate().unwrap();
    }

    #[test]
    fn scene_order() {
        assert_eq!(
            TimelineScript::valentine().scenes(),
            vec![Scene::Together, Scene::Reaction, Scene::PreConfirmation]
        );
        assert_eq!(
            TimelineScript::first_draft().scenes(),
            vec![Scene::Together, Scene::Reaction]
        );
    }

    #[test]
    fn valentine_total_duration_sums_every_wait() {
        // 160 + 60 + 3000 + 1350 + 120 + 4000 + 350 + 120 + 260 + 4000 + 120 + 2200 + 120 + 1400
        assert_eq!(TimelineScript::valentine().total_duration_ms(), 17_260.0);
    }

    #[test]
    fn rejects_scripted_confirmation() {
        let s = TimelineScript {
            name: "bad".into(),
            steps: vec![Step::ShowScene(Scene::Confirmation)],
        };
        assert!(matches!(s.validate(), Err(CardError::InvalidScript(_))));
    }

    #[test]
    fn rejects_move_outside_together() {
        let s = TimelineScript {
            name: "bad".into(),
            steps: vec![Step::ShowScene(Scene::Reaction), Step::MoveTogether],
        };
        assert!(s.validate().is_err());
    }

    #[test]
    fn lookup_by_name() {
        assert_eq!(TimelineScript::by_name("first-draft"), Some(TimelineScript::first_draft()));
        assert!(TimelineScript::by_name("nope").is_none());
    }

    #[cfg(feature = "serde_json")]
    #[test]
    fn json_script_round_trips_through_validation() {
        let json = r#"{
            "name": "tiny",
            "steps": [
                { "show_scene": "together" },
                { "wait": 100.0 },
                "move_together",
                { "set_text": ["together_text", "hi"] }
            ]
        }"#;
        let s = TimelineScript::from_json(json).unwrap();
        assert_eq!(s.steps.len(), 4);
        assert_eq!(s.total_duration_ms(), 100.0);
    }
}
