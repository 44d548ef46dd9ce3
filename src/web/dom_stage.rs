//! `Stage` over the real document. Elements are looked up on every call so a missing
//! one surfaces as `CardError::MissingElement` at the step that needs it.

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, Window};

use super::canvas::CanvasLayer;
use crate::config::SurfaceConfig;
use crate::layout::{Rect, TouchGeometry, TouchOffsets};
use crate::particles::ParticleField;
use crate::particles::confetti::{Confetti, ConfettiConfig};
use crate::stage::Stage;
use crate::timeline::{Scene, Target};
use crate::{CardError, CardResult};

const SCENE_SELECTOR: &str = ".scene";
const SCENE_ACTIVE: &str = "scene--active";
const SCENE_HIDDEN: &str = "scene--hidden";

pub struct DomStage {
    win: Window,
    doc: Document,
    confetti: ConfettiConfig,
    surface: SurfaceConfig,
}

impl DomStage {
    pub fn new(win: Window, doc: Document, confetti: ConfettiConfig, surface: SurfaceConfig) -> Self {
        Self {
            win,
            doc,
            confetti,
            surface,
        }
    }

    fn element(&self, id: &str) -> CardResult<Element> {
        self.doc
            .get_element_by_id(id)
            .ok_or_else(|| CardError::missing(id))
    }

    fn html_element(&self, id: &str) -> CardResult<HtmlElement> {
        self.element(id)?
            .dyn_into::<HtmlElement>()
            .map_err(|_| CardError::WrongElementType {
                id: id.to_string(),
                expected: "HtmlElement",
            })
    }

    fn rect(&self, id: &str) -> CardResult<Rect> {
        let r = self.element(id)?.get_bounding_client_rect();
        Ok(Rect::new(r.left(), r.top(), r.width(), r.height()))
    }

    fn translate_x(&self, id: &str, x: f64) -> CardResult<()> {
        self.html_element(id)?
            .style()
            .set_property("transform", &format!("translateY(-50%) translateX({x}px)"))?;
        Ok(())
    }

    /// Override the inline transition, or drop the override with `None`.
    fn set_transition(&self, id: &str, value: Option<&str>) -> CardResult<()> {
        let style = self.html_element(id)?.style();
        match value {
            Some(v) => style.set_property("transition", v)?,
            None => {
                style.remove_property("transition")?;
            }
        }
        Ok(())
    }
}

impl Stage for DomStage {
    fn show_scene(&mut self, scene: Scene) -> CardResult<()> {
        let target = self.element(scene.element_id())?;
        let all = self.doc.query_selector_all(SCENE_SELECTOR)?;
        for i in 0..all.length() {
            let Some(el) = all.get(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
                continue;
            };
            let classes = el.class_list();
            classes.add_1(SCENE_HIDDEN)?;
            classes.remove_1(SCENE_ACTIVE)?;
        }
        let classes = target.class_list();
        classes.remove_1(SCENE_HIDDEN)?;
        classes.add_1(SCENE_ACTIVE)?;
        Ok(())
    }

    fn set_text(&mut self, target: Target, text: &str) -> CardResult<()> {
        self.element(target.element_id())?.set_text_content(Some(text));
        Ok(())
    }

    fn add_classes(&mut self, target: Target, classes: &[String]) -> CardResult<()> {
        let list = self.element(target.element_id())?.class_list();
        for c in classes {
            list.add_1(c)?;
        }
        Ok(())
    }

    fn remove_classes(&mut self, target: Target, classes: &[String]) -> CardResult<()> {
        let list = self.element(target.element_id())?.class_list();
        for c in classes {
            list.remove_1(c)?;
        }
        Ok(())
    }

    fn restart_class(&mut self, target: Target, class: &str) -> CardResult<()> {
        let el = self.html_element(target.element_id())?;
        el.class_list().remove_1(class)?;
        // reading layout forces a reflow so the animation starts over
        let _ = el.offset_width();
        el.class_list().add_1(class)?;
        Ok(())
    }

    fn measure_touch(&mut self) -> CardResult<TouchGeometry> {
        let images = [Target::LEFT_IMAGE_ID, Target::RIGHT_IMAGE_ID];
        // no transition while resetting, or the rects would report the old offsets
        for id in images {
            self.set_transition(id, Some("none"))?;
            self.translate_x(id, 0.0)?;
        }
        let measured = (|| -> CardResult<TouchGeometry> {
            Ok(TouchGeometry {
                stage: self.rect(Target::STAGE_ID)?,
                left: self.rect(Target::LEFT_IMAGE_ID)?,
                right: self.rect(Target::RIGHT_IMAGE_ID)?,
            })
        })();
        for id in images {
            self.set_transition(id, None)?;
        }
        measured
    }

    fn apply_offsets(&mut self, offsets: TouchOffsets) -> CardResult<()> {
        self.translate_x(Target::LEFT_IMAGE_ID, offsets.left_x)?;
        self.translate_x(Target::RIGHT_IMAGE_ID, offsets.right_x)
    }

    fn start_confetti(&mut self) -> CardResult<()> {
        let mut layer = CanvasLayer::open(
            &self.doc,
            Target::CONFETTI_CANVAS_ID,
            false,
            self.surface.max_pixel_ratio,
        )?
        .with_font_family(&self.confetti.font_family);
        let bounds = layer.resize(&self.win)?;
        let field = ParticleField::new(Confetti::new(self.confetti.clone()), bounds, super::fresh_seed())
            .with_clock(super::frame_clock(&self.surface));
        super::animate(layer, field)
    }
}
