#![cfg(target_arch = "wasm32")]

use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;

use valentine_card::config::SurfaceConfig;
use valentine_card::layout::TouchOffsets;
use valentine_card::particles::confetti::ConfettiConfig;
use valentine_card::particles::{GlyphStamp, Surface};
use valentine_card::web::{CanvasLayer, DomStage, set_timeout_once};
use valentine_card::{CardError, Scene, Stage, Target};

wasm_bindgen_test_configure!(run_in_browser);

const FIXTURE: &str = r#"
<style>
  #imgLeftWrap, #imgRightWrap { transition: transform 4200ms; }
</style>
<canvas id="scratch" width="40" height="40"></canvas>
<div id="scene0" class="scene scene--active"></div>
<div id="scene1" class="scene scene--hidden">
  <div id="worldStage" style="position:relative;width:800px;height:400px">
    <div id="imgLeftWrap" style="position:absolute;left:40px;top:50%;width:200px;height:200px"></div>
    <div id="imgRightWrap" style="position:absolute;left:560px;top:50%;width:200px;height:200px"></div>
  </div>
  <div id="scene1Text"></div>
  <div id="midHeart"></div>
</div>
<div id="scenePut" class="scene scene--hidden"><div id="putImgWrap"></div></div>
<div id="scene2" class="scene scene--hidden"></div>
<div id="scene4" class="scene scene--hidden"></div>
"#;

fn dom_stage() -> DomStage {
    let win = web_sys::window().unwrap();
    let doc = win.document().unwrap();
    doc.body().unwrap().set_inner_html(FIXTURE);
    DomStage::new(win, doc, ConfettiConfig::default(), SurfaceConfig::default())
}

fn has_class(id: &str, class: &str) -> bool {
    let doc = web_sys::window().unwrap().document().unwrap();
    doc.get_element_by_id(id).unwrap().class_list().contains(class)
}

#[wasm_bindgen_test]
fn show_scene_leaves_exactly_one_active() {
    let mut stage = dom_stage();
    stage.show_scene(Scene::Reaction).unwrap();
    for scene in Scene::ALL {
        let active = has_class(scene.element_id(), "scene--active");
        assert_eq!(active, scene == Scene::Reaction, "{:?}", scene);
        assert_eq!(has_class(scene.element_id(), "scene--hidden"), scene != Scene::Reaction);
    }
}

#[wasm_bindgen_test]
fn classes_and_text_are_applied() {
    let mut stage = dom_stage();
    stage.set_text(Target::TogetherText, "hello").unwrap();
    stage.add_classes(Target::MidHeart, &["show".into(), "thump".into()]).unwrap();
    stage.restart_class(Target::MidHeart, "thump").unwrap();
    stage.remove_classes(Target::MidHeart, &["show".into()]).unwrap();
    assert!(has_class("midHeart", "thump"));
    assert!(!has_class("midHeart", "show"));
    let doc = web_sys::window().unwrap().document().unwrap();
    let text = doc.get_element_by_id("scene1Text").unwrap().text_content();
    assert_eq!(text.as_deref(), Some("hello"));
}

#[wasm_bindgen_test]
fn measured_geometry_matches_layout() {
    let mut stage = dom_stage();
    stage.show_scene(Scene::Together).unwrap();
    let geo = stage.measure_touch().unwrap();
    assert!(geo.stage.width > 0.0);
    assert!(geo.right.left > geo.left.right());
}

#[wasm_bindgen_test]
fn missing_target_is_an_error() {
    let mut stage = dom_stage();
    let err = stage.set_text(Target::LineOne, "x").unwrap_err();
    assert_eq!(err, CardError::missing("scene2Line1"));
}

#[wasm_bindgen_test]
fn remeasure_after_move_ignores_applied_offsets() {
    let mut stage = dom_stage();
    stage.show_scene(Scene::Together).unwrap();
    let first = stage.measure_touch().unwrap();
    stage
        .apply_offsets(TouchOffsets {
            left_x: 120.0,
            right_x: -120.0,
        })
        .unwrap();
    let again = stage.measure_touch().unwrap();
    assert!((again.left.left - first.left.left).abs() < 0.5);
    assert!((again.right.left - first.right.left).abs() < 0.5);
}

#[wasm_bindgen_test]
fn glyph_stamp_leaves_context_state_untouched() {
    let _ = dom_stage();
    let doc = web_sys::window().unwrap().document().unwrap();
    let layer = CanvasLayer::open(&doc, "scratch", false, 2.0).unwrap();
    layer
        .surface()
        .stamp_glyph(GlyphStamp {
            x: 10.0,
            y: 10.0,
            angle: 0.5,
            size: 12.0,
            text: "x",
            alpha: 0.3,
        })
        .unwrap();
    let ctx = doc
        .get_element_by_id("scratch")
        .unwrap()
        .dyn_into::<web_sys::HtmlCanvasElement>()
        .unwrap()
        .get_context("2d")
        .unwrap()
        .unwrap()
        .dyn_into::<web_sys::CanvasRenderingContext2d>()
        .unwrap();
    assert_eq!(ctx.global_alpha(), 1.0);
}

#[wasm_bindgen_test]
async fn timeout_callback_fires_once() {
    let hits = Rc::new(Cell::new(0));
    let seen = hits.clone();
    set_timeout_once(0, move || seen.set(seen.get() + 1)).unwrap();
    let wait = js_sys::Promise::new(&mut |resolve, _| {
        let win = web_sys::window().unwrap();
        win.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, 30)
            .unwrap();
    });
    wasm_bindgen_futures::JsFuture::from(wait).await.unwrap();
    assert_eq!(hits.get(), 1);
}
