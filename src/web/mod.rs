//! Browser driver: wires the page's controls to the timeline, pumps it from a single
//! timeout, and runs the particle animators on requestAnimationFrame.
//!
//! Each animator owns its canvas and particle field inside its own frame closure.
//! The timeline and the DOM stage share one thread-local cell that is only borrowed
//! from inside event / timer callbacks.

mod canvas;
mod dom_stage;

pub use canvas::CanvasLayer;
pub use dom_stage::DomStage;

use std::cell::RefCell;
use std::rc::Rc;

use log::{error, info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::window;

use crate::config::{CardConfig, SurfaceConfig};
use crate::particles::clouds::Clouds;
use crate::particles::{FrameClock, ParticleField, Species};
use crate::timeline::Timeline;
use crate::{CardError, CardResult};

const CLOUDS_CANVAS_ID: &str = "cloudsCanvas";
const START_BUTTON_ID: &str = "startBtn";
const CONFIRM_SELECTOR: &str = ".yesBtn";

struct Card {
    timeline: Timeline,
    stage: DomStage,
    timer: Option<i32>,
}

thread_local! {
    static CARD: RefCell<Option<Card>> = const { RefCell::new(None) };
}

pub(crate) fn performance_now() -> f64 {
    window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

/// Seed for a particle field. Falls back to the clock if crypto is unavailable.
pub(crate) fn fresh_seed() -> u64 {
    let mut buf = [0u8; 8];
    match getrandom::getrandom(&mut buf) {
        Ok(()) => u64::from_le_bytes(buf),
        Err(e) => {
            warn!("getrandom failed ({e}), seeding from clock");
            (performance_now() * 1000.0) as u64
        }
    }
}

pub(crate) fn frame_clock(cfg: &SurfaceConfig) -> FrameClock {
    FrameClock::new(cfg.nominal_frame_ms, cfg.max_frame_ms)
}

pub fn start(config: CardConfig) -> CardResult<()> {
    config.validate()?;
    let win = window().ok_or(CardError::NoContext("window"))?;
    let doc = win.document().ok_or(CardError::NoContext("document"))?;

    // Background clouds run for the whole session.
    let mut clouds = CanvasLayer::open(&doc, CLOUDS_CANVAS_ID, true, config.surface.max_pixel_ratio)?;
    let bounds = clouds.resize(&win)?;
    let field = ParticleField::new(Clouds::new(config.clouds.clone()), bounds, fresh_seed())
        .with_clock(frame_clock(&config.surface));
    animate(clouds, field)?;

    let stage = DomStage::new(win.clone(), doc.clone(), config.confetti.clone(), config.surface.clone());
    info!("card ready (script '{}')", config.script.name);
    CARD.with(|cell| {
        cell.replace(Some(Card {
            timeline: Timeline::new(config.script),
            stage,
            timer: None,
        }))
    });

    bind_start(&doc)?;
    bind_confirm(&doc)?;
    bind_resize(&win)?;
    Ok(())
}

// --- Controls -----------------------------------------------------------------

fn bind_start(doc: &web_sys::Document) -> CardResult<()> {
    let button = doc
        .get_element_by_id(START_BUTTON_ID)
        .ok_or_else(|| CardError::missing(START_BUTTON_ID))?;
    let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
        with_card(|card| match card.timeline.start(performance_now(), &mut card.stage) {
            Ok(next) => schedule(card, next),
            Err(CardError::AlreadyStarted) => {}
            Err(e) => error!("timeline failed to start: {e}"),
        });
    }) as Box<dyn FnMut(_)>);
    button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn bind_confirm(doc: &web_sys::Document) -> CardResult<()> {
    let buttons = doc.query_selector_all(CONFIRM_SELECTOR)?;
    if buttons.length() == 0 {
        warn!("no confirm controls matched {CONFIRM_SELECTOR}");
    }
    for i in 0..buttons.length() {
        let Some(button) = buttons.get(i) else {
            continue;
        };
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
            with_card(|card| {
                if let Some(handle) = card.timer.take() {
                    if let Some(w) = window() {
                        w.clear_timeout_with_handle(handle);
                    }
                }
                if let Err(e) = card.timeline.confirm(&mut card.stage) {
                    error!("confirm failed: {e}");
                }
            });
        }) as Box<dyn FnMut(_)>);
        button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    Ok(())
}

fn bind_resize(win: &web_sys::Window) -> CardResult<()> {
    let closure = Closure::wrap(Box::new(move || {
        with_card(|card| {
            if let Err(e) = card.timeline.on_resize(&mut card.stage) {
                error!("resize re-layout failed: {e}");
            }
        });
    }) as Box<dyn FnMut()>);
    win.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn with_card(f: impl FnOnce(&mut Card)) {
    CARD.with(|cell| {
        if let Some(card) = cell.borrow_mut().as_mut() {
            f(card);
        }
    });
}

// --- Timeline scheduler ---------------------------------------------------------

/// Arm one timeout for the timeline's next deadline.
fn schedule(card: &mut Card, next: Option<f64>) {
    card.timer = None;
    let Some(at) = next else {
        return;
    };
    let delay = (at - performance_now()).max(0.0).ceil() as i32;
    let armed = set_timeout_once(delay, || {
        with_card(|card| match card.timeline.advance(performance_now(), &mut card.stage) {
            Ok(next) => schedule(card, next),
            Err(e) => error!("timeline stopped: {e}"),
        });
    });
    match armed {
        Ok(handle) => card.timer = Some(handle),
        Err(e) => error!("set_timeout failed: {e}"),
    }
}

/// Run `f` once after `delay_ms`. The callback is released by JS after it fires.
pub fn set_timeout_once(delay_ms: i32, f: impl FnOnce() + 'static) -> CardResult<i32> {
    let win = window().ok_or(CardError::NoContext("window"))?;
    let callback = Closure::once_into_js(f);
    Ok(win.set_timeout_with_callback_and_timeout_and_arguments_0(
        callback.unchecked_ref(),
        delay_ms,
    )?)
}

// --- Frame loops ------------------------------------------------------------------

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

fn start_frame_loop(mut on_frame: impl FnMut(f64) + 'static) {
    let f: FrameCallback = Rc::new(RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
        on_frame(ts);
        if let (Some(w), Some(cb)) = (window(), f.borrow().as_ref()) {
            let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
        }
    }) as Box<dyn FnMut(f64)>));
    if let (Some(w), Some(cb)) = (window(), g.borrow().as_ref()) {
        let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}

/// Run `field` on `layer` forever, following window resizes.
pub(crate) fn animate<S>(layer: CanvasLayer, field: ParticleField<S>) -> CardResult<()>
where
    S: Species + 'static,
    S::Particle: 'static,
{
    let win = window().ok_or(CardError::NoContext("window"))?;
    let state = Rc::new(RefCell::new((layer, field)));

    {
        let state = state.clone();
        let win_resize = win.clone();
        let closure = Closure::wrap(Box::new(move || {
            let mut st = state.borrow_mut();
            let (layer, field) = &mut *st;
            match layer.resize(&win_resize) {
                Ok(bounds) => field.resize(bounds),
                Err(e) => error!("canvas resize failed: {e}"),
            }
        }) as Box<dyn FnMut()>);
        win.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    start_frame_loop(move |ts| {
        let mut st = state.borrow_mut();
        let (layer, field) = &mut *st;
        field.tick(ts);
        if let Err(e) = field.render(&mut layer.surface()) {
            error!("frame render failed: {e}");
        }
    });
    Ok(())
}
