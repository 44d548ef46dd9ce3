//! Valentine Card core crate.
//!
//! A scripted greeting page: drifting canvas clouds in the background, a timeline of
//! captions and image effects across a handful of scenes, and a burst of heart
//! confetti once the question is answered. All the timing, particle and layout logic
//! is plain Rust and testable on the host; `web` is the thin layer that binds it to
//! the document.

use wasm_bindgen::prelude::*;

pub mod config;
pub mod error;
pub mod layout;
pub mod particles;
pub mod stage;
pub mod timeline;
pub mod web;

pub use config::CardConfig;
pub use error::{CardError, CardResult};
pub use stage::{MemoryStage, Stage};
pub use timeline::{Phase, Scene, Step, Target, Timeline, TimelineScript};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
}

// -----------------------------------------------------------------------------
// Entrypoints
// -----------------------------------------------------------------------------

/// Start the background animation and wire the page's controls.
#[wasm_bindgen]
pub fn start_card() -> Result<(), JsValue> {
    web::start(CardConfig::default()).map_err(JsValue::from)
}

/// Same as `start_card` with a JSON override of any part of the configuration.
#[cfg(feature = "serde_json")]
#[wasm_bindgen]
pub fn start_card_with_config(json: &str) -> Result<(), JsValue> {
    let config = CardConfig::from_json(json)?;
    web::start(config).map_err(JsValue::from)
}
