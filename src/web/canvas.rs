//! 2D canvas plumbing: DPR-aware sizing and the `Surface` implementation.

use std::f64::consts::TAU;

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, Window};

use crate::layout::backing_store;
use crate::particles::{Bounds, GlyphStamp, Surface};
use crate::{CardError, CardResult};

/// A canvas plus its context, sized to its CSS box times the (capped) pixel ratio.
pub struct CanvasLayer {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    max_ratio: f64,
    font_family: String,
}

impl CanvasLayer {
    pub fn open(doc: &Document, id: &str, opaque: bool, max_ratio: f64) -> CardResult<Self> {
        let canvas: HtmlCanvasElement = doc
            .get_element_by_id(id)
            .ok_or_else(|| CardError::missing(id))?
            .dyn_into()
            .map_err(|_| CardError::WrongElementType {
                id: id.to_string(),
                expected: "canvas",
            })?;
        let ctx = if opaque {
            let opts = web_sys::ContextAttributes2d::new();
            opts.set_alpha(false);
            canvas.get_context_with_context_options("2d", &opts)?
        } else {
            canvas.get_context("2d")?
        }
        .ok_or(CardError::NoContext("2d context"))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| CardError::NoContext("2d context"))?;
        Ok(Self {
            canvas,
            ctx,
            max_ratio,
            font_family: "system-ui".to_string(),
        })
    }

    pub fn with_font_family(mut self, family: &str) -> Self {
        self.font_family = family.to_string();
        self
    }

    /// Match the backing store to the current CSS size. Returns the CSS bounds.
    pub fn resize(&mut self, win: &Window) -> CardResult<Bounds> {
        let css_w = self.canvas.client_width() as f64;
        let css_h = self.canvas.client_height() as f64;
        let store = backing_store(css_w, css_h, win.device_pixel_ratio(), self.max_ratio);
        self.canvas.set_width(store.width);
        self.canvas.set_height(store.height);
        self.ctx.set_transform(store.scale, 0.0, 0.0, store.scale, 0.0, 0.0)?;
        Ok(Bounds::new(css_w, css_h))
    }

    pub fn surface(&self) -> CanvasSurface<'_> {
        CanvasSurface {
            ctx: &self.ctx,
            font_family: &self.font_family,
        }
    }
}

pub struct CanvasSurface<'a> {
    ctx: &'a CanvasRenderingContext2d,
    font_family: &'a str,
}

impl Surface for CanvasSurface<'_> {
    fn fill_vertical_gradient(&mut self, bounds: Bounds, stops: &[(f32, &str)]) -> CardResult<()> {
        let g = self.ctx.create_linear_gradient(0.0, 0.0, 0.0, bounds.height);
        for (offset, color) in stops {
            g.add_color_stop(*offset, color)?;
        }
        self.ctx.set_fill_style_canvas_gradient(&g);
        self.ctx.fill_rect(0.0, 0.0, bounds.width, bounds.height);
        Ok(())
    }

    fn clear(&mut self, bounds: Bounds) {
        self.ctx.clear_rect(0.0, 0.0, bounds.width, bounds.height);
    }

    fn radial_blob(
        &mut self,
        x: f64,
        y: f64,
        inner: f64,
        radius: f64,
        stops: &[(f32, &str)],
    ) -> CardResult<()> {
        let g = self.ctx.create_radial_gradient(x, y, inner, x, y, radius)?;
        for (offset, color) in stops {
            g.add_color_stop(*offset, color)?;
        }
        self.ctx.set_fill_style_canvas_gradient(&g);
        self.ctx.begin_path();
        self.ctx.arc(x, y, radius, 0.0, TAU)?;
        self.ctx.fill();
        Ok(())
    }

    fn stamp_glyph(&mut self, stamp: GlyphStamp<'_>) -> CardResult<()> {
        let ctx = self.ctx;
        ctx.save();
        let drawn = ctx
            .translate(stamp.x, stamp.y)
            .and_then(|()| ctx.rotate(stamp.angle))
            .and_then(|()| {
                ctx.set_font(&format!("{:.1}px {}", stamp.size, self.font_family));
                ctx.set_text_align("center");
                ctx.set_text_baseline("middle");
                ctx.set_global_alpha(stamp.alpha);
                ctx.fill_text(stamp.text, 0.0, 0.0)
            });
        // pairs with save() on every path
        ctx.restore();
        drawn.map_err(CardError::from)
    }
}
