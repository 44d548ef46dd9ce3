//! Background cloud layer: soft white radial blobs drifting right over a night-sky
//! gradient, split across parallax layers.

use super::{Bounds, Frame, Species, Surface};
use crate::CardResult;
use crate::config::Span;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CloudConfig {
    pub count: usize,
    pub radius: Span,
    pub vx: Span,
    pub vy: Span,
    pub opacity: Span,
    /// Speed multiplier per layer; blob `i` sits on layer `i % len`.
    pub layer_speeds: Vec<f64>,
    pub phase_rate: f64,
    /// Vertical drift follows `sin(phase + x * wobble)`.
    pub wobble: f64,
    /// Radius pulse amplitude.
    pub pulse: f64,
    pub sky: Vec<(f32, String)>,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            count: 34,
            radius: Span::new(140.0, 400.0),
            vx: Span::new(0.09, 0.25),
            vy: Span::new(0.02, 0.07),
            opacity: Span::new(0.12, 0.28),
            layer_speeds: vec![0.35, 0.65, 1.0],
            phase_rate: 0.003,
            wobble: 0.002,
            pulse: 0.05,
            sky: vec![
                (0.0, "#0b1020".to_string()),
                (0.55, "#070a14".to_string()),
                (1.0, "#050714".to_string()),
            ],
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Blob {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub vx: f64,
    pub vy: f64,
    pub opacity: f64,
    pub layer: usize,
}

pub struct Clouds {
    cfg: CloudConfig,
}

impl Clouds {
    pub fn new(cfg: CloudConfig) -> Self {
        Self { cfg }
    }

    pub fn layer_speed(&self, layer: usize) -> f64 {
        self.cfg.layer_speeds.get(layer).copied().unwrap_or(1.0)
    }
}

impl Species for Clouds {
    type Particle = Blob;

    fn pool_size(&self) -> usize {
        self.cfg.count
    }

    fn spawn(&self, index: usize, rng: &mut fastrand::Rng, bounds: Bounds) -> Blob {
        Blob {
            x: rng.f64() * bounds.width,
            y: rng.f64() * bounds.height,
            radius: self.cfg.radius.sample(rng),
            vx: self.cfg.vx.sample(rng),
            vy: self.cfg.vy.sample(rng),
            opacity: self.cfg.opacity.sample(rng),
            layer: index % self.cfg.layer_speeds.len().max(1),
        }
    }

    fn advance(&self, b: &mut Blob, frame: Frame) {
        let speed = self.layer_speed(b.layer);
        b.x += b.vx * speed * frame.scale;
        b.y += b.vy * speed * (frame.phase + b.x * self.cfg.wobble).sin() * frame.scale;
    }

    // Blobs wrap instead of re-randomizing so the sky never pops.
    fn recycle(&self, b: &mut Blob, _rng: &mut fastrand::Rng, bounds: Bounds) -> bool {
        let mut wrapped = false;
        if b.x - b.radius > bounds.width {
            b.x = -b.radius;
            wrapped = true;
        }
        if b.x + b.radius < 0.0 {
            b.x = bounds.width + b.radius;
            wrapped = true;
        }
        if b.y - b.radius > bounds.height {
            b.y = -b.radius;
            wrapped = true;
        }
        if b.y + b.radius < 0.0 {
            b.y = bounds.height + b.radius;
            wrapped = true;
        }
        wrapped
    }

    fn phase_rate(&self) -> f64 {
        self.cfg.phase_rate
    }

    fn paint_backdrop(&self, surface: &mut dyn Surface, bounds: Bounds) -> CardResult<()> {
        let stops: Vec<(f32, &str)> = self.cfg.sky.iter().map(|(o, c)| (*o, c.as_str())).collect();
        surface.fill_vertical_gradient(bounds, &stops)
    }

    fn draw(&self, b: &Blob, phase: f64, surface: &mut dyn Surface) -> CardResult<()> {
        let pulse = 1.0 + self.cfg.pulse * (phase * 3.0 + b.x * 0.01).sin();
        let r = b.radius * pulse;
        let core = format!("rgba(255,255,255,{:.4})", 0.26 * b.opacity);
        let mid = format!("rgba(255,255,255,{:.4})", 0.12 * b.opacity);
        surface.radial_blob(
            b.x,
            b.y,
            r * 0.10,
            r,
            &[(0.0, &core), (0.55, &mid), (1.0, "rgba(255,255,255,0)")],
        )
    }
}
