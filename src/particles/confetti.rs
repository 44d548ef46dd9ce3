//! Heart confetti: emoji glyphs falling under light gravity, spinning as they go.
//! Pieces that drop below the view, drift too far sideways or run out of life are
//! re-randomized into a band just above the top edge.

use std::f64::consts::TAU;

use super::{Bounds, Frame, GlyphStamp, Species, Surface};
use crate::CardResult;
use crate::config::Span;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ConfettiConfig {
    pub count: usize,
    pub glyphs: Vec<String>,
    pub size: Span,
    pub vx: Span,
    /// Fall speed for the first wave.
    pub initial_vy: Span,
    /// Fall speed after a respawn (slightly faster).
    pub respawn_vy: Span,
    pub spin: Span,
    pub life: Span,
    pub gravity: f64,
    /// Respawned pieces start `top_margin + rand * respawn_band` above the view.
    pub top_margin: f64,
    pub respawn_band: f64,
    pub bottom_margin: f64,
    pub side_margin: f64,
    pub alpha: f64,
    pub font_family: String,
}

impl Default for ConfettiConfig {
    fn default() -> Self {
        Self {
            count: 240,
            glyphs: ["❤️", "💖", "💘", "💕", "💗", "💓", "💞"]
                .iter()
                .map(|g| g.to_string())
                .collect(),
            size: Span::new(18.0, 38.0),
            vx: Span::new(-1.2, 1.2),
            initial_vy: Span::new(2.8, 7.6),
            respawn_vy: Span::new(3.0, 8.0),
            spin: Span::new(-0.04, 0.04),
            life: Span::new(180.0, 340.0),
            gravity: 0.01,
            top_margin: 80.0,
            respawn_band: 220.0,
            bottom_margin: 90.0,
            side_margin: 120.0,
            alpha: 0.98,
            font_family: "Inter, system-ui, Apple Color Emoji, Segoe UI Emoji".to_string(),
        }
    }
}

impl ConfettiConfig {
    /// Vertical range a respawned piece lands in.
    pub fn respawn_y(&self) -> Span {
        Span::new(-self.top_margin - self.respawn_band, -self.top_margin)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Heart {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub vx: f64,
    pub vy: f64,
    pub angle: f64,
    pub spin: f64,
    pub glyph: usize,
    pub life: f64,
}

pub struct Confetti {
    cfg: ConfettiConfig,
}

impl Confetti {
    pub fn new(cfg: ConfettiConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &ConfettiConfig {
        &self.cfg
    }

    pub fn glyph(&self, heart: &Heart) -> &str {
        self.cfg.glyphs.get(heart.glyph).map(String::as_str).unwrap_or("❤️")
    }

    pub fn is_out(&self, h: &Heart, bounds: Bounds) -> bool {
        h.y > bounds.height + self.cfg.bottom_margin
            || h.x < -self.cfg.side_margin
            || h.x > bounds.width + self.cfg.side_margin
            || h.life <= 0.0
    }

    fn randomize(&self, rng: &mut fastrand::Rng, bounds: Bounds, y: f64, vy: Span) -> Heart {
        Heart {
            x: rng.f64() * bounds.width,
            y,
            size: self.cfg.size.sample(rng),
            vx: self.cfg.vx.sample(rng),
            vy: vy.sample(rng),
            angle: rng.f64() * TAU,
            spin: self.cfg.spin.sample(rng),
            glyph: rng.usize(..self.cfg.glyphs.len().max(1)),
            life: self.cfg.life.sample(rng),
        }
    }
}

impl Species for Confetti {
    type Particle = Heart;

    fn pool_size(&self) -> usize {
        self.cfg.count
    }

    // First wave is spread over a full screen height above the view.
    fn spawn(&self, _index: usize, rng: &mut fastrand::Rng, bounds: Bounds) -> Heart {
        let y = -self.cfg.top_margin - rng.f64() * bounds.height;
        self.randomize(rng, bounds, y, self.cfg.initial_vy)
    }

    fn advance(&self, h: &mut Heart, frame: Frame) {
        h.x += h.vx * frame.scale;
        h.y += h.vy * frame.scale;
        h.angle += h.spin * frame.scale;
        h.vy += self.cfg.gravity * frame.scale;
        h.life -= frame.scale;
    }

    fn recycle(&self, h: &mut Heart, rng: &mut fastrand::Rng, bounds: Bounds) -> bool {
        if !self.is_out(h, bounds) {
            return false;
        }
        let y = self.cfg.respawn_y().sample(rng);
        *h = self.randomize(rng, bounds, y, self.cfg.respawn_vy);
        true
    }

    fn paint_backdrop(&self, surface: &mut dyn Surface, bounds: Bounds) -> CardResult<()> {
        surface.clear(bounds);
        Ok(())
    }

    fn draw(&self, h: &Heart, _phase: f64, surface: &mut dyn Surface) -> CardResult<()> {
        surface.stamp_glyph(GlyphStamp {
            x: h.x,
            y: h.y,
            angle: h.angle,
            size: h.size,
            text: self.glyph(h),
            alpha: self.cfg.alpha,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particles::ParticleField;
    use crate::particles::tests::CountingSurface;

    fn field(seed: u64) -> ParticleField<Confetti> {
        ParticleField::new(Confetti::new(ConfettiConfig::default()), Bounds::new(390.0, 844.0), seed)
    }

    #[test]
    fn first_wave_starts_above_view() {
        let f = field(3);
        let cfg = ConfettiConfig::default();
        assert_eq!(f.len(), 240);
        for h in f.particles() {
            assert!(h.y <= -80.0 && h.y >= -80.0 - 844.0);
            assert!(cfg.initial_vy.contains(h.vy));
            assert!(cfg.size.contains(h.size));
            assert!(h.glyph < cfg.glyphs.len());
        }
    }

    #[test]
    fn respawned_pieces_land_in_spawn_band() {
        let confetti = Confetti::new(ConfettiConfig::default());
        let cfg = confetti.config().clone();
        let mut rng = fastrand::Rng::with_seed(9);
        let bounds = Bounds::new(400.0, 800.0);
        for i in 0..500 {
            let mut h = confetti.spawn(i, &mut rng, bounds);
            // alternate the exit reason
            match i % 4 {
                0 => h.y = 800.0 + 91.0,
                1 => h.x = -121.0,
                2 => h.x = 521.0,
                _ => h.life = 0.0,
            }
            assert!(confetti.recycle(&mut h, &mut rng, bounds));
            assert!(cfg.respawn_y().contains(h.y));
            assert!((0.0..=400.0).contains(&h.x));
            assert!(cfg.respawn_vy.contains(h.vy));
            assert!(cfg.life.contains(h.life));
            assert!(cfg.size.contains(h.size));
            assert!(cfg.spin.contains(h.spin));
            assert!((0.0..=TAU).contains(&h.angle));
        }
    }

    #[test]
    fn gravity_and_life_scale_with_frame() {
        let confetti = Confetti::new(ConfettiConfig::default());
        let mut h = Heart { x: 0.0, y: 0.0, size: 20.0, vx: 1.0, vy: 3.0, angle: 0.0, spin: 0.02, glyph: 0, life: 200.0 };
        confetti.advance(&mut h, Frame { scale: 2.0, phase: 0.0 });
        assert_eq!(h.x, 2.0);
        assert_eq!(h.y, 6.0);
        assert!((h.vy - 3.02).abs() < 1e-12);
        assert_eq!(h.life, 198.0);
        assert!((h.angle - 0.04).abs() < 1e-12);
    }

    #[test]
    fn pool_size_is_invariant() {
        let mut f = field(11);
        let mut recycled = 0;
        for _ in 0..2_000 {
            recycled += f.step(1.0);
            assert_eq!(f.len(), 240);
        }
        assert!(recycled >= 240);
    }

    #[test]
    fn render_clears_then_stamps_glyphs() {
        let f = field(5);
        let mut surface = CountingSurface::default();
        f.render(&mut surface).unwrap();
        assert_eq!(surface.clears, 1);
        assert_eq!(surface.glyphs.len(), 240);
        let cfg = ConfettiConfig::default();
        assert!(surface.glyphs.iter().all(|g| cfg.glyphs.contains(g)));
    }
}
