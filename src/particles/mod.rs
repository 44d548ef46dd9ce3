//! Fixed-size particle fields driven once per display refresh.
//!
//! A `ParticleField` owns a pool of particles whose behaviour comes from a `Species`:
//! how a particle is spawned, how it integrates one frame, when it leaves the visible
//! area and how it is drawn. Pools never grow or shrink: particles that wander off or
//! expire are recycled in place (wrapped or re-randomized).
//!
//! Motion is expressed per *nominal* frame (1/60 s). `FrameClock` converts the real
//! elapsed time between two animation-frame callbacks into a scale factor so the
//! animation speed does not depend on the display refresh rate.

pub mod clouds;
pub mod confetti;

use crate::CardResult;

// --- Geometry / Timing -------------------------------------------------------

/// Drawable area in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// FrameClock turns rAF timestamps into per-frame delta multipliers.
#[derive(Clone, Debug)]
pub struct FrameClock {
    nominal_ms: f64,
    max_elapsed_ms: f64,
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new(nominal_ms: f64, max_elapsed_ms: f64) -> Self {
        Self {
            nominal_ms,
            max_elapsed_ms,
            last_ms: None,
        }
    }

    /// `min(elapsed, max_elapsed) / nominal`. First frame counts as one nominal frame.
    pub fn scale(&mut self, now_ms: f64) -> f64 {
        let scale = match self.last_ms {
            None => 1.0,
            Some(last) => (now_ms - last).clamp(0.0, self.max_elapsed_ms) / self.nominal_ms,
        };
        self.last_ms = Some(now_ms);
        scale
    }

    pub fn max_scale(&self) -> f64 {
        self.max_elapsed_ms / self.nominal_ms
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(1000.0 / 60.0, 50.0)
    }
}

/// Per-frame inputs handed to `Species::advance`.
#[derive(Clone, Copy, Debug)]
pub struct Frame {
    /// Multiplier on every per-frame delta.
    pub scale: f64,
    /// Running phase used by oscillating motion.
    pub phase: f64,
}

// --- Drawing -----------------------------------------------------------------

/// Rotated text stamp (confetti glyphs).
#[derive(Clone, Copy, Debug)]
pub struct GlyphStamp<'a> {
    pub x: f64,
    pub y: f64,
    pub angle: f64,
    pub size: f64,
    pub text: &'a str,
    pub alpha: f64,
}

/// The handful of canvas operations the animators need. The browser implementation
/// lives in `web::canvas`; tests record calls instead.
pub trait Surface {
    fn fill_vertical_gradient(
        &mut self,
        bounds: Bounds,
        stops: &[(f32, &str)],
    ) -> CardResult<()>;
    fn clear(&mut self, bounds: Bounds);
    /// Circle of radius `radius` filled with a radial gradient starting at `inner`.
    fn radial_blob(
        &mut self,
        x: f64,
        y: f64,
        inner: f64,
        radius: f64,
        stops: &[(f32, &str)],
    ) -> CardResult<()>;
    fn stamp_glyph(&mut self, stamp: GlyphStamp<'_>) -> CardResult<()>;
}

// --- Species / Field ---------------------------------------------------------

pub trait Species {
    type Particle;

    fn pool_size(&self) -> usize;

    /// Build the particle at `index` when the pool is first filled.
    fn spawn(&self, index: usize, rng: &mut fastrand::Rng, bounds: Bounds) -> Self::Particle;

    /// Integrate one (scaled) frame.
    fn advance(&self, p: &mut Self::Particle, frame: Frame);

    /// Wrap or respawn a particle that left the visible area or expired.
    /// Returns true when the particle was touched.
    fn recycle(&self, p: &mut Self::Particle, rng: &mut fastrand::Rng, bounds: Bounds) -> bool;

    /// Phase advance per nominal frame.
    fn phase_rate(&self) -> f64 {
        0.0
    }

    fn paint_backdrop(&self, surface: &mut dyn Surface, bounds: Bounds) -> CardResult<()>;

    fn draw(&self, p: &Self::Particle, phase: f64, surface: &mut dyn Surface) -> CardResult<()>;
}

pub struct ParticleField<S: Species> {
    species: S,
    pool: Vec<S::Particle>,
    rng: fastrand::Rng,
    bounds: Bounds,
    phase: f64,
    clock: FrameClock,
}

impl<S: Species> ParticleField<S> {
    pub fn new(species: S, bounds: Bounds, seed: u64) -> Self {
        let mut rng = fastrand::Rng::with_seed(seed);
        let pool = (0..species.pool_size())
            .map(|i| species.spawn(i, &mut rng, bounds))
            .collect();
        Self {
            species,
            pool,
            rng,
            bounds,
            phase: 0.0,
            clock: FrameClock::default(),
        }
    }

    pub fn with_clock(mut self, clock: FrameClock) -> Self {
        self.clock = clock;
        self
    }

    /// Advance using a rAF timestamp.
    pub fn tick(&mut self, now_ms: f64) -> usize {
        let scale = self.clock.scale(now_ms);
        self.step(scale)
    }

    /// Advance by `scale` nominal frames. Returns how many particles were recycled.
    pub fn step(&mut self, scale: f64) -> usize {
        self.phase += self.species.phase_rate() * scale;
        let frame = Frame {
            scale,
            phase: self.phase,
        };
        let mut recycled = 0;
        for p in &mut self.pool {
            self.species.advance(p, frame);
            if self.species.recycle(p, &mut self.rng, self.bounds) {
                recycled += 1;
            }
        }
        recycled
    }

    pub fn render(&self, surface: &mut dyn Surface) -> CardResult<()> {
        self.species.paint_backdrop(surface, self.bounds)?;
        for p in &self.pool {
            self.species.draw(p, self.phase, surface)?;
        }
        Ok(())
    }

    /// New drawable size; existing particles keep their positions and get recycled
    /// naturally if they end up outside.
    pub fn resize(&mut self, bounds: Bounds) {
        self.bounds = bounds;
    }

    pub fn len(&self) -> usize {
        self.pool.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    pub fn particles(&self) -> &[S::Particle] {
        &self.pool
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn species(&self) -> &S {
        &self.species
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Surface that only counts calls.
    #[derive(Default)]
    pub(crate) struct CountingSurface {
        pub gradients: usize,
        pub clears: usize,
        pub blobs: usize,
        pub glyphs: Vec<String>,
    }

    impl Surface for CountingSurface {
        fn fill_vertical_gradient(&mut self, _: Bounds, stops: &[(f32, &str)]) -> CardResult<()> {
            assert!(!stops.is_empty());
            self.gradients += 1;
            Ok(())
        }
        fn clear(&mut self, _: Bounds) {
            self.clears += 1;
        }
        fn radial_blob(
            &mut self,
            _: f64,
            _: f64,
            inner: f64,
            radius: f64,
            _: &[(f32, &str)],
        ) -> CardResult<()> {
            assert!(inner < radius);
            self.blobs += 1;
            Ok(())
        }
        fn stamp_glyph(&mut self, stamp: GlyphStamp<'_>) -> CardResult<()> {
            self.glyphs.push(stamp.text.to_string());
            Ok(())
        }
    }

    // Minimal species: dots moving right, respawned at x = 0 past the right edge.
    struct Dots;

    impl Species for Dots {
        type Particle = (f64, f64);
        fn pool_size(&self) -> usize {
            5
        }
        fn spawn(&self, index: usize, _: &mut fastrand::Rng, _: Bounds) -> (f64, f64) {
            (index as f64 * 10.0, 1.0)
        }
        fn advance(&self, p: &mut (f64, f64), frame: Frame) {
            p.0 += p.1 * frame.scale;
        }
        fn recycle(&self, p: &mut (f64, f64), _: &mut fastrand::Rng, bounds: Bounds) -> bool {
            if p.0 > bounds.width {
                p.0 = 0.0;
                return true;
            }
            false
        }
        fn paint_backdrop(&self, surface: &mut dyn Surface, bounds: Bounds) -> CardResult<()> {
            surface.clear(bounds);
            Ok(())
        }
        fn draw(&self, _: &(f64, f64), _: f64, surface: &mut dyn Surface) -> CardResult<()> {
            surface.stamp_glyph(GlyphStamp {
                x: 0.0,
                y: 0.0,
                angle: 0.0,
                size: 1.0,
                text: ".",
                alpha: 1.0,
            })
        }
    }

    #[test]
    fn frame_clock_scales_and_clamps() {
        let mut clock = FrameClock::new(10.0, 50.0);
        assert_eq!(clock.scale(1000.0), 1.0);
        assert!((clock.scale(1020.0) - 2.0).abs() < 1e-9);
        // tab was hidden for a second
        assert!((clock.scale(2020.0) - 5.0).abs() < 1e-9);
        assert_eq!(clock.scale(2000.0), 0.0);
        assert_eq!(clock.max_scale(), 5.0);
    }

    #[test]
    fn field_recycles_without_changing_pool_size() {
        let mut field = ParticleField::new(Dots, Bounds::new(35.0, 10.0), 1);
        assert_eq!(field.len(), 5);
        let mut total = 0;
        for _ in 0..100 {
            total += field.step(1.0);
            assert_eq!(field.len(), 5);
        }
        assert!(total > 0);
        assert!(field.particles().iter().all(|p| p.0 <= 35.0));
    }

    #[test]
    fn render_paints_backdrop_then_every_particle() {
        let field = ParticleField::new(Dots, Bounds::new(100.0, 100.0), 1);
        let mut surface = CountingSurface::default();
        field.render(&mut surface).unwrap();
        assert_eq!(surface.clears, 1);
        assert_eq!(surface.glyphs.len(), 5);
    }

    #[test]
    fn resize_keeps_particles_and_moves_the_wrap_edge() {
        let mut field = ParticleField::new(Dots, Bounds::new(100.0, 10.0), 1);
        let before = field.particles().to_vec();
        field.resize(Bounds::new(15.0, 10.0));
        assert_eq!(field.bounds(), Bounds::new(15.0, 10.0));
        assert_eq!(field.particles(), &before[..]);
        assert_eq!(field.species().pool_size(), field.len());
        // dots at 20, 30 and 40 are now past the edge
        assert_eq!(field.step(1.0), 3);
    }
}
