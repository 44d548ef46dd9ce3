//! Card configuration. Every value defaults to the constants the page shipped with;
//! with the `serde` feature the whole tree can be (de)serialized, and with
//! `serde_json` a page may pass a JSON override to `start_card_with_config`.

use crate::particles::clouds::CloudConfig;
use crate::particles::confetti::ConfettiConfig;
use crate::timeline::script::TimelineScript;

/// Half-open random range `[min, max)`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    pub min: f64,
    pub max: f64,
}

impl Span {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn sample(&self, rng: &mut fastrand::Rng) -> f64 {
        self.min + rng.f64() * (self.max - self.min)
    }

    /// Inclusive on both ends so a sample of exactly `max` (float rounding) still counts.
    pub fn contains(&self, v: f64) -> bool {
        v >= self.min && v <= self.max
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }
}

/// Canvas sizing and frame pacing shared by both animators.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SurfaceConfig {
    /// Upper bound on devicePixelRatio used for the backing store.
    pub max_pixel_ratio: f64,
    pub nominal_frame_ms: f64,
    /// Longer gaps (tab in background) are clamped to this before scaling.
    pub max_frame_ms: f64,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            max_pixel_ratio: 2.0,
            nominal_frame_ms: 1000.0 / 60.0,
            max_frame_ms: 50.0,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CardConfig {
    pub clouds: CloudConfig,
    pub confetti: ConfettiConfig,
    pub surface: SurfaceConfig,
    pub script: TimelineScript,
}

impl CardConfig {
    pub fn validate(&self) -> crate::CardResult<()> {
        use crate::CardError;
        if self.surface.nominal_frame_ms <= 0.0 || self.surface.max_frame_ms <= 0.0 {
            return Err(CardError::Config("frame intervals must be positive".into()));
        }
        if self.surface.max_pixel_ratio < 1.0 {
            return Err(CardError::Config("max_pixel_ratio must be >= 1".into()));
        }
        if self.clouds.layer_speeds.is_empty() {
            return Err(CardError::Config("clouds need at least one layer speed".into()));
        }
        if self.confetti.glyphs.is_empty() {
            return Err(CardError::Config("confetti needs at least one glyph".into()));
        }
        self.script.validate()
    }

    #[cfg(feature = "serde_json")]
    pub fn from_json(json: &str) -> crate::CardResult<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_samples_stay_in_range() {
        let span = Span::new(140.0, 400.0);
        let mut rng = fastrand::Rng::with_seed(7);
        for _ in 0..1000 {
            assert!(span.contains(span.sample(&mut rng)));
        }
        assert_eq!(span.width(), 260.0);
    }

    #[test]
    fn default_config_is_valid() {
        CardConfig::default().validate().unwrap();
    }

    #[test]
    fn rejects_sub_unit_pixel_ratio() {
        let mut cfg = CardConfig::default();
        cfg.surface.max_pixel_ratio = 0.5;
        assert!(cfg.validate().is_err());
    }

    #[cfg(feature = "serde_json")]
    #[test]
    fn partial_json_falls_back_to_defaults() {
        let cfg = CardConfig::from_json(r#"{ "confetti": { "count": 12 } }"#).unwrap();
        assert_eq!(cfg.confetti.count, 12);
        assert_eq!(cfg.clouds.count, CloudConfig::default().count);
    }
}
