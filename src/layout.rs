//! Geometry helpers: the "just touching" offsets for the two together-scene images and
//! canvas backing-store sizing.

/// Axis-aligned box in CSS pixels (what `getBoundingClientRect` reports).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }
}

/// Stage plus the two images, measured with no offset applied.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TouchGeometry {
    pub stage: Rect,
    pub left: Rect,
    pub right: Rect,
}

/// Horizontal translation for each image.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TouchOffsets {
    pub left_x: f64,
    pub right_x: f64,
}

impl TouchOffsets {
    pub const ZERO: TouchOffsets = TouchOffsets { left_x: 0.0, right_x: 0.0 };
}

pub const MIN_GAP: f64 = 34.0;
pub const MAX_GAP: f64 = 54.0;
pub const GAP_FRACTION: f64 = 0.05;

/// Gap left between the images for the heart: 5% of the stage, clamped to 34–54px.
pub fn target_gap(stage_width: f64) -> f64 {
    (stage_width * GAP_FRACTION).clamp(MIN_GAP, MAX_GAP)
}

/// Move both images toward each other by the same amount until their facing edges
/// are `target_gap` apart. Images already closer than that stay put.
pub fn touch_offsets(geo: &TouchGeometry) -> TouchOffsets {
    let current_gap = geo.right.left - geo.left.right();
    let shrink_by = current_gap - target_gap(geo.stage.width);
    let move_each = (shrink_by / 2.0).max(0.0);
    TouchOffsets {
        left_x: move_each,
        right_x: -move_each,
    }
}

/// Canvas pixel dimensions and the transform scale to draw in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackingStore {
    pub width: u32,
    pub height: u32,
    pub scale: f64,
}

pub fn backing_store(
    css_width: f64,
    css_height: f64,
    device_ratio: f64,
    max_ratio: f64,
) -> BackingStore {
    let ratio = if device_ratio.is_finite() && device_ratio > 0.0 {
        device_ratio
    } else {
        1.0
    };
    let scale = ratio.min(max_ratio);
    BackingStore {
        width: (css_width.max(0.0) * scale).floor() as u32,
        height: (css_height.max(0.0) * scale).floor() as u32,
        scale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geo(stage_w: f64, left_right_edge: f64, right_left_edge: f64) -> TouchGeometry {
        TouchGeometry {
            stage: Rect::new(0.0, 0.0, stage_w, 600.0),
            left: Rect::new(left_right_edge - 200.0, 200.0, 200.0, 200.0),
            right: Rect::new(right_left_edge, 200.0, 200.0, 200.0),
        }
    }

    #[test]
    fn target_gap_is_clamped() {
        assert_eq!(target_gap(300.0), 34.0);
        assert_eq!(target_gap(900.0), 45.0);
        assert_eq!(target_gap(2000.0), 54.0);
    }

    #[test]
    fn moves_each_image_half_the_excess() {
        // gap 500, target 45 -> each moves 227.5
        let off = touch_offsets(&geo(900.0, 200.0, 700.0));
        assert_eq!(off, TouchOffsets { left_x: 227.5, right_x: -227.5 });
    }

    #[test]
    fn already_close_images_do_not_move() {
        let off = touch_offsets(&geo(900.0, 400.0, 420.0));
        assert_eq!(off.left_x, 0.0);
        assert_eq!(off.right_x, 0.0);
    }

    #[test]
    fn repeated_calls_agree() {
        let g = geo(1234.0, 300.0, 900.0);
        assert_eq!(touch_offsets(&g), touch_offsets(&g));
    }

    #[test]
    fn backing_store_caps_ratio() {
        let b = backing_store(400.5, 300.0, 3.0, 2.0);
        assert_eq!((b.width, b.height, b.scale), (801, 600, 2.0));
        let b = backing_store(400.0, 300.0, 0.0, 2.0);
        assert_eq!(b.scale, 1.0);
    }
}
