use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Categorical palette
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            to_color32(rgb)
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    let rgb: Srgb<u8> = rgb.into_format();
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}

// ---------------------------------------------------------------------------
// Continuous scale: amount → Color32
// ---------------------------------------------------------------------------

/// Viridis control points, dark purple to yellow.
const VIRIDIS: [(u8, u8, u8); 9] = [
    (68, 1, 84),
    (71, 44, 122),
    (59, 81, 139),
    (44, 113, 142),
    (33, 144, 141),
    (39, 173, 129),
    (92, 200, 99),
    (170, 220, 50),
    (253, 231, 37),
];

/// Maps a value in `[min, max]` onto the Viridis scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScale {
    min: f64,
    max: f64,
}

impl ColorScale {
    pub fn new(min: f64, max: f64) -> Self {
        ColorScale { min, max }
    }

    /// Scale spanning every value in `values`.
    pub fn spanning(values: impl IntoIterator<Item = f64>) -> Self {
        let (min, max) = values
            .into_iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        if min > max {
            ColorScale::new(0.0, 0.0)
        } else {
            ColorScale::new(min, max)
        }
    }

    /// Position of `value` on the scale, clamped to `[0, 1]`.
    pub fn position(&self, value: f64) -> f32 {
        let range = self.max - self.min;
        if range.abs() < f64::EPSILON {
            return 0.5;
        }
        ((value - self.min) / range).clamp(0.0, 1.0) as f32
    }

    pub fn color_for(&self, value: f64) -> Color32 {
        let t = self.position(value) * (VIRIDIS.len() - 1) as f32;
        let idx = (t.floor() as usize).min(VIRIDIS.len() - 2);
        let frac = t - idx as f32;

        let stop = |(r, g, b): (u8, u8, u8)| -> LinSrgb {
            Srgb::new(r, g, b).into_format::<f32>().into_linear()
        };
        let mixed = stop(VIRIDIS[idx]).mix(stop(VIRIDIS[idx + 1]), frac);
        to_color32(Srgb::from_linear(mixed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_length() {
        assert!(generate_palette(0).is_empty());
        let colors = generate_palette(5);
        assert_eq!(colors.len(), 5);
        assert_ne!(colors[0], colors[1]);
    }

    #[test]
    fn scale_endpoints_hit_viridis_ends() {
        let scale = ColorScale::spanning([100.0, 300.0, 200.0]);
        assert_eq!(scale.color_for(100.0), Color32::from_rgb(68, 1, 84));
        assert_eq!(scale.color_for(300.0), Color32::from_rgb(253, 231, 37));
        // Out-of-range values clamp.
        assert_eq!(scale.color_for(1e9), scale.color_for(300.0));
    }

    #[test]
    fn degenerate_scale_uses_midpoint() {
        let scale = ColorScale::spanning([42.0]);
        assert_eq!(scale.position(42.0), 0.5);
        assert_eq!(ColorScale::spanning(Vec::new()).position(1.0), 0.5);
    }
}
