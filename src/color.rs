use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Categorical palette – one color per country series
// ---------------------------------------------------------------------------

/// Generate `n` visually distinct colors by stepping the hue wheel with the
/// golden angle, so neighbouring series stay distinguishable at any count.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    (0..n)
        .map(|i| {
            let hue = (i as f32 * 137.508) % 360.0;
            let hsl = Hsl::new(hue, 0.65, 0.5);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Diverging scale – choropleth fill
// ---------------------------------------------------------------------------

/// Blue → white → orange scale over a metric range, with a neutral gray for
/// countries that have no joined value (or an exact zero, which the source
/// uses for "no data").
#[derive(Debug, Clone)]
pub struct DivergingScale {
    min: f64,
    max: f64,
}

const SCALE_LOW: (f32, f32, f32) = (0.13, 0.35, 0.66); // blue
const SCALE_MID: (f32, f32, f32) = (0.96, 0.96, 0.94); // near-white
const SCALE_HIGH: (f32, f32, f32) = (0.85, 0.45, 0.10); // orange

impl DivergingScale {
    /// Scale over the min/max of the supplied values, ignoring non-finite
    /// entries. `None` when no finite value exists.
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for v in values {
            if v.is_finite() {
                min = min.min(v);
                max = max.max(v);
            }
        }
        if min > max {
            return None;
        }
        Some(DivergingScale { min, max })
    }

    /// Fill color for one value, clamped into the scale's range.
    pub fn color_for(&self, value: f64) -> Color32 {
        let span = self.max - self.min;
        let t = if span <= 0.0 {
            0.5
        } else {
            ((value - self.min) / span).clamp(0.0, 1.0)
        };

        let (from, to, local) = if t < 0.5 {
            (SCALE_LOW, SCALE_MID, t as f32 * 2.0)
        } else {
            (SCALE_MID, SCALE_HIGH, (t as f32 - 0.5) * 2.0)
        };

        let a: LinSrgb = Srgb::new(from.0, from.1, from.2).into_linear();
        let b: LinSrgb = Srgb::new(to.0, to.1, to.2).into_linear();
        let mixed: Srgb = Srgb::from_linear(a.mix(b, local));
        Color32::from_rgb(
            (mixed.red * 255.0) as u8,
            (mixed.green * 255.0) as u8,
            (mixed.blue * 255.0) as u8,
        )
    }

    /// Fill for countries with no data to join.
    pub fn no_data() -> Color32 {
        Color32::from_gray(190)
    }
}
