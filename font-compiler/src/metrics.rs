//! Horizontal metrics and bounds derived from glyph outlines

use font_types::BoundingBox;

use crate::{glyph::Character, round::OtRound};

/// Metrics of a single glyph, in rounded font units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GlyphMetrics {
    pub advance: u16,
    /// The rounded control box, `None` for glyphs without an outline.
    pub bounds: Option<BoundingBox<i16>>,
}

impl GlyphMetrics {
    pub fn new(glyph: &Character) -> Self {
        let bounds = glyph.control_box().map(|rect| BoundingBox {
            x_min: rect.x0.ot_round(),
            y_min: rect.y0.ot_round(),
            x_max: rect.x1.ot_round(),
            y_max: rect.y1.ot_round(),
        });
        GlyphMetrics {
            advance: glyph.advance_width.ot_round(),
            bounds,
        }
    }

    /// The left side bearing: the minimum x of the outline, or 0.
    pub fn left_side_bearing(&self) -> i16 {
        self.bounds.map(|b| b.x_min).unwrap_or_default()
    }

    /// The distance from the right of the outline to the advance.
    pub fn right_side_bearing(&self) -> Option<i16> {
        self.bounds
            .map(|b| (self.advance as i32 - b.x_max as i32).clamp(i16::MIN as _, i16::MAX as _) as i16)
    }
}

/// Font-wide metrics aggregated over the glyph set.
///
/// Bearings and extents only consider glyphs that have an outline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FontMetrics {
    /// The union of every glyph's bounds; all zero if no glyph has an outline.
    pub bounds: BoundingBox<i16>,
    pub advance_width_max: u16,
    /// The rounded mean advance of all glyphs with a non-zero advance.
    pub avg_char_width: i16,
    pub min_left_side_bearing: i16,
    pub min_right_side_bearing: i16,
    /// `max(lsb + (x_max - x_min))`, which is the largest `x_max`.
    pub x_max_extent: i16,
}

impl FontMetrics {
    pub fn new(glyphs: &[GlyphMetrics]) -> Self {
        let bounds = glyphs
            .iter()
            .filter_map(|glyph| glyph.bounds)
            .reduce(BoundingBox::union)
            .unwrap_or_default();

        let advance_width_max = glyphs.iter().map(|g| g.advance).max().unwrap_or_default();
        let non_zero: Vec<_> = glyphs
            .iter()
            .map(|g| g.advance as f64)
            .filter(|adv| *adv > 0.0)
            .collect();
        let avg_char_width = match non_zero.len() {
            0 => 0,
            n => (non_zero.iter().sum::<f64>() / n as f64).ot_round(),
        };

        let outlined = || glyphs.iter().filter(|g| g.bounds.is_some());
        let min_left_side_bearing = outlined()
            .map(GlyphMetrics::left_side_bearing)
            .min()
            .unwrap_or_default();
        let min_right_side_bearing = outlined()
            .filter_map(GlyphMetrics::right_side_bearing)
            .min()
            .unwrap_or_default();
        let x_max_extent = outlined()
            .filter_map(|g| g.bounds)
            .map(|b| b.x_max)
            .max()
            .unwrap_or_default();

        FontMetrics {
            bounds,
            advance_width_max,
            avg_char_width,
            min_left_side_bearing,
            min_right_side_bearing,
            x_max_extent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{Line, PathSeg};

    fn boxed(name: &str, advance: f64, x0: f64, y0: f64, x1: f64, y1: f64) -> Character {
        Character::new(name, None, advance).with_contour(vec![
            PathSeg::Line(Line::new((x0, y0), (x1, y0))),
            PathSeg::Line(Line::new((x1, y0), (x1, y1))),
            PathSeg::Line(Line::new((x1, y1), (x0, y0))),
        ])
    }

    #[test]
    fn glyph_metrics() {
        let glyph = boxed("a", 500.4, 20.5, -10.2, 480.0, 700.0);
        let metrics = GlyphMetrics::new(&glyph);
        assert_eq!(metrics.advance, 500);
        assert_eq!(metrics.left_side_bearing(), 21);
        assert_eq!(metrics.right_side_bearing(), Some(20));
        assert_eq!(
            metrics.bounds,
            Some(BoundingBox {
                x_min: 21,
                y_min: -10,
                x_max: 480,
                y_max: 700
            })
        );
    }

    #[test]
    fn font_metrics() {
        let glyphs = [
            Character::new(".notdef", Some(0), 500.0),
            boxed("a", 600.0, 50.0, 0.0, 550.0, 500.0),
            boxed("b", 400.0, -20.0, -100.0, 390.0, 700.0),
            Character::new("zero", None, 0.0),
        ];
        let metrics: Vec<_> = glyphs.iter().map(GlyphMetrics::new).collect();
        let font = FontMetrics::new(&metrics);
        assert_eq!(
            font,
            FontMetrics {
                bounds: BoundingBox {
                    x_min: -20,
                    y_min: -100,
                    x_max: 550,
                    y_max: 700,
                },
                advance_width_max: 600,
                avg_char_width: 500,
                min_left_side_bearing: -20,
                min_right_side_bearing: 10,
                x_max_extent: 550,
            }
        );
    }

    #[test]
    fn no_outlines() {
        let metrics = [GlyphMetrics::new(&Character::new(".notdef", None, 500.0))];
        let font = FontMetrics::new(&metrics);
        assert_eq!(font.bounds, BoundingBox::default());
        assert_eq!(font.x_max_extent, 0);
        assert_eq!(font.advance_width_max, 500);
    }
}
