//! The glyph model handed to the compiler.

use kurbo::{ParamCurve, PathEl, PathSeg, Point, Rect};

use crate::round::OtRound;

/// A closed outline: a sequence of connected segments whose last end point
/// is the first start point.
///
/// Closure is implicit; there is no separate close segment.
pub type Contour = Vec<PathSeg>;

/// The name reserved for glyph 0.
pub const NOTDEF: &str = ".notdef";

/// One glyph of the font being compiled.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Character {
    /// The Unicode scalar value this glyph is mapped from, if any.
    pub unicode: Option<u32>,
    /// The glyph name. Names must be unique within a font.
    pub name: String,
    /// The outline, in font design units.
    pub contours: Vec<Contour>,
    /// The horizontal advance, in font design units.
    pub advance_width: f64,
}

impl Character {
    /// Create a glyph without an outline.
    pub fn new(name: impl Into<String>, unicode: Option<u32>, advance_width: f64) -> Self {
        Character {
            unicode,
            name: name.into(),
            contours: Vec::new(),
            advance_width,
        }
    }

    /// Builder-style method to add a contour.
    pub fn with_contour(mut self, contour: Contour) -> Self {
        self.contours.push(contour);
        self
    }

    /// Build a glyph from a kurbo path, one contour per `MoveTo`.
    ///
    /// Open subpaths are closed with a straight line.
    pub fn from_path(
        name: impl Into<String>,
        unicode: Option<u32>,
        advance_width: f64,
        path: &kurbo::BezPath,
    ) -> Self {
        let mut contours = Vec::new();
        let mut current: Contour = Vec::new();
        let mut start = Point::ZERO;
        let mut last = Point::ZERO;
        for el in path.elements() {
            match *el {
                PathEl::MoveTo(pt) => {
                    finish_contour(&mut contours, &mut current, start);
                    start = pt;
                    last = pt;
                }
                PathEl::LineTo(p1) => {
                    current.push(PathSeg::Line(kurbo::Line::new(last, p1)));
                    last = p1;
                }
                PathEl::QuadTo(p1, p2) => {
                    current.push(PathSeg::Quad(kurbo::QuadBez::new(last, p1, p2)));
                    last = p2;
                }
                PathEl::CurveTo(p1, p2, p3) => {
                    current.push(PathSeg::Cubic(kurbo::CubicBez::new(last, p1, p2, p3)));
                    last = p3;
                }
                PathEl::ClosePath => {
                    finish_contour(&mut contours, &mut current, start);
                    last = start;
                }
            }
        }
        finish_contour(&mut contours, &mut current, start);
        Character {
            unicode,
            name: name.into(),
            contours,
            advance_width,
        }
    }

    /// `true` if this is the `.notdef` glyph.
    pub fn is_notdef(&self) -> bool {
        self.name == NOTDEF
    }

    /// `true` if at least one contour has a segment.
    pub fn has_outline(&self) -> bool {
        self.contours.iter().any(|contour| !contour.is_empty())
    }

    /// The box containing every on- and off-curve point of the outline.
    ///
    /// Returns `None` for glyphs without an outline.
    pub fn control_box(&self) -> Option<Rect> {
        self.contours
            .iter()
            .flatten()
            .flat_map(segment_points)
            .map(|pt| Rect::from_points(pt, pt))
            .reduce(|acc, rect| acc.union(rect))
    }

    /// The outline as a single kurbo path.
    pub fn to_path(&self) -> kurbo::BezPath {
        let mut path = kurbo::BezPath::new();
        for contour in self.contours.iter().filter(|c| !c.is_empty()) {
            path.move_to(contour[0].start());
            for seg in contour {
                match seg {
                    PathSeg::Line(line) => path.line_to(line.p1),
                    PathSeg::Quad(quad) => path.quad_to(quad.p1, quad.p2),
                    PathSeg::Cubic(cubic) => path.curve_to(cubic.p1, cubic.p2, cubic.p3),
                }
            }
            path.close_path();
        }
        path
    }

    /// The name as stored in the CFF charset.
    ///
    /// PostScript glyph names are ASCII; other names are replaced with the
    /// lowercase hex code of their first character (`世` becomes `4e16`).
    /// Within a font, colliding replacements are made unique by
    /// [`GlyphSet`](crate::GlyphSet).
    pub fn postscript_name(&self) -> String {
        postscript_name(&self.name)
    }

    /// The index of the first contour that is not closed: one where a
    /// segment does not start where the previous one ended, or whose last
    /// segment does not end at its first point.
    ///
    /// Points are compared after rounding to the integer grid used by
    /// the compiled outline.
    pub(crate) fn first_open_contour(&self) -> Option<usize> {
        let same = |a: Point, b: Point| a.ot_round() == b.ot_round();
        self.contours.iter().position(|contour| {
            let (Some(first), Some(last)) = (contour.first(), contour.last()) else {
                return false;
            };
            let connected = contour
                .windows(2)
                .all(|pair| same(pair[0].end(), pair[1].start()));
            !(connected && same(last.end(), first.start()))
        })
    }
}

pub(crate) fn postscript_name(name: &str) -> String {
    if name.is_ascii() {
        return name.to_owned();
    }
    match name.chars().next() {
        Some(c) => format!("{:04x}", c as u32),
        None => String::new(),
    }
}

/// `true` if `stored` is `base` or `base` with a numeric `.N` suffix.
pub(crate) fn is_postscript_replacement(stored: &str, base: &str) -> bool {
    match stored.strip_prefix(base) {
        Some("") => true,
        Some(rest) => rest
            .strip_prefix('.')
            .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit())),
        None => false,
    }
}

fn finish_contour(contours: &mut Vec<Contour>, current: &mut Contour, start: Point) {
    let Some(end) = current.last().map(PathSeg::end) else {
        return;
    };
    if end != start {
        current.push(PathSeg::Line(kurbo::Line::new(end, start)));
    }
    contours.push(std::mem::take(current));
}

/// Every point of a segment, on- and off-curve.
pub(crate) fn segment_points(seg: &PathSeg) -> impl Iterator<Item = Point> {
    let points: [Option<Point>; 4] = match *seg {
        PathSeg::Line(l) => [Some(l.p0), Some(l.p1), None, None],
        PathSeg::Quad(q) => [Some(q.p0), Some(q.p1), Some(q.p2), None],
        PathSeg::Cubic(c) => [Some(c.p0), Some(c.p1), Some(c.p2), Some(c.p3)],
    };
    points.into_iter().flatten()
}
