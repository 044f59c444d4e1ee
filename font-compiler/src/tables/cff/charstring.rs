//! Type 2 charstrings.
//!
//! See <https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf>

use kurbo::{ParamCurve, PathSeg, Point, Vec2};

use crate::{
    error::{Error, LayoutOverflow},
    font_data::{Cursor, FontData},
    glyph::Character,
    read::ReadError,
    round::OtRound,
};

/// Maximum number of operands on the argument stack.
const STACK_LIMIT: usize = 48;

const ESCAPE: u8 = 12;

mod op {
    pub(super) const HSTEM: u8 = 1;
    pub(super) const VSTEM: u8 = 3;
    pub(super) const VMOVETO: u8 = 4;
    pub(super) const RLINETO: u8 = 5;
    pub(super) const HLINETO: u8 = 6;
    pub(super) const VLINETO: u8 = 7;
    pub(super) const RRCURVETO: u8 = 8;
    pub(super) const CALLSUBR: u8 = 10;
    pub(super) const RETURN: u8 = 11;
    pub(super) const ENDCHAR: u8 = 14;
    pub(super) const HSTEMHM: u8 = 18;
    pub(super) const HINTMASK: u8 = 19;
    pub(super) const CNTRMASK: u8 = 20;
    pub(super) const RMOVETO: u8 = 21;
    pub(super) const HMOVETO: u8 = 22;
    pub(super) const VSTEMHM: u8 = 23;
    pub(super) const RCURVELINE: u8 = 24;
    pub(super) const RLINECURVE: u8 = 25;
    pub(super) const VVCURVETO: u8 = 26;
    pub(super) const HHCURVETO: u8 = 27;
    pub(super) const CALLGSUBR: u8 = 29;
    pub(super) const VHCURVETO: u8 = 30;
    pub(super) const HVCURVETO: u8 = 31;
    // escaped
    pub(super) const HFLEX: u8 = 34;
    pub(super) const FLEX: u8 = 35;
    pub(super) const HFLEX1: u8 = 36;
    pub(super) const FLEX1: u8 = 37;
}

/// Compile a glyph outline.
///
/// The advance is always written, relative to `nominal_width_x`. Each
/// contour starts with `rmoveto`; lines become `rlineto` and curves
/// `rrcurveto`, with quadratic curves raised to cubic. Closure is implicit.
///
/// Operands are integers: each delta is rounded on its own and the pen
/// then moves to the rounded end point of the segment.
pub fn compile(glyph: &Character, nominal_width_x: f64) -> Result<Vec<u8>, Error> {
    let mut writer = CharstringWriter::default();
    writer.number(glyph.advance_width - nominal_width_x)?;
    let mut pen = Point::ZERO;
    for contour in glyph.contours.iter().filter(|c| !c.is_empty()) {
        let start = contour[0].start();
        writer.delta(start - pen)?;
        writer.operator(op::RMOVETO);
        pen = start.ot_round();
        for seg in contour {
            match *seg {
                PathSeg::Line(line) => {
                    writer.delta(line.p1 - pen)?;
                    writer.operator(op::RLINETO);
                    pen = line.p1.ot_round();
                }
                PathSeg::Quad(quad) => pen = writer.curve(quad.raise(), pen)?,
                PathSeg::Cubic(cubic) => pen = writer.curve(cubic, pen)?,
            }
        }
    }
    writer.operator(op::ENDCHAR);
    Ok(writer.data)
}

#[derive(Default)]
struct CharstringWriter {
    data: Vec<u8>,
}

impl CharstringWriter {
    fn curve(&mut self, curve: kurbo::CubicBez, pen: Point) -> Result<Point, Error> {
        self.delta(curve.p1 - pen)?;
        self.delta(curve.p2 - curve.p1)?;
        self.delta(curve.p3 - curve.p2)?;
        self.operator(op::RRCURVETO);
        Ok(curve.p3.ot_round())
    }

    fn delta(&mut self, delta: Vec2) -> Result<(), Error> {
        self.number(delta.x)?;
        self.number(delta.y)
    }

    /// Round and write an operand.
    fn number(&mut self, value: f64) -> Result<(), Error> {
        let value: i32 = value.ot_round();
        match value {
            -107..=107 => self.data.push((value + 139) as u8),
            108..=1131 => {
                let v = value - 108;
                self.data.extend([(v >> 8) as u8 + 247, v as u8]);
            }
            -1131..=-108 => {
                let v = -value - 108;
                self.data.extend([(v >> 8) as u8 + 251, v as u8]);
            }
            _ => {
                LayoutOverflow::check(
                    "charstring operand",
                    value.unsigned_abs() as usize,
                    i16::MAX as u64,
                )?;
                self.data.push(28);
                self.data.extend((value as i16).to_be_bytes());
            }
        }
        Ok(())
    }

    fn operator(&mut self, op: u8) {
        self.data.push(op);
    }
}

/// Receives the path commands of an evaluated charstring.
///
/// Coordinates are absolute.
pub trait CommandSink {
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn curve_to(&mut self, cx0: f64, cy0: f64, cx1: f64, cy1: f64, x: f64, y: f64);
    fn close(&mut self);
}

impl CommandSink for kurbo::BezPath {
    fn move_to(&mut self, x: f64, y: f64) {
        kurbo::BezPath::move_to(self, (x, y));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        kurbo::BezPath::line_to(self, (x, y));
    }

    fn curve_to(&mut self, cx0: f64, cy0: f64, cx1: f64, cy1: f64, x: f64, y: f64) {
        kurbo::BezPath::curve_to(self, (cx0, cy0), (cx1, cy1), (x, y));
    }

    fn close(&mut self) {
        self.close_path();
    }
}

/// Evaluate a charstring, sending its outline to `sink`.
///
/// Returns the width operand if the charstring has one. Hints are skipped.
/// Subroutine calls are rejected, since compiled fonts never contain
/// subroutines.
pub fn evaluate(charstring: &[u8], sink: &mut impl CommandSink) -> Result<Option<f64>, ReadError> {
    let mut evaluator = Evaluator {
        sink,
        stack: Vec::with_capacity(STACK_LIMIT),
        width: None,
        have_read_width: false,
        is_open: false,
        stem_count: 0,
        x: 0.0,
        y: 0.0,
    };
    let mut cursor = FontData::new(charstring).cursor();
    while cursor.remaining() != 0 {
        let b0: u8 = cursor.read()?;
        match b0 {
            28 | 32..=254 => {
                let value = super::dict::parse_int(&mut cursor, b0)?;
                evaluator.push(value as f64)?;
            }
            // 16.16 fixed point
            255 => {
                let bits: i32 = cursor.read()?;
                evaluator.push(bits as f64 / 65536.0)?;
            }
            ESCAPE => {
                let b1: u8 = cursor.read()?;
                evaluator.escaped_operator(b1)?;
            }
            op::ENDCHAR => {
                evaluator.take_width(!evaluator.stack.is_empty());
                if evaluator.is_open {
                    evaluator.sink.close();
                }
                return Ok(evaluator.width);
            }
            _ => evaluator.operator(b0, &mut cursor)?,
        }
    }
    Err(ReadError::MalformedData("charstring has no endchar"))
}

struct Evaluator<'a, S> {
    sink: &'a mut S,
    stack: Vec<f64>,
    width: Option<f64>,
    have_read_width: bool,
    is_open: bool,
    stem_count: usize,
    x: f64,
    y: f64,
}

impl<S: CommandSink> Evaluator<'_, S> {
    fn push(&mut self, value: f64) -> Result<(), ReadError> {
        if self.stack.len() == STACK_LIMIT {
            return Err(ReadError::MalformedData("charstring stack overflow"));
        }
        self.stack.push(value);
        Ok(())
    }

    fn arg(&self, index: usize) -> Result<f64, ReadError> {
        self.stack
            .get(index)
            .copied()
            .ok_or(ReadError::MalformedData("charstring stack underflow"))
    }

    fn args<const N: usize>(&self, start: usize) -> Result<[f64; N], ReadError> {
        self.stack
            .get(start..start + N)
            .and_then(|slice| slice.try_into().ok())
            .ok_or(ReadError::MalformedData("charstring stack underflow"))
    }

    /// The first operator of a charstring may carry the width as an
    /// extra leading operand.
    fn take_width(&mut self, has_width: bool) -> usize {
        if self.have_read_width {
            return 0;
        }
        self.have_read_width = true;
        if has_width {
            self.width = self.stack.first().copied();
            1
        } else {
            0
        }
    }

    fn start_contour(&mut self) {
        if self.is_open {
            self.sink.close();
        }
        self.is_open = true;
        self.sink.move_to(self.x, self.y);
    }

    fn line(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
        self.sink.line_to(self.x, self.y);
    }

    fn curve(&mut self, d: [f64; 6]) {
        let x1 = self.x + d[0];
        let y1 = self.y + d[1];
        let x2 = x1 + d[2];
        let y2 = y1 + d[3];
        self.x = x2 + d[4];
        self.y = y2 + d[5];
        self.sink.curve_to(x1, y1, x2, y2, self.x, self.y);
    }

    fn operator(&mut self, operator: u8, cursor: &mut Cursor) -> Result<(), ReadError> {
        match operator {
            op::HSTEM | op::VSTEM | op::HSTEMHM | op::VSTEMHM => {
                let skip = self.take_width(self.stack.len() % 2 != 0);
                self.stem_count += (self.stack.len() - skip) / 2;
            }
            op::HINTMASK | op::CNTRMASK => {
                // operands are an implied vstemhm
                let skip = self.take_width(self.stack.len() % 2 != 0);
                self.stem_count += (self.stack.len() - skip) / 2;
                cursor.advance_by(self.stem_count.div_ceil(8));
            }
            op::RMOVETO => {
                let skip = self.take_width(self.stack.len() > 2);
                let [dx, dy] = self.args(skip)?;
                self.x += dx;
                self.y += dy;
                self.start_contour();
            }
            op::HMOVETO | op::VMOVETO => {
                let skip = self.take_width(self.stack.len() > 1);
                let delta = self.arg(skip)?;
                if operator == op::HMOVETO {
                    self.x += delta;
                } else {
                    self.y += delta;
                }
                self.start_contour();
            }
            op::RLINETO => {
                for i in (0..self.stack.len()).step_by(2) {
                    let [dx, dy] = self.args(i)?;
                    self.line(dx, dy);
                }
            }
            op::HLINETO | op::VLINETO => {
                let mut horizontal = operator == op::HLINETO;
                for i in 0..self.stack.len() {
                    let delta = self.arg(i)?;
                    if horizontal {
                        self.line(delta, 0.0);
                    } else {
                        self.line(0.0, delta);
                    }
                    horizontal = !horizontal;
                }
            }
            op::RRCURVETO | op::RCURVELINE => {
                let count = self.stack.len();
                let mut i = 0;
                while i + 6 <= count {
                    self.curve(self.args(i)?);
                    i += 6;
                }
                if operator == op::RCURVELINE {
                    let [dx, dy] = self.args(i)?;
                    self.line(dx, dy);
                }
            }
            op::RLINECURVE => {
                let count = self.stack.len();
                let curve_start = count
                    .checked_sub(6)
                    .ok_or(ReadError::MalformedData("charstring stack underflow"))?;
                for i in (0..curve_start).step_by(2) {
                    let [dx, dy] = self.args(i)?;
                    self.line(dx, dy);
                }
                self.curve(self.args(curve_start)?);
            }
            op::HHCURVETO | op::VVCURVETO => {
                let horizontal = operator == op::HHCURVETO;
                let mut i = 0;
                let mut first_offset = 0.0;
                if self.stack.len() % 2 != 0 {
                    first_offset = self.arg(0)?;
                    i = 1;
                }
                while i < self.stack.len() {
                    let [a, b, c, d] = self.args(i)?;
                    let offset = std::mem::take(&mut first_offset);
                    if horizontal {
                        self.curve([a, offset, b, c, d, 0.0]);
                    } else {
                        self.curve([offset, a, b, c, 0.0, d]);
                    }
                    i += 4;
                }
            }
            op::HVCURVETO | op::VHCURVETO => {
                let count = self.stack.len();
                let mut horizontal = operator == op::HVCURVETO;
                let mut i = 0;
                while i + 4 <= count {
                    let [a, b, c, d] = self.args(i)?;
                    // a fifth operand on the last curve bends its end
                    let last = if count - i == 5 { self.arg(i + 4)? } else { 0.0 };
                    if horizontal {
                        self.curve([a, 0.0, b, c, last, d]);
                    } else {
                        self.curve([0.0, a, b, c, d, last]);
                    }
                    horizontal = !horizontal;
                    i += 4;
                }
            }
            op::CALLSUBR | op::CALLGSUBR | op::RETURN => {
                return Err(ReadError::MalformedData(
                    "charstring subroutines are not supported",
                ))
            }
            _ => {
                return Err(ReadError::MalformedData(
                    "unsupported charstring operator",
                ))
            }
        }
        self.stack.clear();
        Ok(())
    }

    /// Flex operators always produce their two curves.
    fn escaped_operator(&mut self, operator: u8) -> Result<(), ReadError> {
        let (first, second) = match operator {
            op::FLEX => {
                let d: [f64; 12] = self.args(0)?;
                (
                    [d[0], d[1], d[2], d[3], d[4], d[5]],
                    [d[6], d[7], d[8], d[9], d[10], d[11]],
                )
            }
            op::HFLEX => {
                let d: [f64; 7] = self.args(0)?;
                (
                    [d[0], 0.0, d[1], d[2], d[3], 0.0],
                    [d[4], 0.0, d[5], -d[2], d[6], 0.0],
                )
            }
            op::HFLEX1 => {
                let d: [f64; 9] = self.args(0)?;
                (
                    [d[0], d[1], d[2], d[3], d[4], 0.0],
                    [d[5], 0.0, d[6], d[7], d[8], -(d[1] + d[3] + d[7])],
                )
            }
            op::FLEX1 => {
                let d: [f64; 11] = self.args(0)?;
                let dx = d[0] + d[2] + d[4] + d[6] + d[8];
                let dy = d[1] + d[3] + d[5] + d[7] + d[9];
                let (last_x, last_y) = if dx.abs() > dy.abs() {
                    (d[10], -dy)
                } else {
                    (-dx, d[10])
                };
                (
                    [d[0], d[1], d[2], d[3], d[4], d[5]],
                    [d[6], d[7], d[8], d[9], last_x, last_y],
                )
            }
            _ => {
                return Err(ReadError::MalformedData(
                    "unsupported charstring operator",
                ))
            }
        };
        self.curve(first);
        self.curve(second);
        self.stack.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::fixture_characters;
    use kurbo::{BezPath, CubicBez, Line, QuadBez};
    use pretty_assertions::assert_eq;

    /// The 'a' charstring from the reference CFF table.
    const GLYPH_A: &[u8] = &[
        0xF8, 0x88, 0xF8, 0x16, 0xF8, 0x94, 0x15, 0xAB, 0xAD, 0xDC, 0xC1, 0xB5, 0x7B, 0x08, 0xCB,
        0x73, 0xF7, 0x05, 0x30, 0x3E, 0xFB, 0x05, 0x08, 0x8B, 0x8B, 0xFB, 0x92, 0xF7, 0x30, 0x8B,
        0x8B, 0x08, 0x0E,
    ];

    #[test]
    fn compile_reference_glyphs() {
        let characters = fixture_characters();
        assert_eq!(compile(&characters[0], 0.0).unwrap(), [0xF8, 0x88, 0x0E]);
        assert_eq!(compile(&characters[1], 0.0).unwrap(), GLYPH_A);
    }

    #[test]
    fn nominal_width() {
        let glyph = Character::new("space", Some(0x20), 250.0);
        // 250 - 300
        assert_eq!(compile(&glyph, 300.0).unwrap(), [0x59, 0x0E]);
    }

    #[test]
    fn lines_and_quads() {
        let glyph = Character::new("tri", None, 600.0).with_contour(vec![
            PathSeg::Line(Line::new((10.0, 0.0), (110.0, 0.0))),
            PathSeg::Quad(QuadBez::new((110.0, 0.0), (110.0, 300.0), (10.0, 0.0))),
        ]);
        let bytes = compile(&glyph, 0.0).unwrap();
        let mut path = BezPath::new();
        let width = evaluate(&bytes, &mut path).unwrap();
        assert_eq!(width, Some(600.0));
        let expected = glyph.to_path();
        let raised = QuadBez::new((110.0, 0.0), (110.0, 300.0), (10.0, 0.0)).raise();
        assert_eq!(path.elements().len(), expected.elements().len());
        assert_eq!(
            path.elements()[2],
            kurbo::PathEl::CurveTo(
                raised.p1.ot_round(),
                raised.p2.ot_round(),
                raised.p3.ot_round()
            )
        );
    }

    #[test]
    fn evaluate_reference_glyph() {
        let mut path = BezPath::new();
        let width = evaluate(GLYPH_A, &mut path).unwrap();
        assert_eq!(width, Some(500.0));
        let els = path.elements();
        assert_eq!(els[0], kurbo::PathEl::MoveTo((386.0, 512.0).into()));
        assert_eq!(
            els[1],
            kurbo::PathEl::CurveTo(
                (418.0, 546.0).into(),
                (499.0, 600.0).into(),
                (541.0, 584.0).into()
            )
        );
        assert_eq!(els.last(), Some(&kurbo::PathEl::ClosePath));
    }

    #[test]
    fn width_is_optional() {
        let mut path = BezPath::new();
        // 10 20 rmoveto 30 0 rlineto endchar
        let bytes = [0x95, 0x9F, 0x15, 0xA9, 0x8B, 0x05, 0x0E];
        assert_eq!(evaluate(&bytes, &mut path).unwrap(), None);
        assert_eq!(path.elements().len(), 3);
    }

    #[test]
    fn hints_are_skipped() {
        let mut path = BezPath::new();
        // 500 | 0 50 hstem 10 20 hintmask <mask> 100 hmoveto endchar
        let bytes = [
            0xF8, 0x88, 0x8B, 0xBD, 0x01, 0x95, 0x9F, 0x13, 0xC0, 0xEF, 0x16, 0x0E,
        ];
        assert_eq!(evaluate(&bytes, &mut path).unwrap(), Some(500.0));
        assert_eq!(path.elements()[0], kurbo::PathEl::MoveTo((100.0, 0.0).into()));
    }

    #[test]
    fn alternating_curves() {
        let mut path = BezPath::new();
        // 0 0 rmoveto 10 20 30 40 hvcurveto endchar
        let bytes = [0x8B, 0x8B, 0x15, 0x95, 0x9F, 0xA9, 0xB3, 0x1F, 0x0E];
        evaluate(&bytes, &mut path).unwrap();
        assert_eq!(
            path.elements()[1],
            kurbo::PathEl::CurveTo(
                (10.0, 0.0).into(),
                (30.0, 30.0).into(),
                (30.0, 70.0).into()
            )
        );
    }

    #[test]
    fn subroutines_are_rejected() {
        let mut path = BezPath::new();
        assert!(evaluate(&[0x8B, 0x0A, 0x0E], &mut path).is_err());
        assert!(evaluate(&[0x8B, 0x8B, 0x15], &mut path).is_err());
    }

    #[test]
    fn operand_overflow() {
        let glyph = Character::new("wide", None, 0.0).with_contour(vec![PathSeg::Cubic(
            CubicBez::new((0.0, 0.0), (40000.0, 0.0), (0.0, 0.0), (0.0, 0.0)),
        )]);
        assert!(matches!(
            compile(&glyph, 0.0),
            Err(Error::LayoutOverflow(_))
        ));
    }
}
