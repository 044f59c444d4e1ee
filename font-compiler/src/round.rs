//! Rounding whose behavior is defined by the
//! [font specification](https://learn.microsoft.com/en-us/typography/opentype/spec/otff).

/// Floating-point rounding per the [OpenType spec][spec].
///
/// Values are rounded to the nearest integer, with ties rounding towards
/// positive infinity: `0.5` becomes `1` and `-0.5` becomes `0`.
///
/// <https://github.com/fonttools/fonttools/issues/1248#issuecomment-383198166> captures the rationale
/// for the current implementation.
///
/// [spec]: https://docs.microsoft.com/en-us/typography/opentype/spec/otvaroverview#coordinate-scales-and-normalization
pub trait OtRound<U, T = Self> {
    fn ot_round(self) -> U;
}

impl OtRound<i16> for f64 {
    #[inline]
    fn ot_round(self) -> i16 {
        (self + 0.5).floor() as i16
    }
}

impl OtRound<u16> for f64 {
    #[inline]
    fn ot_round(self) -> u16 {
        (self + 0.5).floor() as u16
    }
}

impl OtRound<i32> for f64 {
    #[inline]
    fn ot_round(self) -> i32 {
        (self + 0.5).floor() as i32
    }
}

impl OtRound<f64> for f64 {
    #[inline]
    fn ot_round(self) -> f64 {
        (self + 0.5).floor()
    }
}

impl OtRound<kurbo::Point> for kurbo::Point {
    #[inline]
    fn ot_round(self) -> kurbo::Point {
        kurbo::Point::new(self.x.ot_round(), self.y.ot_round())
    }
}

impl OtRound<kurbo::Vec2> for kurbo::Vec2 {
    #[inline]
    fn ot_round(self) -> kurbo::Vec2 {
        kurbo::Vec2::new(self.x.ot_round(), self.y.ot_round())
    }
}
