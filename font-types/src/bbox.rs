/// Minimum and maximum extents of a rectangular region.
#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingBox<T> {
    /// Minimum extent in the x direction-- the left side of a region.
    pub x_min: T,
    /// Minimum extent in the y direction. In a Y-up coordinate system,
    /// which is used by fonts, this represents the bottom of a region.
    pub y_min: T,
    /// Maximum extent in the x direction-- the right side of a region.
    pub x_max: T,
    /// Maximum extent in the y direction. In a Y-up coordinate system,
    /// which is used by fonts, this represents the top of the region.
    pub y_max: T,
}

impl<T: PartialOrd + Copy> BoundingBox<T> {
    /// Return the smallest box containing both `self` and `other`.
    pub fn union(self, other: Self) -> Self {
        fn min<T: PartialOrd>(a: T, b: T) -> T {
            if b < a {
                b
            } else {
                a
            }
        }
        fn max<T: PartialOrd>(a: T, b: T) -> T {
            if b > a {
                b
            } else {
                a
            }
        }
        BoundingBox {
            x_min: min(self.x_min, other.x_min),
            y_min: min(self.y_min, other.y_min),
            x_max: max(self.x_max, other.x_max),
            y_max: max(self.y_max, other.y_max),
        }
    }
}
