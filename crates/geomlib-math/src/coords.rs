//! The coordinate triple shared by points and vectors.

use crate::{Point3, Scalar, Vec3};

/// Common `(x, y, z)` access for point-like and vector-like types.
///
/// Implemented for [`Point3`] and [`Vec3`] only; code that needs to treat
/// both uniformly (persistence, grid quantization, text output) is generic
/// over this trait instead of over arbitrary types.
pub trait Coordinates: Copy {
    /// Build from `[x, y, z]`.
    fn from_array(xyz: [Scalar; 3]) -> Self;

    /// The coordinates as `[x, y, z]`.
    fn to_array(&self) -> [Scalar; 3];

    /// Coordinate along `axis` (0 = x, 1 = y, 2 = z).
    fn coord(&self, axis: usize) -> Scalar {
        self.to_array()[axis]
    }

    /// Overwrite the coordinate along `axis` (0 = x, 1 = y, 2 = z).
    fn set_coord(&mut self, axis: usize, value: Scalar) {
        let mut xyz = self.to_array();
        xyz[axis] = value;
        *self = Self::from_array(xyz);
    }

    /// Build from the first three values of a slice.
    ///
    /// Returns `None` if the slice is shorter than three.
    fn from_slice(values: &[Scalar]) -> Option<Self> {
        match values {
            [x, y, z, ..] => Some(Self::from_array([*x, *y, *z])),
            _ => None,
        }
    }
}

impl Coordinates for Point3 {
    fn from_array(xyz: [Scalar; 3]) -> Self {
        Point3::new(xyz[0], xyz[1], xyz[2])
    }

    fn to_array(&self) -> [Scalar; 3] {
        [self.x, self.y, self.z]
    }
}

impl Coordinates for Vec3 {
    fn from_array(xyz: [Scalar; 3]) -> Self {
        Vec3::new(xyz[0], xyz[1], xyz[2])
    }

    fn to_array(&self) -> [Scalar; 3] {
        [self.x, self.y, self.z]
    }
}

/// `Display` adapter printing a coordinate triple as `(x, y, z)`.
///
/// Honors the formatter precision, defaulting to six decimals.
#[derive(Debug, Clone, Copy)]
pub struct Xyz<C>(pub C);

impl<C: Coordinates> std::fmt::Display for Xyz<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [x, y, z] = self.0.to_array();
        let p = f.precision().unwrap_or(6);
        write!(f, "({x:.p$}, {y:.p$}, {z:.p$})")
    }
}
