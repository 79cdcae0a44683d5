//! 4x4 homogeneous affine transforms.
//!
//! Matrices use the row-vector convention: a point is transformed as
//! `[x y z 1] · M` and a vector as `[x y z 0] · M`, so the translation lives
//! in the bottom row. Composition reads left to right: `a * b` applies `a`
//! first, then `b`.

use std::fmt;
use std::io::{Read, Write};
use std::ops::Mul;

use nalgebra::Matrix4;

use crate::persist::Persist;
use crate::tolerance::epsilon;
use crate::vector::VectorExt;
use crate::{Point3, Result, Scalar, Vec3};

/// A 4x4 affine transformation matrix (row-vector convention).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    m: Matrix4<Scalar>,
}

impl Matrix {
    /// All-zero matrix.
    pub fn zero() -> Self {
        Self {
            m: Matrix4::zeros(),
        }
    }

    /// Identity transform.
    pub fn identity() -> Self {
        Self {
            m: Matrix4::identity(),
        }
    }

    /// Build from 16 scalars in row-major order.
    pub fn from_row_slice(values: &[Scalar; 16]) -> Self {
        Self {
            m: Matrix4::from_row_slice(values),
        }
    }

    /// The 16 entries in row-major order.
    pub fn to_row_array(&self) -> [Scalar; 16] {
        let mut out = [0.0; 16];
        for (i, v) in out.iter_mut().enumerate() {
            *v = self.m[(i / 4, i % 4)];
        }
        out
    }

    /// Entry at `(row, col)`.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Scalar {
        self.m[(row, col)]
    }

    /// Overwrite the entry at `(row, col)`.
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: Scalar) {
        self.m[(row, col)] = value;
    }

    /// Translation by `offset`.
    pub fn translation(offset: &Vec3) -> Self {
        let mut r = Self::identity();
        r.set(3, 0, offset.x);
        r.set(3, 1, offset.y);
        r.set(3, 2, offset.z);
        r
    }

    /// Non-uniform scale by `(sx, sy, sz)`.
    pub fn scaling(factors: &Vec3) -> Self {
        let mut r = Self::identity();
        r.set(0, 0, factors.x);
        r.set(1, 1, factors.y);
        r.set(2, 2, factors.z);
        r
    }

    /// Rotation about the X axis by `angle` radians.
    pub fn rotation_x(angle: Scalar) -> Self {
        let (s, c) = angle.sin_cos();
        let mut r = Self::identity();
        r.set(1, 1, c);
        r.set(1, 2, s);
        r.set(2, 1, -s);
        r.set(2, 2, c);
        r
    }

    /// Rotation about the Y axis by `angle` radians.
    pub fn rotation_y(angle: Scalar) -> Self {
        let (s, c) = angle.sin_cos();
        let mut r = Self::identity();
        r.set(0, 0, c);
        r.set(0, 2, -s);
        r.set(2, 0, s);
        r.set(2, 2, c);
        r
    }

    /// Rotation about the Z axis by `angle` radians.
    pub fn rotation_z(angle: Scalar) -> Self {
        let (s, c) = angle.sin_cos();
        let mut r = Self::identity();
        r.set(0, 0, c);
        r.set(0, 1, s);
        r.set(1, 0, -s);
        r.set(1, 1, c);
        r
    }

    /// Rotation about an arbitrary axis through the origin by `angle` radians.
    ///
    /// Rodrigues' formula, transposed for row vectors. The axis is
    /// normalized first.
    pub fn rotation(axis: &Vec3, angle: Scalar) -> Self {
        let a = axis.normalized_or_zero();
        let (s, c) = angle.sin_cos();
        let t = 1.0 - c;
        let (x, y, z) = (a.x, a.y, a.z);
        let mut r = Self::identity();
        r.set(0, 0, t * x * x + c);
        r.set(0, 1, t * x * y + s * z);
        r.set(0, 2, t * x * z - s * y);
        r.set(1, 0, t * x * y - s * z);
        r.set(1, 1, t * y * y + c);
        r.set(1, 2, t * y * z + s * x);
        r.set(2, 0, t * x * z + s * y);
        r.set(2, 1, t * y * z - s * x);
        r.set(2, 2, t * z * z + c);
        r
    }

    /// Change of basis into the frame spanned by `a`, `b`, `c`.
    ///
    /// The returned matrix maps world coordinates to coordinates along
    /// `a`, `b`, `c`. Returns `None` if the vectors are not linearly
    /// independent.
    pub fn to_coordinates(a: &Vec3, b: &Vec3, c: &Vec3) -> Option<Self> {
        let mut basis = Self::identity();
        for (row, v) in [a, b, c].into_iter().enumerate() {
            basis.set(row, 0, v.x);
            basis.set(row, 1, v.y);
            basis.set(row, 2, v.z);
        }
        basis.inverse()
    }

    /// Compose: `self` then `other` (`self * other`).
    pub fn then(&self, other: &Matrix) -> Self {
        Self { m: self.m * other.m }
    }

    /// Transposed copy.
    pub fn transpose(&self) -> Self {
        Self {
            m: self.m.transpose(),
        }
    }

    /// Determinant by cofactor expansion over 2x2 minors.
    pub fn determinant(&self) -> Scalar {
        Minors::of(self).determinant()
    }

    /// Closed-form (adjugate) inverse.
    ///
    /// Returns `None` when `|det| <= eps`.
    pub fn inverse(&self) -> Option<Self> {
        let a = |r: usize, c: usize| self.m[(r, c)];
        let minors = Minors::of(self);
        let det = minors.determinant();
        let Minors { s, c } = minors;
        if det.abs() <= epsilon() {
            return None;
        }
        let inv = 1.0 / det;

        let values = [
            (a(1, 1) * c[5] - a(1, 2) * c[4] + a(1, 3) * c[3]) * inv,
            (-a(0, 1) * c[5] + a(0, 2) * c[4] - a(0, 3) * c[3]) * inv,
            (a(3, 1) * s[5] - a(3, 2) * s[4] + a(3, 3) * s[3]) * inv,
            (-a(2, 1) * s[5] + a(2, 2) * s[4] - a(2, 3) * s[3]) * inv,
            (-a(1, 0) * c[5] + a(1, 2) * c[2] - a(1, 3) * c[1]) * inv,
            (a(0, 0) * c[5] - a(0, 2) * c[2] + a(0, 3) * c[1]) * inv,
            (-a(3, 0) * s[5] + a(3, 2) * s[2] - a(3, 3) * s[1]) * inv,
            (a(2, 0) * s[5] - a(2, 2) * s[2] + a(2, 3) * s[1]) * inv,
            (a(1, 0) * c[4] - a(1, 1) * c[2] + a(1, 3) * c[0]) * inv,
            (-a(0, 0) * c[4] + a(0, 1) * c[2] - a(0, 3) * c[0]) * inv,
            (a(3, 0) * s[4] - a(3, 1) * s[2] + a(3, 3) * s[0]) * inv,
            (-a(2, 0) * s[4] + a(2, 1) * s[2] - a(2, 3) * s[0]) * inv,
            (-a(1, 0) * c[3] + a(1, 1) * c[1] - a(1, 2) * c[0]) * inv,
            (a(0, 0) * c[3] - a(0, 1) * c[1] + a(0, 2) * c[0]) * inv,
            (-a(3, 0) * s[3] + a(3, 1) * s[1] - a(3, 2) * s[0]) * inv,
            (a(2, 0) * s[3] - a(2, 1) * s[1] + a(2, 2) * s[0]) * inv,
        ];
        Some(Self::from_row_slice(&values))
    }

    /// Invert in place. Returns `false` (leaving `self` untouched) if singular.
    pub fn invert(&mut self) -> bool {
        match self.inverse() {
            Some(inv) => {
                *self = inv;
                true
            }
            None => false,
        }
    }

    /// Transform a point (translation applied).
    pub fn apply_point(&self, p: &Point3) -> Point3 {
        let m = &self.m;
        Point3::new(
            p.x * m[(0, 0)] + p.y * m[(1, 0)] + p.z * m[(2, 0)] + m[(3, 0)],
            p.x * m[(0, 1)] + p.y * m[(1, 1)] + p.z * m[(2, 1)] + m[(3, 1)],
            p.x * m[(0, 2)] + p.y * m[(1, 2)] + p.z * m[(2, 2)] + m[(3, 2)],
        )
    }

    /// Transform a vector (translation ignored).
    pub fn apply_vector(&self, v: &Vec3) -> Vec3 {
        let m = &self.m;
        Vec3::new(
            v.x * m[(0, 0)] + v.y * m[(1, 0)] + v.z * m[(2, 0)],
            v.x * m[(0, 1)] + v.y * m[(1, 1)] + v.z * m[(2, 1)],
            v.x * m[(0, 2)] + v.y * m[(1, 2)] + v.z * m[(2, 2)],
        )
    }

    /// Every entry within eps of the corresponding entry of `other`.
    pub fn approx_eq(&self, other: &Matrix) -> bool {
        let eps = epsilon();
        self.m
            .iter()
            .zip(other.m.iter())
            .all(|(a, b)| (a - b).abs() <= eps)
    }
}

/// The six upper (`s`) and six lower (`c`) 2x2 minors used by the
/// closed-form determinant and inverse.
#[derive(Clone, Copy)]
struct Minors {
    s: [Scalar; 6],
    c: [Scalar; 6],
}

impl Minors {
    fn of(mat: &Matrix) -> Self {
        let a = |r: usize, c: usize| mat.m[(r, c)];
        let s = [
            a(0, 0) * a(1, 1) - a(1, 0) * a(0, 1),
            a(0, 0) * a(1, 2) - a(1, 0) * a(0, 2),
            a(0, 0) * a(1, 3) - a(1, 0) * a(0, 3),
            a(0, 1) * a(1, 2) - a(1, 1) * a(0, 2),
            a(0, 1) * a(1, 3) - a(1, 1) * a(0, 3),
            a(0, 2) * a(1, 3) - a(1, 2) * a(0, 3),
        ];
        let c = [
            a(2, 0) * a(3, 1) - a(3, 0) * a(2, 1),
            a(2, 0) * a(3, 2) - a(3, 0) * a(2, 2),
            a(2, 0) * a(3, 3) - a(3, 0) * a(2, 3),
            a(2, 1) * a(3, 2) - a(3, 1) * a(2, 2),
            a(2, 1) * a(3, 3) - a(3, 1) * a(2, 3),
            a(2, 2) * a(3, 3) - a(3, 2) * a(2, 3),
        ];
        Self { s, c }
    }

    fn determinant(&self) -> Scalar {
        let (s, c) = (&self.s, &self.c);
        s[0] * c[5] - s[1] * c[4] + s[2] * c[3] + s[3] * c[2] - s[4] * c[1] + s[5] * c[0]
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mul for Matrix {
    type Output = Matrix;

    fn mul(self, rhs: Matrix) -> Matrix {
        self.then(&rhs)
    }
}

impl Mul<&Matrix> for &Matrix {
    type Output = Matrix;

    fn mul(self, rhs: &Matrix) -> Matrix {
        self.then(rhs)
    }
}

impl Mul<&Matrix> for Point3 {
    type Output = Point3;

    fn mul(self, rhs: &Matrix) -> Point3 {
        rhs.apply_point(&self)
    }
}

impl Mul<&Matrix> for Vec3 {
    type Output = Vec3;

    fn mul(self, rhs: &Matrix) -> Vec3 {
        rhs.apply_vector(&self)
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Matrix:")?;
        for row in 0..4 {
            write!(f, "|")?;
            for col in 0..4 {
                write!(f, " {:>12.6}", self.m[(row, col)])?;
            }
            writeln!(f, " |")?;
        }
        Ok(())
    }
}

impl Persist for Matrix {
    fn save<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
        for v in self.to_row_array() {
            v.save(w)?;
        }
        Ok(())
    }

    fn restore<R: Read + ?Sized>(r: &mut R) -> Result<Self> {
        let mut values = [0.0; 16];
        for v in values.iter_mut() {
            *v = Scalar::restore(r)?;
        }
        Ok(Self::from_row_slice(&values))
    }
}
