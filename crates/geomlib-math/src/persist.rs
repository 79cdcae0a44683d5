//! Fixed-order binary save/restore.
//!
//! Fields are written in declaration order as little-endian values with no
//! framing or versioning. The layout is only guaranteed to round-trip
//! within the same build (it depends on [`Scalar`]).

use std::io::{Read, Write};

use crate::coords::Coordinates;
use crate::{GeomError, Point3, Result, Scalar, Vec3};

/// Binary save/restore contract.
pub trait Persist: Sized {
    /// Write `self` to `w`.
    fn save<W: Write + ?Sized>(&self, w: &mut W) -> Result<()>;

    /// Read a value previously written by [`Persist::save`].
    fn restore<R: Read + ?Sized>(r: &mut R) -> Result<Self>;

    /// Save into a fresh byte buffer.
    fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.save(&mut buf)?;
        Ok(buf)
    }

    /// Restore from a byte slice.
    fn from_bytes(mut bytes: &[u8]) -> Result<Self> {
        Self::restore(&mut bytes)
    }
}

impl Persist for Scalar {
    fn save<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
        w.write_all(&self.to_le_bytes())?;
        Ok(())
    }

    fn restore<R: Read + ?Sized>(r: &mut R) -> Result<Self> {
        let mut buf = [0u8; std::mem::size_of::<Scalar>()];
        r.read_exact(&mut buf)?;
        Ok(Scalar::from_le_bytes(buf))
    }
}

impl Persist for u32 {
    fn save<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
        w.write_all(&self.to_le_bytes())?;
        Ok(())
    }

    fn restore<R: Read + ?Sized>(r: &mut R) -> Result<Self> {
        let mut buf = [0u8; 4];
        r.read_exact(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }
}

impl Persist for u64 {
    fn save<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
        w.write_all(&self.to_le_bytes())?;
        Ok(())
    }

    fn restore<R: Read + ?Sized>(r: &mut R) -> Result<Self> {
        let mut buf = [0u8; 8];
        r.read_exact(&mut buf)?;
        Ok(u64::from_le_bytes(buf))
    }
}

fn save_triple<C: Coordinates, W: Write + ?Sized>(c: &C, w: &mut W) -> Result<()> {
    for v in c.to_array() {
        v.save(w)?;
    }
    Ok(())
}

fn restore_triple<C: Coordinates, R: Read + ?Sized>(r: &mut R) -> Result<C> {
    let x = Scalar::restore(r)?;
    let y = Scalar::restore(r)?;
    let z = Scalar::restore(r)?;
    Ok(C::from_array([x, y, z]))
}

impl Persist for Point3 {
    fn save<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
        save_triple(self, w)
    }

    fn restore<R: Read + ?Sized>(r: &mut R) -> Result<Self> {
        restore_triple(r)
    }
}

impl Persist for Vec3 {
    fn save<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
        save_triple(self, w)
    }

    fn restore<R: Read + ?Sized>(r: &mut R) -> Result<Self> {
        restore_triple(r)
    }
}

/// Write a length prefix followed by each element.
pub fn save_seq<T: Persist, W: Write + ?Sized>(items: &[T], w: &mut W) -> Result<()> {
    (items.len() as u64).save(w)?;
    for item in items {
        item.save(w)?;
    }
    Ok(())
}

/// Read a sequence written by [`save_seq`].
///
/// The length prefix is not trusted for preallocation beyond `limit`
/// elements, so truncated or corrupt input fails with an error instead of
/// exhausting memory.
pub fn restore_seq<T: Persist, R: Read + ?Sized>(r: &mut R, limit: usize) -> Result<Vec<T>> {
    let len = u64::restore(r)?;
    let len = usize::try_from(len)
        .map_err(|_| GeomError::CorruptData(format!("sequence length {len} overflows usize")))?;
    let mut items = Vec::with_capacity(len.min(limit));
    for _ in 0..len {
        items.push(T::restore(r)?);
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_round_trip() {
        let p = Point3::new(1.5, -2.25, 1e-9);
        let bytes = p.to_bytes().unwrap();
        assert_eq!(bytes.len(), 3 * std::mem::size_of::<Scalar>());
        assert_eq!(Point3::from_bytes(&bytes).unwrap(), p);
    }

    #[test]
    fn test_truncated_input_fails() {
        let bytes = Vec3::new(1.0, 2.0, 3.0).to_bytes().unwrap();
        let err = Vec3::from_bytes(&bytes[..bytes.len() - 1]).unwrap_err();
        assert!(matches!(err, GeomError::Io(_)));
    }

    #[test]
    fn test_seq_round_trip() {
        let pts = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 2.0, 3.0)];
        let mut buf = Vec::new();
        save_seq(&pts, &mut buf).unwrap();
        let back: Vec<Point3> = restore_seq(&mut buf.as_slice(), 1024).unwrap();
        assert_eq!(back, pts);
    }
}
