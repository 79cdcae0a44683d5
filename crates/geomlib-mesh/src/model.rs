//! Indexed triangle store with point deduplication.

use std::collections::HashMap;
use std::fmt;
use std::io::{Read, Write};
use std::ops::Range;

use geomlib_geom::{Plane, Ray};
use geomlib_math::persist::{restore_seq, save_seq};
use geomlib_math::{
    epsilon, GeomError, Persist, Point3, PointExt, Scalar, Tolerance, Vec3, VectorExt, Xyz,
};
use tracing::debug;

use crate::error::{MeshError, Result};

/// Three point indices, stored with the lowest index first.
pub type Triangle = [u32; 3];

/// The nearest intersection of a ray with a model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Intersection point.
    pub point: Point3,
    /// Index of the triangle that was hit.
    pub triangle: usize,
    /// Squared distance from the ray origin to `point`.
    pub distance_sq: Scalar,
    /// Unit normal of the hit triangle (stored vertex order).
    pub normal: Vec3,
}

impl RayHit {
    /// Distance from the ray origin to the hit point.
    pub fn distance(&self) -> Scalar {
        self.distance_sq.sqrt()
    }
}

type CellKey = [i64; 3];

// Caps preallocation while restoring, so a corrupt length prefix fails on
// read instead of reserving a huge buffer.
const RESTORE_PREALLOC: usize = 1 << 16;

/// A tessellated model: deduplicated points, canonical triangles, and the
/// exclusive end index of each surface added to it.
///
/// Two points are merged when they are within the model's cell size of each
/// other. The cell size is the process-wide tolerance at construction time,
/// so later tolerance changes do not affect an existing model. The model only
/// grows; there is no removal.
#[derive(Debug, Clone)]
pub struct TessModel {
    points: Vec<Point3>,
    triangles: Vec<Triangle>,
    surface_ends: Vec<usize>,
    cell: Scalar,
    point_cells: HashMap<CellKey, Vec<u32>>,
    triangle_lookup: HashMap<Triangle, usize>,
}

impl Default for TessModel {
    fn default() -> Self {
        Self::new()
    }
}

/// Rotate so the lowest index comes first, keeping the winding.
fn canonical(tri: Triangle) -> Triangle {
    let pos = if tri[0] <= tri[1] && tri[0] <= tri[2] {
        0
    } else if tri[1] <= tri[2] {
        1
    } else {
        2
    };
    [tri[pos], tri[(pos + 1) % 3], tri[(pos + 2) % 3]]
}

fn is_collapsed(tri: &Triangle) -> bool {
    tri[0] == tri[1] || tri[1] == tri[2] || tri[0] == tri[2]
}

fn validate_indices(triangles: &[Triangle], len: usize) -> Result<()> {
    for tri in triangles {
        for &index in tri {
            if index as usize >= len {
                return Err(MeshError::IndexOutOfRange {
                    index: index as usize,
                    len,
                });
            }
        }
    }
    Ok(())
}

impl TessModel {
    /// Empty model using the current tolerance as its merge distance.
    pub fn new() -> Self {
        Self::with_cell(Tolerance::current().eps)
    }

    /// Empty model with an explicit merge distance.
    pub fn with_cell(cell: Scalar) -> Self {
        Self {
            points: Vec::new(),
            triangles: Vec::new(),
            surface_ends: Vec::new(),
            cell,
            point_cells: HashMap::new(),
            triangle_lookup: HashMap::new(),
        }
    }

    fn from_parts(
        cell: Scalar,
        points: Vec<Point3>,
        triangles: Vec<Triangle>,
        surface_ends: Vec<usize>,
    ) -> Self {
        let mut model = Self::with_cell(cell);
        for (i, p) in points.iter().enumerate() {
            let key = model.cell_of(p);
            model.point_cells.entry(key).or_default().push(i as u32);
        }
        model.points = points;
        for (i, tri) in triangles.iter().enumerate() {
            model.triangle_lookup.entry(*tri).or_insert(i);
        }
        model.triangles = triangles;
        model.surface_ends = surface_ends;
        model
    }

    /// Merge distance (and grid cell size) of this model.
    pub fn cell_size(&self) -> Scalar {
        self.cell
    }

    /// Deduplicated points.
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    /// Triangles in insertion order.
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Exclusive end triangle index of each surface.
    pub fn surface_ends(&self) -> &[usize] {
        &self.surface_ends
    }

    /// Number of points.
    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    /// Number of triangles.
    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// Number of surfaces added so far (including empty ones).
    pub fn num_surfaces(&self) -> usize {
        self.surface_ends.len()
    }

    /// No triangles.
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    fn cell_of(&self, p: &Point3) -> CellKey {
        [p.x, p.y, p.z].map(|c| (c / self.cell).floor() as i64)
    }

    /// Lowest-indexed stored point within the merge distance of `p`.
    ///
    /// Searches the point's grid cell and its 26 neighbors, so points that
    /// straddle a cell boundary are still found.
    fn find_point(&self, p: &Point3) -> Option<u32> {
        let [x, y, z] = self.cell_of(p);
        let tol_sq = self.cell * self.cell;
        let mut best: Option<u32> = None;
        for dx in -1i64..=1 {
            for dy in -1i64..=1 {
                for dz in -1i64..=1 {
                    let key = [
                        x.saturating_add(dx),
                        y.saturating_add(dy),
                        z.saturating_add(dz),
                    ];
                    let Some(bucket) = self.point_cells.get(&key) else {
                        continue;
                    };
                    for &i in bucket {
                        let close = self.points[i as usize].distance_sq_to(p) <= tol_sq;
                        if close && best.map_or(true, |b| i < b) {
                            best = Some(i);
                        }
                    }
                }
            }
        }
        best
    }

    fn push_point(&mut self, p: Point3) -> Result<u32> {
        let index = u32::try_from(self.points.len())
            .map_err(|_| MeshError::TooManyPoints(self.points.len()))?;
        let key = self.cell_of(&p);
        self.points.push(p);
        self.point_cells.entry(key).or_default().push(index);
        Ok(index)
    }

    fn merge_points(&mut self, points: &[Point3]) -> Result<Vec<u32>> {
        let mut mapping = Vec::with_capacity(points.len());
        for p in points {
            let index = match self.find_point(p) {
                Some(i) => i,
                None => self.push_point(*p)?,
            };
            mapping.push(index);
        }
        Ok(mapping)
    }

    /// Append remapped triangles as one surface, skipping collapsed and
    /// already-present ones. A surface that contributes no triangle is not
    /// recorded.
    fn merge_triangles(&mut self, mapping: &[u32], triangles: &[Triangle]) -> Range<usize> {
        let start = self.triangles.len();
        for &tri in triangles {
            let tri = canonical(tri.map(|i| mapping[i as usize]));
            if is_collapsed(&tri) || self.triangle_lookup.contains_key(&tri) {
                continue;
            }
            self.triangle_lookup.insert(tri, self.triangles.len());
            self.triangles.push(tri);
        }
        if self.triangles.len() > start {
            self.surface_ends.push(self.triangles.len());
        }
        start..self.triangles.len()
    }

    /// Add one surface given its own points and triangles (indices into
    /// `points`). Returns the range of triangle indices it contributed.
    ///
    /// Fails without modifying the model if a triangle index is out of range.
    pub fn add_surface(&mut self, points: &[Point3], triangles: &[Triangle]) -> Result<Range<usize>> {
        validate_indices(triangles, points.len())?;
        let before = self.points.len();
        let mapping = self.merge_points(points)?;
        let range = self.merge_triangles(&mapping, triangles);
        debug!(
            surfaces = self.surface_ends.len(),
            new_points = self.points.len() - before,
            new_triangles = range.len(),
            "surface added"
        );
        Ok(range)
    }

    /// Merge every surface of `other` into this model, in order. Surfaces
    /// that add no new triangle are not recorded.
    pub fn merge_models(&mut self, other: &TessModel) -> Result<()> {
        let mapping = self.merge_points(&other.points)?;
        for range in other.surface_ranges() {
            self.merge_triangles(&mapping, &other.triangles[range]);
        }
        debug!(
            surfaces = other.num_surfaces(),
            points = self.num_points(),
            triangles = self.num_triangles(),
            "models merged"
        );
        Ok(())
    }

    /// Triangle index range of each surface, in order.
    pub fn surface_ranges(&self) -> impl Iterator<Item = Range<usize>> + '_ {
        self.surface_ends.iter().scan(0, |start, &end| {
            let range = *start..end;
            *start = end;
            Some(range)
        })
    }

    /// Triangle index range of surface `surface`.
    pub fn surface_range(&self, surface: usize) -> Option<Range<usize>> {
        let end = *self.surface_ends.get(surface)?;
        let start = match surface {
            0 => 0,
            s => self.surface_ends[s - 1],
        };
        Some(start..end)
    }

    /// Surface that contributed triangle `triangle`.
    pub fn surface_of_triangle(&self, triangle: usize) -> Option<usize> {
        if triangle >= self.triangles.len() {
            return None;
        }
        Some(self.surface_ends.partition_point(|&end| end <= triangle))
    }

    /// Index of the stored point within the merge distance of `p`.
    pub fn index_of_point(&self, p: &Point3) -> Option<usize> {
        self.find_point(p).map(|i| i as usize)
    }

    /// Index of a stored triangle, matching any rotation of `tri` (but not
    /// a reflection).
    pub fn index_of_triangle(&self, tri: Triangle) -> Option<usize> {
        self.triangle_lookup.get(&canonical(tri)).copied()
    }

    /// The three vertices of triangle `triangle`, in stored order.
    pub fn triangle_points(&self, triangle: usize) -> Option<[Point3; 3]> {
        let tri = self.triangles.get(triangle)?;
        Some(tri.map(|i| self.points[i as usize]))
    }

    /// Unit normal `(p1 - p0) × (p2 - p0)` of triangle `triangle`.
    pub fn normal_to_triangle(&self, triangle: usize) -> Option<Vec3> {
        let [a, b, c] = self.triangle_points(triangle)?;
        Some((b - a).cross(&(c - a)).normalized_or_zero())
    }

    /// Where `ray` hits triangle `triangle`, if it does.
    ///
    /// The ray is intersected with the triangle's plane; the hit is inside
    /// when every edge's pseudo-normal `edge × (hit - edge_start)` points the
    /// same way as the triangle normal. Points on an edge or vertex count as
    /// inside.
    pub fn intersects_triangle(&self, triangle: usize, ray: &Ray) -> Option<Point3> {
        let [a, b, c] = self.triangle_points(triangle)?;
        let n = (b - a).cross(&(c - a));
        if n.length_sq() == 0.0 {
            return None;
        }
        let hit = Plane::new(a, n).find_intersection(ray)?;
        let n = n.normalized_or_zero();
        let eps = epsilon();
        let inside = [(a, b), (b, c), (c, a)].iter().all(|(start, end)| {
            let edge = end - start;
            // Signed in-plane distance from the hit to the edge line.
            edge.cross(&(hit - start)).dot(&n) >= -eps * edge.length()
        });
        inside.then_some(hit)
    }

    /// Nearest hit of `ray` among triangles in `range` (clamped to the
    /// model). Equal distances resolve to the lowest triangle index.
    pub fn find_intersection(&self, ray: &Ray, range: Range<usize>) -> Option<RayHit> {
        let end = range.end.min(self.triangles.len());
        let mut best: Option<RayHit> = None;
        for i in range.start..end {
            let Some(point) = self.intersects_triangle(i, ray) else {
                continue;
            };
            let distance_sq = point.distance_sq_to(&ray.origin);
            if best.map_or(true, |b| distance_sq < b.distance_sq) {
                best = Some(RayHit {
                    point,
                    triangle: i,
                    distance_sq,
                    normal: self.normal_to_triangle(i).unwrap_or_else(Vec3::zeros),
                });
            }
        }
        best
    }

    /// Nearest hit over the whole model.
    pub fn find_nearest(&self, ray: &Ray) -> Option<RayHit> {
        self.find_intersection(ray, 0..self.triangles.len())
    }
}

impl fmt::Display for TessModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "TessModel: {} points, {} triangles, {} surfaces",
            self.points.len(),
            self.triangles.len(),
            self.surface_ends.len()
        )?;
        writeln!(f, "Points:")?;
        for (i, p) in self.points.iter().enumerate() {
            writeln!(f, "  {i}: {}", Xyz(*p))?;
        }
        writeln!(f, "Triangles:")?;
        for (i, [a, b, c]) in self.triangles.iter().enumerate() {
            writeln!(f, "  {i}: [{a}, {b}, {c}]")?;
        }
        write!(f, "Surface ends: {:?}", self.surface_ends)
    }
}

fn restore_len<R: Read + ?Sized>(r: &mut R) -> geomlib_math::Result<usize> {
    let len = u64::restore(r)?;
    usize::try_from(len).map_err(|_| GeomError::CorruptData(format!("length {len} overflows usize")))
}

impl Persist for TessModel {
    fn save<W: Write + ?Sized>(&self, w: &mut W) -> geomlib_math::Result<()> {
        self.cell.save(w)?;
        save_seq(&self.points, w)?;
        (self.triangles.len() as u64).save(w)?;
        for tri in &self.triangles {
            for index in tri {
                index.save(w)?;
            }
        }
        (self.surface_ends.len() as u64).save(w)?;
        for &end in &self.surface_ends {
            (end as u64).save(w)?;
        }
        Ok(())
    }

    /// Rejects cell sizes that are not positive, triangle indices past the
    /// point list, and surface ends that are not strictly increasing or do
    /// not cover every triangle.
    fn restore<R: Read + ?Sized>(r: &mut R) -> geomlib_math::Result<Self> {
        let cell = Scalar::restore(r)?;
        if !(cell.is_finite() && cell > 0.0) {
            return Err(GeomError::CorruptData(format!("invalid cell size {cell}")));
        }
        let points: Vec<Point3> = restore_seq(r, RESTORE_PREALLOC)?;

        let count = restore_len(r)?;
        let mut triangles = Vec::with_capacity(count.min(RESTORE_PREALLOC));
        for _ in 0..count {
            let tri = [u32::restore(r)?, u32::restore(r)?, u32::restore(r)?];
            if let Some(&bad) = tri.iter().find(|&&i| i as usize >= points.len()) {
                return Err(GeomError::CorruptData(format!(
                    "triangle index {bad} out of range for {} points",
                    points.len()
                )));
            }
            triangles.push(canonical(tri));
        }

        let count = restore_len(r)?;
        let mut surface_ends = Vec::with_capacity(count.min(RESTORE_PREALLOC));
        let mut previous = 0;
        for _ in 0..count {
            let end = restore_len(r)?;
            if end <= previous || end > triangles.len() {
                return Err(GeomError::CorruptData(format!("invalid surface end {end}")));
            }
            surface_ends.push(end);
            previous = end;
        }
        if previous != triangles.len() {
            return Err(GeomError::CorruptData(
                "surface ends do not cover every triangle".into(),
            ));
        }

        Ok(Self::from_parts(cell, points, triangles, surface_ends))
    }
}
