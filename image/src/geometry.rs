//! Spatial model of an image: size, spacing, orientation and slice origins.
//!
//! Slices of a time point are kept ordered by decreasing position
//! along the plane normal: the slice index grows as the origin
//! goes down the scroll axis.
use crate::error::{DuplicateSliceSnafu, IndexOutOfBoundsSnafu, Result};
use crate::math::{Index, Matrix33, Point3D, Vector3D, EPSILON};
use snafu::ensure;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// The number of values along each dimension of an image:
/// columns, rows, slices, then time points.
#[derive(Debug, Clone, Eq, Hash, PartialEq)]
pub struct Size(Vec<usize>);

impl Size {
    pub fn new(values: impl Into<Vec<usize>>) -> Self {
        Size(values.into())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn values(&self) -> &[usize] {
        &self.0
    }

    /// The size along a dimension, 1 for dimensions beyond the last.
    pub fn dim_size(&self, dimension: usize) -> usize {
        self.0.get(dimension).copied().unwrap_or(1)
    }

    /// The product of the sizes of all dimensions from `start`.
    pub fn total_size(&self, start: usize) -> usize {
        self.0.iter().skip(start).product()
    }

    /// The number of values in one plane (rows by columns).
    pub fn plane_size(&self) -> usize {
        self.dim_size(0) * self.dim_size(1)
    }

    /// Whether there is more than one position along a dimension.
    pub fn can_scroll(&self, dimension: usize) -> bool {
        self.dim_size(dimension) > 1
    }

    pub(crate) fn set_dim_size(&mut self, dimension: usize, value: usize) {
        if self.0.len() <= dimension {
            self.0.resize(dimension + 1, 1);
        }
        self.0[dimension] = value;
    }

    /// Whether an index lies inside the size.
    ///
    /// Only the given dimensions are checked if `dimensions` is set.
    /// Index dimensions beyond the size must be zero.
    pub fn is_in_bounds(&self, index: &Index, dimensions: Option<&[usize]>) -> bool {
        match dimensions {
            Some(dims) => dims.iter().all(|&d| index.get(d) < self.dim_size(d)),
            None => {
                let n = self.0.len().max(index.len());
                (0..n).all(|d| index.get(d) < self.dim_size(d))
            }
        }
    }

    /// The linear offset of an index, the first dimension varying fastest.
    pub fn index_to_offset(&self, index: &Index) -> usize {
        let mut offset = 0;
        let mut stride = 1;
        for d in 0..self.0.len() {
            offset += index.get(d) * stride;
            stride *= self.0[d];
        }
        offset
    }

    pub fn offset_to_index(&self, offset: usize) -> Index {
        let mut rest = offset;
        let values: Vec<usize> = self
            .0
            .iter()
            .map(|&dim| {
                let dim = dim.max(1);
                let v = rest % dim;
                rest /= dim;
                v
            })
            .collect();
        Index::new(values)
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("x")?;
            }
            write!(f, "{}", v)?;
        }
        Ok(())
    }
}

/// The distance in millimetres between values along each dimension:
/// column spacing, row spacing and slice spacing.
#[derive(Debug, Clone, PartialEq)]
pub struct Spacing(Vec<f64>);

impl Spacing {
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        Spacing(values.into())
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }

    /// The spacing along a dimension, 1 for dimensions beyond the last.
    pub fn get(&self, dimension: usize) -> f64 {
        self.0.get(dimension).copied().unwrap_or(1.)
    }
}

impl Default for Spacing {
    fn default() -> Self {
        Spacing(vec![1., 1., 1.])
    }
}

/// Position of a point along the direction `normal`.
fn projection(normal: Vector3D, point: Point3D) -> f64 {
    normal.dot(point - Point3D::default())
}

fn strictly_decreasing(normal: Vector3D, origins: &[Point3D]) -> bool {
    origins
        .windows(2)
        .all(|w| projection(normal, w[0]) > projection(normal, w[1]))
}

/// The geometry of a multi-slice, multi-time point image.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    /// slice origins per time point, by decreasing normal projection
    origins: BTreeMap<u32, Vec<Point3D>>,
    size: Size,
    spacing: Spacing,
    orientation: Matrix33,
    initial_time: u32,
}

impl Geometry {
    /// Create the geometry of a single slice at the given time point.
    pub fn new(origin: Point3D, size: Size, spacing: Spacing, orientation: Matrix33, time: u32) -> Self {
        let mut origins = BTreeMap::new();
        origins.insert(time, vec![origin]);
        let mut size = size;
        if size.len() < 3 {
            size.set_dim_size(2, 1);
        }
        Geometry {
            origins,
            size,
            spacing,
            orientation,
            initial_time: time,
        }
    }

    pub fn size(&self) -> &Size {
        &self.size
    }

    pub fn spacing(&self) -> &Spacing {
        &self.spacing
    }

    pub fn orientation(&self) -> &Matrix33 {
        &self.orientation
    }

    pub fn initial_time(&self) -> u32 {
        self.initial_time
    }

    /// The slice normal, third column of the orientation.
    pub fn normal(&self) -> Vector3D {
        self.orientation.column(2)
    }

    /// The time point identifiers, in increasing order.
    pub fn times(&self) -> impl Iterator<Item = u32> + '_ {
        self.origins.keys().copied()
    }

    pub fn has_time(&self, time: u32) -> bool {
        self.origins.contains_key(&time)
    }

    /// The time point identifier at a position along the time dimension.
    pub fn time_at(&self, position: usize) -> Option<u32> {
        self.origins.keys().nth(position).copied()
    }

    /// The position of a time point along the time dimension.
    pub fn time_position(&self, time: u32) -> Option<usize> {
        self.origins.keys().position(|&t| t == time)
    }

    /// The slice origins of a time point.
    pub fn origins(&self, time: u32) -> &[Point3D] {
        self.origins.get(&time).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The lowest origin of the initial time point.
    pub fn origin(&self) -> Point3D {
        self.origin_at(self.initial_time).unwrap_or_default()
    }

    /// The lowest origin of a time point, the last one in slice order.
    pub fn origin_at(&self, time: u32) -> Option<Point3D> {
        self.origins(time).last().copied()
    }

    /// The number of slices of a time point.
    pub fn number_of_slices(&self, time: u32) -> usize {
        self.origins(time).len()
    }

    /// The number of slices summed over all time points.
    pub fn current_total_number_of_slices(&self) -> usize {
        self.origins.values().map(Vec::len).sum()
    }

    /// The number of slices of the time points before `time`.
    pub fn current_number_of_slices_before_time(&self, time: u32) -> usize {
        self.origins.range(..time).map(|(_, o)| o.len()).sum()
    }

    /// Whether the origins of a time point follow the slice order,
    /// with no two slices at the same position.
    pub fn is_sorted(&self, time: u32) -> bool {
        strictly_decreasing(self.normal(), self.origins(time))
    }

    /// The slice index of a world point at a time point.
    ///
    /// This is the index of the closest origin, plus one if the point
    /// lies below that origin along the normal. For a point that is not
    /// an origin yet, this is the index it should be inserted at.
    pub fn get_slice_index(&self, point: Point3D, time: u32) -> usize {
        let origins = self.origins(time);
        let Some(first) = origins.first() else {
            return 0;
        };
        let mut closest = 0;
        let mut min_dist = point.distance(*first);
        for (i, origin) in origins.iter().enumerate().skip(1) {
            let dist = point.distance(*origin);
            if dist < min_dist {
                min_dist = dist;
                closest = i;
            }
        }
        let direction = point - origins[closest];
        if self.normal().dot(direction) < -EPSILON {
            closest + 1
        } else {
            closest
        }
    }

    /// Insert a slice origin at the given index of a time point.
    ///
    /// If the insertion breaks the slice order, the origins are sorted
    /// again (keeping the order of equal positions).
    /// An origin already present in the time point is rejected.
    /// Returns the final index of the new origin.
    pub fn append_origin(&mut self, origin: Point3D, index: usize, time: u32) -> Result<usize> {
        let normal = self.normal();
        let origins = self.origins.entry(time).or_default();
        ensure!(
            index <= origins.len(),
            IndexOutOfBoundsSnafu {
                index: index.to_string()
            }
        );
        ensure!(
            !origins.iter().any(|o| o.is_similar(origin, EPSILON)),
            DuplicateSliceSnafu {
                origin: origin.to_string(),
                time,
            }
        );
        origins.insert(index, origin);
        let count = origins.len();

        let mut position = index;
        if !strictly_decreasing(normal, &origins[..]) {
            debug!("Origin {} breaks slice order, sorting slices", origin);
            let mut tagged: Vec<(usize, Point3D)> = origins.drain(..).enumerate().collect();
            tagged.sort_by(|a, b| projection(normal, b.1).total_cmp(&projection(normal, a.1)));
            position = tagged.iter().position(|(i, _)| *i == index).unwrap_or(index);
            origins.extend(tagged.into_iter().map(|(_, o)| o));
        }

        if count > self.size.dim_size(2) {
            self.size.set_dim_size(2, count);
        }
        self.initial_time = self.initial_time.min(time);
        Ok(position)
    }

    /// Add a new time point made of one slice.
    pub fn append_frame(&mut self, origin: Point3D, time: u32) -> Result<()> {
        ensure!(
            !self.origins.contains_key(&time),
            IndexOutOfBoundsSnafu {
                index: format!("time {}", time)
            }
        );
        self.origins.insert(time, vec![origin]);
        let times = self.origins.len();
        self.size.set_dim_size(3, times);
        self.initial_time = self.initial_time.min(time);
        Ok(())
    }

    /// Whether an index lies inside the geometry.
    pub fn is_in_bounds(&self, index: &Index) -> bool {
        self.size.is_in_bounds(index, None)
    }

    /// Like [`is_in_bounds`](Self::is_in_bounds),
    /// checking only the given dimensions.
    pub fn is_in_bounds_along(&self, index: &Index, dimensions: &[usize]) -> bool {
        self.size.is_in_bounds(index, Some(dimensions))
    }

    /// The world position of an index.
    ///
    /// The slice and time dimensions select an origin,
    /// the column and row dimensions move along the plane.
    /// `None` if the index has no matching origin.
    pub fn index_to_world(&self, index: &Index) -> Option<Point3D> {
        let time = self.time_at(index.get(3))?;
        let origin = *self.origins(time).get(index.get(2))?;
        let offset = self.orientation.multiply_vector(Vector3D::new(
            index.get(0) as f64 * self.spacing.get(0),
            index.get(1) as f64 * self.spacing.get(1),
            0.,
        ));
        Some(origin + offset)
    }

    /// The index closest to a world point at a time point.
    ///
    /// `None` if the orientation has no inverse, the time point is
    /// unknown, or the point falls outside of the image plane.
    pub fn world_to_index(&self, point: Point3D, time: u32) -> Option<Index> {
        let inverse = self.orientation.inverse()?;
        let time_position = self.time_position(time)?;
        let origins = self.origins(time);
        let k = (0..origins.len()).min_by(|&a, &b| {
            point
                .distance(origins[a])
                .total_cmp(&point.distance(origins[b]))
        })?;
        let local = inverse.multiply_vector(point - origins[k]);
        let i = (local.x / self.spacing.get(0)).round();
        let j = (local.y / self.spacing.get(1)).round();
        if i < 0. || j < 0. {
            return None;
        }
        let mut values = vec![i as usize, j as usize, k];
        if self.size.len() > 3 {
            values.push(time_position);
        }
        Some(Index::new(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axial(z: f64) -> Geometry {
        Geometry::new(
            Point3D::new(0., 0., z),
            Size::new(vec![4, 4, 1]),
            Spacing::new(vec![0.5, 0.5, 1.]),
            Matrix33::IDENTITY,
            0,
        )
    }

    #[test]
    fn size_offsets() {
        let size = Size::new(vec![4, 3, 2]);
        assert_eq!(size.total_size(0), 24);
        assert_eq!(size.total_size(2), 2);
        let index = Index::new(vec![1, 2, 1]);
        assert_eq!(size.index_to_offset(&index), 1 + 2 * 4 + 12);
        assert_eq!(size.offset_to_index(21), index);
        assert!(size.is_in_bounds(&index, None));
        assert!(!size.is_in_bounds(&Index::new(vec![4, 0, 0]), None));
        assert!(!size.is_in_bounds(&Index::new(vec![0, 0, 0, 1]), None));
        assert!(size.is_in_bounds(&Index::new(vec![0, 0, 7]), Some(&[0, 1][..])));
        assert!(size.can_scroll(2));
        assert!(!size.can_scroll(3));
    }

    #[test]
    fn slices_are_ordered_by_decreasing_position() {
        let mut geometry = axial(10.);
        for z in [5., 20., 15., 0.] {
            let p = Point3D::new(0., 0., z);
            let index = geometry.get_slice_index(p, 0);
            let position = geometry.append_origin(p, index, 0).unwrap();
            assert_eq!(position, index);
        }
        let z: Vec<f64> = geometry.origins(0).iter().map(|o| o.z).collect();
        assert_eq!(z, vec![20., 15., 10., 5., 0.]);
        assert_eq!(geometry.size().dim_size(2), 5);
        assert_eq!(geometry.origin(), Point3D::new(0., 0., 0.));
        assert_eq!(geometry.get_slice_index(Point3D::new(0., 0., 15.), 0), 1);
    }

    #[test]
    fn misplaced_origin_is_sorted() {
        let mut geometry = axial(10.);
        // inserting 20 after 10 breaks the order
        let position = geometry
            .append_origin(Point3D::new(0., 0., 20.), 1, 0)
            .unwrap();
        assert_eq!(position, 0);
        assert!(geometry.is_sorted(0));
        assert!(geometry.append_origin(Point3D::default(), 5, 0).is_err());
    }

    #[test]
    fn duplicate_origin_is_rejected() {
        let mut geometry = axial(10.);
        geometry
            .append_origin(Point3D::new(0., 0., 5.), 1, 0)
            .unwrap();
        let again = Point3D::new(0., 0., 5. + EPSILON / 2.);
        let index = geometry.get_slice_index(again, 0);
        assert!(matches!(
            geometry.append_origin(again, index, 0),
            Err(crate::error::Error::DuplicateSlice { .. })
        ));
        assert_eq!(geometry.number_of_slices(0), 2);
        assert!(geometry.is_sorted(0));
    }

    #[test]
    fn append_frame_adds_one_slice() {
        let mut geometry = axial(10.);
        assert_eq!(geometry.current_total_number_of_slices(), 1);
        geometry.append_frame(Point3D::new(0., 0., 10.), 1).unwrap();
        assert_eq!(geometry.current_total_number_of_slices(), 2);
        assert_eq!(geometry.size().dim_size(3), 2);
        assert_eq!(geometry.current_number_of_slices_before_time(1), 1);
        assert!(geometry.is_sorted(0) && geometry.is_sorted(1));
        assert!(geometry.append_frame(Point3D::default(), 1).is_err());
    }

    #[test]
    fn world_index_round_trip() {
        let mut geometry = axial(10.);
        geometry
            .append_origin(Point3D::new(0., 0., 8.), 1, 0)
            .unwrap();
        let index = Index::new(vec![3, 2, 1]);
        let world = geometry.index_to_world(&index).unwrap();
        assert!(world.is_similar(Point3D::new(1.5, 1., 8.), EPSILON));
        assert_eq!(geometry.world_to_index(world, 0), Some(index));
        assert_eq!(geometry.world_to_index(world, 3), None);
        assert_eq!(geometry.index_to_world(&Index::new(vec![0, 0, 2])), None);
    }

    #[test]
    fn singular_orientation_has_no_index() {
        let geometry = Geometry::new(
            Point3D::default(),
            Size::new(vec![2, 2, 1]),
            Spacing::default(),
            Matrix33::new([0.; 9]),
            0,
        );
        assert_eq!(geometry.world_to_index(Point3D::default(), 0), None);
    }
}
