//! Points, vectors, 3x3 matrices and multi-dimensional indices.
use std::fmt;
use std::ops::{Add, Sub};

/// Tolerance used when comparing world coordinates.
pub const EPSILON: f64 = 1e-4;

fn is_similar(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance
}

/// A point in 3D world space, in millimetres.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Point3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3D {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Point3D { x, y, z }
    }

    pub fn from_slice(values: &[f64]) -> Option<Self> {
        match values {
            [x, y, z, ..] => Some(Point3D::new(*x, *y, *z)),
            _ => None,
        }
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    pub fn distance(self, other: Point3D) -> f64 {
        (other - self).norm()
    }

    pub fn is_similar(self, other: Point3D, tolerance: f64) -> bool {
        is_similar(self.x, other.x, tolerance)
            && is_similar(self.y, other.y, tolerance)
            && is_similar(self.z, other.z, tolerance)
    }
}

impl Sub for Point3D {
    type Output = Vector3D;

    fn sub(self, rhs: Point3D) -> Vector3D {
        Vector3D::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Add<Vector3D> for Point3D {
    type Output = Point3D;

    fn add(self, rhs: Vector3D) -> Point3D {
        Point3D::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl fmt::Display for Point3D {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// A direction in 3D world space.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Vector3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3D {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Vector3D { x, y, z }
    }

    pub fn norm(self) -> f64 {
        self.dot(self).sqrt()
    }

    pub fn dot(self, other: Vector3D) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vector3D) -> Vector3D {
        Vector3D::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn is_similar(self, other: Vector3D, tolerance: f64) -> bool {
        is_similar(self.x, other.x, tolerance)
            && is_similar(self.y, other.y, tolerance)
            && is_similar(self.z, other.z, tolerance)
    }
}

impl fmt::Display for Vector3D {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// A 3x3 matrix stored in row-major order.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Matrix33 {
    values: [f64; 9],
}

impl Default for Matrix33 {
    fn default() -> Self {
        Matrix33::IDENTITY
    }
}

impl Matrix33 {
    pub const IDENTITY: Matrix33 = Matrix33 {
        values: [1., 0., 0., 0., 1., 0., 0., 0., 1.],
    };

    pub const fn new(values: [f64; 9]) -> Self {
        Matrix33 { values }
    }

    /// Build the orientation matrix of an image plane
    /// from its row and column direction cosines.
    ///
    /// The columns of the matrix are the row direction,
    /// the column direction and the plane normal.
    pub fn from_cosines(row: Vector3D, column: Vector3D) -> Self {
        let normal = row.cross(column);
        Matrix33::new([
            row.x, column.x, normal.x, //
            row.y, column.y, normal.y, //
            row.z, column.z, normal.z,
        ])
    }

    pub fn get(&self, row: usize, column: usize) -> f64 {
        self.values[row * 3 + column]
    }

    pub fn values(&self) -> &[f64; 9] {
        &self.values
    }

    pub fn column(&self, column: usize) -> Vector3D {
        Vector3D::new(self.get(0, column), self.get(1, column), self.get(2, column))
    }

    pub fn determinant(&self) -> f64 {
        let m = &self.values;
        m[0] * (m[4] * m[8] - m[5] * m[7]) - m[1] * (m[3] * m[8] - m[5] * m[6])
            + m[2] * (m[3] * m[7] - m[4] * m[6])
    }

    /// The inverse of the matrix, `None` if it is singular.
    pub fn inverse(&self) -> Option<Matrix33> {
        let det = self.determinant();
        if det == 0. || !det.is_finite() {
            return None;
        }
        let m = &self.values;
        let inv = [
            m[4] * m[8] - m[5] * m[7],
            m[2] * m[7] - m[1] * m[8],
            m[1] * m[5] - m[2] * m[4],
            m[5] * m[6] - m[3] * m[8],
            m[0] * m[8] - m[2] * m[6],
            m[2] * m[3] - m[0] * m[5],
            m[3] * m[7] - m[4] * m[6],
            m[1] * m[6] - m[0] * m[7],
            m[0] * m[4] - m[1] * m[3],
        ];
        Some(Matrix33::new(inv.map(|v| v / det)))
    }

    pub fn transpose(&self) -> Matrix33 {
        let m = &self.values;
        Matrix33::new([m[0], m[3], m[6], m[1], m[4], m[7], m[2], m[5], m[8]])
    }

    pub fn multiply(&self, rhs: &Matrix33) -> Matrix33 {
        let mut values = [0.; 9];
        for (i, v) in values.iter_mut().enumerate() {
            let (row, column) = (i / 3, i % 3);
            *v = (0..3).map(|k| self.get(row, k) * rhs.get(k, column)).sum();
        }
        Matrix33::new(values)
    }

    pub fn multiply_array(&self, v: [f64; 3]) -> [f64; 3] {
        [
            self.get(0, 0) * v[0] + self.get(0, 1) * v[1] + self.get(0, 2) * v[2],
            self.get(1, 0) * v[0] + self.get(1, 1) * v[1] + self.get(1, 2) * v[2],
            self.get(2, 0) * v[0] + self.get(2, 1) * v[1] + self.get(2, 2) * v[2],
        ]
    }

    pub fn multiply_vector(&self, v: Vector3D) -> Vector3D {
        let [x, y, z] = self.multiply_array([v.x, v.y, v.z]);
        Vector3D::new(x, y, z)
    }

    pub fn is_similar(&self, other: &Matrix33, tolerance: f64) -> bool {
        self.values
            .iter()
            .zip(other.values.iter())
            .all(|(a, b)| is_similar(*a, *b, tolerance))
    }

    /// The row index of the largest absolute value of the third column,
    /// that is the world axis closest to the plane normal.
    pub fn third_column_major_direction(&self) -> usize {
        (0..3)
            .max_by(|&a, &b| self.get(a, 2).abs().total_cmp(&self.get(b, 2).abs()))
            .unwrap_or(2)
    }
}

impl fmt::Display for Matrix33 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let m = &self.values;
        write!(
            f,
            "[{}, {}, {}; {}, {}, {}; {}, {}, {}]",
            m[0], m[1], m[2], m[3], m[4], m[5], m[6], m[7], m[8]
        )
    }
}

/// A position in an image, one value per dimension:
/// column, row, slice, then time.
#[derive(Debug, Clone, Eq, Hash, PartialEq)]
pub struct Index(Vec<usize>);

impl Index {
    pub fn new(values: impl Into<Vec<usize>>) -> Self {
        Index(values.into())
    }

    /// The origin index of the given dimension count.
    pub fn zeros(dimensions: usize) -> Self {
        Index(vec![0; dimensions])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The value along a dimension, zero if the index has fewer dimensions.
    pub fn get(&self, dimension: usize) -> usize {
        self.0.get(dimension).copied().unwrap_or(0)
    }

    pub fn values(&self) -> &[usize] {
        &self.0
    }

    /// A copy of this index with a different value along one dimension,
    /// growing the index if needed.
    pub fn with(&self, dimension: usize, value: usize) -> Index {
        let mut values = self.0.clone();
        if values.len() <= dimension {
            values.resize(dimension + 1, 0);
        }
        values[dimension] = value;
        Index(values)
    }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("(")?;
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", v)?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cross_and_dot() {
        let x = Vector3D::new(1., 0., 0.);
        let y = Vector3D::new(0., 1., 0.);
        assert_eq!(x.cross(y), Vector3D::new(0., 0., 1.));
        assert_eq!(x.dot(y), 0.);
        let p = Point3D::new(1., 2., 3.);
        assert_eq!(p - Point3D::new(1., 0., 3.), Vector3D::new(0., 2., 0.));
        assert_eq!(p.distance(Point3D::new(1., 2., 7.)), 4.);
    }

    #[test]
    fn inverse_of_rotation_is_transpose() {
        let m = Matrix33::from_cosines(Vector3D::new(0., 1., 0.), Vector3D::new(0., 0., -1.));
        let inv = m.inverse().unwrap();
        assert!(inv.is_similar(&m.transpose(), EPSILON));
        assert!(m.multiply(&inv).is_similar(&Matrix33::IDENTITY, EPSILON));
    }

    #[test]
    fn singular_matrix_has_no_inverse() {
        let m = Matrix33::new([1., 2., 3., 2., 4., 6., 0., 0., 1.]);
        assert_eq!(m.determinant(), 0.);
        assert_eq!(m.inverse(), None);
    }

    #[test]
    fn major_direction() {
        // sagittal: normal along x
        let m = Matrix33::from_cosines(Vector3D::new(0., 1., 0.), Vector3D::new(0., 0., -1.));
        assert_eq!(m.third_column_major_direction(), 0);
        assert_eq!(Matrix33::IDENTITY.third_column_major_direction(), 2);
    }

    #[test]
    fn index_with() {
        let index = Index::new(vec![1, 2, 3]);
        assert_eq!(index.with(3, 4), Index::new(vec![1, 2, 3, 4]));
        assert_eq!(index.get(5), 0);
        assert_eq!(index.to_string(), "(1, 2, 3)");
    }
}
