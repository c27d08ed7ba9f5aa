//! Axis-aligned bounds.

use nalgebra::{Point3, Vector3};

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Smallest coordinate on each axis.
    pub min: Point3<f64>,
    /// Largest coordinate on each axis.
    pub max: Point3<f64>,
}

impl BoundingBox {
    /// Compute the bounds of a set of points. Returns `None` for an empty set.
    pub fn from_points<It>(points: It) -> Option<Self>
    where
        It: IntoIterator<Item = Point3<f64>>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), p| (min.inf(&p), max.sup(&p)));
        Some(Self { min, max })
    }

    /// Center of the box.
    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Extent along each axis.
    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }
}
