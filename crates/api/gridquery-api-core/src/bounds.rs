//! Axis-aligned bounding boxes.

use std::fmt;

use crate::vector::VectorReal;

/// A simple axis-aligned box: a min and max corner of equal rank.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxReal {
    min: VectorReal,
    max: VectorReal,
}

impl BoxReal {
    /// A zero-volume box at the origin.
    pub fn new(rank: usize) -> Self {
        BoxReal {
            min: VectorReal::zeros(rank),
            max: VectorReal::zeros(rank),
        }
    }

    /// A zero-volume box centred on a point.
    pub fn point(point: &VectorReal) -> Self {
        BoxReal {
            min: *point,
            max: *point,
        }
    }

    pub fn from_corners(min: VectorReal, max: VectorReal) -> Self {
        assert_eq!(min.rank(), max.rank(), "rank mismatch in box corners");
        BoxReal { min, max }
    }

    pub fn rank(&self) -> usize {
        self.min.rank()
    }

    pub fn min(&self) -> &VectorReal {
        &self.min
    }

    pub fn max(&self) -> &VectorReal {
        &self.max
    }

    pub fn set_min(&mut self, min: &VectorReal) {
        self.min.assign(min);
    }

    pub fn set_max(&mut self, max: &VectorReal) {
        self.max.assign(max);
    }

    /// Extent along each axis.
    pub fn size(&self) -> VectorReal {
        self.max.sub_new(&self.min)
    }

    /// Grow this box so that it includes `other`.
    pub fn union(&mut self, other: &BoxReal) {
        self.min.min(&other.min);
        self.max.max(&other.max);
    }

    /// Grow this box so that it includes the point `other`.
    pub fn union_point(&mut self, other: &VectorReal) {
        self.min.min(other);
        self.max.max(other);
    }

    /// Grow this box so that it includes `other`, ignoring axes on which
    /// `other` has zero extent. Axes on which this box itself is degenerate
    /// take the other box's interval outright, so a fresh zero box picks up
    /// the first real interval instead of clamping it to the origin.
    pub fn union_if_positive(&mut self, other: &BoxReal) {
        let size = self.size();
        let other_size = other.size();
        for i in 0..size.rank() {
            if other_size.get(i) <= 0.0 {
                continue;
            }
            let (lo, hi) = if size.get(i) <= 0.0 {
                (other.min.get(i), other.max.get(i))
            } else {
                (
                    self.min.get(i).min(other.min.get(i)),
                    self.max.get(i).max(other.max.get(i)),
                )
            };
            self.min.set(i, lo);
            self.max.set(i, hi);
        }
    }

    /// Shrink this box so it does not extend beyond `other`. An empty
    /// intersection leaves a zero-volume box (min clamped down to max),
    /// never an inside-out one.
    pub fn intersect(&mut self, other: &BoxReal) {
        self.min.max(&other.min);
        self.max.min(&other.max);
        self.min.min(&self.max);
    }
}

impl fmt::Display for BoxReal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Box({} - {})", self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxr(min: &[f64], max: &[f64]) -> BoxReal {
        BoxReal::from_corners(VectorReal::of(min), VectorReal::of(max))
    }

    #[test]
    fn intersect_overlapping() {
        let mut a = boxr(&[0.0, 0.0], &[10.0, 10.0]);
        a.intersect(&boxr(&[5.0, 5.0], &[20.0, 20.0]));
        assert_eq!(a, boxr(&[5.0, 5.0], &[10.0, 10.0]));
    }

    #[test]
    fn intersect_disjoint_collapses_to_zero_volume() {
        let mut a = boxr(&[0.0, 0.0], &[10.0, 10.0]);
        a.intersect(&boxr(&[20.0, 20.0], &[30.0, 30.0]));
        assert_eq!(a, boxr(&[10.0, 10.0], &[10.0, 10.0]));
    }

    #[test]
    fn union_if_positive_ignores_degenerate_axes() {
        let mut a = boxr(&[0.0, 0.0], &[10.0, 10.0]);
        // Zero extent on the first axis: only the second axis contributes.
        a.union_if_positive(&boxr(&[5.0, -5.0], &[5.0, 20.0]));
        assert_eq!(a, boxr(&[0.0, -5.0], &[10.0, 20.0]));
    }

    #[test]
    fn union_if_positive_matches_union_when_all_axes_positive() {
        let mut a = boxr(&[0.0, 0.0], &[10.0, 10.0]);
        let mut b = a.clone();
        let other = boxr(&[-1.0, 5.0], &[4.0, 20.0]);
        a.union_if_positive(&other);
        b.union(&other);
        assert_eq!(a, b);
    }

    #[test]
    fn union_if_positive_seeds_a_fresh_box() {
        let mut a = BoxReal::new(2);
        a.union_if_positive(&boxr(&[3.0, 4.0], &[8.0, 9.0]));
        assert_eq!(a, boxr(&[3.0, 4.0], &[8.0, 9.0]));
    }
}
