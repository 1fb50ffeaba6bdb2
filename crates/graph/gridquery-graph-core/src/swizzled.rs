//! Rank-adapting source wrappers.
//!
//! Wrapping a source changes its apparent rank: bounds and axis names are
//! swizzled up front, and every coordinate passed in is mapped back through
//! the inverse swizzle before delegating. A promoted source gains leading
//! virtual axes with zero extent; a demoted source is always sampled at
//! zero on its dropped leading axes.

use std::rc::Rc;

use gridquery_api_core::{
    BoxReal, PixelSource, Prototype, Sample, SampleKind, SourceError, SourceRef, Swizzle,
    VectorReal,
};

#[derive(Debug)]
struct Resampled {
    source: SourceRef,
    /// Maps incoming (target-rank) coordinates to the source's rank.
    inverse: Swizzle,
    bounds: BoxReal,
    prototype: Prototype,
}

impl Resampled {
    fn new(source: SourceRef, target_rank: usize) -> Resampled {
        let forward = Swizzle::resize(source.rank(), target_rank);
        let bounds = forward.apply_box(source.bounds());
        let mut prototype = source.prototype().clone();
        prototype.set_dims(&forward.apply_names(source.prototype().dims()));
        Resampled {
            inverse: forward.invert(),
            bounds,
            prototype,
            source,
        }
    }

    fn sample(&self, co: &VectorReal) -> Result<Sample, SourceError> {
        self.source.sample(&self.inverse.apply(co))
    }
}

/// A scalar source viewed at a different rank.
#[derive(Debug)]
pub struct SwizzledScalar {
    inner: Resampled,
}

impl SwizzledScalar {
    pub fn new(source: SourceRef, target_rank: usize) -> SwizzledScalar {
        SwizzledScalar {
            inner: Resampled::new(source, target_rank),
        }
    }
}

impl PixelSource for SwizzledScalar {
    fn sample(&self, co: &VectorReal) -> Result<Sample, SourceError> {
        self.inner.sample(co)
    }

    fn bounds(&self) -> &BoxReal {
        &self.inner.bounds
    }

    fn prototype(&self) -> &Prototype {
        &self.inner.prototype
    }

    fn label(&self) -> String {
        format!("swizzled({})", self.inner.source.label())
    }
}

/// A vector source viewed at a different rank.
#[derive(Debug)]
pub struct SwizzledVector {
    inner: Resampled,
}

impl SwizzledVector {
    pub fn new(source: SourceRef, target_rank: usize) -> SwizzledVector {
        SwizzledVector {
            inner: Resampled::new(source, target_rank),
        }
    }
}

impl PixelSource for SwizzledVector {
    fn sample(&self, co: &VectorReal) -> Result<Sample, SourceError> {
        self.inner.sample(co)
    }

    fn bounds(&self) -> &BoxReal {
        &self.inner.bounds
    }

    fn prototype(&self) -> &Prototype {
        &self.inner.prototype
    }

    fn label(&self) -> String {
        format!("swizzled({})", self.inner.source.label())
    }
}

/// Wrap a source so it presents the target rank, preserving its
/// scalar/vector kind.
pub fn wrap_to_rank(source: SourceRef, target_rank: usize) -> SourceRef {
    match source.kind() {
        SampleKind::Scalar => Rc::new(SwizzledScalar::new(source, target_rank)),
        SampleKind::Vector => Rc::new(SwizzledVector::new(source, target_rank)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridquery_api_core::{GridSource, VectorInt};

    fn dims(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn grid_2d() -> SourceRef {
        // 2x2 grid: values row-major 0..4.
        Rc::new(GridSource::new(
            "g",
            VectorInt::of(&[2, 2]),
            &dims(&["y", "x"]),
            vec![0.0, 1.0, 2.0, 3.0],
        ))
    }

    #[test]
    fn promotion_adds_a_degenerate_leading_axis() {
        let wrapped = wrap_to_rank(grid_2d(), 3);
        assert_eq!(wrapped.rank(), 3);
        assert_eq!(wrapped.bounds().size().get(0), 0.0);
        assert_eq!(wrapped.prototype().dims(), &dims(&["", "y", "x"])[..]);

        // The leading component of the coordinate is ignored.
        let v = wrapped.sample(&VectorReal::of(&[7.0, 1.5, 0.5])).unwrap();
        assert_eq!(v, Sample::Scalar(2.0));
    }

    #[test]
    fn demotion_samples_the_first_slice() {
        // 2x2x2 grid, slice 0 holds 0..4, slice 1 holds 10..14.
        let grid: SourceRef = Rc::new(GridSource::new(
            "g3",
            VectorInt::of(&[2, 2, 2]),
            &dims(&["time", "y", "x"]),
            vec![0.0, 1.0, 2.0, 3.0, 10.0, 11.0, 12.0, 13.0],
        ));
        let wrapped = wrap_to_rank(grid, 2);
        assert_eq!(wrapped.rank(), 2);
        assert_eq!(wrapped.prototype().dims(), &dims(&["y", "x"])[..]);
        let v = wrapped.sample(&VectorReal::of(&[1.5, 0.5])).unwrap();
        assert_eq!(v, Sample::Scalar(2.0));
    }

    #[test]
    fn same_rank_wrapping_is_transparent() {
        let wrapped = wrap_to_rank(grid_2d(), 2);
        let v = wrapped.sample(&VectorReal::of(&[0.5, 1.5])).unwrap();
        assert_eq!(v, Sample::Scalar(1.0));
        assert_eq!(wrapped.bounds(), grid_2d().bounds());
    }
}
