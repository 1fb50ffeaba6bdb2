//! Axis remapping between ranks.
//!
//! A swizzle moves components from a rank-R space into a rank-R' space.
//! Demotion keeps the trailing axes (the horizontal ones), dropping leading
//! axes such as time; promotion inserts leading virtual axes whose value is
//! always zero. The same mapping applies to coordinates, boxes and axis
//! names, so a promoted source's bounds gain zero-extent leading axes.

use crate::bounds::BoxReal;
use crate::vector::{VectorInt, VectorReal};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AxisOp {
    /// Copy source component `i`.
    Take(usize),
    /// A virtual axis: reads as zero, writes are discarded.
    Zero,
}

/// A stateless mapping from one rank to another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Swizzle {
    from_rank: usize,
    ops: Vec<AxisOp>,
}

impl Swizzle {
    /// A swizzle that converts rank `from` to rank `to`. When demoting
    /// (`to <= from`) the last `to` source axes are kept; when promoting the
    /// output is left-padded with zero-valued virtual axes.
    pub fn resize(from: usize, to: usize) -> Swizzle {
        let ops = if to <= from {
            (from - to..from).map(AxisOp::Take).collect()
        } else {
            let mut ops = vec![AxisOp::Zero; to - from];
            ops.extend((0..from).map(AxisOp::Take));
            ops
        };
        Swizzle {
            from_rank: from,
            ops,
        }
    }

    pub fn from_rank(&self) -> usize {
        self.from_rank
    }

    pub fn to_rank(&self) -> usize {
        self.ops.len()
    }

    /// The opposite mapping: from and to are reversed. Components a
    /// promotion invented are dropped again; components a demotion dropped
    /// come back as zero.
    pub fn invert(&self) -> Swizzle {
        let mut ops = vec![AxisOp::Zero; self.from_rank];
        for (target, op) in self.ops.iter().enumerate() {
            if let AxisOp::Take(source) = op {
                ops[*source] = AxisOp::Take(target);
            }
        }
        Swizzle {
            from_rank: self.to_rank(),
            ops,
        }
    }

    pub fn apply(&self, source: &VectorReal) -> VectorReal {
        assert_eq!(source.rank(), self.from_rank, "rank mismatch in swizzle");
        let mut out = VectorReal::zeros(self.to_rank());
        for (i, op) in self.ops.iter().enumerate() {
            if let AxisOp::Take(j) = op {
                out.set(i, source.get(*j));
            }
        }
        out
    }

    pub fn apply_int(&self, source: &VectorInt) -> VectorInt {
        assert_eq!(source.rank(), self.from_rank, "rank mismatch in swizzle");
        let mut out = VectorInt::zeros(self.to_rank());
        for (i, op) in self.ops.iter().enumerate() {
            if let AxisOp::Take(j) = op {
                out.set(i, source.get(*j));
            }
        }
        out
    }

    /// Swizzle min and max independently.
    pub fn apply_box(&self, source: &BoxReal) -> BoxReal {
        BoxReal::from_corners(self.apply(source.min()), self.apply(source.max()))
    }

    /// Reindex axis names; virtual axes get an empty name.
    pub fn apply_names(&self, source: &[String]) -> Vec<String> {
        assert_eq!(source.len(), self.from_rank, "rank mismatch in swizzle");
        self.ops
            .iter()
            .map(|op| match op {
                AxisOp::Take(j) => source[*j].clone(),
                AxisOp::Zero => String::new(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_resize_is_a_no_op() {
        for rank in 1..=4 {
            let v = VectorReal::of(&[3.0, 5.0, 7.0, 9.0][..rank]);
            assert_eq!(Swizzle::resize(rank, rank).apply(&v), v);
        }
    }

    #[test]
    fn demotion_keeps_trailing_axes() {
        let swiz = Swizzle::resize(3, 2);
        let v = swiz.apply(&VectorReal::of(&[1.0, 2.0, 3.0]));
        assert_eq!(v, VectorReal::of(&[2.0, 3.0]));
    }

    #[test]
    fn promotion_left_pads_with_zero() {
        let swiz = Swizzle::resize(2, 3);
        let v = swiz.apply(&VectorReal::of(&[2.0, 3.0]));
        assert_eq!(v, VectorReal::of(&[0.0, 2.0, 3.0]));
    }

    #[test]
    fn demote_then_promote_does_not_round_trip() {
        let original = VectorReal::of(&[1.0, 2.0, 3.0]);
        let demoted = Swizzle::resize(3, 2).apply(&original);
        let back = Swizzle::resize(2, 3).apply(&demoted);
        // The dropped leading axis is gone for good; it comes back as zero.
        assert_eq!(back, VectorReal::of(&[0.0, 2.0, 3.0]));
    }

    #[test]
    fn invert_reverses_a_promotion() {
        let promote = Swizzle::resize(2, 4);
        let demote = promote.invert();
        assert_eq!(demote.from_rank(), 4);
        assert_eq!(demote.to_rank(), 2);
        let v = demote.apply(&VectorReal::of(&[9.0, 8.0, 1.0, 2.0]));
        assert_eq!(v, VectorReal::of(&[1.0, 2.0]));
    }

    #[test]
    fn boxes_swizzle_both_corners() {
        let swiz = Swizzle::resize(2, 3);
        let b = BoxReal::from_corners(VectorReal::of(&[1.0, 2.0]), VectorReal::of(&[5.0, 6.0]));
        let out = swiz.apply_box(&b);
        assert_eq!(out.min(), &VectorReal::of(&[0.0, 1.0, 2.0]));
        assert_eq!(out.max(), &VectorReal::of(&[0.0, 5.0, 6.0]));
        // The virtual leading axis has zero extent.
        assert_eq!(out.size().get(0), 0.0);
    }

    #[test]
    fn names_follow_the_same_mapping() {
        let dims = vec!["time".to_string(), "y".to_string(), "x".to_string()];
        let down = Swizzle::resize(3, 2).apply_names(&dims);
        assert_eq!(down, vec!["y".to_string(), "x".to_string()]);
        let up = Swizzle::resize(3, 4).apply_names(&dims);
        assert_eq!(
            up,
            vec![
                String::new(),
                "time".to_string(),
                "y".to_string(),
                "x".to_string()
            ]
        );
    }
}
