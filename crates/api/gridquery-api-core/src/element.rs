//! Numeric storage types and sampled values.

use serde::{Deserialize, Serialize};

/// Storage type of one component of a variable or cell. The engine computes
/// in f64 throughout; these tags describe how values are stored and how
/// inherited cell types combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumericType {
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
}

impl NumericType {
    /// Look up a type by declaration name. Accepts both the native names
    /// ("i16", "f32", ...) and the storage-format aliases ("short",
    /// "float", ...).
    pub fn parse(decl: &str) -> Option<NumericType> {
        match decl {
            "i8" | "byte" => Some(NumericType::I8),
            "i16" | "short" => Some(NumericType::I16),
            "i32" | "int" => Some(NumericType::I32),
            "i64" | "long" => Some(NumericType::I64),
            "f32" | "float" => Some(NumericType::F32),
            "f64" | "double" => Some(NumericType::F64),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            NumericType::I8 => "i8",
            NumericType::I16 => "i16",
            NumericType::I32 => "i32",
            NumericType::I64 => "i64",
            NumericType::F32 => "f32",
            NumericType::F64 => "f64",
        }
    }

    pub fn is_float(&self) -> bool {
        matches!(self, NumericType::F32 | NumericType::F64)
    }

    fn width(&self) -> usize {
        match self {
            NumericType::I8 => 1,
            NumericType::I16 => 2,
            NumericType::I32 | NumericType::F32 => 4,
            NumericType::I64 | NumericType::F64 => 8,
        }
    }

    /// Widening combination: the result can represent values of either
    /// operand. Any float operand makes the result float.
    pub fn combine(&self, other: NumericType) -> NumericType {
        let width = self.width().max(other.width());
        if self.is_float() || other.is_float() {
            if width <= 4 {
                NumericType::F32
            } else {
                NumericType::F64
            }
        } else {
            match width {
                1 => NumericType::I8,
                2 => NumericType::I16,
                4 => NumericType::I32,
                _ => NumericType::I64,
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleKind {
    Scalar,
    Vector,
}

/// The value produced by sampling one coordinate: a scalar or a
/// fixed-arity vector of components.
#[derive(Debug, Clone, PartialEq)]
pub enum Sample {
    Scalar(f64),
    Vector(Vec<f64>),
}

impl Sample {
    pub fn kind(&self) -> SampleKind {
        match self {
            Sample::Scalar(_) => SampleKind::Scalar,
            Sample::Vector(_) => SampleKind::Vector,
        }
    }

    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Sample::Scalar(v) => Some(*v),
            Sample::Vector(_) => None,
        }
    }

    pub fn components(&self) -> &[f64] {
        match self {
            Sample::Scalar(v) => std::slice::from_ref(v),
            Sample::Vector(vs) => vs,
        }
    }

    /// Apply a function to every component.
    pub fn map(&self, op: impl Fn(f64) -> f64) -> Sample {
        match self {
            Sample::Scalar(v) => Sample::Scalar(op(*v)),
            Sample::Vector(vs) => Sample::Vector(vs.iter().map(|v| op(*v)).collect()),
        }
    }

    /// Component-wise combination of two samples. A scalar operand
    /// broadcasts across a vector one.
    pub fn zip_with(&self, other: &Sample, op: impl Fn(f64, f64) -> f64) -> Sample {
        match (self, other) {
            (Sample::Scalar(a), Sample::Scalar(b)) => Sample::Scalar(op(*a, *b)),
            (Sample::Vector(a), Sample::Scalar(b)) => {
                Sample::Vector(a.iter().map(|v| op(*v, *b)).collect())
            }
            (Sample::Scalar(a), Sample::Vector(b)) => {
                Sample::Vector(b.iter().map(|v| op(*a, *v)).collect())
            }
            (Sample::Vector(a), Sample::Vector(b)) => {
                assert_eq!(a.len(), b.len(), "component count mismatch in zip_with");
                Sample::Vector(a.iter().zip(b).map(|(x, y)| op(*x, *y)).collect())
            }
        }
    }

    pub fn add_of(a: &Sample, b: &Sample) -> Sample {
        a.zip_with(b, |x, y| x + y)
    }

    pub fn max_of(a: &Sample, b: &Sample) -> Sample {
        a.zip_with(b, f64::max)
    }

    pub fn min_of(a: &Sample, b: &Sample) -> Sample {
        a.zip_with(b, f64::min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_aliases() {
        assert_eq!(NumericType::parse("short"), Some(NumericType::I16));
        assert_eq!(NumericType::parse("f64"), Some(NumericType::F64));
        assert_eq!(NumericType::parse("complex"), None);
    }

    #[test]
    fn combine_widens() {
        assert_eq!(
            NumericType::I8.combine(NumericType::I32),
            NumericType::I32
        );
        assert_eq!(
            NumericType::I16.combine(NumericType::F32),
            NumericType::F32
        );
        assert_eq!(
            NumericType::I64.combine(NumericType::F32),
            NumericType::F64
        );
    }

    #[test]
    fn scalars_broadcast_across_vectors() {
        let v = Sample::Vector(vec![1.0, 5.0]);
        let s = Sample::Scalar(3.0);
        assert_eq!(Sample::max_of(&v, &s), Sample::Vector(vec![3.0, 5.0]));
        assert_eq!(Sample::add_of(&s, &v), Sample::Vector(vec![4.0, 8.0]));
    }
}
