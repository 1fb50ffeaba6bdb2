//! Prototypes: the shape-and-type metadata a source or cell advertises.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::element::{NumericType, SampleKind};

/// Describes the values a source yields: one storage type (and optional
/// nodata fill) per component, plus the names of the axes the source spans.
/// Scalar sources have exactly one component; vector sources one per
/// component of the sampled value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prototype {
    types: Vec<NumericType>,
    nodata: Vec<Option<f64>>,
    dims: Vec<String>,
    #[serde(default)]
    attrs: HashMap<String, String>,
}

impl Prototype {
    /// A single-component prototype.
    pub fn scalar(ty: NumericType, dims: &[String]) -> Prototype {
        Prototype {
            types: vec![ty],
            nodata: vec![None],
            dims: dims.to_vec(),
            attrs: HashMap::new(),
        }
    }

    /// A multi-component prototype with one type per component.
    pub fn vector(types: &[NumericType], dims: &[String]) -> Prototype {
        Prototype {
            types: types.to_vec(),
            nodata: vec![None; types.len()],
            dims: dims.to_vec(),
            attrs: HashMap::new(),
        }
    }

    /// Concatenate several prototypes into one multi-component prototype.
    /// The axis names come from the caller; the parts keep their component
    /// types and nodata fills in order.
    pub fn combine(parts: &[Prototype], dims: &[String]) -> Prototype {
        let mut types = Vec::new();
        let mut nodata = Vec::new();
        for part in parts {
            types.extend_from_slice(&part.types);
            nodata.extend_from_slice(&part.nodata);
        }
        Prototype {
            types,
            nodata,
            dims: dims.to_vec(),
            attrs: HashMap::new(),
        }
    }

    /// Retype every component.
    pub fn convert(&mut self, ty: NumericType) {
        for t in &mut self.types {
            *t = ty;
        }
    }

    pub fn with_dims(mut self, dims: &[String]) -> Prototype {
        self.dims = dims.to_vec();
        self
    }

    pub fn with_nodata(mut self, component: usize, fill: f64) -> Prototype {
        self.nodata[component] = Some(fill);
        self
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Prototype {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn set_dims(&mut self, dims: &[String]) {
        self.dims = dims.to_vec();
    }

    pub fn kind(&self) -> SampleKind {
        if self.types.len() == 1 {
            SampleKind::Scalar
        } else {
            SampleKind::Vector
        }
    }

    pub fn component_count(&self) -> usize {
        self.types.len()
    }

    pub fn types(&self) -> &[NumericType] {
        &self.types
    }

    pub fn nodata(&self, component: usize) -> Option<f64> {
        self.nodata[component]
    }

    pub fn dims(&self) -> &[String] {
        &self.dims
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn combine_concatenates_components() {
        let a = Prototype::scalar(NumericType::I16, &dims(&["y", "x"])).with_nodata(0, -999.0);
        let b = Prototype::scalar(NumericType::F32, &dims(&["y", "x"]));
        let c = Prototype::combine(&[a, b], &dims(&["y", "x"]));
        assert_eq!(c.component_count(), 2);
        assert_eq!(c.types(), &[NumericType::I16, NumericType::F32]);
        assert_eq!(c.nodata(0), Some(-999.0));
        assert_eq!(c.nodata(1), None);
        assert_eq!(c.kind(), SampleKind::Vector);
    }

    #[test]
    fn convert_retypes_every_component() {
        let mut p = Prototype::vector(&[NumericType::I8, NumericType::I64], &dims(&["x"]));
        p.convert(NumericType::F64);
        assert_eq!(p.types(), &[NumericType::F64, NumericType::F64]);
    }
}
