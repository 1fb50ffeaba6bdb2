//! Graph definition types.
//!
//! These are the already-parsed form of a declarative query: hosts produce
//! them however they like (JSON, a UI, code) and hand them to the builder.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use gridquery_api_core::{BoxReal, VectorReal};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GraphDef {
    pub nodes: Vec<NodeDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDef {
    pub id: String,
    /// Registered kernel kind.
    pub kind: String,
    #[serde(default)]
    pub params: HashMap<String, ParamValue>,
    /// Input port name to one or more source references.
    #[serde(default)]
    pub inputs: HashMap<String, InputDef>,
    /// Explicit bounds, for kernels that do not derive their shape from an
    /// input.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<BoundsDef>,
}

/// One or many references; a list combines into a vector-typed source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputDef {
    One(InputRef),
    Many(Vec<InputRef>),
}

impl InputDef {
    pub fn refs(&self) -> &[InputRef] {
        match self {
            InputDef::One(r) => std::slice::from_ref(r),
            InputDef::Many(rs) => rs,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputRef {
    /// A dataset-backed layer registered with the builder.
    Layer { layer: String },
    /// Another node's output socket.
    Socket {
        node: String,
        #[serde(default = "default_output_port")]
        output: String,
    },
}

fn default_output_port() -> String {
    "output".to_string()
}

/// A literal value bound to a kernel parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl ParamValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Int(v) => Some(*v as f64),
            ParamValue::Float(v) => Some(*v),
            ParamValue::Text(_) => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParamValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Text(v) => Some(v),
            _ => None,
        }
    }
}

/// Explicit node bounds: min/max corners plus axis names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundsDef {
    pub min: Vec<f64>,
    pub max: Vec<f64>,
    #[serde(default)]
    pub dims: Vec<String>,
}

impl BoundsDef {
    pub fn to_box(&self) -> BoxReal {
        BoxReal::from_corners(VectorReal::of(&self.min), VectorReal::of(&self.max))
    }
}
