//! Static port schemas for kernels.
//!
//! Each kernel type carries a fixed table describing its ports: direction,
//! scalar/vector kind, rank constraints and output cell types. The engine
//! binds and introspects ports exclusively through this table, so the
//! constraint a kernel author declares sits right next to the port it
//! constrains, without any runtime field lookup.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PortKind {
    Scalar,
    Vector,
    /// Accepts either; the bound source decides.
    Any,
}

/// Rank constraint for one input port.
///
/// `group` names the constraint-sharing group; ports in the same group are
/// resolved to a single common rank. The empty string means the port is a
/// group of its own.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RankConstraint {
    pub group: &'static str,
    /// May this port's input be rank-promoted to match the group?
    pub promote: bool,
    /// May this port's input be rank-demoted to match the group?
    pub demote: bool,
    /// Exact rank; overrides the bounds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lower_bound: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upper_bound: Option<usize>,
}

impl RankConstraint {
    pub const DEFAULT: RankConstraint = RankConstraint {
        group: "",
        promote: false,
        demote: false,
        is: None,
        lower_bound: None,
        upper_bound: None,
    };

    /// The group this constraint belongs to, defaulting to the port name.
    pub fn group_for(&self, port: &'static str) -> &'static str {
        if self.group.is_empty() {
            port
        } else {
            self.group
        }
    }
}

impl Default for RankConstraint {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct InputSpec {
    pub id: &'static str,
    pub kind: PortKind,
    pub rank: RankConstraint,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct OutputSpec {
    pub id: &'static str,
    /// Cell type declaration: a numeric type name ("f64"), the name of a
    /// port to inherit the type from ("input_a"), or a comma-separated list
    /// of either combining per-component declarations into a vector type.
    pub cell_type: &'static str,
}

/// Declares how a kernel derives its own shape: take the named input's
/// bounds and drop `reduce_by` leading axes.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct InheritDims {
    pub from: &'static str,
    pub reduce_by: usize,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct KernelSignature {
    pub name: &'static str,
    pub description: &'static str,
    pub inputs: &'static [InputSpec],
    pub outputs: &'static [OutputSpec],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inherit_dims: Option<InheritDims>,
}

impl KernelSignature {
    pub fn input(&self, id: &str) -> Option<&InputSpec> {
        self.inputs.iter().find(|s| s.id == id)
    }

    pub fn output(&self, id: &str) -> Option<&OutputSpec> {
        self.outputs.iter().find(|s| s.id == id)
    }
}
