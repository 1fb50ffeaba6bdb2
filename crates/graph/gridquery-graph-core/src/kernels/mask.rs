//! Masking kernels.

use gridquery_api_core::{Cell, Sample, SourceError, SourceRef, VectorReal};

use crate::error::KernelError;
use crate::kernel::{attached, bound, Kernel};
use crate::schema::{InheritDims, InputSpec, KernelSignature, OutputSpec, PortKind, RankConstraint};
use crate::types::ParamValue;

/// A 1/0 mask of pixels falling inside `[lower, upper]`.
pub struct InRange {
    input: Option<SourceRef>,
    mask: Option<Cell>,
    lower: f64,
    upper: f64,
}

static IN_RANGE_SIG: KernelSignature = KernelSignature {
    name: "in_range",
    description: "Writes 1 where lower <= pixel <= upper, else 0.",
    inputs: &[InputSpec {
        id: "input",
        kind: PortKind::Scalar,
        rank: RankConstraint::DEFAULT,
    }],
    outputs: &[OutputSpec {
        id: "mask",
        cell_type: "i8",
    }],
    inherit_dims: Some(InheritDims {
        from: "input",
        reduce_by: 0,
    }),
};

impl InRange {
    pub fn new() -> InRange {
        InRange {
            input: None,
            mask: None,
            lower: f64::NEG_INFINITY,
            upper: f64::INFINITY,
        }
    }
}

impl Default for InRange {
    fn default() -> Self {
        InRange::new()
    }
}

impl Kernel for InRange {
    fn signature(&self) -> &'static KernelSignature {
        &IN_RANGE_SIG
    }

    fn input(&self, port: &str) -> Option<SourceRef> {
        match port {
            "input" => self.input.clone(),
            _ => None,
        }
    }

    fn bind_input(&mut self, port: &str, source: SourceRef) -> Result<(), KernelError> {
        match port {
            "input" => self.input = Some(source),
            _ => return Err(KernelError::UnknownPort(port.to_string())),
        }
        Ok(())
    }

    fn output(&self, port: &str) -> Option<Cell> {
        match port {
            "mask" => self.mask.clone(),
            _ => None,
        }
    }

    fn attach_output(&mut self, port: &str, cell: Cell) -> Result<(), KernelError> {
        match port {
            "mask" => self.mask = Some(cell),
            _ => return Err(KernelError::UnknownPort(port.to_string())),
        }
        Ok(())
    }

    fn set_param(&mut self, name: &str, value: &ParamValue) -> Result<(), KernelError> {
        let number = value.as_f64().ok_or_else(|| KernelError::Parameter {
            name: name.to_string(),
            message: "expected a number".to_string(),
        });
        match name {
            "lower" => self.lower = number?,
            "upper" => self.upper = number?,
            _ => {
                return Err(KernelError::Parameter {
                    name: name.to_string(),
                    message: "no such parameter".to_string(),
                })
            }
        }
        Ok(())
    }

    fn evaluate(&mut self, co: &VectorReal) -> Result<(), SourceError> {
        let v = bound(&self.input, "input")?.sample(co)?;
        let inside = v
            .as_scalar()
            .map(|x| x >= self.lower && x <= self.upper)
            .unwrap_or(false);
        attached(&self.mask, "mask")?.set(Sample::Scalar(if inside { 1.0 } else { 0.0 }));
        Ok(())
    }
}
