//! Arithmetic kernels.

use gridquery_api_core::{Cell, Sample, SourceError, SourceRef, VectorReal};

use crate::error::KernelError;
use crate::kernel::{attached, bound, Kernel};
use crate::schema::{InheritDims, InputSpec, KernelSignature, OutputSpec, PortKind, RankConstraint};
use crate::types::ParamValue;

/// Adds each pixel from two inputs together. If one input has fewer
/// dimensions than the other, it is promoted.
pub struct Add {
    input_a: Option<SourceRef>,
    input_b: Option<SourceRef>,
    output: Option<Cell>,
}

static ADD_SIG: KernelSignature = KernelSignature {
    name: "add",
    description: "Adds each pixel of two inputs; a lower-rank input is promoted.",
    inputs: &[
        InputSpec {
            id: "input_a",
            kind: PortKind::Any,
            rank: RankConstraint {
                group: "in",
                promote: true,
                demote: false,
                is: None,
                lower_bound: None,
                upper_bound: None,
            },
        },
        InputSpec {
            id: "input_b",
            kind: PortKind::Any,
            rank: RankConstraint {
                group: "in",
                promote: true,
                demote: false,
                is: None,
                lower_bound: None,
                upper_bound: None,
            },
        },
    ],
    outputs: &[OutputSpec {
        id: "output",
        cell_type: "input_a",
    }],
    inherit_dims: Some(InheritDims {
        from: "input_a",
        reduce_by: 0,
    }),
};

impl Add {
    pub fn new() -> Add {
        Add {
            input_a: None,
            input_b: None,
            output: None,
        }
    }
}

impl Default for Add {
    fn default() -> Self {
        Add::new()
    }
}

impl Kernel for Add {
    fn signature(&self) -> &'static KernelSignature {
        &ADD_SIG
    }

    fn input(&self, port: &str) -> Option<SourceRef> {
        match port {
            "input_a" => self.input_a.clone(),
            "input_b" => self.input_b.clone(),
            _ => None,
        }
    }

    fn bind_input(&mut self, port: &str, source: SourceRef) -> Result<(), KernelError> {
        match port {
            "input_a" => self.input_a = Some(source),
            "input_b" => self.input_b = Some(source),
            _ => return Err(KernelError::UnknownPort(port.to_string())),
        }
        Ok(())
    }

    fn output(&self, port: &str) -> Option<Cell> {
        match port {
            "output" => self.output.clone(),
            _ => None,
        }
    }

    fn attach_output(&mut self, port: &str, cell: Cell) -> Result<(), KernelError> {
        match port {
            "output" => self.output = Some(cell),
            _ => return Err(KernelError::UnknownPort(port.to_string())),
        }
        Ok(())
    }

    fn evaluate(&mut self, co: &VectorReal) -> Result<(), SourceError> {
        let a = bound(&self.input_a, "input_a")?.sample(co)?;
        let b = bound(&self.input_b, "input_b")?.sample(co)?;
        attached(&self.output, "output")?.set(Sample::add_of(&a, &b));
        Ok(())
    }
}

/// Adds a literal offset to every pixel of a single input.
pub struct AddScalar {
    input: Option<SourceRef>,
    output: Option<Cell>,
    value: f64,
}

static ADD_SCALAR_SIG: KernelSignature = KernelSignature {
    name: "add_scalar",
    description: "Adds the `value` parameter to each pixel.",
    inputs: &[InputSpec {
        id: "input",
        kind: PortKind::Any,
        rank: RankConstraint::DEFAULT,
    }],
    outputs: &[OutputSpec {
        id: "output",
        cell_type: "input",
    }],
    inherit_dims: Some(InheritDims {
        from: "input",
        reduce_by: 0,
    }),
};

impl AddScalar {
    pub fn new() -> AddScalar {
        AddScalar {
            input: None,
            output: None,
            value: 0.0,
        }
    }
}

impl Default for AddScalar {
    fn default() -> Self {
        AddScalar::new()
    }
}

impl Kernel for AddScalar {
    fn signature(&self) -> &'static KernelSignature {
        &ADD_SCALAR_SIG
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
            "output" => self.output.clone(),
            _ => None,
        }
    }

    fn attach_output(&mut self, port: &str, cell: Cell) -> Result<(), KernelError> {
        match port {
            "output" => self.output = Some(cell),
            _ => return Err(KernelError::UnknownPort(port.to_string())),
        }
        Ok(())
    }

    fn set_param(&mut self, name: &str, value: &ParamValue) -> Result<(), KernelError> {
        match name {
            "value" => {
                self.value = value.as_f64().ok_or_else(|| KernelError::Parameter {
                    name: name.to_string(),
                    message: "expected a number".to_string(),
                })?;
                Ok(())
            }
            _ => Err(KernelError::Parameter {
                name: name.to_string(),
                message: "no such parameter".to_string(),
            }),
        }
    }

    fn evaluate(&mut self, co: &VectorReal) -> Result<(), SourceError> {
        let v = bound(&self.input, "input")?.sample(co)?;
        attached(&self.output, "output")?.set(v.map(|x| x + self.value));
        Ok(())
    }
}
