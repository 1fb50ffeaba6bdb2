//! Extremum kernels.

use gridquery_api_core::{Cell, Sample, SourceError, SourceRef, VectorReal};

use crate::error::KernelError;
use crate::kernel::{attached, bound, Kernel};
use crate::schema::{InheritDims, InputSpec, KernelSignature, OutputSpec, PortKind, RankConstraint};

const PAIR_INPUTS: &[InputSpec] = &[
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
];

const PAIR_OUTPUTS: &[OutputSpec] = &[OutputSpec {
    id: "output",
    cell_type: "input_a",
}];

static MAXIMUM_SIG: KernelSignature = KernelSignature {
    name: "maximum",
    description: "Returns the greater value of its inputs. Doubles as an \
                  'or' filter for boolean data.",
    inputs: PAIR_INPUTS,
    outputs: PAIR_OUTPUTS,
    inherit_dims: Some(InheritDims {
        from: "input_a",
        reduce_by: 0,
    }),
};

static MINIMUM_SIG: KernelSignature = KernelSignature {
    name: "minimum",
    description: "Returns the lesser value of its inputs. Doubles as an \
                  'and' filter for boolean data.",
    inputs: PAIR_INPUTS,
    outputs: PAIR_OUTPUTS,
    inherit_dims: Some(InheritDims {
        from: "input_a",
        reduce_by: 0,
    }),
};

macro_rules! pairwise_kernel {
    ($(#[$doc:meta])* $name:ident, $sig:ident, $combine:expr) => {
        $(#[$doc])*
        pub struct $name {
            input_a: Option<SourceRef>,
            input_b: Option<SourceRef>,
            output: Option<Cell>,
        }

        impl $name {
            pub fn new() -> $name {
                $name {
                    input_a: None,
                    input_b: None,
                    output: None,
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::new()
            }
        }

        impl Kernel for $name {
            fn signature(&self) -> &'static KernelSignature {
                &$sig
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
                attached(&self.output, "output")?.set($combine(&a, &b));
                Ok(())
            }
        }
    };
}

pairwise_kernel!(
    /// The greater value of two inputs, pixel by pixel.
    Maximum,
    MAXIMUM_SIG,
    Sample::max_of
);

pairwise_kernel!(
    /// The lesser value of two inputs, pixel by pixel.
    Minimum,
    MINIMUM_SIG,
    Sample::min_of
);
