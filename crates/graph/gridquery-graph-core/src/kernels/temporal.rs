//! Reduction kernels that collapse the leading (time) axis.

use gridquery_api_core::{Cell, Sample, SourceError, SourceRef, VectorReal};

use crate::error::KernelError;
use crate::kernel::{attached, bound, Kernel};
use crate::schema::{InheritDims, InputSpec, KernelSignature, OutputSpec, PortKind, RankConstraint};

/// The mean of a pixel across the input's leading axis. The node's own
/// shape is the input's reduced by one axis, so a 3D time series collapses
/// to a single 2D slice.
pub struct TemporalMean {
    input: Option<SourceRef>,
    output: Option<Cell>,
}

static TEMPORAL_MEAN_SIG: KernelSignature = KernelSignature {
    name: "temporal_mean",
    description: "Averages each pixel over the input's leading axis.",
    inputs: &[InputSpec {
        id: "input",
        kind: PortKind::Any,
        rank: RankConstraint {
            group: "",
            promote: false,
            demote: false,
            is: None,
            lower_bound: Some(2),
            upper_bound: None,
        },
    }],
    outputs: &[OutputSpec {
        id: "output",
        cell_type: "input",
    }],
    inherit_dims: Some(InheritDims {
        from: "input",
        reduce_by: 1,
    }),
};

impl TemporalMean {
    pub fn new() -> TemporalMean {
        TemporalMean {
            input: None,
            output: None,
        }
    }
}

impl Default for TemporalMean {
    fn default() -> Self {
        TemporalMean::new()
    }
}

impl Kernel for TemporalMean {
    fn signature(&self) -> &'static KernelSignature {
        &TEMPORAL_MEAN_SIG
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

    fn evaluate(&mut self, co: &VectorReal) -> Result<(), SourceError> {
        let source = bound(&self.input, "input")?;
        let bounds = source.bounds();
        let start = bounds.min().get(0);
        let steps = ((bounds.max().get(0) - start).round() as i64).max(1);

        // The incoming coordinate covers the trailing axes; scan the
        // leading axis at slice centres.
        let mut slice_co = VectorReal::zeros(co.rank() + 1);
        for i in 0..co.rank() {
            slice_co.set(i + 1, co.get(i));
        }

        let mut acc: Option<Sample> = None;
        for step in 0..steps {
            slice_co.set(0, start + step as f64 + 0.5);
            let v = source.sample(&slice_co)?;
            acc = Some(match acc {
                None => v,
                Some(sum) => Sample::add_of(&sum, &v),
            });
        }
        let sum = acc.unwrap_or(Sample::Scalar(f64::NAN));
        let mean = sum.map(|x| x / steps as f64);
        attached(&self.output, "output")?.set(mean);
        Ok(())
    }
}
