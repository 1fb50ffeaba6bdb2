//! The kernel contract: what a filter author implements.

use gridquery_api_core::{BoxReal, Cell, SourceError, SourceRef, VectorReal};

use crate::error::KernelError;
use crate::schema::KernelSignature;
use crate::types::ParamValue;

/// A user-defined computation unit: reads its bound input ports and writes
/// its output cells for one coordinate at a time.
///
/// Kernels expose their ports through a static [`KernelSignature`] and bind
/// them by name; the engine reads and (during rank coercion) re-binds
/// inputs through the same table. The engine never interprets what
/// [`evaluate`](Kernel::evaluate) does beyond this contract.
pub trait Kernel {
    fn signature(&self) -> &'static KernelSignature;

    /// The source currently bound to an input port, if any.
    fn input(&self, port: &str) -> Option<SourceRef>;

    fn bind_input(&mut self, port: &str, source: SourceRef) -> Result<(), KernelError>;

    /// The cell currently attached to an output port, if any.
    fn output(&self, port: &str) -> Option<Cell>;

    fn attach_output(&mut self, port: &str, cell: Cell) -> Result<(), KernelError>;

    /// Assign a uniform (literal) parameter. Kernels without parameters can
    /// rely on the default, which rejects everything.
    fn set_param(&mut self, name: &str, _value: &ParamValue) -> Result<(), KernelError> {
        Err(KernelError::Parameter {
            name: name.to_string(),
            message: "no such parameter".to_string(),
        })
    }

    /// Called once, after shape inference and verification, before the
    /// first evaluation. `bounds` is the region this kernel will operate
    /// over. Good place to set up scratch state.
    fn initialise(&mut self, _bounds: &BoxReal) -> Result<(), KernelError> {
        Ok(())
    }

    /// The kernel body: populate the output cells for one coordinate.
    fn evaluate(&mut self, co: &VectorReal) -> Result<(), SourceError>;
}

/// Fetch a bound input inside a kernel body. Verification guarantees inputs
/// are bound before the first evaluation, so this only trips when a kernel
/// is driven outside the adapter.
pub fn bound<'a>(source: &'a Option<SourceRef>, port: &str) -> Result<&'a SourceRef, SourceError> {
    source.as_ref().ok_or_else(|| SourceError::Read {
        target: format!("port \"{port}\""),
        message: "input not bound".to_string(),
    })
}

/// Fetch an attached output cell inside a kernel body.
pub fn attached<'a>(cell: &'a Option<Cell>, port: &str) -> Result<&'a Cell, SourceError> {
    cell.as_ref().ok_or_else(|| SourceError::Read {
        target: format!("port \"{port}\""),
        message: "output cell not attached".to_string(),
    })
}
