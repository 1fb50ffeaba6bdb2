//! Bundled kernels.
//!
//! These double as living documentation of the kernel contract: each one
//! declares its ports in a static signature and binds them by name.

pub mod arith;
pub mod extrema;
pub mod mask;
pub mod temporal;

pub use arith::{Add, AddScalar};
pub use extrema::{Maximum, Minimum};
pub use mask::InRange;
pub use temporal::TemporalMean;

use crate::kernel::Kernel;
use crate::registry::KernelFactory;

pub(crate) fn builtins() -> [KernelFactory; 6] {
    [
        || Box::new(Add::new()) as Box<dyn Kernel>,
        || Box::new(AddScalar::new()) as Box<dyn Kernel>,
        || Box::new(Maximum::new()) as Box<dyn Kernel>,
        || Box::new(Minimum::new()) as Box<dyn Kernel>,
        || Box::new(InRange::new()) as Box<dyn Kernel>,
        || Box::new(TemporalMean::new()) as Box<dyn Kernel>,
    ]
}
