//! gridquery-graph-core: the filter-graph engine.
//!
//! A graph of small computation kernels transforms gridded datasets into
//! derived outputs by evaluating each kernel per output coordinate. The
//! modules are organised to keep concerns isolated:
//!
//! - [`schema`] declares the static port tables kernels describe themselves
//!   with, including rank constraints.
//! - [`kernel`] is the contract a filter author implements.
//! - [`rank`] resolves rank-constraint groups and coerces mismatched
//!   inputs via [`swizzled`] source adapters.
//! - [`node`] wraps a kernel with shape inference, output sockets and
//!   memoised evaluation.
//! - [`types`], [`topo`] and [`builder`] wire already-parsed definitions
//!   into live graphs, resolving [`registry`] kernel kinds.
//! - [`runner`] scans a source's bounding box into a buffer.
//!
//! Integration code should primarily interact with [`GraphBuilder`],
//! [`Graph`] and [`runner`].

pub mod builder;
pub mod error;
pub mod kernel;
pub mod kernels;
pub mod node;
pub mod rank;
pub mod registry;
pub mod runner;
pub mod schema;
pub mod swizzled;
pub mod topo;
pub mod types;

pub use builder::{CompositeVector, Graph, GraphBuilder};
pub use error::{ConfigError, KernelError};
pub use kernel::Kernel;
pub use node::{output_socket, FilterNode, OutputSocket};
pub use rank::RankGroup;
pub use registry::{KernelFactory, KernelRegistry};
pub use schema::{
    InheritDims, InputSpec, KernelSignature, OutputSpec, PortKind, RankConstraint,
};
pub use types::{BoundsDef, GraphDef, InputDef, InputRef, NodeDef, ParamValue};
