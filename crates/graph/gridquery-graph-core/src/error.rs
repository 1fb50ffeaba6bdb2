//! Configuration errors raised while building a graph.
//!
//! Every variant names the offending node, port or group, because by the
//! time a graph definition fails the user is several layers away from the
//! kernel that declared the constraint. Configuration errors are fatal to
//! graph construction and are never retried; runtime failures use
//! [`SourceError`](gridquery_api_core::SourceError) instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no kernel registered for kind \"{kind}\"")]
    UnknownKernel { kind: String },

    #[error("duplicate node id \"{node}\"")]
    DuplicateNode { node: String },

    #[error("cycle detected in graph definition")]
    Cycle,

    #[error("node \"{node}\" references undefined node \"{upstream}\"")]
    UnknownSource { node: String, upstream: String },

    #[error("no node named \"{node}\" in this graph")]
    UnknownNode { node: String },

    #[error("no dataset layer named \"{layer}\"")]
    MissingLayer { layer: String },

    #[error("filter \"{node}\" has no port \"{port}\"")]
    UnknownPort { node: String, port: String },

    #[error("input port {node}.{port} has not been attached to a source")]
    UnboundInput { node: String, port: String },

    #[error("port {node}.{port} expects a {expected} source")]
    PortKindMismatch {
        node: String,
        port: String,
        expected: &'static str,
    },

    #[error("cannot combine sources for {node}.{port}: {message}")]
    CombineMismatch {
        node: String,
        port: String,
        message: String,
    },

    #[error(
        "rank constraints on {node}.{port} (group \"{group}\") cannot be met: \
         lower bound set by \"{lower_port}\" exceeds upper bound set by \"{upper_port}\""
    )]
    RankConflict {
        node: String,
        group: String,
        port: String,
        lower_port: String,
        upper_port: String,
    },

    #[error(
        "rank constraints on {node}.{port} cannot be met: exact rank {is} lies \
         outside the window {window} of group \"{group}\" (set by \"{bound_port}\")"
    )]
    ExactRankOutsideWindow {
        node: String,
        port: String,
        group: String,
        is: usize,
        window: String,
        bound_port: String,
    },

    #[error("input {node}.{port} cannot have fewer dimensions than \"{bound_port}\"")]
    CannotPromote {
        node: String,
        port: String,
        bound_port: String,
    },

    #[error("input {node}.{port} cannot have more dimensions than \"{bound_port}\"")]
    CannotDemote {
        node: String,
        port: String,
        bound_port: String,
    },

    #[error(
        "could not determine dimensions of group \"{group}\" on \"{node}\": cannot \
         decide between [{first}] from \"{first_port}\" and [{second}] from \"{second_port}\""
    )]
    AmbiguousDimensions {
        node: String,
        group: String,
        first_port: String,
        first: String,
        second_port: String,
        second: String,
    },

    #[error("could not resolve cell type \"{decl}\" for {node}.{port}: {reason}")]
    UnresolvedCellType {
        node: String,
        port: String,
        decl: String,
        reason: String,
    },

    #[error("parameter {node}.{name}: {message}")]
    Parameter {
        node: String,
        name: String,
        message: String,
    },

    #[error("could not determine the shape of \"{node}\": no derivation declared and no explicit bounds given")]
    MissingShape { node: String },

    #[error("cannot reduce {node}.{from} by {reduce_by} axes: its rank is only {rank}")]
    ShapeReduction {
        node: String,
        from: String,
        reduce_by: usize,
        rank: usize,
    },

    #[error("filter \"{node}\" failed to initialise: {message}")]
    Init { node: String, message: String },
}

/// Errors a kernel reports about its own ports and parameters. Kernels do
/// not know which node they are mounted on; the adapter converts these into
/// [`ConfigError`]s carrying the node name.
#[derive(Debug, Error)]
pub enum KernelError {
    #[error("no port named \"{0}\"")]
    UnknownPort(String),
    #[error("parameter \"{name}\": {message}")]
    Parameter { name: String, message: String },
    #[error("{0}")]
    Init(String),
}

impl KernelError {
    pub fn into_config(self, node: &str) -> ConfigError {
        match self {
            KernelError::UnknownPort(port) => ConfigError::UnknownPort {
                node: node.to_string(),
                port,
            },
            KernelError::Parameter { name, message } => ConfigError::Parameter {
                node: node.to_string(),
                name,
                message,
            },
            KernelError::Init(message) => ConfigError::Init {
                node: node.to_string(),
                message,
            },
        }
    }
}
