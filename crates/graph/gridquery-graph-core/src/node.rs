//! The filter node: wraps a kernel with the machinery the engine needs.
//!
//! A node owns one kernel instance, its resolved shape, its output sockets
//! and the memoisation state that guarantees the kernel body runs at most
//! once per distinct coordinate, however many downstream consumers ask for
//! the same pixel.

use std::cell::RefCell;
use std::fmt::Write as _;
use std::rc::{Rc, Weak};

use hashbrown::HashMap;
use log::debug;

use gridquery_api_core::{
    BoxReal, Cell, NumericType, PixelSource, Prototype, Sample, SampleKind, SourceError,
    SourceRef, Swizzle, VectorReal,
};

use crate::error::ConfigError;
use crate::kernel::Kernel;
use crate::rank::RankGroup;
use crate::schema::{KernelSignature, PortKind};
use crate::types::ParamValue;

struct Memo {
    internal: VectorReal,
    last: VectorReal,
}

/// A node in a query graph.
///
/// Lifecycle: construct, bind inputs, `apply_input_constraints`,
/// `infer_shape`, `verify`, `initialise`, then any number of `invoke`
/// calls. Nodes live for the lifetime of one query execution and are never
/// shared across threads.
pub struct FilterNode {
    name: String,
    kernel: Box<dyn Kernel>,
    bounds: Option<BoxReal>,
    dimensions: Vec<String>,
    memo: Option<Memo>,
    cells: HashMap<String, Cell>,
    sockets: HashMap<String, Rc<OutputSocket>>,
}

impl FilterNode {
    pub fn new(name: impl Into<String>, kernel: Box<dyn Kernel>) -> FilterNode {
        FilterNode {
            name: name.into(),
            kernel,
            bounds: None,
            dimensions: Vec::new(),
            memo: None,
            cells: HashMap::new(),
            sockets: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &'static KernelSignature {
        self.kernel.signature()
    }

    pub fn bounds(&self) -> Option<&BoxReal> {
        self.bounds.as_ref()
    }

    pub fn dimensions(&self) -> &[String] {
        &self.dimensions
    }

    pub fn rank(&self) -> Option<usize> {
        self.bounds.as_ref().map(BoxReal::rank)
    }

    fn target(&self) -> String {
        format!("filter \"{}\"", self.name)
    }

    /// Bind a source to an input port, checking the port's declared kind.
    pub fn bind_input(&mut self, port: &str, source: SourceRef) -> Result<(), ConfigError> {
        let spec = self
            .signature()
            .input(port)
            .ok_or_else(|| ConfigError::UnknownPort {
                node: self.name.clone(),
                port: port.to_string(),
            })?;
        let compatible = match spec.kind {
            PortKind::Any => true,
            PortKind::Scalar => source.kind() == SampleKind::Scalar,
            PortKind::Vector => source.kind() == SampleKind::Vector,
        };
        if !compatible {
            return Err(ConfigError::PortKindMismatch {
                node: self.name.clone(),
                port: port.to_string(),
                expected: match spec.kind {
                    PortKind::Scalar => "scalar",
                    PortKind::Vector => "vector",
                    PortKind::Any => "any",
                },
            });
        }
        self.kernel
            .bind_input(port, source)
            .map_err(|e| e.into_config(&self.name))
    }

    pub fn set_param(&mut self, name: &str, value: &ParamValue) -> Result<(), ConfigError> {
        self.kernel
            .set_param(name, value)
            .map_err(|e| e.into_config(&self.name))
    }

    /// Resolve every rank-constraint group over this node's input ports and
    /// coerce mismatched sources. Groups are processed in the order their
    /// first member is declared.
    pub fn apply_input_constraints(&mut self) -> Result<(), ConfigError> {
        let mut groups: Vec<RankGroup> = Vec::new();
        let mut index: HashMap<&'static str, usize> = HashMap::new();

        for input in self.signature().inputs {
            let group_name = input.rank.group_for(input.id);
            let i = *index.entry(group_name).or_insert_with(|| {
                groups.push(RankGroup::new(&self.name, group_name));
                groups.len() - 1
            });
            groups[i].add(input.id, input.rank)?;
        }

        for group in &mut groups {
            group.solve(self.kernel.as_mut())?;
        }
        Ok(())
    }

    /// Find the effective shape of this node by reducing the declared
    /// driving input, unless explicit bounds were already set.
    pub fn infer_shape(&mut self) -> Result<(), ConfigError> {
        if self.bounds.is_some() {
            return Ok(());
        }
        let inherit = self
            .signature()
            .inherit_dims
            .ok_or_else(|| ConfigError::MissingShape {
                node: self.name.clone(),
            })?;
        if self.signature().input(inherit.from).is_none() {
            return Err(ConfigError::UnknownPort {
                node: self.name.clone(),
                port: inherit.from.to_string(),
            });
        }
        let source = self
            .kernel
            .input(inherit.from)
            .ok_or_else(|| ConfigError::UnboundInput {
                node: self.name.clone(),
                port: inherit.from.to_string(),
            })?;

        let input_rank = source.rank();
        if inherit.reduce_by >= input_rank {
            return Err(ConfigError::ShapeReduction {
                node: self.name.clone(),
                from: inherit.from.to_string(),
                reduce_by: inherit.reduce_by,
                rank: input_rank,
            });
        }
        let out_rank = input_rank - inherit.reduce_by;
        let resizer = Swizzle::resize(input_rank, out_rank);
        let bounds = resizer.apply_box(source.bounds());
        let dimensions = source.prototype().dims()[inherit.reduce_by..].to_vec();
        debug!(
            "Bounds of filter {} inferred to be {} over ({})",
            self.name,
            bounds,
            dimensions.join(", ")
        );
        self.set_bounds(bounds, dimensions);
        Ok(())
    }

    /// Fix the node's shape explicitly. Also resets the memoisation state:
    /// the sentinel is all-NaN, which never compares equal, so the first
    /// evaluation always runs the kernel.
    pub fn set_bounds(&mut self, bounds: BoxReal, dimensions: Vec<String>) {
        let rank = bounds.rank();
        self.memo = Some(Memo {
            internal: VectorReal::zeros(rank),
            last: VectorReal::filled(rank, f64::NAN),
        });
        self.bounds = Some(bounds);
        self.dimensions = dimensions;
    }

    fn resolve_component(
        &self,
        port: &str,
        decl: &str,
        visited: &mut Vec<String>,
    ) -> Result<Prototype, ConfigError> {
        if let Some(ty) = NumericType::parse(decl) {
            return Ok(Prototype::scalar(ty, &self.dimensions));
        }
        if visited.iter().any(|d| d == decl) {
            return Err(ConfigError::UnresolvedCellType {
                node: self.name.clone(),
                port: port.to_string(),
                decl: decl.to_string(),
                reason: "inheritance cycle".to_string(),
            });
        }
        visited.push(decl.to_string());

        let sig = self.signature();
        if sig.input(decl).is_some() {
            return match self.kernel.input(decl) {
                Some(source) => Ok(source.prototype().clone()),
                None => Err(ConfigError::UnresolvedCellType {
                    node: self.name.clone(),
                    port: port.to_string(),
                    decl: decl.to_string(),
                    reason: "inherited input port is unbound".to_string(),
                }),
            };
        }
        if let Some(output) = sig.output(decl) {
            if let Some(cell) = self.kernel.output(decl) {
                return Ok(cell.prototype());
            }
            return self.resolve_decl(port, output.cell_type, visited);
        }
        Err(ConfigError::UnresolvedCellType {
            node: self.name.clone(),
            port: port.to_string(),
            decl: decl.to_string(),
            reason: "not a numeric type and not a port of this filter".to_string(),
        })
    }

    fn resolve_decl(
        &self,
        port: &str,
        decl: &str,
        visited: &mut Vec<String>,
    ) -> Result<Prototype, ConfigError> {
        if decl.contains(',') {
            // A comma list combines per-component declarations into one
            // vector prototype. Each component forks the visited chain so
            // repeating a component is not mistaken for a cycle.
            let parts = decl
                .split(',')
                .map(|d| {
                    let mut branch = visited.clone();
                    self.resolve_component(port, d.trim(), &mut branch)
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Prototype::combine(&parts, &self.dimensions))
        } else {
            Ok(self
                .resolve_component(port, decl, visited)?
                .with_dims(&self.dimensions))
        }
    }

    /// Create (or fetch) the output cell for a port, resolving its declared
    /// type. Must run after the node's shape is known.
    pub fn create_cell(&mut self, port: &str) -> Result<Cell, ConfigError> {
        if let Some(cell) = self.cells.get(port) {
            return Ok(cell.clone());
        }
        let spec = self
            .signature()
            .output(port)
            .ok_or_else(|| ConfigError::UnknownPort {
                node: self.name.clone(),
                port: port.to_string(),
            })?;
        let mut visited = Vec::new();
        let prototype = self.resolve_decl(port, spec.cell_type, &mut visited)?;
        debug!("Creating cell {}.{} with prototype {:?}", self.name, port, prototype.types());
        let cell = Cell::new(port, prototype);
        self.kernel
            .attach_output(port, cell.clone())
            .map_err(|e| e.into_config(&self.name))?;
        self.cells.insert(port.to_string(), cell.clone());
        Ok(cell)
    }

    /// Check that every declared input port is bound, and auto-create any
    /// output cells the graph did not request sockets for.
    pub fn verify(&mut self) -> Result<(), ConfigError> {
        for input in self.signature().inputs {
            if self.kernel.input(input.id).is_none() {
                return Err(ConfigError::UnboundInput {
                    node: self.name.clone(),
                    port: input.id.to_string(),
                });
            }
        }
        for output in self.signature().outputs {
            if self.kernel.output(output.id).is_none() {
                self.create_cell(output.id)?;
            }
        }
        Ok(())
    }

    pub fn initialise(&mut self) -> Result<(), ConfigError> {
        let bounds = self
            .bounds
            .clone()
            .ok_or_else(|| ConfigError::MissingShape {
                node: self.name.clone(),
            })?;
        self.kernel
            .initialise(&bounds)
            .map_err(|e| e.into_config(&self.name))
    }

    /// Evaluate the kernel for a coordinate. If the node was last evaluated
    /// at the same coordinate the cached cell values stand and the kernel is
    /// not re-run.
    pub fn invoke(&mut self, co: &VectorReal) -> Result<(), SourceError> {
        let target = self.target();
        let memo = self.memo.as_mut().ok_or_else(|| SourceError::Read {
            target: target.clone(),
            message: "invoked before its shape was set".to_string(),
        })?;
        if *co == memo.last {
            return Ok(());
        }
        if co.rank() != memo.internal.rank() {
            return Err(SourceError::Dimensionality {
                target,
                expected: memo.internal.rank(),
                got: co.rank(),
            });
        }
        memo.internal.assign(co);
        let internal = memo.internal;
        self.kernel.evaluate(&internal)?;
        if let Some(memo) = self.memo.as_mut() {
            memo.last.assign(co);
        }
        Ok(())
    }

    /// Render this node's configuration for debugging: port bindings and
    /// current cached cell values. Observational only.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Filter({}) {{", self.name);
        for input in self.signature().inputs {
            match self.kernel.input(input.id) {
                Some(source) => {
                    let _ = writeln!(out, "    {}: {}", input.id, source.label());
                }
                None => {
                    let _ = writeln!(out, "    {}: <unbound>", input.id);
                }
            }
        }
        for output in self.signature().outputs {
            match self.kernel.output(output.id) {
                Some(cell) => {
                    let _ = writeln!(out, "    {}: {:?}", output.id, cell);
                }
                None => {
                    let _ = writeln!(out, "    {}: <no cell>", output.id);
                }
            }
        }
        out.push('}');
        out
    }
}

/// A node's named output, sampled lazily. Sampling invokes the owning node
/// (which may be memoised) and reads the cached cell.
#[derive(Debug)]
pub struct OutputSocket {
    node: Weak<RefCell<FilterNode>>,
    node_name: String,
    port: String,
    cell: Cell,
    bounds: BoxReal,
    prototype: Prototype,
}

impl PixelSource for OutputSocket {
    fn sample(&self, co: &VectorReal) -> Result<Sample, SourceError> {
        let node = self.node.upgrade().ok_or_else(|| SourceError::Read {
            target: self.label(),
            message: "owning graph has been dropped".to_string(),
        })?;
        node.borrow_mut().invoke(co)?;
        Ok(self.cell.get())
    }

    fn bounds(&self) -> &BoxReal {
        &self.bounds
    }

    fn prototype(&self) -> &Prototype {
        &self.prototype
    }

    fn label(&self) -> String {
        format!("socket {}.{}", self.node_name, self.port)
    }
}

/// Get (or create) an output socket for a node. The node's shape must be
/// known; multiple downstream consumers share the same socket.
pub fn output_socket(
    node: &Rc<RefCell<FilterNode>>,
    port: &str,
) -> Result<SourceRef, ConfigError> {
    let mut inner = node.borrow_mut();
    if let Some(socket) = inner.sockets.get(port) {
        return Ok(socket.clone());
    }
    let bounds = inner
        .bounds
        .clone()
        .ok_or_else(|| ConfigError::MissingShape {
            node: inner.name.clone(),
        })?;
    let cell = inner.create_cell(port)?;
    let socket = Rc::new(OutputSocket {
        node: Rc::downgrade(node),
        node_name: inner.name.clone(),
        port: port.to_string(),
        prototype: cell.prototype(),
        cell,
        bounds,
    });
    debug!("Created output socket {}", socket.label());
    inner.sockets.insert(port.to_string(), socket.clone());
    Ok(socket)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KernelError;
    use crate::kernel::{attached, bound};
    use crate::schema::{InheritDims, InputSpec, OutputSpec, RankConstraint};
    use gridquery_api_core::{GridSource, VectorInt};

    fn dims(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn grid(name: &str, shape: &[i64], dim_names: &[&str], data: Vec<f64>) -> SourceRef {
        Rc::new(GridSource::new(
            name,
            VectorInt::of(shape),
            &dims(dim_names),
            data,
        ))
    }

    /// Copies its input to its output, counting kernel executions.
    struct Passthrough {
        input: Option<SourceRef>,
        output: Option<Cell>,
        runs: Rc<std::cell::Cell<usize>>,
    }

    static PASSTHROUGH_SIG: KernelSignature = KernelSignature {
        name: "passthrough",
        description: "copies its input",
        inputs: &[InputSpec {
            id: "input",
            kind: PortKind::Any,
            rank: RankConstraint::DEFAULT,
        }],
        outputs: &[
            OutputSpec {
                id: "output",
                cell_type: "input",
            },
            OutputSpec {
                id: "flag",
                cell_type: "i16",
            },
            OutputSpec {
                id: "pair",
                cell_type: "input, f32",
            },
        ],
        inherit_dims: Some(InheritDims {
            from: "input",
            reduce_by: 0,
        }),
    };

    impl Kernel for Passthrough {
        fn signature(&self) -> &'static KernelSignature {
            &PASSTHROUGH_SIG
        }

        fn input(&self, port: &str) -> Option<SourceRef> {
            match port {
                "input" => self.input.clone(),
                _ => None,
            }
        }

        fn bind_input(&mut self, port: &str, source: SourceRef) -> Result<(), KernelError> {
            match port {
                "input" => {
                    self.input = Some(source);
                    Ok(())
                }
                _ => Err(KernelError::UnknownPort(port.to_string())),
            }
        }

        fn output(&self, port: &str) -> Option<Cell> {
            match port {
                "output" => self.output.clone(),
                _ => None,
            }
        }

        fn attach_output(&mut self, port: &str, cell: Cell) -> Result<(), KernelError> {
            match port {
                "output" => {
                    self.output = Some(cell);
                    Ok(())
                }
                // The extra declared outputs are only exercised through
                // cell-type resolution.
                "flag" | "pair" => Ok(()),
                _ => Err(KernelError::UnknownPort(port.to_string())),
            }
        }

        fn evaluate(&mut self, co: &VectorReal) -> Result<(), SourceError> {
            self.runs.set(self.runs.get() + 1);
            let value = bound(&self.input, "input")?.sample(co)?;
            attached(&self.output, "output")?.set(value);
            Ok(())
        }
    }

    fn passthrough_node() -> (FilterNode, Rc<std::cell::Cell<usize>>) {
        let runs = Rc::new(std::cell::Cell::new(0));
        let kernel = Passthrough {
            input: None,
            output: None,
            runs: runs.clone(),
        };
        (FilterNode::new("copy", Box::new(kernel)), runs)
    }

    fn configured_node() -> (Rc<RefCell<FilterNode>>, Rc<std::cell::Cell<usize>>) {
        let (mut node, runs) = passthrough_node();
        node.bind_input(
            "input",
            grid("g", &[2, 2], &["y", "x"], vec![0.0, 1.0, 2.0, 3.0]),
        )
        .unwrap();
        node.apply_input_constraints().unwrap();
        node.infer_shape().unwrap();
        node.verify().unwrap();
        node.initialise().unwrap();
        (Rc::new(RefCell::new(node)), runs)
    }

    #[test]
    fn kernel_runs_once_per_distinct_coordinate() {
        let (node, runs) = configured_node();
        let co = VectorReal::of(&[0.5, 0.5]);
        node.borrow_mut().invoke(&co).unwrap();
        node.borrow_mut().invoke(&co).unwrap();
        assert_eq!(runs.get(), 1);

        node.borrow_mut().invoke(&VectorReal::of(&[1.5, 0.5])).unwrap();
        assert_eq!(runs.get(), 2);

        // Back to the first coordinate: the memo only remembers the last
        // one, so the kernel runs again.
        node.borrow_mut().invoke(&co).unwrap();
        assert_eq!(runs.get(), 3);
    }

    #[test]
    fn invoke_rejects_mismatched_rank() {
        let (node, _) = configured_node();
        let err = node
            .borrow_mut()
            .invoke(&VectorReal::of(&[0.5, 0.5, 0.5]))
            .unwrap_err();
        assert!(matches!(err, SourceError::Dimensionality { .. }), "{err}");
    }

    #[test]
    fn verify_requires_bound_inputs() {
        let (mut node, _) = passthrough_node();
        node.set_bounds(BoxReal::new(2), dims(&["y", "x"]));
        let err = node.verify().unwrap_err();
        assert!(matches!(err, ConfigError::UnboundInput { .. }), "{err}");
    }

    #[test]
    fn sockets_sample_through_the_node() {
        let (node, runs) = configured_node();
        let socket = output_socket(&node, "output").unwrap();
        assert_eq!(socket.rank(), 2);
        assert_eq!(socket.prototype().dims(), &dims(&["y", "x"])[..]);

        let v = socket.sample(&VectorReal::of(&[1.5, 1.5])).unwrap();
        assert_eq!(v, Sample::Scalar(3.0));

        // The same socket is handed to every consumer.
        let again = output_socket(&node, "output").unwrap();
        assert_eq!(again.label(), socket.label());
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn cell_types_resolve_explicit_inherited_and_combined() {
        let (node, _) = configured_node();
        let mut inner = node.borrow_mut();

        // Inherited from the bound input.
        let output = inner.create_cell("output").unwrap();
        assert_eq!(output.prototype().types(), &[NumericType::F64]);

        // Explicit numeric type.
        let flag = inner.create_cell("flag").unwrap();
        assert_eq!(flag.prototype().types(), &[NumericType::I16]);

        // Comma list combines per-component declarations.
        let pair = inner.create_cell("pair").unwrap();
        assert_eq!(
            pair.prototype().types(),
            &[NumericType::F64, NumericType::F32]
        );
        assert_eq!(pair.prototype().dims(), &dims(&["y", "x"])[..]);
    }

    #[test]
    fn inheriting_from_an_unbound_input_fails() {
        let (mut node, _) = passthrough_node();
        node.set_bounds(BoxReal::new(2), dims(&["y", "x"]));
        let err = node.create_cell("output").unwrap_err();
        assert!(matches!(err, ConfigError::UnresolvedCellType { .. }), "{err}");
    }

    #[test]
    fn unknown_socket_names_are_rejected() {
        let (node, _) = configured_node();
        let err = output_socket(&node, "nonsense").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownPort { .. }), "{err}");
    }

    #[test]
    fn describe_reports_bindings() {
        let (node, _) = configured_node();
        let report = node.borrow().describe();
        assert!(report.contains("Filter(copy)"));
        assert!(report.contains("input: grid \"g\""));
        assert!(report.contains("output: Cell(output"));
    }
}
