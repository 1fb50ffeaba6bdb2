//! Graph construction: wiring node definitions into a live filter DAG.

use std::cell::RefCell;
use std::rc::Rc;

use hashbrown::{HashMap, HashSet};

use gridquery_api_core::{
    BoxReal, PixelSource, Prototype, Sample, SampleKind, SourceError, SourceRef, VectorReal,
};

use crate::error::ConfigError;
use crate::node::{output_socket, FilterNode};
use crate::registry::KernelRegistry;
use crate::schema::PortKind;
use crate::topo::topo_order;
use crate::types::{GraphDef, InputRef, NodeDef};

/// Several scalar sources fused into one multi-component vector source.
/// Built when a graph definition lists more than one source for a port.
#[derive(Debug)]
pub struct CompositeVector {
    parts: Vec<SourceRef>,
    bounds: BoxReal,
    prototype: Prototype,
}

impl CompositeVector {
    pub fn new(node: &str, port: &str, parts: Vec<SourceRef>) -> Result<CompositeVector, ConfigError> {
        let mismatch = |message: &str| ConfigError::CombineMismatch {
            node: node.to_string(),
            port: port.to_string(),
            message: message.to_string(),
        };
        if parts.len() < 2 {
            return Err(mismatch("need at least two sources"));
        }
        if parts.iter().any(|p| p.kind() != SampleKind::Scalar) {
            return Err(mismatch("only scalar sources can be combined"));
        }
        let rank = parts[0].rank();
        if parts.iter().any(|p| p.rank() != rank) {
            return Err(mismatch("sources span differing ranks"));
        }

        let mut bounds = parts[0].bounds().clone();
        for part in &parts[1..] {
            bounds.union_if_positive(part.bounds());
        }
        let prototypes: Vec<Prototype> = parts.iter().map(|p| p.prototype().clone()).collect();
        let prototype = Prototype::combine(&prototypes, parts[0].prototype().dims());
        Ok(CompositeVector {
            parts,
            bounds,
            prototype,
        })
    }
}

impl PixelSource for CompositeVector {
    fn sample(&self, co: &VectorReal) -> Result<Sample, SourceError> {
        let mut components = Vec::with_capacity(self.parts.len());
        for part in &self.parts {
            components.extend_from_slice(part.sample(co)?.components());
        }
        Ok(Sample::Vector(components))
    }

    fn bounds(&self) -> &BoxReal {
        &self.bounds
    }

    fn prototype(&self) -> &Prototype {
        &self.prototype
    }

    fn label(&self) -> String {
        let parts: Vec<String> = self.parts.iter().map(|p| p.label()).collect();
        format!("vector({})", parts.join(", "))
    }
}

/// A fully wired, shape-checked filter graph. One instance per evaluation
/// context: nodes carry memoisation state, so graphs are never shared
/// across threads.
pub struct Graph {
    nodes: HashMap<String, Rc<RefCell<FilterNode>>>,
    order: Vec<String>,
}

impl std::fmt::Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph").field("order", &self.order).finish()
    }
}

impl Graph {
    pub fn node(&self, name: &str) -> Option<&Rc<RefCell<FilterNode>>> {
        self.nodes.get(name)
    }

    /// Node ids in evaluation (topological) order.
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// An output socket by node and port name; shared by all callers.
    pub fn output_socket(&self, node: &str, port: &str) -> Result<SourceRef, ConfigError> {
        let rc = self.nodes.get(node).ok_or_else(|| ConfigError::UnknownNode {
            node: node.to_string(),
        })?;
        output_socket(rc, port)
    }

    /// Recursive configuration report for every node, in evaluation order.
    pub fn describe(&self) -> String {
        self.order
            .iter()
            .filter_map(|id| self.nodes.get(id))
            .map(|node| node.borrow().describe())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Builds [`Graph`]s from definitions, resolving layer references against
/// registered dataset sources.
pub struct GraphBuilder {
    registry: KernelRegistry,
    layers: HashMap<String, SourceRef>,
}

impl GraphBuilder {
    pub fn new(registry: KernelRegistry) -> GraphBuilder {
        GraphBuilder {
            registry,
            layers: HashMap::new(),
        }
    }

    /// Register a dataset-backed source under a layer name.
    pub fn with_layer(mut self, name: impl Into<String>, source: SourceRef) -> GraphBuilder {
        self.layers.insert(name.into(), source);
        self
    }

    pub fn add_layer(&mut self, name: impl Into<String>, source: SourceRef) {
        self.layers.insert(name.into(), source);
    }

    pub fn build(&self, def: &GraphDef) -> Result<Graph, ConfigError> {
        let mut seen: HashSet<&str> = HashSet::new();
        for node in &def.nodes {
            if !seen.insert(&node.id) {
                return Err(ConfigError::DuplicateNode {
                    node: node.id.clone(),
                });
            }
        }

        let order = topo_order(&def.nodes)?;
        let by_id: HashMap<&str, &NodeDef> =
            def.nodes.iter().map(|n| (n.id.as_str(), n)).collect();

        let mut nodes: HashMap<String, Rc<RefCell<FilterNode>>> = HashMap::new();
        for id in &order {
            let ndef = by_id[id.as_str()];
            let kernel = self.registry.create(&ndef.kind)?;
            let mut node = FilterNode::new(&ndef.id, kernel);

            for (name, value) in &ndef.params {
                node.set_param(name, value)?;
            }

            for (port, input) in &ndef.inputs {
                if node.signature().input(port).is_none() {
                    return Err(ConfigError::UnknownPort {
                        node: ndef.id.clone(),
                        port: port.clone(),
                    });
                }
                let kind = node.signature().input(port).map(|s| s.kind);
                let mut candidates = Vec::new();
                for r in input.refs() {
                    candidates.push(self.resolve_ref(&nodes, &ndef.id, r)?);
                }
                let source = combine_candidates(&ndef.id, port, kind, candidates)?;
                node.bind_input(port, source)?;
            }

            if let Some(bounds) = &ndef.bounds {
                node.set_bounds(bounds.to_box(), bounds.dims.clone());
            }
            node.apply_input_constraints()?;
            node.infer_shape()?;
            node.verify()?;
            node.initialise()?;
            nodes.insert(ndef.id.clone(), Rc::new(RefCell::new(node)));
        }

        Ok(Graph { nodes, order })
    }

    fn resolve_ref(
        &self,
        nodes: &HashMap<String, Rc<RefCell<FilterNode>>>,
        node_id: &str,
        input: &InputRef,
    ) -> Result<SourceRef, ConfigError> {
        match input {
            InputRef::Layer { layer } => {
                self.layers
                    .get(layer)
                    .cloned()
                    .ok_or_else(|| ConfigError::MissingLayer {
                        layer: layer.clone(),
                    })
            }
            InputRef::Socket { node, output } => {
                let upstream = nodes.get(node).ok_or_else(|| ConfigError::UnknownSource {
                    node: node_id.to_string(),
                    upstream: node.clone(),
                })?;
                output_socket(upstream, output)
            }
        }
    }
}

/// The port-filling contract: a single source passes through unchanged;
/// multiple sources for a vector-capable port combine into one vector
/// source; a scalar port refuses more than one source.
fn combine_candidates(
    node: &str,
    port: &str,
    kind: Option<PortKind>,
    mut candidates: Vec<SourceRef>,
) -> Result<SourceRef, ConfigError> {
    match candidates.len() {
        0 => Err(ConfigError::UnboundInput {
            node: node.to_string(),
            port: port.to_string(),
        }),
        1 => Ok(candidates.remove(0)),
        _ => {
            if kind == Some(PortKind::Scalar) {
                return Err(ConfigError::PortKindMismatch {
                    node: node.to_string(),
                    port: port.to_string(),
                    expected: "scalar",
                });
            }
            Ok(Rc::new(CompositeVector::new(node, port, candidates)?))
        }
    }
}
