//! The rank-constraint solver.
//!
//! All input ports sharing a constraint group are resolved to one common
//! rank. Declared (class-level) constraints fold first, then the observed
//! ranks of the attached sources tighten the window further; the target is
//! the richest rank actually available that the hard constraints allow.
//! Sources whose rank differs from the target are wrapped in swizzling
//! adapters, and the group's bounds are unioned with degenerate promoted
//! axes ignored.

use gridquery_api_core::{BoxReal, SourceRef, Swizzle};
use log::info;

use crate::error::ConfigError;
use crate::kernel::Kernel;
use crate::schema::RankConstraint;
use crate::swizzled::wrap_to_rank;

const RANK_MIN: i64 = i64::MIN;
const RANK_MAX: i64 = i64::MAX;

struct Member {
    port: &'static str,
    constraint: RankConstraint,
}

/// One constraint group over a kernel's input ports.
pub struct RankGroup {
    node: String,
    name: String,
    members: Vec<Member>,
    // Running window over the group's permissible ranks, and the ports that
    // most recently tightened each end (for diagnostics).
    rank_lower: i64,
    rank_upper: i64,
    lower_port: Option<&'static str>,
    upper_port: Option<&'static str>,
    /// Largest rank actually observed among attached sources. A soft
    /// ceiling: the group never promotes beyond it.
    intrinsic_max: i64,
    dimensions: Vec<String>,
    bounds: Option<BoxReal>,
}

impl RankGroup {
    pub fn new(node: impl Into<String>, name: impl Into<String>) -> RankGroup {
        RankGroup {
            node: node.into(),
            name: name.into(),
            members: Vec::new(),
            rank_lower: RANK_MIN,
            rank_upper: RANK_MAX,
            lower_port: None,
            upper_port: None,
            intrinsic_max: RANK_MIN,
            dimensions: Vec::new(),
            bounds: None,
        }
    }

    fn window(&self) -> String {
        let lo = if self.rank_lower == RANK_MIN {
            "-inf".to_string()
        } else {
            self.rank_lower.to_string()
        };
        let hi = if self.rank_upper == RANK_MAX {
            "+inf".to_string()
        } else {
            self.rank_upper.to_string()
        };
        format!("[{lo}, {hi}]")
    }

    fn port_or(&self, port: Option<&'static str>) -> String {
        port.unwrap_or("<unconstrained>").to_string()
    }

    /// Pass 1: fold one member's declared constraints into the window.
    /// The lower bound starts very small and only grows as constraints are
    /// considered; vice versa for the upper bound.
    pub fn add(&mut self, port: &'static str, constraint: RankConstraint) -> Result<(), ConfigError> {
        if let Some(lower) = constraint.lower_bound {
            if lower as i64 > self.rank_lower {
                self.rank_lower = lower as i64;
                self.lower_port = Some(port);
            }
        }
        if let Some(upper) = constraint.upper_bound {
            if (upper as i64) < self.rank_upper {
                self.rank_upper = upper as i64;
                self.upper_port = Some(port);
            }
        }
        if let Some(is) = constraint.is {
            if self.rank_lower > is as i64 {
                return Err(ConfigError::ExactRankOutsideWindow {
                    node: self.node.clone(),
                    port: port.to_string(),
                    group: self.name.clone(),
                    is,
                    window: self.window(),
                    bound_port: self.port_or(self.lower_port),
                });
            }
            if self.rank_upper < is as i64 {
                return Err(ConfigError::ExactRankOutsideWindow {
                    node: self.node.clone(),
                    port: port.to_string(),
                    group: self.name.clone(),
                    is,
                    window: self.window(),
                    bound_port: self.port_or(self.upper_port),
                });
            }
            self.rank_lower = is as i64;
            self.rank_upper = is as i64;
            self.lower_port = Some(port);
            self.upper_port = Some(port);
        }
        if self.rank_upper < self.rank_lower {
            return Err(ConfigError::RankConflict {
                node: self.node.clone(),
                group: self.name.clone(),
                port: port.to_string(),
                lower_port: self.port_or(self.lower_port),
                upper_port: self.port_or(self.upper_port),
            });
        }
        self.members.push(Member { port, constraint });
        Ok(())
    }

    fn source_of(&self, kernel: &dyn Kernel, port: &'static str) -> Result<SourceRef, ConfigError> {
        kernel.input(port).ok_or_else(|| ConfigError::UnboundInput {
            node: self.node.clone(),
            port: port.to_string(),
        })
    }

    /// Pass 2: fold the observed rank of each member's attached source.
    ///
    /// A source that is too small and cannot be promoted is unsatisfiable
    /// (and symmetrically for demotion); otherwise a non-promotable source
    /// pins the upper bound at its own rank and a non-demotable source pins
    /// the lower bound. Bounds tightened by earlier members are visible to
    /// later members' tests.
    fn fold_observed(&mut self, kernel: &dyn Kernel) -> Result<(), ConfigError> {
        for i in 0..self.members.len() {
            let port = self.members[i].port;
            let constraint = self.members[i].constraint;
            let observed = self.source_of(kernel, port)?.rank() as i64;

            if !constraint.promote {
                if observed < self.rank_lower {
                    return Err(ConfigError::CannotPromote {
                        node: self.node.clone(),
                        port: port.to_string(),
                        bound_port: self.port_or(self.lower_port),
                    });
                }
                if observed < self.rank_upper {
                    self.rank_upper = observed;
                    self.upper_port = Some(port);
                }
            }
            if !constraint.demote {
                if observed > self.rank_upper {
                    return Err(ConfigError::CannotDemote {
                        node: self.node.clone(),
                        port: port.to_string(),
                        bound_port: self.port_or(self.upper_port),
                    });
                }
                if observed > self.rank_lower {
                    self.rank_lower = observed;
                    self.lower_port = Some(port);
                }
            }

            if observed > self.intrinsic_max {
                self.intrinsic_max = observed;
            }
        }
        Ok(())
    }

    /// The effective rank of this group: the richest rank actually
    /// available among the inputs, never exceeding what the hard
    /// constraints allow.
    pub fn rank(&self) -> usize {
        self.intrinsic_max.min(self.rank_upper).max(0) as usize
    }

    /// Resolve dimension names, wrap mismatched members, and union bounds.
    fn coerce(&mut self, kernel: &mut dyn Kernel) -> Result<(), ConfigError> {
        let target = self.rank();

        // Resolve dimension names first. Any member at or above the target
        // rank is a candidate; two candidates that disagree make the
        // configuration ambiguous. An empty name marks a virtual axis left
        // behind by an earlier promotion and matches anything.
        let mut dims: Option<Vec<String>> = None;
        let mut dims_port: Option<&'static str> = None;
        for member in &self.members {
            let source = self.source_of(kernel, member.port)?;
            if source.rank() < target {
                continue;
            }
            let swizzle = Swizzle::resize(source.rank(), target);
            let candidate = swizzle.apply_names(source.prototype().dims());
            match &mut dims {
                None => {
                    dims = Some(candidate);
                    dims_port = Some(member.port);
                }
                Some(existing) => {
                    let conflict = existing
                        .iter()
                        .zip(&candidate)
                        .any(|(a, b)| !a.is_empty() && !b.is_empty() && a != b);
                    if conflict {
                        return Err(ConfigError::AmbiguousDimensions {
                            node: self.node.clone(),
                            group: self.name.clone(),
                            first_port: self.port_or(dims_port),
                            first: existing.join(", "),
                            second_port: member.port.to_string(),
                            second: candidate.join(", "),
                        });
                    }
                    for (a, b) in existing.iter_mut().zip(candidate) {
                        if a.is_empty() {
                            *a = b;
                        }
                    }
                }
            }
        }
        self.dimensions = dims.unwrap_or_default();

        // Adjust rank: wrap every member whose source disagrees with the
        // target. Members already at the target are left untouched.
        for member in &self.members {
            let source = self.source_of(kernel, member.port)?;
            if source.rank() == target {
                continue;
            }
            let action = if source.rank() > target {
                "Demoting"
            } else {
                "Promoting"
            };
            info!(
                "{} dimensionality of {}.{} to rank {}",
                action, self.node, member.port, target
            );
            let wrapped = wrap_to_rank(source, target);
            kernel
                .bind_input(member.port, wrapped)
                .map_err(|e| e.into_config(&self.node))?;
        }

        // Union bounds of all members. Virtual dimensions introduced by
        // promotion have zero length, so they are ignored.
        let mut bounds = BoxReal::new(target);
        for member in &self.members {
            let source = self.source_of(kernel, member.port)?;
            bounds.union_if_positive(source.bounds());
        }
        self.bounds = Some(bounds);
        Ok(())
    }

    /// Run pass 2 and coercion against the kernel's currently-bound
    /// sources. Pass 1 already ran as members were added.
    pub fn solve(&mut self, kernel: &mut dyn Kernel) -> Result<(), ConfigError> {
        self.fold_observed(kernel)?;
        self.coerce(kernel)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dimensions(&self) -> &[String] {
        &self.dimensions
    }

    pub fn bounds(&self) -> Option<&BoxReal> {
        self.bounds.as_ref()
    }
}
