//! Dispatch call-graph audit.
//!
//! The generated functions form a call graph: a CPU copy-into redispatches
//! unmatched sources to their copy-from, and a CPU-owned copy-from swaps
//! roles back into the destination's copy-into. This module builds that
//! graph and replays runtime dispatch for every ordered pair of types to
//! check that each non-sparse pair ends in exactly one place: a direct
//! case, a case reached through redispatch, or an "unsupported" error.

use std::collections::HashMap;
use std::fmt;

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use thiserror::Error;

use crate::dispatch::{BackendPlan, CopyPath, Direction, FallbackPolicy, TypePlan};
use crate::registry::{Registry, TypeDescriptor};

/// Raised by a generated function whose table has no case for the pair
/// and whose fallback is terminal.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("copy does not support {source_type} to {destination_type} copy.")]
pub struct UnsupportedCopy {
    pub source_type: String,
    pub destination_type: String,
}

/// A dispatch function: a type's copy-into or copy-from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FunctionKey {
    pub case_id: u32,
    pub direction: Direction,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hop {
    /// Copy-into default clause calling the source's copy-from.
    Redispatch,
    /// CPU-owned copy-from calling the destination's copy-into.
    RoleSwap,
}

/// A call edge, taken only when the counterpart type is `via`.
#[derive(Clone, Copy, Debug)]
struct CallEdge {
    hop: Hop,
    via: u32,
}

// ─── Call Graph ────────────────────────────────────────────────────

pub struct CallGraph<'p, 'r> {
    graph: DiGraph<FunctionKey, CallEdge>,
    nodes: HashMap<FunctionKey, NodeIndex>,
    plans: HashMap<u32, &'p TypePlan<'r>>,
}

impl<'p, 'r> CallGraph<'p, 'r> {
    /// Build the graph over every type planned in `plans`.
    pub fn build(registry: &'r Registry, plans: &'p [BackendPlan<'r>]) -> Self {
        let mut graph = DiGraph::new();
        let mut nodes = HashMap::new();
        let mut by_id = HashMap::new();

        for plan in plans.iter().flat_map(|p| p.types.iter()) {
            by_id.insert(plan.owner.case_id, plan);
            for direction in [Direction::CopyInto, Direction::CopyFrom] {
                let key = FunctionKey {
                    case_id: plan.owner.case_id,
                    direction,
                };
                nodes.insert(key, graph.add_node(key));
            }
        }

        for plan in by_id.values() {
            let id = plan.owner.case_id;
            let into = nodes[&FunctionKey {
                case_id: id,
                direction: Direction::CopyInto,
            }];
            let from = nodes[&FunctionKey {
                case_id: id,
                direction: Direction::CopyFrom,
            }];

            for other in registry {
                if plan.copy_into.fallback() == Some(FallbackPolicy::Redispatch)
                    && plan.copy_into.case_for(other.case_id).is_none()
                {
                    let target = FunctionKey {
                        case_id: other.case_id,
                        direction: Direction::CopyFrom,
                    };
                    if let Some(&to) = nodes.get(&target) {
                        let edge = CallEdge {
                            hop: Hop::Redispatch,
                            via: other.case_id,
                        };
                        graph.add_edge(into, to, edge);
                    }
                }
                if plan.copy_from.is_role_swap() {
                    let target = FunctionKey {
                        case_id: other.case_id,
                        direction: Direction::CopyInto,
                    };
                    if let Some(&to) = nodes.get(&target) {
                        let edge = CallEdge {
                            hop: Hop::RoleSwap,
                            via: other.case_id,
                        };
                        graph.add_edge(from, to, edge);
                    }
                }
            }
        }

        Self {
            graph,
            nodes,
            plans: by_id,
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// The hop a function takes for a given counterpart, if any.
    pub fn next_hop(&self, from: FunctionKey, counterpart: u32) -> Option<(Hop, FunctionKey)> {
        let node = *self.nodes.get(&from)?;
        self.graph
            .edges(node)
            .find(|e| e.weight().via == counterpart)
            .map(|e| (e.weight().hop, self.graph[e.target()]))
    }

    /// Strongly connected groups of more than one function: places where
    /// dispatch can bounce between functions.
    pub fn cycles(&self) -> Vec<Vec<FunctionKey>> {
        let mut cycles: Vec<Vec<FunctionKey>> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|scc| scc.len() > 1)
            .map(|scc| {
                let mut keys: Vec<FunctionKey> = scc.into_iter().map(|n| self.graph[n]).collect();
                keys.sort_by_key(|k| (k.case_id, k.direction == Direction::CopyFrom));
                keys
            })
            .collect();
        cycles.sort_by_key(|c| c.first().map(|k| k.case_id));
        cycles
    }

    /// Replay dispatch of `source` into `destination`, starting at the
    /// destination's copy-into like the runtime does.
    pub fn resolve(&self, destination: &TypeDescriptor, source: &TypeDescriptor) -> Outcome {
        let mut current = FunctionKey {
            case_id: destination.case_id,
            direction: Direction::CopyInto,
        };
        let mut visited: Vec<FunctionKey> = Vec::new();
        let unsupported = || {
            Outcome::Unsupported(UnsupportedCopy {
                source_type: source.name.clone(),
                destination_type: destination.name.clone(),
            })
        };

        loop {
            if visited.contains(&current) {
                visited.push(current);
                return Outcome::Loop { path: visited };
            }
            visited.push(current);

            let Some(plan) = self.plans.get(&current.case_id) else {
                return unsupported();
            };
            let function = plan.function(current.direction);
            let counterpart = match current.direction {
                Direction::CopyInto => source.case_id,
                Direction::CopyFrom => destination.case_id,
            };

            if let Some(case) = function.case_for(counterpart) {
                return Outcome::Copied {
                    function: current,
                    hops: visited.len() - 1,
                    paths: case.paths(),
                };
            }
            if function.fallback() == Some(FallbackPolicy::TerminalError) {
                return unsupported();
            }
            match self.next_hop(current, counterpart) {
                Some((_, next)) => current = next,
                None => return unsupported(),
            }
        }
    }
}

// ─── Audit ─────────────────────────────────────────────────────────

/// Where dispatch of one ordered pair ends up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// A case in `function`, reached after `hops` forwards (0 = direct).
    Copied {
        function: FunctionKey,
        hops: usize,
        paths: Vec<CopyPath>,
    },
    Unsupported(UnsupportedCopy),
    /// Dispatch revisits a function; `path` ends with the repeated one.
    Loop { path: Vec<FunctionKey> },
}

#[derive(Clone, Debug)]
pub struct PairAudit {
    pub destination: String,
    pub source: String,
    /// Either side is Sparse, so no case is expected anywhere.
    pub sparse: bool,
    pub outcome: Outcome,
}

impl PairAudit {
    /// A non-sparse pair must never loop.
    pub fn is_failure(&self) -> bool {
        !self.sparse && matches!(self.outcome, Outcome::Loop { .. })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuditCounts {
    pub direct: usize,
    pub redispatched: usize,
    pub unsupported: usize,
    pub loops: usize,
    pub sparse: usize,
}

pub struct AuditReport {
    pub type_count: usize,
    pub pairs: Vec<PairAudit>,
    pub cycles: Vec<Vec<String>>,
}

/// Audit every ordered pair of the registry against its plans.
pub fn audit<'r>(registry: &'r Registry, plans: &[BackendPlan<'r>]) -> AuditReport {
    let graph = CallGraph::build(registry, plans);
    tracing::debug!(
        functions = graph.node_count(),
        edges = graph.edge_count(),
        "built dispatch call graph"
    );

    let mut pairs = Vec::with_capacity(registry.len() * registry.len());
    for destination in registry {
        for source in registry {
            pairs.push(PairAudit {
                destination: destination.name.clone(),
                source: source.name.clone(),
                sparse: destination.is_sparse() || source.is_sparse(),
                outcome: graph.resolve(destination, source),
            });
        }
    }

    let label = |key: &FunctionKey| {
        let name = registry
            .by_case_id(key.case_id)
            .map(|t| t.name.as_str())
            .unwrap_or("?");
        format!("{}::{}", name, key.direction)
    };
    let cycles = graph
        .cycles()
        .iter()
        .map(|c| c.iter().map(&label).collect())
        .collect();

    AuditReport {
        type_count: registry.len(),
        pairs,
        cycles,
    }
}

impl AuditReport {
    pub fn counts(&self) -> AuditCounts {
        let mut counts = AuditCounts::default();
        for pair in &self.pairs {
            if pair.sparse {
                counts.sparse += 1;
            }
            match &pair.outcome {
                Outcome::Copied { hops: 0, .. } => counts.direct += 1,
                Outcome::Copied { .. } => counts.redispatched += 1,
                Outcome::Unsupported(_) => counts.unsupported += 1,
                Outcome::Loop { .. } => counts.loops += 1,
            }
        }
        counts
    }

    pub fn failures(&self) -> impl Iterator<Item = &PairAudit> {
        self.pairs.iter().filter(|p| p.is_failure())
    }

    pub fn is_clean(&self) -> bool {
        self.failures().next().is_none()
    }

    pub fn get(&self, destination: &str, source: &str) -> Option<&PairAudit> {
        self.pairs
            .iter()
            .find(|p| p.destination == destination && p.source == source)
    }

    /// Human-readable summary.
    pub fn format_report(&self) -> String {
        let counts = self.counts();
        let mut out = String::new();
        out.push_str(&format!(
            "Copy dispatch audit: {} types, {} ordered pairs\n",
            self.type_count,
            self.pairs.len()
        ));
        out.push_str(&format!("  direct:        {}\n", counts.direct));
        out.push_str(&format!("  redispatched:  {}\n", counts.redispatched));
        out.push_str(&format!("  unsupported:   {}\n", counts.unsupported));
        out.push_str(&format!("  loops:         {}\n", counts.loops));
        out.push_str(&format!("  sparse pairs:  {}\n", counts.sparse));

        if !self.cycles.is_empty() {
            out.push_str(&format!(
                "\n{} cycle(s) in the dispatch call graph:\n",
                self.cycles.len()
            ));
            for cycle in &self.cycles {
                out.push_str(&format!("  {}\n", cycle.join(" <-> ")));
            }
        }

        let failures: Vec<&PairAudit> = self.failures().collect();
        if !failures.is_empty() {
            out.push_str(&format!("\n{} dense pair(s) never terminate:\n", failures.len()));
            for pair in failures {
                out.push_str(&format!("  {} -> {}\n", pair.source, pair.destination));
            }
        }
        out
    }
}

impl fmt::Display for FunctionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}::{}", self.case_id, self.direction)
    }
}
