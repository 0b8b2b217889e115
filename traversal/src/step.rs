//! The closed set of pipeline steps.

use crate::pattern::MatchStep;
use crate::predicate::join;
use crate::{CompareOp, ElementPredicate, Pipeline, Projection, VisibilityFilter, P};
use std::fmt;
use weft_core::{Direction, EdgeId, Value, VertexId};

/// Evaluation category of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKind {
    /// Introduces elements or values.
    Source,
    /// Passes or drops its input.
    Filter,
    /// One output per input.
    Map,
    /// Zero or more outputs per input.
    FlatMap,
    /// Drains its whole upstream before producing output.
    Barrier,
    /// Multi-pattern join.
    Match,
}

/// The two shapes of `where`.
#[derive(Debug, Clone)]
pub enum WhereFilter {
    /// Passes if `body`, started from `start`'s binding (or the current
    /// value), yields anything; with `end`, something equal to `end`'s binding.
    Traversal {
        start: Option<String>,
        body: Pipeline,
        end: Option<String>,
    },
    /// Compares `start`'s binding (or the current value) with `other`'s binding.
    Compare {
        start: Option<String>,
        op: CompareOp,
        other: String,
    },
}

/// A pipeline step.
#[derive(Debug, Clone)]
pub enum Step {
    // ==================== Sources ====================
    /// All vertices, or the listed ones.
    Vertices(Vec<VertexId>),
    /// All edges, or the listed ones.
    Edges(Vec<EdgeId>),
    Inject(Vec<Value>),

    // ==================== Navigation ====================
    /// Adjacent vertices.
    Adjacent {
        direction: Direction,
        labels: Vec<String>,
    },
    /// Incident edges.
    Incident {
        direction: Direction,
        labels: Vec<String>,
    },
    /// Endpoints of an edge.
    EdgeVertex(Direction),
    /// Property values.
    Values(Vec<String>),

    // ==================== Maps ====================
    Id,
    Label,
    Select {
        labels: Vec<String>,
        by: Vec<Projection>,
    },
    Constant(Value),
    Identity,

    // ==================== Filters ====================
    Has(ElementPredicate),
    Is(P),
    Where(WhereFilter),
    Not(Pipeline),
    And(Vec<Pipeline>),
    Or(Vec<Pipeline>),
    Dedup {
        labels: Vec<String>,
        by: Option<Projection>,
    },
    Limit(u64),
    SubgraphFilter(VisibilityFilter),

    // ==================== Other ====================
    Repeat {
        body: Pipeline,
        times: u32,
    },
    Count,
    Barrier,
    Match(Box<MatchStep>),
}

impl Step {
    pub fn kind(&self) -> StepKind {
        match self {
            Step::Vertices(_) | Step::Edges(_) | Step::Inject(_) => StepKind::Source,
            Step::Adjacent { .. }
            | Step::Incident { .. }
            | Step::EdgeVertex(_)
            | Step::Values(_)
            | Step::Repeat { .. } => StepKind::FlatMap,
            Step::Id | Step::Label | Step::Select { .. } | Step::Constant(_) | Step::Identity => {
                StepKind::Map
            }
            Step::Has(_)
            | Step::Is(_)
            | Step::Where(_)
            | Step::Not(_)
            | Step::And(_)
            | Step::Or(_)
            | Step::Dedup { .. }
            | Step::Limit(_)
            | Step::SubgraphFilter(_) => StepKind::Filter,
            Step::Count | Step::Barrier => StepKind::Barrier,
            Step::Match(_) => StepKind::Match,
        }
    }

    /// True for steps whose outputs are elements freshly read from the graph.
    pub fn introduces_elements(&self) -> bool {
        matches!(
            self,
            Step::Vertices(_)
                | Step::Edges(_)
                | Step::Adjacent { .. }
                | Step::Incident { .. }
                | Step::EdgeVertex(_)
        )
    }

    /// Nested pipelines owned by this step.
    pub fn children(&self) -> Vec<&Pipeline> {
        match self {
            Step::Where(WhereFilter::Traversal { body, .. })
            | Step::Not(body)
            | Step::Repeat { body, .. } => vec![body],
            Step::And(bodies) | Step::Or(bodies) => bodies.iter().collect(),
            Step::Select { by, .. } => by.iter().filter_map(projection_child).collect(),
            Step::Dedup { by, .. } => by.iter().filter_map(projection_child).collect(),
            Step::Match(m) => m.units().iter().flat_map(|u| u.bodies()).collect(),
            _ => Vec::new(),
        }
    }

    /// Mutable access to nested pipelines, for rewriting.
    pub fn children_mut(&mut self) -> Vec<&mut Pipeline> {
        match self {
            Step::Where(WhereFilter::Traversal { body, .. })
            | Step::Not(body)
            | Step::Repeat { body, .. } => vec![body],
            Step::And(bodies) | Step::Or(bodies) => bodies.iter_mut().collect(),
            Step::Select { by, .. } => by.iter_mut().filter_map(projection_child_mut).collect(),
            Step::Dedup { by, .. } => by.iter_mut().filter_map(projection_child_mut).collect(),
            Step::Match(m) => m.bodies_mut(),
            _ => Vec::new(),
        }
    }
}

fn projection_child(projection: &Projection) -> Option<&Pipeline> {
    match projection {
        Projection::Traversal(p) => Some(p),
        _ => None,
    }
}

fn projection_child_mut(projection: &mut Projection) -> Option<&mut Pipeline> {
    match projection {
        Projection::Traversal(p) => Some(p),
        _ => None,
    }
}

fn direction_name(direction: &Direction) -> &'static str {
    match direction {
        Direction::Out => "out",
        Direction::In => "in",
        Direction::Both => "both",
    }
}

impl fmt::Display for WhereFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WhereFilter::Traversal { start, body, end } => {
                if let Some(start) = start {
                    write!(f, "{}:", start)?;
                }
                write!(f, "[{}]", body)?;
                if let Some(end) = end {
                    write!(f, ":{}", end)?;
                }
                Ok(())
            }
            WhereFilter::Compare { start, op, other } => match start {
                Some(start) => write!(f, "{} {} {}", start, op, other),
                None => write!(f, "{}({})", op, other),
            },
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Vertices(ids) => write!(f, "V({})", join(ids)),
            Step::Edges(ids) => write!(f, "E({})", join(ids)),
            Step::Inject(values) => write!(f, "inject({})", join(values)),
            Step::Adjacent { direction, labels } => {
                write!(f, "{}({})", direction_name(direction), labels.join(","))
            }
            Step::Incident { direction, labels } => {
                write!(f, "{}E({})", direction_name(direction), labels.join(","))
            }
            Step::EdgeVertex(direction) => write!(f, "{}V()", direction_name(direction)),
            Step::Values(keys) => write!(f, "values({})", keys.join(",")),
            Step::Id => write!(f, "id()"),
            Step::Label => write!(f, "label()"),
            Step::Select { labels, by } => {
                write!(f, "select({})", labels.join(","))?;
                for projection in by {
                    write!(f, ".by({})", projection)?;
                }
                Ok(())
            }
            Step::Constant(value) => write!(f, "constant({})", value),
            Step::Identity => write!(f, "identity()"),
            Step::Has(predicate) => write!(f, "{}", predicate),
            Step::Is(predicate) => write!(f, "is({})", predicate),
            Step::Where(filter) => write!(f, "where({})", filter),
            Step::Not(body) => write!(f, "not([{}])", body),
            Step::And(bodies) => write!(f, "and({})", bracketed(bodies)),
            Step::Or(bodies) => write!(f, "or({})", bracketed(bodies)),
            Step::Dedup { labels, by } => {
                write!(f, "dedup({})", labels.join(","))?;
                if let Some(projection) = by {
                    write!(f, ".by({})", projection)?;
                }
                Ok(())
            }
            Step::Limit(n) => write!(f, "limit({})", n),
            Step::SubgraphFilter(filter) => write!(f, "subgraph({})", filter),
            Step::Repeat { body, times } => write!(f, "repeat([{}]).times({})", body, times),
            Step::Count => write!(f, "count()"),
            Step::Barrier => write!(f, "barrier()"),
            Step::Match(m) => write!(f, "{}", m),
        }
    }
}

fn bracketed(bodies: &[Pipeline]) -> String {
    bodies
        .iter()
        .map(|b| format!("[{}]", b))
        .collect::<Vec<_>>()
        .join(",")
}
