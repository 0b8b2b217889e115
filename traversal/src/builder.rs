//! Fluent pipeline construction.
//!
//! Every method consumes the pipeline and returns it with one more step, so
//! traversals read left to right: `Pipeline::new().v().out(&["knows"]).count()`.
//! Anonymous child traversals start from the free functions in [`anon`].

use crate::pattern::{MatchStep, PatternExpr};
use crate::{
    CompareOp, ElementPredicate, Pipeline, Projection, Step, TraversalResult, WhereFilter, P,
};
use tracing::warn;
use weft_core::{Direction, EdgeId, ElementId, Value, VertexId};

fn owned(labels: &[&str]) -> Vec<String> {
    labels.iter().map(|l| l.to_string()).collect()
}

impl Pipeline {
    fn with(mut self, step: Step) -> Self {
        self.push(step);
        self
    }

    // ==================== Sources ====================

    /// All vertices.
    pub fn v(self) -> Self {
        self.with(Step::Vertices(Vec::new()))
    }

    /// The listed vertices. Unknown ids are skipped at run time.
    pub fn v_ids(self, ids: impl IntoIterator<Item = VertexId>) -> Self {
        self.with(Step::Vertices(ids.into_iter().collect()))
    }

    /// All edges.
    pub fn e(self) -> Self {
        self.with(Step::Edges(Vec::new()))
    }

    pub fn e_ids(self, ids: impl IntoIterator<Item = EdgeId>) -> Self {
        self.with(Step::Edges(ids.into_iter().collect()))
    }

    pub fn inject<V: Into<Value>>(self, values: impl IntoIterator<Item = V>) -> Self {
        self.with(Step::Inject(values.into_iter().map(Into::into).collect()))
    }

    // ==================== Navigation ====================

    pub fn out(self, labels: &[&str]) -> Self {
        self.adjacent(Direction::Out, labels)
    }

    pub fn in_(self, labels: &[&str]) -> Self {
        self.adjacent(Direction::In, labels)
    }

    pub fn both(self, labels: &[&str]) -> Self {
        self.adjacent(Direction::Both, labels)
    }

    pub fn out_e(self, labels: &[&str]) -> Self {
        self.incident(Direction::Out, labels)
    }

    pub fn in_e(self, labels: &[&str]) -> Self {
        self.incident(Direction::In, labels)
    }

    pub fn both_e(self, labels: &[&str]) -> Self {
        self.incident(Direction::Both, labels)
    }

    pub fn out_v(self) -> Self {
        self.with(Step::EdgeVertex(Direction::Out))
    }

    pub fn in_v(self) -> Self {
        self.with(Step::EdgeVertex(Direction::In))
    }

    pub fn both_v(self) -> Self {
        self.with(Step::EdgeVertex(Direction::Both))
    }

    fn adjacent(self, direction: Direction, labels: &[&str]) -> Self {
        self.with(Step::Adjacent {
            direction,
            labels: owned(labels),
        })
    }

    fn incident(self, direction: Direction, labels: &[&str]) -> Self {
        self.with(Step::Incident {
            direction,
            labels: owned(labels),
        })
    }

    /// Property values for the given keys. Missing keys are skipped.
    pub fn values(self, keys: &[&str]) -> Self {
        self.with(Step::Values(owned(keys)))
    }

    // ==================== Maps ====================

    pub fn id(self) -> Self {
        self.with(Step::Id)
    }

    pub fn label(self) -> Self {
        self.with(Step::Label)
    }

    /// Bound values: one label yields the value, several yield a map.
    pub fn select(self, labels: &[&str]) -> Self {
        self.with(Step::Select {
            labels: owned(labels),
            by: Vec::new(),
        })
    }

    /// Modulate the preceding `select` or `dedup`.
    ///
    /// Repeated `by` calls on a `select` cycle across its labels; on a `dedup`
    /// the last one wins.
    pub fn by(mut self, projection: Projection) -> Self {
        match self.last_mut() {
            Some(Step::Select { by, .. }) => by.push(projection),
            Some(Step::Dedup { by, .. }) => *by = Some(projection),
            other => warn!(
                step = %other.map(|s| s.to_string()).unwrap_or_default(),
                "by() ignored: previous step does not take a modulator"
            ),
        }
        self
    }

    pub fn constant(self, value: impl Into<Value>) -> Self {
        self.with(Step::Constant(value.into()))
    }

    pub fn identity(self) -> Self {
        self.with(Step::Identity)
    }

    // ==================== Filters ====================

    /// Elements whose property `key` satisfies `predicate`.
    pub fn has(self, key: &str, predicate: P) -> Self {
        self.with(Step::Has(ElementPredicate::property(key, predicate)))
    }

    pub fn has_label(self, labels: &[&str]) -> Self {
        self.with(Step::Has(ElementPredicate::has_label(labels.iter().copied())))
    }

    pub fn has_id<I: Into<ElementId>>(self, ids: impl IntoIterator<Item = I>) -> Self {
        self.with(Step::Has(ElementPredicate::has_id(ids)))
    }

    /// Filter with an arbitrary element predicate.
    pub fn has_element(self, predicate: ElementPredicate) -> Self {
        self.with(Step::Has(predicate))
    }

    pub fn is(self, predicate: P) -> Self {
        self.with(Step::Is(predicate))
    }

    /// Keep traversers for which `body` yields anything.
    pub fn where_(self, body: Pipeline) -> Self {
        self.with(Step::Where(WhereFilter::Traversal {
            start: None,
            body,
            end: None,
        }))
    }

    /// `where(as(start).body.as(end))`: run `body` from `start`'s binding and,
    /// with an `end`, require an output equal to `end`'s binding.
    pub fn where_as(self, start: &str, body: Pipeline, end: Option<&str>) -> Self {
        self.with(Step::Where(WhereFilter::Traversal {
            start: Some(start.to_string()),
            body,
            end: end.map(str::to_string),
        }))
    }

    /// Compare `start`'s binding (or the current value) with `other`'s.
    pub fn where_compare(self, start: Option<&str>, op: CompareOp, other: &str) -> Self {
        self.with(Step::Where(WhereFilter::Compare {
            start: start.map(str::to_string),
            op,
            other: other.to_string(),
        }))
    }

    pub fn not(self, body: Pipeline) -> Self {
        self.with(Step::Not(body))
    }

    pub fn and(self, bodies: Vec<Pipeline>) -> Self {
        self.with(Step::And(bodies))
    }

    pub fn or(self, bodies: Vec<Pipeline>) -> Self {
        self.with(Step::Or(bodies))
    }

    /// Drop repeats of the current value, or of the listed labels' bindings.
    pub fn dedup(self, labels: &[&str]) -> Self {
        self.with(Step::Dedup {
            labels: owned(labels),
            by: None,
        })
    }

    pub fn limit(self, n: u64) -> Self {
        self.with(Step::Limit(n))
    }

    // ==================== Other ====================

    pub fn repeat(self, body: Pipeline, times: u32) -> Self {
        self.with(Step::Repeat { body, times })
    }

    pub fn count(self) -> Self {
        self.with(Step::Count)
    }

    pub fn barrier(self) -> Self {
        self.with(Step::Barrier)
    }

    /// Label the last step. On an empty pipeline this labels an identity.
    pub fn as_(mut self, label: &str) -> Self {
        if self.is_empty() {
            self.push(Step::Identity);
        }
        self.label_last(label);
        self
    }

    /// Append a match over `units`.
    pub fn match_(self, units: Vec<PatternExpr>) -> TraversalResult<Self> {
        self.match_step(MatchStep::new(units)?)
    }

    /// Append a prepared match step.
    ///
    /// On a pipeline that starts with a source the labels bound upstream are
    /// known, so the pattern is planned against them right away. Anonymous
    /// pipelines are checked again when compiled or executed.
    pub fn match_step(self, step: MatchStep) -> TraversalResult<Self> {
        if self.is_rooted() {
            step.plan(&self.labels_before(self.len()))?;
        }
        Ok(self.with(Step::Match(Box::new(step))))
    }
}

/// Starting points for anonymous child traversals.
pub mod anon {
    use super::*;

    /// An empty pipeline.
    pub fn start() -> Pipeline {
        Pipeline::new()
    }

    pub fn as_(label: &str) -> Pipeline {
        start().as_(label)
    }

    pub fn out(labels: &[&str]) -> Pipeline {
        start().out(labels)
    }

    pub fn in_(labels: &[&str]) -> Pipeline {
        start().in_(labels)
    }

    pub fn both(labels: &[&str]) -> Pipeline {
        start().both(labels)
    }

    pub fn out_e(labels: &[&str]) -> Pipeline {
        start().out_e(labels)
    }

    pub fn in_e(labels: &[&str]) -> Pipeline {
        start().in_e(labels)
    }

    pub fn both_e(labels: &[&str]) -> Pipeline {
        start().both_e(labels)
    }

    pub fn out_v() -> Pipeline {
        start().out_v()
    }

    pub fn in_v() -> Pipeline {
        start().in_v()
    }

    pub fn both_v() -> Pipeline {
        start().both_v()
    }

    pub fn has(key: &str, predicate: P) -> Pipeline {
        start().has(key, predicate)
    }

    pub fn has_label(labels: &[&str]) -> Pipeline {
        start().has_label(labels)
    }

    pub fn values(keys: &[&str]) -> Pipeline {
        start().values(keys)
    }

    pub fn id() -> Pipeline {
        start().id()
    }

    pub fn label() -> Pipeline {
        start().label()
    }

    pub fn select(labels: &[&str]) -> Pipeline {
        start().select(labels)
    }

    pub fn constant(value: impl Into<Value>) -> Pipeline {
        start().constant(value)
    }

    pub fn identity() -> Pipeline {
        start().identity()
    }

    pub fn is(predicate: P) -> Pipeline {
        start().is(predicate)
    }

    pub fn where_(body: Pipeline) -> Pipeline {
        start().where_(body)
    }

    pub fn not(body: Pipeline) -> Pipeline {
        start().not(body)
    }

    pub fn repeat(body: Pipeline, times: u32) -> Pipeline {
        start().repeat(body, times)
    }

    pub fn count() -> Pipeline {
        start().count()
    }

    pub fn limit(n: u64) -> Pipeline {
        start().limit(n)
    }

    pub fn match_(units: Vec<PatternExpr>) -> TraversalResult<Pipeline> {
        start().match_(units)
    }
}
