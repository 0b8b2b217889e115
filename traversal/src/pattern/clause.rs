//! Pattern expressions.

use crate::{CompareOp, Pipeline, ValidationError, ValidationResult};
use std::collections::BTreeSet;
use std::fmt;

/// What a clause does with its start label's value.
#[derive(Debug, Clone)]
pub enum ClauseBody {
    /// Run a pipeline seeded with the start value.
    Traversal(Pipeline),
    /// Compare the start value with another label's value.
    Compare { op: CompareOp, other: String },
}

/// A single pattern: `start -> body -> end?`.
#[derive(Debug, Clone)]
pub struct Clause {
    pub start: String,
    pub body: ClauseBody,
    /// Bound to each body output. When already bound, outputs must equal it.
    /// Absent for clauses that only filter.
    pub end: Option<String>,
}

/// A boolean expression over clauses.
#[derive(Debug, Clone)]
pub enum PatternExpr {
    Clause(Clause),
    And(Vec<PatternExpr>),
    /// Inclusive union of the succeeding children, or just the first one
    /// when `exclusive`.
    Or {
        children: Vec<PatternExpr>,
        exclusive: bool,
    },
    Not(Box<PatternExpr>),
    Where(Box<PatternExpr>),
}

impl PatternExpr {
    /// `start.body.as(end)`
    pub fn clause(start: impl Into<String>, body: Pipeline, end: impl Into<String>) -> Self {
        PatternExpr::Clause(Clause {
            start: start.into(),
            body: ClauseBody::Traversal(body),
            end: Some(end.into()),
        })
    }

    /// `start.body` with no end label: passes if the body yields anything.
    pub fn filter(start: impl Into<String>, body: Pipeline) -> Self {
        PatternExpr::Clause(Clause {
            start: start.into(),
            body: ClauseBody::Traversal(body),
            end: None,
        })
    }

    /// `where(start op other)`
    pub fn compare(start: impl Into<String>, op: CompareOp, other: impl Into<String>) -> Self {
        PatternExpr::Where(Box::new(PatternExpr::Clause(Clause {
            start: start.into(),
            body: ClauseBody::Compare {
                op,
                other: other.into(),
            },
            end: None,
        })))
    }

    pub fn and(children: Vec<PatternExpr>) -> Self {
        PatternExpr::And(children)
    }

    pub fn or(children: Vec<PatternExpr>) -> Self {
        PatternExpr::Or {
            children,
            exclusive: false,
        }
    }

    /// Like `or`, but only the first succeeding child contributes.
    pub fn or_first(children: Vec<PatternExpr>) -> Self {
        PatternExpr::Or {
            children,
            exclusive: true,
        }
    }

    pub fn not(child: PatternExpr) -> Self {
        PatternExpr::Not(Box::new(child))
    }

    pub fn where_(child: PatternExpr) -> Self {
        PatternExpr::Where(Box::new(child))
    }

    /// True for units that may only test labels, never bind them.
    pub fn is_filter(&self) -> bool {
        matches!(self, PatternExpr::Not(_) | PatternExpr::Where(_))
    }

    /// Labels this expression binds when it succeeds.
    pub fn produces(&self) -> BTreeSet<String> {
        match self {
            PatternExpr::Clause(clause) => clause.end.iter().cloned().collect(),
            PatternExpr::And(children) => children.iter().flat_map(|c| c.produces()).collect(),
            PatternExpr::Or { children, .. } => {
                let mut iter = children.iter().map(|c| c.produces());
                let first = iter.next().unwrap_or_default();
                iter.fold(first, |acc, next| acc.intersection(&next).cloned().collect())
            }
            PatternExpr::Not(_) | PatternExpr::Where(_) => BTreeSet::new(),
        }
    }

    /// Labels that must be bound before this expression can run.
    pub fn requires(&self) -> BTreeSet<String> {
        match self {
            PatternExpr::Clause(clause) => {
                let mut labels = BTreeSet::new();
                labels.insert(clause.start.clone());
                if let ClauseBody::Compare { other, .. } = &clause.body {
                    labels.insert(other.clone());
                }
                labels
            }
            PatternExpr::And(children) => {
                let produced: BTreeSet<String> =
                    children.iter().flat_map(|c| c.produces()).collect();
                children
                    .iter()
                    .flat_map(|c| c.requires())
                    .filter(|label| !produced.contains(label))
                    .collect()
            }
            PatternExpr::Or { children, .. } => {
                children.iter().flat_map(|c| c.requires()).collect()
            }
            PatternExpr::Not(child) | PatternExpr::Where(child) => child.referenced(),
        }
    }

    /// Prerequisites of each unit when evaluated next to its siblings.
    ///
    /// A label a unit mentions but does not hand back, such as one bound by
    /// only some branches of an OR, becomes a prerequisite whenever a sibling
    /// binds it. The unit then tests the sibling's value instead of binding a
    /// private one that is later dropped.
    pub fn join_requirements(units: &[PatternExpr]) -> Vec<BTreeSet<String>> {
        let produced: Vec<BTreeSet<String>> = units.iter().map(|u| u.produces()).collect();
        units
            .iter()
            .enumerate()
            .map(|(i, unit)| {
                let mut requires = unit.requires();
                for label in unit.referenced() {
                    let from_sibling = produced
                        .iter()
                        .enumerate()
                        .any(|(j, labels)| j != i && labels.contains(&label));
                    if from_sibling && !produced[i].contains(&label) {
                        requires.insert(label);
                    }
                }
                requires
            })
            .collect()
    }

    /// Every label mentioned anywhere in the expression.
    pub fn referenced(&self) -> BTreeSet<String> {
        match self {
            PatternExpr::Clause(clause) => {
                let mut labels = BTreeSet::new();
                labels.insert(clause.start.clone());
                labels.extend(clause.end.iter().cloned());
                if let ClauseBody::Compare { other, .. } = &clause.body {
                    labels.insert(other.clone());
                }
                labels
            }
            PatternExpr::And(children) | PatternExpr::Or { children, .. } => {
                children.iter().flat_map(|c| c.referenced()).collect()
            }
            PatternExpr::Not(child) | PatternExpr::Where(child) => child.referenced(),
        }
    }

    /// Start labels of the plain clauses, in declaration order.
    pub fn start_labels(&self) -> Vec<String> {
        match self {
            PatternExpr::Clause(clause) => vec![clause.start.clone()],
            PatternExpr::And(children) | PatternExpr::Or { children, .. } => {
                let mut labels: Vec<String> = Vec::new();
                for label in children.iter().flat_map(|c| c.start_labels()) {
                    if !labels.contains(&label) {
                        labels.push(label);
                    }
                }
                labels
            }
            PatternExpr::Not(_) | PatternExpr::Where(_) => Vec::new(),
        }
    }

    /// Nested pipelines.
    pub fn bodies(&self) -> Vec<&Pipeline> {
        match self {
            PatternExpr::Clause(Clause {
                body: ClauseBody::Traversal(p),
                ..
            }) => vec![p],
            PatternExpr::Clause(_) => Vec::new(),
            PatternExpr::And(children) | PatternExpr::Or { children, .. } => {
                children.iter().flat_map(|c| c.bodies()).collect()
            }
            PatternExpr::Not(child) | PatternExpr::Where(child) => child.bodies(),
        }
    }

    pub fn bodies_mut(&mut self) -> Vec<&mut Pipeline> {
        match self {
            PatternExpr::Clause(Clause {
                body: ClauseBody::Traversal(p),
                ..
            }) => vec![p],
            PatternExpr::Clause(_) => Vec::new(),
            PatternExpr::And(children) | PatternExpr::Or { children, .. } => {
                children.iter_mut().flat_map(|c| c.bodies_mut()).collect()
            }
            PatternExpr::Not(child) | PatternExpr::Where(child) => child.bodies_mut(),
        }
    }

    /// Reject empty connectives and comparison clauses that would bind.
    pub fn check_structure(&self) -> ValidationResult<()> {
        match self {
            PatternExpr::Clause(clause) => {
                if clause.start.is_empty() {
                    return Err(ValidationError::malformed("clause without a start label"));
                }
                if matches!(clause.body, ClauseBody::Compare { .. }) && clause.end.is_some() {
                    return Err(ValidationError::malformed(format!(
                        "comparison on '{}' cannot bind an end label",
                        clause.start
                    )));
                }
                Ok(())
            }
            PatternExpr::And(children) | PatternExpr::Or { children, .. } => {
                if children.is_empty() {
                    return Err(ValidationError::malformed("empty and/or"));
                }
                children.iter().try_for_each(|c| c.check_structure())
            }
            PatternExpr::Not(child) | PatternExpr::Where(child) => child.check_structure(),
        }
    }
}

impl fmt::Display for PatternExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternExpr::Clause(clause) => {
                match &clause.body {
                    ClauseBody::Traversal(p) => write!(f, "{}:[{}]", clause.start, p)?,
                    ClauseBody::Compare { op, other } => {
                        write!(f, "{} {} {}", clause.start, op, other)?
                    }
                }
                if let Some(end) = &clause.end {
                    write!(f, ":{}", end)?;
                }
                Ok(())
            }
            PatternExpr::And(children) => write!(f, "and({})", crate::predicate::join(children)),
            PatternExpr::Or {
                children,
                exclusive,
            } => {
                let name = if *exclusive { "orFirst" } else { "or" };
                write!(f, "{}({})", name, crate::predicate::join(children))
            }
            PatternExpr::Not(child) => write!(f, "not({})", child),
            PatternExpr::Where(child) => write!(f, "where({})", child),
        }
    }
}
