//! Match step definition and pattern planning.

use super::{AlgorithmKind, PatternExpr};
use crate::{Pipeline, ValidationError, ValidationResult};
use std::collections::BTreeSet;
use std::fmt;
use tracing::debug;

/// A `match(...)` step: pattern units joined over shared labels.
#[derive(Debug, Clone)]
pub struct MatchStep {
    units: Vec<PatternExpr>,
    algorithm: AlgorithmKind,
    retain: Option<BTreeSet<String>>,
}

/// The static analysis of a match step in a given scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchPlan {
    /// Label bound to the incoming value, if any.
    pub start_label: Option<String>,
    /// Per unit, labels that must be bound before it can run.
    pub requires: Vec<BTreeSet<String>>,
    /// Labels reported in the emitted map.
    pub labels: BTreeSet<String>,
}

impl MatchStep {
    /// Create a match step, checking the structure of every unit.
    pub fn new(units: Vec<PatternExpr>) -> ValidationResult<Self> {
        if units.is_empty() {
            return Err(ValidationError::malformed("match without patterns"));
        }
        for unit in &units {
            unit.check_structure()?;
        }
        let step = Self {
            units,
            algorithm: AlgorithmKind::default(),
            retain: None,
        };
        step.check_filters(&step.mentioned_by_plain_units())?;
        Ok(step)
    }

    /// Keep only these labels in the emitted traversers' bindings.
    pub fn retain<S: Into<String>>(mut self, labels: impl IntoIterator<Item = S>) -> Self {
        self.retain = Some(labels.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_algorithm(mut self, algorithm: AlgorithmKind) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn units(&self) -> &[PatternExpr] {
        &self.units
    }

    pub fn algorithm(&self) -> AlgorithmKind {
        self.algorithm
    }

    pub fn set_algorithm(&mut self, algorithm: AlgorithmKind) {
        self.algorithm = algorithm;
    }

    pub fn retained(&self) -> Option<&BTreeSet<String>> {
        self.retain.as_ref()
    }

    /// Append a unit, re-checking structure.
    pub fn add_unit(&mut self, unit: PatternExpr) -> ValidationResult<()> {
        unit.check_structure()?;
        self.units.push(unit);
        if let Err(err) = self.check_filters(&self.mentioned_by_plain_units()) {
            self.units.pop();
            return Err(err);
        }
        Ok(())
    }

    pub(crate) fn bodies_mut(&mut self) -> Vec<&mut Pipeline> {
        self.units.iter_mut().flat_map(|u| u.bodies_mut()).collect()
    }

    /// Labels of the emitted map: every start label and every produced label.
    pub fn output_labels(&self) -> BTreeSet<String> {
        self.units
            .iter()
            .filter(|u| !u.is_filter())
            .flat_map(|u| {
                let mut labels: BTreeSet<String> = u.start_labels().into_iter().collect();
                labels.extend(u.produces());
                labels
            })
            .collect()
    }

    /// Plan this match for traversers already carrying `upstream` labels.
    ///
    /// Root labels are start labels no unit produces. A single root that is
    /// not bound upstream becomes the start label. Several roots are only
    /// allowed if all of them are bound upstream. Without roots (a cyclic
    /// pattern) the first start label not bound upstream is used.
    pub fn plan(&self, upstream: &BTreeSet<String>) -> ValidationResult<MatchPlan> {
        let produced: BTreeSet<String> = self.units.iter().flat_map(|u| u.produces()).collect();

        let mut roots: Vec<String> = Vec::new();
        for unit in self.units.iter().filter(|u| !u.is_filter()) {
            for label in unit.requires() {
                if !produced.contains(&label) && !roots.contains(&label) {
                    roots.push(label);
                }
            }
        }

        let unbound_roots: Vec<&String> = roots.iter().filter(|r| !upstream.contains(*r)).collect();
        let start_label = if roots.len() > 1 && !unbound_roots.is_empty() {
            return Err(ValidationError::unsolvable_pattern(roots));
        } else if let Some(root) = unbound_roots.first() {
            Some((*root).clone())
        } else if roots.is_empty() {
            self.units
                .iter()
                .flat_map(|u| u.start_labels())
                .find(|label| !upstream.contains(label))
        } else {
            None
        };

        // Simulate binding until nothing new becomes ready.
        let requires = PatternExpr::join_requirements(&self.units);
        let mut bound = upstream.clone();
        bound.extend(start_label.iter().cloned());
        let plain: Vec<usize> = (0..self.units.len())
            .filter(|&i| !self.units[i].is_filter())
            .collect();
        let mut done = vec![false; self.units.len()];
        loop {
            let mut progressed = false;
            for &i in &plain {
                if !done[i] && requires[i].is_subset(&bound) {
                    bound.extend(self.units[i].produces());
                    done[i] = true;
                    progressed = true;
                }
            }
            if !progressed {
                break;
            }
        }
        for &i in &plain {
            if !done[i] {
                let missing = requires[i].difference(&bound).next().cloned();
                return Err(ValidationError::unreachable_label(missing.unwrap_or_default()));
            }
        }
        self.check_filters(&bound)?;

        let mut labels = self.output_labels();
        labels.extend(start_label.iter().cloned());

        debug!(
            start = ?start_label,
            units = self.units.len(),
            algorithm = %self.algorithm,
            "match planned"
        );

        Ok(MatchPlan {
            start_label,
            requires,
            labels,
        })
    }

    fn mentioned_by_plain_units(&self) -> BTreeSet<String> {
        self.units
            .iter()
            .filter(|u| !u.is_filter())
            .flat_map(|u| u.referenced())
            .collect()
    }

    /// WHERE/NOT units, at any depth, may only mention `available` labels.
    fn check_filters(&self, available: &BTreeSet<String>) -> ValidationResult<()> {
        fn visit(expr: &PatternExpr, available: &BTreeSet<String>) -> ValidationResult<()> {
            match expr {
                PatternExpr::Not(child) | PatternExpr::Where(child) => {
                    if let Some(label) = child.referenced().difference(available).next() {
                        return Err(ValidationError::where_introduces_label(label.clone()));
                    }
                    visit(child, available)
                }
                PatternExpr::And(children) | PatternExpr::Or { children, .. } => {
                    children.iter().try_for_each(|c| visit(c, available))
                }
                PatternExpr::Clause(_) => Ok(()),
            }
        }
        self.units.iter().try_for_each(|u| visit(u, available))
    }
}

impl fmt::Display for MatchStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "match({})", crate::predicate::join(&self.units))?;
        if let Some(retain) = &self.retain {
            let labels: Vec<&str> = retain.iter().map(|s| s.as_str()).collect();
            write!(f, ".retain({})", labels.join(","))?;
        }
        Ok(())
    }
}
