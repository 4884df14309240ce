//! Normalized problems and their root-level models.
use satprep_formula::{GenClause, Lit, Var};

/// Satisfiability status of a problem.
///
/// Normalization itself only ever reports `Unknown` or `Unsat`. `Sat` belongs to the downstream
/// search engine, which reuses this status once it finds a satisfying assignment.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum Status {
    #[default]
    Unknown,
    Sat,
    Unsat,
}

/// Outcome of merging a forced literal into a model.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UnitMerge {
    /// The variable was free, the polarity is now recorded.
    Recorded,
    /// The same polarity was already recorded.
    AlreadyRecorded,
    /// The opposite polarity was already recorded.
    Conflict,
}

/// Root-level forced assignments, one polarity slot per variable.
///
/// The model stores polarity only. The search engine that consumes a normalized problem layers
/// decision depth on top of this in its own structures, normalization never needs it.
#[derive(Default, Clone, Debug)]
pub struct Model {
    assignment: Vec<Option<bool>>,
}

impl Model {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.assignment.resize(count, None);
    }

    /// Number of variable slots.
    pub fn var_count(&self) -> usize {
        self.assignment.len()
    }

    /// Current assignment as slice.
    pub fn assignment(&self) -> &[Option<bool>] {
        &self.assignment
    }

    /// Forced polarity of a variable, `None` while free.
    pub fn value(&self, var: Var) -> Option<bool> {
        self.assignment[var.index()]
    }

    /// Truth value of a literal under the model, `None` while its variable is free.
    pub fn lit_value(&self, lit: Lit) -> Option<bool> {
        self.assignment[lit.index()].map(|value| value ^ lit.is_negative())
    }

    pub fn lit_is_true(&self, lit: Lit) -> bool {
        self.assignment[lit.index()] == Some(lit.is_positive())
    }

    pub fn lit_is_false(&self, lit: Lit) -> bool {
        self.assignment[lit.index()] == Some(lit.is_negative())
    }

    /// Merge a forced literal into the model.
    ///
    /// This is the single merge rule shared by every ingestion path and by the simplifier: the
    /// first assignment of a variable is recorded, repeating it is a no-op, contradicting it is a
    /// conflict the caller must turn into an unsatisfiable status.
    pub fn merge_unit(&mut self, lit: Lit) -> UnitMerge {
        match self.lit_value(lit) {
            None => {
                self.assignment[lit.index()] = Some(lit.is_positive());
                UnitMerge::Recorded
            }
            Some(true) => UnitMerge::AlreadyRecorded,
            Some(false) => UnitMerge::Conflict,
        }
    }
}

/// A partially solved, simplified constraint set ready for a search engine.
///
/// Built by one of the `Problem::from_*` ingestion entry points, mutated only during that single
/// ingestion and simplification pass, then owned read-only by the caller.
#[derive(Default, Debug)]
pub struct Problem {
    pub(crate) var_count: usize,
    pub(crate) units: Vec<Lit>,
    pub(crate) model: Model,
    pub(crate) clauses: Vec<GenClause>,
    pub(crate) status: Status,
}

impl Problem {
    /// Number of distinct variables, the width of the model.
    pub fn var_count(&self) -> usize {
        self.var_count
    }

    /// Forced literals discovered during ingestion and simplification.
    pub fn units(&self) -> &[Lit] {
        &self.units
    }

    /// The root-level model.
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// The residual clauses.
    ///
    /// Never contains a clause that is trivially true or contradicted under the model.
    pub fn clauses(&self) -> &[GenClause] {
        &self.clauses
    }

    /// Satisfiability status.
    ///
    /// A problem with no residual clauses and status `Unknown` is satisfiable by the recorded
    /// model, all remaining variables are free.
    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_unsat(&self) -> bool {
        self.status == Status::Unsat
    }

    /// Mark the problem unsatisfiable.
    ///
    /// The residual clauses are dropped, they carry no information once the whole problem is
    /// known to be unsatisfiable.
    pub(crate) fn mark_unsat(&mut self) {
        self.status = Status::Unsat;
        self.clauses.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use satprep_formula::lit;

    #[test]
    fn merge_unit_rule() {
        let mut model = Model::default();
        model.set_var_count(2);

        assert_eq!(model.merge_unit(lit!(1)), UnitMerge::Recorded);
        assert_eq!(model.merge_unit(lit!(1)), UnitMerge::AlreadyRecorded);
        assert_eq!(model.merge_unit(lit!(-1)), UnitMerge::Conflict);
        assert_eq!(model.merge_unit(lit!(-2)), UnitMerge::Recorded);

        assert_eq!(model.value(satprep_formula::var!(1)), Some(true));
        assert_eq!(model.value(satprep_formula::var!(2)), Some(false));
    }

    #[test]
    fn lit_values() {
        let mut model = Model::default();
        model.set_var_count(2);
        model.merge_unit(lit!(-1));

        assert!(model.lit_is_true(lit!(-1)));
        assert!(model.lit_is_false(lit!(1)));
        assert_eq!(model.lit_value(lit!(1)), Some(false));
        assert_eq!(model.lit_value(lit!(2)), None);
    }
}
