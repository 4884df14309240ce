//! Generalized clauses and formulas built from them.
use std::cmp::max;
use std::fmt;

use crate::lit::{Lit, Var};

/// A generalized clause: at least `at_least` of the listed literals must be true, counted by
/// weight.
///
/// This single representation subsumes the three constraint kinds handled by the normalizer. A
/// plain disjunctive clause is threshold 1 with unit weights, a cardinality constraint is an
/// arbitrary threshold with unit weights, and a weighted (pseudo-Boolean) constraint carries one
/// positive weight per literal.
///
/// Weights are stored only when they are not all 1, so the common unweighted case stays compact.
#[derive(Clone, PartialEq, Eq)]
pub struct GenClause {
    lits: Vec<Lit>,
    weights: Vec<i64>,
    at_least: i64,
}

impl GenClause {
    /// Creates a plain disjunctive clause: at least one of the literals must be true.
    pub fn clause(lits: &[Lit]) -> GenClause {
        GenClause {
            lits: lits.to_vec(),
            weights: vec![],
            at_least: 1,
        }
    }

    /// Creates a cardinality constraint: at least `at_least` of the literals must be true.
    pub fn cardinality(lits: &[Lit], at_least: i64) -> GenClause {
        GenClause {
            lits: lits.to_vec(),
            weights: vec![],
            at_least,
        }
    }

    /// Creates a weighted constraint: the weights of the true literals must sum to at least
    /// `at_least`.
    ///
    /// `weights` is positional and must have the same length as `lits`.
    pub fn weighted(lits: &[Lit], weights: &[i64], at_least: i64) -> GenClause {
        assert_eq!(
            lits.len(),
            weights.len(),
            "one weight per literal required"
        );
        let weights = if weights.iter().all(|&weight| weight == 1) {
            vec![]
        } else {
            weights.to_vec()
        };
        GenClause {
            lits: lits.to_vec(),
            weights,
            at_least,
        }
    }

    /// The literals of this clause.
    pub fn lits(&self) -> &[Lit] {
        &self.lits
    }

    /// Number of literals.
    pub fn len(&self) -> usize {
        self.lits.len()
    }

    /// Whether the clause has no literals left.
    pub fn is_empty(&self) -> bool {
        self.lits.is_empty()
    }

    /// The satisfaction threshold.
    pub fn at_least(&self) -> i64 {
        self.at_least
    }

    /// The weight of the literal at `index`, 1 for unweighted clauses.
    pub fn weight(&self, index: usize) -> i64 {
        if self.weights.is_empty() {
            1
        } else {
            self.weights[index]
        }
    }

    /// Whether the clause carries non-unit weights.
    pub fn is_weighted(&self) -> bool {
        !self.weights.is_empty()
    }

    /// Whether this is a plain disjunctive clause.
    pub fn is_plain(&self) -> bool {
        self.at_least == 1 && self.weights.is_empty()
    }

    /// Sum of the weights of all listed literals.
    ///
    /// This is the largest value the left hand side can take, reached when every literal is true.
    pub fn weight_sum(&self) -> i64 {
        if self.weights.is_empty() {
            self.lits.len() as i64
        } else {
            self.weights.iter().sum()
        }
    }
}

/// Formats the clause in the PBS text syntax, e.g. `1 x0 2 x~1 >= 2 ;`.
impl fmt::Debug for GenClause {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (index, lit) in self.lits.iter().enumerate() {
            let polarity = if lit.is_positive() { "x" } else { "x~" };
            write!(f, "{} {}{} ", self.weight(index), polarity, lit.index())?;
        }
        write!(f, ">= {} ;", self.at_least)
    }
}

impl fmt::Display for GenClause {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A conjunction of generalized clauses together with a variable count.
///
/// This is the common currency between the parsers, the encoder and the problem builder. The
/// variable count tracks the width of the eventual model and only ever grows: it counts missing
/// variables too if a variable with a higher index is mentioned anywhere.
#[derive(Default, Clone, PartialEq, Eq)]
pub struct GenFormula {
    var_count: usize,
    constrs: Vec<GenClause>,
}

impl GenFormula {
    /// Create an empty formula.
    pub fn new() -> GenFormula {
        GenFormula::default()
    }

    /// Number of variables in the formula.
    ///
    /// A vector of this length can be indexed with the variable indices present.
    pub fn var_count(&self) -> usize {
        self.var_count
    }

    /// Increase the number of variables in the formula.
    ///
    /// If the parameter is less than the current variable count do nothing.
    pub fn set_var_count(&mut self, count: usize) {
        self.var_count = max(self.var_count, count)
    }

    /// Allocate a fresh variable past all variables seen so far.
    ///
    /// Used by encoders that introduce auxiliary variables, so that those are registered against
    /// the variable count.
    pub fn new_var(&mut self) -> Var {
        let var = Var::from_index(self.var_count);
        self.var_count += 1;
        var
    }

    /// Number of clauses in the formula.
    pub fn len(&self) -> usize {
        self.constrs.len()
    }

    /// Whether the formula contains no clauses.
    pub fn is_empty(&self) -> bool {
        self.constrs.is_empty()
    }

    /// Reserve room for `additional` clauses.
    ///
    /// Sizing hint only, the formula grows past it as needed.
    pub fn reserve(&mut self, additional: usize) {
        self.constrs.reserve(additional)
    }

    /// Appends a plain disjunctive clause to the formula.
    pub fn add_clause(&mut self, lits: &[Lit]) {
        self.add_constr(GenClause::clause(lits));
    }

    /// Appends a generalized clause to the formula, growing the variable count to cover all of
    /// its literals.
    pub fn add_constr(&mut self, constr: GenClause) {
        for &lit in constr.lits() {
            self.var_count = max(lit.index() + 1, self.var_count);
        }
        self.constrs.push(constr);
    }

    /// Iterator over all clauses.
    pub fn iter(&self) -> impl Iterator<Item = &GenClause> {
        self.constrs.iter()
    }

    /// Decompose into the variable count and the clause list.
    pub fn into_parts(self) -> (usize, Vec<GenClause>) {
        (self.var_count, self.constrs)
    }
}

/// Convert any iterable of [`Lit`] slices into a formula of plain clauses.
impl<F, C> From<F> for GenFormula
where
    F: IntoIterator<Item = C>,
    C: AsRef<[Lit]>,
{
    fn from(clauses: F) -> GenFormula {
        let mut formula = GenFormula::new();
        for clause in clauses {
            formula.add_clause(clause.as_ref());
        }
        formula
    }
}

impl fmt::Debug for GenFormula {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(&self.var_count(), f)?;
        f.debug_list().entries(self.iter()).finish()
    }
}

#[cfg(any(test, feature = "proptest-strategies"))]
#[doc(hidden)]
pub mod strategy {
    use super::*;

    use proptest::{collection::SizeRange, prelude::*, *};

    use crate::lit::strategy::lit;

    pub fn plain_formula(
        vars: impl Strategy<Value = usize>,
        clauses: impl Into<SizeRange>,
        clause_len: impl Into<SizeRange>,
    ) -> impl Strategy<Value = GenFormula> {
        let clauses = clauses.into();
        let clause_len = clause_len.into();

        // Not using ind_flat_map makes shrinking too expensive
        vars.prop_ind_flat_map(move |vars| {
            collection::vec(
                collection::vec(lit(0..vars), clause_len.clone()),
                clauses.clone(),
            )
        })
        .prop_map(|clauses| GenFormula::from(clauses.iter().map(|clause| &clause[..])))
    }

    pub fn gen_clause(
        vars: impl Strategy<Value = usize>,
        len: impl Into<SizeRange>,
    ) -> impl Strategy<Value = GenClause> {
        let len = len.into();
        vars.prop_ind_flat_map(move |vars| collection::vec(lit(0..vars), len.clone()))
            .prop_flat_map(|lits| {
                let max_weight = 5i64;
                let len = lits.len();
                (
                    Just(lits),
                    collection::vec(1..=max_weight, len),
                    1..=max(1, len as i64 * max_weight),
                )
            })
            .prop_map(|(lits, weights, at_least)| GenClause::weighted(&lits, &weights, at_least))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_clause() {
        let clause = GenClause::clause(&crate::lits![1, -2, 3]);

        assert!(clause.is_plain());
        assert!(!clause.is_weighted());
        assert_eq!(clause.at_least(), 1);
        assert_eq!(clause.weight_sum(), 3);
        assert_eq!(clause.weight(1), 1);
    }

    #[test]
    fn unit_weights_are_dropped() {
        let weighted = GenClause::weighted(&crate::lits![1, 2], &[1, 1], 2);
        let card = GenClause::cardinality(&crate::lits![1, 2], 2);

        assert_eq!(weighted, card);
        assert!(!weighted.is_weighted());
    }

    #[test]
    fn weight_sum() {
        let clause = GenClause::weighted(&crate::lits![1, -2, 3], &[2, 3, 1], 4);

        assert_eq!(clause.weight_sum(), 6);
        assert_eq!(clause.weight(0), 2);
        assert_eq!(clause.weight(2), 1);
        assert!(clause.is_weighted());
        assert!(!clause.is_plain());
    }

    #[test]
    fn formula_tracks_var_count() {
        let mut formula = GenFormula::new();
        formula.add_clause(&crate::lits![1, 2, 3]);
        assert_eq!(formula.var_count(), 3);

        formula.set_var_count(2);
        assert_eq!(formula.var_count(), 3);

        formula.add_constr(GenClause::cardinality(&crate::lits![-7, 2], 2));
        assert_eq!(formula.var_count(), 7);
        assert_eq!(formula.len(), 2);

        let aux = formula.new_var();
        assert_eq!(aux.index(), 7);
        assert_eq!(formula.var_count(), 8);
    }

    #[test]
    fn formula_from_clauses() {
        let formula = GenFormula::from(crate::cnf![
            1, 2, 3;
            -1, -2;
            7, 2;
        ]);

        assert_eq!(formula.var_count(), 7);
        assert_eq!(formula.len(), 3);
        assert!(formula.iter().all(|constr| constr.is_plain()));
    }
}
