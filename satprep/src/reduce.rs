//! Algebraic reduction of constraints before they enter a problem.
//!
//! Every ingestion path funnels its constraints through [`reduce`]. The short-circuits below are
//! what lets a constraint collapse to forced assignments or to immediate unsatisfiability without
//! ever reaching the clause list.

use satprep_formula::{GenClause, Lit};

/// Outcome of reducing a single constraint.
#[derive(Debug, PartialEq, Eq)]
pub enum Reduction {
    /// The constraint holds no matter what and contributes nothing.
    Trivial,
    /// The constraint can never be satisfied, the whole problem is unsatisfiable.
    Unsat,
    /// The constraint forces every one of its literals true.
    Units(Vec<Lit>),
    /// The constraint stays live as a generalized clause.
    Keep(GenClause),
}

/// Reduce a constraint against nothing but its own arithmetic.
///
/// With `W` the sum of all weights: a threshold of zero or less is vacuous, a threshold beyond
/// `W` is unreachable, a threshold of exactly `W` leaves no slack so every literal is forced, and
/// anything in between is kept for simplification and search. The empty plain clause falls out of
/// the second case (`W = 0 < 1`).
pub fn reduce(constr: GenClause) -> Reduction {
    let at_least = constr.at_least();
    if at_least <= 0 {
        return Reduction::Trivial;
    }
    let weight_sum = constr.weight_sum();
    if weight_sum < at_least {
        return Reduction::Unsat;
    }
    if weight_sum == at_least {
        return Reduction::Units(constr.lits().to_vec());
    }
    Reduction::Keep(constr)
}

#[cfg(test)]
mod tests {
    use super::*;

    use satprep_formula::lits;

    #[test]
    fn vacuous_threshold_is_dropped() {
        assert_eq!(
            reduce(GenClause::cardinality(&lits![1, 2], 0)),
            Reduction::Trivial
        );
        assert_eq!(
            reduce(GenClause::weighted(&lits![1, 2], &[3, 4], -1)),
            Reduction::Trivial
        );
    }

    #[test]
    fn unreachable_threshold_is_unsat() {
        assert_eq!(
            reduce(GenClause::cardinality(&lits![1, 2], 3)),
            Reduction::Unsat
        );
        assert_eq!(
            reduce(GenClause::weighted(&lits![1, 2], &[1, 2], 4)),
            Reduction::Unsat
        );
        // the empty clause
        assert_eq!(reduce(GenClause::clause(&[])), Reduction::Unsat);
    }

    #[test]
    fn tight_threshold_forces_all() {
        assert_eq!(
            reduce(GenClause::cardinality(&lits![1, -2], 2)),
            Reduction::Units(lits![1, -2].to_vec())
        );
        assert_eq!(
            reduce(GenClause::weighted(&lits![1, -2], &[2, 3], 5)),
            Reduction::Units(lits![1, -2].to_vec())
        );
        // a unit clause is the plain instance of this case
        assert_eq!(
            reduce(GenClause::clause(&lits![-7])),
            Reduction::Units(lits![-7].to_vec())
        );
    }

    #[test]
    fn slack_is_kept() {
        let card = GenClause::cardinality(&lits![1, 2, 3], 2);
        assert_eq!(reduce(card.clone()), Reduction::Keep(card));

        let plain = GenClause::clause(&lits![1, 2]);
        assert_eq!(reduce(plain.clone()), Reduction::Keep(plain));
    }
}
