//! Lowering of relational pseudo-Boolean constraints to generalized clauses.

use satprep_formula::{GenClause, GenFormula, Lit};

/// Relational operator of a pseudo-Boolean constraint.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RelOp {
    /// The weighted sum of true literals must be at least the right hand side.
    GtEq,
    /// The weighted sum of true literals must equal the right hand side.
    Eq,
}

/// Strategy for lowering a relational pseudo-Boolean constraint into generalized clauses.
///
/// An implementation appends to `out` a finite set of clauses whose conjunction is logically
/// equivalent to `sum(weights[i] * lits[i]) op rhs` over the same variables. Auxiliary variables
/// must be allocated through [`GenFormula::new_var`] so they are registered against the variable
/// count.
pub trait Encode {
    fn encode(&mut self, lits: &[Lit], weights: &[i64], op: RelOp, rhs: i64, out: &mut GenFormula);
}

/// The identity lowering.
///
/// A generalized clause already expresses a weighted at-least bound, so `>=` becomes a single
/// clause and `=` becomes the two complementary bounds, the `<=` direction rewritten as `>=` by
/// negating weights and right hand side. No auxiliary variables are introduced.
#[derive(Copy, Clone, Debug, Default)]
pub struct DirectEncoder;

impl Encode for DirectEncoder {
    fn encode(&mut self, lits: &[Lit], weights: &[i64], op: RelOp, rhs: i64, out: &mut GenFormula) {
        match op {
            RelOp::GtEq => out.add_constr(at_least_clause(lits, weights, rhs)),
            RelOp::Eq => {
                out.add_constr(at_least_clause(lits, weights, rhs));
                let negated: Vec<i64> = weights.iter().map(|&weight| -weight).collect();
                out.add_constr(at_least_clause(lits, &negated, -rhs));
            }
        }
    }
}

/// Build the clause `sum(weights[i] * lits[i]) >= rhs` with all weights made positive.
///
/// A term with negative weight is rewritten over the negated literal: `w*l` equals `w - w*!l`,
/// so the weight flips sign and the right hand side shifts by the original weight. Zero weight
/// terms contribute nothing and are dropped.
pub fn at_least_clause(lits: &[Lit], weights: &[i64], mut rhs: i64) -> GenClause {
    let mut norm_lits = Vec::with_capacity(lits.len());
    let mut norm_weights = Vec::with_capacity(lits.len());
    for (&lit, &weight) in lits.iter().zip(weights.iter()) {
        if weight == 0 {
            continue;
        }
        if weight < 0 {
            norm_lits.push(!lit);
            norm_weights.push(-weight);
            rhs -= weight;
        } else {
            norm_lits.push(lit);
            norm_weights.push(weight);
        }
    }
    GenClause::weighted(&norm_lits, &norm_weights, rhs)
}

#[cfg(test)]
mod tests {
    use super::*;

    use satprep_formula::{lits, GenClause};

    #[test]
    fn gt_eq_is_one_clause() {
        let mut out = GenFormula::new();
        DirectEncoder.encode(&lits![1, 2], &[1, 2], RelOp::GtEq, 2, &mut out);

        assert_eq!(out.len(), 1);
        assert_eq!(
            out.iter().next().unwrap(),
            &GenClause::weighted(&lits![1, 2], &[1, 2], 2)
        );
        assert_eq!(out.var_count(), 2);
    }

    #[test]
    fn eq_is_both_bounds() {
        let mut out = GenFormula::new();
        DirectEncoder.encode(&lits![1, 2], &[2, 3], RelOp::Eq, 3, &mut out);

        let constrs: Vec<_> = out.iter().collect();
        assert_eq!(constrs.len(), 2);
        // sum >= 3
        assert_eq!(constrs[0], &GenClause::weighted(&lits![1, 2], &[2, 3], 3));
        // sum <= 3, i.e. -2 x1 - 3 x2 >= -3, normalized over negated literals
        assert_eq!(constrs[1], &GenClause::weighted(&lits![-1, -2], &[2, 3], 2));
    }

    #[test]
    fn negative_weights_are_normalized() {
        // 2 x1 - 3 x2 >= -1  <=>  2 x1 + 3 x~2 >= 2
        let clause = at_least_clause(&lits![1, 2], &[2, -3], -1);

        assert_eq!(clause, GenClause::weighted(&lits![1, -2], &[2, 3], 2));
    }

    #[test]
    fn zero_weights_are_dropped() {
        let clause = at_least_clause(&lits![1, 2, 3], &[1, 0, 1], 1);

        assert_eq!(clause, GenClause::weighted(&lits![1, 3], &[1, 1], 1));
        assert_eq!(clause.len(), 2);
    }
}
