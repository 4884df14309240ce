//! Fixpoint simplification of a problem under its root-level model.
use log::debug;
use vec_mut_scan::VecMutScan;

use satprep_formula::GenClause;

use crate::problem::{Problem, UnitMerge};

/// Propagate the forced assignments through the clause set to exhaustion.
///
/// Runs full passes over the clauses until a pass discovers no new forced assignment or a
/// contradiction surfaces. Every continuing pass removes clause-literal occurrences, so the
/// process terminates. Running it on an already simplified problem changes nothing.
pub fn simplify(problem: &mut Problem) {
    debug_assert_eq!(problem.model.var_count(), problem.var_count);

    let mut pass = 0;
    loop {
        pass += 1;
        let clauses_before = problem.clauses.len();
        let mut new_units = 0usize;
        let mut conflict = false;

        let Problem {
            clauses,
            model,
            units,
            ..
        } = problem;

        let mut scan = VecMutScan::new(clauses);
        'scan: while let Some(mut clause) = scan.next() {
            let mut lits = Vec::with_capacity(clause.len());
            let mut weights = Vec::with_capacity(clause.len());
            let mut at_least = clause.at_least();

            for (index, &lit) in clause.lits().iter().enumerate() {
                match model.lit_value(lit) {
                    None => {
                        lits.push(lit);
                        weights.push(clause.weight(index));
                    }
                    // A satisfied literal counts its weight against the threshold.
                    Some(true) => at_least -= clause.weight(index),
                    // A falsified literal leaves the clause body.
                    Some(false) => {}
                }
            }

            if at_least <= 0 {
                clause.remove();
                continue;
            }

            let weight_sum: i64 = weights.iter().sum();

            if weight_sum < at_least {
                conflict = true;
                break 'scan;
            }

            if weight_sum == at_least {
                // No slack left, the remaining literals are all forced.
                for &lit in lits.iter() {
                    match model.merge_unit(lit) {
                        UnitMerge::Recorded => {
                            units.push(lit);
                            new_units += 1;
                        }
                        UnitMerge::AlreadyRecorded => {}
                        UnitMerge::Conflict => {
                            conflict = true;
                            break 'scan;
                        }
                    }
                }
                clause.remove();
                continue;
            }

            if lits.len() != clause.len() {
                *clause = GenClause::weighted(&lits, &weights, at_least);
            }
        }
        drop(scan);

        if conflict {
            problem.mark_unsat();
            return;
        }

        debug!(
            "simplify pass {}: removed {} clauses, found {} units",
            pass,
            clauses_before - problem.clauses.len(),
            new_units
        );

        // Only new forced assignments can enable further reduction.
        if new_units == 0 {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::problem::Status;

    use satprep_formula::{lit, lits};

    fn problem_with(clauses: Vec<GenClause>, units: &[isize]) -> Problem {
        let mut problem = Problem::default();
        for clause in clauses.iter() {
            for &l in clause.lits() {
                problem.var_count = problem.var_count.max(l.index() + 1);
            }
        }
        for &unit in units {
            let unit = satprep_formula::Lit::from_dimacs(unit);
            problem.var_count = problem.var_count.max(unit.index() + 1);
            problem.units.push(unit);
        }
        problem.model.set_var_count(problem.var_count);
        for &unit in problem.units.clone().iter() {
            assert_eq!(problem.model.merge_unit(unit), UnitMerge::Recorded);
        }
        problem.clauses = clauses;
        problem
    }

    #[test]
    fn satisfied_clause_is_removed() {
        let mut problem = problem_with(vec![GenClause::clause(&lits![1, 2])], &[2]);
        simplify(&mut problem);

        assert_eq!(problem.status, Status::Unknown);
        assert!(problem.clauses.is_empty());
        assert_eq!(problem.units, lits![2]);
    }

    #[test]
    fn false_literals_shrink_the_body() {
        let mut problem = problem_with(vec![GenClause::clause(&lits![1, 2, 3])], &[-1]);
        simplify(&mut problem);

        assert_eq!(problem.clauses.len(), 1);
        assert_eq!(problem.clauses[0], GenClause::clause(&lits![2, 3]));
    }

    #[test]
    fn chained_propagation() {
        // -1 forces 2, which forces 3, which satisfies the last clause
        let mut problem = problem_with(
            vec![
                GenClause::clause(&lits![1, 2]),
                GenClause::clause(&lits![-2, 3]),
                GenClause::clause(&lits![3, 4]),
            ],
            &[-1],
        );
        simplify(&mut problem);

        assert_eq!(problem.status, Status::Unknown);
        assert!(problem.clauses.is_empty());
        assert_eq!(problem.units, lits![-1, 2, 3]);
        assert_eq!(problem.model.lit_value(lit!(4)), None);
    }

    #[test]
    fn conflict_during_propagation() {
        let mut problem = problem_with(
            vec![
                GenClause::clause(&lits![1, 2]),
                GenClause::clause(&lits![1, -2]),
            ],
            &[-1],
        );
        simplify(&mut problem);

        assert_eq!(problem.status, Status::Unsat);
        assert!(problem.clauses.is_empty());
    }

    #[test]
    fn starved_clause_is_a_conflict() {
        // 3 x1 + 1 x2 >= 4 cannot be met once x1 is false
        let mut problem = problem_with(
            vec![GenClause::weighted(&lits![1, 2], &[3, 1], 4)],
            &[-1],
        );
        simplify(&mut problem);

        assert_eq!(problem.status, Status::Unsat);
    }

    #[test]
    fn weighted_threshold_credit() {
        // 2 x1 + 1 x2 + 1 x3 >= 3 with x1 true leaves x2 + x3 >= 1, still slack
        let mut problem = problem_with(
            vec![GenClause::weighted(&lits![1, 2, 3], &[2, 1, 1], 3)],
            &[1],
        );
        simplify(&mut problem);

        assert_eq!(problem.status, Status::Unknown);
        assert_eq!(problem.clauses.len(), 1);
        assert_eq!(problem.clauses[0], GenClause::clause(&lits![2, 3]));
    }

    #[test]
    fn weighted_forcing() {
        // 2 x1 + 2 x2 >= 4 forces both once simplification sees there is no slack
        let mut problem = problem_with(
            vec![GenClause::weighted(&lits![1, 2, 3], &[2, 2, 1], 4)],
            &[-3],
        );
        simplify(&mut problem);

        assert_eq!(problem.status, Status::Unknown);
        assert!(problem.clauses.is_empty());
        assert_eq!(problem.units, lits![-3, 1, 2]);
    }

    #[test]
    fn idempotent() {
        let mut problem = problem_with(
            vec![
                GenClause::clause(&lits![1, 2]),
                GenClause::cardinality(&lits![2, 3, 4], 2),
            ],
            &[-1],
        );
        simplify(&mut problem);

        let units = problem.units.clone();
        let clauses = problem.clauses.clone();
        let status = problem.status;

        simplify(&mut problem);

        assert_eq!(problem.units, units);
        assert_eq!(problem.clauses, clauses);
        assert_eq!(problem.status, status);
    }
}
