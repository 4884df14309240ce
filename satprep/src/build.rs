//! Building problems from the ingestion paths.
//!
//! Every entry point produces a [`GenFormula`] first, then runs it through the one shared
//! accumulation routine: reduce each constraint, merge the forced literals into the model and
//! close the result under propagation. Logical unsatisfiability is never an error here, it is
//! reported as [`Status::Unsat`](crate::problem::Status::Unsat) on the returned problem.

use std::io;

use anyhow::Error;
use log::info;

use satprep_dimacs::DimacsParser;
use satprep_formula::{GenClause, GenFormula, InvalidLiteral, Lit};
use satprep_pbs::PbsParser;

use crate::problem::{Problem, UnitMerge};
use crate::reduce::{reduce, Reduction};
use crate::simplify::simplify;

/// A cardinality constraint over external signed-integer literals.
///
/// At least `at_least` of the listed literals must be true.
#[derive(Clone, Debug)]
pub struct CardConstr {
    pub lits: Vec<isize>,
    pub at_least: i64,
}

/// A weighted pseudo-Boolean constraint over external signed-integer literals.
///
/// The weights of the true literals must sum to at least `at_least`. `weights` is aligned
/// positionally with `lits`.
#[derive(Clone, Debug)]
pub struct PbConstr {
    pub lits: Vec<isize>,
    pub weights: Vec<i64>,
    pub at_least: i64,
}

impl Problem {
    /// Normalize a formula of generalized clauses.
    ///
    /// This is the common back half of every ingestion path. Constraints are reduced in input
    /// order; the first unsatisfiable constraint or contradicting forced literal settles the
    /// problem as unsatisfiable without inspecting the remaining input.
    pub fn from_formula(formula: GenFormula) -> Problem {
        let (var_count, constrs) = formula.into_parts();

        let mut problem = Problem {
            var_count,
            ..Problem::default()
        };

        for constr in constrs {
            match reduce(constr) {
                Reduction::Trivial => {}
                Reduction::Unsat => {
                    problem.model.set_var_count(problem.var_count);
                    problem.mark_unsat();
                    return problem;
                }
                Reduction::Units(lits) => problem.units.extend(lits),
                Reduction::Keep(clause) => problem.clauses.push(clause),
            }
        }

        problem.model.set_var_count(problem.var_count);

        // Merge in input order, keeping each forced literal once.
        for unit in std::mem::take(&mut problem.units) {
            match problem.model.merge_unit(unit) {
                UnitMerge::Recorded => problem.units.push(unit),
                UnitMerge::AlreadyRecorded => {}
                UnitMerge::Conflict => {
                    problem.mark_unsat();
                    return problem;
                }
            }
        }

        simplify(&mut problem);
        problem
    }

    /// Normalize a slice of clauses in signed-integer literal form.
    ///
    /// An empty inner slice is the empty clause and makes the problem unsatisfiable, a
    /// single-element slice is a unit.
    pub fn from_clauses<C: AsRef<[isize]>>(clauses: &[C]) -> Result<Problem, InvalidLiteral> {
        let mut formula = GenFormula::new();
        for clause in clauses {
            formula.add_clause(&decode_lits(clause.as_ref())?);
        }
        Ok(Problem::from_formula(formula))
    }

    /// Normalize a list of cardinality constraints.
    pub fn from_card_constrs(constrs: &[CardConstr]) -> Result<Problem, InvalidLiteral> {
        let mut formula = GenFormula::new();
        for constr in constrs {
            formula.add_constr(GenClause::cardinality(
                &decode_lits(&constr.lits)?,
                constr.at_least,
            ));
        }
        Ok(Problem::from_formula(formula))
    }

    /// Normalize a list of weighted pseudo-Boolean constraints.
    pub fn from_pb_constrs(constrs: &[PbConstr]) -> Result<Problem, InvalidLiteral> {
        let mut formula = GenFormula::new();
        for constr in constrs {
            formula.add_constr(GenClause::weighted(
                &decode_lits(&constr.lits)?,
                &constr.weights,
                constr.at_least,
            ));
        }
        Ok(Problem::from_formula(formula))
    }

    /// Read and normalize a formula in DIMACS CNF format.
    pub fn from_dimacs(input: impl io::Read) -> Result<Problem, Error> {
        let formula = DimacsParser::parse(input)?;
        info!(
            "parsed CNF formula with {} variables and {} clauses",
            formula.var_count(),
            formula.len()
        );
        Ok(Problem::from_formula(formula))
    }

    /// Read and normalize a formula in the PBS pseudo-Boolean format.
    ///
    /// Relational constraints are lowered with the direct encoding.
    pub fn from_pbs(input: impl io::Read) -> Result<Problem, Error> {
        let formula = PbsParser::parse(input)?;
        info!(
            "parsed PBS formula with {} variables and {} clauses",
            formula.var_count(),
            formula.len()
        );
        Ok(Problem::from_formula(formula))
    }
}

fn decode_lits(values: &[isize]) -> Result<Vec<Lit>, InvalidLiteral> {
    values.iter().map(|&value| Lit::try_from_dimacs(value)).collect()
}
