//! Satprep is the ingestion and normalization front end of a Boolean/pseudo-Boolean constraint
//! solver. It accepts a problem as raw clause lists, cardinality constraints, weighted
//! pseudo-Boolean constraints, DIMACS CNF text or PBS text, and produces one canonical result: a
//! partially solved, simplified [`Problem`] ready to hand to a search engine, or a definitive
//! unsatisfiability verdict.
//!
//! Normalization never searches. A constraint is reduced to forced literals, kept as a
//! generalized clause, or shown to be unsatisfiable, and the resulting problem is closed under
//! unit propagation before it is returned.

pub mod build;
pub mod problem;
pub mod reduce;
pub mod simplify;

pub use build::{CardConstr, PbConstr};
pub use problem::{Model, Problem, Status, UnitMerge};

pub use satprep_formula::{constr, lit, GenClause, GenFormula, InvalidLiteral, Lit, Var};

pub mod dimacs {
    //! DIMACS CNF parser and writer.
    pub use satprep_dimacs::*;
}

pub mod pbs {
    //! PBS pseudo-Boolean parser and constraint encoder.
    pub use satprep_pbs::*;
}
