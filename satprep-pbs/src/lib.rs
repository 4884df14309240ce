//! PBS pseudo-Boolean parser for the satprep normalizer.
//!
//! The input is line oriented. Blank lines and lines starting with `*` are skipped, every other
//! line is one relational constraint
//!
//! ```text
//! w1 x<i1> w2 x~<i2> ... op rhs ;
//! ```
//!
//! with `op` one of `>=` and `=`. A variable token is `x<digits>` for a positive literal or
//! `x~<digits>` for a negated one, the digit suffix being the 0-based variable index. The parsed
//! constraint is handed to an [`Encode`] strategy which lowers it into generalized clauses.

use std::io;

use satprep_formula::{GenFormula, Lit, Var};

use anyhow::Error;
use thiserror::Error;

pub mod encode;

pub use encode::{DirectEncoder, Encode, RelOp};

/// Possible errors while parsing PBS input.
#[derive(Debug, Error)]
pub enum PbsError {
    #[error("line {}: Invalid constraint syntax: {}", line, content)]
    InvalidSyntax { line: usize, content: String },
    #[error("line {}: Invalid operator {:?}: expected \">=\" or \"=\"", line, operator)]
    InvalidOperator { line: usize, operator: String },
    #[error("line {}: Invalid weight {:?}", line, token)]
    InvalidWeight { line: usize, token: String },
    #[error("line {}: Invalid right hand side {:?}", line, token)]
    InvalidRhs { line: usize, token: String },
    #[error("line {}: Invalid variable token {:?}", line, token)]
    InvalidVariable { line: usize, token: String },
}

/// Parser for the PBS pseudo-Boolean text format.
///
/// The parser is generic over the [`Encode`] strategy used to lower the relational constraints it
/// reads. [`PbsParser::parse`] uses the [`DirectEncoder`].
pub struct PbsParser<E> {
    encoder: E,
    formula: GenFormula,
    line_number: usize,
    constr_count: usize,
}

impl PbsParser<DirectEncoder> {
    /// Create a parser using the direct encoding.
    pub fn new() -> PbsParser<DirectEncoder> {
        PbsParser::with_encoder(DirectEncoder)
    }

    /// Parse the given input into a [`GenFormula`] using the direct encoding.
    pub fn parse(input: impl io::Read) -> Result<GenFormula, Error> {
        PbsParser::parse_with(input, DirectEncoder)
    }
}

impl Default for PbsParser<DirectEncoder> {
    fn default() -> PbsParser<DirectEncoder> {
        PbsParser::new()
    }
}

impl<E: Encode> PbsParser<E> {
    /// Create a parser lowering constraints with the given encoder.
    pub fn with_encoder(encoder: E) -> PbsParser<E> {
        PbsParser {
            encoder,
            formula: GenFormula::new(),
            line_number: 0,
            constr_count: 0,
        }
    }

    /// Parse the given input into a [`GenFormula`], lowering with the given encoder.
    pub fn parse_with(input: impl io::Read, encoder: E) -> Result<GenFormula, Error> {
        use io::BufRead;

        let mut parser = PbsParser::with_encoder(encoder);
        for line in io::BufReader::new(input).lines() {
            parser.parse_line(&line?)?;
        }
        Ok(parser.take_formula())
    }

    /// Parse a single line of PBS input.
    ///
    /// Parsing stops at the first error, constraints from earlier lines stay in the formula.
    pub fn parse_line(&mut self, line: &str) -> Result<(), PbsError> {
        self.line_number += 1;

        let line = line.trim_start();
        if line.is_empty() || line.starts_with('*') {
            return Ok(());
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 4 || fields.len() % 2 != 1 || *fields.last().unwrap() != ";" {
            return Err(PbsError::InvalidSyntax {
                line: self.line_number,
                content: line.to_owned(),
            });
        }

        let operator = fields[fields.len() - 3];
        let op = match operator {
            ">=" => RelOp::GtEq,
            "=" => RelOp::Eq,
            _ => {
                return Err(PbsError::InvalidOperator {
                    line: self.line_number,
                    operator: operator.to_owned(),
                })
            }
        };

        let rhs_token = fields[fields.len() - 2];
        let rhs: i64 = rhs_token.parse().map_err(|_| PbsError::InvalidRhs {
            line: self.line_number,
            token: rhs_token.to_owned(),
        })?;

        let terms = &fields[..fields.len() - 3];
        let mut weights = Vec::with_capacity(terms.len() / 2);
        let mut lits = Vec::with_capacity(terms.len() / 2);
        for pair in terms.chunks(2) {
            let weight: i64 = pair[0].parse().map_err(|_| PbsError::InvalidWeight {
                line: self.line_number,
                token: pair[0].to_owned(),
            })?;
            weights.push(weight);
            lits.push(self.parse_var_token(pair[1])?);
        }

        // Variables are registered when mentioned, even if the encoder ends up dropping the term.
        for &lit in lits.iter() {
            self.formula.set_var_count(lit.index() + 1);
        }

        self.encoder
            .encode(&lits, &weights, op, rhs, &mut self.formula);
        self.constr_count += 1;

        Ok(())
    }

    /// Returns the formula built from everything parsed since the last call to this method.
    pub fn take_formula(&mut self) -> GenFormula {
        let mut new_formula = GenFormula::new();
        new_formula.set_var_count(self.formula.var_count());
        std::mem::replace(&mut self.formula, new_formula)
    }

    /// Number of constraint lines parsed.
    ///
    /// This counts input constraints, not the clauses the encoder lowered them into.
    pub fn constr_count(&self) -> usize {
        self.constr_count
    }

    /// Number of variables mentioned so far.
    pub fn var_count(&self) -> usize {
        self.formula.var_count()
    }

    fn parse_var_token(&self, token: &str) -> Result<Lit, PbsError> {
        let invalid = || PbsError::InvalidVariable {
            line: self.line_number,
            token: token.to_owned(),
        };

        let digits = token.strip_prefix('x').ok_or_else(invalid)?;
        let (digits, positive) = match digits.strip_prefix('~') {
            Some(digits) => (digits, false),
            None => (digits, true),
        };
        if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(invalid());
        }
        let index: usize = digits.parse().map_err(|_| invalid())?;
        if index > Var::max_var().index() {
            return Err(invalid());
        }
        Ok(Lit::from_index(index, positive))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use anyhow::Error;

    use satprep_formula::{lits, GenClause};

    /// Encoder that records every lowering request and emits one fixed clause per request.
    #[derive(Default)]
    struct StubEncoder {
        calls: Vec<(Vec<Lit>, Vec<i64>, RelOp, i64)>,
    }

    impl Encode for StubEncoder {
        fn encode(
            &mut self,
            lits: &[Lit],
            weights: &[i64],
            op: RelOp,
            rhs: i64,
            out: &mut GenFormula,
        ) {
            self.calls.push((lits.to_vec(), weights.to_vec(), op, rhs));
            out.add_clause(&lits![1]);
        }
    }

    #[test]
    fn terms_reach_the_encoder() -> Result<(), PbsError> {
        let mut parser = PbsParser::with_encoder(StubEncoder::default());
        parser.parse_line("1 x1 2 x~2 >= 2 ;")?;
        parser.parse_line("3 x0 = 3 ;")?;

        let calls = &parser.encoder.calls;
        assert_eq!(calls.len(), 2);
        assert_eq!(
            calls[0],
            (
                vec![Lit::from_index(1, true), Lit::from_index(2, false)],
                vec![1, 2],
                RelOp::GtEq,
                2
            )
        );
        assert_eq!(
            calls[1],
            (vec![Lit::from_index(0, true)], vec![3], RelOp::Eq, 3)
        );
        assert_eq!(parser.constr_count(), 2);

        Ok(())
    }

    #[test]
    fn direct_encoding() -> Result<(), Error> {
        let formula = PbsParser::parse(b"1 x1 2 x2 >= 2 ;\n" as &[_])?;

        assert_eq!(formula.len(), 1);
        assert_eq!(
            formula.iter().next().unwrap(),
            &GenClause::weighted(
                &[Lit::from_index(1, true), Lit::from_index(2, true)],
                &[1, 2],
                2
            )
        );
        assert_eq!(formula.var_count(), 3);

        Ok(())
    }

    #[test]
    fn equality_becomes_two_clauses() -> Result<(), Error> {
        let formula = PbsParser::parse(b"1 x0 1 x1 = 1 ;\n" as &[_])?;

        let constrs: Vec<_> = formula.iter().collect();
        assert_eq!(constrs.len(), 2);
        let x0 = Lit::from_index(0, true);
        let x1 = Lit::from_index(1, true);
        assert_eq!(constrs[0], &GenClause::cardinality(&[x0, x1], 1));
        assert_eq!(constrs[1], &GenClause::cardinality(&[!x0, !x1], 1));

        Ok(())
    }

    #[test]
    fn comments_and_blank_lines() -> Result<(), Error> {
        let formula =
            PbsParser::parse(b"* a comment\n\n   \n1 x0 >= 1 ;\n* trailing comment\n" as &[_])?;

        assert_eq!(formula.len(), 1);

        Ok(())
    }

    #[test]
    fn vars_are_registered_before_encoding() -> Result<(), Error> {
        // The trivially satisfied constraint encodes to a clause over no literals, the mentioned
        // variable still widens the formula.
        let formula = PbsParser::parse(b"0 x4 >= 0 ;\n" as &[_])?;

        assert_eq!(formula.var_count(), 5);

        Ok(())
    }

    macro_rules! expect_error {
        ( $input:expr, $( $cases:tt )* ) => {
            let mut parser = PbsParser::new();
            match parser.parse_line($input) {
                Ok(()) => panic!("Expected error parsing {:?}", $input),
                Err(err) => match err {
                    $( $cases )*,
                    other => panic!("Unexpected error {:?}", other),
                },
            }
        };
    }

    #[test]
    fn malformed_lines() {
        // too few fields
        expect_error!("x1 >= 1", PbsError::InvalidSyntax { .. } => ());
        // even field count
        expect_error!("1 x1 2 >= 1 ;", PbsError::InvalidSyntax { .. } => ());
        // missing terminator
        expect_error!("1 x1 >= 1", PbsError::InvalidSyntax { .. } => ());
        expect_error!("1 x1 <= 1 ;", PbsError::InvalidOperator { .. } => ());
        expect_error!("1 x1 >= one ;", PbsError::InvalidRhs { .. } => ());
        expect_error!("one x1 >= 1 ;", PbsError::InvalidWeight { .. } => ());
        expect_error!("1 y1 >= 1 ;", PbsError::InvalidVariable { .. } => ());
        expect_error!("1 x >= 1 ;", PbsError::InvalidVariable { .. } => ());
        expect_error!("1 x~ >= 1 ;", PbsError::InvalidVariable { .. } => ());
        expect_error!("1 x-1 >= 1 ;", PbsError::InvalidVariable { .. } => ());
    }
}
