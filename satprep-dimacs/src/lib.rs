//! DIMACS CNF parser and writer for the satprep normalizer.
//!
//! The parser consumes its input in chunks and produces a [`GenFormula`] of plain clauses. The
//! header of the input, when present, is treated as a sizing hint only: the clause count reserves
//! space and the variable count widens the formula up front, but neither is enforced against the
//! actual content.

use std::{borrow::Borrow, io, mem::replace};

use satprep_formula::{GenFormula, Lit, Var};

use anyhow::Error;
use thiserror::Error;

/// Possible errors while parsing a DIMACS CNF formula.
#[derive(Debug, Error)]
pub enum ParserError {
    #[error(
        "line {}: Unexpected character in DIMACS CNF input: '{}'",
        line,
        unexpected
    )]
    UnexpectedInput { line: usize, unexpected: char },
    #[error(
        "line {}: Literal index is too large: {}{}...",
        line,
        index,
        final_digit
    )]
    LiteralTooLarge {
        line: usize,
        index: usize,
        final_digit: usize,
    },
    #[error("line {}: Invalid header syntax: {}", line, header)]
    InvalidHeader { line: usize, header: String },
    #[error("line {}: Unterminated clause", line)]
    UnterminatedClause { line: usize },
    #[error("Parser invoked after a previous error")]
    PreviousError,
}

/// Variable and clause count present in a DIMACS CNF header.
#[derive(Copy, Clone, Debug)]
pub struct DimacsHeader {
    pub var_count: usize,
    pub clause_count: usize,
}

/// Parser for DIMACS CNF files.
///
/// This parser can consume the input in chunks while also producing the parsed result in chunks.
#[derive(Default)]
pub struct DimacsParser {
    formula: GenFormula,
    partial_clause: Vec<Lit>,
    header: Option<DimacsHeader>,

    line_number: usize,
    clause_count: usize,
    partial_lit: usize,
    negate_next_lit: bool,

    in_lit: bool,
    in_comment_or_header: bool,
    in_header: bool,
    start_of_line: bool,
    error: bool,

    header_line: Vec<u8>,
}

impl DimacsParser {
    /// Create a new DIMACS CNF parser.
    pub fn new() -> DimacsParser {
        DimacsParser {
            formula: GenFormula::new(),
            partial_clause: vec![],
            header: None,

            line_number: 1,
            clause_count: 0,
            partial_lit: 0,
            negate_next_lit: false,

            in_lit: false,
            in_comment_or_header: false,
            in_header: false,
            start_of_line: true,
            error: false,

            header_line: vec![],
        }
    }

    /// Parse the given input into a single [`GenFormula`] of plain clauses.
    ///
    /// Chunk-wise parsing is possible using the [`parse_chunk`](DimacsParser::parse_chunk) method
    /// directly.
    pub fn parse(input: impl io::Read) -> Result<GenFormula, Error> {
        use io::BufRead;

        let mut buffer = io::BufReader::new(input);
        let mut parser = Self::new();

        loop {
            let data = buffer.fill_buf()?;
            if data.is_empty() {
                break;
            }
            parser.parse_chunk(data)?;
            let len = data.len();
            buffer.consume(len);
        }
        parser.eof()?;

        Ok(parser.take_formula())
    }

    /// Parse a chunk of input.
    ///
    /// After parsing the last chunk call the [`eof`](DimacsParser::eof) method.
    ///
    /// If this method returns an error, the parser is in an invalid state and cannot parse further
    /// chunks.
    pub fn parse_chunk(&mut self, chunk: &[u8]) -> Result<(), ParserError> {
        if self.error {
            return Err(ParserError::PreviousError);
        }
        for &byte in chunk.iter() {
            if byte == b'\n' {
                self.line_number += 1;
            }
            match byte {
                b'\n' | b'\r' if self.in_comment_or_header => {
                    if self.in_header {
                        self.in_header = false;
                        self.parse_header_line()?;
                    }
                    self.in_comment_or_header = false;
                    self.start_of_line = true
                }
                _ if self.in_comment_or_header => {
                    if self.in_header {
                        self.header_line.push(byte);
                    }
                }
                b'0'..=b'9' => {
                    self.in_lit = true;
                    let digit = (byte - b'0') as usize;

                    const CAN_OVERFLOW: usize = Var::max_count() / 10;
                    const OVERFLOW_DIGIT: usize = Var::max_count() % 10;

                    // Overflow check that is fast but still works if LitIdx has the same size as
                    // usize
                    if CAN_OVERFLOW <= self.partial_lit {
                        let carry = (digit <= OVERFLOW_DIGIT) as usize;

                        if CAN_OVERFLOW + carry <= self.partial_lit {
                            self.error = true;
                            return Err(ParserError::LiteralTooLarge {
                                line: self.line_number,
                                index: self.partial_lit,
                                final_digit: digit,
                            });
                        }
                    }

                    self.partial_lit = self.partial_lit * 10 + digit;

                    self.start_of_line = false
                }
                b'-' if !self.negate_next_lit && !self.in_lit => {
                    self.negate_next_lit = true;
                    self.start_of_line = false
                }
                b' ' | b'\t' | b'\n' | b'\r' if !self.negate_next_lit || self.in_lit => {
                    self.finish_literal();
                    self.negate_next_lit = false;
                    self.in_lit = false;
                    self.partial_lit = 0;
                    self.start_of_line = byte == b'\n' || byte == b'\r';
                }
                b'c' if self.start_of_line => {
                    self.in_comment_or_header = true;
                }
                b'p' if self.start_of_line && self.header.is_none() => {
                    self.in_comment_or_header = true;
                    self.in_header = true;
                    self.header_line.push(b'p');
                }
                _ => {
                    self.error = true;
                    return Err(ParserError::UnexpectedInput {
                        line: self.line_number,
                        unexpected: byte as char,
                    });
                }
            }
        }

        Ok(())
    }

    /// Finish parsing the input.
    pub fn eof(&mut self) -> Result<(), ParserError> {
        if self.in_header {
            self.parse_header_line()?;
        }

        self.finish_literal();

        if !self.partial_clause.is_empty() {
            return Err(ParserError::UnterminatedClause {
                line: self.line_number,
            });
        }

        Ok(())
    }

    /// Returns the formula parsed since the last call to this method.
    ///
    /// To parse the whole input into a single [`GenFormula`], simply call this method once after
    /// calling [`eof`](DimacsParser::eof). For chunk-wise parsing this method can be invoked after
    /// each call of [`parse_chunk`](DimacsParser::parse_chunk).
    ///
    /// The variable count of the returned formula will be the maximum of the variable count so far
    /// and the variable count of the header if present.
    pub fn take_formula(&mut self) -> GenFormula {
        let mut new_formula = GenFormula::new();
        new_formula.set_var_count(self.formula.var_count());
        replace(&mut self.formula, new_formula)
    }

    /// Return the DIMACS CNF header data if present.
    pub fn header(&self) -> Option<DimacsHeader> {
        self.header
    }

    /// Number of clauses parsed.
    pub fn clause_count(&self) -> usize {
        self.clause_count
    }

    /// Number of variables in the parsed formula.
    pub fn var_count(&self) -> usize {
        self.formula.var_count()
    }

    fn finish_literal(&mut self) {
        if self.in_lit {
            if self.partial_lit == 0 {
                // Trailing 0 is the clause terminator, not a literal. An empty clause between two
                // terminators is kept, deciding its meaning is the problem builder's job.
                self.formula.add_clause(&self.partial_clause);
                self.partial_clause.clear();
                self.clause_count += 1;
            } else {
                self.partial_clause
                    .push(Var::from_dimacs(self.partial_lit as isize).lit(!self.negate_next_lit));
            }
        }
    }

    fn parse_header_line(&mut self) -> Result<(), ParserError> {
        let header_line = String::from_utf8_lossy(&self.header_line).into_owned();

        if !header_line.starts_with("p ") {
            return self.invalid_header(header_line);
        }

        let mut header_values = header_line[2..].split_whitespace();

        if header_values.next() != Some("cnf") {
            return self.invalid_header(header_line);
        }

        let var_count: usize = match header_values
            .next()
            .and_then(|value| str::parse(value).ok())
        {
            None => return self.invalid_header(header_line),
            Some(value) => value,
        };

        if var_count > Var::max_count() {
            self.error = true;
            return Err(ParserError::LiteralTooLarge {
                line: self.line_number,
                index: var_count / 10,
                final_digit: var_count % 10,
            });
        }

        let clause_count: usize = match header_values
            .next()
            .and_then(|value| str::parse(value).ok())
        {
            None => return self.invalid_header(header_line),
            Some(value) => value,
        };

        if header_values.next().is_some() {
            return self.invalid_header(header_line);
        }

        self.header = Some(DimacsHeader {
            var_count,
            clause_count,
        });

        // The header is a sizing hint, not a limit. Clauses past the announced count and
        // variables past the announced width are accepted.
        self.formula.set_var_count(var_count);
        self.formula.reserve(clause_count);

        Ok(())
    }

    fn invalid_header(&mut self, header_line: String) -> Result<(), ParserError> {
        self.error = true;
        Err(ParserError::InvalidHeader {
            line: self.line_number,
            header: header_line,
        })
    }
}

/// Write a DIMACS CNF header.
///
/// Can be used with [`write_dimacs_clauses`] to implement incremental writing.
pub fn write_dimacs_header(target: &mut impl io::Write, header: DimacsHeader) -> io::Result<()> {
    writeln!(
        target,
        "p cnf {var_count} {clause_count}",
        var_count = header.var_count,
        clause_count = header.clause_count
    )
}

/// Write an iterator of clauses as headerless DIMACS CNF.
///
/// Can be used with [`write_dimacs_header`] to implement incremental writing.
pub fn write_dimacs_clauses(
    target: &mut impl io::Write,
    clauses: impl IntoIterator<Item = impl IntoIterator<Item = impl Borrow<Lit>>>,
) -> io::Result<()> {
    for clause in clauses.into_iter() {
        for lit in clause.into_iter() {
            itoa::write(&mut *target, lit.borrow().to_dimacs())?;
            target.write_all(b" ")?;
        }
        target.write_all(b"0\n")?;
    }
    Ok(())
}

/// Write a formula of plain clauses as DIMACS CNF.
///
/// Diagnostics only. Cardinality or weighted clauses cannot be expressed in CNF, passing a
/// formula containing them is a caller bug.
pub fn write_dimacs(target: &mut impl io::Write, formula: &GenFormula) -> io::Result<()> {
    debug_assert!(formula.iter().all(|constr| constr.is_plain()));
    write_dimacs_header(
        &mut *target,
        DimacsHeader {
            var_count: formula.var_count(),
            clause_count: formula.len(),
        },
    )?;
    write_dimacs_clauses(&mut *target, formula.iter().map(|constr| constr.lits()))
}
