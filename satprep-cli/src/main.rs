use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _};
use clap::{Parser, ValueEnum};
use env_logger::{fmt, Builder, Target};
use log::{error, info};
use log::{Level, LevelFilter, Record};

use satprep::dimacs::write_dimacs;
use satprep::{GenFormula, Problem, Status};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Cnf,
    Pbs,
}

/// Normalize a DIMACS CNF or PBS instance and report the outcome.
#[derive(Parser)]
#[command(name = "satprep", version, disable_help_subcommand = true)]
struct Args {
    /// The input file to use (stdin if omitted)
    input: Option<PathBuf>,

    /// Input format, guessed from the file extension when omitted
    #[arg(long, value_enum)]
    format: Option<Format>,

    /// Write the normalized problem as DIMACS CNF to the specified file
    ///
    /// Only possible while every residual clause is plain, i.e. for CNF input.
    #[arg(long, value_name = "FILE")]
    write_cnf: Option<PathBuf>,
}

fn main() {
    let exit_code = match main_with_err() {
        Err(err) => {
            error!("{:#}", err);
            1
        }
        Ok(exit_code) => exit_code,
    };
    std::process::exit(exit_code);
}

fn init_logging() {
    let format = |buf: &mut fmt::Formatter, record: &Record| {
        if record.level() == Level::Info {
            writeln!(buf, "c {}", record.args())
        } else {
            writeln!(buf, "c {}: {}", record.level(), record.args())
        }
    };

    let mut builder = Builder::new();
    builder
        .target(Target::Stdout)
        .format(format)
        .filter(None, LevelFilter::Info);

    if let Ok(ref env_var) = env::var("SATPREP_LOG") {
        builder.parse_filters(env_var);
    }

    builder.init();
}

fn guess_format(path: Option<&Path>) -> Format {
    match path.and_then(|path| path.extension()).and_then(|ext| ext.to_str()) {
        Some("pbs") | Some("opb") => Format::Pbs,
        _ => Format::Cnf,
    }
}

fn main_with_err() -> Result<i32, anyhow::Error> {
    let args = Args::parse();

    init_logging();
    info!("This is satprep {}", env!("CARGO_PKG_VERSION"));

    let format = args
        .format
        .unwrap_or_else(|| guess_format(args.input.as_deref()));

    let problem = match &args.input {
        Some(path) => {
            info!("Reading {}", path.display());
            let file = fs::File::open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            normalize(file, format)?
        }
        None => normalize(io::stdin().lock(), format)?,
    };

    info!(
        "Normalized problem: {} variables, {} forced literals, {} residual clauses",
        problem.var_count(),
        problem.units().len(),
        problem.clauses().len()
    );

    if let Some(path) = &args.write_cnf {
        write_residual_cnf(&problem, path)?;
    }

    match problem.status() {
        Status::Unsat => {
            println!("s UNSATISFIABLE");
            Ok(20)
        }
        _ => {
            if problem.clauses().is_empty() {
                info!("All clauses were eliminated, the recorded model satisfies the input");
            }
            println!("s UNKNOWN");
            if !problem.units().is_empty() {
                print!("v");
                for &unit in problem.units() {
                    print!(" {}", unit);
                }
                println!(" 0");
            }
            Ok(0)
        }
    }
}

fn normalize(input: impl io::Read, format: Format) -> Result<Problem, anyhow::Error> {
    match format {
        Format::Cnf => Problem::from_dimacs(input),
        Format::Pbs => Problem::from_pbs(input),
    }
}

/// Write the forced literals as unit clauses followed by the residual clauses.
fn write_residual_cnf(problem: &Problem, path: &Path) -> Result<(), anyhow::Error> {
    let mut formula = GenFormula::new();
    formula.set_var_count(problem.var_count());
    for &unit in problem.units() {
        formula.add_clause(&[unit]);
    }
    for clause in problem.clauses() {
        if !clause.is_plain() {
            bail!("Cannot write {} as CNF: not a plain clause", clause);
        }
        formula.add_constr(clause.clone());
    }

    let mut file = fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    write_dimacs(&mut file, &formula)?;

    info!("Wrote normalized CNF to {}", path.display());

    Ok(())
}
