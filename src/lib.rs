pub mod util;
pub mod interpreter;

use std::io::Write;
use std::path::PathBuf;
use std::rc::Rc;
use clap::Parser as ClapParser;
use thiserror::Error;
use crate::interpreter::ast::Block;
use crate::interpreter::dynamic::DisabledEvaluator;
use crate::interpreter::evaluator::{Evaluator, Outcome, RuntimeError, DEFAULT_MAX_DEPTH};
use crate::interpreter::lexer::Lexer;
use crate::interpreter::parser::{ParseResult, Parser, SyntaxError};

#[derive(ClapParser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Config {
    #[clap(default_value = "main.brash", help = "Program to run")]
    pub input: PathBuf,

    #[clap(short, long, help = "Print verbose log output")]
    pub verbose: bool,
    #[clap(long, default_value_t = DEFAULT_MAX_DEPTH, help = "Maximum nesting of function calls and eval")]
    pub max_depth: usize,
    #[clap(long, help = "Make every eval(...) fail")]
    pub no_eval: bool,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

pub fn parse(source: &str) -> ParseResult<Block> {
    let mut parser = Parser::new(Lexer::new(source));
    parser.parse()
}

/// Builds an evaluator writing to `output`, configured from the command line.
pub fn evaluator(config: &Config, output: Box<dyn Write>) -> Evaluator {
    let evaluator = Evaluator::new(output)
        .with_max_depth(config.max_depth)
        .with_verbose(config.verbose);

    if config.no_eval {
        evaluator.with_dynamic_evaluator(Rc::new(DisabledEvaluator))
    } else {
        evaluator
    }
}

pub fn run_source(source: &str, config: &Config, output: Box<dyn Write>) -> Result<Outcome, Error> {
    let program = parse(source)?;
    println_verbose!(config.verbose, "Parsed {} top-level statement(s)", program.len());

    let outcome = evaluator(config, output).run(&program)?;
    println_verbose!(config.verbose, "Finished with {:?}", outcome);

    Ok(outcome)
}

pub fn run(config: &Config) -> Result<Outcome, Error> {
    println_verbose!(config.verbose, "Reading {}", config.input.display());
    let source = std::fs::read_to_string(&config.input)?;

    run_source(&source, config, Box::new(std::io::stdout()))
}
