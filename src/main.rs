use std::fs;
use std::io;

use anyhow::{Context, Result, bail};
use monkey::evaluator::{self, Environment, Value};
use monkey::parser::parse_source;
use monkey::repl;

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let script = args.next();
    if args.next().is_some() {
        bail!("Only one script file is supported");
    }

    let Some(path) = script else {
        println!("Monkey interpreter ready");
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        repl::start(stdin.lock(), &mut stdout)?;
        return Ok(());
    };

    let source = fs::read_to_string(&path).with_context(|| format!("Reading {path}"))?;
    let program = parse_source(&source)?;
    let value = evaluator::eval_program(&program, &Environment::new())
        .with_context(|| format!("Running {path}"))?;
    if !matches!(value, Value::Null) {
        println!("{value}");
    }
    Ok(())
}
