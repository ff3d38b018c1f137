use std::io::{self, BufRead, Write};

use crate::evaluator::{self, Environment};
use crate::lexer::Lexer;
use crate::parser::Parser;

const PROMPT: &str = ">> ";

/// Reads lines from `input` and runs each through lex → parse → eval against
/// a single environment, so bindings persist across lines. Parser errors are
/// listed instead of evaluating; runtime errors print and the loop continues.
pub fn start<R: BufRead, W: Write>(input: R, output: &mut W) -> io::Result<()> {
    let env = Environment::new();

    write!(output, "{PROMPT}")?;
    output.flush()?;
    for line in input.lines() {
        let line = line?;
        if !line.trim().is_empty() {
            let mut parser = Parser::new(Lexer::new(&line));
            let program = parser.parse_program();
            if parser.errors().is_empty() {
                match evaluator::eval_program(&program, &env) {
                    Ok(value) => writeln!(output, "{value}")?,
                    Err(error) => writeln!(output, "ERROR: {error}")?,
                }
            } else {
                writeln!(output, "parser errors:")?;
                for error in parser.errors() {
                    writeln!(output, "\t{error}")?;
                }
            }
        }
        write!(output, "{PROMPT}")?;
        output.flush()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_session(input: &str) -> String {
        let mut output: Vec<u8> = Vec::new();
        start(input.as_bytes(), &mut output).expect("repl failed");
        String::from_utf8(output).expect("repl output is not utf-8")
    }

    #[test]
    fn evaluates_each_line() {
        let output = run_session("5 + 5\n");
        assert!(output.contains("10\n"), "output: {output:?}");
    }

    #[test]
    fn bindings_persist_across_lines() {
        let output = run_session("let a = 2;\na * 3\n");
        assert!(output.contains("6\n"), "output: {output:?}");
    }

    #[test]
    fn prints_runtime_errors_and_continues() {
        let output = run_session("5 + true\n1 + 2\n");
        assert!(
            output.contains("ERROR: type mismatch: INTEGER + BOOLEAN\n"),
            "output: {output:?}"
        );
        assert!(output.contains("3\n"), "output: {output:?}");
    }

    #[test]
    fn lists_parser_errors() {
        let output = run_session("let x 5;\n");
        assert!(output.contains("parser errors:"), "output: {output:?}");
        assert!(
            output.contains("expected next token to be =, got INT"),
            "output: {output:?}"
        );
    }

    #[test]
    fn skips_blank_lines() {
        let output = run_session("\n   \n");
        assert_eq!(output, ">> >> >> ");
    }
}
