//! Command-line driver.
//!
//! With no flags, all of standard input is read as one program; the value
//! of its last expression goes to stdout and any error to stderr with a
//! non-zero exit. `-i` runs the interactive mode: a pipeline of stages
//! (read line → lex → parse → eval) connected by channels, where an
//! incomplete parse just means "keep buffering tokens". End of input closes
//! each stage's channel and shuts the pipeline down in order.

use std::io::{self, Read};
use std::process::ExitCode;
use std::thread;

use crossbeam_channel::{unbounded, Receiver, Sender};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use minischeme::builtins::default_env;
use minischeme::{evaluator, lexer, parser, Expr, ParseError};

const HELP: &str = "usage: minischeme [-h | -i]

Minischeme evaluates Scheme (Lisp) expressions.

If no flags are specified, expressions are read from standard input and
evaluated. The value of the final expression is printed to standard output.

The -i flag launches an interactive read-evaluate-print-loop (REPL)
interpreter. Expressions are read from standard input and the result of
each one is printed until end of input.";

fn main() -> ExitCode {
    let arg = std::env::args().nth(1);
    match arg.as_deref() {
        Some("-h") | Some("--help") => {
            println!("{HELP}");
            ExitCode::SUCCESS
        }
        Some("-i") => repl(),
        _ => run_stdin(),
    }
}

/// Batch mode: the whole of stdin is one program.
fn run_stdin() -> ExitCode {
    let mut src = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut src) {
        eprintln!("minischeme: error reading stdin: {e}");
        return ExitCode::FAILURE;
    }
    match minischeme::exec(&src) {
        Ok(value) => {
            println!("{value}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("minischeme: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Reader stage: hand each input line to the lexer stage. Dropping the
/// sender on EOF (or interrupt) is what shuts the pipeline down.
fn read_lines(line_tx: Sender<String>) {
    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(e) => {
            eprintln!("minischeme: cannot open line editor: {e}");
            return;
        }
    };
    loop {
        match rl.readline("li> ") {
            Ok(line) => {
                let _ = rl.add_history_entry(&line);
                if line_tx.send(line).is_err() {
                    return;
                }
            }
            Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => return,
            Err(e) => {
                eprintln!("minischeme: {e}");
                return;
            }
        }
    }
}

/// Lexer stage: tokenize each line and stream the tokens onward, eliding
/// comments. A lex error poisons only the offending line, not the session.
fn lex_lines(line_rx: Receiver<String>, token_tx: Sender<String>) {
    for line in line_rx {
        match lexer::lex(&line) {
            Ok(tokens) => {
                for token in tokens {
                    if lexer::is_comment(&token) {
                        continue;
                    }
                    if token_tx.send(token).is_err() {
                        return;
                    }
                }
            }
            Err(e) => eprintln!("minischeme: {e}"),
        }
    }
}

/// Parser stage: accumulate tokens and re-attempt a parse after each one.
/// An incomplete expression is the signal to keep buffering; an
/// overcomplete one is malformed, so report it and start over.
fn parse_tokens(token_rx: Receiver<String>, expr_tx: Sender<Expr>) {
    let mut pending: Vec<String> = Vec::new();
    for token in token_rx {
        pending.push(token);
        match parser::parse(&pending) {
            Ok(exprs) => {
                pending.clear();
                for expr in exprs {
                    if expr_tx.send(expr).is_err() {
                        return;
                    }
                }
            }
            Err(ParseError::IncompleteExpression) => continue,
            Err(e @ ParseError::OvercompleteExpression) => {
                eprintln!("minischeme: {e}");
                pending.clear();
            }
        }
    }
}

/// Interactive mode: one mutable environment threaded through every
/// expression, results printed in the order their parses completed.
fn repl() -> ExitCode {
    let (line_tx, line_rx) = unbounded::<String>();
    let (token_tx, token_rx) = unbounded::<String>();
    let (expr_tx, expr_rx) = unbounded::<Expr>();

    let reader = thread::spawn(move || read_lines(line_tx));
    let lexer_stage = thread::spawn(move || lex_lines(line_rx, token_tx));
    let parser_stage = thread::spawn(move || parse_tokens(token_rx, expr_tx));

    let mut env = default_env();
    for expr in expr_rx {
        match evaluator::eval(&expr, &mut env) {
            Ok(value) => println!("{value}"),
            Err(e) => eprintln!("minischeme: {e}"),
        }
    }

    let _ = reader.join();
    let _ = lexer_stage.join();
    let _ = parser_stage.join();
    ExitCode::SUCCESS
}
