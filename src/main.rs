//! CLI entry point (spec §6): a thin driver over the library crate. Reads
//! one or more source files (or standard input when none are given, or a
//! bare `-`), runs each top-level phrase in order, and reports diagnostics
//! at this boundary — the only place in the crate an error is ever printed
//! rather than propagated (SPEC_FULL.md §9, "Error handling").

use clap::Parser;
use joy::diagnostics;
use joy::error::JoyError;
use joy::machine::Machine;
use joy::reader::{read_program, Phrase};
use std::io::Read;
use std::process::ExitCode;

/// A stack-based, concatenative, purely functional Joy interpreter.
#[derive(Parser, Debug)]
#[command(name = "joy", version, about)]
struct Cli {
    /// Source files to run, in order. With none given (or `-`), reads standard input.
    files: Vec<String>,

    /// Seed `undeferror` to true before running any file.
    #[arg(long)]
    undeferror: bool,
}

fn read_source(name: &str) -> std::io::Result<String> {
    if name == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        std::fs::read_to_string(name)
    }
}

/// Runs one file's worth of source against `m`, printing a diagnostic and
/// continuing to the next phrase on every error except `quit` (spec §7:
/// "catches all kinds except QuitRequested ... proceeds to the next
/// phrase"). Returns `Some(code)` if the program asked to quit.
fn run_file(m: &mut Machine, name: &str, src: &str) -> Option<i32> {
    let phrases = match read_program(src) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("{}", diagnostics::format(&e, name, None));
            return None;
        }
    };
    for phrase in phrases {
        match phrase {
            Phrase::Definitions(defs) => {
                for (sym, body) in defs {
                    m.env.define_user(sym, body);
                }
            }
            Phrase::Terms(terms) => match m.run(&terms) {
                Ok(()) => {
                    if m.env.autoput.get() {
                        if let Some(top) = m.stack.last() {
                            println!("{}", top);
                        }
                    }
                }
                Err(JoyError::QuitRequested(code)) => return Some(code),
                Err(e) => eprintln!("{}", diagnostics::format(&e, name, None)),
            },
        }
    }
    None
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let mut m = match joy::new_machine() {
        Ok(m) => m,
        Err(e) => {
            eprintln!("{}", diagnostics::format(&e, "<prelude>", None));
            return ExitCode::FAILURE;
        }
    };
    m.env.undeferror.set(cli.undeferror);
    m.argv = cli.files.clone();

    let targets: Vec<String> = if cli.files.is_empty() {
        vec!["-".to_string()]
    } else {
        cli.files
    };

    for name in &targets {
        let src = match read_source(name) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("error: FileError: {} (at {}:0)", e, name);
                return ExitCode::FAILURE;
            }
        };
        if let Some(code) = run_file(&mut m, name, &src) {
            return ExitCode::from((code & 0xff) as u8);
        }
    }
    ExitCode::SUCCESS
}
