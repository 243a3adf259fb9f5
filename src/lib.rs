//! A stack-based, concatenative, purely functional Joy interpreter core
//! (spec §1): value model, reader, environment, evaluator, and primitive
//! library. The CLI wrapper lives in `main.rs`; everything here is usable
//! as a library on its own.

pub extern crate joy_macros;

pub mod combinators;
pub mod diagnostics;
pub mod env;
pub mod error;
pub mod machine;
pub mod prelude;
pub mod primitives;
pub mod reader;
pub mod symbol;
pub mod value;

use std::rc::Rc;

/// Builds a fresh [`machine::Machine`] with every primitive and combinator
/// installed and the standard library (`prelude.rs`) loaded (spec §3.3:
/// "populated once at startup with all primitives").
pub fn new_machine() -> Result<machine::Machine, error::JoyError> {
    let env = Rc::new(env::Environment::new());
    primitives::install_all(&env);
    let mut m = machine::Machine::new(env);
    prelude::load(&mut m)?;
    Ok(m)
}

/// Reads and runs a chunk of Joy source against `m`: `DEFINE`/`LIBRA` blocks
/// install user words, term sequences execute immediately in file order
/// (spec §4.1/§4.2). Shared by `prelude::load`, the `include` primitive, and
/// the CLI driver in `main.rs`.
pub fn load_source(m: &mut machine::Machine, src: &str) -> Result<(), error::JoyError> {
    for phrase in reader::read_program(src)? {
        match phrase {
            reader::Phrase::Definitions(defs) => {
                for (name, body) in defs {
                    m.env.define_user(name, body);
                }
            }
            reader::Phrase::Terms(terms) => m.run(&terms)?,
        }
    }
    Ok(())
}
