//! The primitive library (spec §4.4): ~200 named stack operations, grouped
//! into per-domain modules the way the teacher groups `builtins/arithmetic.rs`,
//! `builtins/comparison.rs`, etc. Each primitive is a plain
//! `fn(&mut Machine) -> Result<(), JoyError>` registered via
//! `#[joy_macros::primitive(name = "...")]`, which submits an
//! `inventory::submit!` entry so `install_all` can populate the environment
//! without a hand-maintained master list (spec §3.3: "populated once at
//! startup with all primitives").

use crate::env::{Environment, PrimFn};
use crate::symbol::intern;
use std::rc::Rc;

pub mod aggregate;
pub mod arithmetic;
pub mod char_ops;
pub mod comparison;
pub mod conversions;
pub mod flags;
pub mod float_math;
pub mod io;
pub mod library;
pub mod logic_sets;
pub mod predicates;
pub mod process;
pub mod stack_ops;
pub mod symbols;
pub mod time_ops;

pub struct PrimitiveEntry {
    pub name: &'static str,
    pub func: PrimFn,
}

inventory::collect!(PrimitiveEntry);

/// Populates `env` with every primitive registered anywhere in the crate
/// (this module's domains plus the combinators in `combinators.rs`, which
/// are ordinary `#[primitive]`s themselves).
pub fn install_all(env: &Rc<Environment>) {
    for entry in inventory::iter::<PrimitiveEntry> {
        env.define_primitive(intern(entry.name), entry.func);
    }
}
