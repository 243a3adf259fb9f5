//! The flat, global definition table and its three flags.
//!
//! Joy has no lexical scoping (spec §3.3: "a mapping from symbol to a
//! definition"), so unlike the teacher's `Environment` (an `Rc`-chained
//! parent/child lookup for closures) this is a single un-nested table.
//! `autoput`/`undeferror`/`echo` live here too, as ordinary environment
//! state rather than hidden process globals (spec §9, "Global flags as
//! environment state") so the evaluator stays a pure function of
//! `(program, environment, stack)`.

use crate::error::JoyError;
use crate::machine::Machine;
use crate::symbol::Symbol;
use crate::value::Value;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

pub type PrimFn = fn(&mut Machine) -> Result<(), JoyError>;

#[derive(Clone)]
pub enum Definition {
    Primitive(PrimFn),
    User(Rc<Vec<Value>>),
}

pub struct Environment {
    definitions: RefCell<HashMap<Symbol, Definition>>,
    pub autoput: Cell<bool>,
    pub undeferror: Cell<bool>,
    pub echo: Cell<i64>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            definitions: RefCell::new(HashMap::new()),
            autoput: Cell::new(true),
            undeferror: Cell::new(false),
            echo: Cell::new(0),
        }
    }

    /// constant-time lookup (spec §4.2).
    pub fn lookup(&self, symbol: &Symbol) -> Option<Definition> {
        self.definitions.borrow().get(symbol).cloned()
    }

    pub fn is_primitive(&self, symbol: &Symbol) -> bool {
        matches!(
            self.definitions.borrow().get(symbol),
            Some(Definition::Primitive(_))
        )
    }

    pub fn is_user(&self, symbol: &Symbol) -> bool {
        matches!(
            self.definitions.borrow().get(symbol),
            Some(Definition::User(_))
        )
    }

    pub fn define_primitive(&self, symbol: Symbol, func: PrimFn) {
        self.definitions
            .borrow_mut()
            .insert(symbol, Definition::Primitive(func));
    }

    /// Installs or replaces a user word's body (spec §3.3: "redefinition is
    /// allowed and replaces the body. Symbols are never removed.").
    pub fn define_user(&self, symbol: Symbol, body: Vec<Value>) {
        self.definitions
            .borrow_mut()
            .insert(symbol, Definition::User(Rc::new(body)));
    }

    /// The body of a user-defined symbol, for the `body` primitive.
    pub fn user_body(&self, symbol: &Symbol) -> Option<Rc<Vec<Value>>> {
        match self.definitions.borrow().get(symbol) {
            Some(Definition::User(body)) => Some(body.clone()),
            _ => None,
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::intern;

    fn noop(_m: &mut Machine) -> Result<(), JoyError> {
        Ok(())
    }

    #[test]
    fn undefined_symbol_lookup_returns_none() {
        let env = Environment::new();
        assert!(env.lookup(&intern("frobnicate")).is_none());
    }

    #[test]
    fn redefinition_replaces_the_body() {
        let env = Environment::new();
        let sq = intern("square");
        env.define_user(sq.clone(), vec![Value::Symbol(intern("dup")), Value::Symbol(intern("*"))]);
        assert_eq!(env.user_body(&sq).unwrap().len(), 2);
        env.define_user(sq.clone(), vec![Value::Int(1)]);
        assert_eq!(env.user_body(&sq).unwrap().len(), 1);
    }

    #[test]
    fn primitive_and_user_definitions_are_distinguished() {
        let env = Environment::new();
        let p = intern("dup");
        let u = intern("square");
        env.define_primitive(p.clone(), noop);
        env.define_user(u.clone(), vec![]);
        assert!(env.is_primitive(&p));
        assert!(!env.is_user(&p));
        assert!(env.is_user(&u));
        assert!(!env.is_primitive(&u));
    }

    #[test]
    fn default_flags_match_spec() {
        let env = Environment::new();
        assert!(!env.undeferror.get());
        assert_eq!(env.echo.get(), 0);
    }
}
