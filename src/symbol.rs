//! Symbol interning.
//!
//! Joy identifiers are "interned" per the value model (spec §3.1): every
//! occurrence of the same name shares one allocation, so `intern` and
//! `Symbol` equality are both constant-time pointer/string compares rather
//! than repeated heap allocation. Modeled on the `thread_local!` storage
//! `parser.rs` already used for carrying doc comments between reader calls.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

pub type Symbol = Rc<str>;

thread_local! {
    static SYMBOLS: RefCell<HashSet<Symbol>> = RefCell::new(HashSet::new());
}

/// Intern `name`, returning the shared handle for it.
pub fn intern(name: &str) -> Symbol {
    SYMBOLS.with(|syms| {
        let mut syms = syms.borrow_mut();
        if let Some(existing) = syms.get(name) {
            return existing.clone();
        }
        let sym: Symbol = Rc::from(name);
        syms.insert(sym.clone());
        sym
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_the_same_name_twice_shares_the_allocation() {
        let a = intern("dup");
        let b = intern("dup");
        assert!(Rc::ptr_eq(&a, &b));
    }

    #[test]
    fn different_names_intern_to_different_symbols() {
        let a = intern("dup");
        let b = intern("swap");
        assert!(!Rc::ptr_eq(&a, &b));
        assert_ne!(a.as_ref(), b.as_ref());
    }
}
