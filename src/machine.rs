//! The stack machine: the trampoline that executes a term sequence against
//! a stack, plus the small pieces of mutable state primitives need (open
//! files, the PRNG) that don't belong on the flat [`Environment`].

use crate::env::{Definition, Environment};
use crate::error::JoyError;
use crate::symbol::Symbol;
use crate::value::{FileHandle, Value};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fs::File;
use std::rc::Rc;

/// An open file plus the small bit of state `feof`/`ferror` need to answer
/// without re-probing the OS (spec §4.4: `feof`, `ferror`).
pub struct OpenFile {
    pub file: File,
    pub eof: bool,
    pub error: bool,
}

/// Open, non-standard file handles. `stdin`/`stdout`/`stderr` never occupy
/// a slot here — they are the three fixed [`FileHandle`] literals (spec §3.1).
#[derive(Default)]
pub struct FileTable {
    files: HashMap<u64, OpenFile>,
    next_id: u64,
}

impl FileTable {
    pub fn open(&mut self, file: File) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.files.insert(id, OpenFile { file, eof: false, error: false });
        id
    }

    pub fn get_mut(&mut self, id: u64) -> Option<&mut OpenFile> {
        self.files.get_mut(&id)
    }

    /// Invalidates the handle; any later use of this id must raise
    /// `FileError` rather than silently succeed (spec §5).
    pub fn close(&mut self, id: u64) -> bool {
        self.files.remove(&id).is_some()
    }
}

pub struct Machine {
    pub stack: Vec<Value>,
    pub env: Rc<Environment>,
    pub files: FileTable,
    pub rng: StdRng,
    /// Command-line arguments exposed via `argv`/`argc` (spec §4.4).
    pub argv: Vec<String>,
    /// Pending input for the `get` primitive when reading interactively.
    pub input_buffer: String,
    /// Wall-clock origin for the `clock` primitive (spec §4.4).
    pub start_time: std::time::Instant,
}

impl Machine {
    pub fn new(env: Rc<Environment>) -> Self {
        Machine {
            stack: Vec::new(),
            env,
            files: FileTable::default(),
            rng: StdRng::from_entropy(),
            argv: Vec::new(),
            input_buffer: String::new(),
            start_time: std::time::Instant::now(),
        }
    }

    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub fn push(&mut self, v: Value) {
        self.stack.push(v);
    }

    pub fn pop(&mut self, op: &str) -> Result<Value, JoyError> {
        self.stack
            .pop()
            .ok_or_else(|| JoyError::stack_underflow(op, 1, 0))
    }

    pub fn need(&self, op: &str, n: usize) -> Result<(), JoyError> {
        if self.stack.len() < n {
            Err(JoyError::stack_underflow(op, n, self.stack.len()))
        } else {
            Ok(())
        }
    }

    /// Pops the top of stack and requires it to be a quotation (list),
    /// returning its contents. Used by every combinator.
    pub fn pop_quotation(&mut self, op: &str) -> Result<Vec<Value>, JoyError> {
        let v = self.pop(op)?;
        match v {
            Value::List(items) => Ok(items),
            other => Err(JoyError::type_error(op, "quotation", &other)),
        }
    }

    /// Like `pop_quotation`, but peeks instead of consuming (used by `x`).
    pub fn peek_quotation(&self, op: &str) -> Result<Vec<Value>, JoyError> {
        match self.stack.last() {
            Some(Value::List(items)) => Ok(items.clone()),
            Some(other) => Err(JoyError::type_error(op, "quotation", other)),
            None => Err(JoyError::stack_underflow(op, 1, 0)),
        }
    }

    pub fn top_bool(&self, op: &str) -> Result<bool, JoyError> {
        match self.stack.last() {
            Some(Value::Bool(b)) => Ok(*b),
            Some(other) => Err(JoyError::type_error(op, "logical", other)),
            None => Err(JoyError::stack_underflow(op, 1, 0)),
        }
    }

    /// Runs `body` against a *copy* of the current stack and returns the
    /// boolean on top afterward, discarding every other effect. This is
    /// the "stack-save semantics" several combinators require (spec §4.3).
    pub fn eval_predicate(&mut self, op: &str, body: &[Value]) -> Result<bool, JoyError> {
        let saved = self.stack.clone();
        self.run(body)?;
        let result = self.top_bool(op)?;
        self.stack = saved;
        Ok(result)
    }

    /// Like `eval_predicate` but returns the whole resulting top value
    /// instead of requiring a boolean (used by `map`/`fold`/...).
    pub fn eval_for_value(&mut self, op: &str, body: &[Value]) -> Result<Value, JoyError> {
        let saved = self.stack.clone();
        self.run(body)?;
        let result = self.pop(op)?;
        self.stack = saved;
        Ok(result)
    }

    /// Executes one term sequence, replacing the current continuation
    /// frame instead of growing host-stack depth whenever the final term
    /// is a tail position: a user word, or `i`/`x` applied to a quotation
    /// (spec §9, "Recursive combinators without host recursion"). Any
    /// nested, non-tail quotation (an `ifte` branch, a `dip` body, ...)
    /// recurses genuinely by calling `run` again — one bounded level of
    /// host-stack depth per syntactic nesting level of the program, not
    /// per iteration.
    pub fn run(&mut self, terms: &[Value]) -> Result<(), JoyError> {
        let mut terms: Cow<[Value]> = Cow::Borrowed(terms);
        let mut i = 0;
        loop {
            if i >= terms.len() {
                return Ok(());
            }
            let is_tail = i == terms.len() - 1;
            let term = terms[i].clone();
            i += 1;
            match term {
                Value::Symbol(sym) => match self.dispatch(&sym, is_tail)? {
                    Dispatch::Done => {}
                    Dispatch::TailInto(body) => {
                        terms = Cow::Owned(body);
                        i = 0;
                    }
                },
                other => self.stack.push(other),
            }
        }
    }

    fn dispatch(&mut self, sym: &Symbol, is_tail: bool) -> Result<Dispatch, JoyError> {
        match self.env.lookup(sym) {
            Some(Definition::Primitive(f)) => {
                // `i`, `x`, `ifte`, `branch`, `cond` are the combinators whose
                // entire remaining effect, once they've picked a quotation to
                // run, is running it — so in tail position they can replace
                // the current frame exactly like a user word can. Every other
                // combinator (`dip`, `step`, `linrec`, ...) has bookkeeping to
                // do after its sub-evaluation returns, and recurses through
                // `Machine::run` genuinely (see `combinators.rs`).
                if is_tail {
                    match sym.as_ref() {
                        "i" => return Ok(Dispatch::TailInto(self.pop_quotation("i")?)),
                        "x" => return Ok(Dispatch::TailInto(self.peek_quotation("x")?)),
                        "ifte" => return Ok(Dispatch::TailInto(crate::combinators::ifte_decide(self)?)),
                        "branch" => return Ok(Dispatch::TailInto(crate::combinators::branch_decide(self)?)),
                        "cond" => return Ok(Dispatch::TailInto(crate::combinators::cond_decide(self)?)),
                        _ => {}
                    }
                }
                f(self)?;
                Ok(Dispatch::Done)
            }
            Some(Definition::User(body)) => {
                if is_tail {
                    Ok(Dispatch::TailInto((*body).clone()))
                } else {
                    self.run(&body)?;
                    Ok(Dispatch::Done)
                }
            }
            None => {
                if self.env.undeferror.get() {
                    Err(JoyError::undefined_symbol(sym))
                } else {
                    Ok(Dispatch::Done)
                }
            }
        }
    }

    pub fn resolve_file(&mut self, handle: FileHandle, op: &str) -> Result<FileRef<'_>, JoyError> {
        match handle {
            FileHandle::Stdin => Ok(FileRef::Stdin),
            FileHandle::Stdout => Ok(FileRef::Stdout),
            FileHandle::Stderr => Ok(FileRef::Stderr),
            FileHandle::Handle(id) => self
                .files
                .get_mut(id)
                .map(FileRef::Open)
                .ok_or_else(|| JoyError::file_error(op, "use of a closed file handle")),
        }
    }

    pub fn file_table(&mut self) -> &mut FileTable {
        &mut self.files
    }

    pub fn next_rand_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }
}

enum Dispatch {
    Done,
    TailInto(Vec<Value>),
}

/// A resolved file target for the `f...` primitive family.
pub enum FileRef<'a> {
    Stdin,
    Stdout,
    Stderr,
    Open(&'a mut OpenFile),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::intern;

    fn fresh() -> Machine {
        Machine::new(Rc::new(Environment::new()))
    }

    #[test]
    fn running_an_empty_sequence_leaves_the_stack_unchanged() {
        let mut m = fresh();
        m.push(Value::Int(1));
        m.run(&[]).unwrap();
        assert_eq!(m.stack.len(), 1);
    }

    #[test]
    fn literals_push_in_order() {
        let mut m = fresh();
        m.run(&[Value::Int(1), Value::Int(2), Value::Bool(true)]).unwrap();
        assert!(matches!(m.stack.as_slice(), [Value::Int(1), Value::Int(2), Value::Bool(true)]));
    }

    #[test]
    fn undefined_symbol_is_silently_ignored_when_undeferror_is_off() {
        let mut m = fresh();
        m.run(&[Value::Symbol(intern("nonesuch"))]).unwrap();
        assert!(m.stack.is_empty());
    }

    #[test]
    fn undefined_symbol_errors_when_undeferror_is_on() {
        let mut m = fresh();
        m.env.undeferror.set(true);
        let err = m.run(&[Value::Symbol(intern("nonesuch"))]).unwrap_err();
        assert_eq!(err.kind(), "UndefinedSymbol");
    }

    #[test]
    fn a_tail_recursive_user_word_does_not_grow_the_rust_stack() {
        let mut m = fresh();
        // countdown == [0 =] [pop] [pred countdown] ifte  (simulated with raw prims below)
        m.env.define_primitive(intern("="), |m: &mut Machine| {
            let b = m.pop("=")?;
            let a = m.pop("=")?;
            m.push(Value::Bool(matches!((a, b), (Value::Int(x), Value::Int(y)) if x == y)));
            Ok(())
        });
        m.env.define_primitive(intern("pred"), |m: &mut Machine| {
            let n = m.pop("pred")?.as_int().unwrap();
            m.push(Value::Int(n - 1));
            Ok(())
        });
        m.env.define_primitive(intern("pop"), |m: &mut Machine| {
            m.pop("pop")?;
            Ok(())
        });
        let body = vec![
            Value::Int(0),
            Value::Symbol(intern("=")),
            Value::List(vec![Value::Symbol(intern("pop"))]),
            Value::List(vec![
                Value::Symbol(intern("pred")),
                Value::Symbol(intern("countdown")),
            ]),
            Value::Symbol(intern("ifte")),
        ];
        m.env.define_user(intern("countdown"), body);
        m.env.define_primitive(intern("ifte"), crate::combinators::ifte);
        m.run(&[Value::Int(200_000), Value::Symbol(intern("countdown"))])
            .unwrap();
        assert!(m.stack.is_empty());
    }
}
