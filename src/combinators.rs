//! The combinators (spec §4.3): the part of the evaluator that decides
//! *which* quotation runs next rather than computing a value outright.
//!
//! Every combinator here is an ordinary `#[primitive]` like the ones in
//! `primitives/`, reachable through `Definition::Primitive` like any other
//! symbol. `i`, `x`, `ifte`, `branch`, `cond` are special only in that
//! `Machine::dispatch` recognizes their names and, when they sit in tail
//! position, asks the `*_decide` helper below for the quotation they would
//! have run and splices it into the trampoline instead of calling the
//! function — see `machine.rs`. Calling them directly (non-tail, or from
//! another combinator) still works exactly the same, just through one
//! ordinary `Machine::run` recursion.

use crate::error::JoyError;
use crate::machine::Machine;
use crate::symbol::intern;
use crate::value::Value;

pub(crate) fn as_list(op: &str, v: &Value) -> Result<Vec<Value>, JoyError> {
    match v {
        Value::List(items) => Ok(items.clone()),
        other => Err(JoyError::type_error(op, "quotation", other)),
    }
}

/// Turns any aggregate into its elements in traversal order (spec §5:
/// "sets: ascending integer order").
pub(crate) fn aggregate_elements(op: &str, v: Value) -> Result<Vec<Value>, JoyError> {
    match v {
        Value::List(items) => Ok(items),
        Value::String(s) => Ok(s.into_iter().map(Value::Char).collect()),
        Value::Set(bits) => Ok((0..64u32)
            .filter(|i| bits & (1u64 << i) != 0)
            .map(|i| Value::Int(i as i64))
            .collect()),
        other => Err(JoyError::type_error(op, "aggregate", &other)),
    }
}

/// The inverse of `aggregate_elements`, used by `map`/`filter`/`split`/
/// `infra` to package a result back into the same kind of aggregate the
/// input was (spec §4.3: "map preserves aggregate kind").
pub(crate) fn rebuild_aggregate(op: &str, kind: &'static str, elems: Vec<Value>) -> Result<Value, JoyError> {
    match kind {
        "list" => Ok(Value::List(elems)),
        "string" => {
            let mut s = Vec::with_capacity(elems.len());
            for e in elems {
                match e {
                    Value::Char(c) => s.push(c),
                    other => return Err(JoyError::type_error(op, "char", &other)),
                }
            }
            Ok(Value::String(s))
        }
        "set" => {
            let mut bits = 0u64;
            for e in elems {
                match e {
                    Value::Int(n) if (0..64).contains(&n) => bits |= 1u64 << n,
                    other => return Err(JoyError::type_error(op, "small integer", &other)),
                }
            }
            Ok(Value::Set(bits))
        }
        _ => unreachable!("aggregate_elements only ever returns these three kinds"),
    }
}

// --- i, x ---------------------------------------------------------------

#[crate::joy_macros::primitive(name = "i")]
pub fn i(m: &mut Machine) -> Result<(), JoyError> {
    let body = m.pop_quotation("i")?;
    m.run(&body)
}

#[crate::joy_macros::primitive(name = "x")]
pub fn x(m: &mut Machine) -> Result<(), JoyError> {
    let body = m.peek_quotation("x")?;
    m.run(&body)
}

// --- dip ------------------------------------------------------------------

#[crate::joy_macros::primitive(name = "dip")]
pub fn dip(m: &mut Machine) -> Result<(), JoyError> {
    let p = m.pop_quotation("dip")?;
    let x = m.pop("dip")?;
    m.run(&p)?;
    m.push(x);
    Ok(())
}

// --- branch, ifte, cond -----------------------------------------------------

pub fn branch_decide(m: &mut Machine) -> Result<Vec<Value>, JoyError> {
    let f = m.pop_quotation("branch")?;
    let t = m.pop_quotation("branch")?;
    let b = m.pop("branch")?;
    match b {
        Value::Bool(true) => Ok(t),
        Value::Bool(false) => Ok(f),
        other => Err(JoyError::type_error("branch", "logical", &other)),
    }
}

#[crate::joy_macros::primitive(name = "branch")]
pub fn branch(m: &mut Machine) -> Result<(), JoyError> {
    let body = branch_decide(m)?;
    m.run(&body)
}

pub fn ifte_decide(m: &mut Machine) -> Result<Vec<Value>, JoyError> {
    let f = m.pop_quotation("ifte")?;
    let t = m.pop_quotation("ifte")?;
    let b = m.pop_quotation("ifte")?;
    Ok(if m.eval_predicate("ifte", &b)? { t } else { f })
}

#[crate::joy_macros::primitive(name = "ifte")]
pub fn ifte(m: &mut Machine) -> Result<(), JoyError> {
    let body = ifte_decide(m)?;
    m.run(&body)
}

pub fn cond_decide(m: &mut Machine) -> Result<Vec<Value>, JoyError> {
    let clauses = m.pop_quotation("cond")?;
    for clause in &clauses {
        let items = as_list("cond", clause)?;
        match items.len() {
            1 => return as_list("cond", &items[0]),
            2 => {
                let pred = as_list("cond", &items[0])?;
                if m.eval_predicate("cond", &pred)? {
                    return as_list("cond", &items[1]);
                }
            }
            _ => {
                return Err(JoyError::domain_error(
                    "cond",
                    "each clause must be [[B] T] or [D]",
                ))
            }
        }
    }
    Err(JoyError::domain_error("cond", "no clause matched and no default given"))
}

#[crate::joy_macros::primitive(name = "cond")]
pub fn cond(m: &mut Machine) -> Result<(), JoyError> {
    let body = cond_decide(m)?;
    m.run(&body)
}

// --- while ------------------------------------------------------------------

#[crate::joy_macros::primitive(name = "while")]
pub fn while_(m: &mut Machine) -> Result<(), JoyError> {
    let d = m.pop_quotation("while")?;
    let b = m.pop_quotation("while")?;
    while m.eval_predicate("while", &b)? {
        m.run(&d)?;
    }
    Ok(())
}

// --- times ------------------------------------------------------------------

#[crate::joy_macros::primitive(name = "times")]
pub fn times(m: &mut Machine) -> Result<(), JoyError> {
    let p = m.pop_quotation("times")?;
    let n = m.pop("times")?;
    let n = match n {
        Value::Int(n) if n >= 0 => n,
        other => return Err(JoyError::type_error("times", "non-negative integer", &other)),
    };
    for _ in 0..n {
        m.run(&p)?;
    }
    Ok(())
}

// --- step, map, filter, split, some, all, fold -------------------------------

#[crate::joy_macros::primitive(name = "step")]
pub fn step(m: &mut Machine) -> Result<(), JoyError> {
    let p = m.pop_quotation("step")?;
    let a = m.pop("step")?;
    for e in aggregate_elements("step", a)? {
        m.push(e);
        m.run(&p)?;
    }
    Ok(())
}

#[crate::joy_macros::primitive(name = "map")]
pub fn map(m: &mut Machine) -> Result<(), JoyError> {
    let p = m.pop_quotation("map")?;
    let a = m.pop("map")?;
    let kind = a.type_name();
    let elems = aggregate_elements("map", a)?;
    let base = m.stack.clone();
    let mut out = Vec::with_capacity(elems.len());
    for e in elems {
        m.stack = base.clone();
        m.push(e);
        m.run(&p)?;
        out.push(m.pop("map")?);
    }
    m.stack = base;
    m.push(rebuild_aggregate("map", kind, out)?);
    Ok(())
}

#[crate::joy_macros::primitive(name = "filter")]
pub fn filter(m: &mut Machine) -> Result<(), JoyError> {
    let p = m.pop_quotation("filter")?;
    let a = m.pop("filter")?;
    let kind = a.type_name();
    let elems = aggregate_elements("filter", a)?;
    let base = m.stack.clone();
    let mut kept = Vec::new();
    for e in elems {
        m.stack = base.clone();
        m.push(e.clone());
        m.run(&p)?;
        if m.top_bool("filter")? {
            kept.push(e);
        }
    }
    m.stack = base;
    m.push(rebuild_aggregate("filter", kind, kept)?);
    Ok(())
}

#[crate::joy_macros::primitive(name = "split")]
pub fn split(m: &mut Machine) -> Result<(), JoyError> {
    let p = m.pop_quotation("split")?;
    let a = m.pop("split")?;
    let kind = a.type_name();
    let elems = aggregate_elements("split", a)?;
    let base = m.stack.clone();
    let mut kept = Vec::new();
    let mut rejected = Vec::new();
    for e in elems {
        m.stack = base.clone();
        m.push(e.clone());
        m.run(&p)?;
        if m.top_bool("split")? {
            kept.push(e);
        } else {
            rejected.push(e);
        }
    }
    m.stack = base;
    m.push(rebuild_aggregate("split", kind, kept)?);
    m.push(rebuild_aggregate("split", kind, rejected)?);
    Ok(())
}

#[crate::joy_macros::primitive(name = "some")]
pub fn some(m: &mut Machine) -> Result<(), JoyError> {
    let p = m.pop_quotation("some")?;
    let a = m.pop("some")?;
    let elems = aggregate_elements("some", a)?;
    let base = m.stack.clone();
    let mut found = false;
    for e in elems {
        m.stack = base.clone();
        m.push(e);
        m.run(&p)?;
        if m.top_bool("some")? {
            found = true;
            break;
        }
    }
    m.stack = base;
    m.push(Value::Bool(found));
    Ok(())
}

#[crate::joy_macros::primitive(name = "all")]
pub fn all(m: &mut Machine) -> Result<(), JoyError> {
    let p = m.pop_quotation("all")?;
    let a = m.pop("all")?;
    let elems = aggregate_elements("all", a)?;
    let base = m.stack.clone();
    let mut result = true;
    for e in elems {
        m.stack = base.clone();
        m.push(e);
        m.run(&p)?;
        if !m.top_bool("all")? {
            result = false;
            break;
        }
    }
    m.stack = base;
    m.push(Value::Bool(result));
    Ok(())
}

#[crate::joy_macros::primitive(name = "fold")]
pub fn fold(m: &mut Machine) -> Result<(), JoyError> {
    let p = m.pop_quotation("fold")?;
    let v0 = m.pop("fold")?;
    let a = m.pop("fold")?;
    m.push(v0);
    for e in aggregate_elements("fold", a)? {
        m.push(e);
        m.run(&p)?;
    }
    Ok(())
}

// --- linrec, tailrec, binrec, genrec -----------------------------------------

fn linrec_step(
    m: &mut Machine,
    p: &[Value],
    t: &[Value],
    r1: &[Value],
    r2: &[Value],
) -> Result<(), JoyError> {
    if m.eval_predicate("linrec", p)? {
        m.run(t)
    } else {
        m.run(r1)?;
        linrec_step(m, p, t, r1, r2)?;
        m.run(r2)
    }
}

#[crate::joy_macros::primitive(name = "linrec")]
pub fn linrec(m: &mut Machine) -> Result<(), JoyError> {
    let r2 = m.pop_quotation("linrec")?;
    let r1 = m.pop_quotation("linrec")?;
    let t = m.pop_quotation("linrec")?;
    let p = m.pop_quotation("linrec")?;
    linrec_step(m, &p, &t, &r1, &r2)
}

/// `R₂ = []` relative to `linrec`, and implemented as an explicit loop
/// rather than Rust recursion so depth is bounded (spec §4.3).
#[crate::joy_macros::primitive(name = "tailrec")]
pub fn tailrec(m: &mut Machine) -> Result<(), JoyError> {
    let r1 = m.pop_quotation("tailrec")?;
    let t = m.pop_quotation("tailrec")?;
    let p = m.pop_quotation("tailrec")?;
    loop {
        if m.eval_predicate("tailrec", &p)? {
            return m.run(&t);
        }
        m.run(&r1)?;
    }
}

fn binrec_step(
    m: &mut Machine,
    p: &[Value],
    t: &[Value],
    r1: &[Value],
    r2: &[Value],
) -> Result<(), JoyError> {
    if m.eval_predicate("binrec", p)? {
        return m.run(t);
    }
    // R1 leaves two new subjects on the stack, the second problem on top.
    m.run(r1)?;
    binrec_step(m, p, t, r1, r2)?;
    let second_result = m.pop("binrec")?;
    binrec_step(m, p, t, r1, r2)?;
    m.push(second_result);
    m.run(r2)
}

#[crate::joy_macros::primitive(name = "binrec")]
pub fn binrec(m: &mut Machine) -> Result<(), JoyError> {
    let r2 = m.pop_quotation("binrec")?;
    let r1 = m.pop_quotation("binrec")?;
    let t = m.pop_quotation("binrec")?;
    let p = m.pop_quotation("binrec")?;
    binrec_step(m, &p, &t, &r1, &r2)
}

#[crate::joy_macros::primitive(name = "genrec")]
pub fn genrec(m: &mut Machine) -> Result<(), JoyError> {
    let r2 = m.pop_quotation("genrec")?;
    let r1 = m.pop_quotation("genrec")?;
    let t = m.pop_quotation("genrec")?;
    let p = m.pop_quotation("genrec")?;
    if m.eval_predicate("genrec", &p)? {
        return m.run(&t);
    }
    m.run(&r1)?;
    let recurse = Value::List(vec![
        Value::List(p.clone()),
        Value::List(t.clone()),
        Value::List(r1.clone()),
        Value::List(r2.clone()),
        Value::Symbol(intern("genrec")),
    ]);
    m.push(recurse);
    m.run(&r2)
}

// --- condlinrec, condnestrec --------------------------------------------------

fn condlinrec_step(m: &mut Machine, op: &str, clauses: &[Value]) -> Result<(), JoyError> {
    for clause in clauses {
        let items = as_list(op, clause)?;
        match items.len() {
            1 => return m.run(&as_list(op, &items[0])?),
            2 => {
                let pred = as_list(op, &items[0])?;
                if m.eval_predicate(op, &pred)? {
                    return m.run(&as_list(op, &items[1])?);
                }
            }
            3 => {
                let pred = as_list(op, &items[0])?;
                if m.eval_predicate(op, &pred)? {
                    let r1 = as_list(op, &items[1])?;
                    let r2 = as_list(op, &items[2])?;
                    m.run(&r1)?;
                    condlinrec_step(m, op, clauses)?;
                    return m.run(&r2);
                }
            }
            _ => return Err(JoyError::domain_error(op, "clause must be [[B] T], [D], or [[B] R1 R2]")),
        }
    }
    Err(JoyError::domain_error(op, "no clause matched"))
}

#[crate::joy_macros::primitive(name = "condlinrec")]
pub fn condlinrec(m: &mut Machine) -> Result<(), JoyError> {
    let clauses = m.pop_quotation("condlinrec")?;
    condlinrec_step(m, "condlinrec", &clauses)
}

#[crate::joy_macros::primitive(name = "condnestrec")]
pub fn condnestrec(m: &mut Machine) -> Result<(), JoyError> {
    let clauses = m.pop_quotation("condnestrec")?;
    condlinrec_step(m, "condnestrec", &clauses)
}

// --- primrec -------------------------------------------------------------

fn primrec_step(m: &mut Machine, i_q: &[Value], c_q: &[Value]) -> Result<(), JoyError> {
    let x = m.pop("primrec")?;
    match x {
        Value::Int(n) if n == 0 => m.run(i_q),
        Value::Int(n) => {
            m.push(Value::Int(n));
            m.push(Value::Int(n - 1));
            primrec_step(m, i_q, c_q)?;
            m.run(c_q)
        }
        Value::List(items) if items.is_empty() => m.run(i_q),
        Value::List(mut items) => {
            let head = items.remove(0);
            m.push(head);
            m.push(Value::List(items));
            primrec_step(m, i_q, c_q)?;
            m.run(c_q)
        }
        Value::String(s) if s.is_empty() => m.run(i_q),
        Value::String(mut s) => {
            let head = s.remove(0);
            m.push(Value::Char(head));
            m.push(Value::String(s));
            primrec_step(m, i_q, c_q)?;
            m.run(c_q)
        }
        Value::Set(bits) if bits == 0 => m.run(i_q),
        Value::Set(bits) => {
            let first = bits.trailing_zeros() as i64;
            m.push(Value::Int(first));
            m.push(Value::Set(bits & !(1u64 << first)));
            primrec_step(m, i_q, c_q)?;
            m.run(c_q)
        }
        other => Err(JoyError::type_error("primrec", "integer or aggregate", &other)),
    }
}

#[crate::joy_macros::primitive(name = "primrec")]
pub fn primrec(m: &mut Machine) -> Result<(), JoyError> {
    let c = m.pop_quotation("primrec")?;
    let i = m.pop_quotation("primrec")?;
    primrec_step(m, &i, &c)
}

// --- infra -----------------------------------------------------------------

#[crate::joy_macros::primitive(name = "infra")]
pub fn infra(m: &mut Machine) -> Result<(), JoyError> {
    let p = m.pop_quotation("infra")?;
    let a = m.pop("infra")?;
    let kind = a.type_name();
    let mut temp = aggregate_elements("infra", a)?;
    temp.reverse(); // elems[0] ends up on top, per spec §4.3
    let saved = std::mem::replace(&mut m.stack, temp);
    m.run(&p)?;
    let mut result_elems = std::mem::replace(&mut m.stack, saved);
    result_elems.reverse();
    m.push(rebuild_aggregate("infra", kind, result_elems)?);
    Ok(())
}

// --- arity combinators: nullary, unary, binary, ternary, unaryK --------------

fn arity_combinator(m: &mut Machine, op: &str, k: usize) -> Result<(), JoyError> {
    let p = m.pop_quotation(op)?;
    let saved = m.stack.clone();
    if saved.len() < k {
        return Err(JoyError::stack_underflow(op, k, saved.len()));
    }
    m.run(&p)?;
    let new_top = m.pop(op)?;
    let mut result = saved[..saved.len() - k].to_vec();
    result.push(new_top);
    m.stack = result;
    Ok(())
}

#[crate::joy_macros::primitive(name = "nullary")]
pub fn nullary(m: &mut Machine) -> Result<(), JoyError> {
    arity_combinator(m, "nullary", 0)
}

#[crate::joy_macros::primitive(name = "unary")]
pub fn unary(m: &mut Machine) -> Result<(), JoyError> {
    arity_combinator(m, "unary", 1)
}

#[crate::joy_macros::primitive(name = "binary")]
pub fn binary(m: &mut Machine) -> Result<(), JoyError> {
    arity_combinator(m, "binary", 2)
}

#[crate::joy_macros::primitive(name = "ternary")]
pub fn ternary(m: &mut Machine) -> Result<(), JoyError> {
    arity_combinator(m, "ternary", 3)
}

fn unary_k(m: &mut Machine, op: &str, k: usize) -> Result<(), JoyError> {
    let p = m.pop_quotation(op)?;
    let mut args = Vec::with_capacity(k);
    for _ in 0..k {
        args.push(m.pop(op)?);
    }
    args.reverse();
    let base = m.stack.clone();
    let mut results = Vec::with_capacity(k);
    for arg in &args {
        m.stack = base.clone();
        m.push(arg.clone());
        m.run(&p)?;
        results.push(m.pop(op)?);
    }
    m.stack = base;
    for r in results {
        m.push(r);
    }
    Ok(())
}

#[crate::joy_macros::primitive(name = "unary2")]
pub fn unary2(m: &mut Machine) -> Result<(), JoyError> {
    unary_k(m, "unary2", 2)
}

#[crate::joy_macros::primitive(name = "unary3")]
pub fn unary3(m: &mut Machine) -> Result<(), JoyError> {
    unary_k(m, "unary3", 3)
}

#[crate::joy_macros::primitive(name = "unary4")]
pub fn unary4(m: &mut Machine) -> Result<(), JoyError> {
    unary_k(m, "unary4", 4)
}

// --- cleave ----------------------------------------------------------------

/// `X [P] [Q] -> R1 R2`: applies `P` and `Q` each to the same `X`, restoring
/// the rest of the stack between the two (spec §8's `cleave` round-trip
/// law: `A [first] [rest] cleave cons` reconstructs `A`).
#[crate::joy_macros::primitive(name = "cleave")]
pub fn cleave(m: &mut Machine) -> Result<(), JoyError> {
    let q = m.pop_quotation("cleave")?;
    let p = m.pop_quotation("cleave")?;
    let x = m.pop("cleave")?;
    let saved = m.stack.clone();
    m.push(x.clone());
    m.run(&p)?;
    let r1 = m.pop("cleave")?;
    m.stack = saved.clone();
    m.push(x);
    m.run(&q)?;
    let r2 = m.pop("cleave")?;
    m.stack = saved;
    m.push(r1);
    m.push(r2);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Environment;
    use crate::symbol::intern;
    use std::rc::Rc;

    fn fresh() -> Machine {
        Machine::new(Rc::new(Environment::new()))
    }

    fn install_arith(m: &Machine) {
        m.env.define_primitive(intern("*"), |m: &mut Machine| {
            let b = m.pop("*")?.as_int().unwrap();
            let a = m.pop("*")?.as_int().unwrap();
            m.push(Value::Int(a * b));
            Ok(())
        });
        m.env.define_primitive(intern("+"), |m: &mut Machine| {
            let b = m.pop("+")?.as_int().unwrap();
            let a = m.pop("+")?.as_int().unwrap();
            m.push(Value::Int(a + b));
            Ok(())
        });
        m.env.define_primitive(intern("dup"), |m: &mut Machine| {
            let v = m.pop("dup")?;
            m.push(v.clone());
            m.push(v);
            Ok(())
        });
    }

    #[test]
    fn ifte_picks_the_true_branch() {
        let mut m = fresh();
        install_arith(&m);
        let prog = vec![
            Value::Int(500),
            Value::List(vec![Value::Int(1000), Value::Symbol(intern(">"))]),
            Value::List(vec![Value::Int(2), Value::Symbol(intern("/"))]),
            Value::List(vec![Value::Int(3), Value::Symbol(intern("*"))]),
            Value::Symbol(intern("ifte")),
        ];
        m.env.define_primitive(intern(">"), |m: &mut Machine| {
            let b = m.pop(">")?.as_int().unwrap();
            let a = m.pop(">")?.as_int().unwrap();
            m.push(Value::Bool(a > b));
            Ok(())
        });
        m.run(&prog).unwrap();
        assert_eq!(m.stack, vec![Value::Int(1500)]);
    }

    #[test]
    fn map_preserves_list_kind_and_size() {
        let mut m = fresh();
        install_arith(&m);
        let body = vec![
            Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3), Value::Int(4)]),
            Value::List(vec![Value::Symbol(intern("dup")), Value::Symbol(intern("*"))]),
            Value::Symbol(intern("map")),
        ];
        m.run(&body).unwrap();
        assert_eq!(
            m.stack,
            vec![Value::List(vec![
                Value::Int(1),
                Value::Int(4),
                Value::Int(9),
                Value::Int(16)
            ])]
        );
    }

    #[test]
    fn primrec_computes_factorial() {
        let mut m = fresh();
        install_arith(&m);
        let body = vec![
            Value::Int(5),
            Value::List(vec![Value::Int(1)]),
            Value::List(vec![Value::Symbol(intern("*"))]),
            Value::Symbol(intern("primrec")),
        ];
        m.run(&body).unwrap();
        assert_eq!(m.stack, vec![Value::Int(120)]);
    }

    #[test]
    fn fold_sums_a_list() {
        let mut m = fresh();
        install_arith(&m);
        let body = vec![
            Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)]),
            Value::Int(0),
            Value::List(vec![Value::Symbol(intern("+"))]),
            Value::Symbol(intern("fold")),
        ];
        m.run(&body).unwrap();
        assert_eq!(m.stack, vec![Value::Int(6)]);
    }

    #[test]
    fn dip_restores_the_dipped_value_on_top() {
        let mut m = fresh();
        install_arith(&m);
        m.run(&[
            Value::Int(1),
            Value::Int(2),
            Value::List(vec![Value::Int(10), Value::Symbol(intern("+"))]),
            Value::Symbol(intern("dip")),
        ])
        .unwrap();
        assert_eq!(m.stack, vec![Value::Int(11), Value::Int(2)]);
    }

    #[test]
    fn linrec_flattens_a_list_of_lists() {
        let mut m = fresh();
        m.env.define_primitive(intern("null"), |m: &mut Machine| {
            let is_null = match m.stack.last() {
                Some(Value::List(items)) => items.is_empty(),
                _ => false,
            };
            m.push(Value::Bool(is_null));
            Ok(())
        });
        m.env.define_primitive(intern("uncons"), |m: &mut Machine| {
            let mut items = m.pop_quotation("uncons")?;
            let head = items.remove(0);
            m.push(head);
            m.push(Value::List(items));
            Ok(())
        });
        m.env.define_primitive(intern("concat"), |m: &mut Machine| {
            let b = m.pop_quotation("concat")?;
            let mut a = m.pop_quotation("concat")?;
            a.extend(b);
            m.push(Value::List(a));
            Ok(())
        });
        let flatten = vec![
            Value::List(vec![Value::Symbol(intern("null"))]),
            Value::List(vec![]),
            Value::List(vec![Value::Symbol(intern("uncons"))]),
            Value::List(vec![Value::Symbol(intern("concat"))]),
            Value::Symbol(intern("linrec")),
        ];
        let input = Value::List(vec![
            Value::List(vec![Value::Int(1), Value::Int(2)]),
            Value::List(vec![Value::Int(3)]),
            Value::List(vec![Value::Int(4), Value::Int(5), Value::Int(6)]),
        ]);
        let mut program = vec![input];
        program.extend(flatten);
        m.run(&program).unwrap();
        assert_eq!(
            m.stack,
            vec![Value::List((1..=6).map(Value::Int).collect())]
        );
    }

    #[test]
    fn cleave_applies_both_quotations_to_the_same_subject() {
        let mut m = fresh();
        m.env.define_primitive(intern("first"), |m: &mut Machine| {
            let items = m.pop_quotation("first")?;
            m.push(items[0].clone());
            Ok(())
        });
        m.env.define_primitive(intern("rest"), |m: &mut Machine| {
            let mut items = m.pop_quotation("rest")?;
            items.remove(0);
            m.push(Value::List(items));
            Ok(())
        });
        m.run(&[
            Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)]),
            Value::List(vec![Value::Symbol(intern("first"))]),
            Value::List(vec![Value::Symbol(intern("rest"))]),
            Value::Symbol(intern("cleave")),
        ])
        .unwrap();
        assert_eq!(
            m.stack,
            vec![Value::Int(1), Value::List(vec![Value::Int(2), Value::Int(3)])]
        );
    }
}
