//! Sequence/aggregate operations (spec §4.4): `cons`, `swons`, `first`,
//! `rest`, `uncons`, `unswons`, `concat`, `enconcat`, `size`, `null`,
//! `small`, `at`, `of`, `drop`, `take`, `has`, `in` — all polymorphic over
//! LIST, STRING, and (where it makes sense) SET, the way the spec's own
//! prose treats "sets also accept `cons`, `first`, `rest`, ..." as the same
//! operations as the sequence group, not a separate family.

use crate::combinators::{aggregate_elements, rebuild_aggregate};
use crate::error::JoyError;
use crate::joy_macros::primitive;
use crate::machine::Machine;
use crate::primitives::comparison::structural_equal;
use crate::value::Value;

/// `X A -> B`: `X` prepended as `A`'s new first member.
fn cons_onto(op: &str, x: Value, a: Value) -> Result<Value, JoyError> {
    match (x, a) {
        (x, Value::List(mut items)) => {
            items.insert(0, x);
            Ok(Value::List(items))
        }
        (Value::Char(c), Value::String(s)) => {
            let mut s2 = Vec::with_capacity(s.len() + 1);
            s2.push(c);
            s2.extend_from_slice(&s);
            Ok(Value::String(s2))
        }
        (Value::Int(n), Value::Set(bits)) if (0..64).contains(&n) => Ok(Value::Set(bits | (1u64 << n))),
        (Value::Int(_), Value::Set(_)) => Err(JoyError::domain_error(op, "set element out of range")),
        (x, a) => Err(JoyError::type_error(op, &format!("member of {}", a.type_name()), &x)),
    }
}

#[primitive(name = "cons")]
pub fn cons(m: &mut Machine) -> Result<(), JoyError> {
    let a = m.pop("cons")?;
    let x = m.pop("cons")?;
    let r = cons_onto("cons", x, a)?;
    m.push(r);
    Ok(())
}

/// `A X -> B`: `cons` with the arguments swapped (spec §4.4: "`swons`").
#[primitive(name = "swons")]
pub fn swons(m: &mut Machine) -> Result<(), JoyError> {
    let x = m.pop("swons")?;
    let a = m.pop("swons")?;
    let r = cons_onto("swons", x, a)?;
    m.push(r);
    Ok(())
}

fn first_of(op: &str, a: &Value) -> Result<Value, JoyError> {
    match a {
        Value::List(items) => items.first().cloned().ok_or_else(|| JoyError::domain_error(op, "empty list")),
        Value::String(s) => s.first().copied().map(Value::Char).ok_or_else(|| JoyError::domain_error(op, "empty string")),
        Value::Set(bits) => {
            if *bits == 0 {
                Err(JoyError::domain_error(op, "empty set"))
            } else {
                Ok(Value::Int(bits.trailing_zeros() as i64))
            }
        }
        other => Err(JoyError::type_error(op, "aggregate", other)),
    }
}

fn rest_of(op: &str, a: Value) -> Result<Value, JoyError> {
    match a {
        Value::List(mut items) => {
            if items.is_empty() {
                return Err(JoyError::domain_error(op, "empty list"));
            }
            items.remove(0);
            Ok(Value::List(items))
        }
        Value::String(s) => {
            if s.is_empty() {
                return Err(JoyError::domain_error(op, "empty string"));
            }
            Ok(Value::String(s[1..].to_vec()))
        }
        Value::Set(bits) => {
            if bits == 0 {
                return Err(JoyError::domain_error(op, "empty set"));
            }
            let min = bits.trailing_zeros();
            Ok(Value::Set(bits & !(1u64 << min)))
        }
        other => Err(JoyError::type_error(op, "aggregate", &other)),
    }
}

#[primitive(name = "first")]
pub fn first(m: &mut Machine) -> Result<(), JoyError> {
    let a = m.pop("first")?;
    let x = first_of("first", &a)?;
    m.push(x);
    Ok(())
}

#[primitive(name = "rest")]
pub fn rest(m: &mut Machine) -> Result<(), JoyError> {
    let a = m.pop("rest")?;
    let r = rest_of("rest", a)?;
    m.push(r);
    Ok(())
}

/// `A -> X A'`: stack order set up so `uncons cons` is the identity (spec
/// §8's round-trip law).
#[primitive(name = "uncons")]
pub fn uncons(m: &mut Machine) -> Result<(), JoyError> {
    let a = m.pop("uncons")?;
    let x = first_of("uncons", &a)?;
    let rest = rest_of("uncons", a)?;
    m.push(x);
    m.push(rest);
    Ok(())
}

/// `A -> A' X`: `uncons` with the results swapped.
#[primitive(name = "unswons")]
pub fn unswons(m: &mut Machine) -> Result<(), JoyError> {
    let a = m.pop("unswons")?;
    let x = first_of("unswons", &a)?;
    let rest = rest_of("unswons", a)?;
    m.push(rest);
    m.push(x);
    Ok(())
}

fn concat_vals(op: &str, a: Value, b: Value) -> Result<Value, JoyError> {
    match (a, b) {
        (Value::List(mut xs), Value::List(ys)) => {
            xs.extend(ys);
            Ok(Value::List(xs))
        }
        (Value::String(mut xs), Value::String(ys)) => {
            xs.extend(ys);
            Ok(Value::String(xs))
        }
        (Value::Set(xs), Value::Set(ys)) => Ok(Value::Set(xs | ys)),
        (a, b) => Err(JoyError::type_error(op, &format!("two {}s", a.type_name()), &b)),
    }
}

#[primitive(name = "concat")]
pub fn concat(m: &mut Machine) -> Result<(), JoyError> {
    let b = m.pop("concat")?;
    let a = m.pop("concat")?;
    let r = concat_vals("concat", a, b)?;
    m.push(r);
    Ok(())
}

/// `X A B -> C`: `X` consed onto `A`, then the result concatenated with `B`.
#[primitive(name = "enconcat")]
pub fn enconcat(m: &mut Machine) -> Result<(), JoyError> {
    let b = m.pop("enconcat")?;
    let a = m.pop("enconcat")?;
    let x = m.pop("enconcat")?;
    let a2 = cons_onto("enconcat", x, a)?;
    let r = concat_vals("enconcat", a2, b)?;
    m.push(r);
    Ok(())
}

fn aggregate_len(a: &Value) -> Option<usize> {
    match a {
        Value::List(items) => Some(items.len()),
        Value::String(s) => Some(s.len()),
        Value::Set(bits) => Some(bits.count_ones() as usize),
        _ => None,
    }
}

#[primitive(name = "size")]
pub fn size(m: &mut Machine) -> Result<(), JoyError> {
    let a = m.pop("size")?;
    match aggregate_len(&a) {
        Some(n) => m.push(Value::Int(n as i64)),
        None => return Err(JoyError::type_error("size", "aggregate", &a)),
    }
    Ok(())
}

#[primitive(name = "null")]
pub fn null(m: &mut Machine) -> Result<(), JoyError> {
    let a = m.pop("null")?;
    match aggregate_len(&a) {
        Some(n) => m.push(Value::Bool(n == 0)),
        None => return Err(JoyError::type_error("null", "aggregate", &a)),
    }
    Ok(())
}

#[primitive(name = "small")]
pub fn small(m: &mut Machine) -> Result<(), JoyError> {
    let a = m.pop("small")?;
    match aggregate_len(&a) {
        Some(n) => m.push(Value::Bool(n <= 1)),
        None => return Err(JoyError::type_error("small", "aggregate", &a)),
    }
    Ok(())
}

fn nth(op: &str, a: Value, i: i64) -> Result<Value, JoyError> {
    let elems = aggregate_elements(op, a)?;
    let idx = usize::try_from(i).map_err(|_| JoyError::domain_error(op, "negative index"))?;
    elems.get(idx).cloned().ok_or_else(|| JoyError::domain_error(op, "index out of range"))
}

/// `A I -> X`: the `I`-th member of `A`.
#[primitive(name = "at")]
pub fn at(m: &mut Machine) -> Result<(), JoyError> {
    let i = m.pop("at")?;
    let a = m.pop("at")?;
    let i = match i {
        Value::Int(n) => n,
        other => return Err(JoyError::type_error("at", "integer", &other)),
    };
    let x = nth("at", a, i)?;
    m.push(x);
    Ok(())
}

/// `I A -> X`: `at` with the arguments swapped.
#[primitive(name = "of")]
pub fn of(m: &mut Machine) -> Result<(), JoyError> {
    let a = m.pop("of")?;
    let i = m.pop("of")?;
    let i = match i {
        Value::Int(n) => n,
        other => return Err(JoyError::type_error("of", "integer", &other)),
    };
    let x = nth("of", a, i)?;
    m.push(x);
    Ok(())
}

#[primitive(name = "drop")]
pub fn drop_prim(m: &mut Machine) -> Result<(), JoyError> {
    let n = m.pop("drop")?;
    let a = m.pop("drop")?;
    let n = match n {
        Value::Int(n) if n >= 0 => n as usize,
        other => return Err(JoyError::type_error("drop", "non-negative integer", &other)),
    };
    let kind = a.type_name();
    let elems = aggregate_elements("drop", a)?;
    let rest: Vec<Value> = elems.into_iter().skip(n).collect();
    m.push(rebuild_aggregate("drop", kind, rest)?);
    Ok(())
}

#[primitive(name = "take")]
pub fn take(m: &mut Machine) -> Result<(), JoyError> {
    let n = m.pop("take")?;
    let a = m.pop("take")?;
    let n = match n {
        Value::Int(n) if n >= 0 => n as usize,
        other => return Err(JoyError::type_error("take", "non-negative integer", &other)),
    };
    let kind = a.type_name();
    let elems = aggregate_elements("take", a)?;
    let kept: Vec<Value> = elems.into_iter().take(n).collect();
    m.push(rebuild_aggregate("take", kind, kept)?);
    Ok(())
}

fn member(op: &str, a: Value, x: &Value) -> Result<bool, JoyError> {
    if let (Value::Set(bits), Value::Int(n)) = (&a, x) {
        return Ok((0..64).contains(n) && bits & (1u64 << n) != 0);
    }
    let elems = aggregate_elements(op, a)?;
    Ok(elems.iter().any(|e| structural_equal(e, x)))
}

/// `A X -> Bool`: is `X` a member of `A`?
#[primitive(name = "has")]
pub fn has(m: &mut Machine) -> Result<(), JoyError> {
    let x = m.pop("has")?;
    let a = m.pop("has")?;
    let found = member("has", a, &x)?;
    m.push(Value::Bool(found));
    Ok(())
}

/// `X A -> Bool`: `has` with the arguments swapped.
#[primitive(name = "in")]
pub fn member_in(m: &mut Machine) -> Result<(), JoyError> {
    let a = m.pop("in")?;
    let x = m.pop("in")?;
    let found = member("in", a, &x)?;
    m.push(Value::Bool(found));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Environment;
    use crate::symbol::intern;
    use std::rc::Rc;

    fn run(prog: &[Value]) -> Vec<Value> {
        let env = Rc::new(Environment::new());
        crate::primitives::install_all(&env);
        let mut m = Machine::new(env);
        m.run(prog).unwrap();
        m.stack
    }

    #[test]
    fn uncons_then_cons_is_identity_for_lists() {
        let l = Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
        assert_eq!(
            run(&[l.clone(), Value::Symbol(intern("uncons")), Value::Symbol(intern("cons"))]),
            vec![l]
        );
    }

    #[test]
    fn at_indexes_from_zero() {
        let l = Value::List(vec![Value::Int(10), Value::Int(20), Value::Int(30)]);
        assert_eq!(run(&[l, Value::Int(1), Value::Symbol(intern("at"))]), vec![Value::Int(20)]);
    }

    #[test]
    fn drop_and_take_split_a_string() {
        let s = Value::String(b"hello".to_vec());
        assert_eq!(
            run(&[s.clone(), Value::Int(2), Value::Symbol(intern("drop"))]),
            vec![Value::String(b"llo".to_vec())]
        );
        assert_eq!(
            run(&[s, Value::Int(2), Value::Symbol(intern("take"))]),
            vec![Value::String(b"he".to_vec())]
        );
    }

    #[test]
    fn size_first_and_rest_agree_on_a_high_byte_char() {
        let s = Value::String(vec![0o377]);
        assert_eq!(run(&[s.clone(), Value::Symbol(intern("size"))]), vec![Value::Int(1)]);
        assert_eq!(run(&[s.clone(), Value::Symbol(intern("first"))]), vec![Value::Char(0o377)]);
        assert_eq!(run(&[s, Value::Symbol(intern("rest"))]), vec![Value::String(vec![])]);
    }

    #[test]
    fn has_checks_membership_in_a_set() {
        let s = Value::Set((1 << 2) | (1 << 5));
        assert_eq!(run(&[s, Value::Int(5), Value::Symbol(intern("has"))]), vec![Value::Bool(true)]);
    }

    #[test]
    fn cons_on_an_out_of_range_set_element_is_a_domain_error() {
        let env = Rc::new(Environment::new());
        crate::primitives::install_all(&env);
        let mut m = Machine::new(env);
        let err = m
            .run(&[Value::Int(100), Value::Set(0), Value::Symbol(intern("cons"))])
            .unwrap_err();
        assert_eq!(err.kind(), "DomainError");
    }
}
