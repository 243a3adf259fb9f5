//! Relational and equality operators (spec §4.4): binary numeric ops are
//! polymorphic int/float; relational operators additionally accept
//! string-vs-string and char-vs-char; `=`/`!=` are recursive structural
//! equality over any value (via `equal`), never a type error.

use crate::error::JoyError;
use crate::joy_macros::primitive;
use crate::machine::Machine;
use crate::value::Value;
use std::cmp::Ordering;

/// Ordering for the relational operators (`<`, `>`, `<=`, `>=`, `compare`):
/// numeric (promoting), char, string (lexicographic), and aggregates
/// (element-wise, recursively). Mismatched/unorderable kinds are a
/// `TypeError`.
fn relational_order(op: &str, a: &Value, b: &Value) -> Result<Ordering, JoyError> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Ok(x.cmp(y)),
        (Value::Float(_), _) | (_, Value::Float(_)) => {
            let (Some((_, x, _)), Some((_, y, _))) = (a.as_numeric(), b.as_numeric()) else {
                return Err(JoyError::type_error(op, "numeric", b));
            };
            x.partial_cmp(&y).ok_or_else(|| JoyError::domain_error(op, "NaN is unordered"))
        }
        (Value::Char(x), Value::Char(y)) => Ok(x.cmp(y)),
        (Value::String(x), Value::String(y)) => Ok(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Ok(x.cmp(y)),
        (Value::Set(x), Value::Set(y)) => Ok(x.cmp(y)),
        (Value::List(xs), Value::List(ys)) => {
            for (xi, yi) in xs.iter().zip(ys.iter()) {
                let ord = relational_order(op, xi, yi)?;
                if ord != Ordering::Equal {
                    return Ok(ord);
                }
            }
            Ok(xs.len().cmp(&ys.len()))
        }
        _ => Err(JoyError::type_error(op, "comparable pair", b)),
    }
}

/// Structural equality (spec §4.4: "`=`, `!=` are recursive structural
/// equality for aggregates (via `equal`)"). Mismatched tags are simply
/// unequal, never an error.
pub(crate) fn structural_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Char(x), Value::Char(y)) => x == y,
        (Value::Int(x), Value::Int(y)) => x == y,
        (Value::Float(x), Value::Float(y)) => x == y,
        (Value::Int(x), Value::Float(y)) | (Value::Float(y), Value::Int(x)) => *x as f64 == *y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Set(x), Value::Set(y)) => x == y,
        (Value::Symbol(x), Value::Symbol(y)) => x == y,
        (Value::List(xs), Value::List(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys.iter()).all(|(x, y)| structural_equal(x, y))
        }
        (Value::File(x), Value::File(y)) => x == y,
        _ => false,
    }
}

#[primitive(name = "compare")]
pub fn compare(m: &mut Machine) -> Result<(), JoyError> {
    let b = m.pop("compare")?;
    let a = m.pop("compare")?;
    let ord = relational_order("compare", &a, &b)?;
    m.push(Value::Int(match ord {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    }));
    Ok(())
}

#[primitive(name = "equal")]
pub fn equal(m: &mut Machine) -> Result<(), JoyError> {
    let b = m.pop("equal")?;
    let a = m.pop("equal")?;
    m.push(Value::Bool(structural_equal(&a, &b)));
    Ok(())
}

macro_rules! relational_prim {
    ($name:literal, $fn:ident, $ord_ok:expr) => {
        #[primitive(name = $name)]
        pub fn $fn(m: &mut Machine) -> Result<(), JoyError> {
            let b = m.pop($name)?;
            let a = m.pop($name)?;
            let ord = relational_order($name, &a, &b)?;
            m.push(Value::Bool($ord_ok(ord)));
            Ok(())
        }
    };
}

relational_prim!("<", lt, |o: Ordering| o == Ordering::Less);
relational_prim!(">", gt, |o: Ordering| o == Ordering::Greater);
relational_prim!("<=", le, |o: Ordering| o != Ordering::Greater);
relational_prim!(">=", ge, |o: Ordering| o != Ordering::Less);

#[primitive(name = "=")]
pub fn eq(m: &mut Machine) -> Result<(), JoyError> {
    let b = m.pop("=")?;
    let a = m.pop("=")?;
    m.push(Value::Bool(structural_equal(&a, &b)));
    Ok(())
}

#[primitive(name = "!=")]
pub fn neq(m: &mut Machine) -> Result<(), JoyError> {
    let b = m.pop("!=")?;
    let a = m.pop("!=")?;
    m.push(Value::Bool(!structural_equal(&a, &b)));
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
    fn lists_compare_recursively() {
        let a = Value::List(vec![Value::Int(1), Value::Int(2)]);
        let b = Value::List(vec![Value::Int(1), Value::Int(3)]);
        assert_eq!(run(&[a, b, Value::Symbol(intern("compare"))]), vec![Value::Int(-1)]);
    }

    #[test]
    fn equal_is_structural_for_lists() {
        let a = Value::List(vec![Value::Int(1), Value::Int(2)]);
        let b = Value::List(vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(run(&[a, b, Value::Symbol(intern("="))]), vec![Value::Bool(true)]);
    }

    #[test]
    fn equal_on_mismatched_tags_is_false_not_an_error() {
        assert_eq!(
            run(&[Value::Int(1), Value::Bool(true), Value::Symbol(intern("="))]),
            vec![Value::Bool(false)]
        );
    }

    #[test]
    fn chars_compare_as_small_integers() {
        assert_eq!(
            run(&[Value::Char(b'a'), Value::Char(b'b'), Value::Symbol(intern("<"))]),
            vec![Value::Bool(true)]
        );
    }
}
