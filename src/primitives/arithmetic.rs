//! Arithmetic on numerics (spec §4.4): `+ - * / rem div sign neg abs pred
//! succ max min`. Binary operators are polymorphic over INTEGER/FLOAT,
//! "promoting to float if either is float" (spec §4.4).

use crate::error::JoyError;
use crate::joy_macros::primitive;
use crate::machine::Machine;
use crate::value::Value;

enum Num {
    Int(i64),
    Float(f64),
}

fn pop_num(m: &mut Machine, op: &str) -> Result<Num, JoyError> {
    let v = m.pop(op)?;
    match v {
        Value::Int(n) => Ok(Num::Int(n)),
        Value::Float(f) => Ok(Num::Float(f)),
        other => Err(JoyError::type_error(op, "numeric", &other)),
    }
}

fn binary(
    m: &mut Machine,
    op: &str,
    none_detail: &'static str,
    int_op: impl FnOnce(i64, i64) -> Option<i64>,
    float_op: impl FnOnce(f64, f64) -> f64,
) -> Result<(), JoyError> {
    let b = pop_num(m, op)?;
    let a = pop_num(m, op)?;
    match (a, b) {
        (Num::Int(x), Num::Int(y)) => match int_op(x, y) {
            Some(r) => {
                m.push(Value::Int(r));
                Ok(())
            }
            None => Err(JoyError::domain_error(op, none_detail)),
        },
        (a, b) => {
            let af = match a {
                Num::Int(n) => n as f64,
                Num::Float(f) => f,
            };
            let bf = match b {
                Num::Int(n) => n as f64,
                Num::Float(f) => f,
            };
            m.push(Value::Float(float_op(af, bf)));
            Ok(())
        }
    }
}

#[primitive(name = "+")]
pub fn add(m: &mut Machine) -> Result<(), JoyError> {
    binary(m, "+", "integer overflow", |a, b| a.checked_add(b), |a, b| a + b)
}

#[primitive(name = "-")]
pub fn sub(m: &mut Machine) -> Result<(), JoyError> {
    binary(m, "-", "integer overflow", |a, b| a.checked_sub(b), |a, b| a - b)
}

#[primitive(name = "*")]
pub fn mul(m: &mut Machine) -> Result<(), JoyError> {
    binary(m, "*", "integer overflow", |a, b| a.checked_mul(b), |a, b| a * b)
}

/// Quotient: truncating integer division between two integers, true
/// division once either side is float (spec leaves the exact int/int
/// result open; this core resolves it as C-style truncation — see
/// `DESIGN.md`).
#[primitive(name = "/")]
pub fn div(m: &mut Machine) -> Result<(), JoyError> {
    binary(m, "/", "division by zero", |a, b| if b == 0 { None } else { Some(a / b) }, |a, b| a / b)
}

/// Remainder, matching the truncating division `/` uses.
#[primitive(name = "rem")]
pub fn rem(m: &mut Machine) -> Result<(), JoyError> {
    binary(m, "rem", "division by zero", |a, b| if b == 0 { None } else { Some(a % b) }, |a, b| a % b)
}

/// `I1 I2 -> Q R`: integer quotient and remainder as two results.
#[primitive(name = "div")]
pub fn divmod(m: &mut Machine) -> Result<(), JoyError> {
    let b = m.pop("div")?;
    let a = m.pop("div")?;
    match (a, b) {
        (Value::Int(x), Value::Int(y)) if y != 0 => {
            m.push(Value::Int(x / y));
            m.push(Value::Int(x % y));
            Ok(())
        }
        (Value::Int(_), Value::Int(0)) => Err(JoyError::domain_error("div", "division by zero")),
        (a, _) => Err(JoyError::type_error("div", "integer", &a)),
    }
}

#[primitive(name = "sign")]
pub fn sign(m: &mut Machine) -> Result<(), JoyError> {
    match pop_num(m, "sign")? {
        Num::Int(n) => m.push(Value::Int(n.signum())),
        Num::Float(f) => m.push(Value::Float(if f > 0.0 { 1.0 } else if f < 0.0 { -1.0 } else { 0.0 })),
    }
    Ok(())
}

#[primitive(name = "neg")]
pub fn neg(m: &mut Machine) -> Result<(), JoyError> {
    match pop_num(m, "neg")? {
        Num::Int(n) => m.push(Value::Int(-n)),
        Num::Float(f) => m.push(Value::Float(-f)),
    }
    Ok(())
}

#[primitive(name = "abs")]
pub fn abs(m: &mut Machine) -> Result<(), JoyError> {
    match pop_num(m, "abs")? {
        Num::Int(n) => m.push(Value::Int(n.abs())),
        Num::Float(f) => m.push(Value::Float(f.abs())),
    }
    Ok(())
}

#[primitive(name = "pred")]
pub fn pred(m: &mut Machine) -> Result<(), JoyError> {
    let v = m.pop("pred")?;
    match v {
        Value::Int(n) => m.push(Value::Int(n - 1)),
        Value::Float(f) => m.push(Value::Float(f - 1.0)),
        Value::Char(c) => m.push(Value::Char(c.wrapping_sub(1))),
        other => return Err(JoyError::type_error("pred", "numeric or char", &other)),
    }
    Ok(())
}

#[primitive(name = "succ")]
pub fn succ(m: &mut Machine) -> Result<(), JoyError> {
    let v = m.pop("succ")?;
    match v {
        Value::Int(n) => m.push(Value::Int(n + 1)),
        Value::Float(f) => m.push(Value::Float(f + 1.0)),
        Value::Char(c) => m.push(Value::Char(c.wrapping_add(1))),
        other => return Err(JoyError::type_error("succ", "numeric or char", &other)),
    }
    Ok(())
}

#[primitive(name = "max")]
pub fn max(m: &mut Machine) -> Result<(), JoyError> {
    binary(m, "max", "unreachable", |a, b| Some(a.max(b)), f64::max)
}

#[primitive(name = "min")]
pub fn min(m: &mut Machine) -> Result<(), JoyError> {
    binary(m, "min", "unreachable", |a, b| Some(a.min(b)), f64::min)
}
