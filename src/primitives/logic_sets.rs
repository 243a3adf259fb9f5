//! Logicals and sets (spec §4.4): `and`, `or`, `xor`, `not` are the usual
//! boolean ops on BOOLEAN and intersection/union/symmetric-difference/
//! complement on SET. `setsize` exposes the fixed bitset width (spec §9:
//! "commonly 64" — this core fixes it at 64).

use crate::error::JoyError;
use crate::joy_macros::primitive;
use crate::machine::Machine;
use crate::value::Value;

pub const SETSIZE: i64 = 64;

#[primitive(name = "and")]
pub fn and(m: &mut Machine) -> Result<(), JoyError> {
    let b = m.pop("and")?;
    let a = m.pop("and")?;
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => m.push(Value::Bool(x && y)),
        (Value::Set(x), Value::Set(y)) => m.push(Value::Set(x & y)),
        (a, _) => return Err(JoyError::type_error("and", "two logicals or two sets", &a)),
    }
    Ok(())
}

#[primitive(name = "or")]
pub fn or(m: &mut Machine) -> Result<(), JoyError> {
    let b = m.pop("or")?;
    let a = m.pop("or")?;
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => m.push(Value::Bool(x || y)),
        (Value::Set(x), Value::Set(y)) => m.push(Value::Set(x | y)),
        (a, _) => return Err(JoyError::type_error("or", "two logicals or two sets", &a)),
    }
    Ok(())
}

#[primitive(name = "xor")]
pub fn xor(m: &mut Machine) -> Result<(), JoyError> {
    let b = m.pop("xor")?;
    let a = m.pop("xor")?;
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => m.push(Value::Bool(x ^ y)),
        (Value::Set(x), Value::Set(y)) => m.push(Value::Set(x ^ y)),
        (a, _) => return Err(JoyError::type_error("xor", "two logicals or two sets", &a)),
    }
    Ok(())
}

/// On a set, `not` is complement-to-`setsize` (spec §9: `(~bits) & full_mask`).
#[primitive(name = "not")]
pub fn not(m: &mut Machine) -> Result<(), JoyError> {
    let a = m.pop("not")?;
    match a {
        Value::Bool(x) => m.push(Value::Bool(!x)),
        Value::Set(x) => m.push(Value::Set(!x)),
        other => return Err(JoyError::type_error("not", "logical or set", &other)),
    }
    Ok(())
}

#[primitive(name = "setsize")]
pub fn setsize(m: &mut Machine) -> Result<(), JoyError> {
    m.push(Value::Int(SETSIZE));
    Ok(())
}
