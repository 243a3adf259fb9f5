//! String/number conversion (spec §4.4): `strtol`, `strtod`, `format`,
//! `formatf`.

use crate::error::JoyError;
use crate::joy_macros::primitive;
use crate::machine::Machine;
use crate::value::Value;

fn pop_string(m: &mut Machine, op: &str) -> Result<String, JoyError> {
    match m.pop(op)? {
        Value::String(s) => Ok(String::from_utf8_lossy(&s).into_owned()),
        other => Err(JoyError::type_error(op, "string", &other)),
    }
}

/// `Str Base -> N`: parses `Str` as an integer in the given base (spec's
/// `strtol`, C naming kept since the rest of the library already borrows
/// C I/O names like `fopen`/`fgets`).
#[primitive(name = "strtol")]
pub fn strtol(m: &mut Machine) -> Result<(), JoyError> {
    let base = match m.pop("strtol")? {
        Value::Int(b) if (2..=36).contains(&b) => b as u32,
        other => return Err(JoyError::domain_error("strtol", format!("base out of range: {}", other))),
    };
    let s = pop_string(m, "strtol")?;
    let n = i64::from_str_radix(s.trim(), base)
        .map_err(|e| JoyError::domain_error("strtol", e.to_string()))?;
    m.push(Value::Int(n));
    Ok(())
}

/// `Str -> F`: parses `Str` as a float.
#[primitive(name = "strtod")]
pub fn strtod(m: &mut Machine) -> Result<(), JoyError> {
    let s = pop_string(m, "strtod")?;
    let f: f64 = s.trim().parse().map_err(|_| JoyError::domain_error("strtod", format!("not a number: {:?}", s)))?;
    m.push(Value::Float(f));
    Ok(())
}

/// `N -> Str`: the integer's base-10 literal form, same text `put` would write.
#[primitive(name = "format")]
pub fn format(m: &mut Machine) -> Result<(), JoyError> {
    let n = match m.pop("format")? {
        Value::Int(n) => n,
        other => return Err(JoyError::type_error("format", "integer", &other)),
    };
    m.push(Value::String(n.to_string().into_bytes()));
    Ok(())
}

/// `F Digits -> Str`: fixed-point rendering of a float with `Digits`
/// fractional digits.
#[primitive(name = "formatf")]
pub fn formatf(m: &mut Machine) -> Result<(), JoyError> {
    let digits = match m.pop("formatf")? {
        Value::Int(d) if d >= 0 => d as usize,
        other => return Err(JoyError::type_error("formatf", "non-negative integer", &other)),
    };
    let f = match m.pop("formatf")? {
        Value::Float(f) => f,
        Value::Int(n) => n as f64,
        other => return Err(JoyError::type_error("formatf", "float", &other)),
    };
    m.push(Value::String(format!("{:.*}", digits, f).into_bytes()));
    Ok(())
}
