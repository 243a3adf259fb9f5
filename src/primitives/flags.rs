//! Environment flags (spec §4.4/§9): `autoput`, `undeferror`, `echo` and
//! their `set...` mutators. These read/write the `Cell`s on
//! [`crate::env::Environment`] directly — the flags are ordinary
//! environment state, not hidden process globals.

use crate::error::JoyError;
use crate::joy_macros::primitive;
use crate::machine::Machine;
use crate::value::Value;

#[primitive(name = "setautoput")]
pub fn setautoput(m: &mut Machine) -> Result<(), JoyError> {
    let b = match m.pop("setautoput")? {
        Value::Bool(b) => b,
        other => return Err(JoyError::type_error("setautoput", "logical", &other)),
    };
    m.env.autoput.set(b);
    Ok(())
}

#[primitive(name = "autoput")]
pub fn autoput(m: &mut Machine) -> Result<(), JoyError> {
    m.push(Value::Bool(m.env.autoput.get()));
    Ok(())
}

#[primitive(name = "setundeferror")]
pub fn setundeferror(m: &mut Machine) -> Result<(), JoyError> {
    let b = match m.pop("setundeferror")? {
        Value::Bool(b) => b,
        other => return Err(JoyError::type_error("setundeferror", "logical", &other)),
    };
    m.env.undeferror.set(b);
    Ok(())
}

#[primitive(name = "undeferror")]
pub fn undeferror(m: &mut Machine) -> Result<(), JoyError> {
    m.push(Value::Bool(m.env.undeferror.get()));
    Ok(())
}

/// `echo` is a level, not a switch (spec §9: "an integer verbosity level,
/// not a boolean" — higher levels echo more of what the reader consumes).
#[primitive(name = "setecho")]
pub fn setecho(m: &mut Machine) -> Result<(), JoyError> {
    let n = match m.pop("setecho")? {
        Value::Int(n) => n,
        other => return Err(JoyError::type_error("setecho", "integer", &other)),
    };
    m.env.echo.set(n);
    Ok(())
}

#[primitive(name = "echo")]
pub fn echo(m: &mut Machine) -> Result<(), JoyError> {
    m.push(Value::Int(m.env.echo.get()));
    Ok(())
}
