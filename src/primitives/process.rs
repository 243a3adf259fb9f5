//! Process and environment (spec §4.4): `system`, `getenv`, `argv`, `argc`,
//! `include`, `abort`, `quit`.

use crate::error::JoyError;
use crate::joy_macros::primitive;
use crate::machine::Machine;
use crate::value::Value;

/// `Cmd -> N`: runs `Cmd` through the platform shell, pushing its exit code.
#[primitive(name = "system")]
pub fn system(m: &mut Machine) -> Result<(), JoyError> {
    let cmd = match m.pop("system")? {
        Value::String(s) => String::from_utf8_lossy(&s).into_owned(),
        other => return Err(JoyError::type_error("system", "string", &other)),
    };
    let status = std::process::Command::new("sh")
        .arg("-c")
        .arg(&cmd)
        .status()
        .map_err(|e| JoyError::file_error("system", e.to_string()))?;
    m.push(Value::Int(status.code().unwrap_or(-1) as i64));
    Ok(())
}

/// `Name -> Str`: the empty string when the variable is unset (an
/// unresolved spec ambiguity — see DESIGN.md).
#[primitive(name = "getenv")]
pub fn getenv(m: &mut Machine) -> Result<(), JoyError> {
    let name = match m.pop("getenv")? {
        Value::String(s) => String::from_utf8_lossy(&s).into_owned(),
        other => return Err(JoyError::type_error("getenv", "string", &other)),
    };
    let value = std::env::var(&name).unwrap_or_default();
    m.push(Value::String(value.into_bytes()));
    Ok(())
}

/// ` -> [Str ...]`: the program's command-line arguments.
#[primitive(name = "argv")]
pub fn argv(m: &mut Machine) -> Result<(), JoyError> {
    let items = m.argv.iter().map(|s| Value::String(s.clone().into_bytes())).collect();
    m.push(Value::List(items));
    Ok(())
}

#[primitive(name = "argc")]
pub fn argc(m: &mut Machine) -> Result<(), JoyError> {
    m.push(Value::Int(m.argv.len() as i64));
    Ok(())
}

/// `Path -> `: reads and runs another Joy source file in place, the same
/// `DEFINE`-blocks-then-terms pipeline `main.rs` runs top-level files
/// through (spec §6).
#[primitive(name = "include")]
pub fn include(m: &mut Machine) -> Result<(), JoyError> {
    let path = match m.pop("include")? {
        Value::String(s) => String::from_utf8_lossy(&s).into_owned(),
        other => return Err(JoyError::type_error("include", "string", &other)),
    };
    let src = std::fs::read_to_string(&path).map_err(|e| JoyError::file_error("include", e.to_string()))?;
    crate::load_source(m, &src)
}

#[primitive(name = "abort")]
pub fn abort(_m: &mut Machine) -> Result<(), JoyError> {
    Err(JoyError::AbortRequested)
}

/// `N -> `: stops the interpreter with exit code `N` (spec §6).
#[primitive(name = "quit")]
pub fn quit(m: &mut Machine) -> Result<(), JoyError> {
    let n = match m.pop("quit")? {
        Value::Int(n) => n as i32,
        other => return Err(JoyError::type_error("quit", "integer", &other)),
    };
    Err(JoyError::QuitRequested(n))
}
