//! Symbol introspection (spec §4.4): `name`, `intern`, `body`.

use crate::error::JoyError;
use crate::joy_macros::primitive;
use crate::machine::Machine;
use crate::symbol::intern as intern_symbol;
use crate::value::Value;

/// `sym -> "sym"`.
#[primitive(name = "name")]
pub fn name(m: &mut Machine) -> Result<(), JoyError> {
    let v = m.pop("name")?;
    match v {
        Value::Symbol(s) => m.push(Value::String(s.to_string().into_bytes())),
        other => Err(JoyError::type_error("name", "symbol", &other)),
    }
}

/// `"sym" -> sym`. Identity composed with `name` (spec §8: "`name intern`
/// is the identity on symbols").
#[primitive(name = "intern")]
pub fn intern_prim(m: &mut Machine) -> Result<(), JoyError> {
    let v = m.pop("intern")?;
    match v {
        Value::String(s) => m.push(Value::Symbol(intern_symbol(&String::from_utf8_lossy(&s)))),
        other => Err(JoyError::type_error("intern", "string", &other)),
    }
}

/// `U -> [P]`: the quoted body of a user-defined symbol.
#[primitive(name = "body")]
pub fn body(m: &mut Machine) -> Result<(), JoyError> {
    let v = m.pop("body")?;
    match &v {
        Value::Symbol(s) => match m.env.user_body(s) {
            Some(b) => {
                m.push(Value::List((*b).clone()));
                Ok(())
            }
            None => Err(JoyError::domain_error("body", format!("{} is not a user-defined symbol", s))),
        },
        _ => Err(JoyError::type_error("body", "symbol", &v)),
    }
}
