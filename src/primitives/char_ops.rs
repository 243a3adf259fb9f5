//! Character conversions (spec §4.4): `ord`, `chr`. Character *comparison*
//! ("characters compare as small integers") is handled generically by
//! `comparison.rs`, not here.

use crate::error::JoyError;
use crate::joy_macros::primitive;
use crate::machine::Machine;
use crate::value::Value;

#[primitive(name = "ord")]
pub fn ord(m: &mut Machine) -> Result<(), JoyError> {
    let v = m.pop("ord")?;
    match v {
        Value::Char(c) => m.push(Value::Int(c as i64)),
        other => Err(JoyError::type_error("ord", "char", &other)),
    }
}

#[primitive(name = "chr")]
pub fn chr(m: &mut Machine) -> Result<(), JoyError> {
    let v = m.pop("chr")?;
    match v {
        Value::Int(n) if (0..256).contains(&n) => {
            m.push(Value::Char(n as u8));
            Ok(())
        }
        Value::Int(_) => Err(JoyError::domain_error("chr", "integer out of char range")),
        other => Err(JoyError::type_error("chr", "integer", &other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Environment;
    use crate::symbol::intern;
    use std::rc::Rc;

    #[test]
    fn ord_and_chr_round_trip() {
        let env = Rc::new(Environment::new());
        crate::primitives::install_all(&env);
        let mut m = Machine::new(env);
        m.run(&[
            Value::Char(b'a'),
            Value::Symbol(intern("ord")),
            Value::Symbol(intern("chr")),
        ])
        .unwrap();
        assert_eq!(m.stack, vec![Value::Char(b'a')]);
    }
}
