//! Type predicates (spec §4.4): `integer char logical set string list float
//! file leaf user`. None of these raise `TypeError` on a mismatch — they
//! test the top value's tag and push a boolean, the same as any other
//! inspection primitive.

use crate::error::JoyError;
use crate::joy_macros::primitive;
use crate::machine::Machine;
use crate::value::Value;

macro_rules! type_predicate {
    ($name:literal, $fn:ident, $pat:pat) => {
        #[primitive(name = $name)]
        pub fn $fn(m: &mut Machine) -> Result<(), JoyError> {
            let v = m.pop($name)?;
            m.push(Value::Bool(matches!(v, $pat)));
            Ok(())
        }
    };
}

type_predicate!("integer", integer_p, Value::Int(_));
type_predicate!("char", char_p, Value::Char(_));
type_predicate!("logical", logical_p, Value::Bool(_));
type_predicate!("set", set_p, Value::Set(_));
type_predicate!("string", string_p, Value::String(_));
type_predicate!("list", list_p, Value::List(_));
type_predicate!("float", float_p, Value::Float(_));
type_predicate!("file", file_p, Value::File(_));

/// Not a list — true for every other tag (spec §4.4: "leaf (not a list)").
#[primitive(name = "leaf")]
pub fn leaf(m: &mut Machine) -> Result<(), JoyError> {
    let v = m.pop("leaf")?;
    m.push(Value::Bool(!matches!(v, Value::List(_))));
    Ok(())
}

/// Is the top value a symbol bound to a user-defined word (spec §4.4:
/// "user (user-defined symbol)")?
#[primitive(name = "user")]
pub fn user(m: &mut Machine) -> Result<(), JoyError> {
    let v = m.pop("user")?;
    let is_user = matches!(&v, Value::Symbol(s) if m.env.is_user(s));
    m.push(Value::Bool(is_user));
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
    fn integer_predicate_distinguishes_tags() {
        assert_eq!(run(&[Value::Int(1), Value::Symbol(intern("integer"))]), vec![Value::Bool(true)]);
        assert_eq!(run(&[Value::Float(1.0), Value::Symbol(intern("integer"))]), vec![Value::Bool(false)]);
    }

    #[test]
    fn leaf_is_false_only_for_lists() {
        assert_eq!(run(&[Value::Int(1), Value::Symbol(intern("leaf"))]), vec![Value::Bool(true)]);
        assert_eq!(
            run(&[Value::List(vec![]), Value::Symbol(intern("leaf"))]),
            vec![Value::Bool(false)]
        );
    }

    #[test]
    fn user_is_true_only_for_user_defined_symbols() {
        let env = Rc::new(Environment::new());
        crate::primitives::install_all(&env);
        env.define_user(intern("square"), vec![Value::Symbol(intern("dup"))]);
        let mut m = Machine::new(env);
        m.run(&[Value::Symbol(intern("square")), Value::Symbol(intern("user"))]).unwrap();
        assert_eq!(m.stack, vec![Value::Bool(true)]);
    }
}
