//! The standard library proper: a handful of words defined in Joy itself
//! rather than as Rust primitives, loaded into every fresh machine (spec
//! §3.3 singles out `reverse` as "typically a library definition" rather
//! than a primitive).

use crate::error::JoyError;
use crate::machine::Machine;

const SOURCE: &str = r#"
DEFINE
    reverse == [] swap [swons] step ;
    second == rest first ;
    third == rest rest first ;
    sum == 0 [+] fold ;
    product == 1 [*] fold ;
    average == dup [sum] dip size / ;
.
"#;

/// Installs the Joy-source standard library into `m` (spec §3.3).
pub fn load(m: &mut Machine) -> Result<(), JoyError> {
    crate::load_source(m, SOURCE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::intern;
    use crate::value::Value;

    #[test]
    fn reverse_is_defined_and_works() {
        let mut m = crate::new_machine().unwrap();
        m.run(&[
            Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)]),
            Value::Symbol(intern("reverse")),
        ])
        .unwrap();
        assert_eq!(
            m.stack,
            vec![Value::List(vec![Value::Int(3), Value::Int(2), Value::Int(1)])]
        );
    }

    #[test]
    fn sum_and_product_fold_over_a_list() {
        let mut m = crate::new_machine().unwrap();
        m.run(&[
            Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3), Value::Int(4)]),
            Value::Symbol(intern("sum")),
        ])
        .unwrap();
        assert_eq!(m.stack.pop().unwrap(), Value::Int(10));

        m.run(&[
            Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3), Value::Int(4)]),
            Value::Symbol(intern("product")),
        ])
        .unwrap();
        assert_eq!(m.stack.pop().unwrap(), Value::Int(24));
    }
}
