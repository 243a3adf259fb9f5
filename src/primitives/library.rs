//! Library-level aggregate operations (spec §4.4) that are simple enough
//! to hand-derive directly in Rust rather than bootstrap from Joy source:
//! currently just `powerlist`.

use crate::combinators::aggregate_elements;
use crate::error::JoyError;
use crate::joy_macros::primitive;
use crate::machine::Machine;
use crate::value::Value;

/// `Agg -> [[...] ...]`: every sublist of `Agg`'s elements, each one a
/// `List` regardless of `Agg`'s own aggregate kind, in the order that
/// lets `[size N =] filter` reproduce spec.md's worked example directly:
/// the empty list first, then each element added to every subset already
/// built from the elements before it, processed left to right.
#[primitive(name = "powerlist")]
pub fn powerlist(m: &mut Machine) -> Result<(), JoyError> {
    let v = m.pop("powerlist")?;
    let elements = aggregate_elements("powerlist", v)?;
    let mut acc: Vec<Vec<Value>> = vec![Vec::new()];
    for x in elements {
        let mut extended: Vec<Vec<Value>> = acc
            .iter()
            .map(|subset| {
                let mut s = subset.clone();
                s.push(x.clone());
                s
            })
            .collect();
        acc.append(&mut extended);
    }
    m.push(Value::List(acc.into_iter().map(Value::List).collect()));
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
    fn powerlist_has_two_to_the_n_sublists() {
        let input = Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
        let out = run(&[input, Value::Symbol(intern("powerlist"))]);
        match &out[0] {
            Value::List(subsets) => assert_eq!(subsets.len(), 8),
            other => panic!("expected a list, got {:?}", other),
        }
    }

    #[test]
    fn powerlist_then_filter_by_size_matches_the_worked_example() {
        let out = run(&[
            Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)]),
            Value::Symbol(intern("powerlist")),
            Value::List(vec![
                Value::Symbol(intern("size")),
                Value::Int(2),
                Value::Symbol(intern("=")),
            ]),
            Value::Symbol(intern("filter")),
        ]);
        assert_eq!(
            out,
            vec![Value::List(vec![
                Value::List(vec![Value::Int(1), Value::Int(2)]),
                Value::List(vec![Value::Int(1), Value::Int(3)]),
                Value::List(vec![Value::Int(2), Value::Int(3)]),
            ])]
        );
    }
}
