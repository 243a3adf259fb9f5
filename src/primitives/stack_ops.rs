//! Stack shuffling (spec §4.4, "Stack:" group): `dup`, `swap`, `pop`,
//! `rollup`, `rolldown`, `rotate`, the `...d` variants that dip once
//! beneath the top, plus `over`, `dup2`, `stack`, `unstack`, `id`, `choice`.

use crate::error::JoyError;
use crate::joy_macros::primitive;
use crate::machine::Machine;
use crate::value::Value;

#[primitive(name = "id")]
pub fn id(_m: &mut Machine) -> Result<(), JoyError> {
    Ok(())
}

#[primitive(name = "dup")]
pub fn dup(m: &mut Machine) -> Result<(), JoyError> {
    let v = m.pop("dup")?;
    m.push(v.clone());
    m.push(v);
    Ok(())
}

#[primitive(name = "swap")]
pub fn swap(m: &mut Machine) -> Result<(), JoyError> {
    let b = m.pop("swap")?;
    let a = m.pop("swap")?;
    m.push(b);
    m.push(a);
    Ok(())
}

#[primitive(name = "pop")]
pub fn pop(m: &mut Machine) -> Result<(), JoyError> {
    m.pop("pop")?;
    Ok(())
}

/// `X Y Z -> Z X Y`: the top goes to the bottom of the three.
#[primitive(name = "rollup")]
pub fn rollup(m: &mut Machine) -> Result<(), JoyError> {
    m.need("rollup", 3)?;
    let z = m.pop("rollup")?;
    let y = m.pop("rollup")?;
    let x = m.pop("rollup")?;
    m.push(z);
    m.push(x);
    m.push(y);
    Ok(())
}

/// `X Y Z -> Y Z X`: the bottom of the three comes to the top.
#[primitive(name = "rolldown")]
pub fn rolldown(m: &mut Machine) -> Result<(), JoyError> {
    m.need("rolldown", 3)?;
    let z = m.pop("rolldown")?;
    let y = m.pop("rolldown")?;
    let x = m.pop("rolldown")?;
    m.push(y);
    m.push(z);
    m.push(x);
    Ok(())
}

/// `X Y Z -> Z Y X`: the outer two swap, the middle stays put.
#[primitive(name = "rotate")]
pub fn rotate(m: &mut Machine) -> Result<(), JoyError> {
    m.need("rotate", 3)?;
    let z = m.pop("rotate")?;
    let y = m.pop("rotate")?;
    let x = m.pop("rotate")?;
    m.push(z);
    m.push(y);
    m.push(x);
    Ok(())
}

/// `X Y -> X Y X`.
#[primitive(name = "over")]
pub fn over(m: &mut Machine) -> Result<(), JoyError> {
    m.need("over", 2)?;
    let y = m.pop("over")?;
    let x = m.pop("over")?;
    m.push(x.clone());
    m.push(y);
    m.push(x);
    Ok(())
}

/// `X Y -> X Y X Y`.
#[primitive(name = "dup2")]
pub fn dup2(m: &mut Machine) -> Result<(), JoyError> {
    m.need("dup2", 2)?;
    let y = m.pop("dup2")?;
    let x = m.pop("dup2")?;
    m.push(x.clone());
    m.push(y.clone());
    m.push(x);
    m.push(y);
    Ok(())
}

fn dip_one(m: &mut Machine, op: &str, f: impl FnOnce(&mut Machine) -> Result<(), JoyError>) -> Result<(), JoyError> {
    let top = m.pop(op)?;
    f(m)?;
    m.push(top);
    Ok(())
}

#[primitive(name = "dupd")]
pub fn dupd(m: &mut Machine) -> Result<(), JoyError> {
    dip_one(m, "dupd", dup)
}

#[primitive(name = "swapd")]
pub fn swapd(m: &mut Machine) -> Result<(), JoyError> {
    dip_one(m, "swapd", swap)
}

#[primitive(name = "popd")]
pub fn popd(m: &mut Machine) -> Result<(), JoyError> {
    dip_one(m, "popd", pop)
}

/// Pushes the entire stack as a list, top of stack first (so `unstack` can
/// invert it). Spec §9 marks `stack`/`unstack` against non-list subjects as
/// an open question this core resolves by raising `TypeError` rather than
/// guessing.
#[primitive(name = "stack")]
pub fn stack(m: &mut Machine) -> Result<(), JoyError> {
    let items: Vec<Value> = m.stack.iter().rev().cloned().collect();
    m.push(Value::List(items));
    Ok(())
}

/// The inverse of `stack`: replaces the whole stack with the contents of
/// the top list, first element of the list becoming the new top.
#[primitive(name = "unstack")]
pub fn unstack(m: &mut Machine) -> Result<(), JoyError> {
    let items = m.pop_quotation("unstack")?;
    m.stack = items.into_iter().rev().collect();
    Ok(())
}

/// Pushes some representation of the pending continuations. Spec §9: `conts`
/// is "explicitly marked buggy in the upstream manual"; this core only has
/// to produce some list and leave the rest of the state alone, so it reuses
/// the current stack snapshot rather than inventing a return-stack model.
#[primitive(name = "conts")]
pub fn conts(m: &mut Machine) -> Result<(), JoyError> {
    let items: Vec<Value> = m.stack.iter().rev().cloned().collect();
    m.push(Value::List(items));
    Ok(())
}

/// `B T F -> T|F`: like `branch` but `T`/`F` are plain values, not
/// quotations to execute.
#[primitive(name = "choice")]
pub fn choice(m: &mut Machine) -> Result<(), JoyError> {
    let f = m.pop("choice")?;
    let t = m.pop("choice")?;
    let b = m.pop("choice")?;
    match b {
        Value::Bool(true) => m.push(t),
        Value::Bool(false) => m.push(f),
        other => return Err(JoyError::type_error("choice", "logical", &other)),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Environment;
    use std::rc::Rc;

    fn run(prog: &[Value]) -> Vec<Value> {
        let env = Rc::new(Environment::new());
        crate::primitives::install_all(&env);
        let mut m = Machine::new(env);
        m.run(prog).unwrap();
        m.stack
    }

    #[test]
    fn dup_pop_is_identity() {
        assert_eq!(
            run(&[Value::Int(1), Value::Symbol(crate::symbol::intern("dup")), Value::Symbol(crate::symbol::intern("pop"))]),
            vec![Value::Int(1)]
        );
    }

    #[test]
    fn swap_swap_is_identity() {
        let s = crate::symbol::intern("swap");
        assert_eq!(
            run(&[Value::Int(1), Value::Int(2), Value::Symbol(s.clone()), Value::Symbol(s)]),
            vec![Value::Int(1), Value::Int(2)]
        );
    }

    #[test]
    fn rollup_moves_top_to_bottom_of_three() {
        assert_eq!(
            run(&[Value::Int(1), Value::Int(2), Value::Int(3), Value::Symbol(crate::symbol::intern("rollup"))]),
            vec![Value::Int(3), Value::Int(1), Value::Int(2)]
        );
    }

    #[test]
    fn rolldown_moves_bottom_to_top_of_three() {
        assert_eq!(
            run(&[Value::Int(1), Value::Int(2), Value::Int(3), Value::Symbol(crate::symbol::intern("rolldown"))]),
            vec![Value::Int(2), Value::Int(3), Value::Int(1)]
        );
    }

    #[test]
    fn stack_and_unstack_round_trip() {
        let stack_sym = crate::symbol::intern("stack");
        let unstack_sym = crate::symbol::intern("unstack");
        assert_eq!(
            run(&[
                Value::Int(1),
                Value::Int(2),
                Value::Int(3),
                Value::Symbol(stack_sym),
                Value::Symbol(unstack_sym),
            ]),
            vec![Value::Int(1), Value::Int(2), Value::Int(3)]
        );
    }

    #[test]
    fn conts_produces_a_list_without_corrupting_the_stack() {
        let out = run(&[
            Value::Int(1),
            Value::Int(2),
            Value::Symbol(crate::symbol::intern("conts")),
        ]);
        assert_eq!(&out[..2], &[Value::Int(1), Value::Int(2)]);
        assert!(matches!(out[2], Value::List(_)));
    }

    #[test]
    fn choice_picks_true_branch() {
        assert_eq!(
            run(&[
                Value::Bool(true),
                Value::Int(10),
                Value::Int(20),
                Value::Symbol(crate::symbol::intern("choice")),
            ]),
            vec![Value::Int(10)]
        );
    }
}
