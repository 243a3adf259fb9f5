//! End-to-end scenarios and invariants from spec §8, run against a fresh
//! `joy::new_machine()` the same way a `.joy` source file would be.

use joy::symbol::intern;
use joy::value::Value;

fn fresh() -> joy::machine::Machine {
    joy::new_machine().unwrap()
}

fn sym(name: &str) -> Value {
    Value::Symbol(intern(name))
}

fn run(prog: Vec<Value>) -> Vec<Value> {
    let mut m = fresh();
    m.run(&prog).unwrap();
    m.stack
}

// --- concrete end-to-end scenarios (spec §8 table) --------------------------

#[test]
fn two_plus_three_is_five() {
    let stack = run(vec![Value::Int(2), Value::Int(3), sym("+")]);
    assert_eq!(stack, vec![Value::Int(5)]);
}

#[test]
fn map_dup_times_squares_every_element() {
    let stack = run(vec![
        Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3), Value::Int(4)]),
        Value::List(vec![sym("dup"), sym("*")]),
        sym("map"),
    ]);
    assert_eq!(
        stack,
        vec![Value::List(vec![
            Value::Int(1),
            Value::Int(4),
            Value::Int(9),
            Value::Int(16)
        ])]
    );
}

#[test]
fn primrec_on_five_with_one_and_times_is_factorial() {
    let stack = run(vec![
        Value::Int(5),
        Value::List(vec![Value::Int(1)]),
        Value::List(vec![sym("*")]),
        sym("primrec"),
    ]);
    assert_eq!(stack, vec![Value::Int(120)]);
}

#[test]
fn linrec_flattens_a_list_of_lists() {
    let input = Value::List(vec![
        Value::List(vec![Value::Int(1), Value::Int(2)]),
        Value::List(vec![Value::Int(3)]),
        Value::List(vec![Value::Int(4), Value::Int(5), Value::Int(6)]),
    ]);
    let stack = run(vec![
        input,
        Value::List(vec![sym("null")]),
        Value::List(vec![]),
        Value::List(vec![sym("uncons")]),
        Value::List(vec![sym("concat")]),
        sym("linrec"),
    ]);
    assert_eq!(stack, vec![Value::List((1..=6).map(Value::Int).collect())]);
}

#[test]
fn ifte_branches_on_five_hundred() {
    let stack = run(vec![
        Value::Int(500),
        Value::List(vec![Value::Int(1000), sym(">")]),
        Value::List(vec![Value::Int(2), sym("/")]),
        Value::List(vec![Value::Int(3), sym("*")]),
        sym("ifte"),
    ]);
    assert_eq!(stack, vec![Value::Int(1500)]);
}

#[test]
fn set_and_intersects() {
    let stack = run(vec![
        Value::Set((1 << 1) | (1 << 3) | (1 << 5) | (1 << 7)),
        Value::Set((1 << 2) | (1 << 3) | (1 << 5) | (1 << 8)),
        sym("and"),
    ]);
    assert_eq!(stack, vec![Value::Set((1 << 3) | (1 << 5))]);
}

#[test]
fn powerlist_filtered_to_pairs_matches_the_worked_example() {
    let stack = run(vec![
        Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)]),
        sym("powerlist"),
        Value::List(vec![sym("size"), Value::Int(2), sym("=")]),
        sym("filter"),
    ]);
    assert_eq!(
        stack,
        vec![Value::List(vec![
            Value::List(vec![Value::Int(1), Value::Int(2)]),
            Value::List(vec![Value::Int(1), Value::Int(3)]),
            Value::List(vec![Value::Int(2), Value::Int(3)]),
        ])]
    );
}

// --- invariants (spec §8) ---------------------------------------------------

#[test]
fn executing_an_empty_list_is_stack_neutral() {
    let mut m = fresh();
    m.run(&[Value::Int(1), Value::Int(2), Value::List(vec![]), sym("i")]).unwrap();
    assert_eq!(m.stack, vec![Value::Int(1), Value::Int(2)]);
}

#[test]
fn dup_pop_is_identity() {
    let stack = run(vec![Value::Int(42), sym("dup"), sym("pop")]);
    assert_eq!(stack, vec![Value::Int(42)]);
}

#[test]
fn swap_swap_is_identity() {
    let stack = run(vec![Value::Int(1), Value::Int(2), sym("swap"), sym("swap")]);
    assert_eq!(stack, vec![Value::Int(1), Value::Int(2)]);
}

#[test]
fn dup_swap_is_dup() {
    let a = run(vec![Value::Int(7), sym("dup"), sym("swap")]);
    let b = run(vec![Value::Int(7), sym("dup")]);
    assert_eq!(a, b);
}

#[test]
fn uncons_then_cons_round_trips_a_nonempty_list() {
    let list = Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
    let stack = run(vec![list.clone(), sym("uncons"), sym("cons")]);
    assert_eq!(stack, vec![list]);
}

#[test]
fn set_laws_hold() {
    let a = Value::Set((1 << 1) | (1 << 2) | (1 << 3));
    let b = Value::Set((1 << 2) | (1 << 3) | (1 << 4));

    // A xor A = {}
    let stack = run(vec![a.clone(), a.clone(), sym("xor")]);
    assert_eq!(stack, vec![Value::Set(0)]);

    // A not not = A
    let stack = run(vec![a.clone(), sym("not"), sym("not")]);
    assert_eq!(stack, vec![a.clone()]);

    // A and B subset of A: every bit set in (A and B) is set in A
    let stack = run(vec![a.clone(), b.clone(), sym("and")]);
    if let Value::Set(inter) = &stack[0] {
        if let Value::Set(bits_a) = &a {
            assert_eq!(inter & !bits_a, 0);
        }
    } else {
        panic!("expected a set");
    }

    // A or B superset of A: every bit set in A is set in (A or B)
    let stack = run(vec![a.clone(), b, sym("or")]);
    if let Value::Set(union) = &stack[0] {
        if let Value::Set(bits_a) = &a {
            assert_eq!(bits_a & !union, 0);
        }
    } else {
        panic!("expected a set");
    }
}

#[test]
fn fold_identity_sums_integer_members() {
    let stack = run(vec![
        Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3), Value::Int(4)]),
        Value::Int(0),
        Value::List(vec![sym("+")]),
        sym("fold"),
    ]);
    assert_eq!(stack, vec![Value::Int(10)]);
}

#[test]
fn map_preserves_aggregate_kind_and_size() {
    let stack = run(vec![
        Value::String(b"abc".to_vec()),
        Value::List(vec![sym("succ")]),
        sym("map"),
    ]);
    assert_eq!(stack, vec![Value::String(b"bcd".to_vec())]);
}

// --- round-trip laws (spec §8) ----------------------------------------------

#[test]
fn name_then_intern_is_identity_on_symbols() {
    let stack = run(vec![
        Value::List(vec![sym("dup")]),
        sym("first"),
        sym("name"),
        sym("intern"),
    ]);
    assert_eq!(stack, vec![sym("dup")]);
}

#[test]
fn reverse_reverse_is_identity_on_lists_and_strings() {
    let stack = run(vec![
        Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)]),
        sym("reverse"),
        sym("reverse"),
    ]);
    assert_eq!(
        stack,
        vec![Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)])]
    );

    let stack = run(vec![Value::String(b"hello".to_vec()), sym("reverse"), sym("reverse")]);
    assert_eq!(stack, vec![Value::String(b"hello".to_vec())]);
}

#[test]
fn cleave_first_rest_then_cons_reconstructs_the_aggregate() {
    let list = Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
    let stack = run(vec![
        list.clone(),
        Value::List(vec![sym("first")]),
        Value::List(vec![sym("rest")]),
        sym("cleave"),
        sym("cons"),
    ]);
    assert_eq!(stack, vec![list]);
}

// --- DEFINE/undeferror/autoput through the full source pipeline ------------

#[test]
fn define_block_then_term_sequence_runs_through_load_source() {
    let mut m = fresh();
    joy::load_source(
        &mut m,
        r#"
        DEFINE
            square == dup * ;
        .
        3 square .
        "#,
    )
    .unwrap();
    assert_eq!(m.stack, vec![Value::Int(9)]);
}

#[test]
fn undefined_symbol_is_silently_ignored_by_default() {
    let mut m = fresh();
    m.run(&[Value::Int(1), sym("this-is-not-a-word")]).unwrap();
    assert_eq!(m.stack, vec![Value::Int(1)]);
}

#[test]
fn undefined_symbol_errors_once_undeferror_is_set() {
    let mut m = fresh();
    m.env.undeferror.set(true);
    let err = m.run(&[Value::Int(1), sym("this-is-not-a-word")]).unwrap_err();
    assert_eq!(err.kind(), "UndefinedSymbol");
}

#[test]
fn quit_propagates_as_a_distinguishable_error_through_load_source() {
    let mut m = fresh();
    let err = joy::load_source(&mut m, "1 2 + 7 quit .").unwrap_err();
    match err {
        joy::error::JoyError::QuitRequested(7) => {}
        other => panic!("expected QuitRequested(7), got {:?}", other),
    }
}
