//! Formats a [`JoyError`] into the single diagnostic line spec §7 requires:
//! `error: <kind>: <detail> (at <file>:<line>)`.

use crate::error::JoyError;
use crate::reader::Position;
use crate::value::Value;

/// Bounded-length, tag-only snapshot of the top of the stack, attached to
/// diagnostics raised through primitive dispatch (spec §4.5).
pub fn stack_snapshot(stack: &[Value], max: usize) -> String {
    let tags: Vec<&str> = stack.iter().rev().take(max).map(Value::type_name).collect();
    format!("[{}]", tags.join(" "))
}

/// `error: <kind>: <detail> (at <file>:<line>)`.
pub fn format(err: &JoyError, file: &str, pos: Option<Position>) -> String {
    let line = pos.map(|p| p.line).unwrap_or(0);
    format!("error: {}: {} (at {}:{})", err.kind(), err, file, line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_matches_the_documented_shape() {
        let err = JoyError::undefined_symbol("frobnicate");
        let line = format(&err, "prog.joy", Some(Position { line: 3, column: 1 }));
        assert_eq!(
            line,
            "error: UndefinedSymbol: frobnicate (at prog.joy:3)"
        );
    }

    #[test]
    fn stack_snapshot_is_tags_only_and_bounded() {
        let stack = vec![Value::Int(1), Value::Bool(true), Value::String(b"x".to_vec())];
        assert_eq!(stack_snapshot(&stack, 2), "[string logical]");
    }
}
