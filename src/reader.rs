//! The reader: turns Joy source text into value trees and definitions.
//!
//! Literal/quotation grammar (numbers, chars, strings, sets, lists, bare
//! symbols) is parsed with `nom` combinators in the style of the teacher's
//! `parser.rs`. The surrounding phrase grammar — `DEFINE`/`LIBRA` blocks,
//! `HIDE ... IN ... END`, and `.`-terminated term sequences — is not a
//! context-free expression grammar nom is a good fit for, so it is walked
//! by hand over a flat token stream, the same way the teacher's own
//! `main.rs` hand-scans s-expression boundaries with `find_expr_end`
//! instead of reaching for nom a second time.

use crate::error::JoyError;
use crate::symbol::{intern, Symbol};
use crate::value::Value;
use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, digit1, multispace1},
    combinator::{opt, recognize, value},
    multi::many0,
    IResult, Parser,
};

/// A (line, column) pair for diagnostics (spec §3.4). Not carried by values
/// at runtime, only by the reader while it builds the phrase/token stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

fn position_at(src: &str, offset: usize) -> Position {
    let consumed = &src[..offset];
    let line = consumed.bytes().filter(|&b| b == b'\n').count() + 1;
    let column = match consumed.rfind('\n') {
        Some(idx) => offset - idx,
        None => offset + 1,
    };
    Position { line, column }
}

// ---------------------------------------------------------------------
// Whitespace and comments: `#` to end of line, `(* ... *)` block comments.
// ---------------------------------------------------------------------

fn line_comment(input: &str) -> IResult<&str, ()> {
    let (input, _) = char('#')(input)?;
    let (input, _) = take_while(|c| c != '\n')(input)?;
    Ok((input, ()))
}

fn block_comment(input: &str) -> IResult<&str, ()> {
    let (input, _) = tag("(*")(input)?;
    match input.find("*)") {
        Some(pos) => Ok((&input[pos + 2..], ())),
        None => Err(nom::Err::Failure(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Eof,
        ))),
    }
}

fn ws_and_comments(input: &str) -> IResult<&str, ()> {
    many0(alt((value((), multispace1), block_comment, line_comment)))
        .map(|_| ())
        .parse(input)
}

// ---------------------------------------------------------------------
// Literal grammar (used both for bare value tokens and inside `[...]`/`{...}`).
// ---------------------------------------------------------------------

fn is_symbol_char(c: char) -> bool {
    !c.is_whitespace() && !"[]{}\"'#".contains(c)
}

fn nom_err(input: &str) -> nom::Err<nom::error::Error<&str>> {
    nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Verify))
}

fn parse_number(input: &str) -> IResult<&str, Value> {
    let (rest, text) = recognize((
        opt(char('-')),
        digit1,
        opt((char('.'), digit1)),
        opt((nom::character::complete::one_of("eE"), opt(nom::character::complete::one_of("+-")), digit1)),
    ))
    .parse(input)?;
    if text.contains('.') || text.contains('e') || text.contains('E') {
        let f: f64 = text.parse().map_err(|_| nom_err(input))?;
        Ok((rest, Value::Float(f)))
    } else {
        let i: i64 = text.parse().map_err(|_| nom_err(input))?;
        Ok((rest, Value::Int(i)))
    }
}

fn octal_escape(rest: &str) -> (u8, &str) {
    let mut digits = String::new();
    let mut it = rest.chars();
    for _ in 0..3 {
        match it.clone().next() {
            Some(d) if d.is_ascii_digit() => {
                digits.push(d);
                it.next();
            }
            _ => break,
        }
    }
    let val = u8::from_str_radix(&digits, 8).unwrap_or(0);
    (val, it.as_str())
}

fn parse_char(input: &str) -> IResult<&str, Value> {
    let (input, _) = char('\'')(input)?;
    if let Some(rest) = input.strip_prefix('\\') {
        let mut chars = rest.chars();
        match chars.next() {
            Some('n') => Ok((chars.as_str(), Value::Char(b'\n'))),
            Some('t') => Ok((chars.as_str(), Value::Char(b'\t'))),
            Some('\\') => Ok((chars.as_str(), Value::Char(b'\\'))),
            Some('\'') => Ok((chars.as_str(), Value::Char(b'\''))),
            Some(c) if c.is_ascii_digit() => {
                let (val, tail) = octal_escape(rest);
                let _ = c;
                Ok((tail, Value::Char(val)))
            }
            _ => Err(nom_err(input)),
        }
    } else {
        let mut chars = input.chars();
        match chars.next() {
            Some(c) => Ok((chars.as_str(), Value::Char(c as u8))),
            None => Err(nom_err(input)),
        }
    }
}

fn parse_string(input: &str) -> IResult<&str, Value> {
    let (mut rest, _) = char('"')(input)?;
    let mut result = Vec::new();
    loop {
        let mut it = rest.chars();
        match it.next() {
            None => return Err(nom::Err::Failure(nom::error::Error::new(rest, nom::error::ErrorKind::Eof))),
            Some('"') => {
                rest = it.as_str();
                break;
            }
            Some('\\') => match it.next() {
                Some('n') => {
                    result.push(b'\n');
                    rest = it.as_str();
                }
                Some('t') => {
                    result.push(b'\t');
                    rest = it.as_str();
                }
                Some('\\') => {
                    result.push(b'\\');
                    rest = it.as_str();
                }
                Some('"') => {
                    result.push(b'"');
                    rest = it.as_str();
                }
                Some(c) if c.is_ascii_digit() => {
                    let (val, tail) = octal_escape(it.as_str());
                    let _ = c;
                    result.push(val);
                    rest = tail;
                }
                Some(c) => {
                    result.extend_from_slice(c.encode_utf8(&mut [0u8; 4]).as_bytes());
                    rest = it.as_str();
                }
                None => return Err(nom::Err::Failure(nom::error::Error::new(rest, nom::error::ErrorKind::Eof))),
            },
            Some(c) => {
                result.extend_from_slice(c.encode_utf8(&mut [0u8; 4]).as_bytes());
                rest = it.as_str();
            }
        }
    }
    Ok((rest, Value::String(result)))
}

fn parse_set(input: &str) -> IResult<&str, Value> {
    let (mut rest, _) = char('{')(input)?;
    let mut bits: u64 = 0;
    loop {
        let (r, _) = ws_and_comments(rest)?;
        rest = r;
        if let Some(r2) = rest.strip_prefix('}') {
            rest = r2;
            break;
        }
        let (r2, n) = digit1::<_, nom::error::Error<_>>(rest)?;
        let val: u64 = n.parse().map_err(|_| nom_err(rest))?;
        if val < 64 {
            bits |= 1u64 << val;
        }
        rest = r2;
    }
    Ok((rest, Value::Set(bits)))
}

fn parse_list(input: &str) -> IResult<&str, Value> {
    let (mut rest, _) = char('[')(input)?;
    let mut items = Vec::new();
    loop {
        let (r, _) = ws_and_comments(rest)?;
        rest = r;
        if let Some(r2) = rest.strip_prefix(']') {
            rest = r2;
            break;
        }
        let (r2, v) = parse_value(rest)?;
        items.push(v);
        rest = r2;
    }
    Ok((rest, Value::List(items)))
}

fn parse_bare_word(input: &str) -> IResult<&str, Value> {
    let (rest, text) = take_while1(is_symbol_char)(input)?;
    Ok((
        rest,
        match text {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::Symbol(intern(text)),
        },
    ))
}

/// Literal/quotation grammar: anything that can appear inside `[...]`.
fn parse_value(input: &str) -> IResult<&str, Value> {
    let (input, _) = ws_and_comments(input)?;
    alt((
        parse_string,
        parse_char,
        parse_set,
        parse_list,
        parse_number,
        parse_bare_word,
    ))
    .parse(input)
}

// ---------------------------------------------------------------------
// Token stream for the phrase grammar.
// ---------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Val(Value),
    Define,
    Libra,
    Hide,
    In,
    End,
    Module,
    Private,
    Public,
    Eq,
    Semi,
    Dot,
}

fn same_kind(a: &Token, b: &Token) -> bool {
    std::mem::discriminant(a) == std::mem::discriminant(b)
}

fn next_token(input: &str) -> IResult<&str, Option<Token>> {
    let (input, _) = ws_and_comments(input)?;
    if input.is_empty() {
        return Ok((input, None));
    }
    if let Some(rest) = input.strip_prefix("==") {
        return Ok((rest, Some(Token::Eq)));
    }
    if let Some(rest) = input.strip_prefix(';') {
        return Ok((rest, Some(Token::Semi)));
    }
    if input.starts_with('"') {
        let (r, v) = parse_string(input)?;
        return Ok((r, Some(Token::Val(v))));
    }
    if input.starts_with('\'') {
        let (r, v) = parse_char(input)?;
        return Ok((r, Some(Token::Val(v))));
    }
    if input.starts_with('{') {
        let (r, v) = parse_set(input)?;
        return Ok((r, Some(Token::Val(v))));
    }
    if input.starts_with('[') {
        let (r, v) = parse_list(input)?;
        return Ok((r, Some(Token::Val(v))));
    }
    if let Ok((r, v)) = parse_number(input) {
        return Ok((r, Some(Token::Val(v))));
    }
    if let Some(rest) = input.strip_prefix('.') {
        return Ok((rest, Some(Token::Dot)));
    }
    let (rest, text) = take_while1::<_, _, nom::error::Error<_>>(is_symbol_char)(input)?;
    let tok = match text {
        "DEFINE" => Token::Define,
        "LIBRA" => Token::Libra,
        "HIDE" => Token::Hide,
        "IN" => Token::In,
        "END" => Token::End,
        "MODULE" => Token::Module,
        "PRIVATE" => Token::Private,
        "PUBLIC" => Token::Public,
        "true" => Token::Val(Value::Bool(true)),
        "false" => Token::Val(Value::Bool(false)),
        _ => Token::Val(Value::Symbol(intern(text))),
    };
    Ok((rest, Some(tok)))
}

/// Tokenize, transparently dropping `MODULE <name>`/`PRIVATE`/`PUBLIC`
/// markers (spec §4.1: "treated as transparent").
fn tokenize(src: &str) -> Result<Vec<(Token, Position)>, JoyError> {
    let mut tokens = Vec::new();
    let mut rest = src;
    loop {
        let offset = src.len() - rest.len();
        match next_token(rest) {
            Ok((r, Some(Token::Module))) => {
                rest = r;
                if let Ok((r2, Some(_name))) = next_token(rest) {
                    rest = r2;
                }
            }
            Ok((r, Some(Token::Private))) | Ok((r, Some(Token::Public))) => {
                rest = r;
            }
            Ok((r, Some(tok))) => {
                tokens.push((tok, position_at(src, offset)));
                rest = r;
            }
            Ok((_, None)) => break,
            Err(_) => {
                let pos = position_at(src, offset);
                return Err(JoyError::parse_error(format!(
                    "unrecognized input at line {} column {}",
                    pos.line, pos.column
                )));
            }
        }
    }
    Ok(tokens)
}

// ---------------------------------------------------------------------
// Phrase grammar: DEFINE/LIBRA blocks (with HIDE/IN/END) and term sequences.
// ---------------------------------------------------------------------

/// One top-level unit of the program: either a block of definitions or a
/// `.`-terminated sequence of terms to evaluate (spec §4.1, "Parsing result").
#[derive(Debug, Clone)]
pub enum Phrase {
    Definitions(Vec<(Symbol, Vec<Value>)>),
    Terms(Vec<Value>),
}

struct Cursor<'a> {
    tokens: &'a [(Token, Position)],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn advance(&mut self) -> Option<&Token> {
        let t = self.tokens.get(self.pos).map(|(t, _)| t);
        self.pos += 1;
        t
    }

    fn position(&self) -> Position {
        self.tokens
            .get(self.pos.min(self.tokens.len().saturating_sub(1)))
            .map(|(_, p)| *p)
            .unwrap_or_default()
    }
}

fn expect(cur: &mut Cursor, want: &Token) -> Result<(), JoyError> {
    match cur.advance() {
        Some(t) if same_kind(t, want) => Ok(()),
        _ => Err(JoyError::parse_error(format!(
            "expected {:?} near line {}",
            want,
            cur.position().line
        ))),
    }
}

fn expect_symbol(cur: &mut Cursor) -> Result<Symbol, JoyError> {
    match cur.advance() {
        Some(Token::Val(Value::Symbol(s))) => Ok(s.clone()),
        _ => Err(JoyError::parse_error(format!(
            "expected a definition name near line {}",
            cur.position().line
        ))),
    }
}

/// Gathers plain value tokens up to (not including) any of `stops`.
fn collect_body_until(cur: &mut Cursor, stops: &[Token]) -> Result<Vec<Value>, JoyError> {
    let mut body = Vec::new();
    loop {
        match cur.peek() {
            None => return Err(JoyError::parse_error("unterminated definition body")),
            Some(t) if stops.iter().any(|s| same_kind(s, t)) => break,
            Some(Token::Val(v)) => {
                body.push(v.clone());
                cur.advance();
            }
            Some(other) => {
                return Err(JoyError::parse_error(format!(
                    "unexpected {:?} in definition body",
                    other
                )))
            }
        }
    }
    Ok(body)
}

/// Parses `name == body ; name == body ; ...` up to `stop`, flattening any
/// nested `HIDE ... IN ... END` into the same list (see SPEC_FULL.md §4.1
/// for why hiding is a source-level convention here, not a runtime one).
fn parse_defs_until(cur: &mut Cursor, stop: &Token) -> Result<Vec<(Symbol, Vec<Value>)>, JoyError> {
    let mut defs = Vec::new();
    loop {
        match cur.peek() {
            Some(t) if same_kind(t, stop) => break,
            Some(Token::Hide) => {
                cur.advance();
                let hidden = parse_defs_until(cur, &Token::In)?;
                expect(cur, &Token::In)?;
                let public = parse_defs_until(cur, &Token::End)?;
                expect(cur, &Token::End)?;
                defs.extend(hidden);
                defs.extend(public);
            }
            Some(Token::Val(Value::Symbol(_))) => {
                let name = expect_symbol(cur)?;
                expect(cur, &Token::Eq)?;
                let body = collect_body_until(cur, &[Token::Semi.clone(), stop.clone(), Token::Hide])?;
                defs.push((name, body));
            }
            _ => {
                return Err(JoyError::parse_error(format!(
                    "expected a definition near line {}",
                    cur.position().line
                )))
            }
        }
        match cur.peek() {
            Some(Token::Semi) => {
                cur.advance();
            }
            Some(t) if same_kind(t, stop) => {}
            _ => {}
        }
    }
    Ok(defs)
}

fn parse_define_block(cur: &mut Cursor) -> Result<Vec<(Symbol, Vec<Value>)>, JoyError> {
    let defs = parse_defs_until(cur, &Token::Dot)?;
    expect(cur, &Token::Dot)?;
    Ok(defs)
}

fn parse_term_sequence(cur: &mut Cursor) -> Result<Vec<Value>, JoyError> {
    let mut terms = Vec::new();
    loop {
        match cur.advance() {
            None => break,
            Some(Token::Dot) => break,
            Some(Token::Val(v)) => terms.push(v.clone()),
            Some(other) => {
                return Err(JoyError::parse_error(format!(
                    "unexpected {:?} outside a definition",
                    other
                )))
            }
        }
    }
    Ok(terms)
}

/// Reads an entire source file (or interactive chunk) into an ordered list
/// of phrases (spec §4.1/§4.2).
pub fn read_program(src: &str) -> Result<Vec<Phrase>, JoyError> {
    let tokens = tokenize(src)?;
    let mut cur = Cursor { tokens: &tokens, pos: 0 };
    let mut phrases = Vec::new();
    while let Some(tok) = cur.peek() {
        match tok {
            Token::Define | Token::Libra => {
                cur.advance();
                let defs = parse_define_block(&mut cur)?;
                phrases.push(Phrase::Definitions(defs));
            }
            _ => {
                let terms = parse_term_sequence(&mut cur)?;
                phrases.push(Phrase::Terms(terms));
            }
        }
    }
    Ok(phrases)
}

/// Reads one top-level factor (any literal or bare identifier) from the
/// front of `input`, for the `get` primitive (spec §6: "`get` reads one
/// top-level factor ... from the current input"). Returns `None` when
/// `input` is empty or whitespace/comments only — the caller should pull
/// in another line and retry rather than treat that as an error.
pub fn read_one_factor(input: &str) -> Result<Option<(Value, &str)>, JoyError> {
    let (rest, _) = ws_and_comments(input).map_err(|_| JoyError::parse_error("malformed input"))?;
    if rest.is_empty() {
        return Ok(None);
    }
    match parse_value(input) {
        Ok((rest, v)) => Ok(Some((v, rest))),
        Err(_) => Err(JoyError::parse_error("malformed factor")),
    }
}
