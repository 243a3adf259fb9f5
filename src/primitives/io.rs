//! I/O (spec §4.4): terminal output/input (`put`, `putch`, `putchars`,
//! `.`/`newline`, `get`) and the `f...` file family. Every file primitive's
//! error path routes through `JoyError::FileError` with the OS message
//! attached (SPEC_FULL.md §4.4), never swallowed.
//!
//! Convention for the `f...` family (not pinned down by spec.md): every
//! primitive that touches a file leaves the file handle back on the stack
//! (mirroring the explicit `fread S N -> S L` / `fwrite S L -> S`
//! signatures spec.md gives), so file operations chain without re-fetching
//! the handle from elsewhere.

use crate::error::JoyError;
use crate::joy_macros::primitive;
use crate::machine::{FileRef, Machine};
use crate::reader::read_one_factor;
use crate::value::{FileHandle, Value};
use std::fs::OpenOptions;
use std::io::{Read, Seek, SeekFrom, Write};

#[primitive(name = "put")]
pub fn put(m: &mut Machine) -> Result<(), JoyError> {
    let v = m.pop("put")?;
    print!("{}", v);
    std::io::stdout().flush().ok();
    Ok(())
}

#[primitive(name = "putch")]
pub fn putch(m: &mut Machine) -> Result<(), JoyError> {
    let v = m.pop("putch")?;
    match v {
        Value::Char(c) => {
            print!("{}", c as char);
            std::io::stdout().flush().ok();
            Ok(())
        }
        other => Err(JoyError::type_error("putch", "char", &other)),
    }
}

#[primitive(name = "putchars")]
pub fn putchars(m: &mut Machine) -> Result<(), JoyError> {
    let v = m.pop("putchars")?;
    match v {
        Value::String(s) => {
            std::io::stdout().write_all(&s).ok();
            std::io::stdout().flush().ok();
            Ok(())
        }
        other => Err(JoyError::type_error("putchars", "string", &other)),
    }
}

/// Emits one line terminator (spec §6: "`.` / `newline` emits one line
/// terminator"). `.` is only available as a bare symbol inside a
/// quotation — at the top level a trailing `.` terminates the phrase
/// instead (spec §4.1), so this primitive is reached through `newline` or
/// through a quoted `.` (e.g. `[dup .]`).
fn emit_newline(_m: &mut Machine) -> Result<(), JoyError> {
    println!();
    Ok(())
}

#[primitive(name = "newline")]
pub fn newline(m: &mut Machine) -> Result<(), JoyError> {
    emit_newline(m)
}

#[primitive(name = ".")]
pub fn dot(m: &mut Machine) -> Result<(), JoyError> {
    emit_newline(m)
}

/// Reads one top-level factor from standard input, pulling in another
/// line whenever the pending buffer runs dry (spec §6).
#[primitive(name = "get")]
pub fn get(m: &mut Machine) -> Result<(), JoyError> {
    loop {
        if let Some((v, rest)) = read_one_factor(&m.input_buffer)? {
            m.input_buffer = rest.to_string();
            m.push(v);
            return Ok(());
        }
        let mut line = String::new();
        let n = std::io::stdin()
            .read_line(&mut line)
            .map_err(|e| JoyError::file_error("get", e.to_string()))?;
        if n == 0 {
            return Err(JoyError::file_error("get", "end of input"));
        }
        m.input_buffer.push_str(&line);
    }
}

fn pop_file_handle(m: &mut Machine, op: &str) -> Result<FileHandle, JoyError> {
    match m.pop(op)? {
        Value::File(h) => Ok(h),
        other => Err(JoyError::type_error(op, "file", &other)),
    }
}

fn pop_string(m: &mut Machine, op: &str) -> Result<String, JoyError> {
    match m.pop(op)? {
        Value::String(s) => Ok(String::from_utf8_lossy(&s).into_owned()),
        other => Err(JoyError::type_error(op, "string", &other)),
    }
}

/// `P M -> S`: opens `P` with mode string `M` (a prefix of `fopen`'s C
/// semantics: `r`, `w`, `a`, `r+`, `w+`, `a+`).
#[primitive(name = "fopen")]
pub fn fopen(m: &mut Machine) -> Result<(), JoyError> {
    let mode = pop_string(m, "fopen")?;
    let path = pop_string(m, "fopen")?;
    let mut opts = OpenOptions::new();
    match mode.as_str() {
        "r" => {
            opts.read(true);
        }
        "w" => {
            opts.write(true).create(true).truncate(true);
        }
        "a" => {
            opts.append(true).create(true);
        }
        "r+" => {
            opts.read(true).write(true);
        }
        "w+" => {
            opts.read(true).write(true).create(true).truncate(true);
        }
        "a+" => {
            opts.read(true).append(true).create(true);
        }
        other => return Err(JoyError::domain_error("fopen", format!("unknown mode {:?}", other))),
    }
    let file = opts.open(&path).map_err(|e| JoyError::file_error("fopen", e.to_string()))?;
    let id = m.files.open(file);
    m.push(Value::File(FileHandle::Handle(id)));
    Ok(())
}

#[primitive(name = "fclose")]
pub fn fclose(m: &mut Machine) -> Result<(), JoyError> {
    match pop_file_handle(m, "fclose")? {
        FileHandle::Handle(id) => {
            if m.file_table().close(id) {
                Ok(())
            } else {
                Err(JoyError::file_error("fclose", "use of a closed file handle"))
            }
        }
        _ => Ok(()), // closing stdin/stdout/stderr is a no-op
    }
}

/// `S N -> S L`: reads up to `N` bytes as a list of chars.
#[primitive(name = "fread")]
pub fn fread(m: &mut Machine) -> Result<(), JoyError> {
    let n = m.pop("fread")?;
    let n = match n {
        Value::Int(n) if n >= 0 => n as usize,
        other => return Err(JoyError::type_error("fread", "non-negative integer", &other)),
    };
    let h = pop_file_handle(m, "fread")?;
    let mut buf = vec![0u8; n];
    let read = match m.resolve_file(h, "fread")? {
        FileRef::Stdin => std::io::stdin().read(&mut buf),
        FileRef::Stdout | FileRef::Stderr => return Err(JoyError::file_error("fread", "not open for reading")),
        FileRef::Open(f) => f.file.read(&mut buf),
    };
    let read = read.map_err(|e| JoyError::file_error("fread", e.to_string()))?;
    if let FileHandle::Handle(id) = h {
        if let Some(entry) = m.file_table().get_mut(id) {
            entry.eof = read < n;
        }
    }
    m.push(Value::File(h));
    m.push(Value::List(buf[..read].iter().map(|b| Value::Char(*b)).collect()));
    Ok(())
}

/// `S L -> S`: writes a list of chars.
#[primitive(name = "fwrite")]
pub fn fwrite(m: &mut Machine) -> Result<(), JoyError> {
    let l = m.pop_quotation("fwrite")?;
    let h = pop_file_handle(m, "fwrite")?;
    let mut buf = Vec::with_capacity(l.len());
    for v in l {
        match v {
            Value::Char(c) => buf.push(c),
            other => return Err(JoyError::type_error("fwrite", "char", &other)),
        }
    }
    write_bytes(m, h, "fwrite", &buf)?;
    m.push(Value::File(h));
    Ok(())
}

fn write_bytes(m: &mut Machine, h: FileHandle, op: &str, buf: &[u8]) -> Result<(), JoyError> {
    match m.resolve_file(h, op)? {
        FileRef::Stdin => return Err(JoyError::file_error(op, "not open for writing")),
        FileRef::Stdout => std::io::stdout().write_all(buf),
        FileRef::Stderr => std::io::stderr().write_all(buf),
        FileRef::Open(f) => f.file.write_all(buf),
    }
    .map_err(|e| JoyError::file_error(op, e.to_string()))
}

/// `S -> S Str`: one line, newline stripped.
#[primitive(name = "fgets")]
pub fn fgets(m: &mut Machine) -> Result<(), JoyError> {
    let h = pop_file_handle(m, "fgets")?;
    let mut line = Vec::new();
    let mut hit_eof = false;
    loop {
        let mut byte = [0u8; 1];
        let n = match m.resolve_file(h, "fgets")? {
            FileRef::Stdin => std::io::stdin().read(&mut byte),
            FileRef::Stdout | FileRef::Stderr => return Err(JoyError::file_error("fgets", "not open for reading")),
            FileRef::Open(f) => f.file.read(&mut byte),
        }
        .map_err(|e| JoyError::file_error("fgets", e.to_string()))?;
        if n == 0 {
            hit_eof = true;
            break;
        }
        if byte[0] == b'\n' {
            break;
        }
        line.push(byte[0]);
    }
    if let FileHandle::Handle(id) = h {
        if let Some(entry) = m.file_table().get_mut(id) {
            entry.eof = hit_eof;
        }
    }
    m.push(Value::File(h));
    m.push(Value::String(line));
    Ok(())
}

/// `S -> S C`.
#[primitive(name = "fgetch")]
pub fn fgetch(m: &mut Machine) -> Result<(), JoyError> {
    let h = pop_file_handle(m, "fgetch")?;
    let mut byte = [0u8; 1];
    let n = match m.resolve_file(h, "fgetch")? {
        FileRef::Stdin => std::io::stdin().read(&mut byte),
        FileRef::Stdout | FileRef::Stderr => return Err(JoyError::file_error("fgetch", "not open for reading")),
        FileRef::Open(f) => f.file.read(&mut byte),
    }
    .map_err(|e| JoyError::file_error("fgetch", e.to_string()))?;
    if let FileHandle::Handle(id) = h {
        if let Some(entry) = m.file_table().get_mut(id) {
            entry.eof = n == 0;
        }
    }
    m.push(Value::File(h));
    if n == 0 {
        return Err(JoyError::file_error("fgetch", "end of file"));
    }
    m.push(Value::Char(byte[0]));
    Ok(())
}

/// `S X -> S`: writes `X` in its literal form, like `put` but to a file.
#[primitive(name = "fput")]
pub fn fput(m: &mut Machine) -> Result<(), JoyError> {
    let x = m.pop("fput")?;
    let h = pop_file_handle(m, "fput")?;
    write_bytes(m, h, "fput", x.to_string().as_bytes())?;
    m.push(Value::File(h));
    Ok(())
}

#[primitive(name = "fputch")]
pub fn fputch(m: &mut Machine) -> Result<(), JoyError> {
    let c = m.pop("fputch")?;
    let c = match c {
        Value::Char(c) => c,
        other => return Err(JoyError::type_error("fputch", "char", &other)),
    };
    let h = pop_file_handle(m, "fputch")?;
    write_bytes(m, h, "fputch", &[c])?;
    m.push(Value::File(h));
    Ok(())
}

#[primitive(name = "fputchars")]
pub fn fputchars(m: &mut Machine) -> Result<(), JoyError> {
    let s = pop_string(m, "fputchars")?;
    let h = pop_file_handle(m, "fputchars")?;
    write_bytes(m, h, "fputchars", s.as_bytes())?;
    m.push(Value::File(h));
    Ok(())
}

/// `S Pos Whence -> S`: `Whence` is 0 (start), 1 (current), 2 (end), as in C's `fseek`.
#[primitive(name = "fseek")]
pub fn fseek(m: &mut Machine) -> Result<(), JoyError> {
    let whence = m.pop("fseek")?;
    let pos = m.pop("fseek")?;
    let h = pop_file_handle(m, "fseek")?;
    let whence = match whence {
        Value::Int(w) => w,
        other => return Err(JoyError::type_error("fseek", "integer", &other)),
    };
    let pos = match pos {
        Value::Int(p) => p,
        other => return Err(JoyError::type_error("fseek", "integer", &other)),
    };
    let seek_from = match whence {
        0 => SeekFrom::Start(pos.max(0) as u64),
        1 => SeekFrom::Current(pos),
        2 => SeekFrom::End(pos),
        _ => return Err(JoyError::domain_error("fseek", "whence must be 0, 1, or 2")),
    };
    match m.resolve_file(h, "fseek")? {
        FileRef::Open(f) => {
            f.file.seek(seek_from).map_err(|e| JoyError::file_error("fseek", e.to_string()))?;
        }
        _ => return Err(JoyError::file_error("fseek", "cannot seek stdin/stdout/stderr")),
    }
    m.push(Value::File(h));
    Ok(())
}

#[primitive(name = "ftell")]
pub fn ftell(m: &mut Machine) -> Result<(), JoyError> {
    let h = pop_file_handle(m, "ftell")?;
    let pos = match m.resolve_file(h, "ftell")? {
        FileRef::Open(f) => f.file.stream_position().map_err(|e| JoyError::file_error("ftell", e.to_string()))?,
        _ => return Err(JoyError::file_error("ftell", "cannot tell stdin/stdout/stderr")),
    };
    m.push(Value::File(h));
    m.push(Value::Int(pos as i64));
    Ok(())
}

#[primitive(name = "fflush")]
pub fn fflush(m: &mut Machine) -> Result<(), JoyError> {
    let h = pop_file_handle(m, "fflush")?;
    match m.resolve_file(h, "fflush")? {
        FileRef::Stdin => {}
        FileRef::Stdout => {
            std::io::stdout().flush().map_err(|e| JoyError::file_error("fflush", e.to_string()))?;
        }
        FileRef::Stderr => {
            std::io::stderr().flush().map_err(|e| JoyError::file_error("fflush", e.to_string()))?;
        }
        FileRef::Open(f) => {
            f.file.flush().map_err(|e| JoyError::file_error("fflush", e.to_string()))?;
        }
    }
    m.push(Value::File(h));
    Ok(())
}

#[primitive(name = "feof")]
pub fn feof(m: &mut Machine) -> Result<(), JoyError> {
    let h = pop_file_handle(m, "feof")?;
    let eof = match h {
        FileHandle::Handle(id) => m.file_table().get_mut(id).map(|e| e.eof).unwrap_or(false),
        _ => false,
    };
    m.push(Value::File(h));
    m.push(Value::Bool(eof));
    Ok(())
}

#[primitive(name = "ferror")]
pub fn ferror(m: &mut Machine) -> Result<(), JoyError> {
    let h = pop_file_handle(m, "ferror")?;
    let error = match h {
        FileHandle::Handle(id) => m.file_table().get_mut(id).map(|e| e.error).unwrap_or(false),
        _ => false,
    };
    m.push(Value::File(h));
    m.push(Value::Bool(error));
    Ok(())
}

#[primitive(name = "fremove")]
pub fn fremove(m: &mut Machine) -> Result<(), JoyError> {
    let path = pop_string(m, "fremove")?;
    std::fs::remove_file(&path).map_err(|e| JoyError::file_error("fremove", e.to_string()))?;
    Ok(())
}

#[primitive(name = "frename")]
pub fn frename(m: &mut Machine) -> Result<(), JoyError> {
    let to = pop_string(m, "frename")?;
    let from = pop_string(m, "frename")?;
    std::fs::rename(&from, &to).map_err(|e| JoyError::file_error("frename", e.to_string()))?;
    Ok(())
}
