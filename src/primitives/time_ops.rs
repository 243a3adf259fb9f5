//! Time and randomness (spec §4.4): `clock`, `time`, `rand`, `srand`,
//! `localtime`, `gmtime`, `mktime`, `strftime`.

use crate::error::JoyError;
use crate::joy_macros::primitive;
use crate::machine::Machine;
use crate::value::Value;
use chrono::{Datelike, Local, TimeZone, Timelike, Utc};

/// ` -> N`: elapsed milliseconds since the machine started (spec §4.4).
#[primitive(name = "clock")]
pub fn clock(m: &mut Machine) -> Result<(), JoyError> {
    m.push(Value::Int(m.start_time.elapsed().as_millis() as i64));
    Ok(())
}

/// ` -> N`: Unix epoch seconds.
#[primitive(name = "time")]
pub fn time(m: &mut Machine) -> Result<(), JoyError> {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_err(|e| JoyError::domain_error("time", e.to_string()))?;
    m.push(Value::Int(now.as_secs() as i64));
    Ok(())
}

/// ` -> N`: a pseudo-random integer (spec §4.4, "rand/srand").
#[primitive(name = "rand")]
pub fn rand(m: &mut Machine) -> Result<(), JoyError> {
    let n = (m.next_rand_u64() >> 1) as i64; // keep it non-negative, like C's rand()
    m.push(Value::Int(n));
    Ok(())
}

/// `N -> `: reseeds the PRNG deterministically.
#[primitive(name = "srand")]
pub fn srand(m: &mut Machine) -> Result<(), JoyError> {
    let seed = match m.pop("srand")? {
        Value::Int(n) => n as u64,
        other => return Err(JoyError::type_error("srand", "integer", &other)),
    };
    m.reseed(seed);
    Ok(())
}

/// A broken-down time, represented the only way this core has a tuple:
/// a list `[Sec Min Hour MDay Mon Year WDay YDay]`, C `struct tm` order.
fn tm_list(year: i32, month0: u32, day: u32, hour: u32, min: u32, sec: u32, wday: u32, yday: u32) -> Value {
    Value::List(vec![
        Value::Int(sec as i64),
        Value::Int(min as i64),
        Value::Int(hour as i64),
        Value::Int(day as i64),
        Value::Int(month0 as i64),
        Value::Int(year as i64),
        Value::Int(wday as i64),
        Value::Int(yday as i64),
    ])
}

fn pop_epoch_seconds(m: &mut Machine, op: &str) -> Result<i64, JoyError> {
    match m.pop(op)? {
        Value::Int(n) => Ok(n),
        other => Err(JoyError::type_error(op, "integer", &other)),
    }
}

/// `N -> [...]`: local broken-down time for epoch seconds `N`.
#[primitive(name = "localtime")]
pub fn localtime(m: &mut Machine) -> Result<(), JoyError> {
    let secs = pop_epoch_seconds(m, "localtime")?;
    let dt = Local
        .timestamp_opt(secs, 0)
        .single()
        .ok_or_else(|| JoyError::domain_error("localtime", "out of range"))?;
    m.push(tm_list(
        dt.year(),
        dt.month0(),
        dt.day(),
        dt.hour(),
        dt.minute(),
        dt.second(),
        dt.weekday().num_days_from_sunday(),
        dt.ordinal0(),
    ));
    Ok(())
}

/// `N -> [...]`: UTC broken-down time for epoch seconds `N`.
#[primitive(name = "gmtime")]
pub fn gmtime(m: &mut Machine) -> Result<(), JoyError> {
    let secs = pop_epoch_seconds(m, "gmtime")?;
    let dt = Utc
        .timestamp_opt(secs, 0)
        .single()
        .ok_or_else(|| JoyError::domain_error("gmtime", "out of range"))?;
    m.push(tm_list(
        dt.year(),
        dt.month0(),
        dt.day(),
        dt.hour(),
        dt.minute(),
        dt.second(),
        dt.weekday().num_days_from_sunday(),
        dt.ordinal0(),
    ));
    Ok(())
}

/// `[...] -> N`: the inverse of `gmtime` — a broken-down UTC time back to
/// epoch seconds. Only `Sec Min Hour MDay Mon Year` (the first six fields)
/// are read; `WDay`/`YDay` are derived, not round-tripped.
#[primitive(name = "mktime")]
pub fn mktime(m: &mut Machine) -> Result<(), JoyError> {
    let tm = m.pop_quotation("mktime")?;
    if tm.len() < 6 {
        return Err(JoyError::domain_error("mktime", "expected a 6-or-8-element broken-down time"));
    }
    let field = |v: &Value| -> Result<i64, JoyError> {
        match v {
            Value::Int(n) => Ok(*n),
            other => Err(JoyError::type_error("mktime", "integer", other)),
        }
    };
    let sec = field(&tm[0])?;
    let min = field(&tm[1])?;
    let hour = field(&tm[2])?;
    let day = field(&tm[3])?;
    let month0 = field(&tm[4])?;
    let year = field(&tm[5])?;
    let dt = Utc
        .with_ymd_and_hms(year as i32, (month0 + 1) as u32, day as u32, hour as u32, min as u32, sec as u32)
        .single()
        .ok_or_else(|| JoyError::domain_error("mktime", "field out of range"))?;
    m.push(Value::Int(dt.timestamp()));
    Ok(())
}

/// `[...] Fmt -> Str`: `strftime`-style formatting (spec's `strftime`),
/// delegated to `chrono`'s own `%`-directive formatter.
#[primitive(name = "strftime")]
pub fn strftime(m: &mut Machine) -> Result<(), JoyError> {
    let fmt = match m.pop("strftime")? {
        Value::String(s) => String::from_utf8_lossy(&s).into_owned(),
        other => return Err(JoyError::type_error("strftime", "string", &other)),
    };
    let tm = m.pop_quotation("strftime")?;
    if tm.len() < 6 {
        return Err(JoyError::domain_error("strftime", "expected a 6-or-8-element broken-down time"));
    }
    let field = |v: &Value| -> Result<i64, JoyError> {
        match v {
            Value::Int(n) => Ok(*n),
            other => Err(JoyError::type_error("strftime", "integer", other)),
        }
    };
    let sec = field(&tm[0])?;
    let min = field(&tm[1])?;
    let hour = field(&tm[2])?;
    let day = field(&tm[3])?;
    let month0 = field(&tm[4])?;
    let year = field(&tm[5])?;
    let dt = Utc
        .with_ymd_and_hms(year as i32, (month0 + 1) as u32, day as u32, hour as u32, min as u32, sec as u32)
        .single()
        .ok_or_else(|| JoyError::domain_error("strftime", "field out of range"))?;
    m.push(Value::String(dt.format(&fmt).to_string().into_bytes()));
    Ok(())
}
