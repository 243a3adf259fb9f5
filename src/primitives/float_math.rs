//! Float math (spec §4.4): "full C-math surface". Every primitive here
//! pops a float (promoting an integer argument) and pushes a float, except
//! the two/three-result primitives `frexp`/`modf` and the two-argument
//! `atan2`/`pow`/`ldexp`.

use crate::error::JoyError;
use crate::joy_macros::primitive;
use crate::machine::Machine;
use crate::value::Value;

fn pop_float(m: &mut Machine, op: &str) -> Result<f64, JoyError> {
    let v = m.pop(op)?;
    match v.as_numeric() {
        Some((_, f, _)) => Ok(f),
        None => Err(JoyError::type_error(op, "numeric", &v)),
    }
}

macro_rules! unary_float_prim {
    ($name:literal, $fn:ident, $op:expr) => {
        #[primitive(name = $name)]
        pub fn $fn(m: &mut Machine) -> Result<(), JoyError> {
            let x = pop_float(m, $name)?;
            m.push(Value::Float($op(x)));
            Ok(())
        }
    };
}

unary_float_prim!("sin", sin, f64::sin);
unary_float_prim!("cos", cos, f64::cos);
unary_float_prim!("tan", tan, f64::tan);
unary_float_prim!("asin", asin, f64::asin);
unary_float_prim!("acos", acos, f64::acos);
unary_float_prim!("atan", atan, f64::atan);
unary_float_prim!("exp", exp, f64::exp);
unary_float_prim!("log", log, f64::ln);
unary_float_prim!("log10", log10, f64::log10);
unary_float_prim!("sqrt", sqrt, f64::sqrt);
unary_float_prim!("floor", floor, f64::floor);
unary_float_prim!("ceil", ceil, f64::ceil);
unary_float_prim!("trunc", trunc, f64::trunc);
unary_float_prim!("sinh", sinh, f64::sinh);
unary_float_prim!("cosh", cosh, f64::cosh);
unary_float_prim!("tanh", tanh, f64::tanh);

#[primitive(name = "atan2")]
pub fn atan2(m: &mut Machine) -> Result<(), JoyError> {
    let y = pop_float(m, "atan2")?;
    let x = pop_float(m, "atan2")?;
    m.push(Value::Float(x.atan2(y)));
    Ok(())
}

#[primitive(name = "pow")]
pub fn pow(m: &mut Machine) -> Result<(), JoyError> {
    let e = pop_float(m, "pow")?;
    let b = pop_float(m, "pow")?;
    m.push(Value::Float(b.powf(e)));
    Ok(())
}

/// `X -> M E`: decomposes `X` into mantissa `M` in `[0.5, 1)` and exponent
/// `E` such that `X == M * 2^E`.
#[primitive(name = "frexp")]
pub fn frexp(m: &mut Machine) -> Result<(), JoyError> {
    let x = pop_float(m, "frexp")?;
    if x == 0.0 {
        m.push(Value::Float(0.0));
        m.push(Value::Int(0));
        return Ok(());
    }
    let bits = x.to_bits();
    let exponent = ((bits >> 52) & 0x7ff) as i64 - 1022;
    let mantissa = x / 2f64.powi(exponent as i32);
    m.push(Value::Float(mantissa));
    m.push(Value::Int(exponent));
    Ok(())
}

/// `M E -> X`: the inverse of `frexp`.
#[primitive(name = "ldexp")]
pub fn ldexp(m: &mut Machine) -> Result<(), JoyError> {
    let e = m.pop("ldexp")?;
    let e = match e {
        Value::Int(n) => n as i32,
        other => return Err(JoyError::type_error("ldexp", "integer", &other)),
    };
    let mant = pop_float(m, "ldexp")?;
    m.push(Value::Float(mant * 2f64.powi(e)));
    Ok(())
}

/// `X -> F I`: fractional part and integral part (both floats, as in C's `modf`).
#[primitive(name = "modf")]
pub fn modf(m: &mut Machine) -> Result<(), JoyError> {
    let x = pop_float(m, "modf")?;
    let int_part = x.trunc();
    m.push(Value::Float(x - int_part));
    m.push(Value::Float(int_part));
    Ok(())
}
