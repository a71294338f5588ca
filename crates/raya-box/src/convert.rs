//! Type conversions: ToPrimitive, ToNumber, ToString and number formatting

use crate::error::{BoxError, BoxResult};
use crate::object::ObjectRef;
use crate::realm::Realm;
use crate::value::{PropertyKey, Symbol, Value};
use std::rc::Rc;

/// Hint passed to `ToPrimitive`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferredType {
    /// No preference (`"default"`)
    Default,
    /// `"number"`
    Number,
    /// `"string"`
    String,
}

impl PreferredType {
    /// Hint string passed to `@@toPrimitive`
    pub fn as_str(self) -> &'static str {
        match self {
            PreferredType::Default => "default",
            PreferredType::Number => "number",
            PreferredType::String => "string",
        }
    }

    /// Parse a hint string
    pub fn from_hint(hint: &str) -> Option<Self> {
        match hint {
            "default" => Some(PreferredType::Default),
            "number" => Some(PreferredType::Number),
            "string" => Some(PreferredType::String),
            _ => None,
        }
    }
}

impl Realm {
    /// `ToPrimitive`: honors `@@toPrimitive`, then `valueOf`/`toString`
    pub fn to_primitive(&self, value: &Value, hint: PreferredType) -> BoxResult<Value> {
        let Value::Object(obj) = value else {
            return Ok(value.clone());
        };
        let key = PropertyKey::from(Symbol::to_primitive());
        if let Some(exotic) = self.get_method(value, &key)? {
            let result = self.call(&exotic, value, &[Value::from(hint.as_str())])?;
            if result.is_object() {
                return Err(BoxError::type_error("Cannot convert object to primitive value"));
            }
            return Ok(result);
        }
        let hint = match hint {
            PreferredType::Default => PreferredType::Number,
            other => other,
        };
        self.ordinary_to_primitive(obj, hint)
    }

    /// `OrdinaryToPrimitive`
    pub fn ordinary_to_primitive(&self, obj: &ObjectRef, hint: PreferredType) -> BoxResult<Value> {
        let order = if hint == PreferredType::String {
            ["toString", "valueOf"]
        } else {
            ["valueOf", "toString"]
        };
        let receiver = Value::Object(obj.clone());
        for name in order {
            let method = self.get(obj, &PropertyKey::from(name))?;
            if method.is_callable() {
                let result = self.call(&method, &receiver, &[])?;
                if !result.is_object() {
                    return Ok(result);
                }
            }
        }
        Err(BoxError::type_error("Cannot convert object to primitive value"))
    }

    /// `ToNumber`
    pub fn to_number(&self, value: &Value) -> BoxResult<f64> {
        match value {
            Value::Undefined => Ok(f64::NAN),
            Value::Null => Ok(0.0),
            Value::Boolean(b) => Ok(if *b { 1.0 } else { 0.0 }),
            Value::Number(n) => Ok(*n),
            Value::String(s) => Ok(string_to_number(s)),
            Value::Symbol(_) => Err(BoxError::type_error(
                "Cannot convert a Symbol value to a number",
            )),
            Value::Object(_) => {
                let prim = self.to_primitive(value, PreferredType::Number)?;
                self.to_number(&prim)
            }
        }
    }

    /// `ToString`
    pub fn to_string(&self, value: &Value) -> BoxResult<Rc<str>> {
        match value {
            Value::Undefined => Ok(Rc::from("undefined")),
            Value::Null => Ok(Rc::from("null")),
            Value::Boolean(b) => Ok(Rc::from(if *b { "true" } else { "false" })),
            Value::Number(n) => Ok(Rc::from(number_to_string(*n))),
            Value::String(s) => Ok(s.clone()),
            Value::Symbol(_) => Err(BoxError::type_error(
                "Cannot convert a Symbol value to a string",
            )),
            Value::Object(_) => {
                let prim = self.to_primitive(value, PreferredType::String)?;
                self.to_string(&prim)
            }
        }
    }

    /// `ToPropertyKey`
    pub fn to_property_key(&self, value: &Value) -> BoxResult<PropertyKey> {
        match self.to_primitive(value, PreferredType::String)? {
            Value::Symbol(sym) => Ok(PropertyKey::Symbol(sym)),
            prim => Ok(PropertyKey::String(self.to_string(&prim)?)),
        }
    }

    /// `ToIntegerOrInfinity`
    pub fn to_integer_or_infinity(&self, value: &Value) -> BoxResult<f64> {
        let n = self.to_number(value)?;
        if n.is_nan() || n == 0.0 {
            return Ok(0.0);
        }
        Ok(n.trunc())
    }
}

/// `StringToNumber`: decimal, hex/octal/binary literals and `Infinity`
pub fn string_to_number(s: &str) -> f64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    let prefixed = [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)];
    for (prefix, radix) in prefixed {
        if let Some(digits) = trimmed.strip_prefix(prefix) {
            return parse_integer_digits(digits, radix).unwrap_or(f64::NAN);
        }
    }
    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    // Rust also accepts "inf" and "nan", which are not numeric literals here
    if !trimmed
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'))
    {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

fn parse_integer_digits(digits: &str, radix: u32) -> Option<f64> {
    if digits.is_empty() {
        return None;
    }
    let mut result = 0.0f64;
    for c in digits.chars() {
        result = result * radix as f64 + c.to_digit(radix)? as f64;
    }
    Some(result)
}

/// `Number::toString(x)` with radix 10
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n < 0.0 {
        return format!("-{}", number_to_string(-n));
    }

    // `{:e}` yields the shortest round-tripping digit string
    let repr = format!("{:e}", n);
    let (mantissa, exponent) = repr.split_once('e').unwrap_or((repr.as_str(), "0"));
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let k = digits.len() as i32;
    let point = exponent.parse::<i32>().unwrap_or(0) + 1;

    if k <= point && point <= 21 {
        format!("{}{}", digits, "0".repeat((point - k) as usize))
    } else if 0 < point && point <= 21 {
        let (int, frac) = digits.split_at(point as usize);
        format!("{}.{}", int, frac)
    } else if -6 < point && point <= 0 {
        format!("0.{}{}", "0".repeat((-point) as usize), digits)
    } else {
        let e = point - 1;
        let sign = if e >= 0 { '+' } else { '-' };
        let (first, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{}e{}{}", first, sign, e.abs())
        } else {
            format!("{}.{}e{}{}", first, rest, sign, e.abs())
        }
    }
}

/// Maximum fractional digits produced for non-decimal radixes
const MAX_RADIX_FRACTION_DIGITS: usize = 52;

/// `Number.prototype.toString(radix)` for radix 2..=36
pub fn number_to_radix_string(value: f64, radix: u32) -> String {
    if radix == 10 || value.is_nan() || value.is_infinite() || value == 0.0 {
        return number_to_string(value);
    }
    let negative = value < 0.0;
    let value = value.abs();
    let mut int_part = value.trunc();
    let mut frac_part = value - int_part;
    let r = radix as f64;

    let mut int_digits = Vec::new();
    if int_part == 0.0 {
        int_digits.push('0');
    }
    while int_part >= 1.0 {
        let d = (int_part % r) as u32;
        int_digits.push(std::char::from_digit(d, radix).unwrap_or('0'));
        int_part = (int_part / r).trunc();
    }
    int_digits.reverse();

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.extend(int_digits);

    if frac_part > 0.0 {
        out.push('.');
        let mut emitted = 0;
        while frac_part > 0.0 && emitted < MAX_RADIX_FRACTION_DIGITS {
            frac_part *= r;
            let d = frac_part.trunc();
            out.push(std::char::from_digit(d as u32, radix).unwrap_or('0'));
            frac_part -= d;
            emitted += 1;
        }
    }
    out
}

/// `Number.prototype.toFixed(digits)`
pub fn number_to_fixed(value: f64, digits: f64) -> BoxResult<String> {
    if !(0.0..=100.0).contains(&digits) {
        return Err(BoxError::range_error(
            "toFixed() digits argument must be between 0 and 100",
        ));
    }
    if !value.is_finite() || value.abs() >= 1e21 {
        return Ok(number_to_string(value));
    }
    // -0 formats as "0"
    let value = if value == 0.0 { 0.0 } else { value };
    Ok(format!("{:.prec$}", value, prec = digits as usize))
}

/// `Number.prototype.toPrecision(precision)`
pub fn number_to_precision(value: f64, precision: f64) -> BoxResult<String> {
    if !value.is_finite() {
        return Ok(number_to_string(value));
    }
    if !(1.0..=100.0).contains(&precision) {
        return Err(BoxError::range_error(
            "toPrecision() argument must be between 1 and 100",
        ));
    }
    let p = precision as i32;
    let value = if value == 0.0 { 0.0 } else { value };

    let repr = format!("{:.*e}", (p - 1) as usize, value);
    let (mantissa, exponent) = repr.split_once('e').unwrap_or((repr.as_str(), "0"));
    let e = exponent.parse::<i32>().unwrap_or(0);

    if e < -6 || e >= p {
        let sign = if e >= 0 { '+' } else { '-' };
        return Ok(format!("{}e{}{}", mantissa, sign, e.abs()));
    }
    Ok(format!("{:.prec$}", value, prec = (p - 1 - e) as usize))
}
