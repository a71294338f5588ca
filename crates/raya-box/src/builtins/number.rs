//! `Number` constructor and `Number.prototype`
//!
//! - toString(radix): decimal or radix 2..=36
//! - toFixed(digits): fixed decimal places
//! - toPrecision(precision): significant digits
//! - valueOf / toLocaleString

use super::{arg, define_constant};
use crate::convert::{
    number_to_fixed, number_to_precision, number_to_radix_string, number_to_string,
    string_to_number,
};
use crate::error::{BoxError, BoxResult};
use crate::object::ObjectRef;
use crate::realm::Realm;
use crate::value::Value;

/// 2^53 - 1
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

pub(super) fn install(realm: &Realm) {
    let proto = realm.intrinsics().number_prototype.clone();

    let ctor = realm.constructor(
        "Number",
        1,
        &proto,
        |realm, _this, args| Ok(Value::Number(number_argument(realm, args)?)),
        |realm, args, new_target| {
            let n = number_argument(realm, args)?;
            let fallback = realm.intrinsics().number_prototype.clone();
            let proto = realm.prototype_from_constructor(new_target, &fallback)?;
            Ok(Value::Object(ObjectRef::with_primitive(Some(proto), Value::Number(n))))
        },
    );

    realm.define_method(&proto, "toString", 1, |realm, this, args| {
        let n = this_number_value(this, "toString")?;
        let radix = arg(args, 0);
        let radix = if radix.is_undefined() {
            10.0
        } else {
            realm.to_integer_or_infinity(&radix)?
        };
        if !(2.0..=36.0).contains(&radix) {
            return Err(BoxError::range_error("toString() radix must be between 2 and 36"));
        }
        Ok(Value::from(number_to_radix_string(n, radix as u32)))
    });

    realm.define_method(&proto, "toFixed", 1, |realm, this, args| {
        let n = this_number_value(this, "toFixed")?;
        let digits = realm.to_integer_or_infinity(&arg(args, 0))?;
        Ok(Value::from(number_to_fixed(n, digits)?))
    });

    realm.define_method(&proto, "toPrecision", 1, |realm, this, args| {
        let n = this_number_value(this, "toPrecision")?;
        let precision = arg(args, 0);
        if precision.is_undefined() {
            return Ok(Value::from(number_to_string(n)));
        }
        let precision = realm.to_integer_or_infinity(&precision)?;
        Ok(Value::from(number_to_precision(n, precision)?))
    });

    realm.define_method(&proto, "valueOf", 0, |_, this, _| {
        Ok(Value::Number(this_number_value(this, "valueOf")?))
    });

    realm.define_method(&proto, "toLocaleString", 0, |_, this, _| {
        Ok(Value::from(number_to_string(this_number_value(this, "toLocaleString")?)))
    });

    let constants = [
        ("MAX_SAFE_INTEGER", MAX_SAFE_INTEGER),
        ("MIN_SAFE_INTEGER", -MAX_SAFE_INTEGER),
        ("EPSILON", f64::EPSILON),
        ("MAX_VALUE", f64::MAX),
        ("MIN_VALUE", 5e-324),
        ("NaN", f64::NAN),
        ("POSITIVE_INFINITY", f64::INFINITY),
        ("NEGATIVE_INFINITY", f64::NEG_INFINITY),
    ];
    for (name, value) in constants {
        define_constant(&ctor, name, Value::Number(value));
    }

    realm.define_method(&ctor, "isInteger", 1, |_, _, args| {
        Ok(Value::from(arg(args, 0).as_number().is_some_and(is_integral)))
    });
    realm.define_method(&ctor, "isSafeInteger", 1, |_, _, args| {
        let safe = arg(args, 0)
            .as_number()
            .is_some_and(|n| is_integral(n) && n.abs() <= MAX_SAFE_INTEGER);
        Ok(Value::from(safe))
    });
    realm.define_method(&ctor, "isFinite", 1, |_, _, args| {
        Ok(Value::from(arg(args, 0).as_number().is_some_and(f64::is_finite)))
    });
    realm.define_method(&ctor, "isNaN", 1, |_, _, args| {
        Ok(Value::from(arg(args, 0).as_number().is_some_and(f64::is_nan)))
    });
    realm.define_method(&ctor, "parseFloat", 1, |realm, _, args| {
        let input = realm.to_string(&arg(args, 0))?;
        Ok(Value::Number(parse_float(&input)))
    });

    realm.set_global("Number", ctor);
}

fn number_argument(realm: &Realm, args: &[Value]) -> BoxResult<f64> {
    match args.first() {
        Some(value) => realm.to_number(value),
        None => Ok(0.0),
    }
}

/// `thisNumberValue`
fn this_number_value(this: &Value, method: &str) -> BoxResult<f64> {
    if let Some(n) = this.as_number() {
        return Ok(n);
    }
    if let Some(Value::Number(n)) = this.as_object().and_then(ObjectRef::primitive) {
        return Ok(n);
    }
    Err(BoxError::type_error(format!(
        "Number.prototype.{} requires that 'this' be a Number",
        method
    )))
}

fn is_integral(n: f64) -> bool {
    n.is_finite() && n.trunc() == n
}

/// `parseFloat`: the longest decimal literal prefix, or `NaN`
pub fn parse_float(input: &str) -> f64 {
    let s = input.trim_start();
    let (sign, unsigned) = match s.as_bytes().first() {
        Some(b'-') => (-1.0, &s[1..]),
        Some(b'+') => (1.0, &s[1..]),
        _ => (1.0, s),
    };
    if unsigned.starts_with("Infinity") {
        return sign * f64::INFINITY;
    }

    let bytes = unsigned.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };
    let int_end = digits_from(0);
    let mut end = int_end;
    let mut has_digits = int_end > 0;
    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        has_digits |= frac_end > end + 1;
        end = frac_end;
    }
    if !has_digits {
        return f64::NAN;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }
    sign * string_to_number(&unsigned[..end])
}
