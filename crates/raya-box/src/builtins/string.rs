//! `String` constructor and `String.prototype`
//!
//! Positions and lengths count UTF-16 code units.

use super::arg;
use crate::convert::number_to_string;
use crate::descriptor::PropertyDescriptor;
use crate::error::{BoxError, BoxResult};
use crate::object::ObjectRef;
use crate::realm::Realm;
use crate::value::{PropertyKey, Value};
use std::rc::Rc;

/// Longest string `repeat` may produce, in bytes
const MAX_STRING_LENGTH: usize = 1 << 29;

pub(super) fn install(realm: &Realm) {
    let proto = realm.intrinsics().string_prototype.clone();
    define_length(&proto, "");

    let ctor = realm.constructor(
        "String",
        1,
        &proto,
        |realm, _this, args| match args.first() {
            None => Ok(Value::from("")),
            Some(Value::Symbol(sym)) => Ok(Value::from(sym.to_string())),
            Some(value) => Ok(Value::String(realm.to_string(value)?)),
        },
        |realm, args, new_target| {
            let s = match args.first() {
                None => Rc::from(""),
                Some(value) => realm.to_string(value)?,
            };
            let fallback = realm.intrinsics().string_prototype.clone();
            let proto = realm.prototype_from_constructor(new_target, &fallback)?;
            let wrapper = ObjectRef::with_primitive(Some(proto), Value::String(s.clone()));
            define_length(&wrapper, &s);
            Ok(Value::Object(wrapper))
        },
    );

    realm.define_method(&proto, "toString", 0, |_, this, _| {
        Ok(Value::String(this_string_value(this, "toString")?))
    });
    realm.define_method(&proto, "valueOf", 0, |_, this, _| {
        Ok(Value::String(this_string_value(this, "valueOf")?))
    });

    realm.define_method(&proto, "toUpperCase", 0, |realm, this, _| {
        Ok(Value::from(coerce_this(realm, this, "toUpperCase")?.to_uppercase()))
    });
    realm.define_method(&proto, "toLowerCase", 0, |realm, this, _| {
        Ok(Value::from(coerce_this(realm, this, "toLowerCase")?.to_lowercase()))
    });
    realm.define_method(&proto, "trim", 0, |realm, this, _| {
        Ok(Value::from(coerce_this(realm, this, "trim")?.trim()))
    });

    realm.define_method(&proto, "charAt", 1, |realm, this, args| {
        let units = utf16(&coerce_this(realm, this, "charAt")?);
        let pos = realm.to_integer_or_infinity(&arg(args, 0))?;
        if pos < 0.0 || pos >= units.len() as f64 {
            return Ok(Value::from(""));
        }
        let pos = pos as usize;
        Ok(Value::from(String::from_utf16_lossy(&units[pos..pos + 1])))
    });

    realm.define_method(&proto, "slice", 2, |realm, this, args| {
        let units = utf16(&coerce_this(realm, this, "slice")?);
        let len = units.len();
        let start = relative_index(realm.to_integer_or_infinity(&arg(args, 0))?, len);
        let end = match arg(args, 1) {
            Value::Undefined => len,
            end => relative_index(realm.to_integer_or_infinity(&end)?, len),
        };
        if start >= end {
            return Ok(Value::from(""));
        }
        Ok(Value::from(String::from_utf16_lossy(&units[start..end])))
    });

    realm.define_method(&proto, "indexOf", 1, |realm, this, args| {
        let units = utf16(&coerce_this(realm, this, "indexOf")?);
        let search = utf16(&realm.to_string(&arg(args, 0))?);
        let from = clamp_index(realm.to_integer_or_infinity(&arg(args, 1))?, units.len());
        let found = find_units(&units, &search, from).map_or(-1.0, |i| i as f64);
        Ok(Value::Number(found))
    });

    realm.define_method(&proto, "includes", 1, |realm, this, args| {
        let units = utf16(&coerce_this(realm, this, "includes")?);
        let search = utf16(&realm.to_string(&arg(args, 0))?);
        let from = clamp_index(realm.to_integer_or_infinity(&arg(args, 1))?, units.len());
        Ok(Value::from(find_units(&units, &search, from).is_some()))
    });

    realm.define_method(&proto, "startsWith", 1, |realm, this, args| {
        let units = utf16(&coerce_this(realm, this, "startsWith")?);
        let search = utf16(&realm.to_string(&arg(args, 0))?);
        let start = clamp_index(realm.to_integer_or_infinity(&arg(args, 1))?, units.len());
        Ok(Value::from(units[start..].starts_with(&search)))
    });

    realm.define_method(&proto, "endsWith", 1, |realm, this, args| {
        let units = utf16(&coerce_this(realm, this, "endsWith")?);
        let search = utf16(&realm.to_string(&arg(args, 0))?);
        let end = match arg(args, 1) {
            Value::Undefined => units.len(),
            end => clamp_index(realm.to_integer_or_infinity(&end)?, units.len()),
        };
        Ok(Value::from(units[..end].ends_with(&search)))
    });

    realm.define_method(&proto, "concat", 1, |realm, this, args| {
        let mut out = coerce_this(realm, this, "concat")?.to_string();
        for value in args {
            out.push_str(&realm.to_string(value)?);
        }
        Ok(Value::from(out))
    });

    realm.define_method(&proto, "repeat", 1, |realm, this, args| {
        let s = coerce_this(realm, this, "repeat")?;
        let count = realm.to_integer_or_infinity(&arg(args, 0))?;
        if count < 0.0 || count.is_infinite() {
            return Err(BoxError::range_error(format!(
                "Invalid count value: {}",
                number_to_string(count)
            )));
        }
        if s.len() as f64 * count > MAX_STRING_LENGTH as f64 {
            return Err(BoxError::range_error("Invalid string length"));
        }
        Ok(Value::from(s.repeat(count as usize)))
    });

    realm.define_method(&ctor, "fromCharCode", 1, |realm, _, args| {
        let mut units = Vec::with_capacity(args.len());
        for value in args {
            let n = realm.to_number(value)?;
            units.push(to_uint16(n));
        }
        Ok(Value::from(String::from_utf16_lossy(&units)))
    });

    realm.set_global("String", ctor);
}

/// Own `length` of a String wrapper
pub(super) fn define_length(wrapper: &ObjectRef, s: &str) {
    let len = s.encode_utf16().count();
    // Wrappers are fresh; `length` is defined exactly once
    let _ = wrapper.define_own_property(
        PropertyKey::from("length"),
        PropertyDescriptor::frozen(Value::Number(len as f64)),
    );
}

/// `thisStringValue`
fn this_string_value(this: &Value, method: &str) -> BoxResult<Rc<str>> {
    if let Value::String(s) = this {
        return Ok(s.clone());
    }
    if let Some(Value::String(s)) = this.as_object().and_then(ObjectRef::primitive) {
        return Ok(s);
    }
    Err(BoxError::type_error(format!(
        "String.prototype.{} requires that 'this' be a String",
        method
    )))
}

/// `RequireObjectCoercible(this)` then `ToString(this)`
fn coerce_this(realm: &Realm, this: &Value, method: &str) -> BoxResult<Rc<str>> {
    if this.is_nullish() {
        return Err(BoxError::type_error(format!(
            "String.prototype.{} called on null or undefined",
            method
        )));
    }
    realm.to_string(this)
}

fn utf16(s: &str) -> Vec<u16> {
    s.encode_utf16().collect()
}

fn find_units(haystack: &[u16], needle: &[u16], from: usize) -> Option<usize> {
    if needle.is_empty() {
        return Some(from.min(haystack.len()));
    }
    if needle.len() > haystack.len() {
        return None;
    }
    (from..=haystack.len() - needle.len()).find(|&i| haystack[i..].starts_with(needle))
}

fn clamp_index(pos: f64, len: usize) -> usize {
    pos.clamp(0.0, len as f64) as usize
}

fn relative_index(pos: f64, len: usize) -> usize {
    if pos < 0.0 {
        (len as f64 + pos).max(0.0) as usize
    } else {
        pos.min(len as f64) as usize
    }
}

/// `ToUint16`
fn to_uint16(n: f64) -> u16 {
    if !n.is_finite() {
        return 0;
    }
    n.trunc().rem_euclid(65536.0) as u16
}
