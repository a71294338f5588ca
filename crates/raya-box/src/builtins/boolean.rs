//! `Boolean` constructor and `Boolean.prototype`

use super::arg;
use crate::error::{BoxError, BoxResult};
use crate::object::ObjectRef;
use crate::realm::Realm;
use crate::value::Value;

pub(super) fn install(realm: &Realm) {
    let proto = realm.intrinsics().boolean_prototype.clone();

    let ctor = realm.constructor(
        "Boolean",
        1,
        &proto,
        |_, _this, args| Ok(Value::from(arg(args, 0).to_boolean())),
        |realm, args, new_target| {
            let b = arg(args, 0).to_boolean();
            let fallback = realm.intrinsics().boolean_prototype.clone();
            let proto = realm.prototype_from_constructor(new_target, &fallback)?;
            Ok(Value::Object(ObjectRef::with_primitive(Some(proto), Value::from(b))))
        },
    );

    realm.define_method(&proto, "toString", 0, |_, this, _| {
        let b = this_boolean_value(this, "toString")?;
        Ok(Value::from(if b { "true" } else { "false" }))
    });
    realm.define_method(&proto, "valueOf", 0, |_, this, _| {
        Ok(Value::from(this_boolean_value(this, "valueOf")?))
    });

    realm.set_global("Boolean", ctor);
}

/// `thisBooleanValue`
fn this_boolean_value(this: &Value, method: &str) -> BoxResult<bool> {
    if let Some(b) = this.as_bool() {
        return Ok(b);
    }
    if let Some(Value::Boolean(b)) = this.as_object().and_then(ObjectRef::primitive) {
        return Ok(b);
    }
    Err(BoxError::type_error(format!(
        "Boolean.prototype.{} requires that 'this' be a Boolean",
        method
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boolean_wrapper_is_truthy_but_unwraps_false() {
        let realm = Realm::new();
        let ctor = realm.global("Boolean").unwrap();
        let boxed = realm.construct(&ctor, &[Value::from(false)], None).unwrap();
        assert!(boxed.to_boolean());
        assert_eq!(realm.invoke(&boxed, "valueOf", &[]).unwrap(), Value::from(false));
        assert_eq!(&*realm.to_string(&boxed).unwrap(), "false");
    }

    #[test]
    fn test_boolean_call_uses_to_boolean() {
        let realm = Realm::new();
        let ctor = Value::Object(realm.global("Boolean").unwrap());
        assert_eq!(realm.call(&ctor, &Value::Undefined, &[Value::from("")]).unwrap(), Value::from(false));
        assert_eq!(realm.call(&ctor, &Value::Undefined, &[Value::from("0")]).unwrap(), Value::from(true));
    }
}
