//! `Object` constructor and `Object.prototype`

use super::arg;
use crate::error::BoxResult;
use crate::object::ObjectRef;
use crate::realm::Realm;
use crate::value::{PropertyKey, Symbol, Value};

pub(super) fn install(realm: &Realm) {
    let proto = realm.object_prototype().clone();

    let ctor = realm.constructor(
        "Object",
        1,
        &proto,
        |realm, _this, args| object_from(realm, &arg(args, 0)),
        |realm, args, new_target| {
            let is_object_ctor = realm
                .global("Object")
                .is_some_and(|ctor| ctor.ptr_eq(new_target));
            if !is_object_ctor {
                let proto = realm.prototype_from_constructor(new_target, realm.object_prototype())?;
                return Ok(Value::Object(ObjectRef::new(Some(proto))));
            }
            object_from(realm, &arg(args, 0))
        },
    );

    realm.define_method(&proto, "toString", 0, |realm, this, _| {
        let tag = match this {
            Value::Undefined => "Undefined".to_string(),
            Value::Null => "Null".to_string(),
            _ => {
                let obj = realm.to_object(this)?;
                match realm.get(&obj, &PropertyKey::from(Symbol::to_string_tag()))? {
                    Value::String(tag) => tag.to_string(),
                    _ => obj.builtin_tag().to_string(),
                }
            }
        };
        Ok(Value::from(format!("[object {}]", tag)))
    });

    realm.define_method(&proto, "valueOf", 0, |realm, this, _| {
        Ok(Value::Object(realm.to_object(this)?))
    });

    realm.define_method(&proto, "hasOwnProperty", 1, |realm, this, args| {
        let key = realm.to_property_key(&arg(args, 0))?;
        let obj = realm.to_object(this)?;
        Ok(Value::from(obj.has_own_property(&key)?))
    });

    realm.set_global("Object", ctor);
}

fn object_from(realm: &Realm, value: &Value) -> BoxResult<Value> {
    if value.is_nullish() {
        return Ok(Value::Object(realm.new_object()));
    }
    Ok(Value::Object(realm.to_object(value)?))
}
