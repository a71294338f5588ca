//! `Function.prototype`

use super::arg;
use crate::descriptor::PropertyDescriptor;
use crate::realm::Realm;
use crate::value::{PropertyKey, Symbol, Value};

pub(super) fn install(realm: &Realm) {
    let proto = realm.function_prototype().clone();
    let has_instance = realm.function("[Symbol.hasInstance]", 1, |realm, this, args| {
        Ok(Value::from(realm.ordinary_has_instance(this, &arg(args, 0))?))
    });
    // Fresh key on a builtin: cannot conflict
    let _ = proto.define_own_property(
        PropertyKey::from(Symbol::has_instance()),
        PropertyDescriptor::frozen(Value::Object(has_instance)),
    );
}
