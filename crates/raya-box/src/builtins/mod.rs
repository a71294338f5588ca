//! Builtin constructors and prototypes installed into every realm
//!
//! - `Object` and `Object.prototype`
//! - `Function.prototype` (`@@hasInstance`)
//! - `Number`, `String`, `Boolean` with their wrapper prototypes

mod boolean;
mod function;
mod number;
mod object;
mod string;

pub use number::parse_float;

use crate::descriptor::PropertyDescriptor;
use crate::object::ObjectRef;
use crate::realm::Realm;
use crate::value::{PropertyKey, Value};

/// Install all builtins into a freshly created realm
pub(crate) fn install(realm: &Realm) {
    object::install(realm);
    function::install(realm);
    number::install(realm);
    string::install(realm);
    boolean::install(realm);
}

/// Argument at `index`, or `undefined`
pub(crate) fn arg(args: &[Value], index: usize) -> Value {
    args.get(index).cloned().unwrap_or_default()
}

/// Wrapper object for a primitive with the given prototype
pub(crate) fn wrap_primitive(value: &Value, prototype: ObjectRef) -> ObjectRef {
    let wrapper = ObjectRef::with_primitive(Some(prototype), value.clone());
    if let Value::String(s) = value {
        string::define_length(&wrapper, s);
    }
    wrapper
}

/// Define a frozen data property (builtin constants)
fn define_constant(target: &ObjectRef, key: &str, value: Value) {
    // Builtin setup on fresh objects: cannot conflict
    let _ = target.define_own_property(PropertyKey::from(key), PropertyDescriptor::frozen(value));
}
