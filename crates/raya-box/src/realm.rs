//! Realm: intrinsics, globals, and the operations that may run native code
//!
//! Anything that can invoke a getter, a setter or a function goes through
//! the realm, because native functions receive it as their context.

use crate::builtins;
use crate::descriptor::PropertyDescriptor;
use crate::error::{BoxError, BoxResult};
use crate::function::{make_function, CallFn, ConstructFn};
use crate::object::{ObjectRef, MAX_PROTOTYPE_CHAIN_DEPTH};
use crate::value::{PropertyKey, Symbol, Value};
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::rc::Rc;

/// Objects every realm starts with
pub struct Intrinsics {
    /// `Object.prototype`
    pub object_prototype: ObjectRef,
    /// `Function.prototype`
    pub function_prototype: ObjectRef,
    /// `Number.prototype`
    pub number_prototype: ObjectRef,
    /// `String.prototype`
    pub string_prototype: ObjectRef,
    /// `Boolean.prototype`
    pub boolean_prototype: ObjectRef,
}

struct RealmInner {
    intrinsics: Intrinsics,
    globals: RefCell<FxHashMap<Rc<str>, ObjectRef>>,
}

/// A host object model instance
#[derive(Clone)]
pub struct Realm {
    inner: Rc<RealmInner>,
}

impl Realm {
    /// Create a realm with the builtin `Object`, `Number`, `String` and
    /// `Boolean` constructors
    pub fn new() -> Self {
        let object_prototype = ObjectRef::new(None);
        let noop: Rc<CallFn> = Rc::new(|_, _, _| Ok(Value::Undefined));
        let function_prototype = make_function(Some(object_prototype.clone()), "", 0, noop, None);
        let intrinsics = Intrinsics {
            number_prototype: ObjectRef::with_primitive(
                Some(object_prototype.clone()),
                Value::Number(0.0),
            ),
            string_prototype: ObjectRef::with_primitive(
                Some(object_prototype.clone()),
                Value::string(""),
            ),
            boolean_prototype: ObjectRef::with_primitive(
                Some(object_prototype.clone()),
                Value::Boolean(false),
            ),
            object_prototype,
            function_prototype,
        };
        let realm = Realm {
            inner: Rc::new(RealmInner {
                intrinsics,
                globals: RefCell::new(FxHashMap::default()),
            }),
        };
        builtins::install(&realm);
        realm
    }

    /// Intrinsic objects
    pub fn intrinsics(&self) -> &Intrinsics {
        &self.inner.intrinsics
    }

    /// `Object.prototype`
    pub fn object_prototype(&self) -> &ObjectRef {
        &self.inner.intrinsics.object_prototype
    }

    /// `Function.prototype`
    pub fn function_prototype(&self) -> &ObjectRef {
        &self.inner.intrinsics.function_prototype
    }

    // ── Globals ──────────────────────────────────────────────────────

    /// Look up a global binding
    pub fn global(&self, name: &str) -> Option<ObjectRef> {
        self.inner.globals.borrow().get(name).cloned()
    }

    /// Bind a global
    pub fn set_global(&self, name: &str, value: ObjectRef) {
        self.inner.globals.borrow_mut().insert(Rc::from(name), value);
    }

    /// Names of all globals, sorted
    pub fn global_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .inner
            .globals
            .borrow()
            .keys()
            .map(|k| k.to_string())
            .collect();
        names.sort();
        names
    }

    // ── Object creation ──────────────────────────────────────────────

    /// Ordinary object inheriting from `Object.prototype`
    pub fn new_object(&self) -> ObjectRef {
        ObjectRef::new(Some(self.object_prototype().clone()))
    }

    /// Native function (callable, not constructible)
    pub fn function<F>(&self, name: &str, length: u32, call: F) -> ObjectRef
    where
        F: Fn(&Realm, &Value, &[Value]) -> BoxResult<Value> + 'static,
    {
        make_function(
            Some(self.function_prototype().clone()),
            name,
            length,
            Rc::new(call),
            None,
        )
    }

    /// Native constructor linked with `prototype` in both directions
    ///
    /// `ctor.prototype` is frozen; `prototype.constructor` has method shape.
    pub fn constructor<C, K>(
        &self,
        name: &str,
        length: u32,
        prototype: &ObjectRef,
        call: C,
        construct: K,
    ) -> ObjectRef
    where
        C: Fn(&Realm, &Value, &[Value]) -> BoxResult<Value> + 'static,
        K: Fn(&Realm, &[Value], &ObjectRef) -> BoxResult<Value> + 'static,
    {
        let construct: Rc<ConstructFn> = Rc::new(construct);
        let ctor = make_function(
            Some(self.function_prototype().clone()),
            name,
            length,
            Rc::new(call),
            Some(construct),
        );
        link_constructor(&ctor, prototype, false);
        ctor
    }

    /// Define a native method on `target` (writable, configurable, hidden)
    pub fn define_method<F>(
        &self,
        target: &ObjectRef,
        key: impl Into<PropertyKey>,
        length: u32,
        call: F,
    ) -> ObjectRef
    where
        F: Fn(&Realm, &Value, &[Value]) -> BoxResult<Value> + 'static,
    {
        let key = key.into();
        let method = self.function(&key.function_name(), length, call);
        // Builtin setup only: redefinition on a configurable slot never fails
        let _ = target.define_own_property(key, PropertyDescriptor::method(Value::Object(method.clone())));
        method
    }

    // ── Calls ────────────────────────────────────────────────────────

    /// `Call(F, V, args)`
    pub fn call(&self, func: &Value, this: &Value, args: &[Value]) -> BoxResult<Value> {
        let data = func
            .as_object()
            .and_then(ObjectRef::function)
            .ok_or_else(|| BoxError::type_error(format!("{:?} is not a function", func)))?;
        data.call(self, this, args)
    }

    /// `Construct(F, args, newTarget)`
    pub fn construct(
        &self,
        ctor: &ObjectRef,
        args: &[Value],
        new_target: Option<&ObjectRef>,
    ) -> BoxResult<Value> {
        let data = ctor
            .function()
            .ok_or_else(|| BoxError::type_error(format!("{:?} is not a constructor", ctor)))?;
        data.construct(self, args, new_target.unwrap_or(ctor))
    }

    /// `Invoke(V, P, args)`
    pub fn invoke(
        &self,
        receiver: &Value,
        key: impl Into<PropertyKey>,
        args: &[Value],
    ) -> BoxResult<Value> {
        let key = key.into();
        let func = self.get_value(receiver, &key)?;
        if !func.is_callable() {
            return Err(BoxError::type_error(format!(
                "{:?}.{} is not a function",
                receiver, key
            )));
        }
        self.call(&func, receiver, args)
    }

    /// `GetMethod(V, P)`: `None` for `undefined`/`null`
    pub fn get_method(&self, value: &Value, key: &PropertyKey) -> BoxResult<Option<Value>> {
        let func = self.get_value(value, key)?;
        if func.is_nullish() {
            return Ok(None);
        }
        if !func.is_callable() {
            return Err(BoxError::type_error(format!("{:?} is not a function", func)));
        }
        Ok(Some(func))
    }

    // ── Property access ──────────────────────────────────────────────

    /// `[[Get]]` with the object itself as receiver
    pub fn get(&self, obj: &ObjectRef, key: &PropertyKey) -> BoxResult<Value> {
        self.get_with_receiver(obj, key, &Value::Object(obj.clone()))
    }

    /// `GetV`: property read on any value; primitives read through
    /// their wrapper prototype
    pub fn get_value(&self, value: &Value, key: &PropertyKey) -> BoxResult<Value> {
        match value {
            Value::Object(obj) => self.get(obj, key),
            Value::Undefined | Value::Null => Err(BoxError::type_error(format!(
                "Cannot read properties of {:?} (reading '{}')",
                value, key
            ))),
            _ => {
                let proto = self.primitive_prototype(value);
                self.get_with_receiver(&proto, key, value)
            }
        }
    }

    fn get_with_receiver(
        &self,
        obj: &ObjectRef,
        key: &PropertyKey,
        receiver: &Value,
    ) -> BoxResult<Value> {
        let mut cursor = Some(obj.clone());
        let mut depth = 0;
        while let Some(current) = cursor {
            if depth >= MAX_PROTOTYPE_CHAIN_DEPTH {
                return Err(BoxError::range_error("Prototype chain too deep"));
            }
            if let Some(desc) = current.get_own_property(key)? {
                if desc.is_accessor_descriptor() {
                    return match desc.get {
                        Some(getter) if getter.is_callable() => self.call(&getter, receiver, &[]),
                        _ => Ok(Value::Undefined),
                    };
                }
                return Ok(desc.value.unwrap_or_default());
            }
            cursor = current.prototype();
            depth += 1;
        }
        Ok(Value::Undefined)
    }

    /// `[[Set]]`; `Ok(false)` when the assignment is refused
    pub fn set(&self, obj: &ObjectRef, key: PropertyKey, value: Value) -> BoxResult<bool> {
        let mut cursor = Some(obj.clone());
        let mut depth = 0;
        while let Some(current) = cursor {
            if depth >= MAX_PROTOTYPE_CHAIN_DEPTH {
                return Err(BoxError::range_error("Prototype chain too deep"));
            }
            if let Some(desc) = current.get_own_property(&key)? {
                if desc.is_accessor_descriptor() {
                    return match desc.set {
                        Some(setter) if setter.is_callable() => {
                            self.call(&setter, &Value::Object(obj.clone()), &[value])?;
                            Ok(true)
                        }
                        _ => Ok(false),
                    };
                }
                if desc.writable != Some(true) {
                    return Ok(false);
                }
                if current.ptr_eq(obj) {
                    return Ok(obj.write_own_value(&key, value));
                }
                break;
            }
            cursor = current.prototype();
            depth += 1;
        }
        obj.define_own_property(key, PropertyDescriptor::data(value, true, true, true))
    }

    // ── Type relationships ───────────────────────────────────────────

    /// `InstanceofOperator(V, target)`: honors `@@hasInstance`
    pub fn instance_of(&self, value: &Value, target: &Value) -> BoxResult<bool> {
        if !target.is_object() {
            return Err(BoxError::type_error(
                "Right-hand side of 'instanceof' is not an object",
            ));
        }
        let key = PropertyKey::from(Symbol::has_instance());
        if let Some(handler) = self.get_method(target, &key)? {
            let result = self.call(&handler, target, std::slice::from_ref(value))?;
            return Ok(result.to_boolean());
        }
        if !target.is_callable() {
            return Err(BoxError::type_error(
                "Right-hand side of 'instanceof' is not callable",
            ));
        }
        self.ordinary_has_instance(target, value)
    }

    /// `OrdinaryHasInstance(C, O)`: walks the prototype chain of `value`
    pub fn ordinary_has_instance(&self, ctor: &Value, value: &Value) -> BoxResult<bool> {
        let Some(ctor_obj) = ctor.as_object().filter(|c| c.is_callable()) else {
            return Ok(false);
        };
        let Some(obj) = value.as_object() else {
            return Ok(false);
        };
        let proto = self.get(ctor_obj, &PropertyKey::from("prototype"))?;
        let Some(proto) = proto.as_object() else {
            return Err(BoxError::type_error(
                "Function has non-object prototype in instanceof check",
            ));
        };
        let mut cursor = obj.prototype();
        let mut depth = 0;
        while let Some(current) = cursor {
            if current.ptr_eq(proto) {
                return Ok(true);
            }
            if depth >= MAX_PROTOTYPE_CHAIN_DEPTH {
                return Err(BoxError::range_error("Prototype chain too deep"));
            }
            cursor = current.prototype();
            depth += 1;
        }
        Ok(false)
    }

    /// `GetPrototypeFromConstructor`
    pub fn prototype_from_constructor(
        &self,
        new_target: &ObjectRef,
        fallback: &ObjectRef,
    ) -> BoxResult<ObjectRef> {
        let proto = self.get(new_target, &PropertyKey::from("prototype"))?;
        Ok(proto.as_object().cloned().unwrap_or_else(|| fallback.clone()))
    }

    /// `ToObject`
    pub fn to_object(&self, value: &Value) -> BoxResult<ObjectRef> {
        match value {
            Value::Object(obj) => Ok(obj.clone()),
            Value::Undefined | Value::Null => Err(BoxError::type_error(format!(
                "Cannot convert {:?} to object",
                value
            ))),
            _ => Ok(builtins::wrap_primitive(value, self.primitive_prototype(value))),
        }
    }

    fn primitive_prototype(&self, value: &Value) -> ObjectRef {
        let intrinsics = self.intrinsics();
        match value {
            Value::Number(_) => intrinsics.number_prototype.clone(),
            Value::String(_) => intrinsics.string_prototype.clone(),
            Value::Boolean(_) => intrinsics.boolean_prototype.clone(),
            _ => intrinsics.object_prototype.clone(),
        }
    }
}

impl Default for Realm {
    fn default() -> Self {
        Self::new()
    }
}

/// Link `ctor.prototype` and `prototype.constructor`
pub(crate) fn link_constructor(ctor: &ObjectRef, prototype: &ObjectRef, writable_prototype: bool) {
    // Both objects are fresh or builtin-owned: no conflicting definitions
    let _ = ctor.define_own_property(
        PropertyKey::from("prototype"),
        PropertyDescriptor::data(Value::Object(prototype.clone()), writable_prototype, false, false),
    );
    let _ = prototype.define_own_property(
        PropertyKey::from("constructor"),
        PropertyDescriptor::method(Value::Object(ctor.clone())),
    );
}
