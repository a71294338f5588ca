//! Object model: shared object handles and own-property operations
//!
//! Objects are reference-counted handles to interior-mutable data. Every
//! object has a nullable prototype link, an extensible flag, insertion
//! ordered own properties, and a few internal slots:
//!
//! - a primitive data slot for wrapper objects (`new Number(1)`)
//! - function behavior for callable objects
//! - private slots keyed by a [`BrandKey`], invisible to key enumeration
//! - optional [`ExoticHooks`] overriding own-key enumeration and own
//!   descriptor lookup (proxy-like objects)

use crate::brand::BrandKey;
use crate::descriptor::{Property, PropertyDescriptor, PropertySlot};
use crate::error::{BoxError, BoxResult};
use crate::function::FunctionData;
use crate::value::{PropertyKey, Value};
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// Maximum prototype chain depth walked before giving up
pub(crate) const MAX_PROTOTYPE_CHAIN_DEPTH: usize = 1024;

/// Overrides for the introspection operations of exotic objects
///
/// Both hooks may fail; callers propagate those failures unchanged.
pub trait ExoticHooks {
    /// `[[OwnPropertyKeys]]`
    fn own_property_keys(&self, target: &ObjectRef) -> BoxResult<Vec<PropertyKey>> {
        Ok(target.ordinary_own_property_keys())
    }

    /// `[[GetOwnProperty]]`
    fn get_own_property(
        &self,
        target: &ObjectRef,
        key: &PropertyKey,
    ) -> BoxResult<Option<PropertyDescriptor>> {
        Ok(target.ordinary_get_own_property(key))
    }
}

/// Object storage
pub(crate) struct ObjectData {
    prototype: Option<ObjectRef>,
    extensible: bool,
    properties: FxHashMap<PropertyKey, Property>,
    /// Insertion order of `properties`
    order: Vec<PropertyKey>,
    primitive: Option<Value>,
    function: Option<Rc<FunctionData>>,
    private: Vec<(BrandKey, Value)>,
    exotic: Option<Rc<dyn ExoticHooks>>,
}

impl ObjectData {
    fn new(prototype: Option<ObjectRef>) -> Self {
        Self {
            prototype,
            extensible: true,
            properties: FxHashMap::default(),
            order: Vec::new(),
            primitive: None,
            function: None,
            private: Vec::new(),
            exotic: None,
        }
    }

    fn insert(&mut self, key: PropertyKey, prop: Property) {
        if self.properties.insert(key.clone(), prop).is_none() {
            self.order.push(key);
        }
    }
}

/// Shared handle to an object
#[derive(Clone)]
pub struct ObjectRef(Rc<RefCell<ObjectData>>);

/// Non-owning handle to an object
#[derive(Clone)]
pub struct WeakObjectRef(Weak<RefCell<ObjectData>>);

impl WeakObjectRef {
    /// Upgrade to a strong handle if the object is still alive
    pub fn upgrade(&self) -> Option<ObjectRef> {
        self.0.upgrade().map(ObjectRef)
    }
}

impl ObjectRef {
    /// Create an ordinary object with the given prototype
    pub fn new(prototype: Option<ObjectRef>) -> Self {
        Self::from_data(ObjectData::new(prototype))
    }

    /// Create a wrapper object carrying a primitive
    pub fn with_primitive(prototype: Option<ObjectRef>, primitive: Value) -> Self {
        let mut data = ObjectData::new(prototype);
        data.primitive = Some(primitive);
        Self::from_data(data)
    }

    /// Create an exotic object whose introspection goes through `hooks`
    pub fn with_exotic(prototype: Option<ObjectRef>, hooks: Rc<dyn ExoticHooks>) -> Self {
        let mut data = ObjectData::new(prototype);
        data.exotic = Some(hooks);
        Self::from_data(data)
    }

    pub(crate) fn with_function(prototype: Option<ObjectRef>, function: FunctionData) -> Self {
        let mut data = ObjectData::new(prototype);
        data.function = Some(Rc::new(function));
        Self::from_data(data)
    }

    fn from_data(data: ObjectData) -> Self {
        ObjectRef(Rc::new(RefCell::new(data)))
    }

    /// Identity comparison
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Create a non-owning handle
    pub fn downgrade(&self) -> WeakObjectRef {
        WeakObjectRef(Rc::downgrade(&self.0))
    }

    // ── Internal slots ───────────────────────────────────────────────

    /// Has `[[Call]]`
    pub fn is_callable(&self) -> bool {
        self.0.borrow().function.is_some()
    }

    /// Has `[[Construct]]`
    pub fn is_constructor(&self) -> bool {
        self.0
            .borrow()
            .function
            .as_ref()
            .is_some_and(|f| f.is_constructor())
    }

    pub(crate) fn function(&self) -> Option<Rc<FunctionData>> {
        self.0.borrow().function.clone()
    }

    /// Primitive carried by a wrapper object
    pub fn primitive(&self) -> Option<Value> {
        self.0.borrow().primitive.clone()
    }

    /// Tag used by `Object.prototype.toString` when no `@@toStringTag` is set
    pub fn builtin_tag(&self) -> &'static str {
        let data = self.0.borrow();
        if data.function.is_some() {
            return "Function";
        }
        match data.primitive {
            Some(Value::Number(_)) => "Number",
            Some(Value::String(_)) => "String",
            Some(Value::Boolean(_)) => "Boolean",
            _ => "Object",
        }
    }

    // ── Prototype and extensibility ──────────────────────────────────

    /// `[[GetPrototypeOf]]`
    pub fn prototype(&self) -> Option<ObjectRef> {
        self.0.borrow().prototype.clone()
    }

    /// `[[SetPrototypeOf]]`; `false` on cycles or non-extensible objects
    pub fn set_prototype_of(&self, proto: Option<ObjectRef>) -> bool {
        let current = self.prototype();
        let unchanged = match (&current, &proto) {
            (Some(a), Some(b)) => a.ptr_eq(b),
            (None, None) => true,
            _ => false,
        };
        if unchanged {
            return true;
        }
        if !self.is_extensible() {
            return false;
        }
        let mut cursor = proto.clone();
        let mut depth = 0;
        while let Some(p) = cursor {
            if p.ptr_eq(self) || depth >= MAX_PROTOTYPE_CHAIN_DEPTH {
                return false;
            }
            cursor = p.prototype();
            depth += 1;
        }
        self.0.borrow_mut().prototype = proto;
        true
    }

    /// `[[IsExtensible]]`
    pub fn is_extensible(&self) -> bool {
        self.0.borrow().extensible
    }

    /// `[[PreventExtensions]]`
    pub fn prevent_extensions(&self) {
        self.0.borrow_mut().extensible = false;
    }

    /// Make every own property non-configurable, data properties
    /// non-writable, and the object non-extensible
    pub fn freeze(&self) {
        let mut data = self.0.borrow_mut();
        data.extensible = false;
        for prop in data.properties.values_mut() {
            prop.configurable = false;
            if let PropertySlot::Data { writable, .. } = &mut prop.slot {
                *writable = false;
            }
        }
    }

    /// Whether the object is frozen
    pub fn is_frozen(&self) -> bool {
        let data = self.0.borrow();
        !data.extensible
            && data.properties.values().all(|p| {
                !p.configurable && !matches!(p.slot, PropertySlot::Data { writable: true, .. })
            })
    }

    // ── Own properties ───────────────────────────────────────────────

    fn exotic(&self) -> Option<Rc<dyn ExoticHooks>> {
        self.0.borrow().exotic.clone()
    }

    /// `[[GetOwnProperty]]`
    pub fn get_own_property(&self, key: &PropertyKey) -> BoxResult<Option<PropertyDescriptor>> {
        match self.exotic() {
            Some(hooks) => hooks.get_own_property(self, key),
            None => Ok(self.ordinary_get_own_property(key)),
        }
    }

    /// Own descriptor lookup ignoring exotic hooks
    pub fn ordinary_get_own_property(&self, key: &PropertyKey) -> Option<PropertyDescriptor> {
        self.0
            .borrow()
            .properties
            .get(key)
            .map(Property::to_descriptor)
    }

    /// `[[OwnPropertyKeys]]`
    pub fn own_property_keys(&self) -> BoxResult<Vec<PropertyKey>> {
        match self.exotic() {
            Some(hooks) => hooks.own_property_keys(self),
            None => Ok(self.ordinary_own_property_keys()),
        }
    }

    /// Own keys in canonical order: integer indices ascending, then
    /// strings in insertion order, then symbols in insertion order
    pub fn ordinary_own_property_keys(&self) -> Vec<PropertyKey> {
        let data = self.0.borrow();
        let mut indices: Vec<(u32, PropertyKey)> = Vec::new();
        let mut strings = Vec::new();
        let mut symbols = Vec::new();
        for key in &data.order {
            if let Some(idx) = key.array_index() {
                indices.push((idx, key.clone()));
            } else if key.is_symbol() {
                symbols.push(key.clone());
            } else {
                strings.push(key.clone());
            }
        }
        indices.sort_by_key(|(idx, _)| *idx);
        let mut keys: Vec<PropertyKey> = indices.into_iter().map(|(_, k)| k).collect();
        keys.extend(strings);
        keys.extend(symbols);
        keys
    }

    /// `HasOwnProperty`
    pub fn has_own_property(&self, key: &PropertyKey) -> BoxResult<bool> {
        Ok(self.get_own_property(key)?.is_some())
    }

    /// `[[DefineOwnProperty]]`
    ///
    /// Returns `Ok(false)` when the definition is rejected (conflict with a
    /// non-configurable property, or a new key on a non-extensible object)
    /// and `Err` for malformed descriptors.
    pub fn define_own_property(&self, key: PropertyKey, desc: PropertyDescriptor) -> BoxResult<bool> {
        desc.validate()?;
        let mut data = self.0.borrow_mut();
        let extensible = data.extensible;
        let next = validate_and_apply(data.properties.get(&key), extensible, &desc);
        match next {
            Some(prop) => {
                data.insert(key, prop);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// `DefinePropertyOrThrow`
    pub fn define_property_or_throw(&self, key: PropertyKey, desc: PropertyDescriptor) -> BoxResult<()> {
        let existed = self.0.borrow().properties.contains_key(&key);
        if self.define_own_property(key.clone(), desc)? {
            return Ok(());
        }
        if existed {
            Err(BoxError::type_error(format!("Cannot redefine property: {}", key)))
        } else {
            Err(BoxError::type_error(format!(
                "Cannot define property {}, object is not extensible",
                key
            )))
        }
    }

    /// `[[Delete]]`; `false` for non-configurable properties
    pub fn delete(&self, key: &PropertyKey) -> bool {
        let mut data = self.0.borrow_mut();
        match data.properties.get(key) {
            None => true,
            Some(prop) if !prop.configurable => false,
            Some(_) => {
                data.properties.remove(key);
                data.order.retain(|k| k != key);
                true
            }
        }
    }

    /// Replace the value of a writable own data property; `false` if the
    /// property is missing, an accessor, or read-only
    pub(crate) fn write_own_value(&self, key: &PropertyKey, value: Value) -> bool {
        let mut data = self.0.borrow_mut();
        match data.properties.get_mut(key) {
            Some(Property {
                slot: PropertySlot::Data { value: slot, writable: true },
                ..
            }) => {
                *slot = value;
                true
            }
            _ => false,
        }
    }

    // ── Private slots ────────────────────────────────────────────────

    /// Whether the object directly carries the private slot for `brand`
    pub(crate) fn has_private(&self, brand: BrandKey) -> bool {
        self.0.borrow().private.iter().any(|(b, _)| *b == brand)
    }

    /// Read the private slot for `brand`
    pub(crate) fn private_get(&self, brand: BrandKey) -> Option<Value> {
        self.0
            .borrow()
            .private
            .iter()
            .find(|(b, _)| *b == brand)
            .map(|(_, v)| v.clone())
    }

    /// Initialize the private slot for `brand`; each slot is written once
    pub(crate) fn private_init(&self, brand: BrandKey, value: Value) -> BoxResult<()> {
        let mut data = self.0.borrow_mut();
        if data.private.iter().any(|(b, _)| *b == brand) {
            return Err(BoxError::type_error(
                "Cannot initialize private data twice on the same object",
            ));
        }
        data.private.push((brand, value));
        Ok(())
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.function() {
            Some(func) => write!(f, "[Function: {}]", func.name()),
            None => write!(f, "[object {}]", self.builtin_tag()),
        }
    }
}

/// ValidateAndApplyPropertyDescriptor
///
/// Returns the property to store, or `None` when the change is rejected.
fn validate_and_apply(
    current: Option<&Property>,
    extensible: bool,
    desc: &PropertyDescriptor,
) -> Option<Property> {
    let Some(current) = current else {
        return extensible.then(|| Property::from_descriptor(desc));
    };

    if desc.is_empty() {
        return Some(current.clone());
    }

    if !current.configurable {
        if desc.configurable == Some(true) {
            return None;
        }
        if desc.enumerable.is_some_and(|e| e != current.enumerable) {
            return None;
        }
        if !desc.is_generic_descriptor() && desc.is_accessor_descriptor() != current.is_accessor() {
            return None;
        }
        match &current.slot {
            PropertySlot::Accessor { get, set } => {
                if let Some(new_get) = &desc.get {
                    if !same_accessor(get, new_get) {
                        return None;
                    }
                }
                if let Some(new_set) = &desc.set {
                    if !same_accessor(set, new_set) {
                        return None;
                    }
                }
            }
            PropertySlot::Data { value, writable } => {
                if !*writable {
                    if desc.writable == Some(true) {
                        return None;
                    }
                    if desc.value.as_ref().is_some_and(|v| !v.same_value(value)) {
                        return None;
                    }
                }
            }
        }
    }

    let mut next = current.clone();
    if desc.is_accessor_descriptor() && !current.is_accessor() {
        next.slot = PropertySlot::Accessor { get: None, set: None };
    } else if desc.is_data_descriptor() && current.is_accessor() {
        next.slot = PropertySlot::Data {
            value: Value::Undefined,
            writable: false,
        };
    }
    match &mut next.slot {
        PropertySlot::Data { value, writable } => {
            if let Some(v) = &desc.value {
                *value = v.clone();
            }
            if let Some(w) = desc.writable {
                *writable = w;
            }
        }
        PropertySlot::Accessor { get, set } => {
            if let Some(g) = &desc.get {
                *get = g.as_object().cloned();
            }
            if let Some(s) = &desc.set {
                *set = s.as_object().cloned();
            }
        }
    }
    if let Some(e) = desc.enumerable {
        next.enumerable = e;
    }
    if let Some(c) = desc.configurable {
        next.configurable = c;
    }
    Some(next)
}

fn same_accessor(current: &Option<ObjectRef>, proposed: &Value) -> bool {
    match (current, proposed.as_object()) {
        (Some(a), Some(b)) => a.ptr_eq(b),
        (None, None) => proposed.is_undefined(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Symbol;

    fn key(s: &str) -> PropertyKey {
        PropertyKey::from(s)
    }

    #[test]
    fn test_define_and_read_back() {
        let obj = ObjectRef::new(None);
        obj.define_property_or_throw(key("x"), PropertyDescriptor::data(Value::from(1), true, true, true))
            .unwrap();
        let desc = obj.get_own_property(&key("x")).unwrap().unwrap();
        assert_eq!(desc.value, Some(Value::from(1)));
        assert_eq!(desc.writable, Some(true));
        assert!(obj.has_own_property(&key("x")).unwrap());
    }

    #[test]
    fn test_own_key_order() {
        let obj = ObjectRef::new(None);
        let sym = Symbol::new(Some("s"));
        for k in [key("b"), PropertyKey::from(sym.clone()), key("2"), key("a"), key("0")] {
            obj.define_own_property(k, PropertyDescriptor::data(Value::Null, true, true, true))
                .unwrap();
        }
        let keys = obj.own_property_keys().unwrap();
        assert_eq!(
            keys,
            vec![key("0"), key("2"), key("b"), key("a"), PropertyKey::from(sym)]
        );
    }

    #[test]
    fn test_non_configurable_rejects_redefinition() {
        let obj = ObjectRef::new(None);
        obj.define_own_property(key("k"), PropertyDescriptor::frozen(Value::from(1)))
            .unwrap();

        assert!(!obj
            .define_own_property(key("k"), PropertyDescriptor::frozen(Value::from(2)))
            .unwrap());
        assert!(obj
            .define_own_property(key("k"), PropertyDescriptor::frozen(Value::from(1)))
            .unwrap());

        let err = obj
            .define_property_or_throw(key("k"), PropertyDescriptor::method(Value::from(1)))
            .unwrap_err();
        assert_eq!(err.message(), "Cannot redefine property: k");
        assert!(!obj.delete(&key("k")));
    }

    #[test]
    fn test_non_extensible_rejects_new_keys() {
        let obj = ObjectRef::new(None);
        obj.prevent_extensions();
        let err = obj
            .define_property_or_throw(key("x"), PropertyDescriptor::method(Value::Null))
            .unwrap_err();
        assert!(err.message().contains("not extensible"));
    }

    #[test]
    fn test_configurable_data_to_accessor() {
        let obj = ObjectRef::new(None);
        obj.define_own_property(key("p"), PropertyDescriptor::data(Value::from(1), true, true, true))
            .unwrap();
        obj.define_own_property(key("p"), PropertyDescriptor::accessor(None, None, false, true))
            .unwrap();
        let desc = obj.get_own_property(&key("p")).unwrap().unwrap();
        assert!(desc.is_accessor_descriptor());
        assert_eq!(desc.enumerable, Some(false));
    }

    #[test]
    fn test_prototype_cycle_is_rejected() {
        let a = ObjectRef::new(None);
        let b = ObjectRef::new(Some(a.clone()));
        assert!(!a.set_prototype_of(Some(b.clone())));
        assert!(a.prototype().is_none());
        assert!(b.set_prototype_of(None));
    }

    #[test]
    fn test_freeze() {
        let obj = ObjectRef::new(None);
        obj.define_own_property(key("v"), PropertyDescriptor::data(Value::from(1), true, true, true))
            .unwrap();
        obj.freeze();
        assert!(obj.is_frozen());
        assert!(!obj.write_own_value(&key("v"), Value::from(2)));
        assert!(!obj.set_prototype_of(Some(ObjectRef::new(None))));
    }

    #[test]
    fn test_private_slots_are_write_once_and_hidden() {
        let obj = ObjectRef::new(None);
        let brand = BrandKey::fresh();
        obj.private_init(brand, Value::from(5)).unwrap();
        assert!(obj.private_init(brand, Value::from(6)).is_err());
        assert_eq!(obj.private_get(brand), Some(Value::from(5)));
        assert!(obj.own_property_keys().unwrap().is_empty());
        assert!(!obj.has_private(BrandKey::fresh()));
    }

    struct FailingHooks;

    impl ExoticHooks for FailingHooks {
        fn own_property_keys(&self, _target: &ObjectRef) -> BoxResult<Vec<PropertyKey>> {
            Err(BoxError::type_error("ownKeys trap failed"))
        }
    }

    #[test]
    fn test_exotic_hooks_override_introspection() {
        let obj = ObjectRef::with_exotic(None, Rc::new(FailingHooks));
        obj.define_own_property(key("x"), PropertyDescriptor::method(Value::Null))
            .unwrap();
        assert!(obj.own_property_keys().is_err());
        assert!(obj.get_own_property(&key("x")).unwrap().is_some());
    }
}
