//! Boxing factory: synthesize boxed types from blueprints
//!
//! Every synthesized type owns a fresh [`BrandKey`]. Instances carry their
//! datum in the private slot for that brand, so membership, unboxing and
//! every default or delegated method check the slot itself and never the
//! prototype chain.
//!
//! Synthesis order:
//!
//! 1. prototype entries from the blueprint (guarded)
//! 2. `constructor` / `prototype` links and the constructor's own prototype
//! 3. delegating methods for the wrapped native type (guarded)
//! 4. default `valueOf`, `toString` and `@@toPrimitive` (guarded)
//! 5. the brand-based `@@hasInstance`
//! 6. static entries (guarded)
//!
//! Guarded steps never abort synthesis: failures are reported and recorded
//! in the install log, and the type is returned without the failed member.

use crate::blueprint::Blueprint;
use crate::brand::{assert_brand, has_brand, BrandKey};
use crate::config::{BoxConfig, ConfigError};
use crate::descriptor::PropertyDescriptor;
use crate::error::{BoxError, BoxResult};
use crate::function::{make_function, CallFn, ConstructFn};
use crate::guard::{contain, ConsoleReporter, Report, ReportStyle, Reporter};
use crate::object::{ObjectRef, WeakObjectRef};
use crate::realm::Realm;
use crate::value::{PropertyKey, Symbol, Value};
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

/// Object an entry was installed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallTarget {
    /// The boxed prototype
    Prototype,
    /// The boxed constructor
    Constructor,
}

/// Why an entry was not installed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Static entries keyed `prototype` are never copied
    PrototypeKey,
    /// Explicitly non-configurable static entry
    NonConfigurable,
    /// The blueprint already supplies this key
    Overridden,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::PrototypeKey => f.write_str("reserved key"),
            SkipReason::NonConfigurable => f.write_str("non-configurable"),
            SkipReason::Overridden => f.write_str("overridden by blueprint"),
        }
    }
}

/// Result of one attempted installation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// Defined successfully
    Installed,
    /// Deliberately left out
    Skipped(SkipReason),
    /// Definition failed; the failure was reported
    Failed(Report),
}

/// One entry of a boxed type's install log
#[derive(Debug, Clone)]
pub struct InstallRecord {
    /// Where the entry was installed
    pub target: InstallTarget,
    /// Property key
    pub key: PropertyKey,
    /// What happened
    pub outcome: InstallOutcome,
}

/// State shared by the constructor's call and construct behaviors
struct Synthesis {
    name: Rc<str>,
    brand: BrandKey,
    coerce: Option<ObjectRef>,
    literal: Option<ObjectRef>,
    auto_box_literals: bool,
    prototype: WeakObjectRef,
}

impl Synthesis {
    fn prototype(&self) -> BoxResult<ObjectRef> {
        self.prototype
            .upgrade()
            .ok_or_else(|| BoxError::type_error(format!("{}.prototype is no longer alive", self.name)))
    }

    fn coerce(&self, realm: &Realm, input: &Value) -> BoxResult<Value> {
        match &self.coerce {
            Some(func) => realm.call(
                &Value::Object(func.clone()),
                &Value::Undefined,
                std::slice::from_ref(input),
            ),
            None => Ok(input.clone()),
        }
    }

    fn instantiate(&self, realm: &Realm, prototype: ObjectRef, input: &Value) -> BoxResult<Value> {
        let data = self.coerce(realm, input)?;
        let instance = ObjectRef::new(Some(prototype));
        instance.private_init(self.brand, data)?;
        Ok(Value::Object(instance))
    }

    /// `new T(x)`
    fn construct(&self, realm: &Realm, args: &[Value], new_target: &ObjectRef) -> BoxResult<Value> {
        let input = args.first().cloned().unwrap_or_default();
        let fallback = self.prototype()?;
        let prototype = realm.prototype_from_constructor(new_target, &fallback)?;
        self.instantiate(realm, prototype, &input)
    }

    /// `T(x)`
    fn call(&self, realm: &Realm, args: &[Value]) -> BoxResult<Value> {
        let input = args.first().cloned().unwrap_or_default();
        let prototype = self.prototype()?;
        if self.auto_box_literals {
            return self.instantiate(realm, prototype, &input);
        }

        let literal = match &self.literal {
            Some(func) => realm.call(
                &Value::Object(func.clone()),
                &Value::Undefined,
                std::slice::from_ref(&input),
            )?,
            None => input.clone(),
        };
        let obj = match literal {
            Value::Object(obj) => obj,
            nullish @ (Value::Undefined | Value::Null) => {
                return Err(BoxError::type_error(format!(
                    "Cannot attach {:?} to {}: literal is not an object",
                    nullish, self.name
                )));
            }
            primitive => return Ok(primitive),
        };
        // The literal is left untouched when coercion fails
        let data = self.coerce(realm, &input)?;
        if !obj.is_extensible() || !obj.set_prototype_of(Some(prototype)) {
            return Err(BoxError::type_error(format!(
                "Cannot attach {:?} to {}: object is not extensible",
                obj, self.name
            )));
        }
        obj.private_init(self.brand, data)?;
        Ok(Value::Object(obj))
    }
}

/// A synthesized boxed type
pub struct BoxedType {
    realm: Realm,
    name: Rc<str>,
    brand: BrandKey,
    constructor: ObjectRef,
    prototype: ObjectRef,
    install_log: Vec<InstallRecord>,
}

impl BoxedType {
    /// Type name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The constructor function object
    pub fn constructor(&self) -> &ObjectRef {
        &self.constructor
    }

    /// The boxed prototype
    pub fn prototype(&self) -> &ObjectRef {
        &self.prototype
    }

    /// `new T(value)`
    pub fn construct(&self, value: Value) -> BoxResult<Value> {
        self.realm.construct(&self.constructor, &[value], None)
    }

    /// `T(value)`
    pub fn call(&self, value: Value) -> BoxResult<Value> {
        self.realm.call(
            &Value::Object(self.constructor.clone()),
            &Value::Undefined,
            &[value],
        )
    }

    /// Brand membership: `value` directly owns this type's datum
    pub fn is_instance(&self, value: &Value) -> bool {
        has_brand(value, self.brand)
    }

    /// Read the datum of a branded value
    pub fn unbox(&self, value: &Value) -> BoxResult<Value> {
        assert_brand(value, self.brand, &self.name, "valueOf")
    }

    /// Every attempted installation, in order
    pub fn install_log(&self) -> &[InstallRecord] {
        &self.install_log
    }

    /// Installations that failed
    pub fn failures(&self) -> impl Iterator<Item = &InstallRecord> {
        self.install_log
            .iter()
            .filter(|r| matches!(r.outcome, InstallOutcome::Failed(_)))
    }
}

impl fmt::Debug for BoxedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoxedType")
            .field("name", &self.name)
            .field("brand", &self.brand)
            .field("installed", &self.install_log.len())
            .finish()
    }
}

/// Synthesizes boxed types in one realm
pub struct BoxFactory {
    realm: Realm,
    reporter: Arc<dyn Reporter>,
    style: ReportStyle,
    auto_box_literals: bool,
}

impl BoxFactory {
    /// Factory reporting to stderr, with literal auto-boxing enabled
    pub fn new(realm: &Realm) -> Self {
        Self {
            realm: realm.clone(),
            reporter: Arc::new(ConsoleReporter::default()),
            style: ReportStyle::default(),
            auto_box_literals: true,
        }
    }

    /// Factory configured from a [`BoxConfig`]
    pub fn from_config(realm: &Realm, config: &BoxConfig) -> Result<Self, ConfigError> {
        let style = config.report.style()?;
        Ok(Self::new(realm)
            .with_reporter(Arc::new(ConsoleReporter::new(config.report.color_choice())))
            .with_style(style)
            .auto_box_literals(config.factory.auto_box_literals))
    }

    /// Send installation failures to `reporter`
    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Style passed along with every report
    pub fn with_style(mut self, style: ReportStyle) -> Self {
        self.style = style;
        self
    }

    /// Whether bare calls box their input
    pub fn auto_box_literals(mut self, enabled: bool) -> Self {
        self.auto_box_literals = enabled;
        self
    }

    /// The realm types are created in
    pub fn realm(&self) -> &Realm {
        &self.realm
    }

    /// Synthesize a boxed type; the blueprint is only read
    pub fn create(&self, blueprint: &Blueprint) -> BoxResult<BoxedType> {
        let realm = &self.realm;
        let name: Rc<str> = Rc::from(blueprint.name.as_str());
        let brand = BrandKey::fresh();
        let prototype = ObjectRef::new(blueprint.proto_proto.resolve(realm.object_prototype()));

        let state = Rc::new(Synthesis {
            name: name.clone(),
            brand,
            coerce: blueprint.coerce.clone(),
            literal: blueprint.literal.clone(),
            auto_box_literals: self.auto_box_literals,
            prototype: prototype.downgrade(),
        });
        let call_state = state.clone();
        let call: Rc<CallFn> = Rc::new(move |realm: &Realm, _this: &Value, args: &[Value]| {
            call_state.call(realm, args)
        });
        let construct: Rc<ConstructFn> =
            Rc::new(move |realm: &Realm, args: &[Value], new_target: &ObjectRef| {
                state.construct(realm, args, new_target)
            });
        let constructor = make_function(
            Some(realm.function_prototype().clone()),
            &name,
            1,
            call,
            Some(construct),
        );

        let mut log = Vec::new();

        for (key, desc) in blueprint.proto.iter() {
            let outcome = self.install(&prototype, key, desc.clone(), &prototype_site(&name, key));
            log.push(InstallRecord {
                target: InstallTarget::Prototype,
                key: key.clone(),
                outcome,
            });
        }

        let constructor_key = PropertyKey::from("constructor");
        let outcome = self.install(
            &prototype,
            &constructor_key,
            PropertyDescriptor::method(Value::Object(constructor.clone())),
            &prototype_site(&name, &constructor_key),
        );
        log.push(InstallRecord {
            target: InstallTarget::Prototype,
            key: constructor_key,
            outcome,
        });
        constructor.define_property_or_throw(
            PropertyKey::from("prototype"),
            PropertyDescriptor::data(Value::Object(prototype.clone()), true, false, false),
        )?;
        let constructor_proto = blueprint.constructor_proto.resolve(realm.function_prototype());
        if !constructor.set_prototype_of(constructor_proto) {
            return Err(BoxError::type_error(format!(
                "Cannot set the prototype of {}",
                name
            )));
        }

        if let Some(native) = &blueprint.wrap_built_ins {
            self.install_delegates(&mut log, &prototype, native, &name, brand, blueprint.unwrap_this)?;
        }

        for (key, method) in default_methods(realm, &name, brand) {
            let outcome = if blueprint.proto.contains_key(&key) || prototype.ordinary_get_own_property(&key).is_some() {
                InstallOutcome::Skipped(SkipReason::Overridden)
            } else {
                let site = prototype_site(&name, &key);
                self.install(&prototype, &key, PropertyDescriptor::method(Value::Object(method)), &site)
            };
            log.push(InstallRecord {
                target: InstallTarget::Prototype,
                key,
                outcome,
            });
        }

        let has_instance = realm.function("[Symbol.hasInstance]", 1, move |_, _, args| {
            let candidate = args.first().cloned().unwrap_or_default();
            Ok(Value::from(has_brand(&candidate, brand)))
        });
        constructor.define_property_or_throw(
            PropertyKey::from(Symbol::has_instance()),
            PropertyDescriptor::frozen(Value::Object(has_instance)),
        )?;

        for (key, desc) in blueprint.statics.iter() {
            let outcome = if key.as_str() == Some("prototype") {
                InstallOutcome::Skipped(SkipReason::PrototypeKey)
            } else if desc.is_explicitly_non_configurable() {
                InstallOutcome::Skipped(SkipReason::NonConfigurable)
            } else {
                let site = format!("{}.{}", name, key.function_name());
                self.install(&constructor, key, desc.clone(), &site)
            };
            log.push(InstallRecord {
                target: InstallTarget::Constructor,
                key: key.clone(),
                outcome,
            });
        }

        Ok(BoxedType {
            realm: realm.clone(),
            name,
            brand,
            constructor,
            prototype,
            install_log: log,
        })
    }

    /// Define one entry under guarded invocation
    fn install(
        &self,
        target: &ObjectRef,
        key: &PropertyKey,
        desc: PropertyDescriptor,
        site: &str,
    ) -> InstallOutcome {
        match contain(&*self.reporter, &self.style, site, || {
            target.define_property_or_throw(key.clone(), desc)
        }) {
            Ok(()) => InstallOutcome::Installed,
            Err(report) => InstallOutcome::Failed(report),
        }
    }

    /// Install brand-checked wrappers for the native prototype's methods
    ///
    /// An existing entry holding the very function being wrapped counts as
    /// inherited and is replaced; any other existing entry wins.
    fn install_delegates(
        &self,
        log: &mut Vec<InstallRecord>,
        prototype: &ObjectRef,
        native: &ObjectRef,
        name: &Rc<str>,
        brand: BrandKey,
        unwrap_this: bool,
    ) -> BoxResult<()> {
        let realm = &self.realm;
        let Value::Object(source) = realm.get(native, &PropertyKey::from("prototype"))? else {
            return Ok(());
        };
        for key in source.own_property_keys()? {
            if key.as_str() == Some("constructor") {
                continue;
            }
            let Some(desc) = source.get_own_property(&key)? else {
                continue;
            };
            let Some(original) = desc.function_value().cloned() else {
                continue;
            };
            if let Some(current) = prototype.ordinary_get_own_property(&key) {
                let inherited = current
                    .function_value()
                    .is_some_and(|func| func.ptr_eq(&original));
                if !inherited {
                    log.push(InstallRecord {
                        target: InstallTarget::Prototype,
                        key,
                        outcome: InstallOutcome::Skipped(SkipReason::Overridden),
                    });
                    continue;
                }
            }
            let method = delegate(realm, name, brand, &key, original, unwrap_this);
            let site = prototype_site(name, &key);
            let outcome = self.install(prototype, &key, PropertyDescriptor::method(Value::Object(method)), &site);
            log.push(InstallRecord {
                target: InstallTarget::Prototype,
                key,
                outcome,
            });
        }
        Ok(())
    }
}

/// Synthesize a boxed type with a default [`BoxFactory`]
pub fn create_boxed_type(
    realm: &Realm,
    blueprint: &Blueprint,
    auto_box_literals: bool,
) -> BoxResult<BoxedType> {
    BoxFactory::new(realm)
        .auto_box_literals(auto_box_literals)
        .create(blueprint)
}

fn prototype_site(name: &str, key: &PropertyKey) -> String {
    format!("{}.prototype.{}", name, key.function_name())
}

/// Brand-checked wrapper around a native prototype method
fn delegate(
    realm: &Realm,
    type_name: &Rc<str>,
    brand: BrandKey,
    key: &PropertyKey,
    original: ObjectRef,
    unwrap_this: bool,
) -> ObjectRef {
    let method = key.function_name();
    let length = original
        .ordinary_get_own_property(&PropertyKey::from("length"))
        .and_then(|desc| desc.value)
        .and_then(|value| value.as_number())
        .unwrap_or(0.0) as u32;
    let type_name = type_name.clone();
    let target = Value::Object(original);
    realm.function(&method.clone(), length, move |realm, this, args| {
        let data = assert_brand(this, brand, &type_name, &method)?;
        let receiver = if unwrap_this { data } else { this.clone() };
        realm.call(&target, &receiver, args)
    })
}

/// Default `valueOf`, `toString` and `@@toPrimitive`
fn default_methods(realm: &Realm, name: &Rc<str>, brand: BrandKey) -> Vec<(PropertyKey, ObjectRef)> {
    let value_of = {
        let name = name.clone();
        realm.function("valueOf", 0, move |_, this, _| {
            assert_brand(this, brand, &name, "valueOf")
        })
    };
    let to_string = {
        let name = name.clone();
        realm.function("toString", 0, move |realm, this, _| {
            let data = assert_brand(this, brand, &name, "toString")?;
            Ok(Value::String(realm.to_string(&data)?))
        })
    };
    let to_primitive = {
        let name = name.clone();
        realm.function("[Symbol.toPrimitive]", 1, move |_, this, _| {
            assert_brand(this, brand, &name, "[Symbol.toPrimitive]")
        })
    };
    vec![
        (PropertyKey::from("valueOf"), value_of),
        (PropertyKey::from("toString"), to_string),
        (PropertyKey::from(Symbol::to_primitive()), to_primitive),
    ]
}
