//! Blueprint derivation against builtins and exotic objects

use raya_box::{
    derive_blueprint, AdaptOptions, BoxError, BoxFactory, BoxResult, ExoticHooks, NullReporter,
    ObjectRef, PropertyDescriptor, PropertyKey, ProtoLink, Realm, Value,
};
use std::rc::Rc;
use std::sync::Arc;

#[test]
fn test_every_builtin_derives() {
    let realm = Realm::new();
    for name in realm.global_names() {
        let ctor = realm.global(&name).unwrap();
        let blueprint = derive_blueprint(&realm, &ctor, AdaptOptions::default()).unwrap();
        assert_eq!(blueprint.name, name);
        assert!(blueprint.proto.contains_key(&PropertyKey::from("toString")));
        assert!(blueprint.unwrap_this);

        let boxed = BoxFactory::new(&realm)
            .with_reporter(Arc::new(NullReporter))
            .create(&blueprint)
            .unwrap();
        assert_eq!(boxed.failures().count(), 0, "{} had failures", name);
    }
}

#[test]
fn test_boolean_blueprint_delegates() {
    let realm = Realm::new();
    let boolean = realm.global("Boolean").unwrap();
    let blueprint = derive_blueprint(&realm, &boolean, AdaptOptions::default()).unwrap();
    let boxed = BoxFactory::new(&realm)
        .with_reporter(Arc::new(NullReporter))
        .create(&blueprint)
        .unwrap();

    let value = boxed.construct(Value::from(0)).unwrap();
    assert_eq!(boxed.unbox(&value).unwrap(), Value::from(false));
    assert_eq!(realm.invoke(&value, "toString", &[]).unwrap(), Value::from("false"));
    // Objects are truthy even when the datum is not
    assert!(value.to_boolean());
}

#[test]
fn test_wrapper_receiver_mode() {
    let realm = Realm::new();
    let number = realm.global("Number").unwrap();
    let blueprint =
        derive_blueprint(&realm, &number, AdaptOptions::default().unwrap_this(false)).unwrap();
    let boxed = BoxFactory::new(&realm)
        .with_reporter(Arc::new(NullReporter))
        .create(&blueprint)
        .unwrap();

    // Number methods reject the boxed wrapper when it is passed through
    let value = boxed.construct(Value::from(5)).unwrap();
    let err = realm.invoke(&value, "toFixed", &[]).unwrap_err();
    assert_eq!(err.name(), "TypeError");
    assert_eq!(
        err.message(),
        "Number.prototype.toFixed requires that 'this' be a Number"
    );
}

#[test]
fn test_custom_coerce_and_literal() {
    let realm = Realm::new();
    let number = realm.global("Number").unwrap();
    let clamp = realm.function("clamp", 1, |realm, _, args| {
        let n = realm.to_number(&args.first().cloned().unwrap_or_default())?;
        Ok(Value::from(n.clamp(0.0, 10.0)))
    });
    let options = AdaptOptions::default().coerce(clamp.clone()).literal(clamp);
    let blueprint = derive_blueprint(&realm, &number, options).unwrap();
    let boxed = BoxFactory::new(&realm)
        .with_reporter(Arc::new(NullReporter))
        .auto_box_literals(false)
        .create(&blueprint)
        .unwrap();

    assert_eq!(boxed.call(Value::from(40)).unwrap(), Value::from(10));
    let built = boxed.construct(Value::from(-3)).unwrap();
    assert_eq!(boxed.unbox(&built).unwrap(), Value::from(0));
}

#[test]
fn test_null_prototype_chain_is_preserved() {
    let realm = Realm::new();
    let ctor = realm.function("Bare", 1, |_, _, args| Ok(args.first().cloned().unwrap_or_default()));
    let proto = ObjectRef::new(None);
    ctor.define_own_property(
        PropertyKey::from("prototype"),
        PropertyDescriptor::data(Value::Object(proto), false, false, false),
    )
    .unwrap();
    assert!(ctor.set_prototype_of(None));

    let blueprint = derive_blueprint(&realm, &ctor, AdaptOptions::default()).unwrap();
    assert!(matches!(blueprint.proto_proto, ProtoLink::Null));
    assert!(matches!(blueprint.constructor_proto, ProtoLink::Null));

    let boxed = BoxFactory::new(&realm)
        .with_reporter(Arc::new(NullReporter))
        .create(&blueprint)
        .unwrap();
    assert!(boxed.prototype().prototype().is_none());
    assert!(boxed.constructor().prototype().is_none());
}

struct RevokedDescriptors;

impl ExoticHooks for RevokedDescriptors {
    fn get_own_property(
        &self,
        _target: &ObjectRef,
        key: &PropertyKey,
    ) -> BoxResult<Option<PropertyDescriptor>> {
        Err(BoxError::type_error(format!(
            "Cannot perform 'getOwnPropertyDescriptor' on a proxy that has been revoked: {}",
            key
        )))
    }
}

#[test]
fn test_exotic_constructor_failure_propagates() {
    let realm = Realm::new();
    let exotic = ObjectRef::with_exotic(
        Some(realm.object_prototype().clone()),
        Rc::new(RevokedDescriptors),
    );
    exotic
        .define_own_property(
            PropertyKey::from("answer"),
            PropertyDescriptor::data(Value::from(42), true, true, true),
        )
        .unwrap();
    let ctor = realm.function("Host", 0, |_, _, _| Ok(Value::Undefined));
    ctor.define_own_property(
        PropertyKey::from("prototype"),
        PropertyDescriptor::data(Value::Object(exotic), false, false, false),
    )
    .unwrap();

    let err = derive_blueprint(&realm, &ctor, AdaptOptions::default()).unwrap_err();
    assert_eq!(err.name(), "TypeError");
    assert!(err.message().ends_with("revoked: answer"));
}

#[test]
fn test_delegation_source_failure_propagates() {
    let realm = Realm::new();
    let exotic = ObjectRef::with_exotic(None, Rc::new(RevokedDescriptors));
    exotic
        .define_own_property(
            PropertyKey::from("method"),
            PropertyDescriptor::method(Value::Undefined),
        )
        .unwrap();
    let native = realm.function("Host", 0, |_, _, _| Ok(Value::Undefined));
    native
        .define_own_property(
            PropertyKey::from("prototype"),
            PropertyDescriptor::data(Value::Object(exotic), false, false, false),
        )
        .unwrap();

    let blueprint = raya_box::Blueprint::new("Hosted").wrap_built_ins(native, true);
    let err = BoxFactory::new(&realm)
        .with_reporter(Arc::new(NullReporter))
        .create(&blueprint)
        .unwrap_err();
    assert!(err.message().contains("revoked"));
}
