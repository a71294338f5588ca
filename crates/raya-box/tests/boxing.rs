//! End-to-end boxing behavior through the public API

use raya_box::{
    create_boxed_type, derive_blueprint, AdaptOptions, Blueprint, BoxFactory, InstallOutcome,
    InstallTarget, MemoryReporter, ObjectRef, PropertyDescriptor, PropertyKey, Realm, SkipReason,
    Symbol, Value,
};
use std::sync::Arc;

fn quiet(realm: &Realm) -> (BoxFactory, Arc<MemoryReporter>) {
    let reporter = Arc::new(MemoryReporter::new());
    (BoxFactory::new(realm).with_reporter(reporter.clone()), reporter)
}

fn number_blueprint(realm: &Realm) -> Blueprint {
    let number = realm.global("Number").unwrap();
    derive_blueprint(realm, &number, AdaptOptions::default()).unwrap()
}

// ============================================================================
// Brand isolation
// ============================================================================

#[test]
fn test_identical_blueprints_yield_disjoint_brands() {
    let realm = Realm::new();
    let (factory, _) = quiet(&realm);
    let blueprint = Blueprint::new("Meters");
    let first = factory.create(&blueprint).unwrap();
    let second = factory.create(&blueprint).unwrap();

    let a = first.construct(Value::from(1)).unwrap();
    let b = second.construct(Value::from(1)).unwrap();

    assert!(first.is_instance(&a));
    assert!(!first.is_instance(&b));
    assert!(!second.is_instance(&a));
    assert!(second.is_instance(&b));

    let value_of = realm.get(first.prototype(), &PropertyKey::from("valueOf")).unwrap();
    let err = realm.call(&value_of, &b, &[]).unwrap_err();
    assert!(err.is_incompatible_receiver());
    assert!(first.unbox(&b).is_err());
}

#[test]
fn test_has_instance_is_brand_based() {
    let realm = Realm::new();
    let (factory, _) = quiet(&realm);
    let boxed = factory.create(&Blueprint::new("Tag")).unwrap();
    let ctor = Value::Object(boxed.constructor().clone());

    let value = boxed.construct(Value::from("x")).unwrap();
    assert!(realm.instance_of(&value, &ctor).unwrap());
    assert!(!realm.instance_of(&Value::from("x"), &ctor).unwrap());
    assert!(!realm.instance_of(&Value::Object(realm.new_object()), &ctor).unwrap());
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_call_and_construct_agree() {
    let realm = Realm::new();
    let (factory, _) = quiet(&realm);
    let trim = realm.function("trim", 1, |realm, _, args| {
        let s = realm.to_string(&args.first().cloned().unwrap_or_default())?;
        Ok(Value::from(s.trim()))
    });
    let boxed = factory.create(&Blueprint::new("Word").coerce(trim)).unwrap();

    let built = boxed.construct(Value::from("  hi ")).unwrap();
    let bare = boxed.call(Value::from("  hi ")).unwrap();
    assert!(boxed.is_instance(&built));
    assert!(boxed.is_instance(&bare));
    assert_eq!(boxed.unbox(&built).unwrap(), Value::from("hi"));
    assert_eq!(boxed.unbox(&bare).unwrap(), Value::from("hi"));
    assert!(!built.strict_equals(&bare));
}

#[test]
fn test_datum_is_hidden_and_permanent() {
    let realm = Realm::new();
    let (factory, _) = quiet(&realm);
    let boxed = factory.create(&Blueprint::new("Secret")).unwrap();
    let value = boxed.construct(Value::from(7)).unwrap();
    let obj = value.as_object().unwrap();

    assert!(obj.own_property_keys().unwrap().is_empty());

    realm.set(obj, PropertyKey::from("valueOf"), Value::from(0)).unwrap();
    for key in obj.own_property_keys().unwrap() {
        assert!(obj.delete(&key));
    }
    obj.freeze();
    assert_eq!(boxed.unbox(&value).unwrap(), Value::from(7));
    assert_eq!(realm.to_number(&value).unwrap(), 7.0);
}

#[test]
fn test_literal_object_cannot_be_branded_twice() {
    let realm = Realm::new();
    let (factory, _) = quiet(&realm);
    let shared = realm.new_object();
    let handle = shared.clone();
    let literal = realm.function("literal", 1, move |_, _, _| Ok(Value::Object(handle.clone())));
    let boxed = factory
        .auto_box_literals(false)
        .create(&Blueprint::new("Once").literal(literal))
        .unwrap();

    let first = boxed.call(Value::from(1)).unwrap();
    assert!(first.as_object().unwrap().ptr_eq(&shared));
    let err = boxed.call(Value::from(2)).unwrap_err();
    assert_eq!(err.name(), "TypeError");
    assert_eq!(boxed.unbox(&first).unwrap(), Value::from(1));
}

#[test]
fn test_round_trip_through_string_and_value_of() {
    let realm = Realm::new();
    let (factory, _) = quiet(&realm);
    let boxed = factory.create(&number_blueprint(&realm)).unwrap();
    let value = boxed.construct(Value::from(42)).unwrap();

    let string = Value::Object(realm.global("String").unwrap());
    assert_eq!(
        realm.call(&string, &Value::Undefined, &[value.clone()]).unwrap(),
        Value::from("42")
    );
    assert_eq!(realm.invoke(&value, "valueOf", &[]).unwrap(), Value::from(42));
    assert_eq!(&*realm.to_string(&value).unwrap(), "42");
}

#[test]
fn test_default_to_primitive_ignores_hint() {
    let realm = Realm::new();
    let (factory, _) = quiet(&realm);
    let boxed = factory.create(&Blueprint::new("Flag")).unwrap();
    let value = boxed.construct(Value::from(true)).unwrap();
    let to_primitive = realm
        .get_value(&value, &PropertyKey::from(Symbol::to_primitive()))
        .unwrap();
    for hint in ["default", "number", "string"] {
        assert_eq!(
            realm.call(&to_primitive, &value, &[Value::from(hint)]).unwrap(),
            Value::from(true)
        );
    }
}

// ============================================================================
// Delegation
// ============================================================================

#[test]
fn test_number_delegation() {
    let realm = Realm::new();
    let (factory, reporter) = quiet(&realm);
    let boxed = factory.create(&number_blueprint(&realm)).unwrap();
    let value = boxed.construct(Value::from(3.14159)).unwrap();

    assert_eq!(realm.invoke(&value, "toFixed", &[Value::from(2)]).unwrap(), Value::from("3.14"));
    assert_eq!(realm.invoke(&value, "toPrecision", &[Value::from(3)]).unwrap(), Value::from("3.14"));
    assert_eq!(realm.invoke(&value, "toString", &[]).unwrap(), Value::from("3.14159"));

    let err = realm.invoke(&value, "toFixed", &[Value::from(101)]).unwrap_err();
    assert_eq!(err.name(), "RangeError");

    let to_fixed = realm.get(boxed.prototype(), &PropertyKey::from("toFixed")).unwrap();
    let err = realm.call(&to_fixed, &Value::from(3), &[]).unwrap_err();
    assert!(err.is_incompatible_receiver());
    assert!(reporter.is_empty());
}

#[test]
fn test_string_delegation() {
    let realm = Realm::new();
    let (factory, _) = quiet(&realm);
    let string = realm.global("String").unwrap();
    let blueprint = derive_blueprint(&realm, &string, AdaptOptions::default()).unwrap();
    let boxed = factory.create(&blueprint).unwrap();
    let value = boxed.call(Value::from("boxed")).unwrap();

    assert_eq!(realm.invoke(&value, "toUpperCase", &[]).unwrap(), Value::from("BOXED"));
    assert_eq!(
        realm.invoke(&value, "slice", &[Value::from(1), Value::from(3)]).unwrap(),
        Value::from("ox")
    );
    assert_eq!(realm.invoke(&value, "includes", &[Value::from("xe")]).unwrap(), Value::from(true));
}

#[test]
fn test_delegates_are_hidden_methods() {
    let realm = Realm::new();
    let (factory, _) = quiet(&realm);
    let boxed = factory.create(&number_blueprint(&realm)).unwrap();
    let desc = boxed
        .prototype()
        .get_own_property(&PropertyKey::from("toFixed"))
        .unwrap()
        .unwrap();
    assert_eq!(desc.writable, Some(true));
    assert_eq!(desc.enumerable, Some(false));
    assert_eq!(desc.configurable, Some(true));
    assert_eq!(
        realm.get(desc.function_value().unwrap(), &PropertyKey::from("name")).unwrap(),
        Value::from("toFixed")
    );
}

#[test]
fn test_author_entry_is_not_overridden() {
    let realm = Realm::new();
    let (factory, _) = quiet(&realm);
    let mut blueprint = number_blueprint(&realm);
    let custom = realm.function("toFixed", 1, |_, _, _| Ok(Value::from("custom")));
    blueprint.proto.insert("toFixed", PropertyDescriptor::method(Value::Object(custom.clone())));
    let boxed = factory.create(&blueprint).unwrap();

    let installed = realm.get(boxed.prototype(), &PropertyKey::from("toFixed")).unwrap();
    assert!(installed.as_object().unwrap().ptr_eq(&custom));
    let value = boxed.construct(Value::from(1)).unwrap();
    assert_eq!(realm.invoke(&value, "toFixed", &[]).unwrap(), Value::from("custom"));

    let skipped = boxed.install_log().iter().any(|r| {
        r.key == PropertyKey::from("toFixed")
            && r.outcome == InstallOutcome::Skipped(SkipReason::Overridden)
    });
    assert!(skipped);
}

#[test]
fn test_author_value_of_replaces_default() {
    let realm = Realm::new();
    let (factory, _) = quiet(&realm);
    let value_of = realm.function("valueOf", 0, |_, _, _| Ok(Value::from(-1)));
    let blueprint =
        Blueprint::new("Fixed").with_proto("valueOf", PropertyDescriptor::method(Value::Object(value_of)));
    let boxed = factory.create(&blueprint).unwrap();
    let value = boxed.construct(Value::from(5)).unwrap();
    assert_eq!(realm.invoke(&value, "valueOf", &[]).unwrap(), Value::from(-1));
    assert_eq!(boxed.unbox(&value).unwrap(), Value::from(5));
}

// ============================================================================
// Best-effort installation
// ============================================================================

#[test]
fn test_partial_static_failure_is_reported() {
    let realm = Realm::new();
    let (factory, reporter) = quiet(&realm);
    let blueprint = Blueprint::new("Config")
        .with_static("first", PropertyDescriptor::method(Value::from(1)))
        .with_static(
            "bad",
            PropertyDescriptor {
                value: Some(Value::from(2)),
                get: Some(Value::Undefined),
                configurable: Some(true),
                ..PropertyDescriptor::default()
            },
        )
        .with_static("last", PropertyDescriptor::method(Value::from(3)));
    let boxed = factory.create(&blueprint).unwrap();
    let ctor = Value::Object(boxed.constructor().clone());

    assert_eq!(realm.get_value(&ctor, &PropertyKey::from("first")).unwrap(), Value::from(1));
    assert_eq!(realm.get_value(&ctor, &PropertyKey::from("last")).unwrap(), Value::from(3));
    assert!(realm.get_value(&ctor, &PropertyKey::from("bad")).unwrap().is_undefined());

    let failures: Vec<_> = boxed.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].target, InstallTarget::Constructor);
    assert_eq!(failures[0].key, PropertyKey::from("bad"));

    let messages = reporter.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with("TypeError: "));
    assert!(messages[0].ends_with("\n    at Config.bad"));
}

#[test]
fn test_failing_proto_entry_does_not_abort() {
    let realm = Realm::new();
    let (factory, reporter) = quiet(&realm);
    let blueprint = Blueprint::new("Loose")
        .with_proto(
            "broken",
            PropertyDescriptor {
                set: Some(Value::from("nope")),
                ..PropertyDescriptor::default()
            },
        )
        .with_proto("unit", PropertyDescriptor::data(Value::from("cm"), false, true, false));
    let boxed = factory.create(&blueprint).unwrap();
    let value = boxed.construct(Value::from(1)).unwrap();

    assert_eq!(realm.get_value(&value, &PropertyKey::from("unit")).unwrap(), Value::from("cm"));
    assert_eq!(realm.invoke(&value, "valueOf", &[]).unwrap(), Value::from(1));
    assert_eq!(reporter.len(), 1);
    assert!(reporter.messages()[0].ends_with("at Loose.prototype.broken"));
}

#[test]
fn test_blueprint_is_reusable_and_unchanged() {
    let realm = Realm::new();
    let (factory, _) = quiet(&realm);
    let blueprint = number_blueprint(&realm);
    let before = serde_json::to_value(blueprint.summary()).unwrap();
    factory.create(&blueprint).unwrap();
    factory.create(&blueprint).unwrap();
    assert_eq!(serde_json::to_value(blueprint.summary()).unwrap(), before);
}

// ============================================================================
// Prototype manipulation
// ============================================================================

#[test]
fn test_membership_survives_prototype_reassignment() {
    let realm = Realm::new();
    let (factory, _) = quiet(&realm);
    let boxed = factory.create(&Blueprint::new("Moved")).unwrap();
    let ctor = Value::Object(boxed.constructor().clone());
    let value = boxed.construct(Value::from(9)).unwrap();

    assert!(value.as_object().unwrap().set_prototype_of(None));
    assert!(boxed.is_instance(&value));
    assert!(realm.instance_of(&value, &ctor).unwrap());
    assert_eq!(boxed.unbox(&value).unwrap(), Value::from(9));

    let value_of = realm.get(boxed.prototype(), &PropertyKey::from("valueOf")).unwrap();
    assert_eq!(realm.call(&value_of, &value, &[]).unwrap(), Value::from(9));
}

#[test]
fn test_spoofed_prototype_is_not_an_instance() {
    let realm = Realm::new();
    let (factory, _) = quiet(&realm);
    let boxed = factory.create(&Blueprint::new("Genuine")).unwrap();
    let ctor = Value::Object(boxed.constructor().clone());
    let spoof = Value::Object(ObjectRef::new(Some(boxed.prototype().clone())));

    assert!(!boxed.is_instance(&spoof));
    assert!(!realm.instance_of(&spoof, &ctor).unwrap());
    let err = realm.invoke(&spoof, "valueOf", &[]).unwrap_err();
    assert!(err.is_incompatible_receiver());
    assert_eq!(
        err.message(),
        "Method Genuine.prototype.valueOf called on incompatible receiver [object Object]"
    );
}

#[test]
fn test_subclass_instances_are_members() {
    let realm = Realm::new();
    let (factory, _) = quiet(&realm);
    let boxed = factory.create(&Blueprint::new("Base")).unwrap();
    let derived = ObjectRef::new(Some(boxed.prototype().clone()));
    let sub = realm.function("Sub", 1, |_, _, _| Ok(Value::Undefined));
    sub.define_own_property(
        PropertyKey::from("prototype"),
        PropertyDescriptor::data(Value::Object(derived.clone()), true, false, false),
    )
    .unwrap();

    let value = realm.construct(boxed.constructor(), &[Value::from(2)], Some(&sub)).unwrap();
    assert!(value.as_object().unwrap().prototype().unwrap().ptr_eq(&derived));
    assert_eq!(realm.invoke(&value, "toString", &[]).unwrap(), Value::from("2"));
}

// ============================================================================
// Literal path
// ============================================================================

#[test]
fn test_literal_path_with_derived_number() {
    let realm = Realm::new();
    let boxed = create_boxed_type(&realm, &number_blueprint(&realm), false).unwrap();

    let literal = boxed.call(Value::from("12")).unwrap();
    assert_eq!(literal, Value::from(12));
    assert!(!boxed.is_instance(&literal));

    let built = boxed.construct(Value::from("12")).unwrap();
    assert!(boxed.is_instance(&built));
    assert_eq!(boxed.unbox(&built).unwrap(), Value::from(12));
}

#[test]
fn test_literal_path_reparents_objects() {
    let realm = Realm::new();
    let (factory, _) = quiet(&realm);
    let point = realm.function("point", 1, |realm, _, args| {
        let obj = realm.new_object();
        realm.set(&obj, PropertyKey::from("x"), args.first().cloned().unwrap_or_default())?;
        Ok(Value::Object(obj))
    });
    let blueprint = Blueprint::new("Point").literal(point);
    let boxed = factory.auto_box_literals(false).create(&blueprint).unwrap();

    let value = boxed.call(Value::from(4)).unwrap();
    let obj = value.as_object().unwrap();
    assert!(obj.prototype().unwrap().ptr_eq(boxed.prototype()));
    assert_eq!(realm.get(obj, &PropertyKey::from("x")).unwrap(), Value::from(4));
    assert_eq!(realm.invoke(&value, "valueOf", &[]).unwrap(), Value::from(4));
}

#[test]
fn test_literal_path_rejects_sealed_objects() {
    let realm = Realm::new();
    let sealed = realm.function("sealed", 1, |realm, _, _| {
        let obj = realm.new_object();
        obj.prevent_extensions();
        Ok(Value::Object(obj))
    });
    let boxed = create_boxed_type(&realm, &Blueprint::new("Sealed").literal(sealed), false).unwrap();
    let err = boxed.call(Value::from(1)).unwrap_err();
    assert_eq!(err.name(), "TypeError");
    assert!(err.message().contains("Sealed"));
}
