//! Blueprint adapter: derive a blueprint from an existing native type
//!
//! The derived blueprint copies full descriptors (accessors, flags and
//! all) from the existing type and its prototype, records both prototype
//! links, and delegates to the existing type's prototype methods.
//! Introspection failures (exotic hooks, throwing `prototype` getters)
//! propagate to the caller untouched.

use crate::blueprint::{Blueprint, PropertyMap, ProtoLink, DEFAULT_TYPE_NAME};
use crate::descriptor::PropertyDescriptor;
use crate::error::{BoxError, BoxResult};
use crate::object::ObjectRef;
use crate::realm::Realm;
use crate::value::{PropertyKey, Value};

/// Keys of a function that never become static entries
const EXCLUDED_STATIC_KEYS: [&str; 2] = ["length", "name"];

/// Overrides for [`derive_blueprint`]
#[derive(Debug, Clone, Default)]
pub struct AdaptOptions {
    /// Coercion function; defaults to calling the existing type
    pub coerce: Option<ObjectRef>,
    /// Literal function; defaults to calling the existing type
    pub literal: Option<ObjectRef>,
    /// Delegated receiver mode; defaults to `true`
    pub unwrap_this: Option<bool>,
}

impl AdaptOptions {
    /// Set the coercion function
    pub fn coerce(mut self, func: ObjectRef) -> Self {
        self.coerce = Some(func);
        self
    }

    /// Set the literal function
    pub fn literal(mut self, func: ObjectRef) -> Self {
        self.literal = Some(func);
        self
    }

    /// Set the delegated receiver mode
    pub fn unwrap_this(mut self, unwrap: bool) -> Self {
        self.unwrap_this = Some(unwrap);
        self
    }
}

/// Derive a blueprint that boxes instances of `existing`
pub fn derive_blueprint(
    realm: &Realm,
    existing: &ObjectRef,
    options: AdaptOptions,
) -> BoxResult<Blueprint> {
    if !existing.is_callable() {
        return Err(BoxError::type_error(format!(
            "Cannot derive a blueprint from non-callable {:?}",
            existing
        )));
    }

    let mut blueprint = Blueprint::new(type_name(existing)?);

    let source_proto = realm.get(existing, &PropertyKey::from("prototype"))?;
    if let Value::Object(source_proto) = &source_proto {
        blueprint.proto = copy_descriptors(source_proto, |_, _| true)?;
        blueprint.proto_proto = ProtoLink::from_prototype(source_proto.prototype());
    }

    blueprint.statics = copy_descriptors(existing, |key, desc| {
        let excluded = key
            .as_str()
            .is_some_and(|k| EXCLUDED_STATIC_KEYS.contains(&k));
        // Non-value descriptors that cannot be reconfigured would only fail later
        let unmovable = desc.plain_value().is_none() && desc.is_explicitly_non_configurable();
        !excluded && !unmovable
    })?;
    blueprint.constructor_proto = ProtoLink::from_prototype(existing.prototype());

    blueprint.coerce = Some(options.coerce.unwrap_or_else(|| existing.clone()));
    blueprint.literal = Some(options.literal.unwrap_or_else(|| existing.clone()));
    blueprint.wrap_built_ins = Some(existing.clone());
    blueprint.unwrap_this = options.unwrap_this.unwrap_or(true);

    Ok(blueprint)
}

/// The existing type's own string `name`, or the default type name
fn type_name(existing: &ObjectRef) -> BoxResult<String> {
    let name = existing
        .get_own_property(&PropertyKey::from("name"))?
        .and_then(|desc| desc.value);
    Ok(match name {
        Some(Value::String(name)) if !name.is_empty() => name.to_string(),
        _ => DEFAULT_TYPE_NAME.to_string(),
    })
}

/// Copy every own descriptor of `source` accepted by `keep`
fn copy_descriptors(
    source: &ObjectRef,
    keep: impl Fn(&PropertyKey, &PropertyDescriptor) -> bool,
) -> BoxResult<PropertyMap> {
    let mut map = PropertyMap::new();
    for key in source.own_property_keys()? {
        let Some(desc) = source.get_own_property(&key)? else {
            continue;
        };
        if keep(&key, &desc) {
            map.insert(key, desc);
        }
    }
    Ok(map)
}
