//! Blueprints: plain descriptions of a boxed type
//!
//! A [`Blueprint`] is data, not behavior. The factory reads it by shared
//! reference and never mutates it; the same blueprint can produce any
//! number of independent boxed types.

use crate::descriptor::{DescriptorSummary, PropertyDescriptor};
use crate::object::ObjectRef;
use crate::value::PropertyKey;
use serde::Serialize;

/// Default display name of a boxed type
pub const DEFAULT_TYPE_NAME: &str = "Native";

/// Ordered map from property key to descriptor
///
/// Iteration follows insertion order; re-inserting a key replaces its
/// descriptor in place.
#[derive(Debug, Clone, Default)]
pub struct PropertyMap {
    entries: Vec<(PropertyKey, PropertyDescriptor)>,
}

impl PropertyMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entry
    pub fn insert(&mut self, key: impl Into<PropertyKey>, desc: PropertyDescriptor) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = desc,
            None => self.entries.push((key, desc)),
        }
    }

    /// Look up a descriptor
    pub fn get(&self, key: &PropertyKey) -> Option<&PropertyDescriptor> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, d)| d)
    }

    /// Check for a key
    pub fn contains_key(&self, key: &PropertyKey) -> bool {
        self.get(key).is_some()
    }

    /// Remove an entry
    pub fn remove(&mut self, key: &PropertyKey) -> Option<PropertyDescriptor> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&PropertyKey, &PropertyDescriptor)> {
        self.entries.iter().map(|(k, d)| (k, d))
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &PropertyKey> {
        self.entries.iter().map(|(k, _)| k)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// No entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<PropertyKey>> FromIterator<(K, PropertyDescriptor)> for PropertyMap {
    fn from_iter<I: IntoIterator<Item = (K, PropertyDescriptor)>>(iter: I) -> Self {
        let mut map = PropertyMap::new();
        for (key, desc) in iter {
            map.insert(key, desc);
        }
        map
    }
}

/// Prototype link of a synthesized object
#[derive(Debug, Clone, Default)]
pub enum ProtoLink {
    /// Use the realm default (`Object.prototype` or `Function.prototype`)
    #[default]
    Default,
    /// Explicitly no prototype
    Null,
    /// A specific object
    Object(ObjectRef),
}

impl ProtoLink {
    /// Link matching an observed `[[GetPrototypeOf]]` result
    pub fn from_prototype(proto: Option<ObjectRef>) -> Self {
        match proto {
            Some(obj) => ProtoLink::Object(obj),
            None => ProtoLink::Null,
        }
    }

    /// Resolve against the realm default
    pub fn resolve(&self, default: &ObjectRef) -> Option<ObjectRef> {
        match self {
            ProtoLink::Default => Some(default.clone()),
            ProtoLink::Null => None,
            ProtoLink::Object(obj) => Some(obj.clone()),
        }
    }

    fn describe(&self) -> String {
        match self {
            ProtoLink::Default => "default".to_string(),
            ProtoLink::Null => "null".to_string(),
            ProtoLink::Object(obj) => format!("{:?}", obj),
        }
    }
}

/// Description of a boxed type
#[derive(Debug, Clone)]
pub struct Blueprint {
    /// Display name of the boxed type
    pub name: String,
    /// Descriptors copied onto the boxed prototype
    pub proto: PropertyMap,
    /// Prototype of the boxed prototype
    pub proto_proto: ProtoLink,
    /// Descriptors installed on the boxed constructor
    pub statics: PropertyMap,
    /// Prototype of the boxed constructor
    pub constructor_proto: ProtoLink,
    /// Transform applied to the input before it is stored
    pub coerce: Option<ObjectRef>,
    /// Produces the literal for bare calls when auto-boxing is off
    pub literal: Option<ObjectRef>,
    /// Native type whose prototype methods are delegated
    pub wrap_built_ins: Option<ObjectRef>,
    /// Delegated methods receive the stored data instead of the wrapper
    pub unwrap_this: bool,
}

impl Default for Blueprint {
    fn default() -> Self {
        Self::new(DEFAULT_TYPE_NAME)
    }
}

impl Blueprint {
    /// Empty blueprint with the given type name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            proto: PropertyMap::new(),
            proto_proto: ProtoLink::Default,
            statics: PropertyMap::new(),
            constructor_proto: ProtoLink::Default,
            coerce: None,
            literal: None,
            wrap_built_ins: None,
            unwrap_this: false,
        }
    }

    /// Add a prototype entry
    pub fn with_proto(mut self, key: impl Into<PropertyKey>, desc: PropertyDescriptor) -> Self {
        self.proto.insert(key, desc);
        self
    }

    /// Add a static entry
    pub fn with_static(mut self, key: impl Into<PropertyKey>, desc: PropertyDescriptor) -> Self {
        self.statics.insert(key, desc);
        self
    }

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

    /// Delegate to the prototype methods of `native`
    pub fn wrap_built_ins(mut self, native: ObjectRef, unwrap_this: bool) -> Self {
        self.wrap_built_ins = Some(native);
        self.unwrap_this = unwrap_this;
        self
    }

    /// Serializable overview
    pub fn summary(&self) -> BlueprintSummary {
        let entries = |map: &PropertyMap| {
            map.iter()
                .map(|(key, desc)| EntrySummary {
                    key: key.to_string(),
                    descriptor: desc.summary(),
                })
                .collect()
        };
        BlueprintSummary {
            name: self.name.clone(),
            proto: entries(&self.proto),
            proto_proto: self.proto_proto.describe(),
            statics: entries(&self.statics),
            constructor_proto: self.constructor_proto.describe(),
            has_coerce: self.coerce.is_some(),
            has_literal: self.literal.is_some(),
            wraps: self.wrap_built_ins.as_ref().map(|native| format!("{:?}", native)),
            unwrap_this: self.unwrap_this,
        }
    }
}

/// One entry of a [`BlueprintSummary`]
#[derive(Debug, Clone, Serialize)]
pub struct EntrySummary {
    /// Property key
    pub key: String,
    /// Descriptor shape
    #[serde(flatten)]
    pub descriptor: DescriptorSummary,
}

/// Serializable view of a blueprint
#[derive(Debug, Clone, Serialize)]
pub struct BlueprintSummary {
    /// Type name
    pub name: String,
    /// Prototype entries
    pub proto: Vec<EntrySummary>,
    /// Prototype of the prototype
    pub proto_proto: String,
    /// Static entries
    pub statics: Vec<EntrySummary>,
    /// Prototype of the constructor
    pub constructor_proto: String,
    /// A coercion function is set
    pub has_coerce: bool,
    /// A literal function is set
    pub has_literal: bool,
    /// Delegation source
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wraps: Option<String>,
    /// Delegated receiver mode
    pub unwrap_this: bool,
}
