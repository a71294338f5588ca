//! Property descriptors
//!
//! [`PropertyDescriptor`] is the partial record passed to definition
//! operations and stored in blueprints: every field is optional, and a
//! descriptor may be malformed until it is validated at definition time.
//! [`Property`] is what an object actually stores: always complete, either
//! a data slot or an accessor pair.

use crate::error::{BoxError, BoxResult};
use crate::object::ObjectRef;
use crate::value::Value;
use serde::Serialize;

/// Partial property descriptor
#[derive(Debug, Clone, Default)]
pub struct PropertyDescriptor {
    /// `[[Value]]`
    pub value: Option<Value>,
    /// `[[Writable]]`
    pub writable: Option<bool>,
    /// `[[Get]]`: a callable or `undefined`
    pub get: Option<Value>,
    /// `[[Set]]`: a callable or `undefined`
    pub set: Option<Value>,
    /// `[[Enumerable]]`
    pub enumerable: Option<bool>,
    /// `[[Configurable]]`
    pub configurable: Option<bool>,
}

impl PropertyDescriptor {
    /// Complete data descriptor
    pub fn data(value: Value, writable: bool, enumerable: bool, configurable: bool) -> Self {
        Self {
            value: Some(value),
            writable: Some(writable),
            enumerable: Some(enumerable),
            configurable: Some(configurable),
            ..Self::default()
        }
    }

    /// Writable, configurable, non-enumerable data descriptor (method shape)
    pub fn method(value: Value) -> Self {
        Self::data(value, true, false, true)
    }

    /// Non-writable, non-enumerable, non-configurable data descriptor
    pub fn frozen(value: Value) -> Self {
        Self::data(value, false, false, false)
    }

    /// Complete accessor descriptor
    pub fn accessor(
        get: Option<ObjectRef>,
        set: Option<ObjectRef>,
        enumerable: bool,
        configurable: bool,
    ) -> Self {
        Self {
            get: Some(get.map(Value::Object).unwrap_or_default()),
            set: Some(set.map(Value::Object).unwrap_or_default()),
            enumerable: Some(enumerable),
            configurable: Some(configurable),
            ..Self::default()
        }
    }

    /// Has `[[Get]]` or `[[Set]]`
    pub fn is_accessor_descriptor(&self) -> bool {
        self.get.is_some() || self.set.is_some()
    }

    /// Has `[[Value]]` or `[[Writable]]`
    pub fn is_data_descriptor(&self) -> bool {
        self.value.is_some() || self.writable.is_some()
    }

    /// Neither data nor accessor
    pub fn is_generic_descriptor(&self) -> bool {
        !self.is_accessor_descriptor() && !self.is_data_descriptor()
    }

    /// No field present at all
    pub fn is_empty(&self) -> bool {
        self.is_generic_descriptor() && self.enumerable.is_none() && self.configurable.is_none()
    }

    /// Explicitly marked non-configurable
    pub fn is_explicitly_non_configurable(&self) -> bool {
        self.configurable == Some(false)
    }

    /// The plain value, when the descriptor carries one
    pub fn plain_value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// The plain value when it is a callable object
    pub fn function_value(&self) -> Option<&ObjectRef> {
        self.value
            .as_ref()
            .and_then(Value::as_object)
            .filter(|obj| obj.is_callable())
    }

    /// Reject malformed descriptors
    ///
    /// A descriptor may not mix data and accessor fields, and its
    /// accessors must be callable or `undefined`.
    pub fn validate(&self) -> BoxResult<()> {
        if self.is_accessor_descriptor() && self.is_data_descriptor() {
            return Err(BoxError::type_error(
                "Invalid property descriptor. Cannot both specify accessors and a value or writable attribute",
            ));
        }
        if let Some(get) = &self.get {
            if !get.is_undefined() && !get.is_callable() {
                return Err(BoxError::type_error(format!(
                    "Getter must be a function: {:?}",
                    get
                )));
            }
        }
        if let Some(set) = &self.set {
            if !set.is_undefined() && !set.is_callable() {
                return Err(BoxError::type_error(format!(
                    "Setter must be a function: {:?}",
                    set
                )));
            }
        }
        Ok(())
    }

    /// Serializable shape of this descriptor
    pub fn summary(&self) -> DescriptorSummary {
        let kind = if self.is_accessor_descriptor() {
            "accessor"
        } else if self.function_value().is_some() {
            "method"
        } else if self.is_data_descriptor() {
            "data"
        } else {
            "generic"
        };
        DescriptorSummary {
            kind,
            value_type: self.value.as_ref().map(Value::type_of),
            writable: self.writable,
            enumerable: self.enumerable,
            configurable: self.configurable,
        }
    }
}

/// Serializable view of a descriptor, used by inspection output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DescriptorSummary {
    /// `method`, `data`, `accessor` or `generic`
    pub kind: &'static str,
    /// `typeof` of the plain value, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_type: Option<&'static str>,
    /// Writable flag, if present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub writable: Option<bool>,
    /// Enumerable flag, if present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enumerable: Option<bool>,
    /// Configurable flag, if present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configurable: Option<bool>,
}

/// Storage of a property: data or accessor
#[derive(Debug, Clone)]
pub enum PropertySlot {
    /// Data property
    Data {
        /// Stored value
        value: Value,
        /// Whether assignment may replace the value
        writable: bool,
    },
    /// Accessor property
    Accessor {
        /// Getter function
        get: Option<ObjectRef>,
        /// Setter function
        set: Option<ObjectRef>,
    },
}

/// A complete own property
#[derive(Debug, Clone)]
pub struct Property {
    /// Data or accessor storage
    pub slot: PropertySlot,
    /// Shows up in enumeration
    pub enumerable: bool,
    /// May be deleted or redefined
    pub configurable: bool,
}

impl Property {
    /// Data property with explicit attributes
    pub fn data(value: Value, writable: bool, enumerable: bool, configurable: bool) -> Self {
        Self {
            slot: PropertySlot::Data { value, writable },
            enumerable,
            configurable,
        }
    }

    /// Check for an accessor property
    pub fn is_accessor(&self) -> bool {
        matches!(self.slot, PropertySlot::Accessor { .. })
    }

    /// Build a new property from a validated descriptor, filling defaults
    pub(crate) fn from_descriptor(desc: &PropertyDescriptor) -> Self {
        let slot = if desc.is_accessor_descriptor() {
            PropertySlot::Accessor {
                get: desc.get.as_ref().and_then(Value::as_object).cloned(),
                set: desc.set.as_ref().and_then(Value::as_object).cloned(),
            }
        } else {
            PropertySlot::Data {
                value: desc.value.clone().unwrap_or_default(),
                writable: desc.writable.unwrap_or(false),
            }
        };
        Self {
            slot,
            enumerable: desc.enumerable.unwrap_or(false),
            configurable: desc.configurable.unwrap_or(false),
        }
    }

    /// Complete descriptor for this property
    pub fn to_descriptor(&self) -> PropertyDescriptor {
        match &self.slot {
            PropertySlot::Data { value, writable } => {
                PropertyDescriptor::data(value.clone(), *writable, self.enumerable, self.configurable)
            }
            PropertySlot::Accessor { get, set } => {
                PropertyDescriptor::accessor(get.clone(), set.clone(), self.enumerable, self.configurable)
            }
        }
    }
}
