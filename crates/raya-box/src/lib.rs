//! Raya Box
//!
//! Value boxing and native type adaptation on a small host object model:
//! - **Object model**: values, descriptors, objects and a realm with the
//!   `Object`, `Number`, `String` and `Boolean` builtins
//! - **Adapter**: [`derive_blueprint`] turns an existing type into a [`Blueprint`]
//! - **Factory**: [`BoxFactory`] turns a blueprint into a branded [`BoxedType`]
//! - **Guard**: contained failures sent to a [`Reporter`]
//!
//! # Example
//!
//! ```rust,ignore
//! use raya_box::{derive_blueprint, AdaptOptions, BoxFactory, Realm, Value};
//!
//! let realm = Realm::new();
//! let number = realm.global("Number").unwrap();
//! let blueprint = derive_blueprint(&realm, &number, AdaptOptions::default())?;
//! let boxed = BoxFactory::new(&realm).create(&blueprint)?;
//!
//! let n = boxed.construct(Value::from(42))?;
//! assert_eq!(&*realm.to_string(&n)?, "42");
//! assert!(boxed.is_instance(&n));
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![allow(clippy::derivable_impls)]
#![allow(clippy::redundant_closure)]

// ============================================================================
// Object Model
// ============================================================================

/// Runtime values, symbols and property keys
pub mod value;

/// Property descriptors and stored properties
pub mod descriptor;

/// Objects and own-property operations
pub mod object;

/// Native functions and the native call stack
pub mod function;

/// Realm: intrinsics, globals, calls and property access
pub mod realm;

/// Type conversions and number formatting
pub mod convert;

/// Builtin constructors and prototypes
pub mod builtins;

/// Runtime errors
pub mod error;

// ============================================================================
// Boxing
// ============================================================================

/// Brand keys for private instance data
pub mod brand;

/// Blueprints describing boxed types
pub mod blueprint;

/// Deriving blueprints from existing types
pub mod adapter;

/// Synthesizing boxed types
pub mod factory;

/// Guarded invocation and reporters
pub mod guard;

/// Configuration file
pub mod config;

pub use adapter::{derive_blueprint, AdaptOptions};
pub use blueprint::{Blueprint, BlueprintSummary, PropertyMap, ProtoLink};
pub use brand::BrandKey;
pub use config::{BoxConfig, ConfigError, CONFIG_FILE_NAME};
pub use convert::PreferredType;
pub use descriptor::PropertyDescriptor;
pub use error::{BoxError, BoxResult, ErrorKind};
pub use factory::{
    create_boxed_type, BoxFactory, BoxedType, InstallOutcome, InstallRecord, InstallTarget,
    SkipReason,
};
pub use guard::{
    guarded, guarded_call, ConsoleReporter, MemoryReporter, NullReporter, Report, ReportStyle,
    Reporter,
};
pub use object::{ExoticHooks, ObjectRef, WeakObjectRef};
pub use realm::Realm;
pub use value::{PropertyKey, Symbol, Value};
