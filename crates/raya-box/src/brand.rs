//! Brands: unforgeable per-type keys for private instance data

use crate::error::{BoxError, BoxResult};
use crate::value::Value;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global counter for generating unique brand IDs
static NEXT_BRAND_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque key of a boxed type's private data slot
///
/// Brands are minted only inside this crate and are never handed out, so
/// no caller can forge the slot of a type it did not create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BrandKey(u64);

impl BrandKey {
    /// Mint a brand that has never been used before
    pub(crate) fn fresh() -> Self {
        BrandKey(NEXT_BRAND_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Whether `value` is an object that directly owns the slot for `brand`
///
/// Only own private slots count; prototypes are never consulted.
pub(crate) fn has_brand(value: &Value, brand: BrandKey) -> bool {
    value.as_object().is_some_and(|obj| obj.has_private(brand))
}

/// Check the brand and return the private data
pub(crate) fn assert_brand(
    value: &Value,
    brand: BrandKey,
    type_name: &str,
    method: &str,
) -> BoxResult<Value> {
    value
        .as_object()
        .and_then(|obj| obj.private_get(brand))
        .ok_or_else(|| BoxError::incompatible_receiver(type_name, method, &describe_receiver(value)))
}

/// Short receiver description for error messages
pub(crate) fn describe_receiver(value: &Value) -> String {
    format!("{:?}", value)
}
