//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value** - two instances
/// with the same attribute values are the same value. `Money` is the canonical
/// example here: 1299.99 is 1299.99 regardless of which line item carries it.
/// To "change" a value object, build a new one.
///
/// Contrast with [`Entity`](crate::Entity), where identity persists across
/// attribute changes.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
