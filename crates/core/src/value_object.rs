//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have no identity and are immutable: "changing" one means
/// building a new value. `Quantity` is the main example in this workspace;
/// two quantities of 4 are interchangeable, two lots of 4 are not.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
