//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Products, lots, locations and categories are entities: two records with the
/// same identifier are the same record even when their fields differ (e.g. a
/// lot before and after its quantity changed).
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

/// Finds the entity with `id` in a slice.
pub fn find_by_id<'a, E: Entity>(items: &'a [E], id: &E::Id) -> Option<&'a E> {
    items.iter().find(|item| item.id() == id)
}
