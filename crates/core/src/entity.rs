//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Collections keyed by identity (the invoice ledger, the dev store) look items
/// up through this trait rather than through a concrete field.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;

    /// True when this entity carries the given identity.
    fn has_id(&self, id: &Self::Id) -> bool {
        self.id() == id
    }
}

/// Position of the entity with the given id in an ordered slice.
pub fn position_of<E: Entity>(items: &[E], id: &E::Id) -> Option<usize> {
    items.iter().position(|item| item.has_id(id))
}
