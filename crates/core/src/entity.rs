//! Entity trait: identity + continuity across state changes.

/// An entity persisted under its string identity.
///
/// The identity doubles as the storage key, so it must be viewable as `&str`.
pub trait Entity {
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug + AsRef<str>;

    fn id(&self) -> &Self::Id;

    /// The identity as the raw storage key.
    fn key(&self) -> &str {
        self.id().as_ref()
    }
}
