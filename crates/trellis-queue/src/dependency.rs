//! Ordering descriptors attached to queued items.

/// Describes which earlier items a queued item must wait for.
///
/// The relation should be symmetric: if `a` conflicts with `b`, `b` conflicts
/// with `a`. The queue only ever asks a later item about earlier ones, so an
/// asymmetric relation still yields a well-defined schedule, but it is harder
/// to reason about.
pub trait DependencyKey: Send + 'static {
    /// Returns `true` when an item carrying `self` must not start before an
    /// item carrying `earlier`, submitted before it, has completed.
    fn conflicts_with(&self, earlier: &Self) -> bool;
}
