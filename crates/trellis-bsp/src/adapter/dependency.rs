//! Ordering constraints between queued messages.

use std::collections::BTreeSet;

use trellis_queue::DependencyKey;

use crate::protocol::BuildTargetIdentifier;

/// What a queued message touches.
///
/// State changes conflict with everything, so they act as barriers in both
/// directions. Preparations conflict only when their target sets overlap.
/// Reads conflict with nothing but state changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageDependency {
    /// Mutates adapter or backend state.
    StateChange,
    /// Reads backend state.
    StateRead,
    /// Prepares the targets with the given URIs.
    Prepare(BTreeSet<String>),
}

impl MessageDependency {
    /// Key for preparing `targets`.
    #[must_use]
    pub fn prepare(targets: &[BuildTargetIdentifier]) -> Self {
        Self::Prepare(
            targets
                .iter()
                .map(|target| target.uri.as_str().to_owned())
                .collect(),
        )
    }
}

impl DependencyKey for MessageDependency {
    fn conflicts_with(&self, earlier: &Self) -> bool {
        match (self, earlier) {
            (Self::StateChange, _) | (_, Self::StateChange) => true,
            (Self::Prepare(targets), Self::Prepare(earlier_targets)) => {
                !targets.is_disjoint(earlier_targets)
            }
            _ => false,
        }
    }
}
