//! Dependency-aware work queue.
#![deny(missing_docs)]
//!
//! [`MessageQueue`] accepts units of work in a total submission order and
//! executes them with a partial order: every item carries a [`DependencyKey`],
//! an item starts only once all earlier items whose keys conflict with it have
//! completed, and items with disjoint keys run concurrently on worker threads.
//! Completion of an item releases its key. A failing item only affects its own
//! [`Completion`].

mod completion;
mod dependency;
mod error;
mod queue;

pub use completion::Completion;
pub use dependency::DependencyKey;
pub use error::QueueError;
pub use queue::MessageQueue;

#[cfg(test)]
mod tests;
