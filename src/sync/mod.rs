//! Optimistic synchronization between the in-memory forests and storage.
//!
//! A mutation is applied to the workspace immediately, then the whole forest
//! of the affected collection is written to the [`DirectoryStore`]. If the
//! write fails, the pre-mutation forest is restored.

mod mutation;
mod store;
mod workspace;

pub use mutation::{Effect, Location, Mutation, MutationState, NodePatch};
pub use store::DirectoryStore;
pub use workspace::{Settled, Ticket, Workspace};
