//! In-memory collections kept in step with a [`DirectoryStore`].

use tracing::{debug, info, warn};

use crate::datetime::now_millis;
use crate::tree::{Collection, Node};
use crate::{NoteError, Result};

use super::mutation::{Effect, Mutation, MutationState};
use super::store::DirectoryStore;

/// A mutation applied locally whose persistence is still outstanding.
///
/// Returned by [`Workspace::begin`] and consumed by [`Workspace::settle`].
#[derive(Debug)]
#[must_use = "a pending mutation must be settled"]
pub struct Ticket {
    collection_id: String,
    state: MutationState,
    effect: Effect,
}

impl Ticket {
    /// Collection the mutation applies to.
    pub fn collection_id(&self) -> &str {
        &self.collection_id
    }

    /// Current state of the mutation.
    pub fn state(&self) -> &MutationState {
        &self.state
    }

    /// What the mutation did to the forest.
    pub fn effect(&self) -> &Effect {
        &self.effect
    }
}

/// A persisted mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct Settled {
    /// Final state; always `Committed`.
    pub state: MutationState,
    /// What the mutation did.
    pub effect: Effect,
}

/// The collections as the UI sees them.
///
/// Mutations update the in-memory forest first and persist afterwards. A
/// failed write restores the pre-mutation forest.
pub struct Workspace<S> {
    store: S,
    collections: Vec<Collection>,
}

impl<S: DirectoryStore> Workspace<S> {
    /// Create an empty workspace over `store`.
    pub fn new(store: S) -> Self {
        Self {
            store,
            collections: Vec::new(),
        }
    }

    /// Create a workspace holding every collection in `store`.
    pub async fn load(store: S) -> Result<Self> {
        let mut workspace = Self::new(store);
        workspace.reload().await?;
        Ok(workspace)
    }

    /// Replace the in-memory collections with the store's.
    pub async fn reload(&mut self) -> Result<()> {
        self.collections = self.store.load_collections().await?;
        info!(count = self.collections.len(), "Loaded collections");
        Ok(())
    }

    /// The backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// All collections in creation order.
    pub fn collections(&self) -> &[Collection] {
        &self.collections
    }

    /// Get a collection by ID.
    pub fn collection(&self, id: &str) -> Option<&Collection> {
        self.collections.iter().find(|c| c.id == id)
    }

    /// Get the first collection with the given name.
    pub fn collection_by_name(&self, name: &str) -> Option<&Collection> {
        self.collections.iter().find(|c| c.name == name)
    }

    /// Create a collection in the store and add it to the workspace.
    pub async fn create_collection(&mut self, name: &str) -> Result<Collection> {
        let collection = self.store.create_collection(name).await?;
        info!(id = %collection.id, name, "Created collection");
        self.collections.push(collection.clone());
        Ok(collection)
    }

    /// Get the collection with the given name, creating it if missing.
    pub async fn ensure_collection(&mut self, name: &str) -> Result<Collection> {
        if let Some(existing) = self.collection_by_name(name) {
            return Ok(existing.clone());
        }
        self.create_collection(name).await
    }

    /// Apply `mutation` to the in-memory forest without persisting it.
    ///
    /// The returned ticket holds the pre-mutation snapshot and must be passed
    /// to [`settle`](Self::settle).
    pub fn begin(&mut self, collection_id: &str, mutation: Mutation) -> Result<Ticket> {
        let collection = self
            .collections
            .iter_mut()
            .find(|c| c.id == collection_id)
            .ok_or_else(|| NoteError::NotFound(format!("collection {collection_id}")))?;

        let mut state = MutationState::Idle;
        state.begin(collection.directories.clone());

        let (mut next, effect) = mutation.apply(&collection.directories);
        crate::tree::assign_collection_id_in_place(&mut next, collection_id);
        collection.directories = next;

        debug!(collection_id, ?effect, "Applied mutation locally");
        Ok(Ticket {
            collection_id: collection_id.to_string(),
            state,
            effect,
        })
    }

    /// Persist the forest of a pending mutation.
    ///
    /// On failure the snapshot is restored and the store's error returned.
    /// A mutation that changed nothing commits without a write.
    pub async fn settle(&mut self, mut ticket: Ticket) -> Result<Settled> {
        if !ticket.effect.changed() {
            ticket.state.commit();
            return Ok(Settled {
                state: ticket.state,
                effect: ticket.effect,
            });
        }

        let forest: Vec<Node> = self
            .collection(&ticket.collection_id)
            .map(|c| c.directories.clone())
            .unwrap_or_default();

        match self
            .store
            .save_directories(&ticket.collection_id, &forest)
            .await
        {
            Ok(()) => {
                ticket.state.commit();
                if let Some(collection) = self.collection_mut(&ticket.collection_id) {
                    collection.updated_at = now_millis();
                }
                Ok(Settled {
                    state: ticket.state,
                    effect: ticket.effect,
                })
            }
            Err(e) => {
                warn!(
                    collection_id = %ticket.collection_id,
                    error = %e,
                    "Failed to persist directories, rolling back"
                );
                if let Some(snapshot) = ticket.state.roll_back() {
                    if let Some(collection) = self.collection_mut(&ticket.collection_id) {
                        collection.directories = snapshot;
                    }
                }
                Err(e)
            }
        }
    }

    /// [`begin`](Self::begin) and [`settle`](Self::settle) in one step.
    pub async fn apply(&mut self, collection_id: &str, mutation: Mutation) -> Result<Settled> {
        let ticket = self.begin(collection_id, mutation)?;
        self.settle(ticket).await
    }

    fn collection_mut(&mut self, id: &str) -> Option<&mut Collection> {
        self.collections.iter_mut().find(|c| c.id == id)
    }
}

impl<S> std::fmt::Debug for Workspace<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace")
            .field("collections", &self.collections.len())
            .finish()
    }
}
