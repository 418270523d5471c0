/* 📖 # Why a UserRegistry trait?

The trait is the seam between the HTTP layer and wherever users are kept. Today that is
InMemoryRegistry; handlers only see RegistryHandle, so a different backing store would
not touch them.

The trait carries the invariants every implementation must keep:
- ids are assigned by the registry, start at 1 and are never reused
- no two users share an email, compared case-insensitively
- a failed create changes nothing, including the id counter
*/

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{info, warn};

use hellodesk_base::DeskResult;

use crate::user::{NewUser, User, UserId};

/// Storage for user records with registry-assigned ids.
pub trait UserRegistry: Send + Sync + 'static {
    /// Store a candidate under a freshly allocated id.
    ///
    /// Fails with a Conflict error if a stored user already has the same email,
    /// ignoring case. On failure nothing is mutated.
    fn create(&mut self, candidate: NewUser) -> DeskResult<User>;

    /// Look up a user by id. Fails with a NotFound error if the id was never assigned.
    fn get(&self, id: UserId) -> DeskResult<User>;

    /// Drop every record and restart ids at 1.
    fn reset(&mut self);

    /// The id the next successful create will receive.
    fn next_id(&self) -> UserId;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/* 📖 # Why one RwLock around the whole registry?

Create scans every email, allocates an id and inserts, and those three steps have to
happen as one unit or two racing requests with the same email could both pass the scan.
Taking the write lock for the entire create makes that impossible. The working set is a
handful of records, so finer-grained locking would buy nothing.
*/

/// A thread-safe, cheaply cloneable handle to a user registry.
#[derive(Clone)]
pub struct RegistryHandle(Arc<RwLock<dyn UserRegistry>>);

impl RegistryHandle {
    pub fn new<R: UserRegistry>(registry: R) -> Self {
        Self(Arc::new(RwLock::new(registry)))
    }

    /// See [`UserRegistry::create`].
    pub fn create(&self, candidate: NewUser) -> DeskResult<User> {
        let result = self.0.write().create(candidate);
        match &result {
            Ok(user) => info!(user_id = %user.id(), user = %user.display_name(), "user created"),
            Err(e) => warn!(error = %e, "user not created"),
        }
        result
    }

    /// See [`UserRegistry::get`].
    pub fn get(&self, id: UserId) -> DeskResult<User> {
        self.0.read().get(id)
    }

    /// See [`UserRegistry::reset`].
    pub fn reset(&self) {
        self.0.write().reset();
    }

    pub fn next_id(&self) -> UserId {
        self.0.read().next_id()
    }

    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }
}

impl std::fmt::Debug for RegistryHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registry = self.0.read();
        f.debug_struct("RegistryHandle")
            .field("len", &registry.len())
            .field("next_id", &registry.next_id())
            .finish()
    }
}
