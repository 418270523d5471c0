use std::collections::HashMap;

use tracing::debug;

use hellodesk_base::{DeskError, DeskResult};

use crate::registry::traits::UserRegistry;
use crate::user::{NewUser, User, UserId};

/// An in-memory user registry backed by a HashMap.
///
/// Records live as long as the process. The uniqueness check scans every stored email,
/// which is fine for the tutorial-sized data this serves.
///
/// # Example
///
/// ```
/// use hellodesk_engine::{InMemoryRegistry, NewUser, UserId, UserRegistry};
///
/// let mut registry = InMemoryRegistry::new();
/// let user = registry
///     .create(NewUser::new("Pandi", "pandi@example.com", 30))
///     .unwrap();
///
/// assert_eq!(user.id(), UserId::new(1));
/// assert_eq!(registry.get(user.id()).unwrap(), user);
/// assert!(registry.create(NewUser::new("P", "PANDI@example.com", 30)).is_err());
/// ```
#[derive(Debug)]
pub struct InMemoryRegistry {
    users: HashMap<UserId, User>,
    next_id: UserId,
}

impl Default for InMemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self {
            users: HashMap::new(),
            next_id: UserId::FIRST,
        }
    }
}

impl UserRegistry for InMemoryRegistry {
    fn create(&mut self, candidate: NewUser) -> DeskResult<User> {
        if let Some(existing) = self.users.values().find(|u| u.has_email(candidate.email())) {
            debug!(existing_id = %existing.id(), "email already registered");
            return Err(Box::new(DeskError::conflict("Email already exists")));
        }

        let id = self.next_id;
        self.next_id = id.next();
        let user = User::from_candidate(id, candidate);
        self.users.insert(id, user.clone());
        Ok(user)
    }

    fn get(&self, id: UserId) -> DeskResult<User> {
        self.users
            .get(&id)
            .cloned()
            .ok_or_else(|| Box::new(DeskError::not_found("User not found")))
    }

    fn reset(&mut self) {
        self.users.clear();
        self.next_id = UserId::FIRST;
    }

    fn next_id(&self) -> UserId {
        self.next_id
    }

    fn len(&self) -> usize {
        self.users.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::RegistryHandle;
    use std::sync::{Arc, Barrier};
    use std::thread;

    fn pandi() -> NewUser {
        NewUser::new("Pandi", "pandi@example.com", 30)
    }

    #[test]
    fn test_registry_new_is_empty() {
        let registry = InMemoryRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.next_id(), UserId::FIRST);
    }

    #[test]
    fn test_create_then_duplicate_conflicts() {
        let mut registry = InMemoryRegistry::new();

        let user = registry.create(pandi()).unwrap();
        assert_eq!(user.id(), UserId::new(1));
        assert_eq!(user.name(), "Pandi");

        let err = registry.create(pandi()).unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(err.to_string(), "Email already exists");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_email_differs_only_in_case() {
        let mut registry = InMemoryRegistry::new();
        registry.create(pandi()).unwrap();

        let shouting = NewUser::new("Pandi", "PANDI@EXAMPLE.COM", 30);
        assert!(registry.create(shouting).unwrap_err().is_conflict());
    }

    #[test]
    fn test_get_empty_registry_not_found() {
        let registry = InMemoryRegistry::new();
        let err = registry.get(UserId::new(1)).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "User not found");
    }

    #[test]
    fn test_get_round_trips_created_record() {
        let mut registry = InMemoryRegistry::new();
        let created = registry.create(pandi()).unwrap();

        assert_eq!(registry.get(UserId::new(1)).unwrap(), created);
        assert!(registry.get(UserId::new(999)).unwrap_err().is_not_found());
    }

    #[test]
    fn test_never_assigned_ids_not_found() {
        let mut registry = InMemoryRegistry::new();
        registry.create(pandi()).unwrap();

        for id in [0, 2, 3, u64::MAX] {
            assert!(registry.get(UserId::new(id)).unwrap_err().is_not_found());
        }
    }

    #[test]
    fn test_two_distinct_emails_get_sequential_ids() {
        let mut registry = InMemoryRegistry::new();
        let first = registry.create(pandi()).unwrap();
        let second = registry
            .create(NewUser::new("Ravi", "ravi@example.com", 41))
            .unwrap();

        assert_eq!(first.id(), UserId::new(1));
        assert_eq!(second.id(), UserId::new(2));
        assert_eq!(registry.next_id(), UserId::new(3));
    }

    #[test]
    fn test_failed_create_does_not_consume_id() {
        let mut registry = InMemoryRegistry::new();
        registry.create(pandi()).unwrap();
        registry.create(pandi()).unwrap_err();
        assert_eq!(registry.next_id(), UserId::new(2));

        let next = registry
            .create(NewUser::new("Ravi", "ravi@example.com", 41))
            .unwrap();
        assert_eq!(next.id(), UserId::new(2));
    }

    #[test]
    fn test_ids_strictly_increase_across_mixed_sequence() {
        let mut registry = InMemoryRegistry::new();
        let emails = [
            "a@example.com",
            "b@example.com",
            "A@example.com",
            "c@example.com",
            "B@EXAMPLE.com",
            "d@example.com",
        ];

        let ids: Vec<UserId> = emails
            .iter()
            .filter_map(|email| registry.create(NewUser::new("x", *email, 20)).ok())
            .map(|user| user.id())
            .collect();

        assert_eq!(ids, vec![UserId::new(1), UserId::new(2), UserId::new(3), UserId::new(4)]);
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn test_reset_clears_records_and_counter() {
        let mut registry = InMemoryRegistry::new();
        registry.create(pandi()).unwrap();
        registry.reset();

        assert!(registry.is_empty());
        assert_eq!(registry.next_id(), UserId::FIRST);
        assert_eq!(registry.create(pandi()).unwrap().id(), UserId::FIRST);
    }

    #[test]
    fn test_handle_shares_state_between_clones() {
        let handle = RegistryHandle::new(InMemoryRegistry::new());
        let clone = handle.clone();

        let user = handle.create(pandi()).unwrap();
        assert_eq!(clone.get(user.id()).unwrap(), user);
        assert_eq!(clone.len(), 1);

        clone.reset();
        assert!(handle.is_empty());
    }

    #[test]
    fn test_concurrent_creates_with_same_email_admit_exactly_one() {
        const THREADS: usize = 16;
        let handle = RegistryHandle::new(InMemoryRegistry::new());
        let barrier = Arc::new(Barrier::new(THREADS));

        let workers: Vec<_> = (0..THREADS)
            .map(|i| {
                let handle = handle.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    let email = if i % 2 == 0 {
                        "race@example.com"
                    } else {
                        "RACE@example.com"
                    };
                    handle.create(NewUser::new(format!("user{}", i), email, 20))
                })
            })
            .collect();

        let results: Vec<_> = workers.into_iter().map(|w| w.join().unwrap()).collect();
        let successes = results.iter().filter(|r| r.is_ok()).count();
        let conflicts = results
            .iter()
            .filter(|r| r.as_ref().is_err_and(|e| e.is_conflict()))
            .count();

        assert_eq!(successes, 1);
        assert_eq!(conflicts, THREADS - 1);
        assert_eq!(handle.len(), 1);
        assert_eq!(handle.next_id(), UserId::new(2));
    }
}
