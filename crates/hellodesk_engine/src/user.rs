/* 📖 # Why separate NewUser and User?

NewUser is what a client may supply: name, email, age. User is what the registry hands
back: the same fields plus an id the registry assigned. Only the registry can build a
User, so no caller can invent an id, and there is no setter to change one afterwards.
*/

use std::fmt;

use serde::Serialize;

/// Registry-assigned user identifier. Starts at 1 and only ever grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct UserId(u64);

impl UserId {
    pub const FIRST: UserId = UserId(1);

    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(self) -> u64 {
        self.0
    }

    pub(crate) fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A candidate user without an id.
///
/// Field shape (name length, email grammar, age range) is checked by
/// [`crate::validation::validate_new_user`] before a candidate reaches the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    name: String,
    email: String,
    age: u8,
}

impl NewUser {
    pub fn new(name: impl Into<String>, email: impl Into<String>, age: u8) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            age,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn age(&self) -> u8 {
        self.age
    }
}

/// A stored user record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    name: String,
    email: String,
    age: u8,
}

impl User {
    pub(crate) fn from_candidate(id: UserId, candidate: NewUser) -> Self {
        let NewUser { name, email, age } = candidate;
        Self {
            id,
            name,
            email,
            age,
        }
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn age(&self) -> u8 {
        self.age
    }

    /// `Name <email>`, as shown in logs.
    pub fn display_name(&self) -> String {
        format!("{} <{}>", self.name, self.email)
    }

    /// Case-insensitive email comparison used for the uniqueness check.
    pub fn has_email(&self, email: &str) -> bool {
        self.email.to_lowercase() == email.to_lowercase()
    }
}
