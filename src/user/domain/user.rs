//! User entity and the per-request actor identity.

use super::{Role, UserId, Username};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    id: UserId,
    username: Username,
    role: Role,
    is_active: bool,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedUserData {
    /// Persisted user identifier.
    pub id: UserId,
    /// Persisted username.
    pub username: Username,
    /// Persisted role.
    pub role: Role,
    /// Whether the account is active.
    pub is_active: bool,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Registers a new, active user.
    #[must_use]
    pub fn new(username: Username, role: Role, clock: &impl Clock) -> Self {
        Self {
            id: UserId::new(),
            username,
            role,
            is_active: true,
            created_at: clock.utc(),
        }
    }

    /// Reconstructs a user from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedUserData) -> Self {
        Self {
            id: data.id,
            username: data.username,
            role: data.role,
            is_active: data.is_active,
            created_at: data.created_at,
        }
    }

    /// Returns the user identifier.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Returns the username.
    #[must_use]
    pub const fn username(&self) -> &Username {
        &self.username
    }

    /// Returns the role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Returns whether the account is active.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.is_active
    }

    /// Returns the registration timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Disables the account. Inactive users cannot receive new tasks.
    pub const fn deactivate(&mut self) {
        self.is_active = false;
    }

    /// Re-enables the account.
    pub const fn activate(&mut self) {
        self.is_active = true;
    }

    /// Returns the actor identity for requests made by this user.
    #[must_use]
    pub const fn actor(&self) -> Actor {
        Actor {
            id: self.id,
            role: self.role,
            is_active: self.is_active,
        }
    }
}

/// The authenticated identity performing a request.
///
/// Supplied by the authentication collaborator and trusted as given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    /// Identifier of the acting user.
    pub id: UserId,
    /// Role of the acting user.
    pub role: Role,
    /// Whether the acting account is active.
    pub is_active: bool,
}

impl Actor {
    /// Creates an active actor.
    #[must_use]
    pub const fn new(id: UserId, role: Role) -> Self {
        Self {
            id,
            role,
            is_active: true,
        }
    }

    /// Returns `true` when the actor holds the admin role.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
