//! Domain model for users and roles.

mod error;
mod ids;
mod role;
mod user;

pub use error::{ParseRoleError, UserDomainError};
pub use ids::{UserId, Username};
pub use role::Role;
pub use user::{Actor, PersistedUserData, User};
