//! Port contracts for user lookup and registration.

pub mod repository;

pub use repository::{UserRepository, UserRepositoryError, UserRepositoryResult, UserSummary};
