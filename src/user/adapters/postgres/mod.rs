//! `PostgreSQL` adapter for user lookup and registration.

mod models;
mod repository;
mod schema;

pub use repository::PostgresUserRepository;
