//! Users, roles and the authenticated actor.
//!
//! Every authorization decision in the task context is made against an
//! [`domain::Actor`], the identity the authentication collaborator vouches
//! for on each request. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]

pub mod adapters;
pub mod domain;
pub mod ports;

#[cfg(test)]
mod tests;
