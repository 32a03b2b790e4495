//! Task lifecycle management.
//!
//! Admins create tasks and assign them to users; tasks then move through a
//! fixed status lifecycle under role- and ownership-based authorization,
//! and every tracked change leaves an audit entry committed atomically with
//! it. The module follows hexagonal architecture:
//!
//! - Domain types, the policy, and the audit recorder in [`domain`]
//! - List filtering, ordering, and pagination in [`query`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod query;
pub mod services;
