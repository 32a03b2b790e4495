//! Taskboard: task lifecycle engine for a role-based task tracker.
//!
//! This crate provides the decision core of a task management backend:
//! the task status state machine, role- and ownership-based authorization,
//! the audit trail written alongside every mutation, and the filtered,
//! paginated query views used by list, dashboard and statistics screens.
//!
//! # Architecture
//!
//! Taskboard follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (in-memory, `PostgreSQL`)
//! - **Services**: Request-scoped orchestration consulted by a transport layer
//!
//! # Modules
//!
//! - [`config`]: Policy limits for due dates, pagination and dashboards
//! - [`user`]: Users, roles and the authenticated actor
//! - [`task`]: Task lifecycle, authorization, audit history and queries

pub mod config;
pub mod postgres;
pub mod task;
pub mod user;
