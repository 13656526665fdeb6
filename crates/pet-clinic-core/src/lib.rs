//! Pet Clinic Core Library
//!
//! Client (owner + pet) records for a small veterinary clinic.
//!
//! # Architecture
//!
//! ```text
//!   JSON payload ──► validation ──► ClientInput / ClientPatch
//!                                          │
//!   ClientFilters ──► query::build_filter  │
//!                            │             │
//!                            ▼             ▼
//!                     ┌──────────────────────────┐
//!                     │       ClientStore        │  lazy, shared connection
//!                     │  list / get / add /      │
//!                     │  update / remove         │
//!                     └────────────┬─────────────┘
//!                                  ▼
//!                          SQLite (db module)
//! ```
//!
//! # Modules
//!
//! - [`models`]: Domain types (ClientRecord, ClientInput, PetType, ...)
//! - [`validation`]: Create/update payload validation, all errors at once
//! - [`query`]: Store-agnostic filter predicates
//! - [`db`]: SQLite database layer
//! - [`store`]: Async repository with the error taxonomy callers map to HTTP
//! - [`config`]: Store configuration from the environment

pub mod config;
pub mod db;
pub mod models;
pub mod query;
pub mod store;
pub mod validation;

// Re-export commonly used types
pub use config::StoreConfig;
pub use db::{Database, DbError};
pub use models::{
    ClientFilters, ClientInput, ClientOrder, ClientPatch, ClientRecord, ClientSortBy, PetType,
    SortDirection,
};
pub use query::{build_filter, ClientPredicate};
pub use store::{ClientStore, StoreError, StoreResult};
pub use validation::{validate_create, validate_update, ValidationErrors};
