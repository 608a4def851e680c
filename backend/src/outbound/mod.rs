//! Outbound adapters implementing the driven ports.
//!
//! - **persistence**: PostgreSQL repositories using Diesel
//! - **memory**: in-process repositories for local runs and tests
//! - **crypto**: bcrypt password hashing
//!
//! Adapters translate between domain types and infrastructure
//! representations and hold no business rules.

pub mod crypto;
pub mod memory;
pub mod persistence;
