//! Outbound adapters implementing the domain's driven ports.
//!
//! - **persistence**: PostgreSQL repositories using Diesel
//! - **memory**: a mutex-guarded store for development and tests
//! - **security**: Argon2 password hashing

pub mod memory;
pub mod persistence;
pub mod security;
